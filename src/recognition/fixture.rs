use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::response::parse_identify_response;
use super::{RecognitionProvider, TrackMatch};
use crate::error::PipelineResult;

/// Provider that answers every sample with the matches of a stored identify response
///
/// Used for offline development and demos, where no ACRCloud credentials are available.
pub struct FixtureProvider {
    source: PathBuf,
    matches: Vec<TrackMatch>,
}

impl FixtureProvider {
    /// Load a saved ACRCloud identify response
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read fixture response: {}", path.display()))?;

        let matches: Vec<TrackMatch> = parse_identify_response(&body)
            .with_context(|| format!("Failed to decode fixture response: {}", path.display()))?
            .into_iter()
            .map(TrackMatch::from)
            .collect();

        info!(
            "Fixture provider loaded {} matches from {}",
            matches.len(),
            path.display()
        );

        Ok(Self {
            source: path.to_path_buf(),
            matches,
        })
    }

    pub fn matches(&self) -> &[TrackMatch] {
        &self.matches
    }
}

#[async_trait]
impl RecognitionProvider for FixtureProvider {
    async fn identify(&self, sample: &Path) -> PipelineResult<Vec<TrackMatch>> {
        debug!(
            sample = %sample.display(),
            fixture = %self.source.display(),
            "Answering from fixture"
        );
        Ok(self.matches.clone())
    }

    fn name(&self) -> &str {
        "fixture"
    }
}
