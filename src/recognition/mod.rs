//! Track recognition providers
//!
//! The pipeline submits one audio sample at a time to a [`RecognitionProvider`]
//! and gets back zero or more candidate [`TrackMatch`]es:
//! - [`AcrCloudClient`] - ACRCloud identify API (signed multipart upload)
//! - [`FixtureProvider`] - replays a stored identify response (offline development)

pub mod acrcloud;
pub mod fixture;
pub mod response;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

use crate::config::{ProviderKind, RecognitionConfig};
use crate::error::PipelineResult;

pub use acrcloud::AcrCloudClient;
pub use fixture::FixtureProvider;
pub use response::{parse_identify_response, HummingMatch, MusicMatch, RecognitionResult};

/// How the provider recognized a sample
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    /// Fingerprint match against the original recording
    Music,
    /// Melody match (cover, live version, hummed tune)
    Humming,
}

/// A candidate track returned for one sample
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMatch {
    /// Provider confidence, 0-100
    pub confidence_score: i64,
    pub title: String,
    pub release_date: Option<String>,
    pub artist_name: String,
    /// Provider-internal identifier (ACRCloud `acrid`)
    pub provider_track_id: Option<String>,
    /// Streaming platform identifier (Spotify track id)
    pub external_platform_id: Option<String>,
    pub kind: MatchKind,
}

/// Maps an audio sample to candidate track matches
#[async_trait]
pub trait RecognitionProvider: Send + Sync {
    /// Identify the tracks audible in `sample`
    ///
    /// Fails with `ProviderUnavailable` on connection failures and
    /// `ProviderRejected` on non-success responses.
    async fn identify(&self, sample: &Path) -> PipelineResult<Vec<TrackMatch>>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Recognition provider factory
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create the provider selected in configuration
    pub fn create(config: &RecognitionConfig) -> Result<Arc<dyn RecognitionProvider>> {
        match config.provider {
            ProviderKind::AcrCloud => {
                let client = AcrCloudClient::from_config(config)?;
                Ok(Arc::new(client))
            }

            ProviderKind::Fixture => {
                let path = config
                    .fixture_path
                    .as_deref()
                    .context("recognition.fixture_path is required for the fixture provider")?;
                Ok(Arc::new(FixtureProvider::load(path)?))
            }
        }
    }
}
