use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use super::selector::select_evenly;
use super::tracklist::{dedup_first_seen, RecognizedChunk};
use crate::audio::{container_extension, key_by_timestamp, AudioChunk, MediaTranscoder, Workspace};
use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::recognition::RecognitionProvider;
use crate::window::TimeWindow;

const CUT_FILE_STEM: &str = "cut_audio";
const CHUNK_DIR: &str = "chunks";

/// What to do when the provider fails for one sample
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Fail the whole run
    #[default]
    Abort,
    /// Log the failure, skip the sample and keep going
    Skip,
}

/// Tunables for a [`RecognitionPipeline`]
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    /// Length of each chunk in seconds
    pub chunk_duration_secs: u64,
    /// Maximum number of samples submitted to the provider per run
    pub max_samples: usize,
    /// Parent directory for workspaces (system temp dir when `None`)
    pub workspace_root: Option<PathBuf>,
    pub on_provider_error: FailurePolicy,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self::from(&PipelineConfig::default())
    }
}

impl From<&PipelineConfig> for PipelineSettings {
    fn from(config: &PipelineConfig) -> Self {
        Self {
            chunk_duration_secs: config.chunk_duration_secs,
            max_samples: config.max_samples,
            workspace_root: config.workspace_root.clone(),
            on_provider_error: config.on_provider_error,
        }
    }
}

/// Cuts a window out of a recording, samples it and asks the provider what is playing
pub struct RecognitionPipeline {
    transcoder: Arc<dyn MediaTranscoder>,
    provider: Arc<dyn RecognitionProvider>,
    settings: PipelineSettings,
}

impl RecognitionPipeline {
    pub fn new(
        transcoder: Arc<dyn MediaTranscoder>,
        provider: Arc<dyn RecognitionProvider>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            transcoder,
            provider,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    /// Recognize the tracks playing in `window` of `source`.
    ///
    /// Returns one entry per distinct track, at the timestamp where it was first
    /// recognized, in timestamp order. All intermediate files live in a private
    /// workspace that is removed before returning, on success and on failure.
    pub async fn run(
        &self,
        source: &Path,
        window: TimeWindow,
    ) -> PipelineResult<Vec<RecognizedChunk>> {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "recognition_run",
            %run_id,
            source = %source.display(),
            start = window.start(),
            end = window.end()
        );

        async move {
            let workspace = Workspace::create(self.settings.workspace_root.as_deref())?;
            let result = self.run_in(&workspace, source, window).await;
            workspace.close().await;

            match &result {
                Ok(tracks) => info!(tracks = tracks.len(), "Recognition run complete"),
                Err(e) => warn!(error = %e, "Recognition run failed"),
            }

            result
        }
        .instrument(span)
        .await
    }

    async fn run_in(
        &self,
        workspace: &Workspace,
        source: &Path,
        window: TimeWindow,
    ) -> PipelineResult<Vec<RecognizedChunk>> {
        let samples = self.build_samples(workspace, source, window).await?;
        let sightings = self.recognize(samples).await?;

        Ok(dedup_first_seen(sightings))
    }

    /// Cut the window, chunk it and pick the samples to submit
    async fn build_samples(
        &self,
        workspace: &Workspace,
        source: &Path,
        window: TimeWindow,
    ) -> PipelineResult<Vec<AudioChunk>> {
        let cut_path =
            workspace.join(format!("{CUT_FILE_STEM}.{}", container_extension(source)));

        let cut_path = self
            .transcoder
            .cut(source, &cut_path, window.start(), window.end())
            .await?;

        let chunk_paths = self
            .transcoder
            .chunk(
                &cut_path,
                self.settings.chunk_duration_secs,
                &workspace.join(CHUNK_DIR),
            )
            .await?;

        let chunks = key_by_timestamp(
            chunk_paths,
            window.start(),
            self.settings.chunk_duration_secs,
        );
        let total = chunks.len();
        let samples = select_evenly(chunks, self.settings.max_samples);

        info!(
            chunks = total,
            samples = samples.len(),
            timestamps = ?samples.iter().map(|s| s.timestamp).collect::<Vec<_>>(),
            "Selected samples"
        );

        Ok(samples)
    }

    /// Submit samples one at a time, in timestamp order.
    ///
    /// Under [`FailurePolicy::Skip`] a run where every submission failed returns
    /// the last provider error rather than an empty track list.
    async fn recognize(&self, samples: Vec<AudioChunk>) -> PipelineResult<Vec<RecognizedChunk>> {
        let mut sightings = Vec::new();
        let mut succeeded = 0usize;
        let mut last_error = None;

        for sample in samples {
            let matches = match self.provider.identify(&sample.file_path).await {
                Ok(matches) => {
                    succeeded += 1;
                    matches
                }
                Err(e)
                    if e.is_provider_error()
                        && self.settings.on_provider_error == FailurePolicy::Skip =>
                {
                    warn!(
                        timestamp = sample.timestamp,
                        provider = self.provider.name(),
                        error = %e,
                        "Skipping sample after provider failure"
                    );
                    last_error = Some(e);
                    continue;
                }
                Err(e) => return Err(e),
            };

            debug!(
                timestamp = sample.timestamp,
                matches = matches.len(),
                "Sample recognized"
            );

            sightings.extend(matches.into_iter().map(|track| RecognizedChunk {
                timestamp: sample.timestamp,
                track,
            }));
        }

        match last_error {
            Some(e) if succeeded == 0 => Err(e),
            _ => Ok(sightings),
        }
    }
}
