use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::PathBuf;

use crate::pipeline::FailurePolicy;
use crate::recognition::acrcloud::DEFAULT_BASE_URL;

/// Prefix for environment overrides, e.g. `MIX_IDENTIFY__RECOGNITION__SECRET_KEY`
pub const ENV_PREFIX: &str = "MIX_IDENTIFY";

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    #[serde(default)]
    pub transcoder: TranscoderConfig,
    #[serde(default)]
    pub recognition: RecognitionConfig,
    #[serde(default)]
    pub pipeline: PipelineConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TranscoderConfig {
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
    /// Wall-clock limit for a single ffmpeg invocation
    #[serde(default = "default_transcoder_timeout")]
    pub timeout_secs: u64,
}

impl Default for TranscoderConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            timeout_secs: default_transcoder_timeout(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    #[default]
    AcrCloud,
    Fixture,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionConfig {
    #[serde(default)]
    pub provider: ProviderKind,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    pub access_key: Option<String>,
    pub secret_key: Option<String>,
    #[serde(default = "default_provider_timeout")]
    pub timeout_secs: u64,
    /// Stored identify response replayed by the fixture provider
    pub fixture_path: Option<PathBuf>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::default(),
            base_url: default_base_url(),
            access_key: None,
            secret_key: None,
            timeout_secs: default_provider_timeout(),
            fixture_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    #[serde(default = "default_chunk_duration")]
    pub chunk_duration_secs: u64,
    /// Upper bound on provider calls per run
    #[serde(default = "default_max_samples")]
    pub max_samples: usize,
    /// Parent directory for per-run workspaces (system temp dir when unset)
    pub workspace_root: Option<PathBuf>,
    #[serde(default)]
    pub on_provider_error: FailurePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            chunk_duration_secs: default_chunk_duration(),
            max_samples: default_max_samples(),
            workspace_root: None,
            on_provider_error: FailurePolicy::default(),
        }
    }
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_transcoder_timeout() -> u64 {
    600
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_provider_timeout() -> u64 {
    30
}

fn default_chunk_duration() -> u64 {
    3
}

fn default_max_samples() -> usize {
    3
}

impl Config {
    /// Load `path` (any format the `config` crate understands, extension optional)
    /// layered with `MIX_IDENTIFY__*` environment variables
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .add_source(config::Environment::with_prefix(ENV_PREFIX).separator("__"))
            .build()
            .with_context(|| format!("Failed to load config from {}", path))?;

        let config: Self = settings
            .try_deserialize()
            .context("Invalid configuration")?;
        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.pipeline.chunk_duration_secs == 0 {
            bail!("pipeline.chunk_duration_secs must be at least 1");
        }
        if self.pipeline.max_samples == 0 {
            bail!("pipeline.max_samples must be at least 1");
        }
        if self.transcoder.timeout_secs == 0 {
            bail!("transcoder.timeout_secs must be at least 1");
        }

        Ok(())
    }
}
