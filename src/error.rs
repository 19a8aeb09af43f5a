use std::io;
use thiserror::Error;

/// Errors produced while cutting, sampling and recognizing a window of a mix
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Transcoder failed (exit code {exit_code:?}): {stderr}\nCommand: {command}")]
    TranscodeFailure {
        /// `None` when the process was terminated by a signal
        exit_code: Option<i32>,
        stderr: String,
        command: String,
    },

    #[error("Could not start transcoder `{command}`: {source}")]
    TranscoderUnavailable {
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("Transcoder timed out after {timeout_secs}s: {command}")]
    TranscodeTimeout { command: String, timeout_secs: u64 },

    #[error("Recognition provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Recognition provider rejected sample ({status}): {body}")]
    ProviderRejected { status: u16, body: String },

    #[error("Malformed provider response: {0}")]
    MalformedResponse(String),

    #[error("Workspace error: {message}: {source}")]
    Workspace {
        message: String,
        #[source]
        source: io::Error,
    },

    #[error("Invalid time window: end ({end}s) must be after start ({start}s)")]
    InvalidWindow { start: u64, end: u64 },
}

impl PipelineError {
    pub(crate) fn workspace(message: impl Into<String>, source: io::Error) -> Self {
        Self::Workspace {
            message: message.into(),
            source,
        }
    }

    /// Whether the error originated from the recognition provider
    pub fn is_provider_error(&self) -> bool {
        matches!(
            self,
            Self::ProviderUnavailable(_) | Self::ProviderRejected { .. } | Self::MalformedResponse(_)
        )
    }
}

pub type PipelineResult<T> = Result<T, PipelineError>;
