use super::state::AppState;
use crate::error::PipelineError;
use crate::pipeline::RecognizedChunk;
use crate::recognition::MatchKind;
use crate::window::TimeWindow;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{error, info};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    /// Audio file already stored on this host
    pub source_path: PathBuf,

    /// Window start in seconds
    pub start: u64,

    /// Window end in seconds (exclusive)
    pub end: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub source_path: PathBuf,
    pub start: u64,
    pub end: u64,
    pub tracks: Vec<TrackEntry>,
}

/// One line of the returned tracklist
#[derive(Debug, Serialize, Deserialize)]
pub struct TrackEntry {
    pub timestamp: u64,
    pub title: String,
    pub artist: String,
    pub release_date: Option<String>,
    pub score: i64,
    pub spotify_track_id: Option<String>,
    pub acrid: Option<String>,
    pub kind: MatchKind,
}

impl From<RecognizedChunk> for TrackEntry {
    fn from(chunk: RecognizedChunk) -> Self {
        let track = chunk.track;
        Self {
            timestamp: chunk.timestamp,
            title: track.title,
            artist: track.artist_name,
            release_date: track.release_date,
            score: track.confidence_score,
            spotify_track_id: track.external_platform_id,
            acrid: track.provider_track_id,
            kind: track.kind,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn error_response(status: StatusCode, error: impl ToString) -> axum::response::Response {
    (
        status,
        Json(ErrorResponse {
            error: error.to_string(),
        }),
    )
        .into_response()
}

fn status_for(error: &PipelineError) -> StatusCode {
    match error {
        PipelineError::InvalidWindow { .. } => StatusCode::BAD_REQUEST,
        PipelineError::TranscodeTimeout { .. } => StatusCode::GATEWAY_TIMEOUT,
        e if e.is_provider_error() => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// Client-facing message; transcoder and workspace errors carry host paths and raw stderr,
/// which stay in the server log
fn client_message(error: &PipelineError) -> String {
    match error {
        PipelineError::TranscodeFailure { exit_code, .. } => match exit_code {
            Some(code) => format!("Transcoder failed with exit code {}", code),
            None => "Transcoder failed".to_string(),
        },
        PipelineError::TranscoderUnavailable { .. } => "Transcoder unavailable".to_string(),
        PipelineError::TranscodeTimeout { timeout_secs, .. } => {
            format!("Transcoder timed out after {}s", timeout_secs)
        }
        PipelineError::Workspace { .. } => "Workspace error".to_string(),
        other => other.to_string(),
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /mixes/analyze
/// Recognize the tracks playing in a window of a stored mix
pub async fn analyze_mix(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> impl IntoResponse {
    let window = match TimeWindow::new(req.start, req.end) {
        Ok(window) => window,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, e),
    };

    if !req.source_path.is_file() {
        return error_response(
            StatusCode::NOT_FOUND,
            format!("Source file not found: {}", req.source_path.display()),
        );
    }

    info!(
        "Analyzing {} [{}s, {}s)",
        req.source_path.display(),
        req.start,
        req.end
    );

    match state.pipeline.run(&req.source_path, window).await {
        Ok(tracks) => (
            StatusCode::OK,
            Json(AnalyzeResponse {
                source_path: req.source_path,
                start: req.start,
                end: req.end,
                tracks: tracks.into_iter().map(TrackEntry::from).collect(),
            }),
        )
            .into_response(),
        Err(e) => {
            error!("Failed to analyze {}: {}", req.source_path.display(), e);
            error_response(status_for(&e), client_message(&e))
        }
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
