//! HTTP API around the recognition pipeline
//!
//! - POST /mixes/analyze - Recognize the tracks in a window of a stored mix
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use handlers::{AnalyzeRequest, AnalyzeResponse, TrackEntry};
pub use routes::create_router;
pub use state::AppState;
