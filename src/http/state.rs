use crate::pipeline::RecognitionPipeline;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Pipeline shared by all requests; every run gets its own workspace
    pub pipeline: Arc<RecognitionPipeline>,
}

impl AppState {
    pub fn new(pipeline: RecognitionPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}
