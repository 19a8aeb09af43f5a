pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod pipeline;
pub mod recognition;
pub mod window;

pub use audio::{AudioChunk, Ffmpeg, MediaTranscoder, Workspace};
pub use config::Config;
pub use error::{PipelineError, PipelineResult};
pub use http::{create_router, AppState};
pub use pipeline::{FailurePolicy, PipelineSettings, RecognitionPipeline, RecognizedChunk};
pub use recognition::{
    AcrCloudClient, FixtureProvider, MatchKind, ProviderFactory, RecognitionProvider, TrackMatch,
};
pub use window::TimeWindow;
