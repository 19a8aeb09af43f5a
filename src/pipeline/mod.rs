//! Sampling and recognition pipeline
//!
//! `run(source, window)`:
//! - cut the window out of the source into a private workspace
//! - split the cut into fixed-duration chunks keyed by absolute timestamp
//! - submit an evenly spaced subset of chunks to the recognition provider
//! - return each recognized track once, at the timestamp it was first seen

mod runner;
mod selector;
mod tracklist;

pub use runner::{FailurePolicy, PipelineSettings, RecognitionPipeline};
pub use selector::select_evenly;
pub use tracklist::{dedup_first_seen, RecognizedChunk, TrackIdentity};
