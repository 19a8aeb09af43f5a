pub mod chunk;
pub mod transcoder;
pub mod workspace;

pub use chunk::{key_by_timestamp, list_chunk_files, AudioChunk};
pub use transcoder::{container_extension, Ffmpeg, MediaTranscoder};
pub use workspace::Workspace;
