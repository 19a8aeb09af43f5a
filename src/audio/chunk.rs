use serde::Serialize;
use std::io;
use std::path::{Path, PathBuf};

/// File name prefix for segments written by the transcoder
pub const CHUNK_FILE_PREFIX: &str = "chunk_";

/// A fixed-duration segment of the cut window
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AudioChunk {
    /// Chunk number within the cut segment (0-indexed)
    pub index: usize,
    /// Offset in seconds from the start of the original source, not the cut segment
    pub timestamp: u64,
    /// Chunk file inside the run's workspace
    pub file_path: PathBuf,
}

/// Key chunk files by absolute source timestamp.
///
/// `paths` must be in segment order: chunk `i` starts at `start + i * chunk_duration_secs`.
pub fn key_by_timestamp(
    paths: Vec<PathBuf>,
    start: u64,
    chunk_duration_secs: u64,
) -> Vec<AudioChunk> {
    paths
        .into_iter()
        .enumerate()
        .map(|(index, file_path)| AudioChunk {
            index,
            timestamp: start + index as u64 * chunk_duration_secs,
            file_path,
        })
        .collect()
}

/// Segment number encoded in a chunk file name (`chunk_007.wav` -> 7)
pub fn chunk_file_index(path: &Path) -> Option<usize> {
    path.file_stem()?
        .to_str()?
        .strip_prefix(CHUNK_FILE_PREFIX)?
        .parse()
        .ok()
}

/// List chunk files in `dir`, ordered by segment number.
///
/// Ordering is numeric so `chunk_1000` sorts after `chunk_999`.
pub async fn list_chunk_files(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut chunks = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if let Some(index) = chunk_file_index(&path) {
            chunks.push((index, path));
        }
    }

    chunks.sort_by_key(|(index, _)| *index);

    Ok(chunks.into_iter().map(|(_, path)| path).collect())
}
