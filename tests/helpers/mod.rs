// Test doubles for the transcoder and recognition provider
//
// FakeTranscoder writes small text files instead of audio: the cut file holds
// "<start>-<end>" and each chunk holds "<start>-<end>:<index>", so providers can
// tell which run and which chunk a sample came from.

#![allow(dead_code)]

use async_trait::async_trait;
use mix_identify::audio::list_chunk_files;
use mix_identify::{MatchKind, MediaTranscoder, PipelineError, PipelineResult, RecognitionProvider, TrackMatch};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn track(title: &str, artist: &str, spotify_id: Option<&str>) -> TrackMatch {
    TrackMatch {
        confidence_score: 100,
        title: title.to_string(),
        release_date: None,
        artist_name: artist.to_string(),
        provider_track_id: None,
        external_platform_id: spotify_id.map(str::to_string),
        kind: MatchKind::Music,
    }
}

fn io_error(message: &str, source: std::io::Error) -> PipelineError {
    PipelineError::Workspace {
        message: message.to_string(),
        source,
    }
}

#[derive(Default)]
pub struct FakeTranscoder {
    pub fail_cut: bool,
    pub fail_chunk: bool,
    pub cuts: AtomicUsize,
}

impl FakeTranscoder {
    pub fn failing_cut() -> Self {
        Self {
            fail_cut: true,
            ..Self::default()
        }
    }

    pub fn failing_chunk() -> Self {
        Self {
            fail_chunk: true,
            ..Self::default()
        }
    }
}

#[async_trait]
impl MediaTranscoder for FakeTranscoder {
    async fn cut(&self, source: &Path, dest: &Path, start: u64, end: u64) -> PipelineResult<PathBuf> {
        self.cuts.fetch_add(1, Ordering::SeqCst);

        if self.fail_cut {
            return Err(PipelineError::TranscodeFailure {
                exit_code: Some(1),
                stderr: "Invalid data found when processing input".to_string(),
                command: format!("ffmpeg -i {}", source.display()),
            });
        }

        tokio::fs::write(dest, format!("{}-{}", start, end))
            .await
            .map_err(|e| io_error("write cut", e))?;

        Ok(dest.to_path_buf())
    }

    async fn chunk(&self, source: &Path, chunk_secs: u64, out_dir: &Path) -> PipelineResult<Vec<PathBuf>> {
        if self.fail_chunk {
            return Err(PipelineError::TranscodeFailure {
                exit_code: Some(234),
                stderr: "segment muxer failed".to_string(),
                command: format!("ffmpeg -i {} -f segment", source.display()),
            });
        }

        let cut = tokio::fs::read_to_string(source)
            .await
            .map_err(|e| io_error("read cut", e))?;
        let (start, end) = cut.split_once('-').expect("cut file holds start-end");
        let duration = end.parse::<u64>().unwrap() - start.parse::<u64>().unwrap();
        let count = (duration + chunk_secs - 1) / chunk_secs;

        tokio::fs::create_dir_all(out_dir)
            .await
            .map_err(|e| io_error("create chunk dir", e))?;

        for i in 0..count {
            tokio::fs::write(out_dir.join(format!("chunk_{:03}.wav", i)), format!("{}:{}", cut, i))
                .await
                .map_err(|e| io_error("write chunk", e))?;
        }

        list_chunk_files(out_dir).await.map_err(|e| io_error("list chunks", e))
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// A call seen by [`FakeProvider`]
#[derive(Debug, Clone)]
pub struct ProviderCall {
    pub sample: PathBuf,
    /// Contents of the sample file at call time
    pub contents: String,
}

/// Provider answering by chunk file name (`chunk_005.wav`)
#[derive(Default)]
pub struct FakeProvider {
    responses: HashMap<String, Vec<TrackMatch>>,
    failures: HashSet<String>,
    calls: Mutex<Vec<ProviderCall>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, chunk_file: &str, matches: Vec<TrackMatch>) -> Self {
        self.responses.insert(chunk_file.to_string(), matches);
        self
    }

    pub fn fail_on(mut self, chunk_file: &str) -> Self {
        self.failures.insert(chunk_file.to_string());
        self
    }

    pub fn calls(&self) -> Vec<ProviderCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn called_files(&self) -> Vec<String> {
        self.calls()
            .iter()
            .map(|c| c.sample.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }
}

#[async_trait]
impl RecognitionProvider for FakeProvider {
    async fn identify(&self, sample: &Path) -> PipelineResult<Vec<TrackMatch>> {
        let contents = tokio::fs::read_to_string(sample)
            .await
            .map_err(|e| io_error("read sample", e))?;

        self.calls.lock().unwrap().push(ProviderCall {
            sample: sample.to_path_buf(),
            contents,
        });

        let name = sample.file_name().unwrap().to_string_lossy().into_owned();

        if self.failures.contains(&name) {
            return Err(PipelineError::ProviderUnavailable(format!(
                "connection refused while sending {}",
                name
            )));
        }

        Ok(self.responses.get(&name).cloned().unwrap_or_default())
    }

    fn name(&self) -> &str {
        "fake"
    }
}

/// Number of entries left in a workspace root
pub fn entries_in(dir: &Path) -> usize {
    match std::fs::read_dir(dir) {
        Ok(entries) => entries.count(),
        Err(_) => 0,
    }
}
