//! External media transcoder
//!
//! Cutting and chunking are delegated to an ffmpeg executable. Both operations use
//! stream copy (`-c copy`), so only segment boundaries move and no audio is re-encoded.

use async_trait::async_trait;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

use super::chunk::{list_chunk_files, CHUNK_FILE_PREFIX};
use crate::config::TranscoderConfig;
use crate::error::{PipelineError, PipelineResult};

/// Container extension used when the source path has none
pub const DEFAULT_EXTENSION: &str = "wav";

/// Cuts and splits audio files
#[async_trait]
pub trait MediaTranscoder: Send + Sync {
    /// Extract `[start, end)` seconds of `source` into `dest`
    async fn cut(&self, source: &Path, dest: &Path, start: u64, end: u64)
        -> PipelineResult<PathBuf>;

    /// Split `source` into `chunk_secs` long segments inside `out_dir`.
    ///
    /// Returns chunk paths in segment order; the last segment may be shorter.
    async fn chunk(
        &self,
        source: &Path,
        chunk_secs: u64,
        out_dir: &Path,
    ) -> PipelineResult<Vec<PathBuf>>;

    /// Transcoder name for logging
    fn name(&self) -> &str;
}

/// Extension of `path`, falling back to [`DEFAULT_EXTENSION`]
pub fn container_extension(path: &Path) -> &str {
    path.extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| !ext.is_empty())
        .unwrap_or(DEFAULT_EXTENSION)
}

/// ffmpeg-backed [`MediaTranscoder`]
#[derive(Debug, Clone)]
pub struct Ffmpeg {
    executable: PathBuf,
    timeout: Duration,
}

impl Ffmpeg {
    pub fn new(executable: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self {
            executable: executable.into(),
            timeout,
        }
    }

    pub fn from_config(config: &TranscoderConfig) -> Self {
        Self::new(&config.ffmpeg_path, Duration::from_secs(config.timeout_secs))
    }

    fn cut_args(source: &Path, dest: &Path, start: u64, end: u64) -> Vec<OsString> {
        vec![
            "-nostdin".into(),
            "-y".into(),
            "-ss".into(),
            start.to_string().into(),
            "-to".into(),
            end.to_string().into(),
            "-i".into(),
            source.into(),
            "-c".into(),
            "copy".into(),
            dest.into(),
        ]
    }

    fn segment_args(source: &Path, chunk_secs: u64, pattern: &Path) -> Vec<OsString> {
        vec![
            "-nostdin".into(),
            "-y".into(),
            "-i".into(),
            source.into(),
            "-f".into(),
            "segment".into(),
            "-segment_time".into(),
            chunk_secs.to_string().into(),
            "-c".into(),
            "copy".into(),
            pattern.into(),
        ]
    }

    fn describe(&self, args: &[OsString]) -> String {
        std::iter::once(self.executable.as_os_str())
            .chain(args.iter().map(|a| a.as_os_str()))
            .map(|part| {
                let part = part.to_string_lossy();
                if part.contains(char::is_whitespace) {
                    format!("\"{part}\"")
                } else {
                    part.into_owned()
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Run ffmpeg to completion, failing on non-zero exit or timeout
    async fn run(&self, args: Vec<OsString>) -> PipelineResult<()> {
        let command = self.describe(&args);
        debug!(command = %command, "Running transcoder");

        let child = Command::new(&self.executable)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| PipelineError::TranscoderUnavailable {
                command: command.clone(),
                source,
            })?;

        // Dropping the wait future on timeout drops the child, which kills it.
        let output = match tokio::time::timeout(self.timeout, child.wait_with_output()).await {
            Ok(result) => result.map_err(|source| PipelineError::TranscoderUnavailable {
                command: command.clone(),
                source,
            })?,
            Err(_) => {
                return Err(PipelineError::TranscodeTimeout {
                    command,
                    timeout_secs: self.timeout.as_secs(),
                })
            }
        };

        if !output.status.success() {
            return Err(PipelineError::TranscodeFailure {
                exit_code: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                command,
            });
        }

        Ok(())
    }
}

#[async_trait]
impl MediaTranscoder for Ffmpeg {
    async fn cut(
        &self,
        source: &Path,
        dest: &Path,
        start: u64,
        end: u64,
    ) -> PipelineResult<PathBuf> {
        self.run(Self::cut_args(source, dest, start, end)).await?;

        info!(
            source = %source.display(),
            dest = %dest.display(),
            start,
            end,
            "Cut audio segment"
        );

        Ok(dest.to_path_buf())
    }

    async fn chunk(
        &self,
        source: &Path,
        chunk_secs: u64,
        out_dir: &Path,
    ) -> PipelineResult<Vec<PathBuf>> {
        let pattern = out_dir.join(format!(
            "{CHUNK_FILE_PREFIX}%03d.{}",
            container_extension(source)
        ));
        let args = Self::segment_args(source, chunk_secs, &pattern);

        tokio::fs::create_dir_all(out_dir)
            .await
            .map_err(|e| PipelineError::TranscodeFailure {
                exit_code: None,
                stderr: format!("Could not create chunk directory {}: {e}", out_dir.display()),
                command: self.describe(&args),
            })?;

        self.run(args).await?;

        let chunks = list_chunk_files(out_dir)
            .await
            .map_err(|e| PipelineError::TranscodeFailure {
                exit_code: None,
                stderr: format!("Could not list chunk directory {}: {e}", out_dir.display()),
                command: self.describe(&[]),
            })?;

        info!(
            source = %source.display(),
            chunk_secs,
            chunks = chunks.len(),
            "Split audio into chunks"
        );

        Ok(chunks)
    }

    fn name(&self) -> &str {
        "ffmpeg"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cut_uses_stream_copy_between_bounds() {
        let args = Ffmpeg::cut_args(Path::new("in.mp3"), Path::new("out.mp3"), 10, 40);
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();

        assert_eq!(
            args,
            ["-nostdin", "-y", "-ss", "10", "-to", "40", "-i", "in.mp3", "-c", "copy", "out.mp3"]
        );
    }

    #[test]
    fn segment_writes_numbered_pattern() {
        let args = Ffmpeg::segment_args(Path::new("cut.wav"), 3, Path::new("chunks/chunk_%03d.wav"));
        let args: Vec<_> = args.iter().map(|a| a.to_string_lossy().into_owned()).collect();

        assert!(args.windows(2).any(|w| w == ["-f", "segment"]));
        assert!(args.windows(2).any(|w| w == ["-segment_time", "3"]));
        assert_eq!(args.last().map(String::as_str), Some("chunks/chunk_%03d.wav"));
    }

    #[test]
    fn describe_quotes_paths_with_spaces() {
        let ffmpeg = Ffmpeg::new("/usr/bin/ffmpeg", Duration::from_secs(1));
        let text = ffmpeg.describe(&["-i".into(), "my mix.wav".into()]);
        assert_eq!(text, "/usr/bin/ffmpeg -i \"my mix.wav\"");
    }

    #[test]
    fn extension_falls_back_to_wav() {
        assert_eq!(container_extension(Path::new("set.mp3")), "mp3");
        assert_eq!(container_extension(Path::new("set")), "wav");
    }
}
