use serde::Serialize;

use crate::error::{PipelineError, PipelineResult};

/// The `[start, end)` range of a source recording to analyze, in whole seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeWindow {
    start: u64,
    end: u64,
}

impl TimeWindow {
    /// Validate and build a window; `end` must be strictly after `start`
    pub fn new(start: u64, end: u64) -> PipelineResult<Self> {
        if end <= start {
            return Err(PipelineError::InvalidWindow { start, end });
        }

        Ok(Self { start, end })
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    pub fn end(&self) -> u64 {
        self.end
    }

    pub fn duration_secs(&self) -> u64 {
        self.end - self.start
    }
}
