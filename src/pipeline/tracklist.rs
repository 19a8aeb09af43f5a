use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::recognition::TrackMatch;

/// A match paired with the absolute timestamp of the sample it was found in
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecognizedChunk {
    /// Seconds from the start of the source recording
    pub timestamp: u64,
    #[serde(rename = "match")]
    pub track: TrackMatch,
}

/// Identity used to detect repeated sightings of the same track
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TrackIdentity {
    /// Streaming platform track id
    Platform(String),
    /// Fallback when the provider has no platform id
    Structural { title: String, artist: String },
}

impl TrackIdentity {
    pub fn of(track: &TrackMatch) -> Self {
        match &track.external_platform_id {
            Some(id) => Self::Platform(id.clone()),
            None => Self::Structural {
                title: track.title.trim().to_lowercase(),
                artist: track.artist_name.trim().to_lowercase(),
            },
        }
    }
}

/// Drop repeated sightings of a track, keeping the first.
///
/// Input order is preserved, so sightings ordered by timestamp keep the earliest
/// timestamp at which each track was recognized.
pub fn dedup_first_seen(sightings: Vec<RecognizedChunk>) -> Vec<RecognizedChunk> {
    let mut seen = HashSet::new();

    sightings
        .into_iter()
        .filter(|chunk| seen.insert(TrackIdentity::of(&chunk.track)))
        .collect()
}
