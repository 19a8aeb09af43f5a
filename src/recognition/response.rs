//! ACRCloud identify response decoding
//!
//! The response nests matches under `metadata`. Full-track fingerprint matches are in
//! `metadata.music`; melody matches are in `metadata.humming` and are only used when
//! there are no music matches. Each list decodes into its own variant of
//! [`RecognitionResult`] with its own required fields.
//!
//! See <https://docs.acrcloud.com/reference/identification-api>

use serde::Deserialize;

use super::{MatchKind, TrackMatch};
use crate::error::{PipelineError, PipelineResult};

/// Provider status: sample recognized
pub const STATUS_SUCCESS: i64 = 0;
/// Provider status: sample processed, nothing recognized
pub const STATUS_NO_RESULT: i64 = 1001;

const UNKNOWN_ARTIST: &str = "Unknown";

#[derive(Debug, Deserialize)]
struct IdentifyResponse {
    status: Option<ProviderStatus>,
    #[serde(default)]
    metadata: Metadata,
}

#[derive(Debug, Deserialize)]
struct ProviderStatus {
    code: i64,
    #[serde(default)]
    msg: String,
}

#[derive(Debug, Default, Deserialize)]
struct Metadata {
    #[serde(default)]
    music: Vec<MusicMatch>,
    #[serde(default)]
    humming: Vec<HummingMatch>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ArtistRef {
    pub name: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlatformItem {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SpotifyRecord {
    #[serde(default)]
    pub track: Option<PlatformItem>,
    #[serde(default)]
    pub artists: Vec<PlatformItem>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExternalMetadata {
    #[serde(default)]
    pub spotify: Option<SpotifyRecord>,
}

/// Entry of `metadata.music`
#[derive(Debug, Clone, Deserialize)]
pub struct MusicMatch {
    /// Integer confidence, 0-100
    pub score: f64,
    pub title: String,
    pub acrid: String,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub external_metadata: ExternalMetadata,
}

/// Entry of `metadata.humming`
#[derive(Debug, Clone, Deserialize)]
pub struct HummingMatch {
    /// Fractional confidence, 0.0-1.0
    pub score: f64,
    pub title: String,
    #[serde(default)]
    pub acrid: Option<String>,
    #[serde(default)]
    pub release_date: Option<String>,
    #[serde(default)]
    pub artists: Vec<ArtistRef>,
    #[serde(default)]
    pub external_metadata: ExternalMetadata,
}

/// One decoded match
#[derive(Debug, Clone)]
pub enum RecognitionResult {
    Music(MusicMatch),
    Humming(HummingMatch),
}

/// Decode an identify response body into matches.
///
/// A provider status other than success or "no result" is reported as
/// `ProviderRejected` carrying the provider's status code and message.
pub fn parse_identify_response(body: &str) -> PipelineResult<Vec<RecognitionResult>> {
    let response: IdentifyResponse = serde_json::from_str(body)
        .map_err(|e| PipelineError::MalformedResponse(e.to_string()))?;

    if let Some(status) = response.status {
        match status.code {
            STATUS_SUCCESS => {}
            STATUS_NO_RESULT => return Ok(Vec::new()),
            code => {
                return Err(PipelineError::ProviderRejected {
                    status: u16::try_from(code).unwrap_or(u16::MAX),
                    body: status.msg,
                })
            }
        }
    }

    let Metadata { music, humming } = response.metadata;

    if !music.is_empty() {
        return Ok(music.into_iter().map(RecognitionResult::Music).collect());
    }

    Ok(humming.into_iter().map(RecognitionResult::Humming).collect())
}

fn artist_name(artists: &[ArtistRef], external: &ExternalMetadata) -> String {
    artists
        .first()
        .map(|a| a.name.clone())
        .or_else(|| {
            external
                .spotify
                .as_ref()?
                .artists
                .first()?
                .name
                .clone()
        })
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string())
}

fn spotify_track_id(external: &ExternalMetadata) -> Option<String> {
    external.spotify.as_ref()?.track.as_ref()?.id.clone()
}

impl From<RecognitionResult> for TrackMatch {
    fn from(result: RecognitionResult) -> Self {
        match result {
            RecognitionResult::Music(m) => TrackMatch {
                confidence_score: m.score.round() as i64,
                artist_name: artist_name(&m.artists, &m.external_metadata),
                external_platform_id: spotify_track_id(&m.external_metadata),
                provider_track_id: Some(m.acrid),
                title: m.title,
                release_date: m.release_date,
                kind: MatchKind::Music,
            },
            RecognitionResult::Humming(h) => TrackMatch {
                confidence_score: (h.score * 100.0).round() as i64,
                artist_name: artist_name(&h.artists, &h.external_metadata),
                external_platform_id: spotify_track_id(&h.external_metadata),
                provider_track_id: h.acrid,
                title: h.title,
                release_date: h.release_date,
                kind: MatchKind::Humming,
            },
        }
    }
}
