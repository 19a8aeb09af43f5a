//! ACRCloud identify API client
//!
//! Samples are uploaded as multipart form data. Requests are authenticated with an
//! access key plus an HMAC-SHA1 signature over
//! `method \n uri \n access_key \n data_type \n signature_version \n timestamp`,
//! base64-encoded.

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::Engine;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

use super::response::parse_identify_response;
use super::{RecognitionProvider, TrackMatch};
use crate::config::RecognitionConfig;
use crate::error::{PipelineError, PipelineResult};

pub const DEFAULT_BASE_URL: &str = "https://identify-eu-west-1.acrcloud.com";
pub const IDENTIFY_URI: &str = "/v1/identify";
const DATA_TYPE: &str = "audio";
const SIGNATURE_VERSION: &str = "1";
const HTTP_METHOD: &str = "POST";
/// Largest sample the identify endpoint accepts
pub const MAX_SAMPLE_BYTES: u64 = 5 * 1024 * 1024;
const USER_AGENT: &str = concat!("mix-identify/", env!("CARGO_PKG_VERSION"));

/// Base64 HMAC-SHA1 signature for an identify request
pub fn sign_request(secret_key: &str, access_key: &str, timestamp: i64) -> String {
    let string_to_sign = [
        HTTP_METHOD,
        IDENTIFY_URI,
        access_key,
        DATA_TYPE,
        SIGNATURE_VERSION,
        &timestamp.to_string(),
    ]
    .join("\n");

    let mut mac = Hmac::<Sha1>::new_from_slice(secret_key.as_bytes())
        .expect("HMAC can take key of any size");
    mac.update(string_to_sign.as_bytes());

    base64::engine::general_purpose::STANDARD.encode(mac.finalize().into_bytes())
}

/// ACRCloud identify API client
pub struct AcrCloudClient {
    http_client: reqwest::Client,
    base_url: String,
    access_key: String,
    secret_key: String,
}

impl AcrCloudClient {
    pub fn new(
        base_url: impl Into<String>,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
        timeout: Duration,
    ) -> PipelineResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| PipelineError::ProviderUnavailable(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            access_key: access_key.into(),
            secret_key: secret_key.into(),
        })
    }

    pub fn from_config(config: &RecognitionConfig) -> Result<Self> {
        let (Some(access_key), Some(secret_key)) = (
            config.access_key.as_deref().filter(|k| !k.is_empty()),
            config.secret_key.as_deref().filter(|k| !k.is_empty()),
        ) else {
            bail!("ACRCloud access key and secret key are required (recognition.access_key / recognition.secret_key)");
        };

        Self::new(
            &config.base_url,
            access_key,
            secret_key,
            Duration::from_secs(config.timeout_secs),
        )
        .context("Failed to create ACRCloud client")
    }

    fn endpoint(&self) -> String {
        format!("{}{}", self.base_url, IDENTIFY_URI)
    }

    async fn build_form(&self, sample: &Path) -> PipelineResult<reqwest::multipart::Form> {
        let data = tokio::fs::read(sample).await.map_err(|e| {
            PipelineError::workspace(format!("Failed to read sample {}", sample.display()), e)
        })?;

        if data.len() as u64 > MAX_SAMPLE_BYTES {
            return Err(PipelineError::ProviderRejected {
                status: 413,
                body: format!(
                    "Sample {} is {} bytes, limit is {}",
                    sample.display(),
                    data.len(),
                    MAX_SAMPLE_BYTES
                ),
            });
        }

        let file_name = sample
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "sample".to_string());
        let sample_bytes = data.len();
        let timestamp = chrono::Utc::now().timestamp();
        let signature = sign_request(&self.secret_key, &self.access_key, timestamp);

        Ok(reqwest::multipart::Form::new()
            .part(
                "sample",
                reqwest::multipart::Part::bytes(data).file_name(file_name),
            )
            .text("sample_bytes", sample_bytes.to_string())
            .text("access_key", self.access_key.clone())
            .text("data_type", DATA_TYPE)
            .text("signature", signature)
            .text("signature_version", SIGNATURE_VERSION)
            .text("timestamp", timestamp.to_string()))
    }
}

#[async_trait]
impl RecognitionProvider for AcrCloudClient {
    async fn identify(&self, sample: &Path) -> PipelineResult<Vec<TrackMatch>> {
        let form = self.build_form(sample).await?;

        debug!(sample = %sample.display(), "Submitting sample to ACRCloud");

        let response = self
            .http_client
            .post(self.endpoint())
            .multipart(form)
            .send()
            .await
            .map_err(|e| PipelineError::ProviderUnavailable(e.to_string()))?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PipelineError::ProviderRejected {
                status: status.as_u16(),
                body,
            });
        }

        let body = response
            .text()
            .await
            .map_err(|e| PipelineError::ProviderUnavailable(e.to_string()))?;

        let matches: Vec<TrackMatch> = parse_identify_response(&body)?
            .into_iter()
            .map(TrackMatch::from)
            .collect();

        info!(
            sample = %sample.display(),
            matches = matches.len(),
            top_title = matches.first().map(|m| m.title.as_str()).unwrap_or(""),
            "ACRCloud identify complete"
        );

        Ok(matches)
    }

    fn name(&self) -> &str {
        "acrcloud"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn signature_matches_reference_vector() {
        assert_eq!(
            sign_request("test-secret", "test-access", 1_700_000_000),
            "aB7ZyF6EMW+azvtTtv1twFQOwas="
        );
    }

    #[test]
    fn endpoint_ignores_trailing_slash() {
        let client =
            AcrCloudClient::new("http://localhost:9000/", "a", "s", Duration::from_secs(1))
                .unwrap();
        assert_eq!(client.endpoint(), "http://localhost:9000/v1/identify");
    }
}
