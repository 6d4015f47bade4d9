// src/analysis/mod.rs
// Remote analysis client: one multipart POST bundling the reference text and
// the transcoded MP3, one JSON response.

mod types;

pub use types::{AnalysisError, AnalysisResult, CostBreakdown};

use crate::config::Settings;
use crate::transcode::TranscodedAudio;
use async_trait::async_trait;
use reqwest::multipart;
use std::time::Duration;
use tracing::info;
use types::ErrorBody;

/// Seam for the analysis call so pipeline tests can stub the network.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn analyze(
        &self,
        reference_text: &str,
        audio: &TranscodedAudio,
    ) -> Result<AnalysisResult, AnalysisError>;

    fn name(&self) -> &str;
}

pub struct HttpAnalysisClient {
    endpoint: String,
    client: reqwest::Client,
}

impl HttpAnalysisClient {
    pub fn new(settings: &Settings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.http_timeout_secs))
            .build()
            .expect("Failed to create HTTP client");

        info!("Analysis client initialized: {}", settings.analyze_url);

        Self {
            endpoint: settings.analyze_url.clone(),
            client,
        }
    }
}

#[async_trait]
impl AnalysisBackend for HttpAnalysisClient {
    async fn analyze(
        &self,
        reference_text: &str,
        audio: &TranscodedAudio,
    ) -> Result<AnalysisResult, AnalysisError> {
        info!(
            "Submitting {} bytes of audio and {} chars of reference text",
            audio.bytes.len(),
            reference_text.len()
        );

        let file_part = multipart::Part::bytes(audio.bytes.clone())
            .file_name(audio.name.clone())
            .mime_str(&audio.mime_type)
            .map_err(|e| AnalysisError::Network(e.to_string()))?;

        let form = multipart::Form::new()
            .text("text", reference_text.to_string())
            .part("file", file_part);

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await;

        match response {
            Ok(resp) => {
                let status = resp.status();

                if status.is_success() {
                    resp.json::<AnalysisResult>()
                        .await
                        .map_err(|e| AnalysisError::InvalidResponse(e.to_string()))
                } else {
                    let body = resp.text().await.unwrap_or_default();
                    let message = serde_json::from_str::<ErrorBody>(&body)
                        .map(|b| b.error)
                        .unwrap_or_else(|_| format!("HTTP {}", status));
                    Err(AnalysisError::Remote(message))
                }
            }
            Err(e) => {
                if e.is_timeout() {
                    Err(AnalysisError::Timeout)
                } else {
                    Err(AnalysisError::Network(e.to_string()))
                }
            }
        }
    }

    fn name(&self) -> &str {
        "http"
    }
}
