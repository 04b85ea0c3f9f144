use crate::errors::AppError;
use crate::vision::types::RawAnalysis;
use async_trait::async_trait;
use log::{debug, info, warn};
use std::env;
use std::time::Duration;

pub const VISION_ENDPOINT_ENV: &str = "VISION_ENDPOINT";
pub const VISION_KEY_ENV: &str = "VISION_KEY";

/// One analyze round trip against the remote vision service. Injectable so
/// the worker and gateway can be exercised without network access.
#[async_trait]
pub trait VisionBackend: Send + Sync {
    async fn analyze(&self, jpeg: &[u8]) -> Result<RawAnalysis, AppError>;
}

/// Azure Computer Vision REST client (analyze v3.2). One request asks for
/// objects, tags and a description in a single round trip.
pub struct AzureVisionClient {
    http: reqwest::Client,
    endpoint: String,
    key: String,
}

impl AzureVisionClient {
    pub fn new(endpoint: String, key: String, request_timeout: Duration) -> Result<Self, AppError> {
        let http = reqwest::Client::builder()
            .timeout(request_timeout)
            .build()
            .map_err(|e| AppError::Vision(format!("Failed to build HTTP client: {}", e)))?;
        Ok(AzureVisionClient {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            key,
        })
    }

    /// Build a client from the `VISION_ENDPOINT` / `VISION_KEY` environment
    /// variables. Returns `None` when they are unset: analysis is then
    /// disabled for the whole process while streaming stays up.
    pub fn from_env(request_timeout: Duration) -> Result<Option<Self>, AppError> {
        match (env::var(VISION_ENDPOINT_ENV), env::var(VISION_KEY_ENV)) {
            (Ok(endpoint), Ok(key)) if !endpoint.is_empty() && !key.is_empty() => {
                info!("🔑 Vision client configured for {}", endpoint);
                Ok(Some(Self::new(endpoint, key, request_timeout)?))
            }
            _ => {
                warn!(
                    "⚠️ {} / {} not set. Analysis requests will be rejected; streaming is unaffected.",
                    VISION_ENDPOINT_ENV, VISION_KEY_ENV
                );
                Ok(None)
            }
        }
    }

    fn analyze_url(&self) -> String {
        format!(
            "{}/vision/v3.2/analyze?visualFeatures=Description,Tags,Objects",
            self.endpoint
        )
    }
}

#[async_trait]
impl VisionBackend for AzureVisionClient {
    async fn analyze(&self, jpeg: &[u8]) -> Result<RawAnalysis, AppError> {
        debug!("🔬 Submitting {} JPEG bytes for analysis.", jpeg.len());
        let response = self
            .http
            .post(self.analyze_url())
            .header("Ocp-Apim-Subscription-Key", &self.key)
            .header(reqwest::header::CONTENT_TYPE, "application/octet-stream")
            .body(jpeg.to_vec())
            .send()
            .await
            .map_err(|e| AppError::Vision(format!("Vision request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Vision(format!(
                "Vision API returned {}: {}",
                status, body
            )));
        }

        response
            .json::<RawAnalysis>()
            .await
            .map_err(|e| AppError::Vision(format!("Failed to parse vision response: {}", e)))
    }
}
