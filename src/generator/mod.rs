pub mod dto;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{info, warn};

use crate::error::AppError;

pub use dto::{GenerateRequest, GenerateResponse};

/// External schedule generator. Its output is advisory: every candidate is
/// re-checked before it is stored.
#[async_trait]
pub trait TimetableGenerator: Send + Sync {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, AppError>;
}

#[derive(Clone, Debug)]
pub struct GeneratorConfig {
    pub url: String,
    pub timeout: Duration,
}

pub struct HttpGenerator {
    client: Client,
    config: GeneratorConfig,
}

impl HttpGenerator {
    pub fn new(config: GeneratorConfig) -> Result<Self, AppError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AppError::Network(format!("Failed to build http client: {}", e)))?;
        Ok(Self { client, config })
    }
}

#[async_trait]
impl TimetableGenerator for HttpGenerator {
    async fn generate(&self, request: &GenerateRequest) -> Result<GenerateResponse, AppError> {
        info!(
            "Requesting schedule from {} ({} existing entries)",
            self.config.url,
            request.existing_entries.len()
        );

        let response = self.client.post(&self.config.url).json(request).send().await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("Generator returned {}: {}", status, body);
            return Err(AppError::Generator(format!("generator returned {}: {}", status, body)));
        }

        serde_json::from_str::<GenerateResponse>(&body).map_err(|e| {
            tracing::error!("Failed to parse generator response: {}", e);
            AppError::Generator(format!("Failed to parse generator response: {}", e))
        })
    }
}

/// Used when no generator is configured: succeeds with nothing to add.
pub struct NoopGenerator;

#[async_trait]
impl TimetableGenerator for NoopGenerator {
    async fn generate(&self, _request: &GenerateRequest) -> Result<GenerateResponse, AppError> {
        Ok(GenerateResponse::Success { schedule: Vec::new() })
    }
}
