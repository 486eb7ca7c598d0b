// src/progress.rs
use reqwest::Client;
use std::time::Instant;

use crate::errors::{Result, RunnerError};

/// Forwards video-progress updates to the learning-progress service.
#[derive(Clone)]
pub struct ProgressForwarder {
    client: Client,
    api_url: String,
}

impl ProgressForwarder {
    pub fn new(client: Client, api_url: impl Into<String>) -> Self {
        Self { client, api_url: api_url.into() }
    }

    /// Posts `body` upstream on behalf of the bearer of `token`.
    pub async fn forward(&self, token: &str, body: &serde_json::Value) -> Result<()> {
        let start = Instant::now();
        let resp = self
            .client
            .post(&self.api_url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?;

        let status = resp.status();
        log::info!(
            "Progress service response status: {} ({}ms)",
            status,
            start.elapsed().as_millis()
        );

        if !status.is_success() {
            let error_body = resp
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error body".to_string());
            return Err(RunnerError::ApiError {
                status: status.as_u16(),
                body: error_body,
            });
        }

        Ok(())
    }
}
