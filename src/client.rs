// src/client.rs
use reqwest::{Client, Response};
use serde::Serialize;

use crate::errors::{Result, RunnerError};
use crate::models::{ApiError, ExecuteTestCaseRequest, ExecuteTestCaseResponse, TestCaseOutcome};

/// Client for the runner's own HTTP API.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self { client, base_url: base_url.into() }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// `POST /api/execute-test-case`, returning the response's `data`.
    pub async fn execute_test_case(&self, request: &ExecuteTestCaseRequest) -> Result<TestCaseOutcome> {
        let resp = self.post(&self.url("/api/execute-test-case"), request, None).await?;
        let text = resp.text().await?;
        let body: ExecuteTestCaseResponse = serde_json::from_str(&text)
            .map_err(|e| RunnerError::UnexpectedResponse(format!("execute-test-case: {}", e)))?;
        Ok(body.data)
    }

    /// `POST /api/save-video-progress` with a bearer token.
    pub async fn save_video_progress(&self, token: &str, progress: &serde_json::Value) -> Result<()> {
        self.post(&self.url("/api/save-video-progress"), progress, Some(token)).await?;
        Ok(())
    }

    async fn post<B: Serialize + ?Sized>(&self, url: &str, body: &B, token: Option<&str>) -> Result<Response> {
        let mut builder = self.client.post(url).json(body);
        if let Some(token) = token {
            builder = builder.bearer_auth(token);
        }
        let resp = builder.send().await?;

        let status = resp.status();
        log::debug!("POST {} -> {}", url, status);
        if status.is_success() {
            return Ok(resp);
        }

        let error_body = resp
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error body".to_string());
        // Server errors are shaped `{message}`; anything else is passed on raw.
        match serde_json::from_str::<ApiError>(&error_body) {
            Ok(api_error) => Err(RunnerError::ApiResponse(api_error.message)),
            Err(_) => Err(RunnerError::ApiError {
                status: status.as_u16(),
                body: error_body,
            }),
        }
    }
}
