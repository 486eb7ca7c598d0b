// src/judge/piston.rs

use reqwest::Client;
use serde::Serialize;
use std::time::Instant;

use crate::errors::{Result, RunnerError};
use crate::judge::CodeJudge;
use crate::models::{ExecuteCodeRequest, ExecuteCodeResponse};

/// Client for the public Piston execution API.
pub struct PistonJudge {
    client: Client,
    api_base: String,
}

#[derive(Serialize)]
struct PistonRequest<'a> {
    language: &'a str,
    version: &'a str,
    files: Vec<PistonFile<'a>>,
    stdin: &'a str,
}

#[derive(Serialize)]
struct PistonFile<'a> {
    content: &'a str,
}

impl PistonJudge {
    /// Creates a new `PistonJudge` rooted at `api_base`, e.g. `https://emkc.org/api/v2/piston`.
    pub fn new(client: Client, api_base: impl Into<String>) -> Self {
        Self { client, api_base: api_base.into() }
    }

    fn execute_url(&self) -> String {
        format!("{}/execute", self.api_base.trim_end_matches('/'))
    }
}

#[async_trait::async_trait]
impl CodeJudge for PistonJudge {
    fn name(&self) -> &'static str {
        "piston"
    }

    async fn execute(&self, request: &ExecuteCodeRequest) -> Result<ExecuteCodeResponse> {
        let url = self.execute_url();

        log::debug!("Calling Piston: {} ({} {})", url, request.language, request.version);

        let body = PistonRequest {
            language: &request.language,
            version: &request.version,
            files: vec![PistonFile { content: &request.source }],
            stdin: &request.stdin,
        };

        let start = Instant::now();

        let resp = self.client.post(&url).json(&body).send().await?;

        let status = resp.status();
        let latency_ms = start.elapsed().as_millis() as u64;

        log::info!("Piston response status: {} ({}ms)", status, latency_ms);

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

        let text = resp.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| RunnerError::UnexpectedResponse(format!("Piston: {}", e)))
    }
}
