// src/judge/mod.rs

use std::sync::Arc;

use crate::config::{JudgeBackend, JudgeConfig};
use crate::errors::Result;
use crate::models::{ExecuteCodeRequest, ExecuteCodeResponse};

pub mod local;
pub mod piston;
pub mod scripted;

pub use local::LocalNodeJudge;
pub use piston::PistonJudge;
pub use scripted::ScriptedJudge;

/// A sandboxed service that compiles and runs submitted source.
///
/// Every judge maps one request to exactly one response; nothing is retried and
/// re-submitting a request runs the program again.
#[async_trait::async_trait]
pub trait CodeJudge: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Runs `request.source` and returns the captured output.
    ///
    /// A program that compiles and exits non-zero is still `Ok`; only transport,
    /// protocol and sandbox failures are errors.
    async fn execute(&self, request: &ExecuteCodeRequest) -> Result<ExecuteCodeResponse>;
}

/// Builds the judge selected by configuration.
pub fn from_config(config: &JudgeConfig, client: reqwest::Client) -> Arc<dyn CodeJudge> {
    match config.backend {
        JudgeBackend::Piston => Arc::new(PistonJudge::new(client, config.piston_api_base.clone())),
        JudgeBackend::Local => Arc::new(LocalNodeJudge::new(
            config.node_binary.clone(),
            std::time::Duration::from_millis(config.timeout_ms),
        )),
    }
}
