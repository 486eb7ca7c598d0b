// src/judge/scripted.rs

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::errors::{Result, RunnerError};
use crate::judge::CodeJudge;
use crate::models::{ExecuteCodeRequest, ExecuteCodeResponse, RunOutput};

/// A judge that answers from a queue of canned outputs and records what it was asked.
#[derive(Default)]
pub struct ScriptedJudge {
    replies: Mutex<VecDeque<Result<RunOutput>>>,
    requests: Mutex<Vec<ExecuteCodeRequest>>,
}

impl ScriptedJudge {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a successful run printing `stdout` and exiting with `code`.
    pub fn push_stdout(&self, stdout: impl Into<String>, code: i32) -> &Self {
        let stdout = stdout.into();
        self.push(Ok(RunOutput {
            output: stdout.clone(),
            stdout,
            stderr: String::new(),
            code: Some(code),
            signal: None,
        }))
    }

    pub fn push(&self, reply: Result<RunOutput>) -> &Self {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply);
        }
        self
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ExecuteCodeRequest> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl CodeJudge for ScriptedJudge {
    fn name(&self) -> &'static str {
        "scripted"
    }

    async fn execute(&self, request: &ExecuteCodeRequest) -> Result<ExecuteCodeResponse> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let reply = self
            .replies
            .lock()
            .ok()
            .and_then(|mut replies| replies.pop_front())
            .ok_or_else(|| RunnerError::UnexpectedResponse("scripted judge has no replies left".to_string()))?;

        Ok(ExecuteCodeResponse {
            run: reply?,
            language: request.language.clone(),
            version: request.version.clone(),
        })
    }
}
