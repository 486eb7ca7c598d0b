// src/judge/local.rs

use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;

use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::errors::{Result, RunnerError};
use crate::judge::CodeJudge;
use crate::models::{ExecuteCodeRequest, ExecuteCodeResponse, RunOutput};

/// Runs JavaScript with a `node` binary on this machine.
///
/// Meant for development and CI where the public judge is unreachable. The
/// process is killed once `timeout` elapses and reported the way Piston reports
/// it: no exit code and `SIGKILL` as the signal.
pub struct LocalNodeJudge {
    node_binary: String,
    timeout: Duration,
}

impl LocalNodeJudge {
    pub fn new(node_binary: impl Into<String>, timeout: Duration) -> Self {
        Self { node_binary: node_binary.into(), timeout }
    }

    async fn run_script(&self, script: &PathBuf, stdin_data: &str) -> Result<RunOutput> {
        let mut proc = Command::new(&self.node_binary)
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()?;

        let mut stdin = proc
            .stdin
            .take()
            .ok_or_else(|| RunnerError::UnexpectedResponse("Failed to open stdin".to_string()))?;
        let mut stdout = proc
            .stdout
            .take()
            .ok_or_else(|| RunnerError::UnexpectedResponse("Failed to open stdout".to_string()))?;
        let mut stderr = proc
            .stderr
            .take()
            .ok_or_else(|| RunnerError::UnexpectedResponse("Failed to open stderr".to_string()))?;

        // Fed alongside the readers: a child blocked on a full stdout pipe
        // would otherwise never drain its stdin.
        let feed = async move {
            match stdin.write_all(stdin_data.as_bytes()).await {
                Err(e) if e.kind() == std::io::ErrorKind::BrokenPipe => Ok(()),
                other => other,
            }
        };

        let mut stdout_buf = Vec::new();
        let mut stderr_buf = Vec::new();

        let res = tokio::time::timeout(self.timeout, async {
            tokio::try_join!(
                feed,
                tokio::io::copy(&mut stdout, &mut stdout_buf),
                tokio::io::copy(&mut stderr, &mut stderr_buf),
                proc.wait()
            )
        })
        .await;

        let (code, signal) = match res {
            Err(_) => {
                proc.kill()
                    .await
                    .unwrap_or_else(|e| log::warn!("Failed to kill timed out node process: {}", e));
                log::warn!("Local judge killed a run after {}ms", self.timeout.as_millis());
                (None, Some("SIGKILL".to_string()))
            }
            Ok(Err(e)) => return Err(e.into()),
            Ok(Ok((_, _, _, status))) => (status.code(), None),
        };

        let stdout = String::from_utf8_lossy(&stdout_buf).into_owned();
        let stderr = String::from_utf8_lossy(&stderr_buf).into_owned();
        let output = format!("{}{}", stdout, stderr);

        Ok(RunOutput { stdout, stderr, code, signal, output })
    }
}

#[async_trait::async_trait]
impl CodeJudge for LocalNodeJudge {
    fn name(&self) -> &'static str {
        "local-node"
    }

    async fn execute(&self, request: &ExecuteCodeRequest) -> Result<ExecuteCodeResponse> {
        if !matches!(request.language.as_str(), "javascript" | "js" | "node") {
            return Err(RunnerError::UnsupportedLanguage(request.language.clone()));
        }

        let script = std::env::temp_dir().join(format!("coursemely-{}.js", uuid::Uuid::new_v4()));
        tokio::fs::write(&script, &request.source).await?;

        log::debug!("Running {} with {}", script.display(), self.node_binary);
        let run = self.run_script(&script, &request.stdin).await;

        if let Err(e) = tokio::fs::remove_file(&script).await {
            log::warn!("Failed to remove {}: {}", script.display(), e);
        }

        Ok(ExecuteCodeResponse {
            run: run?,
            language: request.language.clone(),
            version: request.version.clone(),
        })
    }
}

/// True when a `node` binary is on `PATH`; tests that need one skip otherwise.
#[cfg(test)]
pub(crate) fn node_available() -> bool {
    std::process::Command::new("node")
        .arg("--version")
        .output()
        .is_ok_and(|out| out.status.success())
}
