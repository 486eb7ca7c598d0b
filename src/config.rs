// src/config.rs
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use crate::errors::{Result, RunnerError};

pub const DEFAULT_PISTON_API_BASE: &str = "https://emkc.org/api/v2/piston";

/// Which judge runs submitted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JudgeBackend {
    Piston,
    Local,
}

impl std::str::FromStr for JudgeBackend {
    type Err = RunnerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "piston" => Ok(JudgeBackend::Piston),
            "local" => Ok(JudgeBackend::Local),
            other => Err(RunnerError::Config(format!(
                "Unknown judge backend '{}'. Expected 'piston' or 'local'.",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Allowed CORS origin; permissive when unset.
    pub cors_allowed_origin: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            cors_allowed_origin: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    pub backend: JudgeBackend,
    pub piston_api_base: String,
    pub node_binary: String,
    /// Wall-clock limit for the local backend.
    pub timeout_ms: u64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            backend: JudgeBackend::Piston,
            piston_api_base: DEFAULT_PISTON_API_BASE.to_string(),
            node_binary: "node".to_string(),
            timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub language: String,
    pub version: String,
    /// Pause before each harness run so the UI can show progress.
    pub delay_ms: u64,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            language: "javascript".to_string(),
            version: "18.15.0".to_string(),
            delay_ms: 1000,
        }
    }
}

impl HarnessConfig {
    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// Upstream learning-progress endpoint; saving progress is disabled when unset.
    pub api_url: Option<String>,
}

/// High-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub judge: JudgeConfig,
    pub harness: HarnessConfig,
    pub progress: ProgressConfig,
}

impl AppConfig {
    /// Load configuration from an optional TOML file (`RUNNER_CONFIG`) and then
    /// apply environment overrides.
    pub fn from_env() -> Result<Self> {
        let mut config = match std::env::var("RUNNER_CONFIG") {
            Ok(path) => Self::from_toml_file(path)?,
            Err(_) => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(text)?;
        Ok(config)
    }

    fn apply_env(&mut self, var: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(host) = var("RUNNER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("RUNNER_PORT") {
            self.server.port = parse_number("RUNNER_PORT", &port)?;
        }
        if let Some(origin) = var("CORS_ALLOWED_ORIGIN") {
            self.server.cors_allowed_origin = Some(origin);
        }
        if let Some(backend) = var("JUDGE_BACKEND") {
            self.judge.backend = backend.parse()?;
        }
        if let Some(base) = var("PISTON_API_BASE") {
            self.judge.piston_api_base = base;
        }
        if let Some(node) = var("NODE_BINARY") {
            self.judge.node_binary = node;
        }
        if let Some(timeout) = var("JUDGE_TIMEOUT_MS") {
            self.judge.timeout_ms = parse_number("JUDGE_TIMEOUT_MS", &timeout)?;
        }
        if let Some(language) = var("HARNESS_LANGUAGE") {
            self.harness.language = language;
        }
        if let Some(version) = var("HARNESS_VERSION") {
            self.harness.version = version;
        }
        if let Some(delay) = var("HARNESS_DELAY_MS") {
            self.harness.delay_ms = parse_number("HARNESS_DELAY_MS", &delay)?;
        }
        if let Some(url) = var("PROGRESS_API_URL") {
            self.progress.api_url = Some(url).filter(|u| !u.trim().is_empty());
        }
        Ok(())
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| RunnerError::Config(format!("{} must be a number, got '{}'", key, value)))
}
