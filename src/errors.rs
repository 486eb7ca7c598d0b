// src/errors.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which stage of a harness or test-case run failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionErrorKind {
    CompileError,
    RuntimeError,
    EngineError,
}

impl std::fmt::Display for ExecutionErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExecutionErrorKind::CompileError => write!(f, "compile error"),
            ExecutionErrorKind::RuntimeError => write!(f, "runtime error"),
            ExecutionErrorKind::EngineError => write!(f, "engine error"),
        }
    }
}

/// A failure of the submitted code itself, as opposed to a transport failure.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[error("{kind}: {message}")]
pub struct ExecutionError {
    pub kind: ExecutionErrorKind,
    pub message: String,
}

impl ExecutionError {
    pub fn compile(message: impl Into<String>) -> Self {
        Self { kind: ExecutionErrorKind::CompileError, message: message.into() }
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self { kind: ExecutionErrorKind::RuntimeError, message: message.into() }
    }

    pub fn engine(message: impl Into<String>) -> Self {
        Self { kind: ExecutionErrorKind::EngineError, message: message.into() }
    }
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API request failed with status {status}: {body}")]
    ApiError { status: u16, body: String },

    #[error("API returned an error: {0}")]
    ApiResponse(String),

    #[error("Unexpected response structure: {0}")]
    UnexpectedResponse(String),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("Run #{seq} finished after a newer run or a reset and was discarded")]
    StaleRun { seq: u64 },

    #[error("Another execution is still in flight")]
    Busy,

    #[error("Language '{0}' is not supported")]
    UnsupportedLanguage(String),

    #[error("Invalid request: {0}")]
    Validation(String),

    #[error("Session '{0}' not found")]
    SessionNotFound(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, RunnerError>;
