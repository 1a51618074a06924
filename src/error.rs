//! Error types.
//!
//! `AppError` is the run-level error returned to `main` (message + process exit code).
//! `FetchError` describes why a remote fetch failed; it never leaves the fetch
//! boundary, where it is logged and turned into an empty table.

use thiserror::Error;

/// Exit code for configuration and filesystem failures.
pub const EXIT_CONFIG: u8 = 2;
/// Exit code for input data that cannot be interpreted.
pub const EXIT_DATA: u8 = 3;

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::new(EXIT_CONFIG, message)
    }

    pub fn data(message: impl Into<String>) -> Self {
        Self::new(EXIT_DATA, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

/// Why an indicator fetch failed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("no indicators requested")]
    EmptyRequest,

    #[error("request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("server answered with status {0}")]
    Status(reqwest::StatusCode),

    /// The API understood the request and rejected it (unknown country/indicator code, ...).
    #[error("API error {id}: {message}")]
    Api { id: String, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(value: serde_json::Error) -> Self {
        FetchError::Malformed(value.to_string())
    }
}
