//! Error types.
//!
//! - `EngineError` is the library error: every fallible operation of the curve
//!   store, the fake-factor engine and the veto weighter returns it.
//! - `AppError` is what the `ff` binary reports: a message plus a process exit
//!   code (2 = configuration / I/O, 3 = unusable input, 4 = internal).

use std::path::PathBuf;

use thiserror::Error;

/// Library error.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Bad or incomplete configuration (missing curves, unknown working point, ...).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A curve name was never registered in the store.
    #[error("curve '{0}' not found")]
    CurveNotFound(String),

    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Caller-supplied values that cannot be interpreted.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl EngineError {
    pub fn config(message: impl Into<String>) -> Self {
        EngineError::Configuration(message.into())
    }
}

/// Library result alias.
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Clone)]
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

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<EngineError> for AppError {
    fn from(err: EngineError) -> Self {
        let exit_code = match err {
            EngineError::InvalidInput(_) => 3,
            EngineError::CurveNotFound(_) => 4,
            EngineError::Configuration(_) | EngineError::Io { .. } | EngineError::Json { .. } => 2,
        };
        AppError::new(exit_code, err.to_string())
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_errors_map_to_exit_codes() {
        let app: AppError = EngineError::config("missing curve").into();
        assert_eq!(app.exit_code(), 2);
        assert!(app.to_string().contains("missing curve"));

        let app: AppError = EngineError::InvalidInput("bad kin".to_string()).into();
        assert_eq!(app.exit_code(), 3);
    }
}
