//! The typed application error the web layer consumes.
//!
//! Handlers raise an [`AppException`] carrying a structured code and a
//! message; the error middleware derives the response status line from the
//! code's status segment and includes the full code string in the body for
//! client-side programmatic handling.

use serde::Serialize;
use thiserror::Error;

use crate::code::AppErrorCode;

/// Result alias for operations that fail with an [`AppException`].
pub type AppResult<T> = Result<T, AppException>;

/// A business error with a structured code and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{message} ({code})")]
pub struct AppException {
    code: AppErrorCode,
    message: String,
}

impl AppException {
    /// Raise a flow-scoped error with its registered code.
    pub fn new(code: AppErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    /// Raise a generic error owned by no flow; the status alone is the
    /// signal.
    pub fn common(http_status: u16, message: impl Into<String>) -> Self {
        Self::new(AppErrorCode::common(http_status), message)
    }

    pub fn code(&self) -> AppErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Status for the response status line, taken from the code's status
    /// segment.
    pub fn http_status(&self) -> u16 {
        self.code.http_status()
    }
}
