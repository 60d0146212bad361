//! Error types for docsmith.
//!
//! Uses thiserror for derive macros and provides user-actionable error messages.
//! Rendering failures are ordinary `Err` values so callers can compose them;
//! only genuine I/O failures on the write path surface as `DocumentWriteFailure`.

use crate::exit_codes;
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for docsmith operations.
#[derive(Error, Debug)]
pub enum DocsmithError {
    /// No template with the given id is registered.
    #[error("template '{0}' not found")]
    TemplateNotFound(String),

    /// One or more required variables have neither a binding nor a default.
    ///
    /// Lists every missing name, in declaration order.
    #[error("missing required variables: {}", .0.join(", "))]
    MissingRequiredVariables(Vec<String>),

    /// The updated document could not be persisted.
    #[error("failed to write document '{}': {source}", path.display())]
    DocumentWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// User provided invalid arguments or the workspace is in an invalid state.
    #[error("{0}")]
    UserError(String),

    /// A document lock is held by another process.
    #[error("Lock acquisition failed: {0}")]
    LockError(String),
}

impl DocsmithError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            DocsmithError::TemplateNotFound(_) => exit_codes::TEMPLATE_FAILURE,
            DocsmithError::MissingRequiredVariables(_) => exit_codes::TEMPLATE_FAILURE,
            DocsmithError::DocumentWriteFailure { .. } => exit_codes::WRITE_FAILURE,
            DocsmithError::UserError(_) => exit_codes::USER_ERROR,
            DocsmithError::LockError(_) => exit_codes::LOCK_FAILURE,
        }
    }

    pub(crate) fn write_failure(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        DocsmithError::DocumentWriteFailure {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for docsmith operations.
pub type Result<T> = std::result::Result<T, DocsmithError>;
