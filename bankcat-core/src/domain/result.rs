//! Result and error types for the core library

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Core library error type
///
/// Every variant is local to the user action that triggered it; none of
/// them leave the session in an unusable state.
#[derive(Error, Debug)]
pub enum Error {
    /// The bank / file type selection has no profile
    #[error("Unsupported profile: no mapping for bank '{bank}' with file type '{file_type}'")]
    UnsupportedProfile { bank: String, file_type: String },

    /// Uploaded file does not match the selected file type
    #[error("Invalid file type: expected '{expected}', got '{actual}'")]
    InvalidFileType { expected: String, actual: String },

    /// File type is accepted by the picker but cannot be processed
    #[error("Unsupported file format: {0} statements cannot be processed yet")]
    UnsupportedFormat(String),

    /// CSV could not be parsed
    #[error("Malformed input: {0}")]
    MalformedInput(String),

    /// Categorization service call failed
    #[error("Categorization failed: {0}")]
    Categorization(String),

    /// Categorization service returned records that don't line up with the request
    #[error("Categorization result does not match request: {0}")]
    CategorizationMismatch(String),

    #[error("No statement uploaded")]
    NoUpload,

    #[error("Bank and file type must be selected")]
    NoSelection,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a malformed input error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput(msg.into())
    }

    /// Create a categorization error
    pub fn categorization(msg: impl Into<String>) -> Self {
        Self::Categorization(msg.into())
    }

    /// Stable short name, used as the event name suffix in the event log
    pub fn kind(&self) -> &'static str {
        match self {
            Error::UnsupportedProfile { .. } => "unsupported_profile",
            Error::InvalidFileType { .. } => "invalid_file_type",
            Error::UnsupportedFormat(_) => "unsupported_format",
            Error::MalformedInput(_) => "malformed_input",
            Error::Categorization(_) => "categorization_failure",
            Error::CategorizationMismatch(_) => "categorization_mismatch",
            Error::NoUpload => "no_upload",
            Error::NoSelection => "no_selection",
            Error::Config(_) => "config",
            Error::Io(_) => "io",
            Error::Json(_) => "json",
        }
    }
}

/// Core library result type
pub type Result<T> = std::result::Result<T, Error>;

/// Operation result with optional context (for JSON output)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationResult<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
    pub context: Option<HashMap<String, serde_json::Value>>,
}

impl<T> OperationResult<T> {
    /// Create a successful result
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: None,
        }
    }

    /// Create a successful result with context
    pub fn ok_with_context(data: T, context: HashMap<String, serde_json::Value>) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            context: Some(context),
        }
    }

    /// Create a failed result
    pub fn fail(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            context: None,
        }
    }
}

impl<T> From<Result<T>> for OperationResult<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(data) => Self::ok(data),
            Err(e) => Self::fail(e.to_string()),
        }
    }
}
