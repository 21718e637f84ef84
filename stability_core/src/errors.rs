//! # Error Types
//!
//! Structured error types for stability_core.
//!
//! The numerical engine itself never fails: degenerate inputs produce zero
//! results and rule violations are reported as validation issues or criteria
//! lines. These errors cover the layers around it: table construction,
//! project persistence, and service-level record checks.
//!
//! ## Example
//!
//! ```rust
//! use stability_core::errors::{StabilityError, StabResult};
//!
//! fn check_volume(volume_m3: f64) -> StabResult<()> {
//!     if volume_m3 < 0.0 {
//!         return Err(StabilityError::InvalidInput {
//!             field: "volume_m3".to_string(),
//!             value: volume_m3.to_string(),
//!             reason: "Volume cannot be negative".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for stability_core operations
pub type StabResult<T> = Result<T, StabilityError>;

/// Structured error type for everything outside the pure numerical core.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum StabilityError {
    /// An input value is invalid (out of range, negative volume, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// A named record (condition, tank, sheet) does not exist
    #[error("{kind} not found: {name}")]
    NotFound { kind: String, name: String },

    /// A KN, hydrostatic or sounding table is malformed
    #[error("Invalid table '{table}': {reason}")]
    InvalidTable { table: String, reason: String },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// File is locked by another user/process
    #[error("File locked: '{path}' is locked by {locked_by} since {locked_at}")]
    FileLocked {
        path: String,
        locked_by: String,
        locked_at: String,
    },

    /// JSON serialization/deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },
}

impl StabilityError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        StabilityError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        StabilityError::MissingField { field: field.into() }
    }

    /// Create a NotFound error
    pub fn not_found(kind: impl Into<String>, name: impl Into<String>) -> Self {
        StabilityError::NotFound {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an InvalidTable error
    pub fn invalid_table(table: impl Into<String>, reason: impl Into<String>) -> Self {
        StabilityError::InvalidTable {
            table: table.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        StabilityError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileLocked error
    pub fn file_locked(path: impl Into<String>, locked_by: impl Into<String>, locked_at: impl Into<String>) -> Self {
        StabilityError::FileLocked {
            path: path.into(),
            locked_by: locked_by.into(),
            locked_at: locked_at.into(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, StabilityError::FileLocked { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            StabilityError::InvalidInput { .. } => "INVALID_INPUT",
            StabilityError::MissingField { .. } => "MISSING_FIELD",
            StabilityError::NotFound { .. } => "NOT_FOUND",
            StabilityError::InvalidTable { .. } => "INVALID_TABLE",
            StabilityError::FileError { .. } => "FILE_ERROR",
            StabilityError::FileLocked { .. } => "FILE_LOCKED",
            StabilityError::SerializationError { .. } => "SERIALIZATION_ERROR",
            StabilityError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

impl From<serde_json::Error> for StabilityError {
    fn from(err: serde_json::Error) -> Self {
        StabilityError::SerializationError {
            reason: err.to_string(),
        }
    }
}
