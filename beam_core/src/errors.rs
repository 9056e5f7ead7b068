//! # Error Types
//!
//! Structured error types for beam_core. Errors fall into four categories:
//!
//! - **Configuration** - bad geometry, loads or references, rejected when a
//!   model is constructed so solver code can assume well-formed input
//! - **Query misuse** - bad span/member index, position outside the member,
//!   or querying a model before it has been solved
//! - **Numerical** - a system that could not be solved even by the
//!   least-squares fallback
//! - **I/O** - file and serialization failures
//!
//! Recoverable numerical conditions (ill-conditioned systems, Hardy Cross
//! non-convergence) are *not* errors; they are reported as
//! [`SolverWarning`](crate::calculations::SolverWarning)s on the result.
//!
//! ## Example
//!
//! ```rust
//! use beam_core::errors::{CalcError, CalcResult, ErrorCategory};
//!
//! fn validate_length(length: f64) -> CalcResult<()> {
//!     if length <= 0.0 {
//!         return Err(CalcError::invalid_input(
//!             "length",
//!             length.to_string(),
//!             "Span length must be positive",
//!         ));
//!     }
//!     Ok(())
//! }
//!
//! let err = validate_length(-2.0).unwrap_err();
//! assert_eq!(err.category(), ErrorCategory::Configuration);
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for beam_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for analysis operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, inconsistent, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A frame member references a joint (or similar) that does not exist
    #[error("Unknown {kind} reference: '{name}'")]
    UnknownReference { kind: String, name: String },

    /// A span, member or joint index is out of range
    #[error("{what} index {index} out of range (count {len})")]
    IndexOutOfRange {
        what: String,
        index: usize,
        len: usize,
    },

    /// A query position lies outside `[0, length]`
    #[error("Position {position} outside member of length {length}")]
    PositionOutOfRange { position: f64, length: f64 },

    /// Results were queried before a successful solve
    #[error("Model is not solved (state: {state})")]
    NotSolved { state: String },

    /// Calculation failed (singular beyond fallback, non-finite results)
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
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

/// Error taxonomy used by callers to decide how to react.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorCategory {
    /// Fatal input problem, fix the model and retry
    Configuration,
    /// Programmer error in how results are queried
    QueryMisuse,
    /// The numerical solve failed outright
    Numerical,
    /// File system or serialization problem
    Io,
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an UnknownReference error
    pub fn unknown_reference(kind: impl Into<String>, name: impl Into<String>) -> Self {
        CalcError::UnknownReference {
            kind: kind.into(),
            name: name.into(),
        }
    }

    /// Create an IndexOutOfRange error
    pub fn index_out_of_range(what: impl Into<String>, index: usize, len: usize) -> Self {
        CalcError::IndexOutOfRange {
            what: what.into(),
            index,
            len,
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(
        calculation_type: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(
        operation: impl Into<String>,
        path: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Which part of the taxonomy this error belongs to
    pub fn category(&self) -> ErrorCategory {
        match self {
            CalcError::InvalidInput { .. } | CalcError::UnknownReference { .. } => {
                ErrorCategory::Configuration
            }
            CalcError::IndexOutOfRange { .. }
            | CalcError::PositionOutOfRange { .. }
            | CalcError::NotSolved { .. } => ErrorCategory::QueryMisuse,
            CalcError::CalculationFailed { .. } => ErrorCategory::Numerical,
            CalcError::FileError { .. }
            | CalcError::SerializationError { .. }
            | CalcError::VersionMismatch { .. } => ErrorCategory::Io,
        }
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::UnknownReference { .. } => "UNKNOWN_REFERENCE",
            CalcError::IndexOutOfRange { .. } => "INDEX_OUT_OF_RANGE",
            CalcError::PositionOutOfRange { .. } => "POSITION_OUT_OF_RANGE",
            CalcError::NotSolved { .. } => "NOT_SOLVED",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
        }
    }
}

impl From<serde_json::Error> for CalcError {
    fn from(e: serde_json::Error) -> Self {
        CalcError::SerializationError {
            reason: e.to_string(),
        }
    }
}
