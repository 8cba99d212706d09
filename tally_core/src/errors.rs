//! # Error Types
//!
//! Structured error types for tally_core. The engine deliberately reserves
//! errors for programmer and boundary faults (unknown unit text, storage
//! faults, schema drift). Malformed *business* input — an unknown material
//! name, a price that does not resolve to a number — is never an error:
//! those cases degrade to "leave field as-is / total reads as zero" because
//! this is editable form state that must never crash the host.
//!
//! ## Example
//!
//! ```rust
//! use tally_core::errors::{TallyError, TallyResult};
//!
//! fn parse_unit_code(code: &str) -> TallyResult<()> {
//!     if code.is_empty() {
//!         return Err(TallyError::unknown_unit(code));
//!     }
//!     Ok(())
//! }
//! ```

use std::fmt::Display;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for tally_core operations
pub type TallyResult<T> = Result<T, TallyError>;

/// Structured error type for tally operations.
///
/// Each variant provides specific context about what went wrong,
/// enabling programmatic handling by the hosting application.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum TallyError {
    /// A unit code outside the five-member enumeration was passed in
    /// from external text (CLI input, hand-edited sheet file)
    #[error("Unknown unit: '{unit}' (expected pound, net_ton, kilogram, metric_ton, or each)")]
    UnknownUnit { unit: String },

    /// A weight-mode code outside {scale, price} was passed in
    #[error("Unknown weight mode: '{mode}' (expected scale or price)")]
    UnknownWeightMode { mode: String },

    /// An input value is invalid (out of range, wrong type, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// An underlying filesystem operation failed
    #[error("I/O failure on '{path}': {detail}")]
    Io { path: String, detail: String },

    /// Another session already has this sheet checked out for editing
    #[error("Sheet '{reference}' is checked out by another session")]
    SheetInUse { reference: String },

    /// The file exists but does not parse as a sheet
    #[error("Sheet file '{path}' is malformed: {detail}")]
    MalformedSheet { path: String, detail: String },

    /// The sheet was written by an incompatible schema revision
    #[error("Sheet schema {found} is not readable by this build (supports {supported})")]
    VersionMismatch { found: String, supported: String },

    /// JSON encoding of a sheet failed (should be rare)
    #[error("Serialization error: {detail}")]
    Serialization { detail: String },
}

impl TallyError {
    /// Create an UnknownUnit error
    pub fn unknown_unit(unit: impl Into<String>) -> Self {
        TallyError::UnknownUnit { unit: unit.into() }
    }

    /// Create an UnknownWeightMode error
    pub fn unknown_weight_mode(mode: impl Into<String>) -> Self {
        TallyError::UnknownWeightMode { mode: mode.into() }
    }

    /// Create an InvalidInput error
    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        TallyError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create an Io error from a path and the underlying failure
    pub fn io(path: &Path, err: impl Display) -> Self {
        TallyError::Io {
            path: path.display().to_string(),
            detail: err.to_string(),
        }
    }

    /// Create a SheetInUse error
    pub fn sheet_in_use(reference: impl Into<String>) -> Self {
        TallyError::SheetInUse {
            reference: reference.into(),
        }
    }

    /// Create a MalformedSheet error from a path and the parse failure
    pub fn malformed_sheet(path: &Path, err: impl Display) -> Self {
        TallyError::MalformedSheet {
            path: path.display().to_string(),
            detail: err.to_string(),
        }
    }

    /// Check if this is a recoverable error (e.g., can retry)
    pub fn is_recoverable(&self) -> bool {
        matches!(self, TallyError::SheetInUse { .. })
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            TallyError::UnknownUnit { .. } => "UNKNOWN_UNIT",
            TallyError::UnknownWeightMode { .. } => "UNKNOWN_WEIGHT_MODE",
            TallyError::InvalidInput { .. } => "INVALID_INPUT",
            TallyError::Io { .. } => "IO",
            TallyError::SheetInUse { .. } => "SHEET_IN_USE",
            TallyError::MalformedSheet { .. } => "MALFORMED_SHEET",
            TallyError::VersionMismatch { .. } => "VERSION_MISMATCH",
            TallyError::Serialization { .. } => "SERIALIZATION",
        }
    }
}
