//! Error types for tldw operations.
//!
//! Two layers live here: [`ValidationError`], the per-document taxonomy the
//! summary validator reports, and [`TldwError`], the crate-level error that
//! also covers the store and source I/O around the pipeline.
//!
//! Splitting and normalizing never fail; every hard failure for a document
//! surfaces as a [`ValidationError`].
//!
//! # Example
//!
//! ```rust
//! use tldw_core::{ValidationError, extract_summary};
//!
//! match extract_summary("# SUMMARY\n\nOnly a summary.\n", "abc123") {
//!     Ok(summary) => println!("{}", summary.tldr),
//!     Err(ValidationError::MissingFields(fields)) => println!("missing {:?}", fields),
//!     Err(e) => println!("Error: {}", e),
//! }
//! ```

use std::path::PathBuf;
use thiserror::Error;

/// Reasons a candidate summary is rejected.
///
/// Each variant is fatal for the document it was raised for; batch callers
/// report it and move on to the next document.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The candidate is not a key/value mapping.
    #[error("summary must be an object, got {found}")]
    TypeMismatch { found: &'static str },

    /// One or more of `tldr`, `ideas`, `insights` is absent after repair.
    ///
    /// Field names are listed in schema order.
    #[error("summary missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// A required field is present but has the wrong shape or is empty.
    #[error("invalid field `{field}`: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

impl ValidationError {
    /// Short machine-friendly name of the failure kind.
    pub fn kind(&self) -> &'static str {
        match self {
            ValidationError::TypeMismatch { .. } => "TypeMismatch",
            ValidationError::MissingFields(_) => "MissingFields",
            ValidationError::InvalidField { .. } => "InvalidField",
        }
    }
}

/// Main error type for tldw operations.
#[derive(Error, Debug)]
pub enum TldwError {
    /// A candidate summary failed validation.
    #[error("Summary validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Malformed JSON in a summary file or the collection store.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// File not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Wraps standard I/O errors for file and process operations.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The collection store could not be located or has an unexpected layout.
    #[error("Store error: {0}")]
    StoreError(String),
}

/// Result type alias for TldwError.
pub type Result<T> = std::result::Result<T, TldwError>;
