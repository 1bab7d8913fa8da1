//! Error handling for QARTOD quality-control operations.
//!
//! Contract violations (shape mismatches, malformed spans, unknown check
//! types) are reported through [`QcError`]. Missing or non-finite data is
//! never an error; it resolves to the MISSING flag.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QcError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Shape mismatch: {left} {left_shape:?} and {right} {right_shape:?} are different shapes")]
    ShapeMismatch {
        left: String,
        left_shape: Vec<usize>,
        right: String,
        right_shape: Vec<usize>,
    },

    #[error("Invalid {name}: expected {expected} values, found {found}")]
    InvalidArity {
        name: String,
        expected: usize,
        found: usize,
    },

    #[error("Suspect span ({suspect_min}, {suspect_max}) may not exceed fail span ({fail_min}, {fail_max})")]
    SpanContainment {
        suspect_min: f64,
        suspect_max: f64,
        fail_min: f64,
        fail_max: f64,
    },

    #[error("Counts must be positive integers, got {counts:?}")]
    InvalidCounts { counts: Vec<f64> },

    #[error("Check type \"{0}\" is not defined")]
    InvalidCheckType(String),

    #[error("Unknown QARTOD flag code: {0}")]
    InvalidFlag(u8),

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Configuration file not found: {path}")]
    ConfigNotFound { path: PathBuf },
}

impl QcError {
    /// Create a shape mismatch error between two named inputs
    pub fn shape_mismatch(
        left: impl Into<String>,
        left_shape: &[usize],
        right: impl Into<String>,
        right_shape: &[usize],
    ) -> Self {
        Self::ShapeMismatch {
            left: left.into(),
            left_shape: left_shape.to_vec(),
            right: right.into(),
            right_shape: right_shape.to_vec(),
        }
    }

    /// Create an arity error for a fixed-length parameter
    pub fn invalid_arity(name: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::InvalidArity {
            name: name.into(),
            expected,
            found,
        }
    }

    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, QcError>;
