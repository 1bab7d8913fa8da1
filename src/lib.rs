//! QARTOD Quality Control Library
//!
//! Quality-control tests for time-ordered oceanographic and geophysical
//! sensor measurements, following the QARTOD flagging scheme.
//!
//! This library provides:
//! - Flag aggregation by precedence across several tests
//! - Location, gross range, climatology, spike, rate of change, flat line
//!   and attenuated signal tests over arrays of any shape
//! - WGS84 geodesic distances for location step checks
//! - A JSON-configurable suite runner
//!
//! Missing data (NaN or infinite values) is never an error; it is flagged
//! MISSING. Contract violations such as mismatched shapes or malformed
//! thresholds fail fast with a [`QcError`].

pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod geodesy;
pub mod models;
pub mod qartod;
pub mod runner;
pub mod utils;

// Re-export commonly used types
pub use config::QcConfig;
pub use error::{QcError, Result};
pub use models::{BoundingBox, CheckType, QartodFlag, Span};
pub use runner::{QcResults, QcRunner, Series};
