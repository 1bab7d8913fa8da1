//! QARTOD quality-control tests.
//!
//! Each test takes raw measurement arrays of any shape plus its thresholds
//! and returns a flag array of the same shape. Tests are independent; the
//! [`aggregate`] module merges several of their results into one flag per
//! sample.
//!
//! # Example
//!
//! ```rust
//! use ndarray::array;
//! use qartod_qc::qartod::{gross_range_test, qartod_compare, spike_test};
//! use qartod_qc::QartodFlag;
//!
//! # fn example() -> qartod_qc::Result<()> {
//! let temps = array![10.0, 10.5, 45.0, 11.0, f64::NAN];
//!
//! let range = gross_range_test(&temps, (-5.0, 40.0), Some((0.0, 30.0)))?;
//! let spike = spike_test(&temps, (3.0, 8.0));
//! let overall = qartod_compare(&[range, spike])?;
//!
//! assert_eq!(overall[2], QartodFlag::Fail);
//! assert_eq!(overall[4], QartodFlag::Missing);
//! # Ok(())
//! # }
//! # example().unwrap();
//! ```

pub mod aggregate;
pub mod attenuated_signal;
pub mod climatology;
pub mod flat_line;
pub mod gross_range;
pub mod location;
pub mod rate_of_change;
pub mod spike;

pub use aggregate::qartod_compare;
pub use attenuated_signal::attenuated_signal_test;
pub use climatology::{ClimatologyConfig, ClimatologyWindow, climatology_test};
pub use flat_line::{flat_line_counts, flat_line_test};
pub use gross_range::gross_range_test;
pub use location::location_test;
pub use rate_of_change::rate_of_change_test;
pub use spike::spike_test;
