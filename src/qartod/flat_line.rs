//! Flat line (stuck sensor) test.

use crate::error::{QcError, Result};
use crate::models::{QartodFlag, Span};
use crate::utils::{mask_invalid, restore_shape, summarize_flags};
use ndarray::{Array, ArrayView, AsArray, Dimension};
use tracing::debug;

/// Validate flat line counts that arrive as untyped numbers (e.g. from a
/// config file). Each count must be a positive integer.
pub fn flat_line_counts(counts: &[f64]) -> Result<Span<usize>> {
    let span = Span::from_slice("counts", counts)?;
    let integral = |c: f64| c.is_finite() && c.fract() == 0.0 && c >= 1.0;
    if !integral(span.minv) || !integral(span.maxv) {
        return Err(QcError::InvalidCounts {
            counts: counts.to_vec(),
        });
    }
    Ok(Span::new(span.minv as usize, span.maxv as usize))
}

/// Check for consecutively repeated values within a tolerance.
///
/// `counts` holds the two window sizes in either order; the smaller is the
/// SUSPECT window and the larger the FAIL window. A value is flagged when
/// each of the `W` values immediately before it differs from it by strictly
/// less than `tolerance`. Windows that reach before the start of the series
/// or contain a missing value never match. Missing values are MISSING.
///
/// With the default tolerance of 0 nothing is ever flagged.
///
/// # Errors
///
/// [`QcError::InvalidCounts`] when either count is zero.
pub fn flat_line_test<'a, V, D>(
    inp: V,
    counts: (usize, usize),
    tolerance: f64,
) -> Result<Array<QartodFlag, D>>
where
    V: AsArray<'a, f64, D>,
    D: Dimension,
{
    let counts = Span::from(counts);
    if counts.minv == 0 {
        return Err(QcError::InvalidCounts {
            counts: vec![counts.minv as f64, counts.maxv as f64],
        });
    }

    let inp: ArrayView<'a, f64, D> = inp.into();
    let values = mask_invalid(&inp);

    let flags: Vec<QartodFlag> = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let Some(current) = *value else {
                return QartodFlag::Missing;
            };
            let flat_for = |window: usize| {
                i >= window
                    && values[i - window..i]
                        .iter()
                        .all(|prior| prior.is_some_and(|p| (p - current).abs() < tolerance))
            };
            if flat_for(counts.maxv) {
                QartodFlag::Fail
            } else if flat_for(counts.minv) {
                QartodFlag::Suspect
            } else {
                QartodFlag::Good
            }
        })
        .collect();

    debug!(
        "flat_line_test: {} values, windows {}/{} -> {}",
        flags.len(),
        counts.minv,
        counts.maxv,
        summarize_flags(&flags)
    );
    Ok(restore_shape(inp.raw_dim(), flags))
}
