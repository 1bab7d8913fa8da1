//! Rate of change test.

use crate::models::QartodFlag;
use crate::utils::{mask_invalid, restore_shape, summarize_flags};
use ndarray::{Array, ArrayView, AsArray, Dimension};
use tracing::debug;

/// Checks the first difference of a series against a multiple of a standard
/// deviation.
///
/// The threshold is `deviation * num_deviations` (callers usually pass
/// [`DEFAULT_NUM_DEVIATIONS`](crate::constants::DEFAULT_NUM_DEVIATIONS)).
/// Steps `|x[i] - x[i-1]|` above it are SUSPECT; the first value has no
/// previous step and is never flagged. There is no FAIL tier. A value is
/// MISSING when it or the value before it is missing.
pub fn rate_of_change_test<'a, V, D>(
    inp: V,
    deviation: f64,
    num_deviations: f64,
) -> Array<QartodFlag, D>
where
    V: AsArray<'a, f64, D>,
    D: Dimension,
{
    let inp: ArrayView<'a, f64, D> = inp.into();
    let values = mask_invalid(&inp);
    let final_threshold = deviation * num_deviations;

    let flags: Vec<QartodFlag> = values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let diff = if i == 0 {
                value.map(|_| 0.0)
            } else {
                value.zip(values[i - 1]).map(|(v, prev)| (v - prev).abs())
            };
            match diff {
                None => QartodFlag::Missing,
                Some(d) if d > final_threshold => QartodFlag::Suspect,
                Some(_) => QartodFlag::Good,
            }
        })
        .collect();

    debug!(
        "rate_of_change_test: {} values, threshold {} -> {}",
        flags.len(),
        final_threshold,
        summarize_flags(&flags)
    );
    restore_shape(inp.raw_dim(), flags)
}
