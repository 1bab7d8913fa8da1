//! Spike test.

use crate::models::{QartodFlag, Span};
use crate::utils::{mask_invalid, restore_shape, summarize_flags};
use ndarray::{Array, ArrayView, AsArray, Dimension};
use tracing::debug;

/// Check for spikes by comparing each value with the midpoint of its
/// neighbours.
///
/// For an interior point the reference is `|(x[i-1] + x[i+1]) / 2|` and the
/// deviation is `|x[i] - reference|`. Deviations above the lower threshold
/// are SUSPECT and above the higher threshold FAIL. Thresholds are taken as
/// absolute values and may be given in either order.
///
/// The first and last points have no neighbour pair and use a reference of
/// 0, so their deviation is `|x|` and they are often flagged. Treat flags at
/// the ends of a series with suspicion.
///
/// A point is MISSING when it, or either neighbour used for its reference,
/// is missing.
pub fn spike_test<'a, V, D>(inp: V, thresholds: (f64, f64)) -> Array<QartodFlag, D>
where
    V: AsArray<'a, f64, D>,
    D: Dimension,
{
    let thresholds = Span::new(thresholds.0.abs(), thresholds.1.abs());
    let inp: ArrayView<'a, f64, D> = inp.into();
    let values = mask_invalid(&inp);
    let n = values.len();

    let flags: Vec<QartodFlag> = (0..n)
        .map(|i| {
            let reference = if i == 0 || i == n - 1 {
                Some(0.0)
            } else {
                values[i - 1]
                    .zip(values[i + 1])
                    .map(|(prev, next)| ((prev + next) / 2.0).abs())
            };
            let diff = values[i].zip(reference).map(|(v, r)| (v - r).abs());
            match diff {
                None => QartodFlag::Missing,
                Some(d) if d > thresholds.maxv => QartodFlag::Fail,
                Some(d) if d > thresholds.minv => QartodFlag::Suspect,
                Some(_) => QartodFlag::Good,
            }
        })
        .collect();

    debug!(
        "spike_test: {} values -> {}",
        flags.len(),
        summarize_flags(&flags)
    );
    restore_shape(inp.raw_dim(), flags)
}
