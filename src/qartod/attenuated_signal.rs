//! Attenuated signal test.

use crate::models::{CheckType, QartodFlag, Span};
use crate::utils::{mask_invalid, restore_shape, summarize_flags};
use ndarray::{Array, ArrayView, AsArray, Dimension};
use tracing::debug;

/// Check for near-flat-line conditions using a range or standard deviation.
///
/// One statistic is computed over all non-missing values, either the
/// population standard deviation or the peak-to-peak range, and every
/// value receives the same verdict. Below the smaller threshold the series
/// is FAIL; below the larger it is SUSPECT; otherwise GOOD. Missing values
/// are MISSING regardless of the verdict.
pub fn attenuated_signal_test<'a, V, D>(
    inp: V,
    threshold: (f64, f64),
    check_type: CheckType,
) -> Array<QartodFlag, D>
where
    V: AsArray<'a, f64, D>,
    D: Dimension,
{
    let threshold = Span::from(threshold);
    let inp: ArrayView<'a, f64, D> = inp.into();
    let values = mask_invalid(&inp);
    let present: Vec<f64> = values.iter().flatten().copied().collect();

    let check_val = match check_type {
        CheckType::Std => population_std(&present),
        CheckType::Range => peak_to_peak(&present),
    };

    let verdict = match check_val {
        Some(v) if v < threshold.minv => QartodFlag::Fail,
        Some(v) if v < threshold.maxv => QartodFlag::Suspect,
        _ => QartodFlag::Good,
    };

    let flags: Vec<QartodFlag> = values
        .iter()
        .map(|v| if v.is_some() { verdict } else { QartodFlag::Missing })
        .collect();

    debug!(
        "attenuated_signal_test: {} of {} = {:?} -> {}",
        check_type,
        present.len(),
        check_val,
        summarize_flags(&flags)
    );
    restore_shape(inp.raw_dim(), flags)
}

fn population_std(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some(variance.sqrt())
}

fn peak_to_peak(values: &[f64]) -> Option<f64> {
    let min = values.iter().copied().reduce(f64::min)?;
    let max = values.iter().copied().reduce(f64::max)?;
    Some(max - min)
}
