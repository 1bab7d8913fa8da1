//! Shared helpers for the QARTOD tests
//!
//! Every test flattens its input to a row-major sequence of optional values,
//! computes flags over that sequence, and restores the original shape on the
//! way out.

use crate::error::{QcError, Result};
use crate::models::QartodFlag;
use ndarray::{Array, ArrayView, Dimension};

/// Fail with an arity error unless `found == expected`
pub fn check_fixed_length(name: &str, found: usize, expected: usize) -> Result<()> {
    if found != expected {
        return Err(QcError::invalid_arity(name, expected, found));
    }
    Ok(())
}

/// A value is missing when it is NaN or infinite
pub fn is_missing(value: f64) -> bool {
    !value.is_finite()
}

/// Flatten a view into a sequence where missing values are `None`
pub fn mask_invalid<D: Dimension>(view: &ArrayView<'_, f64, D>) -> Vec<Option<f64>> {
    view.iter()
        .map(|&v| if is_missing(v) { None } else { Some(v) })
        .collect()
}

/// Fail with a shape mismatch unless both shapes are identical
pub fn check_same_shape(
    left: &str,
    left_shape: &[usize],
    right: &str,
    right_shape: &[usize],
) -> Result<()> {
    if left_shape != right_shape {
        return Err(QcError::shape_mismatch(left, left_shape, right, right_shape));
    }
    Ok(())
}

/// Rebuild a flag array of dimension `dim` from flags in row-major order
pub fn restore_shape<D: Dimension>(dim: D, flags: Vec<QartodFlag>) -> Array<QartodFlag, D> {
    let mut out = Array::from_elem(dim, QartodFlag::Good);
    for (slot, flag) in out.iter_mut().zip(flags) {
        *slot = flag;
    }
    out
}

/// Count how many of each flag appear, in precedence order
pub fn flag_counts<'a>(flags: impl IntoIterator<Item = &'a QartodFlag>) -> [usize; 5] {
    let mut counts = [0usize; 5];
    for flag in flags {
        counts[flag.precedence()] += 1;
    }
    counts
}

/// Render flag counts for log messages
pub fn summarize_flags<'a>(flags: impl IntoIterator<Item = &'a QartodFlag>) -> String {
    let counts = flag_counts(flags);
    QartodFlag::PRECEDENCE
        .iter()
        .zip(counts)
        .filter(|(_, count)| *count > 0)
        .map(|(flag, count)| format!("{}={}", flag, count))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_check_fixed_length() {
        assert!(check_fixed_length("counts", 2, 2).is_ok());
        assert!(check_fixed_length("counts", 1, 2).is_err());
    }

    #[test]
    fn test_mask_invalid() {
        let data = array![1.0, f64::NAN, f64::INFINITY, -2.5];
        assert_eq!(
            mask_invalid(&data.view()),
            vec![Some(1.0), None, None, Some(-2.5)]
        );
    }

    #[test]
    fn test_restore_shape_row_major() {
        let data = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
        let flags = vec![
            QartodFlag::Good,
            QartodFlag::Suspect,
            QartodFlag::Good,
            QartodFlag::Fail,
            QartodFlag::Good,
            QartodFlag::Missing,
        ];
        let out = restore_shape(data.raw_dim(), flags);
        assert_eq!(out.shape(), &[2, 3]);
        assert_eq!(out[[0, 1]], QartodFlag::Suspect);
        assert_eq!(out[[1, 0]], QartodFlag::Fail);
        assert_eq!(out[[1, 2]], QartodFlag::Missing);
    }

    #[test]
    fn test_summarize_flags() {
        let flags = [QartodFlag::Good, QartodFlag::Good, QartodFlag::Fail];
        assert_eq!(summarize_flags(&flags), "GOOD=2 FAIL=1");
    }
}
