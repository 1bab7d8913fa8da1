//! Flag aggregation by precedence.

use crate::error::{QcError, Result};
use crate::models::QartodFlag;
use crate::utils::{check_same_shape, summarize_flags};
use ndarray::{Array1, ArrayBase, Data, Ix1};
use tracing::debug;

/// Aggregate several flag vectors into one by precedence.
///
/// Every position starts as MISSING. Precedence levels are applied in the
/// order MISSING, UNKNOWN, GOOD, SUSPECT, FAIL; wherever any vector holds
/// the current level, the result takes it. A FAIL in any vector is therefore
/// always FAIL in the output.
///
/// # Errors
///
/// [`QcError::EmptyInput`] when `vectors` is empty and
/// [`QcError::ShapeMismatch`] when the vectors differ in length.
pub fn qartod_compare<S>(vectors: &[ArrayBase<S, Ix1>]) -> Result<Array1<QartodFlag>>
where
    S: Data<Elem = QartodFlag>,
{
    let first = vectors
        .first()
        .ok_or_else(|| QcError::EmptyInput("no flag vectors to aggregate".to_string()))?;
    for (i, v) in vectors.iter().enumerate().skip(1) {
        check_same_shape("vector 0", first.shape(), &format!("vector {i}"), v.shape())?;
    }

    let mut result = Array1::from_elem(first.len(), QartodFlag::Missing);
    for level in QartodFlag::PRECEDENCE {
        for v in vectors {
            for (slot, &flag) in result.iter_mut().zip(v.iter()) {
                if flag == level {
                    *slot = level;
                }
            }
        }
    }

    debug!(
        "qartod_compare: {} vectors of {} -> {}",
        vectors.len(),
        result.len(),
        summarize_flags(result.iter())
    );
    Ok(result)
}
