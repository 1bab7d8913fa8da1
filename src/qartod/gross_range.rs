//! Gross range test.

use crate::error::{QcError, Result};
use crate::models::{QartodFlag, Span};
use crate::utils::{mask_invalid, restore_shape, summarize_flags};
use ndarray::{Array, ArrayView, AsArray, Dimension};
use tracing::debug;

/// Checks that values are within reasonable range bounds.
///
/// Values strictly outside `fail_span` are FAIL. When `suspect_span` is
/// given, values strictly outside it (but inside `fail_span`) are SUSPECT.
/// Missing values are MISSING. Both spans may be given in either order.
///
/// # Errors
///
/// [`QcError::SpanContainment`] when `suspect_span` reaches beyond
/// `fail_span`.
pub fn gross_range_test<'a, V, D>(
    inp: V,
    fail_span: (f64, f64),
    suspect_span: Option<(f64, f64)>,
) -> Result<Array<QartodFlag, D>>
where
    V: AsArray<'a, f64, D>,
    D: Dimension,
{
    let sspan = Span::from(fail_span);
    let uspan = suspect_span.map(Span::from);
    if let Some(uspan) = uspan {
        if !sspan.encloses(&uspan) {
            return Err(QcError::SpanContainment {
                suspect_min: uspan.minv,
                suspect_max: uspan.maxv,
                fail_min: sspan.minv,
                fail_max: sspan.maxv,
            });
        }
    }

    let inp: ArrayView<'a, f64, D> = inp.into();
    let flags: Vec<QartodFlag> = mask_invalid(&inp)
        .into_iter()
        .map(|value| match value {
            None => QartodFlag::Missing,
            Some(v) if sspan.excludes(v) => QartodFlag::Fail,
            Some(v) if uspan.is_some_and(|u| u.excludes(v)) => QartodFlag::Suspect,
            Some(_) => QartodFlag::Good,
        })
        .collect();

    debug!(
        "gross_range_test: {} values -> {}",
        flags.len(),
        summarize_flags(&flags)
    );
    Ok(restore_shape(inp.raw_dim(), flags))
}
