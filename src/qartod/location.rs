//! Location bounds and step distance test.

use crate::error::Result;
use crate::geodesy::great_circle_distance;
use crate::models::{BoundingBox, QartodFlag};
use crate::utils::{check_same_shape, mask_invalid, restore_shape, summarize_flags};
use ndarray::{Array, ArrayView, AsArray, Dimension};
use tracing::debug;

/// Checks that a location is within reasonable bounds.
///
/// Longitude and latitude are checked against `bbox`, which defaults to the
/// whole globe. When `range_max` is given, the geodesic distance in metres
/// from the previous point is checked as well and longer steps are SUSPECT.
///
/// Flags per position:
/// * both coordinates missing: MISSING
/// * exactly one coordinate missing: FAIL
/// * step longer than `range_max`: SUSPECT
/// * outside `bbox`: FAIL (wins over SUSPECT)
/// * otherwise GOOD
///
/// # Errors
///
/// [`QcError::ShapeMismatch`](crate::QcError::ShapeMismatch) when `lon` and
/// `lat` have different shapes.
pub fn location_test<'a, V, D>(
    lon: V,
    lat: V,
    bbox: Option<BoundingBox>,
    range_max: Option<f64>,
) -> Result<Array<QartodFlag, D>>
where
    V: AsArray<'a, f64, D>,
    D: Dimension,
{
    let lon: ArrayView<'a, f64, D> = lon.into();
    let lat: ArrayView<'a, f64, D> = lat.into();
    check_same_shape("lon", lon.shape(), "lat", lat.shape())?;
    let bbox = bbox.unwrap_or_default();

    let lons = mask_invalid(&lon);
    let lats = mask_invalid(&lat);
    let points: Vec<Option<(f64, f64)>> = lons
        .iter()
        .zip(&lats)
        .map(|(x, y)| x.zip(*y))
        .collect();

    let check_range = range_max.filter(|_| points.len() > 1);
    let mut flags = Vec::with_capacity(points.len());
    for (i, (x, y)) in lons.iter().zip(&lats).enumerate() {
        let flag = match (x, y) {
            (None, None) => QartodFlag::Missing,
            (Some(_), None) | (None, Some(_)) => QartodFlag::Fail,
            (Some(x), Some(y)) => {
                let mut flag = QartodFlag::Good;
                if let Some(range_max) = check_range {
                    let previous = if i > 0 { points[i - 1] } else { None };
                    if let Some((px, py)) = previous {
                        if great_circle_distance(py, px, *y, *x) > range_max {
                            flag = QartodFlag::Suspect;
                        }
                    }
                }
                if bbox.excludes(*x, *y) {
                    flag = QartodFlag::Fail;
                }
                flag
            }
        };
        flags.push(flag);
    }

    debug!(
        "location_test: {} points -> {}",
        flags.len(),
        summarize_flags(&flags)
    );
    Ok(restore_shape(lon.raw_dim(), flags))
}
