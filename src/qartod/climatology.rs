//! Climatology test and its window configuration.
//!
//! A [`ClimatologyConfig`] is an ordered list of windows, each mapping a
//! time span (and optionally a depth span) to the range of values expected
//! there. Lookups scan every window and the last match wins, so windows
//! added later refine earlier ones.

use crate::error::Result;
use crate::models::{QartodFlag, Span};
use crate::utils::{check_same_shape, is_missing, mask_invalid, restore_shape, summarize_flags};
use chrono::{DateTime, Utc};
use ndarray::{Array, ArrayView, AsArray, Dimension};
use tracing::debug;

/// One climatology window
#[derive(Debug, Clone, PartialEq)]
pub struct ClimatologyWindow<T> {
    pub tspan: Span<T>,
    pub vspan: Span<f64>,
    /// `None` applies to samples without depth
    pub zspan: Option<Span<f64>>,
}

/// Ordered collection of climatology windows
#[derive(Debug, Clone, PartialEq)]
pub struct ClimatologyConfig<T = DateTime<Utc>> {
    members: Vec<ClimatologyWindow<T>>,
}

impl<T> Default for ClimatologyConfig<T> {
    fn default() -> Self {
        Self {
            members: Vec::new(),
        }
    }
}

impl<T: PartialOrd + Copy> ClimatologyConfig<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn members(&self) -> &[ClimatologyWindow<T>] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Append a window; every pair is normalized to `(min, max)`
    pub fn add(&mut self, tspan: (T, T), vspan: (f64, f64), zspan: Option<(f64, f64)>) {
        self.members.push(ClimatologyWindow {
            tspan: Span::from(tspan),
            vspan: Span::from(vspan),
            zspan: zspan.map(Span::from),
        });
    }

    /// Append a window from slices, checking that each holds two values
    pub fn try_add(&mut self, tspan: &[T], vspan: &[f64], zspan: Option<&[f64]>) -> Result<()> {
        let tspan = Span::from_slice("tspan", tspan)?;
        let vspan = Span::from_slice("vspan", vspan)?;
        let zspan = zspan.map(|z| Span::from_slice("zspan", z)).transpose()?;
        self.members.push(ClimatologyWindow {
            tspan,
            vspan,
            zspan,
        });
        Ok(())
    }

    /// Expected value span for time `t` at depth `z`.
    ///
    /// A window matches when `t` falls in `(tspan.minv, tspan.maxv]` and
    /// either both the sample and the window lack a depth, or both have one
    /// and `z` falls in `(zspan.minv, zspan.maxv]`. A NaN depth counts as
    /// no depth. The last matching window wins.
    pub fn values(&self, t: T, z: Option<f64>) -> Option<Span<f64>> {
        let z = z.filter(|z| !z.is_nan());
        let mut span = None;
        for m in &self.members {
            if !m.tspan.contains_left_open(t) {
                continue;
            }
            match (z, m.zspan) {
                (Some(z), Some(zspan)) if zspan.contains_left_open(z) => span = Some(m.vspan),
                (None, None) => span = Some(m.vspan),
                _ => {}
            }
        }
        span
    }
}

/// Checks that values fall within the climatological range for their time
/// and depth.
///
/// Values outside the matching window's value span are SUSPECT; this test
/// never produces FAIL. Missing values, and values with no matching window,
/// are MISSING. `zinp` holds NaN where a sample has no depth.
///
/// # Errors
///
/// [`QcError::ShapeMismatch`](crate::QcError::ShapeMismatch) unless
/// `tinp`, `vinp` and `zinp` share one shape.
pub fn climatology_test<'a, T, VT, V, Z, D>(
    config: &ClimatologyConfig<T>,
    tinp: VT,
    vinp: V,
    zinp: Z,
) -> Result<Array<QartodFlag, D>>
where
    T: PartialOrd + Copy + 'a,
    VT: AsArray<'a, T, D>,
    V: AsArray<'a, f64, D>,
    Z: AsArray<'a, f64, D>,
    D: Dimension,
{
    let tinp: ArrayView<'a, T, D> = tinp.into();
    let vinp: ArrayView<'a, f64, D> = vinp.into();
    let zinp: ArrayView<'a, f64, D> = zinp.into();
    check_same_shape("tinp", tinp.shape(), "vinp", vinp.shape())?;
    check_same_shape("zinp", zinp.shape(), "vinp", vinp.shape())?;

    let values = mask_invalid(&vinp);
    let flags: Vec<QartodFlag> = tinp
        .iter()
        .zip(values)
        .zip(zinp.iter())
        .map(|((&t, v), &z)| {
            let Some(v) = v else {
                return QartodFlag::Missing;
            };
            let z = if is_missing(z) { None } else { Some(z) };
            match config.values(t, z) {
                None => QartodFlag::Missing,
                Some(span) if span.excludes(v) => QartodFlag::Suspect,
                Some(_) => QartodFlag::Good,
            }
        })
        .collect();

    debug!(
        "climatology_test: {} values against {} windows -> {}",
        flags.len(),
        config.len(),
        summarize_flags(&flags)
    );
    Ok(restore_shape(vinp.raw_dim(), flags))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QcError;
    use crate::models::QartodFlag::*;
    use chrono::TimeZone;
    use ndarray::{Array1, array};

    fn ts(month: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2020, month, 1, 0, 0, 0).unwrap()
    }

    fn seasonal_config() -> ClimatologyConfig {
        let mut config = ClimatologyConfig::new();
        config.add((ts(1), ts(4)), (10.0, 20.0), None);
        config.add((ts(4), ts(7)), (15.0, 25.0), None);
        config.add((ts(1), ts(4)), (5.0, 8.0), Some((0.0, 10.0)));
        config
    }

    #[test]
    fn test_last_match_wins() {
        let mut config = ClimatologyConfig::<f64>::new();
        config.add((0.0, 10.0), (1.0, 2.0), Some((0.0, 5.0)));
        config.add((0.0, 10.0), (3.0, 4.0), Some((0.0, 5.0)));
        assert_eq!(config.values(5.0, Some(1.0)), Some(Span::new(3.0, 4.0)));
    }

    #[test]
    fn test_add_normalizes_spans() {
        let mut config = ClimatologyConfig::<f64>::new();
        config.add((10.0, 0.0), (2.0, 1.0), Some((5.0, 0.0)));
        let window = &config.members()[0];
        assert_eq!(window.tspan, Span::new(0.0, 10.0));
        assert_eq!(window.vspan, Span::new(1.0, 2.0));
        assert_eq!(window.zspan, Some(Span::new(0.0, 5.0)));
    }

    #[test]
    fn test_try_add_checks_arity() {
        let mut config = ClimatologyConfig::<f64>::new();
        assert!(config.try_add(&[0.0, 1.0], &[1.0, 2.0], None).is_ok());
        assert!(matches!(
            config.try_add(&[0.0], &[1.0, 2.0], None),
            Err(QcError::InvalidArity { .. })
        ));
        assert!(config.try_add(&[0.0, 1.0], &[1.0, 2.0], Some(&[1.0])).is_err());
        assert_eq!(config.len(), 1);
    }

    #[test]
    fn test_time_span_is_left_open() {
        let config = seasonal_config();
        assert_eq!(config.values(ts(1), None), None);
        assert_eq!(config.values(ts(4), None), Some(Span::new(10.0, 20.0)));
        assert_eq!(config.values(ts(5), None), Some(Span::new(15.0, 25.0)));
        assert_eq!(config.values(ts(8), None), None);
    }

    #[test]
    fn test_depth_matching() {
        let config = seasonal_config();
        assert_eq!(config.values(ts(2), Some(5.0)), Some(Span::new(5.0, 8.0)));
        // depth outside every depth window
        assert_eq!(config.values(ts(2), Some(50.0)), None);
        // NaN depth matches depth-less windows only
        assert_eq!(
            config.values(ts(2), Some(f64::NAN)),
            Some(Span::new(10.0, 20.0))
        );
    }

    #[test]
    fn test_climatology_flags() {
        let config = seasonal_config();
        let tinp = array![ts(2), ts(2), ts(5), ts(2), ts(9), ts(2)];
        let vinp = array![15.0, 21.0, 16.0, 9.0, 15.0, f64::NAN];
        let zinp = array![f64::NAN, f64::NAN, f64::NAN, 2.0, f64::NAN, f64::NAN];
        let flags = climatology_test(&config, &tinp, &vinp, &zinp).unwrap();
        assert_eq!(flags, array![Good, Suspect, Good, Suspect, Missing, Missing]);
    }

    #[test]
    fn test_never_fails() {
        let mut config = ClimatologyConfig::<f64>::new();
        config.add((0.0, 100.0), (0.0, 1.0), None);
        let tinp = array![1.0, 2.0, 3.0];
        let vinp = array![1e9, -1e9, 0.5];
        let zinp = Array1::from_elem(3, f64::NAN);
        let flags = climatology_test(&config, &tinp, &vinp, &zinp).unwrap();
        assert_eq!(flags, array![Suspect, Suspect, Good]);
    }

    #[test]
    fn test_preserves_shape() {
        let mut config = ClimatologyConfig::<f64>::new();
        config.add((0.0, 10.0), (0.0, 1.0), None);
        let tinp = array![[1.0, 2.0], [3.0, 20.0]];
        let vinp = array![[0.5, 2.0], [0.1, 0.1]];
        let zinp = array![[f64::NAN, f64::NAN], [f64::NAN, f64::NAN]];
        let flags = climatology_test(&config, &tinp, &vinp, &zinp).unwrap();
        assert_eq!(flags, array![[Good, Suspect], [Good, Missing]]);
    }

    #[test]
    fn test_shape_mismatch() {
        let config = ClimatologyConfig::<f64>::new();
        let tinp = array![1.0, 2.0];
        let vinp = array![1.0, 2.0, 3.0];
        let zinp = array![1.0, 2.0, 3.0];
        assert!(matches!(
            climatology_test(&config, &tinp, &vinp, &zinp),
            Err(QcError::ShapeMismatch { .. })
        ));
    }
}
