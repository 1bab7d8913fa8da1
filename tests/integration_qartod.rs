//! Integration tests for the QARTOD test functions through the public API
//!
//! These tests exercise the properties every flagging routine must hold
//! regardless of input: precedence in aggregation, strict boundaries,
//! neighbour handling and shape preservation for multi-dimensional input.

use chrono::{DateTime, TimeZone, Utc};
use ndarray::{Array2, array};
use qartod_qc::QartodFlag::{self, *};
use qartod_qc::qartod::{
    ClimatologyConfig, attenuated_signal_test, climatology_test, flat_line_test,
    gross_range_test, location_test, qartod_compare, rate_of_change_test, spike_test,
};
use qartod_qc::{BoundingBox, CheckType, QcError};

fn day(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 6, d, 0, 0, 0).unwrap()
}

/// Test that FAIL in any vector always survives aggregation
///
/// Purpose: Validate the precedence ordering used to merge test results
/// Benefit: A single failing test can never be masked by other verdicts
#[test]
fn test_aggregate_fail_dominates() {
    let a = array![Good, Missing, Unknown, Fail, Suspect];
    let b = array![Fail, Fail, Fail, Good, Missing];
    let c = array![Suspect, Good, Missing, Missing, Unknown];

    let merged = qartod_compare(&[a.view(), b.view(), c.view()]).unwrap();
    assert!(merged.iter().all(|&f| f == Fail || f == Suspect));
    assert_eq!(merged, array![Fail, Fail, Fail, Fail, Suspect]);
}

/// Test that aggregating one vector returns it unchanged
#[test]
fn test_aggregate_identity() {
    let only = array![Missing, Unknown, Good, Suspect, Fail];
    assert_eq!(qartod_compare(&[only.clone()]).unwrap(), only);
}

/// Test gross range boundaries and containment
///
/// Purpose: Validate strict inequality at the FAIL bounds
/// Benefit: Values equal to an instrument limit are not rejected
#[test]
fn test_gross_range_boundaries() {
    let inp = array![0.0, 10.0, -1.0, 11.0, 5.0];
    let flags = gross_range_test(&inp, (0.0, 10.0), None).unwrap();
    assert_eq!(flags, array![Good, Good, Fail, Fail, Good]);

    let wider = gross_range_test(&inp, (0.0, 10.0), Some((-5.0, 8.0)));
    assert!(matches!(wider, Err(QcError::SpanContainment { .. })));
}

/// Test spike detection on a ramp and on an injected outlier
#[test]
fn test_spike_ramp_and_outlier() {
    let ramp = array![1.0, 2.0, 3.0, 4.0, 5.0];
    let flags = spike_test(&ramp, (5.0, 50.0));
    assert!(flags.slice(ndarray::s![1..4]).iter().all(|&f| f == Good));

    let outlier = array![1.0, 2.0, 100.0, 4.0, 5.0];
    assert_eq!(spike_test(&outlier, (5.0, 50.0))[2], Fail);
    assert_eq!(spike_test(&outlier, (50.0, 500.0))[2], Suspect);
}

/// Test flat line tiers over a long run of repeats
#[test]
fn test_flat_line_run() {
    let inp = array![0.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0, 7.0];
    let flags = flat_line_test(&inp, (3, 5), 0.1).unwrap();
    // repeats of 7.0 start at index 2; the 3rd and 4th repeats are SUSPECT
    assert_eq!(
        flags,
        array![Good, Good, Good, Good, Suspect, Suspect, Fail, Fail]
    );
}

/// Test that later climatology windows override earlier ones
#[test]
fn test_climatology_last_match_wins() {
    let mut config = ClimatologyConfig::new();
    config.add((day(1), day(30)), (10.0, 20.0), Some((0.0, 100.0)));
    config.add((day(1), day(30)), (12.0, 18.0), Some((0.0, 100.0)));

    let span = config.values(day(10), Some(50.0)).unwrap();
    assert_eq!((span.minv, span.maxv), (12.0, 18.0));

    let flags = climatology_test(
        &config,
        &array![day(10), day(10)],
        &array![11.0, 15.0],
        &array![50.0, 50.0],
    )
    .unwrap();
    assert_eq!(flags, array![Suspect, Good]);
}

/// Test location handling of partially and fully missing coordinates
#[test]
fn test_location_missing_coordinates() {
    let flags = location_test(&array![0.0, 1.0], &array![f64::NAN, 1.0], None, None).unwrap();
    assert_eq!(flags, array![Fail, Good]);

    let nan = array![f64::NAN, f64::NAN];
    let flags = location_test(&nan, &nan, None, None).unwrap();
    assert_eq!(flags, array![Missing, Missing]);
}

/// Test that a constant series is an attenuated signal
#[test]
fn test_attenuated_constant_series() {
    let inp = array![2.5, 2.5, f64::NAN, 2.5];
    let flags = attenuated_signal_test(&inp, (1.0, 5.0), CheckType::Std);
    assert_eq!(flags, array![Fail, Fail, Missing, Fail]);
}

/// Test that every routine returns flags in the shape of its input
///
/// Purpose: Validate flatten/restore handling for 2-D arrays
/// Benefit: Gridded data can be checked without manual reshaping
#[test]
fn test_two_dimensional_shapes_preserved() {
    let grid = array![[1.0, 2.0, 3.0], [4.0, f64::NAN, 6.0]];
    let shape = grid.shape().to_vec();

    let check = |flags: Array2<QartodFlag>| {
        assert_eq!(flags.shape(), shape.as_slice());
        assert_eq!(flags[[1, 1]], Missing);
    };

    check(gross_range_test(&grid, (0.0, 10.0), None).unwrap());
    check(spike_test(&grid, (5.0, 10.0)));
    check(rate_of_change_test(&grid, 1.0, 3.0));
    check(flat_line_test(&grid, (2, 3), 0.1).unwrap());
    check(attenuated_signal_test(&grid, (0.1, 0.2), CheckType::Range));

    let lat = Array2::<f64>::zeros((2, 3));
    let located = location_test(&grid, &lat, Some(BoundingBox::new(0.0, -1.0, 5.0, 1.0)), None)
        .unwrap();
    assert_eq!(located.shape(), shape.as_slice());
    assert_eq!(located[[1, 2]], Fail);

    let times = Array2::from_elem((2, 3), day(5));
    let depths = Array2::from_elem((2, 3), f64::NAN);
    let mut config = ClimatologyConfig::new();
    config.add((day(1), day(10)), (0.0, 5.0), None);
    let flags = climatology_test(&config, &times, &grid, &depths).unwrap();
    assert_eq!(
        flags,
        array![[Good, Good, Good], [Good, Missing, Suspect]]
    );
}

/// Test that shape mismatches are rejected rather than truncated
#[test]
fn test_shape_mismatch_rejected() {
    let config: ClimatologyConfig = ClimatologyConfig::new();
    let result = climatology_test(
        &config,
        &array![day(1), day(2)],
        &array![1.0, 2.0, 3.0],
        &array![f64::NAN, f64::NAN, f64::NAN],
    );
    assert!(matches!(result, Err(QcError::ShapeMismatch { .. })));

    let result = location_test(&array![0.0, 1.0], &array![0.0], None, None);
    assert!(matches!(result, Err(QcError::ShapeMismatch { .. })));
}
