//! Application constants for the QARTOD test suite
//!
//! Flag codes, default test parameters and the reference ellipsoid used by
//! the location test.

// =============================================================================
// Quality Control Flags
// =============================================================================

/// Primary QARTOD flag codes
pub mod qartod_flags {
    /// Passed the test
    pub const GOOD: u8 = 1;

    /// Test not evaluated or not applicable
    pub const UNKNOWN: u8 = 2;

    /// Questionable data - use with caution
    pub const SUSPECT: u8 = 3;

    /// Failed the test - should not be used
    pub const FAIL: u8 = 4;

    /// Missing or invalid input value
    pub const MISSING: u8 = 9;

    /// Aggregation order, lowest precedence first
    pub const PRECEDENCE: &[u8] = &[MISSING, UNKNOWN, GOOD, SUSPECT, FAIL];
}

// =============================================================================
// Test Defaults
// =============================================================================

/// Default location bounding box as (minx, miny, maxx, maxy)
pub const DEFAULT_BBOX: [f64; 4] = [-180.0, -90.0, 180.0, 90.0];

/// Default number of deviations for the rate of change test
pub const DEFAULT_NUM_DEVIATIONS: f64 = 3.0;

/// Default tolerance for the flat line test (never flags)
pub const DEFAULT_FLAT_LINE_TOLERANCE: f64 = 0.0;

/// Default statistic for the attenuated signal test
pub const DEFAULT_CHECK_TYPE: &str = "std";

// =============================================================================
// Test Names
// =============================================================================

/// Names used for configured tests and their results
pub mod test_names {
    pub const LOCATION: &str = "location_test";
    pub const GROSS_RANGE: &str = "gross_range_test";
    pub const CLIMATOLOGY: &str = "climatology_test";
    pub const SPIKE: &str = "spike_test";
    pub const RATE_OF_CHANGE: &str = "rate_of_change_test";
    pub const FLAT_LINE: &str = "flat_line_test";
    pub const ATTENUATED_SIGNAL: &str = "attenuated_signal_test";
}

// =============================================================================
// WGS84 Ellipsoid
// =============================================================================

/// Semi-major axis in metres
pub const WGS84_A: f64 = 6_378_137.0;

/// Flattening
pub const WGS84_F: f64 = 1.0 / 298.257_223_563;

/// Semi-minor axis in metres
pub const WGS84_B: f64 = WGS84_A * (1.0 - WGS84_F);

/// Mean earth radius used by the spherical fallback
pub const MEAN_EARTH_RADIUS_M: f64 = 6_371_008.8;

/// Convergence threshold for the geodesic iteration (radians)
pub const GEODESIC_CONVERGENCE: f64 = 1e-12;

/// Iteration limit for the geodesic solution
pub const GEODESIC_MAX_ITERATIONS: usize = 200;

// =============================================================================
// Logging
// =============================================================================

/// Tracing target the verbosity flags apply to
pub const LOG_TARGET: &str = "qartod_qc";
