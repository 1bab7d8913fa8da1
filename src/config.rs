//! Test suite configuration and validation.
//!
//! A [`QcConfig`] names which QARTOD tests to run and with which thresholds.
//! It is usually loaded from JSON; every section is optional and omitted
//! sections are not run. Threshold pairs are kept as plain lists so that a
//! malformed file is reported by [`QcConfig::validate`] with the same
//! contract errors the tests themselves raise.

use crate::constants::{DEFAULT_CHECK_TYPE, DEFAULT_FLAT_LINE_TOLERANCE, DEFAULT_NUM_DEVIATIONS, test_names};
use crate::error::{QcError, Result};
use crate::models::{BoundingBox, CheckType, Span};
use crate::qartod::climatology::ClimatologyConfig;
use crate::qartod::flat_line::flat_line_counts;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

/// Location test settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationConfig {
    /// `(minx, miny, maxx, maxy)`; the whole globe when omitted
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bbox: Option<Vec<f64>>,

    /// Maximum step between consecutive points in metres
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range_max: Option<f64>,
}

impl LocationConfig {
    pub fn bbox(&self) -> Result<Option<BoundingBox>> {
        self.bbox.as_deref().map(BoundingBox::from_slice).transpose()
    }
}

/// Gross range test settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrossRangeConfig {
    pub fail_span: Vec<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suspect_span: Option<Vec<f64>>,
}

impl GrossRangeConfig {
    /// Fail and suspect spans, with the suspect span checked against the fail span
    pub fn spans(&self) -> Result<(Span, Option<Span>)> {
        let fail = Span::from_slice("fail_span", &self.fail_span)?;
        let suspect = self
            .suspect_span
            .as_deref()
            .map(|s| Span::from_slice("suspect_span", s))
            .transpose()?;
        if let Some(suspect) = suspect {
            if !fail.encloses(&suspect) {
                return Err(QcError::SpanContainment {
                    suspect_min: suspect.minv,
                    suspect_max: suspect.maxv,
                    fail_min: fail.minv,
                    fail_max: fail.maxv,
                });
            }
        }
        Ok((fail, suspect))
    }
}

/// One climatology window as written in a config file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClimatologyWindowConfig {
    pub tspan: Vec<DateTime<Utc>>,
    pub vspan: Vec<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zspan: Option<Vec<f64>>,
}

/// Climatology test settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ClimatologyTestConfig {
    pub windows: Vec<ClimatologyWindowConfig>,
}

impl ClimatologyTestConfig {
    /// Build the lookup table in file order
    pub fn build(&self) -> Result<ClimatologyConfig> {
        let mut config = ClimatologyConfig::new();
        for window in &self.windows {
            config.try_add(&window.tspan, &window.vspan, window.zspan.as_deref())?;
        }
        Ok(config)
    }
}

/// Spike test settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpikeConfig {
    pub thresholds: Vec<f64>,
}

impl SpikeConfig {
    pub fn thresholds(&self) -> Result<Span> {
        Span::from_slice("thresholds", &self.thresholds)
    }
}

/// Rate of change test settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RateOfChangeConfig {
    pub deviation: f64,

    #[serde(default = "default_num_deviations")]
    pub num_deviations: f64,
}

fn default_num_deviations() -> f64 {
    DEFAULT_NUM_DEVIATIONS
}

/// Flat line test settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FlatLineConfig {
    /// Window sizes; must be positive integers
    pub counts: Vec<f64>,

    #[serde(default = "default_tolerance")]
    pub tolerance: f64,
}

fn default_tolerance() -> f64 {
    DEFAULT_FLAT_LINE_TOLERANCE
}

impl FlatLineConfig {
    pub fn counts(&self) -> Result<Span<usize>> {
        flat_line_counts(&self.counts)
    }
}

/// Attenuated signal test settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttenuatedSignalConfig {
    pub threshold: Vec<f64>,

    /// `"std"` or `"range"`
    #[serde(default = "default_check_type")]
    pub check_type: String,
}

fn default_check_type() -> String {
    DEFAULT_CHECK_TYPE.to_string()
}

impl AttenuatedSignalConfig {
    pub fn threshold(&self) -> Result<Span> {
        Span::from_slice("threshold", &self.threshold)
    }

    pub fn check_type(&self) -> Result<CheckType> {
        self.check_type.parse()
    }
}

/// Configuration for a suite of QARTOD tests
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QcConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_test: Option<LocationConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gross_range_test: Option<GrossRangeConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub climatology_test: Option<ClimatologyTestConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spike_test: Option<SpikeConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate_of_change_test: Option<RateOfChangeConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flat_line_test: Option<FlatLineConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attenuated_signal_test: Option<AttenuatedSignalConfig>,
}

impl QcConfig {
    /// Parse a configuration from JSON text
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(QcError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&contents)?;
        debug!(
            "Loaded QC config from {}: {:?}",
            path.display(),
            config.enabled_tests()
        );
        Ok(config)
    }

    /// Serialize the configuration as pretty JSON
    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Names of the configured tests, in the order they are run
    pub fn enabled_tests(&self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.location_test.is_some() {
            names.push(test_names::LOCATION);
        }
        if self.gross_range_test.is_some() {
            names.push(test_names::GROSS_RANGE);
        }
        if self.climatology_test.is_some() {
            names.push(test_names::CLIMATOLOGY);
        }
        if self.spike_test.is_some() {
            names.push(test_names::SPIKE);
        }
        if self.rate_of_change_test.is_some() {
            names.push(test_names::RATE_OF_CHANGE);
        }
        if self.flat_line_test.is_some() {
            names.push(test_names::FLAT_LINE);
        }
        if self.attenuated_signal_test.is_some() {
            names.push(test_names::ATTENUATED_SIGNAL);
        }
        names
    }

    /// Check every configured section for contract violations
    pub fn validate(&self) -> Result<()> {
        if self.enabled_tests().is_empty() {
            return Err(QcError::configuration("no tests configured"));
        }
        if let Some(location) = &self.location_test {
            location.bbox()?;
            if location.range_max.is_some_and(|r| !r.is_finite() || r < 0.0) {
                return Err(QcError::configuration(
                    "location_test.range_max must be a non-negative number",
                ));
            }
        }
        if let Some(gross_range) = &self.gross_range_test {
            gross_range.spans()?;
        }
        if let Some(climatology) = &self.climatology_test {
            climatology.build()?;
        }
        if let Some(spike) = &self.spike_test {
            spike.thresholds()?;
        }
        if let Some(rate) = &self.rate_of_change_test {
            if !rate.deviation.is_finite() || !rate.num_deviations.is_finite() {
                return Err(QcError::configuration(
                    "rate_of_change_test.deviation and num_deviations must be finite",
                ));
            }
        }
        if let Some(flat_line) = &self.flat_line_test {
            flat_line.counts()?;
        }
        if let Some(attenuated) = &self.attenuated_signal_test {
            attenuated.threshold()?;
            attenuated.check_type()?;
        }
        Ok(())
    }

    pub fn with_location(mut self, bbox: Option<BoundingBox>, range_max: Option<f64>) -> Self {
        self.location_test = Some(LocationConfig {
            bbox: bbox.map(|b| vec![b.minx, b.miny, b.maxx, b.maxy]),
            range_max,
        });
        self
    }

    pub fn with_gross_range(mut self, fail_span: (f64, f64), suspect_span: Option<(f64, f64)>) -> Self {
        self.gross_range_test = Some(GrossRangeConfig {
            fail_span: vec![fail_span.0, fail_span.1],
            suspect_span: suspect_span.map(|(a, b)| vec![a, b]),
        });
        self
    }

    /// Add a climatology window, creating the section if needed
    pub fn with_climatology_window(
        mut self,
        tspan: (DateTime<Utc>, DateTime<Utc>),
        vspan: (f64, f64),
        zspan: Option<(f64, f64)>,
    ) -> Self {
        self.climatology_test
            .get_or_insert_with(ClimatologyTestConfig::default)
            .windows
            .push(ClimatologyWindowConfig {
                tspan: vec![tspan.0, tspan.1],
                vspan: vec![vspan.0, vspan.1],
                zspan: zspan.map(|(a, b)| vec![a, b]),
            });
        self
    }

    pub fn with_spike(mut self, thresholds: (f64, f64)) -> Self {
        self.spike_test = Some(SpikeConfig {
            thresholds: vec![thresholds.0, thresholds.1],
        });
        self
    }

    pub fn with_rate_of_change(mut self, deviation: f64, num_deviations: f64) -> Self {
        self.rate_of_change_test = Some(RateOfChangeConfig {
            deviation,
            num_deviations,
        });
        self
    }

    pub fn with_flat_line(mut self, counts: (usize, usize), tolerance: f64) -> Self {
        self.flat_line_test = Some(FlatLineConfig {
            counts: vec![counts.0 as f64, counts.1 as f64],
            tolerance,
        });
        self
    }

    pub fn with_attenuated_signal(mut self, threshold: (f64, f64), check_type: CheckType) -> Self {
        self.attenuated_signal_test = Some(AttenuatedSignalConfig {
            threshold: vec![threshold.0, threshold.1],
            check_type: check_type.to_string(),
        });
        self
    }
}
