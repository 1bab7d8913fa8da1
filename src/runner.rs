//! Runs a configured suite of QARTOD tests over one series.
//!
//! The runner validates its [`QcConfig`] once, builds the climatology
//! lookup table, and then applies every configured test whose inputs are
//! present in the [`Series`]. Individual results are merged with
//! [`qartod_compare`] into one aggregate flag per sample.

use crate::config::QcConfig;
use crate::constants::test_names;
use crate::error::{QcError, Result};
use crate::models::QartodFlag;
use crate::qartod::{
    ClimatologyConfig, attenuated_signal_test, climatology_test, flat_line_test,
    gross_range_test, location_test, qartod_compare, rate_of_change_test, spike_test,
};
use crate::utils::{check_same_shape, summarize_flags};
use chrono::{DateTime, Utc};
use ndarray::Array1;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

/// One time series and its optional companion coordinates.
///
/// Missing values are NaN.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub values: Array1<f64>,
    pub times: Option<Array1<DateTime<Utc>>>,
    pub depths: Option<Array1<f64>>,
    pub lon: Option<Array1<f64>>,
    pub lat: Option<Array1<f64>>,
}

/// JSON form of a series, with `null` marking missing values
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSeries {
    values: Vec<Option<f64>>,
    #[serde(default)]
    times: Option<Vec<DateTime<Utc>>>,
    #[serde(default)]
    depths: Option<Vec<Option<f64>>>,
    #[serde(default)]
    lon: Option<Vec<Option<f64>>>,
    #[serde(default)]
    lat: Option<Vec<Option<f64>>>,
}

fn nan_filled(values: Vec<Option<f64>>) -> Array1<f64> {
    values.into_iter().map(|v| v.unwrap_or(f64::NAN)).collect()
}

impl Series {
    pub fn new(values: Array1<f64>) -> Self {
        Self {
            values,
            times: None,
            depths: None,
            lon: None,
            lat: None,
        }
    }

    pub fn with_times(mut self, times: Array1<DateTime<Utc>>) -> Self {
        self.times = Some(times);
        self
    }

    pub fn with_depths(mut self, depths: Array1<f64>) -> Self {
        self.depths = Some(depths);
        self
    }

    pub fn with_location(mut self, lon: Array1<f64>, lat: Array1<f64>) -> Self {
        self.lon = Some(lon);
        self.lat = Some(lat);
        self
    }

    /// Parse a series from JSON
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: RawSeries = serde_json::from_str(json)?;
        Ok(Self {
            values: nan_filled(raw.values),
            times: raw.times.map(Array1::from),
            depths: raw.depths.map(nan_filled),
            lon: raw.lon.map(nan_filled),
            lat: raw.lat.map(nan_filled),
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Every companion array must match the length of `values`
    pub fn validate(&self) -> Result<()> {
        let shape = self.values.shape();
        if let Some(times) = &self.times {
            check_same_shape("times", times.shape(), "values", shape)?;
        }
        if let Some(depths) = &self.depths {
            check_same_shape("depths", depths.shape(), "values", shape)?;
        }
        if let Some(lon) = &self.lon {
            check_same_shape("lon", lon.shape(), "values", shape)?;
        }
        if let Some(lat) = &self.lat {
            check_same_shape("lat", lat.shape(), "values", shape)?;
        }
        Ok(())
    }
}

/// Flags from every test that ran, plus their aggregate
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QcResults {
    pub tests: BTreeMap<String, Vec<QartodFlag>>,
    pub aggregate: Vec<QartodFlag>,
}

impl QcResults {
    pub fn get(&self, test_name: &str) -> Option<&[QartodFlag]> {
        self.tests.get(test_name).map(Vec::as_slice)
    }

    pub fn to_json_string(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Applies a validated [`QcConfig`] to series
#[derive(Debug, Clone)]
pub struct QcRunner {
    config: QcConfig,
    climatology: Option<ClimatologyConfig>,
}

impl QcRunner {
    /// Validate `config` and prepare the climatology table
    pub fn new(config: QcConfig) -> Result<Self> {
        config.validate()?;
        let climatology = config
            .climatology_test
            .as_ref()
            .map(|c| c.build())
            .transpose()?;
        Ok(Self {
            config,
            climatology,
        })
    }

    pub fn config(&self) -> &QcConfig {
        &self.config
    }

    /// Run every configured test that has its inputs and aggregate the results
    pub fn run(&self, series: &Series) -> Result<QcResults> {
        series.validate()?;
        info!(
            "Running {} QC tests over {} values",
            self.config.enabled_tests().len(),
            series.len()
        );

        let values = &series.values;
        let mut results: Vec<(&'static str, Array1<QartodFlag>)> = Vec::new();

        if let Some(location) = &self.config.location_test {
            match (&series.lon, &series.lat) {
                (Some(lon), Some(lat)) => {
                    let flags = location_test(lon, lat, location.bbox()?, location.range_max)?;
                    results.push((test_names::LOCATION, flags));
                }
                _ => warn!("Skipping {}: series has no lon/lat", test_names::LOCATION),
            }
        }

        if let Some(gross_range) = &self.config.gross_range_test {
            let (fail, suspect) = gross_range.spans()?;
            let flags = gross_range_test(
                values,
                (fail.minv, fail.maxv),
                suspect.map(|s| (s.minv, s.maxv)),
            )?;
            results.push((test_names::GROSS_RANGE, flags));
        }

        if let Some(climatology) = &self.climatology {
            match &series.times {
                Some(times) => {
                    let depths = series
                        .depths
                        .clone()
                        .unwrap_or_else(|| Array1::from_elem(series.len(), f64::NAN));
                    let flags = climatology_test(climatology, times, values, &depths)?;
                    results.push((test_names::CLIMATOLOGY, flags));
                }
                None => warn!("Skipping {}: series has no times", test_names::CLIMATOLOGY),
            }
        }

        if let Some(spike) = &self.config.spike_test {
            let thresholds = spike.thresholds()?;
            let flags = spike_test(values, (thresholds.minv, thresholds.maxv));
            results.push((test_names::SPIKE, flags));
        }

        if let Some(rate) = &self.config.rate_of_change_test {
            let flags = rate_of_change_test(values, rate.deviation, rate.num_deviations);
            results.push((test_names::RATE_OF_CHANGE, flags));
        }

        if let Some(flat_line) = &self.config.flat_line_test {
            let counts = flat_line.counts()?;
            let flags = flat_line_test(values, (counts.minv, counts.maxv), flat_line.tolerance)?;
            results.push((test_names::FLAT_LINE, flags));
        }

        if let Some(attenuated) = &self.config.attenuated_signal_test {
            let threshold = attenuated.threshold()?;
            let flags = attenuated_signal_test(
                values,
                (threshold.minv, threshold.maxv),
                attenuated.check_type()?,
            );
            results.push((test_names::ATTENUATED_SIGNAL, flags));
        }

        if results.is_empty() {
            return Err(QcError::EmptyInput(
                "no configured test could run on this series".to_string(),
            ));
        }

        let views: Vec<_> = results.iter().map(|(_, flags)| flags.view()).collect();
        let aggregate = qartod_compare(&views)?;
        debug!("Aggregate flags: {}", summarize_flags(aggregate.iter()));

        Ok(QcResults {
            tests: results
                .into_iter()
                .map(|(name, flags)| (name.to_string(), flags.to_vec()))
                .collect(),
            aggregate: aggregate.to_vec(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QartodFlag::*;
    use crate::models::{BoundingBox, CheckType};
    use chrono::TimeZone;
    use ndarray::array;

    fn day(d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 3, d, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_runs_value_tests_and_aggregates() {
        let config = QcConfig::default()
            .with_gross_range((0.0, 30.0), Some((5.0, 25.0)))
            .with_rate_of_change(1.0, 3.0);
        let runner = QcRunner::new(config).unwrap();
        let series = Series::new(array![10.0, 11.0, 27.0, 12.0, f64::NAN, 31.0]);

        let results = runner.run(&series).unwrap();
        assert_eq!(
            results.get(test_names::GROSS_RANGE).unwrap(),
            &[Good, Good, Suspect, Good, Missing, Fail]
        );
        assert_eq!(
            results.get(test_names::RATE_OF_CHANGE).unwrap(),
            &[Good, Good, Suspect, Suspect, Missing, Missing]
        );
        assert_eq!(
            results.aggregate,
            vec![Good, Good, Suspect, Suspect, Missing, Fail]
        );
    }

    #[test]
    fn test_skips_tests_without_inputs() {
        let config = QcConfig::default()
            .with_location(None, None)
            .with_climatology_window((day(1), day(31)), (0.0, 1.0), None)
            .with_spike((1.0, 2.0));
        let runner = QcRunner::new(config).unwrap();
        let results = runner.run(&Series::new(array![0.5, 0.5, 0.5])).unwrap();
        assert_eq!(results.tests.len(), 1);
        assert!(results.get(test_names::SPIKE).is_some());
    }

    #[test]
    fn test_location_and_climatology() {
        let config = QcConfig::default()
            .with_location(Some(BoundingBox::new(-10.0, -10.0, 10.0, 10.0)), None)
            .with_climatology_window((day(1), day(31)), (0.0, 10.0), None)
            .with_attenuated_signal((0.1, 0.2), CheckType::Range);
        let runner = QcRunner::new(config).unwrap();
        let series = Series::new(array![1.0, 5.0, 12.0])
            .with_times(array![day(2), day(3), day(4)])
            .with_location(array![0.0, 20.0, 0.0], array![0.0, 0.0, f64::NAN]);

        let results = runner.run(&series).unwrap();
        assert_eq!(
            results.get(test_names::LOCATION).unwrap(),
            &[Good, Fail, Fail]
        );
        assert_eq!(
            results.get(test_names::CLIMATOLOGY).unwrap(),
            &[Good, Good, Suspect]
        );
        assert_eq!(results.aggregate, vec![Good, Fail, Fail]);
    }

    #[test]
    fn test_nothing_runnable() {
        let config = QcConfig::default().with_location(None, None);
        let runner = QcRunner::new(config).unwrap();
        assert!(matches!(
            runner.run(&Series::new(array![1.0])),
            Err(QcError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_series_length_mismatch() {
        let config = QcConfig::default().with_spike((1.0, 2.0));
        let runner = QcRunner::new(config).unwrap();
        let series = Series::new(array![1.0, 2.0]).with_depths(array![1.0]);
        assert!(matches!(
            runner.run(&series),
            Err(QcError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_series_from_json() {
        let series = Series::from_json_str(
            r#"{ "values": [1.0, null, 3.0], "times": ["2022-03-01T00:00:00Z", "2022-03-02T00:00:00Z", "2022-03-03T00:00:00Z"] }"#,
        )
        .unwrap();
        assert_eq!(series.len(), 3);
        assert!(series.values[1].is_nan());
        assert_eq!(series.times.as_ref().unwrap()[0], day(1));
        assert!(series.lon.is_none());
    }

    #[test]
    fn test_results_serialize_as_codes() {
        let runner = QcRunner::new(QcConfig::default().with_gross_range((0.0, 1.0), None)).unwrap();
        let results = runner.run(&Series::new(array![0.5, 2.0, f64::NAN])).unwrap();
        let json: serde_json::Value = serde_json::from_str(&results.to_json_string().unwrap()).unwrap();
        assert_eq!(json["aggregate"], serde_json::json!([1, 4, 9]));
        assert_eq!(json["tests"]["gross_range_test"], serde_json::json!([1, 4, 9]));
    }
}
