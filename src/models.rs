//! Core data structures and types for QARTOD quality control.
//!
//! Defines the flag enumeration and its aggregation precedence, the
//! normalized [`Span`] interval used for every threshold pair, the location
//! [`BoundingBox`] and the attenuated signal [`CheckType`].

use crate::constants::{DEFAULT_BBOX, qartod_flags};
use crate::error::{QcError, Result};
use crate::utils::check_fixed_length;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Primary flags for QARTOD
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum QartodFlag {
    Good = qartod_flags::GOOD,
    Unknown = qartod_flags::UNKNOWN,
    Suspect = qartod_flags::SUSPECT,
    Fail = qartod_flags::FAIL,
    Missing = qartod_flags::MISSING,
}

impl QartodFlag {
    /// All flags in aggregation order, lowest precedence first
    pub const PRECEDENCE: [QartodFlag; 5] = [
        QartodFlag::Missing,
        QartodFlag::Unknown,
        QartodFlag::Good,
        QartodFlag::Suspect,
        QartodFlag::Fail,
    ];

    /// Numeric flag code
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Rank of this flag when merging results; higher wins
    pub fn precedence(self) -> usize {
        match self {
            QartodFlag::Missing => 0,
            QartodFlag::Unknown => 1,
            QartodFlag::Good => 2,
            QartodFlag::Suspect => 3,
            QartodFlag::Fail => 4,
        }
    }
}

impl From<QartodFlag> for u8 {
    fn from(flag: QartodFlag) -> Self {
        flag.code()
    }
}

impl TryFrom<u8> for QartodFlag {
    type Error = QcError;

    fn try_from(code: u8) -> Result<Self> {
        match code {
            qartod_flags::GOOD => Ok(QartodFlag::Good),
            qartod_flags::UNKNOWN => Ok(QartodFlag::Unknown),
            qartod_flags::SUSPECT => Ok(QartodFlag::Suspect),
            qartod_flags::FAIL => Ok(QartodFlag::Fail),
            qartod_flags::MISSING => Ok(QartodFlag::Missing),
            other => Err(QcError::InvalidFlag(other)),
        }
    }
}

impl fmt::Display for QartodFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QartodFlag::Good => "GOOD",
            QartodFlag::Unknown => "UNKNOWN",
            QartodFlag::Suspect => "SUSPECT",
            QartodFlag::Fail => "FAIL",
            QartodFlag::Missing => "MISSING",
        };
        write!(f, "{}", name)
    }
}

/// A normalized `(minv, maxv)` interval with `minv <= maxv`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Span<T = f64> {
    pub minv: T,
    pub maxv: T,
}

impl<T: PartialOrd + Copy> Span<T> {
    /// Build a span from an unordered pair
    pub fn new(a: T, b: T) -> Self {
        if b < a {
            Self { minv: b, maxv: a }
        } else {
            Self { minv: a, maxv: b }
        }
    }

    /// Build a span from a slice that must hold exactly two values
    pub fn from_slice(name: &str, values: &[T]) -> Result<Self> {
        check_fixed_length(name, values.len(), 2)?;
        Ok(Self::new(values[0], values[1]))
    }

    /// True when `value` lies in the half-open interval `(minv, maxv]`
    pub fn contains_left_open(&self, value: T) -> bool {
        value > self.minv && value <= self.maxv
    }

    /// True when `value` lies strictly below `minv` or strictly above `maxv`.
    ///
    /// Unordered comparisons (NaN) are never outside.
    pub fn excludes(&self, value: T) -> bool {
        value < self.minv || value > self.maxv
    }

    /// True when `other` lies entirely within this span
    pub fn encloses(&self, other: &Span<T>) -> bool {
        other.minv >= self.minv && other.maxv <= self.maxv
    }
}

impl<T: PartialOrd + Copy> From<(T, T)> for Span<T> {
    fn from((a, b): (T, T)) -> Self {
        Span::new(a, b)
    }
}

/// Location bounds expressed as `(minx, miny, maxx, maxy)` in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub minx: f64,
    pub miny: f64,
    pub maxx: f64,
    pub maxy: f64,
}

impl BoundingBox {
    pub fn new(minx: f64, miny: f64, maxx: f64, maxy: f64) -> Self {
        Self {
            minx,
            miny,
            maxx,
            maxy,
        }
    }

    /// Build a bounding box from a slice that must hold exactly four values
    pub fn from_slice(values: &[f64]) -> Result<Self> {
        check_fixed_length("bbox", values.len(), 4)?;
        Ok(Self::new(values[0], values[1], values[2], values[3]))
    }

    /// True when the point falls strictly outside the box on either axis
    pub fn excludes(&self, lon: f64, lat: f64) -> bool {
        lon < self.minx || lat < self.miny || lon > self.maxx || lat > self.maxy
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        let [minx, miny, maxx, maxy] = DEFAULT_BBOX;
        Self::new(minx, miny, maxx, maxy)
    }
}

/// Statistic used by the attenuated signal test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum CheckType {
    /// Population standard deviation
    #[default]
    Std,
    /// Peak-to-peak range (max - min)
    Range,
}

impl FromStr for CheckType {
    type Err = QcError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "std" => Ok(CheckType::Std),
            "range" => Ok(CheckType::Range),
            other => Err(QcError::InvalidCheckType(other.to_string())),
        }
    }
}

impl TryFrom<String> for CheckType {
    type Error = QcError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<CheckType> for String {
    fn from(check_type: CheckType) -> Self {
        check_type.to_string()
    }
}

impl fmt::Display for CheckType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckType::Std => write!(f, "std"),
            CheckType::Range => write!(f, "range"),
        }
    }
}
