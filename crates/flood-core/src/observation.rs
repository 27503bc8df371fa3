//! Normalized observations produced by source adapters.
//!
//! Every numeric value is keyed by a [`Metric`], and every metric has exactly
//! one [`Unit`]. Adapters convert upstream payloads into this fixed schema so
//! no consumer ever has to interpret a free-form unit string.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;

/// The upstream feed an observation came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Short-term precipitation nowcast (0-6 hours).
    Nowcast,
    /// Daily rainfall totals for the recent past.
    HistoricalRainfall,
    /// River gauge water level.
    WaterLevel,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Nowcast => "nowcast",
            SourceKind::HistoricalRainfall => "historical_rainfall",
            SourceKind::WaterLevel => "water_level",
        }
    }

    /// Whether this feed reports rainfall.
    pub fn is_rainfall(&self) -> bool {
        matches!(self, SourceKind::Nowcast | SourceKind::HistoricalRainfall)
    }
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceKind {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "nowcast" => Ok(SourceKind::Nowcast),
            "historical_rainfall" => Ok(SourceKind::HistoricalRainfall),
            "water_level" => Ok(SourceKind::WaterLevel),
            other => Err(ParseEnumError {
                kind: "source",
                value: other.to_string(),
            }),
        }
    }
}

/// Physical unit of a metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Unit {
    Millimeters,
    Meters,
    CubicMetersPerSecond,
}

impl Unit {
    pub fn symbol(&self) -> &'static str {
        match self {
            Unit::Millimeters => "mm",
            Unit::Meters => "m",
            Unit::CubicMetersPerSecond => "m3/s",
        }
    }
}

/// A named quantity carried by an observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    /// Rainfall over the last (or next) hour, mm.
    Rainfall1h,
    /// Rainfall over a 3-hour window, mm.
    Rainfall3h,
    /// Rainfall over a 6-hour window, mm.
    Rainfall6h,
    /// Rainfall over a 24-hour window, mm.
    Rainfall24h,
    /// Accumulated rainfall over the last 7 days, mm. Informational only.
    Rainfall7dTotal,
    /// Current river stage, m.
    WaterLevel,
    /// Gauge warning stage, m.
    WarningLevel,
    /// Gauge danger stage, m.
    DangerLevel,
    /// Gauge normal stage, m.
    NormalLevel,
    /// River discharge, m3/s.
    FlowRate,
}

impl Metric {
    /// Rainfall intensity windows, narrowest first.
    pub const RAINFALL_WINDOWS: [Metric; 4] = [
        Metric::Rainfall1h,
        Metric::Rainfall3h,
        Metric::Rainfall6h,
        Metric::Rainfall24h,
    ];

    pub fn unit(&self) -> Unit {
        match self {
            Metric::Rainfall1h
            | Metric::Rainfall3h
            | Metric::Rainfall6h
            | Metric::Rainfall24h
            | Metric::Rainfall7dTotal => Unit::Millimeters,
            Metric::WaterLevel | Metric::WarningLevel | Metric::DangerLevel | Metric::NormalLevel => {
                Unit::Meters
            }
            Metric::FlowRate => Unit::CubicMetersPerSecond,
        }
    }

    /// Window length in hours for rainfall intensity metrics.
    ///
    /// Returns `None` for every metric the scoring policy does not treat as
    /// an intensity window (including the 7-day accumulation).
    pub fn rainfall_window_hours(&self) -> Option<u32> {
        match self {
            Metric::Rainfall1h => Some(1),
            Metric::Rainfall3h => Some(3),
            Metric::Rainfall6h => Some(6),
            Metric::Rainfall24h => Some(24),
            _ => None,
        }
    }
}

/// One normalized reading from a single upstream feed.
///
/// Observations are built once by an adapter and then only read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub source: SourceKind,
    /// Region, location or gauge station the reading belongs to.
    pub target_id: String,
    pub captured_at: DateTime<Utc>,
    pub metrics: BTreeMap<Metric, f64>,
    pub valid_until: DateTime<Utc>,
}

impl Observation {
    /// Create an observation with no metrics.
    pub fn new(
        source: SourceKind,
        target_id: impl Into<String>,
        captured_at: DateTime<Utc>,
        valid_until: DateTime<Utc>,
    ) -> Self {
        Self {
            source,
            target_id: target_id.into(),
            captured_at,
            metrics: BTreeMap::new(),
            valid_until,
        }
    }

    /// Add a metric value. Non-finite values are dropped.
    pub fn with_metric(mut self, metric: Metric, value: f64) -> Self {
        if value.is_finite() {
            self.metrics.insert(metric, value);
        }
        self
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        self.metrics.get(&metric).copied()
    }

    /// The widest rainfall intensity window this observation carries.
    pub fn widest_rainfall_window(&self) -> Option<(Metric, f64)> {
        Metric::RAINFALL_WINDOWS
            .iter()
            .rev()
            .find_map(|m| self.metric(*m).map(|v| (*m, v)))
    }

    /// Whether the observation is past its validity at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.valid_until < now
    }
}
