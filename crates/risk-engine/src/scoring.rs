//! Scoring rules.
//!
//! Each rule maps one reading to a point contribution and, when it fires,
//! a human-readable factor. Rules are additive and independent.

use flood_core::{Metric, Observation, SourceKind};
use flood_sources::{DEFAULT_DANGER_LEVEL_M, DEFAULT_WARNING_LEVEL_M};

/// Rainfall above this is heavy, mm.
pub const HEAVY_RAIN_MM: f64 = 80.0;
/// Rainfall above this is moderate, mm.
pub const MODERATE_RAIN_MM: f64 = 50.0;
/// Rainfall above this is light, mm.
pub const LIGHT_RAIN_MM: f64 = 20.0;

pub const HEAVY_RAIN_POINTS: i64 = 40;
pub const MODERATE_RAIN_POINTS: i64 = 25;
pub const LIGHT_RAIN_POINTS: i64 = 15;

pub const DANGER_LEVEL_POINTS: i64 = 50;
pub const WARNING_LEVEL_POINTS: i64 = 30;

pub const RAINFALL_UNAVAILABLE: &str = "Rainfall source unavailable";
pub const WATER_LEVEL_UNAVAILABLE: &str = "Water level source unavailable";

/// A rule that fired.
#[derive(Debug, Clone, PartialEq)]
pub struct Contribution {
    pub points: i64,
    pub factor: String,
}

/// Points for `mm` of rain. Thresholds are strict.
pub fn rainfall_points(mm: f64) -> i64 {
    if mm > HEAVY_RAIN_MM {
        HEAVY_RAIN_POINTS
    } else if mm > MODERATE_RAIN_MM {
        MODERATE_RAIN_POINTS
    } else if mm > LIGHT_RAIN_MM {
        LIGHT_RAIN_POINTS
    } else {
        0
    }
}

/// Score rainfall measured over `window`.
pub fn rainfall_contribution(window: Metric, mm: f64) -> Option<Contribution> {
    let points = rainfall_points(mm);
    let label = match points {
        HEAVY_RAIN_POINTS => "High",
        MODERATE_RAIN_POINTS => "Moderate",
        LIGHT_RAIN_POINTS => "Light",
        _ => return None,
    };
    let hours = window.rainfall_window_hours().unwrap_or(0);

    Some(Contribution {
        points,
        factor: format!("{} rainfall: {:.1}mm in {}h", label, mm, hours),
    })
}

/// Points for a river stage. Thresholds are inclusive.
pub fn water_level_points(current_m: f64, warning_m: f64, danger_m: f64) -> i64 {
    if current_m >= danger_m {
        DANGER_LEVEL_POINTS
    } else if current_m >= warning_m {
        WARNING_LEVEL_POINTS
    } else {
        0
    }
}

/// Score a river stage against its gauge thresholds.
pub fn water_level_contribution(
    current_m: f64,
    warning_m: f64,
    danger_m: f64,
) -> Option<Contribution> {
    match water_level_points(current_m, warning_m, danger_m) {
        DANGER_LEVEL_POINTS => Some(Contribution {
            points: DANGER_LEVEL_POINTS,
            factor: format!("Water level at danger: {:.1}m", current_m),
        }),
        WARNING_LEVEL_POINTS => Some(Contribution {
            points: WARNING_LEVEL_POINTS,
            factor: format!("Water level warning: {:.1}m", current_m),
        }),
        _ => None,
    }
}

/// The rainfall reading the policy scores.
///
/// Each observation offers its widest intensity window. Across observations
/// the reading worth the most points wins, since feeds cover different
/// periods (a nowcast looks ahead, history looks back). Ties go to the wider
/// window, then to the larger amount.
pub fn scored_rainfall(observations: &[Observation]) -> Option<(Metric, f64)> {
    observations
        .iter()
        .filter(|o| o.source.is_rainfall())
        .filter_map(Observation::widest_rainfall_window)
        .max_by(|a, b| {
            rainfall_points(a.1)
                .cmp(&rainfall_points(b.1))
                .then(a.0.rainfall_window_hours().cmp(&b.0.rainfall_window_hours()))
                .then(a.1.total_cmp(&b.1))
        })
}

/// A gauge reading with its effective thresholds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaugeReading {
    pub current_m: f64,
    pub warning_m: f64,
    pub danger_m: f64,
}

impl GaugeReading {
    pub fn from_observation(observation: &Observation) -> Option<Self> {
        if observation.source != SourceKind::WaterLevel {
            return None;
        }
        let current_m = observation.metric(Metric::WaterLevel)?;
        Some(Self {
            current_m,
            warning_m: observation
                .metric(Metric::WarningLevel)
                .unwrap_or(DEFAULT_WARNING_LEVEL_M),
            danger_m: observation
                .metric(Metric::DangerLevel)
                .unwrap_or(DEFAULT_DANGER_LEVEL_M),
        })
    }

    pub fn points(&self) -> i64 {
        water_level_points(self.current_m, self.warning_m, self.danger_m)
    }
}

/// The gauge reading the policy scores: the highest-contributing one.
pub fn scored_gauge(observations: &[Observation]) -> Option<GaugeReading> {
    observations
        .iter()
        .filter_map(GaugeReading::from_observation)
        .max_by(|a, b| {
            a.points()
                .cmp(&b.points())
                .then(a.current_m.total_cmp(&b.current_m))
        })
}
