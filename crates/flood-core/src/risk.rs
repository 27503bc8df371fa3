//! Risk levels and assessments.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;
use crate::observation::Observation;
use crate::RegionId;

/// How long an assessment stays current after it is computed.
pub const ASSESSMENT_HORIZON_HOURS: i64 = 24;

/// Qualitative flood risk, in ascending order of severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Minimal,
    Low,
    Moderate,
    High,
    Critical,
}

impl RiskLevel {
    /// Map a risk score to its level.
    ///
    /// | Score | Level |
    /// |-------|-------|
    /// | >= 70 | critical |
    /// | >= 50 | high |
    /// | >= 30 | moderate |
    /// | >= 15 | low |
    /// | < 15  | minimal |
    pub fn from_score(score: u8) -> Self {
        match score {
            70.. => RiskLevel::Critical,
            50..=69 => RiskLevel::High,
            30..=49 => RiskLevel::Moderate,
            15..=29 => RiskLevel::Low,
            _ => RiskLevel::Minimal,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Minimal => "minimal",
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
            RiskLevel::Critical => "critical",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "minimal" => Ok(RiskLevel::Minimal),
            "low" => Ok(RiskLevel::Low),
            "moderate" => Ok(RiskLevel::Moderate),
            "high" => Ok(RiskLevel::High),
            "critical" => Ok(RiskLevel::Critical),
            other => Err(ParseEnumError {
                kind: "risk level",
                value: other.to_string(),
            }),
        }
    }
}

/// Clamp a raw additive score into `0..=100`.
pub fn clamp_score(raw: i64) -> u8 {
    raw.clamp(0, 100) as u8
}

/// The aggregator's output for one region at one point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub region_id: RegionId,
    /// Always within `0..=100`.
    pub risk_score: u8,
    /// Always `RiskLevel::from_score(risk_score)`.
    pub risk_level: RiskLevel,
    /// Contributing factors, rainfall first, then water level.
    pub factors: Vec<String>,
    pub computed_at: DateTime<Utc>,
    pub valid_until: DateTime<Utc>,
    /// Snapshots of the observations the score was computed from.
    pub inputs: Vec<Observation>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_boundaries() {
        assert_eq!(RiskLevel::from_score(100), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(70), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(69), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(50), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(49), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(30), RiskLevel::Moderate);
        assert_eq!(RiskLevel::from_score(29), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(15), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(14), RiskLevel::Minimal);
        assert_eq!(RiskLevel::from_score(0), RiskLevel::Minimal);
    }

    #[test]
    fn test_level_is_monotonic_in_score() {
        let mut previous = RiskLevel::from_score(0);
        for score in 1..=100u8 {
            let level = RiskLevel::from_score(score);
            assert!(level >= previous, "level dropped at score {}", score);
            previous = level;
        }
    }

    #[test]
    fn test_clamp_score() {
        assert_eq!(clamp_score(-5), 0);
        assert_eq!(clamp_score(40), 40);
        assert_eq!(clamp_score(130), 100);
    }

    #[test]
    fn test_level_parse_is_case_insensitive() {
        assert_eq!("HIGH".parse::<RiskLevel>(), Ok(RiskLevel::High));
        assert_eq!(" critical ".parse::<RiskLevel>(), Ok(RiskLevel::Critical));
        assert!("severe".parse::<RiskLevel>().is_err());
    }
}
