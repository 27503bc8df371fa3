//! Action recommendations.

use flood_core::Observation;

use crate::scoring::{
    scored_gauge, scored_rainfall, DANGER_LEVEL_POINTS, HEAVY_RAIN_MM, MODERATE_RAIN_MM,
    WARNING_LEVEL_POINTS,
};

/// Prioritized actions for a set of observations.
///
/// Rainfall and water level are evaluated on their own, so a heavy-rain
/// instruction appears even when the blended score stays low. Never empty.
pub fn recommend(observations: &[Observation]) -> Vec<String> {
    let mut actions: Vec<&str> = Vec::new();

    if let Some((_, mm)) = scored_rainfall(observations) {
        if mm > HEAVY_RAIN_MM {
            actions.extend(["Issue severe weather warnings", "Prepare for potential flash floods"]);
        } else if mm > MODERATE_RAIN_MM {
            actions.extend(["Monitor rainfall patterns closely", "Alert vulnerable communities"]);
        }
    }

    if let Some(gauge) = scored_gauge(observations) {
        match gauge.points() {
            DANGER_LEVEL_POINTS => actions.extend([
                "Immediate evacuation of low-lying areas",
                "Deploy emergency response teams",
            ]),
            WARNING_LEVEL_POINTS => {
                actions.extend(["Prepare evacuation plans", "Monitor water levels continuously"])
            }
            _ => {}
        }
    }

    if actions.is_empty() {
        actions.extend(["Continue normal monitoring", "Update flood preparedness plans"]);
    }

    actions.into_iter().map(String::from).collect()
}
