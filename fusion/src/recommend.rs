//! Recommendation Mapping
//!
//! Maps the chronologically last scored hour to a categorical go/stay
//! recommendation with an urgency tier and a snapshot of the raw
//! conditions behind it.

use crate::scoring::ScoredRow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Recommendation strength derived from the score bands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
    None,
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Urgency::High => write!(f, "high"),
            Urgency::Medium => write!(f, "medium"),
            Urgency::Low => write!(f, "low"),
            Urgency::None => write!(f, "none"),
        }
    }
}

/// Formatted snapshot of the raw values at the recommendation's hour.
/// Fields a source never reported stay absent.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConditionDetails {
    pub temperature: Option<String>,
    pub aqi: Option<i64>,
    pub weather: Option<String>,
    pub bikes_available: Option<i64>,
    pub timestamp: Option<String>,
}

/// Actionable recommendation for the current hour.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub should_go_outside: bool,
    pub score: f64,
    pub reason: String,
    pub urgency: Urgency,
    pub details: ConditionDetails,
}

impl Recommendation {
    /// Fixed neutral recommendation for an empty table. A normal outcome,
    /// not an error.
    pub fn no_data() -> Self {
        Self {
            should_go_outside: false,
            score: 0.0,
            reason: "No data available".to_string(),
            urgency: Urgency::None,
            details: ConditionDetails::default(),
        }
    }

    pub fn headline(&self) -> &'static str {
        if self.should_go_outside {
            "GO OUTSIDE"
        } else {
            "STAY INSIDE"
        }
    }
}

/// Map the latest scored hour to a recommendation.
pub fn recommend(rows: &[ScoredRow]) -> Recommendation {
    let Some(latest) = rows.last() else {
        return Recommendation::no_data();
    };

    let score = latest.outdoor_score;
    let (should_go_outside, urgency, reason) = if score >= 80.0 {
        (true, Urgency::High, "Excellent outdoor conditions")
    } else if score >= 60.0 {
        (true, Urgency::Medium, "Good outdoor conditions")
    } else if score >= 40.0 {
        (false, Urgency::Low, "Acceptable but not ideal")
    } else {
        (false, Urgency::None, "Poor conditions")
    };

    Recommendation {
        should_go_outside,
        score,
        reason: reason.to_string(),
        urgency,
        details: ConditionDetails {
            temperature: latest.row.temperature.map(|t| format!("{:.1}°C", t)),
            aqi: latest.row.aqi.map(|a| a as i64),
            weather: latest.row.weather.clone(),
            bikes_available: latest.row.total_bikes_available.map(|b| b as i64),
            timestamp: Some(latest.row.hour.format("%Y-%m-%d %H:%M").to_string()),
        },
    }
}
