//! Forecast Report
//!
//! Bundles scored forecast points and their windows into a summary with
//! an overall outlook and the best and worst times in the horizon.

use crate::forecast::ForecastPoint;
use crate::round1;
use crate::windows::OptimalWindow;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Overall outlook band for the horizon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outlook {
    Excellent,
    Good,
    Mixed,
    Poor,
    Unknown,
}

impl Outlook {
    fn from_avg(avg_score: f64) -> Self {
        if avg_score >= 70.0 {
            Outlook::Excellent
        } else if avg_score >= 55.0 {
            Outlook::Good
        } else if avg_score >= 40.0 {
            Outlook::Mixed
        } else {
            Outlook::Poor
        }
    }
}

impl fmt::Display for Outlook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outlook::Excellent => write!(f, "Excellent - Multiple good opportunities ahead"),
            Outlook::Good => write!(f, "Good - Several favorable windows expected"),
            Outlook::Mixed => write!(f, "Mixed - Some opportunities but watch conditions"),
            Outlook::Poor => write!(f, "Poor - Limited favorable conditions expected"),
            Outlook::Unknown => write!(f, "Unknown - No forecast data available"),
        }
    }
}

/// Best or worst point in the horizon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimeHighlight {
    pub when: String,
    pub score: f64,
    pub conditions: String,
}

impl TimeHighlight {
    fn from_point(point: &ForecastPoint) -> Self {
        Self {
            when: point.hour_label.clone(),
            score: point.outdoor_score,
            conditions: format!("{:.1}°C, {}", point.temperature, point.weather),
        }
    }
}

/// Horizon-level summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportSummary {
    pub avg_score: f64,
    pub outlook: Outlook,
    pub best_time: Option<TimeHighlight>,
    pub worst_time: Option<TimeHighlight>,
}

/// Complete forecast bundle: summary, ranked windows and the full
/// per-point table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    pub summary: ReportSummary,
    pub windows: Vec<OptimalWindow>,
    pub hourly_predictions: Vec<ForecastPoint>,
}

/// Build the report. Empty input yields a degenerate report with outlook
/// Unknown and no windows, not an error.
pub fn build_report(points: Vec<ForecastPoint>, windows: Vec<OptimalWindow>) -> ForecastReport {
    if points.is_empty() {
        return ForecastReport {
            summary: ReportSummary {
                avg_score: 0.0,
                outlook: Outlook::Unknown,
                best_time: None,
                worst_time: None,
            },
            windows: Vec::new(),
            hourly_predictions: Vec::new(),
        };
    }

    let avg_score =
        round1(points.iter().map(|p| p.outdoor_score).sum::<f64>() / points.len() as f64);

    // First occurrence wins on ties.
    let best = points
        .iter()
        .reduce(|a, b| if b.outdoor_score > a.outdoor_score { b } else { a })
        .map(TimeHighlight::from_point);
    let worst = points
        .iter()
        .reduce(|a, b| if b.outdoor_score < a.outdoor_score { b } else { a })
        .map(TimeHighlight::from_point);

    ForecastReport {
        summary: ReportSummary {
            avg_score,
            outlook: Outlook::from_avg(avg_score),
            best_time: best,
            worst_time: worst,
        },
        windows,
        hourly_predictions: points,
    }
}
