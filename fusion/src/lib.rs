//! Fairweather Fusion Engine
//!
//! Aligns independently-sampled environmental signals onto a common
//! hourly timeline and turns them into a bounded outdoor score, a
//! go/stay recommendation and ranked forecast windows.
//!
//! # Modules
//!
//! - [`align`] - Hourly aggregation, left-join fusion and gap filling
//! - [`scoring`] - Per-signal scoring functions and the weighted composite
//! - [`patterns`] - Correlation and threshold statistics over scored hours
//! - [`recommend`] - Score-band mapping to an actionable recommendation
//! - [`forecast`] - Forecast scoring with synthetic bike estimates and
//!   lead-time confidence decay
//! - [`windows`] - Contiguous good-condition window detection
//! - [`report`] - Forecast summary and outlook bundling
//! - [`analyzer`] - Top-level analysis and prediction entry points
//!
//! The engine is synchronous and side-effect free: every operation is a
//! pure function of the records handed to it. Acquisition and persistence
//! live behind the traits in `fairweather-ingest`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod align;
pub mod analyzer;
pub mod forecast;
pub mod patterns;
pub mod recommend;
pub mod report;
pub mod scoring;
pub mod windows;

pub use align::{aggregate_motion_hourly, fuse, FusedRow};
pub use analyzer::{Analysis, Forecaster, OutdoorAnalyzer, Prediction};
pub use forecast::{BikeEstimateRanges, ForecastConfig, ForecastEngine, ForecastPoint};
pub use patterns::{analyze, CorrelationClass, HighActivityStats, PatternAnalysis, PatternConfig};
pub use recommend::{recommend, ConditionDetails, Recommendation, Urgency};
pub use report::{build_report, ForecastReport, Outlook, ReportSummary, TimeHighlight};
pub use scoring::{score_rows, ScoreWeights, ScoredRow, SignalScores};
pub use windows::{find_windows, OptimalWindow, WindowConfig};

/// Round to one decimal place, the precision carried by every published
/// score.
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Short "Mon 14:00" style label for forecast output.
pub(crate) fn hour_label(ts: DateTime<Utc>) -> String {
    ts.format("%a %H:%M").to_string()
}

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum FusionError {
    #[error("Ingest error: {0}")]
    Ingest(#[from] fairweather_ingest::IngestError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, FusionError>;

/// Compact (hour, composite) pair for dashboards and logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredHour {
    pub hour: DateTime<Utc>,
    pub outdoor_score: f64,
}

impl From<&ScoredRow> for ScoredHour {
    fn from(row: &ScoredRow) -> Self {
        Self {
            hour: row.row.hour,
            outdoor_score: row.outdoor_score,
        }
    }
}
