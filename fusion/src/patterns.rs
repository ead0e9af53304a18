//! Pattern Analysis
//!
//! Correlation and threshold statistics over a scored historical table:
//! how indoor activity relates to outdoor conditions, and how often good
//! conditions went unused.

use crate::scoring::ScoredRow;
use crate::round1;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Heuristic thresholds for the analyzer. The correlation cutoffs and the
/// high-motion quantile have no derivation beyond field calibration, so
/// they stay configurable rather than baked in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PatternConfig {
    /// Correlation below the negated value classifies as strong inverse,
    /// above it as positive.
    pub correlation_threshold: f64,
    /// Composite score from which an hour counts as "good conditions".
    pub good_score: f64,
    /// Quantile of motion events above which an hour counts as high
    /// activity for the missed-opportunity rule.
    pub high_motion_quantile: f64,
}

impl Default for PatternConfig {
    fn default() -> Self {
        Self {
            correlation_threshold: 0.3,
            good_score: 70.0,
            high_motion_quantile: 0.75,
        }
    }
}

/// Classification of the motion / outdoor-score correlation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CorrelationClass {
    StrongInverse,
    Positive,
    Weak,
}

impl fmt::Display for CorrelationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CorrelationClass::StrongInverse => write!(f, "Strong inverse correlation"),
            CorrelationClass::Positive => write!(f, "Positive correlation"),
            CorrelationClass::Weak => write!(f, "Weak correlation"),
        }
    }
}

/// Statistics over the above-median-activity subset.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct HighActivityStats {
    pub avg_score: f64,
    /// Mean over hours where temperature was present; `None` when the
    /// column never reported.
    pub avg_temperature: Option<f64>,
}

/// Result of one pattern analysis pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternAnalysis {
    pub motion_outdoor_correlation: f64,
    pub insight: CorrelationClass,
    pub high_activity: Option<HighActivityStats>,
    pub good_condition_hours: usize,
    pub good_condition_percentage: f64,
    pub missed_opportunities: usize,
}

/// Pearson correlation; zero-variance input reports 0.0 rather than NaN.
fn pearson(xs: &[f64], ys: &[f64]) -> f64 {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut denom_x = 0.0;
    let mut denom_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        num += dx * dy;
        denom_x += dx * dx;
        denom_y += dy * dy;
    }

    let denom = (denom_x * denom_y).sqrt();
    if denom < f64::EPSILON {
        return 0.0;
    }
    num / denom
}

fn median(values: &mut [f64]) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let n = values.len();
    if n % 2 == 1 {
        values[n / 2]
    } else {
        (values[n / 2 - 1] + values[n / 2]) / 2.0
    }
}

/// Linearly-interpolated quantile over a sorted copy of `values`.
fn quantile(values: &mut [f64], q: f64) -> f64 {
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let pos = q * (values.len() - 1) as f64;
    let lower = pos.floor() as usize;
    let upper = pos.ceil() as usize;
    let frac = pos - lower as f64;
    values[lower] + frac * (values[upper] - values[lower])
}

/// Analyze a scored table. Fewer than two rows is degenerate input and
/// returns `None`, never an error.
pub fn analyze(rows: &[ScoredRow], cfg: &PatternConfig) -> Option<PatternAnalysis> {
    if rows.len() < 2 {
        return None;
    }

    let events: Vec<f64> = rows.iter().map(|r| r.row.motion_events as f64).collect();
    let scores: Vec<f64> = rows.iter().map(|r| r.outdoor_score).collect();

    let corr = pearson(&events, &scores);
    let insight = if corr < -cfg.correlation_threshold {
        CorrelationClass::StrongInverse
    } else if corr > cfg.correlation_threshold {
        CorrelationClass::Positive
    } else {
        CorrelationClass::Weak
    };

    let med = median(&mut events.clone());
    let high: Vec<&ScoredRow> = rows
        .iter()
        .filter(|r| (r.row.motion_events as f64) > med)
        .collect();
    let high_activity = if high.is_empty() {
        None
    } else {
        let avg_score =
            round1(high.iter().map(|r| r.outdoor_score).sum::<f64>() / high.len() as f64);
        let temps: Vec<f64> = high.iter().filter_map(|r| r.row.temperature).collect();
        let avg_temperature = if temps.is_empty() {
            None
        } else {
            Some(round1(temps.iter().sum::<f64>() / temps.len() as f64))
        };
        Some(HighActivityStats {
            avg_score,
            avg_temperature,
        })
    };

    let good_condition_hours = rows
        .iter()
        .filter(|r| r.outdoor_score >= cfg.good_score)
        .count();
    let good_condition_percentage =
        round1(good_condition_hours as f64 / rows.len() as f64 * 100.0);

    let high_motion = quantile(&mut events.clone(), cfg.high_motion_quantile);
    let missed_opportunities = rows
        .iter()
        .filter(|r| {
            r.outdoor_score >= cfg.good_score && (r.row.motion_events as f64) > high_motion
        })
        .count();

    Some(PatternAnalysis {
        motion_outdoor_correlation: (corr * 1000.0).round() / 1000.0,
        insight,
        high_activity,
        good_condition_hours,
        good_condition_percentage,
        missed_opportunities,
    })
}
