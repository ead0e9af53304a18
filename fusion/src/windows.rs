//! Optimal Window Detection
//!
//! Single ascending pass over time-ordered forecast points with an
//! explicit two-state scan: no window open, or one window accumulating.
//! A window closes on the first below-threshold point or at end of input,
//! and is retained only if it meets the minimum duration.

use crate::forecast::ForecastPoint;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Window scan parameters.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct WindowConfig {
    /// Composite score a point needs to belong to a window.
    pub min_score: f64,
    /// Forecast cadence in hours; window duration is point count times
    /// this interval.
    pub interval_hours: f64,
    /// Windows shorter than this are discarded on close.
    pub min_duration_hours: f64,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            min_score: 70.0,
            interval_hours: 3.0,
            min_duration_hours: 3.0,
        }
    }
}

/// Maximal contiguous run of good-condition forecast points.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimalWindow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub duration_hours: f64,
    pub scores: Vec<f64>,
    pub hour_labels: Vec<String>,
    /// Observed weather conditions, deduplicated in first-seen order.
    pub conditions: Vec<String>,
    pub avg_score: f64,
    pub max_score: f64,
}

/// Accumulator for the currently open window.
#[derive(Debug)]
struct WindowBuilder {
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    scores: Vec<f64>,
    hour_labels: Vec<String>,
    conditions: Vec<String>,
}

impl WindowBuilder {
    fn open(point: &ForecastPoint) -> Self {
        Self {
            start_time: point.timestamp,
            end_time: point.timestamp,
            scores: vec![point.outdoor_score],
            hour_labels: vec![point.hour_label.clone()],
            conditions: vec![point.weather.clone()],
        }
    }

    fn append(&mut self, point: &ForecastPoint) {
        self.end_time = point.timestamp;
        self.scores.push(point.outdoor_score);
        self.hour_labels.push(point.hour_label.clone());
        if !self.conditions.contains(&point.weather) {
            self.conditions.push(point.weather.clone());
        }
    }

    /// Close the window; `None` when it falls short of the minimum
    /// duration.
    fn close(self, cfg: &WindowConfig) -> Option<OptimalWindow> {
        let duration_hours = self.scores.len() as f64 * cfg.interval_hours;
        if duration_hours < cfg.min_duration_hours {
            return None;
        }

        let avg_score = self.scores.iter().sum::<f64>() / self.scores.len() as f64;
        let max_score = self.scores.iter().cloned().fold(f64::MIN, f64::max);

        Some(OptimalWindow {
            start_time: self.start_time,
            end_time: self.end_time,
            duration_hours,
            scores: self.scores,
            hour_labels: self.hour_labels,
            conditions: self.conditions,
            avg_score,
            max_score,
        })
    }
}

#[derive(Debug)]
enum ScanState {
    Idle,
    Open(WindowBuilder),
}

/// Extract all retained windows, ranked by average score descending.
/// The sort is stable, so ties keep discovery order.
pub fn find_windows(points: &[ForecastPoint], cfg: &WindowConfig) -> Vec<OptimalWindow> {
    let mut windows = Vec::new();
    let mut state = ScanState::Idle;

    for point in points {
        state = match (state, point.outdoor_score >= cfg.min_score) {
            (ScanState::Idle, true) => ScanState::Open(WindowBuilder::open(point)),
            (ScanState::Idle, false) => ScanState::Idle,
            (ScanState::Open(mut builder), true) => {
                builder.append(point);
                ScanState::Open(builder)
            }
            (ScanState::Open(builder), false) => {
                if let Some(window) = builder.close(cfg) {
                    windows.push(window);
                }
                ScanState::Idle
            }
        };
    }

    if let ScanState::Open(builder) = state {
        if let Some(window) = builder.close(cfg) {
            windows.push(window);
        }
    }

    windows.sort_by(|a, b| {
        b.avg_score
            .partial_cmp(&a.avg_score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    windows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn points(scores: &[f64]) -> Vec<ForecastPoint> {
        let base = Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap();
        scores
            .iter()
            .enumerate()
            .map(|(i, &score)| {
                let ts = base + chrono::Duration::hours(i as i64 * 3);
                ForecastPoint {
                    timestamp: ts,
                    hour_label: ts.format("%a %H:%M").to_string(),
                    temperature: 15.0,
                    weather: if i % 2 == 0 { "Clear" } else { "Clouds" }.to_string(),
                    weather_description: String::new(),
                    pop: 10.0,
                    temp_score: 100.0,
                    aqi_score: 100.0,
                    weather_score: 80.0,
                    bikes_score: 100.0,
                    outdoor_score: score,
                    confidence: 0.9,
                    bikes_estimated: 1200,
                }
            })
            .collect()
    }

    fn cfg(min_score: f64, min_duration: f64) -> WindowConfig {
        WindowConfig {
            min_score,
            interval_hours: 3.0,
            min_duration_hours: min_duration,
        }
    }

    #[test]
    fn contiguous_runs_form_ranked_windows() {
        let pts = points(&[80.0, 75.0, 60.0, 85.0, 90.0, 40.0]);
        let windows = find_windows(&pts, &cfg(70.0, 6.0));

        assert_eq!(windows.len(), 2);
        // Ranked by average score: {85, 90} first, then {80, 75}.
        assert_eq!(windows[0].avg_score, 87.5);
        assert_eq!(windows[0].scores, vec![85.0, 90.0]);
        assert_eq!(windows[0].duration_hours, 6.0);
        assert_eq!(windows[1].avg_score, 77.5);
        assert_eq!(windows[1].scores, vec![80.0, 75.0]);
        assert_eq!(windows[1].max_score, 80.0);
    }

    #[test]
    fn window_open_at_end_of_input_is_closed() {
        let pts = points(&[40.0, 75.0, 80.0]);
        let windows = find_windows(&pts, &cfg(70.0, 6.0));
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].scores, vec![75.0, 80.0]);
        assert_eq!(windows[0].end_time, pts[2].timestamp);
    }

    #[test]
    fn short_windows_are_discarded() {
        let pts = points(&[80.0, 40.0, 85.0, 90.0, 95.0, 40.0]);
        let windows = find_windows(&pts, &cfg(70.0, 9.0));
        assert_eq!(windows.len(), 1);
        assert_eq!(windows[0].duration_hours, 9.0);
    }

    #[test]
    fn ties_keep_discovery_order() {
        let pts = points(&[80.0, 80.0, 10.0, 80.0, 80.0]);
        let windows = find_windows(&pts, &cfg(70.0, 6.0));
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].avg_score, windows[1].avg_score);
        assert!(windows[0].start_time < windows[1].start_time);
    }

    #[test]
    fn conditions_are_deduplicated_in_first_seen_order() {
        let pts = points(&[80.0, 80.0, 80.0, 80.0]);
        let windows = find_windows(&pts, &cfg(70.0, 3.0));
        assert_eq!(windows[0].conditions, vec!["Clear", "Clouds"]);
    }

    #[test]
    fn empty_input_yields_no_windows() {
        assert!(find_windows(&[], &WindowConfig::default()).is_empty());
    }
}
