//! Forecast Scoring
//!
//! Applies the scoring engine to forecast records. Bike availability has
//! no forecast source, so it is estimated from the time of day; air
//! quality reuses a single baseline category across the horizon. Forecast
//! confidence decays linearly with lead time and never drops below 0.5.

use crate::scoring::{
    score_air_quality, score_bikes, score_temperature, score_weather, ScoreWeights, SignalScores,
};
use crate::{hour_label, round1};
use chrono::{DateTime, Timelike, Utc};
use fairweather_ingest::{AqiCategory, ForecastRecord};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Synthetic bike-availability ranges by time-of-day bucket. Tunable
/// parameters, not a contract: only the ordering (rush low, overnight
/// high) matters to consumers.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct BikeEstimateRanges {
    pub rush: (u32, u32),
    pub overnight: (u32, u32),
    pub daytime: (u32, u32),
}

impl Default for BikeEstimateRanges {
    fn default() -> Self {
        Self {
            rush: (800, 1000),
            overnight: (1200, 1500),
            daytime: (1000, 1300),
        }
    }
}

/// Forecast engine parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastConfig {
    pub weights: ScoreWeights,
    pub bike_ranges: BikeEstimateRanges,
    /// Precipitation probability above which the weather score is
    /// penalized, in percent.
    pub precipitation_cutoff: f64,
    /// Multiplier applied to the weather score past the cutoff.
    pub precipitation_penalty: f64,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            weights: ScoreWeights::default(),
            bike_ranges: BikeEstimateRanges::default(),
            precipitation_cutoff: 50.0,
            precipitation_penalty: 0.6,
        }
    }
}

/// One scored forecast entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub timestamp: DateTime<Utc>,
    pub hour_label: String,
    pub temperature: f64,
    pub weather: String,
    pub weather_description: String,
    pub pop: f64,
    pub temp_score: f64,
    pub aqi_score: f64,
    pub weather_score: f64,
    pub bikes_score: f64,
    pub outdoor_score: f64,
    /// Lead-time confidence, 0.5 - 1.0.
    pub confidence: f64,
    pub bikes_estimated: u32,
}

/// Estimated particulate concentration for a provider AQI category.
/// Unknown categories fall back to a neutral 50.
fn category_concentration(category: AqiCategory) -> f64 {
    match category.0 {
        1 => 12.0,
        2 => 35.0,
        3 => 55.0,
        4 => 150.0,
        5 => 250.0,
        _ => 50.0,
    }
}

fn is_rush_hour(hour: u32) -> bool {
    (7..=9).contains(&hour) || (17..=19).contains(&hour)
}

fn is_overnight(hour: u32) -> bool {
    hour >= 22 || hour <= 6
}

/// Confidence decays linearly over a 48-hour horizon, floored at 0.5 and
/// capped at 1.0 so points behind `now` never report inflated certainty.
fn lead_time_confidence(now: DateTime<Utc>, point: DateTime<Utc>) -> f64 {
    let hours_ahead = (point - now).num_seconds() as f64 / 3600.0;
    let raw = 1.0 - (hours_ahead / 48.0) * 0.4;
    (raw.clamp(0.5, 1.0) * 100.0).round() / 100.0
}

/// Applies the shared scoring functions to forecast records. Owns its RNG
/// so bike estimates are reproducible under a fixed seed.
#[derive(Debug)]
pub struct ForecastEngine {
    cfg: ForecastConfig,
    rng: StdRng,
}

impl ForecastEngine {
    pub fn new(cfg: ForecastConfig) -> Self {
        Self {
            cfg,
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(cfg: ForecastConfig, seed: u64) -> Self {
        Self {
            cfg,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    fn estimate_bikes(&mut self, hour: u32) -> u32 {
        let (lo, hi) = if is_rush_hour(hour) {
            self.cfg.bike_ranges.rush
        } else if is_overnight(hour) {
            self.cfg.bike_ranges.overnight
        } else {
            self.cfg.bike_ranges.daytime
        };
        self.rng.gen_range(lo..hi)
    }

    /// Score a forecast horizon against a single baseline air-quality
    /// category. `now` anchors the confidence decay.
    pub fn predict(
        &mut self,
        records: &[ForecastRecord],
        baseline: AqiCategory,
        now: DateTime<Utc>,
    ) -> Vec<ForecastPoint> {
        let concentration = category_concentration(baseline);

        records
            .iter()
            .map(|record| {
                let bikes_estimated = self.estimate_bikes(record.timestamp.hour());

                let temp_score = score_temperature(Some(record.temperature));
                let aqi_score = score_air_quality(Some(concentration));
                let mut weather_score = score_weather(Some(record.weather.as_str()));
                let bikes_score = score_bikes(Some(bikes_estimated as f64));

                if record.pop > self.cfg.precipitation_cutoff {
                    weather_score *= self.cfg.precipitation_penalty;
                }

                let scores = SignalScores {
                    temperature: temp_score,
                    air_quality: aqi_score,
                    weather: weather_score,
                    bikes: bikes_score,
                };

                ForecastPoint {
                    timestamp: record.timestamp,
                    hour_label: hour_label(record.timestamp),
                    temperature: record.temperature,
                    weather: record.weather.clone(),
                    weather_description: record.weather_description.clone(),
                    pop: record.pop,
                    temp_score: round1(temp_score),
                    aqi_score: round1(aqi_score),
                    weather_score: round1(weather_score),
                    bikes_score: round1(bikes_score),
                    outdoor_score: scores.composite(&self.cfg.weights),
                    confidence: lead_time_confidence(now, record.timestamp),
                    bikes_estimated,
                }
            })
            .collect()
    }
}
