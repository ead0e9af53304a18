//! Outdoor Scoring
//!
//! Four independent per-signal scoring functions plus the fixed-weight
//! composite. Every function is pure and total: missing input maps to an
//! explicit neutral 50, and every output lies in [0, 100]. The same
//! functions serve the historical path and the forecast path.

use crate::align::FusedRow;
use crate::round1;
use serde::{Deserialize, Serialize};

/// Composite weights. The defaults sum to exactly 1.0 and are the
/// published contract for the outdoor score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ScoreWeights {
    pub temperature: f64,
    pub air_quality: f64,
    pub weather: f64,
    pub bikes: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            temperature: 0.30,
            air_quality: 0.35,
            weather: 0.20,
            bikes: 0.15,
        }
    }
}

/// Per-signal scores for one hour, each in [0, 100].
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SignalScores {
    pub temperature: f64,
    pub air_quality: f64,
    pub weather: f64,
    pub bikes: f64,
}

impl SignalScores {
    /// Weighted composite, rounded to one decimal.
    pub fn composite(&self, weights: &ScoreWeights) -> f64 {
        round1(
            self.temperature * weights.temperature
                + self.air_quality * weights.air_quality
                + self.weather * weights.weather
                + self.bikes * weights.bikes,
        )
    }
}

/// One fused hour plus its derived scores.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredRow {
    pub row: FusedRow,
    pub scores: SignalScores,
    pub outdoor_score: f64,
}

const TEMP_OPTIMAL: (f64, f64) = (12.0, 22.0);
const TEMP_ACCEPTABLE: (f64, f64) = (5.0, 28.0);
const AQI_GOOD: f64 = 50.0;
const AQI_ACCEPTABLE: f64 = 100.0;
const BIKES_GOOD: f64 = 5.0;
const NEUTRAL: f64 = 50.0;

/// Temperature score: flat 100 in the optimal band, linear ramps across
/// the acceptable band, steep falloff outside it.
pub fn score_temperature(temp: Option<f64>) -> f64 {
    let Some(t) = temp else { return NEUTRAL };

    let (opt_min, opt_max) = TEMP_OPTIMAL;
    let (acc_min, acc_max) = TEMP_ACCEPTABLE;

    if (opt_min..=opt_max).contains(&t) {
        100.0
    } else if (acc_min..=acc_max).contains(&t) {
        if t < opt_min {
            50.0 + 50.0 * (t - acc_min) / (opt_min - acc_min)
        } else {
            50.0 + 50.0 * (acc_max - t) / (acc_max - opt_max)
        }
    } else {
        (50.0 - (t - 15.0).abs() * 5.0).max(0.0)
    }
}

/// Air-quality score, lower index is better. Beyond the acceptable band
/// the score decays exponentially and never goes negative.
pub fn score_air_quality(aqi: Option<f64>) -> f64 {
    let Some(aqi) = aqi else { return NEUTRAL };

    if aqi <= AQI_GOOD {
        100.0
    } else if aqi <= AQI_ACCEPTABLE {
        100.0 - 50.0 * (aqi - AQI_GOOD) / (AQI_ACCEPTABLE - AQI_GOOD)
    } else {
        (50.0 * (-(aqi - AQI_ACCEPTABLE) / 50.0).exp()).max(0.0)
    }
}

/// Fixed categorical lookup; unrecognized or missing labels are neutral.
pub fn score_weather(condition: Option<&str>) -> f64 {
    match condition {
        Some("Clear") => 100.0,
        Some("Clouds") => 80.0,
        Some("Mist") => 60.0,
        Some("Fog") => 50.0,
        Some("Drizzle") => 40.0,
        Some("Rain") => 20.0,
        Some("Thunderstorm") => 10.0,
        Some("Snow") => 30.0,
        _ => NEUTRAL,
    }
}

/// Bike-availability score. Zero availability is penalized below neutral
/// but not to the floor.
pub fn score_bikes(available: Option<f64>) -> f64 {
    let Some(bikes) = available else { return NEUTRAL };

    if bikes >= BIKES_GOOD {
        100.0
    } else if bikes > 0.0 {
        50.0 + 50.0 * (bikes / BIKES_GOOD)
    } else {
        25.0
    }
}

/// Score every fused row with the given weights.
pub fn score_rows(rows: &[FusedRow], weights: &ScoreWeights) -> Vec<ScoredRow> {
    rows.iter()
        .map(|row| {
            let scores = SignalScores {
                temperature: score_temperature(row.temperature),
                air_quality: score_air_quality(row.aqi),
                weather: score_weather(row.weather.as_deref()),
                bikes: score_bikes(row.total_bikes_available),
            };
            ScoredRow {
                outdoor_score: scores.composite(weights),
                scores,
                row: row.clone(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn temperature_bands() {
        assert_eq!(score_temperature(Some(17.0)), 100.0);
        assert_eq!(score_temperature(Some(12.0)), 100.0);
        assert_eq!(score_temperature(Some(22.0)), 100.0);
        // Upper acceptable-band ramp: 25 °C is halfway between 22 and 28.
        assert!((score_temperature(Some(25.0)) - 75.0).abs() < 1e-9);
        // Outside the acceptable band the falloff reaches zero.
        assert_eq!(score_temperature(Some(3.0)), 0.0);
        assert_eq!(score_temperature(None), 50.0);
    }

    #[test]
    fn air_quality_bands() {
        assert_eq!(score_air_quality(Some(50.0)), 100.0);
        assert!((score_air_quality(Some(100.0)) - 50.0).abs() < 1e-9);
        // 50 * e^-1
        assert!((score_air_quality(Some(150.0)) - 18.393972).abs() < 1e-4);
        assert_eq!(score_air_quality(None), 50.0);
    }

    #[test]
    fn weather_lookup() {
        assert_eq!(score_weather(Some("Clear")), 100.0);
        assert_eq!(score_weather(Some("Thunderstorm")), 10.0);
        assert_eq!(score_weather(Some("Sandstorm")), 50.0);
        assert_eq!(score_weather(None), 50.0);
    }

    #[test]
    fn bike_bands() {
        assert_eq!(score_bikes(Some(0.0)), 25.0);
        assert!((score_bikes(Some(3.0)) - 80.0).abs() < 1e-9);
        assert_eq!(score_bikes(Some(5.0)), 100.0);
        assert_eq!(score_bikes(Some(1200.0)), 100.0);
        assert_eq!(score_bikes(None), 50.0);
    }

    #[test]
    fn composite_uses_fixed_weights() {
        let scores = SignalScores {
            temperature: 100.0,
            air_quality: 100.0,
            weather: 100.0,
            bikes: 100.0,
        };
        assert_eq!(scores.composite(&ScoreWeights::default()), 100.0);

        let scores = SignalScores {
            temperature: 100.0,
            air_quality: 0.0,
            weather: 0.0,
            bikes: 0.0,
        };
        assert_eq!(scores.composite(&ScoreWeights::default()), 30.0);
    }

    #[test]
    fn every_score_is_bounded() {
        let weights = ScoreWeights::default();
        for i in -100..400 {
            let v = i as f64 / 2.0;
            let scores = SignalScores {
                temperature: score_temperature(Some(v)),
                air_quality: score_air_quality(Some(v)),
                weather: score_weather(Some("Rain")),
                bikes: score_bikes(Some(v)),
            };
            for s in [
                scores.temperature,
                scores.air_quality,
                scores.weather,
                scores.bikes,
                scores.composite(&weights),
            ] {
                assert!((0.0..=100.0).contains(&s), "score {} out of bounds", s);
            }
        }
    }

    #[test]
    fn scoring_is_pure() {
        let a = score_temperature(Some(19.5));
        let b = score_temperature(Some(19.5));
        assert_eq!(a, b);

        let scores = SignalScores {
            temperature: 87.0,
            air_quality: 55.0,
            weather: 80.0,
            bikes: 100.0,
        };
        let w = ScoreWeights::default();
        assert_eq!(scores.composite(&w), scores.composite(&w));
    }
}
