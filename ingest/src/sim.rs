//! Simulated Collectors
//!
//! Stand-ins for the camera and open-data acquisition processes, plus the
//! synthetic forecast generator used when no real forecast is available.
//! Each generator owns a seedable RNG so demo runs and tests are
//! reproducible.

use crate::{
    AirQualityRecord, AqiCategory, BikeRecord, ForecastProvider, ForecastRecord, MotionRecord,
    Result, WeatherRecord,
};
use chrono::{DateTime, Timelike, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::f64::consts::PI;

/// Diurnal temperature model shared by the simulators: 12 °C base with a
/// 6 °C swing peaking mid-afternoon.
fn diurnal_temperature(hour_of_day: u32) -> f64 {
    12.0 + 6.0 * ((hour_of_day as f64 - 6.0) * PI / 12.0).sin()
}

fn weighted_weather(rng: &mut StdRng) -> &'static str {
    // Clear / Clouds / Rain at 0.5 / 0.3 / 0.2
    let roll: f64 = rng.gen_range(0.0..1.0);
    if roll < 0.5 {
        "Clear"
    } else if roll < 0.8 {
        "Clouds"
    } else {
        "Rain"
    }
}

/// Generates indoor motion samples with a plausible activity profile:
/// busier during waking hours, mostly quiet overnight.
#[derive(Debug)]
pub struct MotionSimulator {
    rng: StdRng,
}

impl MotionSimulator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn sample(&mut self, at: DateTime<Utc>) -> MotionRecord {
        let awake = (8..23).contains(&at.hour());
        let activity = if awake { 0.6 } else { 0.05 };
        let detected = self.rng.gen_range(0.0..1.0) < activity;

        MotionRecord {
            timestamp: at,
            unix_time: at.timestamp(),
            motion_detected: detected as u8,
            motion_intensity: if detected {
                self.rng.gen_range(0.05..0.6)
            } else {
                0.0
            },
            motion_area: if detected {
                self.rng.gen_range(500.0..12000.0)
            } else {
                0.0
            },
            brightness: if awake {
                self.rng.gen_range(90.0..180.0)
            } else {
                self.rng.gen_range(5.0..40.0)
            },
        }
    }
}

impl Default for MotionSimulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Generates weather, air-quality and bike-share samples, matching the
/// mock paths of the real open-data collector.
#[derive(Debug)]
pub struct OpenDataSimulator {
    rng: StdRng,
}

impl OpenDataSimulator {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn weather(&mut self, at: DateTime<Utc>) -> WeatherRecord {
        let temperature = diurnal_temperature(at.hour()) + self.rng.gen_range(-1.5..1.5);
        let weather = weighted_weather(&mut self.rng);

        WeatherRecord {
            timestamp: at,
            unix_time: at.timestamp(),
            temperature,
            feels_like: temperature - 2.0,
            humidity: self.rng.gen_range(55.0..90.0),
            wind_speed: self.rng.gen_range(3.0..8.0),
            weather: weather.to_string(),
            weather_description: format!("simulated {}", weather.to_lowercase()),
        }
    }

    pub fn air_quality(&mut self, at: DateTime<Utc>) -> AirQualityRecord {
        let aqi = self.rng.gen_range(1..=3);
        AirQualityRecord {
            timestamp: at,
            unix_time: at.timestamp(),
            aqi,
            pm2_5: self.rng.gen_range(4.0..30.0),
            pm10: self.rng.gen_range(8.0..45.0),
        }
    }

    pub fn bikes(&mut self, at: DateTime<Utc>) -> BikeRecord {
        let hour = at.hour();
        let rush = (7..=9).contains(&hour) || (17..=19).contains(&hour);
        let total = if rush {
            self.rng.gen_range(800..1000)
        } else {
            self.rng.gen_range(1000..1500)
        };

        BikeRecord {
            timestamp: at,
            unix_time: at.timestamp(),
            total_bikes_available: total,
            average_occupancy: self.rng.gen_range(0.3..0.7),
        }
    }
}

impl Default for OpenDataSimulator {
    fn default() -> Self {
        Self::new()
    }
}

/// Synthetic 3-hourly forecast, used when the real provider is
/// unreachable. Entries are capped at 40, matching the upstream API.
#[derive(Debug)]
pub struct SyntheticForecast {
    rng: StdRng,
    baseline: AqiCategory,
}

impl SyntheticForecast {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            baseline: AqiCategory::FALLBACK,
        }
    }

    pub fn with_seed(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            baseline: AqiCategory::FALLBACK,
        }
    }

    pub fn generate(&mut self, from: DateTime<Utc>, hours: i64) -> Vec<ForecastRecord> {
        let entries = (hours / 3).clamp(0, 40);
        (0..entries)
            .map(|i| {
                let timestamp = from + chrono::Duration::hours(i * 3);
                let temperature =
                    (diurnal_temperature(timestamp.hour()) * 10.0).round() / 10.0;
                let weather = weighted_weather(&mut self.rng);

                ForecastRecord {
                    timestamp,
                    unix_time: timestamp.timestamp(),
                    temperature,
                    feels_like: temperature - 2.0,
                    humidity: 70.0,
                    weather: weather.to_string(),
                    weather_description: "Simulated forecast".to_string(),
                    wind_speed: (self.rng.gen_range(3.0..8.0_f64) * 10.0).round() / 10.0,
                    clouds: self.rng.gen_range(0..100),
                    pop: (self.rng.gen_range(0.0..50.0_f64) * 10.0).round() / 10.0,
                }
            })
            .collect()
    }
}

impl Default for SyntheticForecast {
    fn default() -> Self {
        Self::new()
    }
}

impl ForecastProvider for SyntheticForecast {
    fn fetch_forecast(&mut self, hours: i64) -> Result<Vec<ForecastRecord>> {
        Ok(self.generate(Utc::now(), hours))
    }

    fn baseline_aqi(&mut self) -> Result<AqiCategory> {
        Ok(self.baseline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn synthetic_forecast_has_three_hour_cadence() {
        let mut gen = SyntheticForecast::with_seed(1);
        let from = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let records = gen.generate(from, 48);

        assert_eq!(records.len(), 16);
        for pair in records.windows(2) {
            assert_eq!((pair[1].timestamp - pair[0].timestamp).num_hours(), 3);
        }
    }

    #[test]
    fn synthetic_forecast_is_capped_at_forty_entries() {
        let mut gen = SyntheticForecast::with_seed(1);
        let from = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        assert_eq!(gen.generate(from, 500).len(), 40);
    }

    #[test]
    fn seeded_generators_are_deterministic() {
        let from = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        let a = SyntheticForecast::with_seed(9).generate(from, 24);
        let b = SyntheticForecast::with_seed(9).generate(from, 24);

        for (x, y) in a.iter().zip(&b) {
            assert_eq!(x.weather, y.weather);
            assert_eq!(x.pop, y.pop);
            assert_eq!(x.clouds, y.clouds);
        }
    }

    #[test]
    fn pop_stays_in_generator_range() {
        let mut gen = SyntheticForecast::with_seed(3);
        let from = Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap();
        for record in gen.generate(from, 120) {
            assert!((0.0..=50.0).contains(&record.pop));
            assert!((0..=100).contains(&record.clouds));
        }
    }

    #[test]
    fn bike_counts_dip_during_rush_hour() {
        let mut sim = OpenDataSimulator::with_seed(4);
        let rush = Utc.with_ymd_and_hms(2024, 5, 1, 8, 0, 0).unwrap();
        let night = Utc.with_ymd_and_hms(2024, 5, 1, 2, 0, 0).unwrap();

        assert!(sim.bikes(rush).total_bikes_available < 1000);
        assert!(sim.bikes(night).total_bikes_available >= 1000);
    }
}
