//! Time Alignment and Fusion
//!
//! Buckets raw per-source records into hourly bins and left-joins them
//! onto the motion-driven timeline. Motion is the driver: an hour exists
//! in the fused output only if motion sampled it, and an empty motion
//! input short-circuits the whole fusion to an empty result.
//!
//! Aggregation policy per field: event counts are summed, continuous
//! measures averaged, state and categorical fields take the last
//! chronological value. After all joins a forward-fill pass and then a
//! backward-fill pass run per column, so interior and leading gaps resolve
//! to neighbouring observations while a column with no data in any source
//! stays absent in every row.

use chrono::{DateTime, DurationRound, Utc};
use fairweather_ingest::{AirQualityRecord, BikeRecord, MotionRecord, SourceBundle, WeatherRecord};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One fused hour. Motion aggregates are always present; the other
/// sources contribute optional columns that stay `None` when the source
/// never reported.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FusedRow {
    pub hour: DateTime<Utc>,
    pub motion_events: u32,
    pub avg_intensity: f64,
    pub avg_area: f64,
    pub avg_brightness: f64,
    pub temperature: Option<f64>,
    pub humidity: Option<f64>,
    pub wind_speed: Option<f64>,
    pub weather: Option<String>,
    pub weather_description: Option<String>,
    pub aqi: Option<f64>,
    pub pm2_5: Option<f64>,
    pub pm10: Option<f64>,
    pub total_bikes_available: Option<f64>,
    pub average_occupancy: Option<f64>,
}

impl FusedRow {
    fn new(hour: DateTime<Utc>) -> Self {
        Self {
            hour,
            motion_events: 0,
            avg_intensity: 0.0,
            avg_area: 0.0,
            avg_brightness: 0.0,
            temperature: None,
            humidity: None,
            wind_speed: None,
            weather: None,
            weather_description: None,
            aqi: None,
            pm2_5: None,
            pm10: None,
            total_bikes_available: None,
            average_occupancy: None,
        }
    }
}

fn truncate_to_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    // Truncation cannot fail for an hour granule on valid timestamps.
    ts.duration_trunc(chrono::Duration::hours(1)).unwrap_or(ts)
}

/// Hourly motion aggregate: events summed, continuous measures averaged.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionHour {
    pub hour: DateTime<Utc>,
    pub motion_events: u32,
    pub avg_intensity: f64,
    pub avg_area: f64,
    pub avg_brightness: f64,
}

/// Aggregate raw motion samples into hourly bins. Empty input yields an
/// empty bin set, never an error.
pub fn aggregate_motion_hourly(records: &[MotionRecord]) -> Vec<MotionHour> {
    #[derive(Default)]
    struct Acc {
        events: u32,
        intensity: f64,
        area: f64,
        brightness: f64,
        samples: u32,
    }

    let mut bins: BTreeMap<DateTime<Utc>, Acc> = BTreeMap::new();
    for record in records {
        let acc = bins.entry(truncate_to_hour(record.timestamp)).or_default();
        acc.events += record.motion_detected as u32;
        acc.intensity += record.motion_intensity;
        acc.area += record.motion_area;
        acc.brightness += record.brightness;
        acc.samples += 1;
    }

    bins.into_iter()
        .map(|(hour, acc)| {
            let n = acc.samples.max(1) as f64;
            MotionHour {
                hour,
                motion_events: acc.events,
                avg_intensity: acc.intensity / n,
                avg_area: acc.area / n,
                avg_brightness: acc.brightness / n,
            }
        })
        .collect()
}

/// Chronologically last record per hour, with any averaged fields folded
/// alongside. Records are sorted by timestamp first so "last" is
/// well-defined for out-of-order input.
fn weather_hourly(records: &[WeatherRecord]) -> BTreeMap<DateTime<Utc>, WeatherHour> {
    let mut sorted: Vec<&WeatherRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.timestamp);

    let mut bins: BTreeMap<DateTime<Utc>, WeatherHour> = BTreeMap::new();
    for record in sorted {
        let hour = truncate_to_hour(record.timestamp);
        let bin = bins.entry(hour).or_insert_with(|| WeatherHour {
            temperature: record.temperature,
            humidity: record.humidity,
            wind_sum: 0.0,
            wind_samples: 0,
            weather: record.weather.clone(),
            weather_description: record.weather_description.clone(),
        });
        // Last-observed state fields, wind averaged.
        bin.temperature = record.temperature;
        bin.humidity = record.humidity;
        bin.wind_sum += record.wind_speed;
        bin.wind_samples += 1;
        bin.weather = record.weather.clone();
        bin.weather_description = record.weather_description.clone();
    }
    bins
}

struct WeatherHour {
    temperature: f64,
    humidity: f64,
    wind_sum: f64,
    wind_samples: u32,
    weather: String,
    weather_description: String,
}

fn air_quality_hourly(records: &[AirQualityRecord]) -> BTreeMap<DateTime<Utc>, AirQualityRecord> {
    let mut sorted: Vec<&AirQualityRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.timestamp);

    let mut bins = BTreeMap::new();
    for record in sorted {
        bins.insert(truncate_to_hour(record.timestamp), record.clone());
    }
    bins
}

fn bikes_hourly(records: &[BikeRecord]) -> BTreeMap<DateTime<Utc>, BikeRecord> {
    let mut sorted: Vec<&BikeRecord> = records.iter().collect();
    sorted.sort_by_key(|r| r.timestamp);

    let mut bins = BTreeMap::new();
    for record in sorted {
        bins.insert(truncate_to_hour(record.timestamp), record.clone());
    }
    bins
}

/// Forward then backward fill over hour-ascending rows, one column at a
/// time.
fn fill_column<T: Clone>(rows: &mut [FusedRow], column: impl Fn(&mut FusedRow) -> &mut Option<T>) {
    let mut carry: Option<T> = None;
    for row in rows.iter_mut() {
        let cell = column(row);
        match cell {
            Some(value) => carry = Some(value.clone()),
            None => *cell = carry.clone(),
        }
    }

    carry = None;
    for row in rows.iter_mut().rev() {
        let cell = column(row);
        match cell {
            Some(value) => carry = Some(value.clone()),
            None => *cell = carry.clone(),
        }
    }
}

/// Left-join every source's hourly aggregate onto the motion timeline and
/// resolve gaps. Returns rows with unique, strictly ascending hours; an
/// empty motion input returns an empty vector regardless of the other
/// sources.
pub fn fuse(bundle: &SourceBundle) -> Vec<FusedRow> {
    let motion = aggregate_motion_hourly(&bundle.motion);
    if motion.is_empty() {
        return Vec::new();
    }

    let weather = weather_hourly(&bundle.weather);
    let air = air_quality_hourly(&bundle.air_quality);
    let bikes = bikes_hourly(&bundle.bikes);

    let mut rows: Vec<FusedRow> = motion
        .into_iter()
        .map(|m| {
            let mut row = FusedRow::new(m.hour);
            row.motion_events = m.motion_events;
            row.avg_intensity = m.avg_intensity;
            row.avg_area = m.avg_area;
            row.avg_brightness = m.avg_brightness;

            if let Some(w) = weather.get(&m.hour) {
                row.temperature = Some(w.temperature);
                row.humidity = Some(w.humidity);
                row.wind_speed = Some(w.wind_sum / w.wind_samples.max(1) as f64);
                row.weather = Some(w.weather.clone());
                row.weather_description = Some(w.weather_description.clone());
            }
            if let Some(a) = air.get(&m.hour) {
                row.aqi = Some(a.aqi as f64);
                row.pm2_5 = Some(a.pm2_5);
                row.pm10 = Some(a.pm10);
            }
            if let Some(b) = bikes.get(&m.hour) {
                row.total_bikes_available = Some(b.total_bikes_available as f64);
                row.average_occupancy = Some(b.average_occupancy);
            }
            row
        })
        .collect();

    fill_column(&mut rows, |r| &mut r.temperature);
    fill_column(&mut rows, |r| &mut r.humidity);
    fill_column(&mut rows, |r| &mut r.wind_speed);
    fill_column(&mut rows, |r| &mut r.weather);
    fill_column(&mut rows, |r| &mut r.weather_description);
    fill_column(&mut rows, |r| &mut r.aqi);
    fill_column(&mut rows, |r| &mut r.pm2_5);
    fill_column(&mut rows, |r| &mut r.pm10);
    fill_column(&mut rows, |r| &mut r.total_bikes_available);
    fill_column(&mut rows, |r| &mut r.average_occupancy);

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn ts(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 10, hour, minute, 0).unwrap()
    }

    fn motion(hour: u32, minute: u32, detected: u8, intensity: f64) -> MotionRecord {
        let t = ts(hour, minute);
        MotionRecord {
            timestamp: t,
            unix_time: t.timestamp(),
            motion_detected: detected,
            motion_intensity: intensity,
            motion_area: 1000.0,
            brightness: 100.0,
        }
    }

    fn weather(hour: u32, minute: u32, temp: f64, label: &str) -> WeatherRecord {
        let t = ts(hour, minute);
        WeatherRecord {
            timestamp: t,
            unix_time: t.timestamp(),
            temperature: temp,
            feels_like: temp - 2.0,
            humidity: 70.0,
            wind_speed: 5.0,
            weather: label.to_string(),
            weather_description: label.to_lowercase(),
        }
    }

    #[test]
    fn motion_bins_sum_events_and_average_measures() {
        let records = vec![
            motion(9, 0, 1, 0.2),
            motion(9, 20, 0, 0.0),
            motion(9, 40, 1, 0.4),
            motion(10, 5, 1, 0.6),
        ];

        let bins = aggregate_motion_hourly(&records);
        assert_eq!(bins.len(), 2);
        assert_eq!(bins[0].hour, ts(9, 0));
        assert_eq!(bins[0].motion_events, 2);
        assert!((bins[0].avg_intensity - 0.2).abs() < 1e-9);
        assert_eq!(bins[1].motion_events, 1);
    }

    #[test]
    fn empty_motion_short_circuits_fusion() {
        let bundle = SourceBundle {
            weather: vec![weather(9, 0, 15.0, "Clear")],
            ..Default::default()
        };
        assert!(fuse(&bundle).is_empty());
    }

    #[test]
    fn hours_are_unique_and_ascending() {
        let bundle = SourceBundle {
            motion: vec![
                motion(12, 0, 1, 0.1),
                motion(9, 0, 1, 0.1),
                motion(12, 30, 0, 0.0),
                motion(10, 0, 1, 0.1),
            ],
            ..Default::default()
        };

        let rows = fuse(&bundle);
        assert_eq!(rows.len(), 3);
        for pair in rows.windows(2) {
            assert!(pair[0].hour < pair[1].hour);
        }
    }

    #[test]
    fn last_observation_wins_within_an_hour() {
        let bundle = SourceBundle {
            motion: vec![motion(9, 0, 1, 0.1)],
            weather: vec![weather(9, 50, 18.0, "Clouds"), weather(9, 10, 12.0, "Clear")],
            ..Default::default()
        };

        let rows = fuse(&bundle);
        assert_eq!(rows[0].temperature, Some(18.0));
        assert_eq!(rows[0].weather.as_deref(), Some("Clouds"));
        // Wind is averaged, not last-observed.
        assert_eq!(rows[0].wind_speed, Some(5.0));
    }

    #[test]
    fn interior_and_leading_gaps_are_filled() {
        let bundle = SourceBundle {
            motion: vec![motion(9, 0, 1, 0.1), motion(10, 0, 1, 0.1), motion(11, 0, 1, 0.1)],
            weather: vec![weather(10, 0, 14.0, "Clear")],
            ..Default::default()
        };

        let rows = fuse(&bundle);
        // Leading gap backward-filled, trailing gap forward-filled.
        assert_eq!(rows[0].temperature, Some(14.0));
        assert_eq!(rows[1].temperature, Some(14.0));
        assert_eq!(rows[2].temperature, Some(14.0));
    }

    #[test]
    fn wholly_absent_source_stays_absent() {
        let bundle = SourceBundle {
            motion: vec![motion(9, 0, 1, 0.1), motion(10, 0, 1, 0.1)],
            weather: vec![weather(9, 0, 14.0, "Clear")],
            ..Default::default()
        };

        let rows = fuse(&bundle);
        for row in &rows {
            assert!(row.aqi.is_none());
            assert!(row.total_bikes_available.is_none());
            assert!(row.temperature.is_some());
        }
    }
}
