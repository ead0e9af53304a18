//! Fairweather Ingestion Layer
//!
//! Provides the source record types and acquisition boundary for the
//! Fairweather outdoor advisor.
//!
//! # Modules
//!
//! - [`store`] - Date-bucketed in-memory sample store
//! - [`sim`] - Simulated collectors and the synthetic forecast generator
//!
//! The fusion engine never performs I/O of its own: everything it consumes
//! arrives through the [`SampleStore`] and [`ForecastProvider`] traits
//! defined here. A source that fails to fetch is reduced to "source absent"
//! at this boundary, never surfaced to the engine as an error.
//!
//! # Example
//!
//! ```rust,no_run
//! use fairweather_ingest::{MemoryStore, MotionSimulator, SampleStore};
//!
//! let store = MemoryStore::new();
//! let mut sim = MotionSimulator::with_seed(7);
//! store.insert_motion(sim.sample(chrono::Utc::now()));
//!
//! let bundle = store.fetch_recent(24);
//! println!("{} motion samples", bundle.motion.len());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod sim;
pub mod store;

pub use sim::{MotionSimulator, OpenDataSimulator, SyntheticForecast};
pub use store::MemoryStore;

/// Data sources fused by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Source {
    Motion,
    Weather,
    AirQuality,
    Bikes,
}

impl Source {
    pub fn name(&self) -> &'static str {
        match self {
            Source::Motion => "motion",
            Source::Weather => "weather",
            Source::AirQuality => "air_quality",
            Source::Bikes => "bikes",
        }
    }
}

/// Indoor motion sample produced by the camera collector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MotionRecord {
    pub timestamp: DateTime<Utc>,
    pub unix_time: i64,
    /// 1 when motion was detected in this sample, 0 otherwise.
    pub motion_detected: u8,
    /// Fraction of changed pixels, 0.0 - 1.0.
    pub motion_intensity: f64,
    /// Largest contiguous changed region, in pixels.
    pub motion_area: f64,
    /// Mean frame brightness, 0 - 255.
    pub brightness: f64,
}

/// Current-conditions weather sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub timestamp: DateTime<Utc>,
    pub unix_time: i64,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub wind_speed: f64,
    /// Categorical condition label ("Clear", "Rain", ...).
    pub weather: String,
    pub weather_description: String,
}

/// Air quality sample. The index is the provider's 1-5 category scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AirQualityRecord {
    pub timestamp: DateTime<Utc>,
    pub unix_time: i64,
    pub aqi: u8,
    pub pm2_5: f64,
    pub pm10: f64,
}

/// City-wide bike-share availability snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BikeRecord {
    pub timestamp: DateTime<Utc>,
    pub unix_time: i64,
    pub total_bikes_available: u32,
    pub average_occupancy: f64,
}

/// One 3-hourly forecast entry from the weather provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastRecord {
    pub timestamp: DateTime<Utc>,
    pub unix_time: i64,
    pub temperature: f64,
    pub feels_like: f64,
    pub humidity: f64,
    pub weather: String,
    pub weather_description: String,
    pub wind_speed: f64,
    /// Cloud cover percentage, 0 - 100.
    pub clouds: u8,
    /// Probability of precipitation, 0 - 100.
    pub pop: f64,
}

/// Air-quality index category on the provider's 1-5 scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AqiCategory(pub u8);

impl AqiCategory {
    /// Category used when the provider is unreachable.
    pub const FALLBACK: AqiCategory = AqiCategory(2);
}

/// Raw samples for one analysis run, one vector per source.
///
/// An empty vector means "source absent" and is a normal state: the
/// engine substitutes neutral scores for fields it never saw.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceBundle {
    pub motion: Vec<MotionRecord>,
    pub weather: Vec<WeatherRecord>,
    pub air_quality: Vec<AirQualityRecord>,
    pub bikes: Vec<BikeRecord>,
}

impl SourceBundle {
    pub fn is_empty(&self) -> bool {
        self.motion.is_empty()
            && self.weather.is_empty()
            && self.air_quality.is_empty()
            && self.bikes.is_empty()
    }
}

/// Time-indexed sample storage queried by the analysis pipeline.
///
/// Each per-source fetch is fallible; [`SampleStore::fetch_recent`]
/// reduces failures to empty vectors so the engine only ever branches
/// on presence or absence.
pub trait SampleStore: Send + Sync {
    fn fetch_motion(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<MotionRecord>>;

    fn fetch_weather(&self, start: DateTime<Utc>, end: DateTime<Utc>)
        -> Result<Vec<WeatherRecord>>;

    fn fetch_air_quality(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AirQualityRecord>>;

    fn fetch_bikes(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<BikeRecord>>;

    /// Fetch all sources for the trailing `hours_back` window, mapping
    /// any per-source failure to "source absent".
    fn fetch_recent(&self, hours_back: i64) -> SourceBundle {
        let end = Utc::now();
        let start = end - chrono::Duration::hours(hours_back);

        SourceBundle {
            motion: reduce_to_absent(Source::Motion, self.fetch_motion(start, end)),
            weather: reduce_to_absent(Source::Weather, self.fetch_weather(start, end)),
            air_quality: reduce_to_absent(Source::AirQuality, self.fetch_air_quality(start, end)),
            bikes: reduce_to_absent(Source::Bikes, self.fetch_bikes(start, end)),
        }
    }
}

fn reduce_to_absent<T>(source: Source, fetched: Result<Vec<T>>) -> Vec<T> {
    match fetched {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!("Fetch failed for source {}: {}", source.name(), e);
            Vec::new()
        }
    }
}

/// Forecast acquisition boundary.
pub trait ForecastProvider: Send + Sync {
    /// Fetch up to `hours` of 3-hourly forecast entries.
    fn fetch_forecast(&mut self, hours: i64) -> Result<Vec<ForecastRecord>>;

    /// Current air-quality category, reused as the baseline for the
    /// whole forecast horizon.
    fn baseline_aqi(&mut self) -> Result<AqiCategory>;
}

/// Error types
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("Source unavailable: {0}")]
    SourceUnavailable(String),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, IngestError>;

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingStore;

    impl SampleStore for FailingStore {
        fn fetch_motion(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<MotionRecord>> {
            Err(IngestError::SourceUnavailable("motion".into()))
        }

        fn fetch_weather(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<WeatherRecord>> {
            Err(IngestError::SourceUnavailable("weather".into()))
        }

        fn fetch_air_quality(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<AirQualityRecord>> {
            Err(IngestError::SourceUnavailable("air_quality".into()))
        }

        fn fetch_bikes(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> Result<Vec<BikeRecord>> {
            Err(IngestError::SourceUnavailable("bikes".into()))
        }
    }

    #[test]
    fn fetch_failures_reduce_to_absent_sources() {
        let bundle = FailingStore.fetch_recent(24);
        assert!(bundle.is_empty());
    }
}
