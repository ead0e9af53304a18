//! In-Memory Sample Store
//!
//! Date-bucketed storage for raw source samples, mirroring the layout of
//! the upstream time-indexed database: one bucket per calendar day per
//! source, queried by scanning the day keys a range can touch and
//! filtering on epoch seconds.

use crate::{AirQualityRecord, BikeRecord, MotionRecord, Result, WeatherRecord};
use crate::SampleStore;
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

#[derive(Debug, Default)]
struct Buckets {
    motion: BTreeMap<NaiveDate, Vec<MotionRecord>>,
    weather: BTreeMap<NaiveDate, Vec<WeatherRecord>>,
    air_quality: BTreeMap<NaiveDate, Vec<AirQualityRecord>>,
    bikes: BTreeMap<NaiveDate, Vec<BikeRecord>>,
}

/// Shared in-memory sample store.
///
/// Clones share the same underlying buckets, so collector tasks and the
/// analysis loop can hold independent handles.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Buckets>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_motion(&self, record: MotionRecord) {
        let mut buckets = self.inner.write().unwrap();
        buckets
            .motion
            .entry(record.timestamp.date_naive())
            .or_default()
            .push(record);
    }

    pub fn insert_weather(&self, record: WeatherRecord) {
        let mut buckets = self.inner.write().unwrap();
        buckets
            .weather
            .entry(record.timestamp.date_naive())
            .or_default()
            .push(record);
    }

    pub fn insert_air_quality(&self, record: AirQualityRecord) {
        let mut buckets = self.inner.write().unwrap();
        buckets
            .air_quality
            .entry(record.timestamp.date_naive())
            .or_default()
            .push(record);
    }

    pub fn insert_bikes(&self, record: BikeRecord) {
        let mut buckets = self.inner.write().unwrap();
        buckets
            .bikes
            .entry(record.timestamp.date_naive())
            .or_default()
            .push(record);
    }

    /// Drop buckets older than `days` whole days, keeping memory bounded
    /// for long-running daemons.
    pub fn prune_older_than(&self, days: i64) {
        let cutoff = (Utc::now() - chrono::Duration::days(days)).date_naive();
        let mut buckets = self.inner.write().unwrap();
        buckets.motion.retain(|date, _| *date >= cutoff);
        buckets.weather.retain(|date, _| *date >= cutoff);
        buckets.air_quality.retain(|date, _| *date >= cutoff);
        buckets.bikes.retain(|date, _| *date >= cutoff);
    }

    pub fn sample_counts(&self) -> (usize, usize, usize, usize) {
        let buckets = self.inner.read().unwrap();
        (
            buckets.motion.values().map(Vec::len).sum(),
            buckets.weather.values().map(Vec::len).sum(),
            buckets.air_quality.values().map(Vec::len).sum(),
            buckets.bikes.values().map(Vec::len).sum(),
        )
    }
}

/// Day keys a query range can touch. The range endpoints may straddle a
/// day boundary, so both endpoint dates are always included.
fn day_keys(start: DateTime<Utc>, end: DateTime<Utc>) -> Vec<NaiveDate> {
    let mut keys = Vec::new();
    let mut day = start.date_naive();
    let last = end.date_naive();
    while day <= last {
        keys.push(day);
        day = day.succ_opt().unwrap_or(day);
        if keys.len() > 3660 {
            break;
        }
    }
    keys
}

fn collect_range<T: Clone>(
    buckets: &BTreeMap<NaiveDate, Vec<T>>,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    unix_time: impl Fn(&T) -> i64,
) -> Vec<T> {
    let mut out = Vec::new();
    for key in day_keys(start, end) {
        if let Some(records) = buckets.get(&key) {
            for record in records {
                let t = unix_time(record);
                if t >= start.timestamp() && t <= end.timestamp() {
                    out.push(record.clone());
                }
            }
        }
    }
    out
}

impl SampleStore for MemoryStore {
    fn fetch_motion(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<MotionRecord>> {
        let buckets = self.inner.read().unwrap();
        Ok(collect_range(&buckets.motion, start, end, |r| r.unix_time))
    }

    fn fetch_weather(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<WeatherRecord>> {
        let buckets = self.inner.read().unwrap();
        Ok(collect_range(&buckets.weather, start, end, |r| r.unix_time))
    }

    fn fetch_air_quality(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<AirQualityRecord>> {
        let buckets = self.inner.read().unwrap();
        Ok(collect_range(&buckets.air_quality, start, end, |r| {
            r.unix_time
        }))
    }

    fn fetch_bikes(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<BikeRecord>> {
        let buckets = self.inner.read().unwrap();
        Ok(collect_range(&buckets.bikes, start, end, |r| r.unix_time))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn motion_at(ts: DateTime<Utc>) -> MotionRecord {
        MotionRecord {
            timestamp: ts,
            unix_time: ts.timestamp(),
            motion_detected: 1,
            motion_intensity: 0.2,
            motion_area: 1500.0,
            brightness: 120.0,
        }
    }

    #[test]
    fn range_query_spans_day_buckets() {
        let store = MemoryStore::new();
        let late = Utc.with_ymd_and_hms(2024, 3, 1, 23, 30, 0).unwrap();
        let early = Utc.with_ymd_and_hms(2024, 3, 2, 0, 30, 0).unwrap();
        store.insert_motion(motion_at(late));
        store.insert_motion(motion_at(early));

        let start = Utc.with_ymd_and_hms(2024, 3, 1, 23, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 2, 1, 0, 0).unwrap();
        let records = store.fetch_motion(start, end).unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn range_query_excludes_out_of_window_samples() {
        let store = MemoryStore::new();
        let inside = Utc.with_ymd_and_hms(2024, 3, 2, 12, 0, 0).unwrap();
        let before = Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap();
        store.insert_motion(motion_at(inside));
        store.insert_motion(motion_at(before));

        let start = Utc.with_ymd_and_hms(2024, 3, 2, 10, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 2, 14, 0, 0).unwrap();
        let records = store.fetch_motion(start, end).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].unix_time, inside.timestamp());
    }

    #[test]
    fn prune_drops_old_buckets() {
        let store = MemoryStore::new();
        let old = Utc::now() - chrono::Duration::days(10);
        let fresh = Utc::now();
        store.insert_motion(motion_at(old));
        store.insert_motion(motion_at(fresh));

        store.prune_older_than(7);
        let (motion, _, _, _) = store.sample_counts();
        assert_eq!(motion, 1);
    }

    #[test]
    fn clones_share_buckets() {
        let store = MemoryStore::new();
        let handle = store.clone();
        handle.insert_motion(motion_at(Utc::now()));
        let (motion, _, _, _) = store.sample_counts();
        assert_eq!(motion, 1);
    }
}
