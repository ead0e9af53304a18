//! Analysis Entry Points
//!
//! Orchestrates the two pipelines: historical analysis
//! (fetch -> fuse -> score -> patterns -> recommendation) and prediction
//! (forecast -> score -> windows -> report). Both consume their inputs
//! through the ingestion traits and perform no I/O of their own.

use crate::align::fuse;
use crate::forecast::{ForecastConfig, ForecastEngine, ForecastPoint};
use crate::patterns::{analyze, PatternAnalysis, PatternConfig};
use crate::recommend::{recommend, Recommendation};
use crate::report::{build_report, ForecastReport};
use crate::scoring::{score_rows, ScoreWeights, ScoredRow};
use crate::windows::{find_windows, OptimalWindow, WindowConfig};
use crate::{FusionError, Result};
use chrono::Utc;
use fairweather_ingest::{AqiCategory, ForecastProvider, SampleStore, SyntheticForecast};

/// Output of one complete historical analysis.
#[derive(Debug, Clone)]
pub struct Analysis {
    pub scored: Vec<ScoredRow>,
    /// `None` when the table was too small for statistics.
    pub patterns: Option<PatternAnalysis>,
    pub recommendation: Recommendation,
}

/// Historical analysis pipeline.
#[derive(Debug, Clone)]
pub struct OutdoorAnalyzer {
    weights: ScoreWeights,
    pattern_cfg: PatternConfig,
}

impl OutdoorAnalyzer {
    /// Build an analyzer, rejecting weight sets that do not sum to 1.0.
    pub fn new(weights: ScoreWeights, pattern_cfg: PatternConfig) -> Result<Self> {
        let sum = weights.temperature + weights.air_quality + weights.weather + weights.bikes;
        if (sum - 1.0).abs() > 1e-9 {
            return Err(FusionError::InvalidConfig(format!(
                "score weights must sum to 1.0, got {}",
                sum
            )));
        }
        Ok(Self {
            weights,
            pattern_cfg,
        })
    }

    pub fn with_defaults() -> Self {
        Self {
            weights: ScoreWeights::default(),
            pattern_cfg: PatternConfig::default(),
        }
    }

    /// Run the full pipeline over the trailing `hours_back` window.
    /// Returns `None` when no usable data exists - a normal outcome, not
    /// a failure.
    pub fn run_complete_analysis(
        &self,
        store: &dyn SampleStore,
        hours_back: i64,
    ) -> Option<Analysis> {
        let bundle = store.fetch_recent(hours_back);
        let fused = fuse(&bundle);
        if fused.is_empty() {
            tracing::debug!("No fused rows for the last {}h, skipping analysis", hours_back);
            return None;
        }

        let scored = score_rows(&fused, &self.weights);
        let patterns = analyze(&scored, &self.pattern_cfg);
        let recommendation = recommend(&scored);

        tracing::debug!(
            hours = scored.len(),
            score = recommendation.score,
            "Analysis complete"
        );

        Some(Analysis {
            scored,
            patterns,
            recommendation,
        })
    }
}

/// Output of one prediction run.
#[derive(Debug, Clone)]
pub struct Prediction {
    pub points: Vec<ForecastPoint>,
    pub windows: Vec<OptimalWindow>,
    pub report: ForecastReport,
}

/// Prediction pipeline with a synthetic fallback when the forecast
/// provider is unreachable.
#[derive(Debug)]
pub struct Forecaster {
    engine: ForecastEngine,
    window_cfg: WindowConfig,
    fallback: SyntheticForecast,
}

impl Forecaster {
    pub fn new(forecast_cfg: ForecastConfig, window_cfg: WindowConfig) -> Result<Self> {
        if window_cfg.interval_hours <= 0.0 {
            return Err(FusionError::InvalidConfig(
                "window interval must be positive".to_string(),
            ));
        }
        Ok(Self {
            engine: ForecastEngine::new(forecast_cfg),
            window_cfg,
            fallback: SyntheticForecast::new(),
        })
    }

    /// Deterministic variant for tests and reproducible demo runs.
    pub fn with_seed(forecast_cfg: ForecastConfig, window_cfg: WindowConfig, seed: u64) -> Self {
        Self {
            engine: ForecastEngine::with_seed(forecast_cfg, seed),
            window_cfg,
            fallback: SyntheticForecast::with_seed(seed),
        }
    }

    /// Fetch, score and rank the next `forecast_hours` of conditions.
    /// Provider failures degrade to the synthetic generator and the
    /// fallback air-quality category rather than erroring out.
    pub fn run_prediction(
        &mut self,
        provider: &mut dyn ForecastProvider,
        forecast_hours: i64,
    ) -> Prediction {
        let records = match provider.fetch_forecast(forecast_hours) {
            Ok(records) if !records.is_empty() => records,
            Ok(_) => {
                tracing::warn!("Forecast provider returned no entries, using synthetic forecast");
                self.fallback.generate(Utc::now(), forecast_hours)
            }
            Err(e) => {
                tracing::warn!("Forecast fetch failed ({}), using synthetic forecast", e);
                self.fallback.generate(Utc::now(), forecast_hours)
            }
        };

        let baseline = match provider.baseline_aqi() {
            Ok(category) => category,
            Err(e) => {
                tracing::warn!("Baseline AQI fetch failed ({}), using fallback category", e);
                AqiCategory::FALLBACK
            }
        };

        let points = self.engine.predict(&records, baseline, Utc::now());
        let windows = find_windows(&points, &self.window_cfg);
        let report = build_report(points.clone(), windows.clone());

        Prediction {
            points,
            windows,
            report,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, DurationRound, Timelike, Utc};
    use fairweather_ingest::{
        AirQualityRecord, BikeRecord, ForecastRecord, IngestError, MotionRecord, WeatherRecord,
    };
    use fairweather_ingest::Result as IngestResult;

    struct FixtureStore {
        motion: Vec<MotionRecord>,
        weather: Vec<WeatherRecord>,
    }

    impl SampleStore for FixtureStore {
        fn fetch_motion(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> IngestResult<Vec<MotionRecord>> {
            Ok(self.motion.clone())
        }

        fn fetch_weather(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> IngestResult<Vec<WeatherRecord>> {
            Ok(self.weather.clone())
        }

        fn fetch_air_quality(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> IngestResult<Vec<AirQualityRecord>> {
            Ok(Vec::new())
        }

        fn fetch_bikes(
            &self,
            _start: DateTime<Utc>,
            _end: DateTime<Utc>,
        ) -> IngestResult<Vec<BikeRecord>> {
            Ok(Vec::new())
        }
    }

    fn motion(hour: u32) -> MotionRecord {
        let ts = Utc::now()
            .duration_trunc(Duration::hours(1))
            .unwrap()
            .with_hour(hour)
            .unwrap_or_else(Utc::now);
        MotionRecord {
            timestamp: ts,
            unix_time: ts.timestamp(),
            motion_detected: 1,
            motion_intensity: 0.3,
            motion_area: 1500.0,
            brightness: 110.0,
        }
    }

    fn weather(hour: u32, temp: f64) -> WeatherRecord {
        let ts = Utc::now()
            .duration_trunc(Duration::hours(1))
            .unwrap()
            .with_hour(hour)
            .unwrap_or_else(Utc::now);
        WeatherRecord {
            timestamp: ts,
            unix_time: ts.timestamp(),
            temperature: temp,
            feels_like: temp,
            humidity: 70.0,
            wind_speed: 4.0,
            weather: "Clear".to_string(),
            weather_description: "clear sky".to_string(),
        }
    }

    #[test]
    fn invalid_weights_are_rejected() {
        let weights = ScoreWeights {
            temperature: 0.5,
            air_quality: 0.5,
            weather: 0.5,
            bikes: 0.5,
        };
        assert!(OutdoorAnalyzer::new(weights, PatternConfig::default()).is_err());
    }

    #[test]
    fn empty_motion_yields_no_analysis() {
        let store = FixtureStore {
            motion: Vec::new(),
            weather: vec![weather(9, 15.0)],
        };
        let analyzer = OutdoorAnalyzer::with_defaults();
        assert!(analyzer.run_complete_analysis(&store, 24).is_none());
    }

    #[test]
    fn analysis_produces_scores_and_recommendation() {
        let store = FixtureStore {
            motion: vec![motion(9), motion(10)],
            weather: vec![weather(9, 17.0)],
        };
        let analyzer = OutdoorAnalyzer::with_defaults();
        let analysis = analyzer.run_complete_analysis(&store, 24).unwrap();

        assert_eq!(analysis.scored.len(), 2);
        // Absent air quality and bikes score neutral; weather fills in.
        assert_eq!(analysis.scored[0].scores.temperature, 100.0);
        assert_eq!(analysis.scored[0].scores.air_quality, 50.0);
        assert!(analysis.patterns.is_some());
        assert!(analysis.recommendation.score > 0.0);
    }

    struct FailingProvider;

    impl ForecastProvider for FailingProvider {
        fn fetch_forecast(&mut self, _hours: i64) -> IngestResult<Vec<ForecastRecord>> {
            Err(IngestError::SourceUnavailable("forecast".into()))
        }

        fn baseline_aqi(&mut self) -> IngestResult<AqiCategory> {
            Err(IngestError::SourceUnavailable("air_quality".into()))
        }
    }

    #[test]
    fn prediction_falls_back_to_synthetic_forecast() {
        let mut forecaster =
            Forecaster::with_seed(ForecastConfig::default(), WindowConfig::default(), 11);
        let prediction = forecaster.run_prediction(&mut FailingProvider, 48);

        assert_eq!(prediction.points.len(), 16);
        assert_eq!(prediction.report.hourly_predictions.len(), 16);
        for point in &prediction.points {
            assert!((0.0..=100.0).contains(&point.outdoor_score));
            assert!((0.5..=1.0).contains(&point.confidence));
        }
    }
}
