//! Fairweather Outdoor Advisor
//!
//! Main daemon: runs the simulated collectors and the periodic
//! fetch -> fuse -> score pipeline, publishing the latest recommendation
//! as an atomic dashboard snapshot.

use anyhow::Result;
use chrono::{Timelike, Utc};
use fairweather_fusion::{
    ConditionDetails, OutdoorAnalyzer, PatternAnalysis, PatternConfig, ScoreWeights, ScoredHour,
};
use fairweather_ingest::{MemoryStore, MotionSimulator, OpenDataSimulator};
use serde::Serialize;
use std::time::Duration;
use tokio::sync::watch;

mod config;

use config::AppConfig;

/// Latest published recommendation. Replaced wholesale on every cycle so
/// consumers never observe a torn update.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub last_updated: String,
    pub score: f64,
    pub text: String,
    pub reason: String,
    pub details: ConditionDetails,
    pub patterns: Option<PatternAnalysis>,
    /// Trailing hourly composites, most recent last.
    pub trend: Vec<ScoredHour>,
}

/// Hours of scored history carried on the dashboard trend line.
const TREND_HOURS: usize = 6;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    init_logging();

    tracing::info!("╔══════════════════════════════════════════╗");
    tracing::info!("║       Fairweather Outdoor Advisor        ║");
    tracing::info!("║            Version 0.1.0                 ║");
    tracing::info!("╚══════════════════════════════════════════╝");

    // Load configuration
    let config = AppConfig::load()?;
    tracing::info!("Configuration loaded from {:?}", config.config_path);

    // Initialize sample store and backfill it so the first analysis cycle
    // has a full historical window to work with.
    tracing::info!("Initializing sample store...");
    let store = MemoryStore::new();
    backfill_store(&store, config.hours_back);
    let (motion, weather, air, bikes) = store.sample_counts();
    tracing::info!(
        "Store backfilled: {} motion / {} weather / {} air / {} bike samples",
        motion,
        weather,
        air,
        bikes
    );

    // Initialize analysis engine
    tracing::info!("Initializing fusion engine...");
    let analyzer = OutdoorAnalyzer::new(ScoreWeights::default(), PatternConfig::default())?;
    tracing::info!("Fusion engine ready");

    // Dashboard channel: last-write-wins snapshot publication
    let (snapshot_tx, snapshot_rx) = watch::channel::<Option<DashboardSnapshot>>(None);

    // Spawn collector task
    let collector_store = store.clone();
    let collector_interval = config.collector_interval_secs;
    let retention_days = config.retention_days;
    let collector_task = tokio::spawn(async move {
        let mut motion_sim = MotionSimulator::new();
        let mut open_data_sim = OpenDataSimulator::new();
        let mut ticker = tokio::time::interval(Duration::from_secs(collector_interval));

        loop {
            ticker.tick().await;
            let now = Utc::now();
            collector_store.insert_motion(motion_sim.sample(now));
            collector_store.insert_weather(open_data_sim.weather(now));
            collector_store.insert_air_quality(open_data_sim.air_quality(now));
            collector_store.insert_bikes(open_data_sim.bikes(now));
            collector_store.prune_older_than(retention_days);
        }
    });

    // Spawn analysis loop: one bad cycle is logged and backed off, never
    // allowed to halt subsequent cycles.
    let analysis_store = store.clone();
    let analysis_config = config.clone();
    let analysis_task = tokio::spawn(async move {
        loop {
            match run_analysis_cycle(&analyzer, &analysis_store, &analysis_config, &snapshot_tx) {
                Ok(true) => {
                    tokio::time::sleep(Duration::from_secs(analysis_config.analysis_interval_secs))
                        .await;
                }
                Ok(false) => {
                    tracing::debug!("No usable data this cycle");
                    tokio::time::sleep(Duration::from_secs(analysis_config.analysis_interval_secs))
                        .await;
                }
                Err(e) => {
                    tracing::error!("Analysis cycle failed: {}", e);
                    tokio::time::sleep(Duration::from_secs(analysis_config.error_backoff_secs))
                        .await;
                }
            }
        }
    });

    // Spawn dashboard logger
    let display_task = tokio::spawn(async move {
        let mut rx = snapshot_rx;
        while rx.changed().await.is_ok() {
            if let Some(snapshot) = rx.borrow().clone() {
                tracing::info!(
                    score = snapshot.score,
                    "{}: {} ({})",
                    snapshot.last_updated,
                    snapshot.text,
                    snapshot.reason
                );
                if let Ok(json) = serde_json::to_string(&snapshot) {
                    tracing::debug!(dashboard = %json, "Published snapshot");
                }
            }
        }
    });

    print_system_status(&config);

    tracing::info!("Fairweather is now watching the conditions outside...");
    tracing::info!("Press Ctrl+C to stop");

    // Wait for shutdown signal
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
        _ = collector_task => {
            tracing::warn!("Collector task ended unexpectedly");
        }
        _ = analysis_task => {
            tracing::warn!("Analysis task ended unexpectedly");
        }
        _ = display_task => {
            tracing::warn!("Display task ended unexpectedly");
        }
    }

    tracing::info!("Fairweather shutdown complete");

    Ok(())
}

/// One fetch -> fuse -> score -> publish cycle. `Ok(false)` means the
/// window held no usable data, a normal outcome.
fn run_analysis_cycle(
    analyzer: &OutdoorAnalyzer,
    store: &MemoryStore,
    config: &AppConfig,
    snapshot_tx: &watch::Sender<Option<DashboardSnapshot>>,
) -> Result<bool> {
    let Some(analysis) = analyzer.run_complete_analysis(store, config.hours_back) else {
        return Ok(false);
    };

    let recommendation = &analysis.recommendation;
    let snapshot = DashboardSnapshot {
        last_updated: Utc::now().format("%H:%M:%S").to_string(),
        score: recommendation.score,
        text: recommendation.headline().to_string(),
        reason: recommendation.reason.clone(),
        details: recommendation.details.clone(),
        patterns: analysis.patterns.clone(),
        trend: analysis
            .scored
            .iter()
            .rev()
            .take(TREND_HOURS)
            .rev()
            .map(ScoredHour::from)
            .collect(),
    };

    snapshot_tx
        .send(Some(snapshot))
        .map_err(|_| anyhow::anyhow!("dashboard channel closed"))?;

    Ok(true)
}

/// Seed the store with one simulated sample per source per hour across
/// the analysis window.
fn backfill_store(store: &MemoryStore, hours_back: i64) {
    let mut motion_sim = MotionSimulator::new();
    let mut open_data_sim = OpenDataSimulator::new();
    let now = Utc::now();

    for h in (0..hours_back).rev() {
        let at = now - chrono::Duration::hours(h);
        store.insert_motion(motion_sim.sample(at));
        store.insert_weather(open_data_sim.weather(at));
        store.insert_air_quality(open_data_sim.air_quality(at));
        store.insert_bikes(open_data_sim.bikes(at));
    }
}

fn init_logging() {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("info,fairweather=debug,fairweather_ingest=debug,fairweather_fusion=debug")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .init();
}

fn print_system_status(config: &AppConfig) {
    use sysinfo::System;

    let mut sys = System::new_all();
    sys.refresh_all();

    tracing::info!("╭─────────────── System Status ───────────────╮");
    tracing::info!("│ Hostname: {:>32} │", System::host_name().unwrap_or_default());
    tracing::info!("│ OS: {:>38} │", System::name().unwrap_or_default());
    tracing::info!(
        "│ Memory: {:>26} MB / {} MB │",
        sys.used_memory() / 1024 / 1024,
        sys.total_memory() / 1024 / 1024
    );
    tracing::info!("├──────────────── Configuration ────────────────┤");
    tracing::info!("│ Location: {:>32} │", config.location);
    tracing::info!("│ Analysis Interval: {:>21} s │", config.analysis_interval_secs);
    tracing::info!("│ History Window: {:>25} h │", config.hours_back);
    tracing::info!("│ Forecast Horizon: {:>23} h │", config.forecast_hours);
    tracing::info!("│ Hour: {:>38} │", Utc::now().hour());
    tracing::info!("╰──────────────────────────────────────────────╯");
}
