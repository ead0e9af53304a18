//! Fairweather CLI Tool
//!
//! One-shot command-line interface for running the analysis and forecast
//! pipelines against simulated data.

use anyhow::Result;
use chrono::{Duration, Utc};
use clap::{Parser, Subcommand};
use fairweather_fusion::{
    Forecaster, ForecastConfig, OutdoorAnalyzer, PatternConfig, ScoreWeights, WindowConfig,
};
use fairweather_ingest::{
    MemoryStore, MotionSimulator, OpenDataSimulator, SyntheticForecast,
};
use std::path::PathBuf;

mod config;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "fairweather-cli")]
#[command(author = "Fairweather Team")]
#[command(version = "0.1.0")]
#[command(about = "Fairweather Outdoor Advisor CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a historical analysis over simulated samples
    Analyze {
        /// Hours of history to analyze
        #[arg(long, default_value_t = 24)]
        hours_back: i64,

        /// Seed for the data simulators
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Score the forecast horizon and rank optimal windows
    Forecast {
        /// Hours of forecast to score
        #[arg(long, default_value_t = 48)]
        hours: i64,

        /// Seed for the forecast generator
        #[arg(short, long)]
        seed: Option<u64>,

        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Generate sample configuration
    Config {
        /// Output path
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// System information
    Info,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Analyze {
            hours_back,
            seed,
            format,
        } => {
            run_analyze(hours_back, seed, &format)?;
        }

        Commands::Forecast {
            hours,
            seed,
            format,
        } => {
            run_forecast(hours, seed, &format)?;
        }

        Commands::Config { output } => {
            generate_config(output)?;
        }

        Commands::Info => {
            show_info()?;
        }
    }

    Ok(())
}

fn run_analyze(hours_back: i64, seed: Option<u64>, format: &str) -> Result<()> {
    let store = seed_store(hours_back, seed);
    let analyzer = OutdoorAnalyzer::new(ScoreWeights::default(), PatternConfig::default())?;

    let Some(analysis) = analyzer.run_complete_analysis(&store, hours_back) else {
        println!("No usable data in the last {}h.", hours_back);
        return Ok(());
    };

    if format == "json" {
        let json = serde_json::to_string_pretty(&analysis.scored)?;
        println!("{}", json);
        return Ok(());
    }

    println!("╭──────────────────────────────────────────────────────────────────╮");
    println!("│                      Hourly Outdoor Scores                       │");
    println!("├────────────┬────────┬────────┬─────────┬────────┬───────────────┤");
    println!("│ Hour       │ Temp   │ AQI    │ Weather │ Bikes  │ Outdoor Score │");
    println!("├────────────┼────────┼────────┼─────────┼────────┼───────────────┤");

    for row in &analysis.scored {
        println!(
            "│ {:10} │ {:>6.1} │ {:>6.1} │ {:>7.1} │ {:>6.1} │ {:>13.1} │",
            row.row.hour.format("%a %H:%M"),
            row.scores.temperature,
            row.scores.air_quality,
            row.scores.weather,
            row.scores.bikes,
            row.outdoor_score
        );
    }

    println!("╰────────────┴────────┴────────┴─────────┴────────┴───────────────╯");

    let rec = &analysis.recommendation;
    println!("\nRecommendation: {} (score {:.1}, urgency {})", rec.headline(), rec.score, rec.urgency);
    println!("  {}", rec.reason);
    if let Some(temp) = &rec.details.temperature {
        println!("  Temperature: {}", temp);
    }
    if let Some(weather) = &rec.details.weather {
        println!("  Weather: {}", weather);
    }
    if let Some(bikes) = rec.details.bikes_available {
        println!("  Bikes available: {}", bikes);
    }

    if let Some(patterns) = &analysis.patterns {
        println!("\nPatterns:");
        println!(
            "  Motion/score correlation: {:.3} ({})",
            patterns.motion_outdoor_correlation, patterns.insight
        );
        println!(
            "  Good-condition hours: {} ({:.1}%)",
            patterns.good_condition_hours, patterns.good_condition_percentage
        );
        println!("  Missed opportunities: {}", patterns.missed_opportunities);
        if let Some(high) = &patterns.high_activity {
            match high.avg_temperature {
                Some(temp) => println!(
                    "  High-activity hours: avg score {:.1} at {:.1}°C",
                    high.avg_score, temp
                ),
                None => println!("  High-activity hours: avg score {:.1}", high.avg_score),
            }
        }
    }

    Ok(())
}

fn run_forecast(hours: i64, seed: Option<u64>, format: &str) -> Result<()> {
    let config = AppConfig::load()?;
    let window_cfg = WindowConfig {
        min_score: config.min_window_score,
        interval_hours: config.forecast_interval_hours,
        min_duration_hours: config.min_window_duration_hours,
    };
    let mut forecaster = match seed {
        Some(seed) => Forecaster::with_seed(ForecastConfig::default(), window_cfg, seed),
        None => Forecaster::new(ForecastConfig::default(), window_cfg)?,
    };

    let mut provider = match seed {
        Some(seed) => SyntheticForecast::with_seed(seed),
        None => SyntheticForecast::new(),
    };

    let prediction = forecaster.run_prediction(&mut provider, hours);

    if format == "json" {
        let json = serde_json::to_string_pretty(&prediction.report)?;
        println!("{}", json);
        return Ok(());
    }

    println!("╭──────────────────────────────────────────────────────────────────╮");
    println!("│                        Forecast Outlook                          │");
    println!("├────────────┬────────┬──────────┬───────┬────────────┬───────────┤");
    println!("│ Hour       │ Temp   │ Weather  │ Rain  │ Confidence │ Score     │");
    println!("├────────────┼────────┼──────────┼───────┼────────────┼───────────┤");

    for point in &prediction.points {
        println!(
            "│ {:10} │ {:>5.1}° │ {:8} │ {:>4.0}% │ {:>10.2} │ {:>9.1} │",
            point.hour_label,
            point.temperature,
            truncate(&point.weather, 8),
            point.pop,
            point.confidence,
            point.outdoor_score
        );
    }

    println!("╰────────────┴────────┴──────────┴───────┴────────────┴───────────╯");

    let summary = &prediction.report.summary;
    println!("\nOutlook: {} (avg score {:.1})", summary.outlook, summary.avg_score);
    if let Some(best) = &summary.best_time {
        println!("  Best:  {} - {:.1} ({})", best.when, best.score, best.conditions);
    }
    if let Some(worst) = &summary.worst_time {
        println!("  Worst: {} - {:.1} ({})", worst.when, worst.score, worst.conditions);
    }

    if prediction.windows.is_empty() {
        println!("\nNo optimal windows in the next {}h.", hours);
    } else {
        println!("\nOptimal windows:");
        for (i, window) in prediction.windows.iter().enumerate() {
            println!(
                "  {}. {} to {} ({:.0}h, avg {:.1}, peak {:.1}) - {}",
                i + 1,
                window.start_time.format("%a %H:%M"),
                window.end_time.format("%a %H:%M"),
                window.duration_hours,
                window.avg_score,
                window.max_score,
                window.conditions.join(", ")
            );
        }
    }

    Ok(())
}

fn generate_config(output: Option<PathBuf>) -> Result<()> {
    let example = AppConfig::example();

    if let Some(path) = output {
        std::fs::write(&path, example)?;
        println!("Configuration written to: {:?}", path);
    } else {
        println!("{}", example);
    }

    Ok(())
}

fn show_info() -> Result<()> {
    use sysinfo::System;

    let mut sys = System::new_all();
    sys.refresh_all();

    println!("╭──────────────────────────────────────────────────────────────╮");
    println!("│            Fairweather System Information                    │");
    println!("╰──────────────────────────────────────────────────────────────╯\n");

    println!("System:");
    println!("  Hostname: {}", System::host_name().unwrap_or_default());
    println!(
        "  OS: {} {}",
        System::name().unwrap_or_default(),
        System::os_version().unwrap_or_default()
    );
    println!("  Kernel: {}", System::kernel_version().unwrap_or_default());

    println!("\nHardware:");
    println!("  CPU: {}", sys.cpus().first().map(|c| c.brand()).unwrap_or("Unknown"));
    println!("  Cores: {}", sys.cpus().len());
    println!(
        "  Memory: {} MB total, {} MB used",
        sys.total_memory() / 1024 / 1024,
        sys.used_memory() / 1024 / 1024
    );

    println!("\nFairweather:");
    println!("  Version: 0.1.0");
    println!("  Ingest Version: 0.1.0");
    println!("  Fusion Version: 0.1.0");

    Ok(())
}

/// Build a store holding one simulated sample per source per hour across
/// the requested window.
fn seed_store(hours_back: i64, seed: Option<u64>) -> MemoryStore {
    let (mut motion_sim, mut open_data_sim) = match seed {
        Some(seed) => (
            MotionSimulator::with_seed(seed),
            OpenDataSimulator::with_seed(seed),
        ),
        None => (MotionSimulator::new(), OpenDataSimulator::new()),
    };

    let store = MemoryStore::new();
    let now = Utc::now();
    for h in (0..hours_back).rev() {
        let at = now - Duration::hours(h);
        store.insert_motion(motion_sim.sample(at));
        store.insert_weather(open_data_sim.weather(at));
        store.insert_air_quality(open_data_sim.air_quality(at));
        store.insert_bikes(open_data_sim.bikes(at));
    }

    store
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max - 3])
    }
}
