//! Logger setup and the human-facing run banners.

use log::LevelFilter;
use std::time::Duration;

use crate::MeanDiffSummary;
use crate::input::JobConfig;

/// Initializes `env_logger`: `--verbose` gives debug, `--quiet` gives error,
/// info otherwise. `RUST_LOG` still overrides the default.
pub fn init_logging(verbose: bool, quiet: bool) {
    let level = if quiet {
        LevelFilter::Error
    } else if verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };

    let mut builder = env_logger::Builder::new();
    builder.filter_level(level);
    builder.parse_default_env();
    let _ = builder.try_init();
}

pub fn show_greeting(config_source: &str) {
    println!("=== NWP Experiment Difference Tool ===");
    println!("Loading configuration from: {}", config_source);
}

pub fn config_echo(config: &JobConfig) {
    println!("\nConfiguration:");
    println!("  Control root: {}", config.ctrl_root);
    println!("  Experiment root: {}", config.exp_root);
    println!(
        "  Cycles: {} to {} every {} h ({})",
        config.start, config.end, config.step_hours, config.forecast_hour
    );
    println!("  Missing cycles: {:?}", config.on_missing);
    println!("  Output directory: {}", config.output_dir);
    println!("  Cache directory: {}", config.cache_path().display());
    println!("  Number of fields: {}", config.fields.len());

    for (i, field) in config.fields.iter().enumerate() {
        println!(
            "    Field {}: {} = {} at {}",
            i + 1,
            field.name,
            field.short_name,
            field.level
        );
    }
}

pub fn show_run_summary(summary: &MeanDiffSummary) {
    println!("\nRun Summary:");
    println!(
        "  Cycles averaged: {} of {}",
        summary.cycles_accumulated, summary.cycles_expected
    );
    if !summary.skipped_cycles.is_empty() {
        println!("  Skipped cycles: {}", summary.skipped_cycles.len());
        for cycle in &summary.skipped_cycles {
            println!("    {}", cycle.format("%Y-%m-%d %H:%M"));
        }
    }
    for (name, bounds) in &summary.bounds {
        println!("  {}: scale [{:.4}, {:.4}]", name, bounds.low, bounds.high);
    }
    for figure in &summary.figures {
        println!("  Wrote {}", figure.display());
    }
}

pub fn show_farewell_with_timing(elapsed: Duration) {
    println!("\n=== Completed successfully in {:.2?} ===", elapsed);
}
