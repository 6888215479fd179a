use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::Instant;

use nwpdiff::cli::{
    Cli, Commands, MeanDiffArgs, OutputFormat, default_plot_output, generate_template,
    resolve_job_config,
};
use nwpdiff::info::{
    get_file_info, print_file_info_csv, print_file_info_human, print_file_info_json,
    print_file_info_yaml,
};
use nwpdiff::input::JobConfig;
use nwpdiff::log::{
    config_echo, init_logging, show_farewell_with_timing, show_greeting, show_run_summary,
};
use nwpdiff::render::{PngRenderer, Region};
use nwpdiff::source::GribOpener;
use nwpdiff::workflows::{PlotOptions, PlotOutcome, TileOptions, plot_difference, plot_field, plot_tiles};
use nwpdiff::{process_mean_diff_job, replot_from_cache};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);
    if let Err(e) = run(cli) {
        log::error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let start_time = Instant::now();
    let quiet = cli.quiet;

    match cli.command {
        Commands::Plot {
            file,
            variable,
            level,
            output,
            region,
            title_prefix,
            colormap,
            levels,
        } => {
            let output = output.unwrap_or_else(|| default_plot_output(&variable, &level, ""));
            let options = PlotOptions {
                region,
                title_prefix,
                colormap,
                levels: (levels > 0).then_some(levels),
                ..PlotOptions::new(&variable, &level, output)
            };
            let outcome = plot_field(&file, &options, &GribOpener, &PngRenderer)
                .with_context(|| format!("Failed to plot {}", file.display()))?;
            report_outcome(&outcome, quiet);
        }

        Commands::Diff {
            file1,
            file2,
            variable,
            level,
            output,
            region,
            title_prefix,
            colormap,
            levels,
        } => {
            let output = output.unwrap_or_else(|| default_plot_output(&variable, &level, "_diff"));
            let options = PlotOptions {
                region,
                title_prefix,
                colormap,
                levels: (levels > 0).then_some(levels),
                ..PlotOptions::new(&variable, &level, output)
            };
            let outcome = plot_difference(&file1, &file2, &options, &GribOpener, &PngRenderer)
                .with_context(|| {
                    format!("Failed to difference {} and {}", file1.display(), file2.display())
                })?;
            report_outcome(&outcome, quiet);
        }

        Commands::MeanDiff(args) => {
            run_mean_diff(cli.config, &args, quiet)?;
        }

        Commands::Tiles {
            data_prefix,
            oro_prefix,
            variable,
            region,
            output,
            vmin,
            vmax,
            colormap,
        } => {
            let output = output
                .unwrap_or_else(|| PathBuf::from(format!("{}_{}.png", variable, region.name())));
            let mut options = match region {
                Region::Global => TileOptions::snow_liquid_global(output),
                Region::Conus => TileOptions::snow_liquid_conus(output),
            };
            if variable != options.variable {
                options.title = format!("FV3 {} - {} Map", variable, region.name());
                options.colorbar_label = variable.clone();
                options.variable = variable;
            }
            if let Some(v) = vmin {
                options.bounds.low = v;
            }
            if let Some(v) = vmax {
                options.bounds.high = v;
            }
            if options.bounds.low >= options.bounds.high {
                bail!(
                    "--vmin ({}) must be below --vmax ({})",
                    options.bounds.low,
                    options.bounds.high
                );
            }
            if let Some(c) = colormap {
                options.colormap = c;
            }
            let outcome = plot_tiles(&data_prefix, &oro_prefix, &options, &PngRenderer)
                .with_context(|| format!("Failed to plot tiles {}*", data_prefix))?;
            report_outcome(&outcome, quiet);
        }

        Commands::Info {
            file,
            detailed,
            variable,
            format,
        } => {
            let info = get_file_info(&file, variable.as_deref(), detailed)?;
            match format.unwrap_or(cli.output_format) {
                OutputFormat::Human => print_file_info_human(&info),
                OutputFormat::Json => print_file_info_json(&info)?,
                OutputFormat::Yaml => print_file_info_yaml(&info)?,
                OutputFormat::Csv => print_file_info_csv(&info)?,
            }
            return Ok(());
        }

        Commands::Validate {
            config_file,
            detailed,
        } => {
            let path = config_file
                .or(cli.config)
                .context("No configuration file given (pass one or use --config)")?;
            let config = JobConfig::from_file(&path)
                .with_context(|| format!("Failed to load {}", path.display()))?;
            config
                .validate()
                .with_context(|| format!("Invalid configuration {}", path.display()))?;
            if !quiet {
                println!("✓ {} is valid", path.display());
                config_echo(&config);
                if detailed {
                    let range = config.cycle_range()?;
                    let layout = config.layout();
                    println!("\nCycles ({}):", range.len());
                    for cycle in &range {
                        println!("  {}", cycle.format("%Y-%m-%d %H:%M"));
                        println!("    ctl: {}", layout.path_for(&config.ctrl_root, cycle).display());
                        println!("    exp: {}", layout.path_for(&config.exp_root, cycle).display());
                    }
                }
            }
            return Ok(());
        }

        Commands::Template {
            template_type,
            output,
            format,
        } => {
            let text = generate_template(&template_type, &format)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, text)
                        .with_context(|| format!("Failed to write {}", path.display()))?;
                    if !quiet {
                        println!("Template written to {}", path.display());
                    }
                }
                None => println!("{}", text),
            }
            return Ok(());
        }

        Commands::Completions { shell, output } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            match output {
                Some(path) => {
                    let mut file = File::create(&path)
                        .with_context(|| format!("Failed to create {}", path.display()))?;
                    clap_complete::generate(shell, &mut cmd, name, &mut file);
                }
                None => clap_complete::generate(shell, &mut cmd, name, &mut io::stdout()),
            }
            return Ok(());
        }
    }

    if !quiet {
        show_farewell_with_timing(start_time.elapsed());
    }
    Ok(())
}

fn run_mean_diff(config_file: Option<PathBuf>, args: &MeanDiffArgs, quiet: bool) -> Result<()> {
    if !quiet {
        let source = config_file
            .as_deref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "command line".to_string());
        show_greeting(&source);
    }

    let config = resolve_job_config(config_file.as_deref(), args)?;
    if !quiet {
        config_echo(&config);
    }
    if args.dry_run {
        let range = config.cycle_range()?;
        println!("\nDry run: {} cycle(s), nothing read or written", range.len());
        return Ok(());
    }

    let summary = if args.from_cache {
        replot_from_cache(&config, &PngRenderer)?
    } else {
        process_mean_diff_job(&config, &GribOpener, &PngRenderer, !quiet)?
    };
    if !quiet {
        show_run_summary(&summary);
    }
    Ok(())
}

fn report_outcome(outcome: &PlotOutcome, quiet: bool) {
    if !quiet {
        println!("{}", outcome.title);
        println!(
            "  scale [{:.4}, {:.4}] {}",
            outcome.bounds.low, outcome.bounds.high, outcome.colorbar_label
        );
        println!("  Wrote {}", outcome.output.display());
    }
}
