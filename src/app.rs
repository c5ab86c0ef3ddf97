//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - parses CLI arguments and environment settings
//! - installs the tracing subscriber
//! - loads or generates the actual series
//! - runs the projection merge
//! - prints reports/plots
//! - writes optional exports

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::cli::{ChartArgs, Command, PlotArgs};
use crate::config::Settings;
use crate::domain::{KpiConfig, SampleConfig};
use crate::error::AppError;

pub mod pipeline;

/// Entry point for the `kpi` binary.
pub fn run() -> Result<(), AppError> {
    // `kpi` and `kpi -b 25` behave like `kpi tui ...`.
    //
    // Clap requires a subcommand name, so we do a small, explicit rewrite of the
    // argv list before parsing.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    let settings = Settings::from_env()?;

    // Anything on stderr would corrupt the TUI's alternate screen.
    let default_filter = match cli.command {
        Command::Tui(_) => "off",
        _ => "warn",
    };
    init_tracing(settings.log_filter.as_deref().unwrap_or(default_filter));
    tracing::debug!(environment = settings.environment.as_str(), "settings loaded");

    match cli.command {
        Command::Report(args) => handle_chart(args, OutputMode::Full, &settings),
        Command::Table(args) => handle_chart(args, OutputMode::TableOnly, &settings),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => crate::tui::run(kpi_config_from_args(&args), settings),
    }
}

fn init_tracing(directive: &str) {
    let filter = EnvFilter::try_new(directive).unwrap_or_else(|_| EnvFilter::new("warn"));
    // A second init (e.g. from tests) is harmless; keep the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Full,
    TableOnly,
}

fn handle_chart(args: ChartArgs, mode: OutputMode, settings: &Settings) -> Result<(), AppError> {
    let config = kpi_config_from_args(&args);
    let run = pipeline::run(&config)?;

    if mode == OutputMode::Full {
        println!(
            "{}",
            crate::report::format_run_summary(
                &run.summary,
                settings.environment.as_str(),
                &source_label(&config),
            )
        );
    }

    println!("{}", crate::report::format_series_table(&run.merged));

    if mode == OutputMode::Full && config.plot {
        let plot = crate::plot::render_ascii_plot(&run.merged, config.plot_width, config.plot_height);
        println!("{plot}");
    }

    // Optional exports.
    if let Some(path) = &config.export_csv {
        crate::io::export::write_series_csv(path, &run.merged)?;
    }
    if let Some(path) = &config.export_json {
        let chart = crate::io::chart::chart_file(&run);
        crate::io::chart::write_chart_json(path, &chart)?;
    }

    Ok(())
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let chart = crate::io::chart::read_chart_json(&args.chart)?;
    let plot = crate::plot::render_ascii_plot(&chart.points, args.width, args.height);

    println!("{plot}");
    Ok(())
}

pub fn kpi_config_from_args(args: &ChartArgs) -> KpiConfig {
    KpiConfig {
        input: args.input.clone(),
        sample: SampleConfig {
            kind: args.sample,
            start: args.start,
            elapsed_days: args.elapsed,
            seed: args.seed,
            daily_mean: args.daily_mean,
            daily_sigma: args.daily_sigma,
        },
        budget: args.budget,
        projected: args.projected,
        accumulation: args.accumulation,
        plot: args.plot && !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_csv: args.export.clone(),
        export_json: args.export_json.clone(),
    }
}

/// Human-readable name of where the actual series came from.
pub fn source_label(config: &KpiConfig) -> String {
    match &config.input {
        Some(path) => path.display().to_string(),
        None => match config.sample.kind {
            crate::domain::SampleKind::Reference => "reference sample".to_string(),
            crate::domain::SampleKind::Synthetic => format!(
                "synthetic sample (seed {}, {} days from {})",
                config.sample.seed, config.sample.elapsed_days, config.sample.start
            ),
        },
    }
}

/// Rewrite argv so `kpi` defaults to `kpi tui`.
///
/// Rules:
/// - `kpi`                      -> `kpi tui`
/// - `kpi -b 25 ...`            -> `kpi tui -b 25 ...`
/// - `kpi --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("tui".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "report" | "table" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    // If the first token is a flag, treat it as "tui flags".
    if arg1.starts_with('-') {
        argv.insert(1, "tui".to_string());
        return argv;
    }

    argv
}
