use std::io;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand, ValueEnum};
use fleetmeter_core::{
    build_report, CounterKind, FleetSnapshot, Month, ReportConfig, ReportKind, SortKey, SortState,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod render;
mod viewer;

use render::OutputFormat;

#[derive(Debug, Parser)]
#[command(name = "fleetmeter")]
#[command(about = "Printer fleet usage and toner reports (read-only)")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Snapshot document; `-` reads stdin.
    #[arg(long, default_value = "./fleet.json")]
    snapshot: String,

    /// Report year for usage and month views; defaults to the current year.
    #[arg(long)]
    year: Option<String>,

    /// Pin "today" (YYYY-MM-DD) instead of reading the clock.
    #[arg(long)]
    today: Option<NaiveDate>,
}

#[derive(Debug, Subcommand)]
enum Command {
    Years {
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
    Usage {
        #[arg(value_enum)]
        counter: CounterArg,
        /// Repeat to toggle: `--sort name --sort name` sorts descending.
        #[arg(long = "sort")]
        sort: Vec<SortKey>,
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
    Toner {
        #[arg(long = "sort")]
        sort: Vec<SortKey>,
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
    Month {
        month: Month,
        #[arg(long = "sort")]
        sort: Vec<SortKey>,
        #[arg(long, value_enum, default_value = "human")]
        format: OutputFormat,
    },
    View,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CounterArg {
    MonoPrints,
    MonoCopies,
    ColourPrints,
    ColourCopies,
}

impl From<CounterArg> for CounterKind {
    fn from(arg: CounterArg) -> Self {
        match arg {
            CounterArg::MonoPrints => CounterKind::MonoPrints,
            CounterArg::MonoCopies => CounterKind::MonoCopies,
            CounterArg::ColourPrints => CounterKind::ColourPrints,
            CounterArg::ColourCopies => CounterKind::ColourCopies,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(io::stderr)
        .compact()
        .init();

    let cli = Cli::parse();

    let snapshot = load_snapshot(&cli.snapshot)?;
    let mut config = cli.today.map(ReportConfig::for_date).unwrap_or_default();
    if let Some(year) = cli.year {
        config = config.with_year(year);
    }

    info!(
        snapshot = %cli.snapshot,
        devices = snapshot.device_count(),
        year = %config.year,
        current_month = %config.current_month,
        "snapshot loaded"
    );

    match cli.command {
        Command::Years { format } => render::print_years(&snapshot, format)?,
        Command::Usage {
            counter,
            sort,
            format,
        } => {
            let sort = sort_state(sort);
            let table = build_report(&snapshot, &config, ReportKind::Usage(counter.into()), &sort);
            render::print_table(&table, &sort, format)?;
        }
        Command::Toner { sort, format } => {
            let sort = sort_state(sort);
            let table = build_report(&snapshot, &config, ReportKind::Toner, &sort);
            render::print_table(&table, &sort, format)?;
        }
        Command::Month {
            month,
            sort,
            format,
        } => {
            let sort = sort_state(sort);
            let table = build_report(&snapshot, &config, ReportKind::Month(month), &sort);
            render::print_table(&table, &sort, format)?;
        }
        Command::View => viewer::run_viewer(&snapshot, &config)?,
    }

    Ok(())
}

fn load_snapshot(source: &str) -> Result<FleetSnapshot> {
    if source == "-" {
        return FleetSnapshot::from_reader(io::stdin().lock()).context("reading snapshot from stdin");
    }
    FleetSnapshot::from_path(Path::new(source))
        .with_context(|| format!("loading snapshot {source}"))
}

/// Replays the requested keys as successive header selections.
fn sort_state(keys: Vec<SortKey>) -> SortState {
    keys.into_iter().fold(SortState::new(), |mut state, key| {
        if let SortKey::Unknown(raw) = &key {
            warn!(key = %raw, "unknown sort key, order left unchanged");
        }
        state.select(key);
        state
    })
}
