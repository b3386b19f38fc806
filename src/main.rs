//! Command-line driver: run a localization scenario or a simulated robot and
//! print the belief after each step.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use grid_localization::logging::{init_logging, LogLevel};
use grid_localization::simulation::simulate;
use grid_localization::visualization::{render_belief_heatmap, snapshot};
use grid_localization::{Action, GridBayesFilter, Heading, Scenario, StepRecord};

#[derive(Parser, Debug)]
#[command(name = "grid-localize")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// trace, debug, info, warn or error (RUST_LOG takes precedence)
    #[arg(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run a scenario file, or the built-in reference scenario.
    Run {
        #[arg(short, long, value_name = "FILE")]
        scenario: Option<PathBuf>,

        /// Print beliefs as JSON instead of grids.
        #[arg(long)]
        json: bool,

        /// Write a heatmap of the final belief to this PNG.
        #[arg(long, value_name = "FILE")]
        plot: Option<PathBuf>,
    },
    /// Drive a simulated robot through the reference maze and filter its readings.
    Simulate {
        /// Commanded moves, e.g. "EESSW".
        #[arg(long, default_value = "EEEESSSWWN")]
        moves: String,

        #[arg(long, default_value_t = 0)]
        seed: u64,

        #[arg(long, value_names = ["ROW", "COL"], num_args = 2, default_values_t = [0, 0])]
        start: Vec<usize>,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("ERROR: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_level);

    match args.command.unwrap_or(Command::Run { scenario: None, json: false, plot: None }) {
        Command::Run { scenario, json, plot } => run_scenario(scenario, json, plot),
        Command::Simulate { moves, seed, start } => run_simulation(&moves, seed, (start[0], start[1])),
    }
}

fn run_scenario(path: Option<PathBuf>, json: bool, plot: Option<PathBuf>) -> Result<()> {
    let scenario = match &path {
        Some(path) => Scenario::from_file(path)
            .with_context(|| format!("failed to load scenario {}", path.display()))?,
        None => Scenario::reference(),
    };
    let mut filter = scenario.build_filter().context("invalid scenario")?;
    let records = filter.run(&scenario.actions).context("filter update failed")?;

    if json {
        let steps: Vec<_> = records
            .iter()
            .map(|r| serde_json::json!({ "action": r.action, "belief": snapshot(&r.belief) }))
            .collect();
        println!("{}", serde_json::to_string_pretty(&steps)?);
    } else {
        print_records(&records);
    }

    if let Some(plot) = plot {
        let out = plot.to_string_lossy();
        render_belief_heatmap(&out, filter.belief())
            .map_err(|e| anyhow::anyhow!("failed to render {out}: {e}"))?;
        eprintln!("Wrote {out}");
    }
    Ok(())
}

fn run_simulation(moves: &str, seed: u64, start: (usize, usize)) -> Result<()> {
    let headings = moves
        .chars()
        .filter(|c| !c.is_whitespace())
        .map(|c| c.to_string().parse::<Heading>())
        .collect::<Result<Vec<_>, _>>()?;

    let scenario = Scenario::reference();
    let mut filter: GridBayesFilter = scenario.build_filter()?;
    let trace = simulate(filter.grid(), scenario.sensor, scenario.motion, start, &headings, seed)
        .context("simulation failed")?;

    for (action, truth) in trace.actions.iter().zip(&trace.truth) {
        let belief = filter.apply(*action)?;
        if let Action::Sense(_) = action {
            let (row, col, p) = belief.most_likely().context("grid has no open cells")?;
            let label = action.to_string();
            println!(
                "{label:<10} truth=({},{}) estimate=({row},{col}) p={p:.2}%",
                truth.0, truth.1
            );
        }
    }
    println!("{}", filter.belief());
    Ok(())
}

fn print_records(records: &[StepRecord]) {
    for record in records {
        println!("-------- {} --------", record.action);
        println!("{}", record.belief);
    }
}
