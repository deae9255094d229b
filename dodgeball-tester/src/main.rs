mod logic;
mod util;

use anyhow::{Context, Result, bail};
use clap::Parser;
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};
use std::time::Instant;

use dodgeball_game::{SimulationConfig, StrategyId, Trajectory};
use logic::{Profile, SweepOutcome, SweepPlan, resolve_seed_inputs, run_sweep};
use util::split_csv;

const DEFAULT_ROSTER: u32 = 10;

#[derive(Debug, Parser)]
#[command(name = "dodgeball-tester", version)]
#[command(about = "Seed sweeps over the dodgeball simulator with win-rate and game-length reports")]
struct Args {
    /// Simulation settings as JSON; the flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Players per team
    #[arg(long)]
    roster: Option<u32>,

    /// Mean throw rate per player
    #[arg(long)]
    rate: Option<f64>,

    /// Stop each game once the clock reaches this time
    #[arg(long)]
    timeout: Option<f64>,

    /// Stop each game after this many transitions
    #[arg(long)]
    max_transitions: Option<u64>,

    /// Strategy for team 1 (heuristic, aggressive, defensive, random)
    #[arg(long, default_value_t = StrategyId::Heuristic)]
    team1: StrategyId,

    /// Strategy for team 2 (heuristic, aggressive, defensive, random)
    #[arg(long, default_value_t = StrategyId::Heuristic)]
    team2: StrategyId,

    /// How hit probabilities scale with the players involved
    #[arg(long, value_enum, default_value_t = Profile::Constant)]
    profile: Profile,

    /// Base probability of hitting an enemy player
    #[arg(long, default_value_t = 0.5)]
    pe: f64,

    /// Base probability of a rescue throw landing
    #[arg(long, default_value_t = 0.3)]
    pj: f64,

    /// Seeds to run (comma-separated)
    #[arg(long, default_value = "1337")]
    seeds: String,

    /// Games per seed
    #[arg(long, default_value_t = 100)]
    iterations: u64,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console", "csv"])]
    report: String,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write the first game's trajectory as CSV to this path
    #[arg(long)]
    trajectory: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let plan = build_plan(&args)?;
    if args.report == "console" {
        announce_banner();
    }

    let start_time = Instant::now();
    let outcome = run_sweep(&plan);

    write_reports(&args, &plan, &outcome, start_time)?;
    if let Some(path) = args.trajectory.as_deref() {
        match outcome.trajectory.as_ref() {
            Some(trajectory) => write_trajectory(path, trajectory)?,
            None => eprintln!("⚠️  First game failed; no trajectory written"),
        }
    }

    if outcome.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}

fn announce_banner() {
    println!("{}", "🎯 Dodgeball Sweep Tester".bright_cyan().bold());
    println!("{}", "=========================".cyan());
}

fn load_config(path: &Path) -> Result<SimulationConfig> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse {}", path.display()))
}

fn build_config(args: &Args) -> Result<SimulationConfig> {
    let mut config = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => SimulationConfig::new(DEFAULT_ROSTER),
    };
    if let Some(roster) = args.roster {
        config.roster = roster;
    }
    if let Some(rate) = args.rate {
        config.rate = rate;
    }
    if let Some(timeout) = args.timeout {
        config.timeout = Some(timeout);
    }
    if let Some(max_transitions) = args.max_transitions {
        config.max_transitions = Some(max_transitions);
    }
    config
        .validate()
        .context("invalid simulation configuration")?;
    Ok(config)
}

fn check_probability(flag: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        bail!("--{flag} must lie in [0, 1], got {value}");
    }
    Ok(())
}

fn build_plan(args: &Args) -> Result<SweepPlan> {
    let config = build_config(args)?;
    check_probability("pe", args.pe)?;
    check_probability("pj", args.pj)?;
    if args.iterations == 0 {
        bail!("--iterations must be at least 1");
    }
    let seeds = resolve_seed_inputs(&split_csv(&args.seeds))?;

    Ok(SweepPlan {
        config,
        team_one: args.team1,
        team_two: args.team2,
        profile: args.profile,
        pe: args.pe,
        pj: args.pj,
        seeds,
        iterations: args.iterations,
        capture_trajectory: args.trajectory.is_some(),
    })
}

fn write_reports(
    args: &Args,
    plan: &SweepPlan,
    outcome: &SweepOutcome,
    start_time: Instant,
) -> Result<()> {
    let mut output_target = OutputTarget::new(args.output.clone())?;
    let records = outcome.records.as_slice();
    let aggregate = &outcome.aggregate;

    match args.report.as_str() {
        "json" => {
            logic::reports::generate_json_report(&mut output_target, plan, aggregate, records)?;
        }
        "markdown" => {
            logic::reports::generate_markdown_report(&mut output_target, plan, aggregate, records)?;
        }
        "csv" => logic::reports::generate_csv_report(&mut output_target, records)?,
        _ => {
            logic::reports::generate_console_report(
                &mut output_target,
                plan,
                aggregate,
                records,
                args.verbose,
                start_time.elapsed(),
            )?;
        }
    }

    output_target.flush_inner()?;
    Ok(())
}

fn write_trajectory(path: &Path, trajectory: &Trajectory) -> Result<()> {
    let mut target = OutputTarget::new(Some(path.to_path_buf()))?;
    logic::reports::generate_trajectory_csv(&mut target, trajectory)?;
    target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
