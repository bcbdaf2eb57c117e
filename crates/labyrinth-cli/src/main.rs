//! # labyrinth-cli
//!
//! Binary entry point for labyrinth races.
//!
//! This crate provides:
//! - CLI argument parsing using `clap`
//! - Configuration loading with command-line overrides
//! - Live race progress as a table or JSON lines
//! - Exit codes: 0 when someone found the exit, 2 when nobody did, 130 on Ctrl+C

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use labyrinth_core::{
    CancelSource, RaceConfig, RaceOrchestrator, RaceSummary, SimulatedCrawler, bfs_explorers,
};
use labyrinth_proto::{EventSink, ParticipantResult, RaceEvent};
use std::io::{IsTerminal, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Color output mode for terminal display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorMode {
    /// Automatically detect if stdout is a TTY
    #[default]
    Auto,
    /// Always use colors
    Always,
    /// Never use colors
    Never,
}

impl ColorMode {
    /// Returns true if colors should be used based on mode and terminal detection.
    fn should_use_colors(self) -> bool {
        match self {
            ColorMode::Always => true,
            ColorMode::Never => false,
            ColorMode::Auto => stdout().is_terminal(),
        }
    }
}

/// Output format for race progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table format
    #[default]
    Table,
    /// One JSON object per race event
    Json,
}

/// ANSI color codes for terminal output.
mod colors {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const RED: &str = "\x1b[31m";
    pub const CYAN: &str = "\x1b[36m";
}

/// Exit code when nobody found the exit.
const EXIT_NO_WINNER: i32 = 2;

/// Exit code after Ctrl+C (128 + SIGINT).
const EXIT_INTERRUPTED: i32 = 130;

/// Labyrinth - crawlers racing to the exit of an unknown maze
#[derive(Parser, Debug)]
#[command(name = "labyrinth", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    // ─────────────────────────────────────────────────────────────────────────
    // Global options (available for all subcommands)
    // ─────────────────────────────────────────────────────────────────────────

    /// Path to configuration file
    #[arg(short, long, default_value = "labyrinth.yml", global = true)]
    config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Color output mode (auto, always, never)
    #[arg(long, value_enum, default_value_t = ColorMode::Auto, global = true)]
    color: ColorMode,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run a race (default if no subcommand given)
    Run(RunArgs),

    /// Validate the configuration and print the resolved settings
    Check,
}

/// Arguments for the run subcommand.
#[derive(Parser, Debug, Default)]
struct RunArgs {
    /// Override number of participants
    #[arg(long)]
    participants: Option<usize>,

    /// Override step budget per participant
    #[arg(long)]
    steps: Option<u32>,

    /// Override simulated crawler latency in milliseconds
    #[arg(long)]
    latency_ms: Option<u64>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Some(Commands::Run(args)) => run_command(&cli.config, cli.color, args).await,
        Some(Commands::Check) => check_command(&cli.config),
        None => run_command(&cli.config, cli.color, RunArgs::default()).await,
    }
}

fn load_config(config_path: &Path) -> Result<RaceConfig> {
    if config_path.exists() {
        RaceConfig::from_file(config_path)
            .with_context(|| format!("Failed to load config from {:?}", config_path))
    } else {
        warn!("Config file {:?} not found, using defaults", config_path);
        Ok(RaceConfig::default())
    }
}

async fn run_command(config_path: &Path, color_mode: ColorMode, args: RunArgs) -> Result<()> {
    let mut config = load_config(config_path)?;

    // Apply CLI overrides
    if let Some(participants) = args.participants {
        config.participants = participants;
    }
    if let Some(steps) = args.steps {
        config.step_budget = steps;
    }
    if let Some(latency_ms) = args.latency_ms {
        config.latency_ms = latency_ms;
    }
    config
        .validate()
        .context("Configuration validation failed")?;

    let maze = Arc::new(config.build_maze().context("Failed to build maze")?);
    debug!(
        width = maze.width(),
        height = maze.height(),
        start = %maze.start(),
        "Maze ready"
    );

    let use_colors = color_mode.should_use_colors();
    let sink = match args.format {
        OutputFormat::Table => EventSink::new().with_observer(move |event| {
            print_progress(event, use_colors);
        }),
        OutputFormat::Json => EventSink::new().with_observer(print_json),
    };
    let orchestrator = RaceOrchestrator::new(config.max_participants)?.with_sink(sink);

    // Ctrl+C cancels the race; participants stop at their next step.
    let external = Arc::new(CancelSource::new());
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let external = Arc::clone(&external);
        let interrupted = Arc::clone(&interrupted);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received (SIGINT), stopping participants...");
                interrupted.store(true, Ordering::SeqCst);
                external.cancel();
            }
        });
    }

    info!(
        participants = config.participants,
        step_budget = config.step_budget,
        latency_ms = config.latency_ms,
        "Starting race"
    );
    let latency = config.latency();
    let summary = orchestrator
        .run_with_summary(
            |_| {
                let kit = SimulatedCrawler::kit(&maze, latency);
                async move { Ok(kit) }
            },
            bfs_explorers(config.map_size),
            config.participants,
            config.step_budget,
            &external.signal(),
        )
        .await
        .context("Race failed")?;

    if args.format == OutputFormat::Table {
        print_summary(&summary, use_colors);
    }

    let exit_code = if interrupted.load(Ordering::SeqCst) {
        EXIT_INTERRUPTED
    } else if summary.winner.is_some() {
        0
    } else {
        EXIT_NO_WINNER
    };
    if exit_code != 0 {
        std::process::exit(exit_code);
    }

    Ok(())
}

fn check_command(config_path: &Path) -> Result<()> {
    let config = load_config(config_path)?;
    config
        .validate()
        .context("Configuration validation failed")?;
    let maze = config.build_maze().context("Failed to build maze")?;

    println!("participants:     {}", config.participants);
    println!("max_participants: {}", config.max_participants);
    println!("step_budget:      {}", config.step_budget);
    println!("map_size:         {}", config.map_size);
    println!("latency_ms:       {}", config.latency_ms);
    println!(
        "maze:             {}x{} ({}), start {}",
        maze.width(),
        maze.height(),
        if config.maze.is_some() {
            "custom"
        } else {
            "training"
        },
        maze.start()
    );
    Ok(())
}

fn print_json(event: &RaceEvent) {
    match serde_json::to_string(event) {
        Ok(line) => println!("{line}"),
        Err(e) => warn!("Failed to serialize {} event: {}", event.topic(), e),
    }
}

fn print_progress(event: &RaceEvent, use_colors: bool) {
    use colors::{CYAN, DIM, RED, RESET};

    match event {
        RaceEvent::ParticipantStarted(update) => {
            if use_colors {
                println!(
                    "{CYAN}▶{RESET} participant {} started at {} facing {}",
                    update.participant, update.crawler.position, update.crawler.direction
                );
            } else {
                println!(
                    "> participant {} started at {} facing {}",
                    update.participant, update.crawler.position, update.crawler.direction
                );
            }
        }
        RaceEvent::ParticipantFinished(result) => {
            if use_colors {
                println!(
                    "{DIM}■{RESET} participant {} {}",
                    result.participant,
                    result.status()
                );
            } else {
                println!("# participant {} {}", result.participant, result.status());
            }
        }
        RaceEvent::ParticipantFaulted(fault) => {
            if use_colors {
                println!(
                    "{RED}✗{RESET} participant {} faulted: {}",
                    fault.participant, fault.reason
                );
            } else {
                println!(
                    "x participant {} faulted: {}",
                    fault.participant, fault.reason
                );
            }
        }
        RaceEvent::PositionChanged(_) | RaceEvent::DirectionChanged(_) => {}
    }
}

fn status_color(result: &ParticipantResult) -> &'static str {
    if result.found_exit {
        colors::GREEN
    } else if result.was_cancelled {
        colors::YELLOW
    } else {
        colors::DIM
    }
}

fn print_summary(summary: &RaceSummary, use_colors: bool) {
    use colors::{BOLD, DIM, GREEN, RED, RESET};

    println!();
    if use_colors {
        println!("{BOLD}{DIM}  # │ Status      │ Position   │ Facing │ Steps left{RESET}");
        println!("{DIM}────┼─────────────┼────────────┼────────┼───────────{RESET}");
    } else {
        println!("  # | Status      | Position   | Facing | Steps left");
        println!("----|-------------|------------|--------|-----------");
    }

    for result in &summary.finished {
        let participant = result.participant.to_string();
        let position = result.crawler.position.to_string();
        let facing = result.crawler.direction.to_string();
        if use_colors {
            let color = status_color(result);
            println!(
                "{:>3} │ {color}{:<11}{RESET} │ {:<10} │ {:<6} │ {:>10}",
                participant,
                result.status(),
                position,
                facing,
                result.steps_remaining
            );
        } else {
            println!(
                "{:>3} | {:<11} | {:<10} | {:<6} | {:>10}",
                participant,
                result.status(),
                position,
                facing,
                result.steps_remaining
            );
        }
    }
    for participant in &summary.faulted {
        let participant = participant.to_string();
        if use_colors {
            println!("{:>3} │ {RED}{:<11}{RESET} │", participant, "faulted");
        } else {
            println!("{:>3} | {:<11} |", participant, "faulted");
        }
    }

    println!();
    match &summary.winner {
        Some(winner) if use_colors => println!(
            "{BOLD}{GREEN}Winner:{RESET} participant {} with {} steps to spare",
            winner.participant, winner.steps_remaining
        ),
        Some(winner) => println!(
            "Winner: participant {} with {} steps to spare",
            winner.participant, winner.steps_remaining
        ),
        None => println!("No participant found the exit"),
    }
}
