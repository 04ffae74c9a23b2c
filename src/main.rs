//! Main entry point for the padel ladder CLI
//!
//! Loads configuration, opens the club's JSON data file and runs one ladder
//! command: managing the roster, scheduling balanced doubles and recording
//! set results.

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use padel_ladder::config::AppConfig;
use padel_ladder::pairing::Schedule;
use padel_ladder::service::LadderService;
use padel_ladder::store::JsonFileStore;
use padel_ladder::types::SetResult;
use padel_ladder::utils::{current_timestamp, format_delta};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info};

/// Padel Ladder - balanced doubles pairing and rating for club nights
#[derive(Parser)]
#[command(
    name = "padel-ladder",
    version,
    about = "Balanced doubles pairing and Elo-style ratings for a padel club",
    long_about = "Padel Ladder keeps a club roster with individual ratings, builds balanced \
                 2v2 matches from the players who turned up, and updates ratings after each \
                 set using team expectation, margin of victory and an upset bonus."
)]
struct Args {
    /// Configuration file path
    #[arg(
        short,
        long,
        value_name = "FILE",
        help = "Path to configuration file (TOML format)"
    )]
    config: Option<PathBuf>,

    /// Data file override
    #[arg(long, value_name = "FILE", help = "Override the club data file")]
    data: Option<PathBuf>,

    /// Log level override
    #[arg(
        short,
        long,
        value_name = "LEVEL",
        help = "Override log level (trace, debug, info, warn, error)"
    )]
    log_level: Option<String>,

    /// Enable debug mode
    #[arg(short, long, help = "Enable debug mode with verbose logging")]
    debug: bool,

    /// Dry run mode (validate config and exit)
    #[arg(long, help = "Validate configuration and exit without touching data")]
    dry_run: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Fill an empty club with demo players
    Seed,
    /// Add a player to the roster
    Add {
        /// Player name
        name: String,
        /// Starting rating (defaults to the baseline rating)
        #[arg(short, long)]
        rating: Option<f64>,
    },
    /// Remove a player from the roster
    Remove {
        /// Player ID
        id: String,
    },
    /// List players by name
    Players,
    /// List players by rating
    Leaderboard,
    /// Build balanced doubles from the given players (all players if none given)
    Schedule {
        /// Player IDs that are available
        ids: Vec<String>,
    },
    /// Record a finished set and update ratings
    Record {
        /// Team A, first player ID
        a1: String,
        /// Team A, second player ID
        a2: String,
        /// Team B, first player ID
        b1: String,
        /// Team B, second player ID
        b2: String,
        /// Set score as A-B, e.g. 6-4
        #[arg(short, long)]
        score: String,
        /// Court the set was played on
        #[arg(long)]
        court: Option<String>,
    },
    /// Show recent sets
    History {
        /// Number of sets to show
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },
    /// Show the most active players
    Activity {
        /// Number of players to show
        #[arg(short = 'n', long, default_value_t = 3)]
        top: usize,
    },
    /// Show current Friday streaks
    Streaks {
        /// Number of players to show
        #[arg(short = 'n', long, default_value_t = 3)]
        top: usize,
    },
}

/// Initialize structured logging with the configured level
fn init_logging(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| log_level.into()),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}

/// Load and merge configuration from file/environment and CLI arguments
fn load_config(args: &Args) -> Result<AppConfig> {
    let mut config = match &args.config {
        Some(path) => AppConfig::from_file(path)?,
        None => AppConfig::from_env()?,
    };

    // Apply CLI overrides
    if let Some(log_level) = &args.log_level {
        config.service.log_level = log_level.clone();
    }

    if args.debug {
        config.service.log_level = "debug".to_string();
    }

    if let Some(data) = &args.data {
        config.storage.data_file = data.clone();
    }

    padel_ladder::config::validate_config(&config)?;
    Ok(config)
}

/// Parse a set score such as `6-4`
fn parse_score(score: &str) -> Result<(u32, u32)> {
    let (a, b) = score
        .split_once(['-', ':'])
        .ok_or_else(|| anyhow!("Score must look like 6-4, got '{}'", score))?;

    let parse = |s: &str| {
        s.trim()
            .parse::<u32>()
            .map_err(|_| anyhow!("Invalid games count '{}' in score '{}'", s.trim(), score))
    };

    Ok((parse(a)?, parse(b)?))
}

fn print_schedule(schedule: &Schedule) {
    for m in &schedule.matches {
        let [one, two] = &m.teams;
        println!(
            "{:>4}  {} ({:.0}) & {} ({:.0})  vs  {} ({:.0}) & {} ({:.0})   gap {:.0}",
            m.id,
            one.first().name,
            one.first().rating,
            one.second().name,
            one.second().rating,
            two.first().name,
            two.first().rating,
            two.second().name,
            two.second().rating,
            m.rating_gap()
        );
    }

    if !schedule.sitting_out.is_empty() {
        let names: Vec<&str> = schedule
            .sitting_out
            .iter()
            .map(|p| p.name.as_str())
            .collect();
        println!("Sitting out: {}", names.join(", "));
    }
}

fn run(command: Command, ladder: &LadderService) -> Result<()> {
    match command {
        Command::Seed => {
            let added = ladder.ensure_seed_players()?;
            if added == 0 {
                println!("Roster already has players, nothing seeded");
            } else {
                println!("Seeded {} players", added);
            }
        }
        Command::Add { name, rating } => {
            let player = ladder.add_player(&name, rating)?;
            println!("{}  {}  {:.0}", player.id, player.name, player.rating);
        }
        Command::Remove { id } => {
            if ladder.remove_player(&id)? {
                println!("Removed {}", id);
            } else {
                return Err(anyhow!("No player with id {}", id));
            }
        }
        Command::Players => {
            for player in ladder.players()? {
                println!("{}  {:<28} {:>6.0}", player.id, player.name, player.rating);
            }
        }
        Command::Leaderboard => {
            for (rank, player) in ladder.leaderboard()?.iter().enumerate() {
                println!("{:>3}. {:<28} {:>6.0}", rank + 1, player.name, player.rating);
            }
        }
        Command::Schedule { ids } => {
            let schedule = if ids.is_empty() {
                ladder.schedule(None)?
            } else {
                ladder.schedule(Some(ids.as_slice()))?
            };
            print_schedule(&schedule);
        }
        Command::Record {
            a1,
            a2,
            b1,
            b2,
            score,
            court,
        } => {
            let (score_a, score_b) = parse_score(&score)?;
            let set = SetResult::new([&a1, &a2], [&b1, &b2], score_a, score_b)?;
            let record = ladder.record_set_at(&set, court, current_timestamp())?;

            println!(
                "{} & {} vs {} & {}  {}-{}",
                record.team_a_names[0],
                record.team_a_names[1],
                record.team_b_names[0],
                record.team_b_names[1],
                record.score_a,
                record.score_b
            );
            for point in &record.points {
                println!(
                    "  {:<36} {:>6.0} -> {:>6.0}  ({})",
                    point.id,
                    point.before,
                    point.after,
                    format_delta(point.delta)
                );
            }
        }
        Command::History { limit } => {
            for record in ladder.history()?.into_iter().take(limit) {
                let court = record
                    .court
                    .as_deref()
                    .map(|c| format!("  ({})", c))
                    .unwrap_or_default();
                println!(
                    "{}  {} & {} vs {} & {}  {}-{}{}",
                    record.played_at.format("%Y-%m-%d %H:%M"),
                    record.team_a_names[0],
                    record.team_a_names[1],
                    record.team_b_names[0],
                    record.team_b_names[1],
                    record.score_a,
                    record.score_b,
                    court
                );
            }
        }
        Command::Activity { top } => {
            for row in ladder.activity(top)? {
                println!("{:<28} {:>4} sets", row.name, row.sets_played);
            }
        }
        Command::Streaks { top } => {
            for row in ladder.friday_streaks(top)? {
                println!("{:<28} {:>4} Fridays", row.name, row.streak);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration (CLI args can override environment/config file)
    let config = load_config(&args).unwrap_or_else(|e| {
        eprintln!("Configuration error: {}", e);
        std::process::exit(1);
    });

    // Initialize logging early (before any other operations)
    if let Err(e) = init_logging(&config.service.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if args.dry_run {
        info!("padel-ladder v{}", padel_ladder::VERSION);
        info!("Configuration validation successful");
        info!("   Club: {}", config.service.name);
        info!("   Data file: {}", config.storage.data_file.display());
        info!("   Rating policy: {}", config.rating.policy);
        return Ok(());
    }

    let Some(command) = args.command else {
        return Err(anyhow!("No command given, see --help"));
    };

    let store = JsonFileStore::open(&config.storage.data_file)?;
    debug!("Using data file {}", store.path().display());
    let ladder = LadderService::from_config(&config, Arc::new(store))?;

    if let Err(e) = run(command, &ladder) {
        error!("{}", e);
        return Err(e);
    }

    Ok(())
}
