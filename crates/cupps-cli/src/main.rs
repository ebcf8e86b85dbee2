// Prospect scoring entry point.
//
// Startup sequence:
// 1. Parse arguments
// 2. Initialize tracing (stderr, or a file with --log-file)
// 3. Load config
// 4. Open database
// 5. Dispatch the subcommand

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use cupps_core::config::{self, Config};
use cupps_core::db::Database;
use cupps_core::import::{self, ImportPaths};
use cupps_core::model::Position;
use cupps_scoring::run_batch;

#[derive(Subcommand, Debug)]
enum Commands {
    /// Score every eligible player and write the scores back to the database
    Score {
        /// Restrict the run to these positions (RB, WR, TE). Omit for all.
        #[arg(value_parser = parse_position)]
        positions: Vec<Position>,
    },
    /// Seed the database from CSV exports
    Import {
        /// Player profiles CSV
        #[arg(long)]
        players: PathBuf,
        /// College seasons CSV
        #[arg(long)]
        seasons: Option<PathBuf>,
        /// Team schedule strength CSV
        #[arg(long)]
        teams: Option<PathBuf>,
        /// Professional seasons CSV
        #[arg(long = "pro-seasons")]
        pro_seasons: Option<PathBuf>,
    },
    /// List stored scores, highest first
    Top {
        /// Only show this position
        #[arg(short, long, value_parser = parse_position)]
        position: Option<Position>,
        /// Maximum rows to show
        #[arg(short, long, default_value_t = 25)]
        limit: usize,
        /// Emit JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[derive(Parser, Debug)]
#[command(name = "cupps")]
#[command(about = "College prospect production and size scoring", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to config file (defaults to ./config/cupps.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to this file instead of stderr
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.log_file.as_deref())?;

    let config = match &cli.config {
        Some(path) => config::load_config_file(path),
        None => config::load_config(),
    }
    .context("failed to load configuration")?;
    info!(
        "Config loaded: db={}, min_year={}",
        config.db_path, config.eligibility.min_year
    );

    let db = Database::open(&config.db_path).context("failed to open database")?;
    info!("Database opened at {}", config.db_path);

    match cli.command {
        Commands::Score { positions } => score(&db, &config, &positions),
        Commands::Import {
            players,
            seasons,
            teams,
            pro_seasons,
        } => import(
            &db,
            ImportPaths {
                players,
                seasons,
                team_years: teams,
                pro_seasons,
            },
        ),
        Commands::Top {
            position,
            limit,
            json,
        } => top(&db, position, limit, json),
    }
}

fn parse_position(s: &str) -> Result<Position, String> {
    Position::from_str_pos(s).ok_or_else(|| format!("unknown position `{s}` (expected RB, WR, or TE)"))
}

// ---------------------------------------------------------------------------
// Subcommands
// ---------------------------------------------------------------------------

fn score(db: &Database, config: &Config, positions: &[Position]) -> anyhow::Result<()> {
    let filter = (!positions.is_empty()).then_some(positions);
    let report = run_batch(db, config, filter).context("scoring batch failed")?;
    println!(
        "scored {} of {} eligible players ({} loaded; skipped: {} unsupported position, {} no valid seasons)",
        report.scored,
        report.eligible,
        report.loaded,
        report.skipped_position,
        report.skipped_no_seasons
    );
    Ok(())
}

fn import(db: &Database, paths: ImportPaths) -> anyhow::Result<()> {
    let bundle = import::load_bundle(&paths).context("failed to read CSV files")?;
    let counts = db
        .import_records(
            &bundle.players,
            &bundle.seasons,
            &bundle.team_years,
            &bundle.pro_seasons,
        )
        .context("failed to import records")?;
    info!("Import complete: {:?}", counts);
    println!(
        "imported {} players, {} seasons, {} team years, {} pro seasons",
        counts.players, counts.seasons, counts.team_years, counts.pro_seasons
    );
    Ok(())
}

fn top(db: &Database, position: Option<Position>, limit: usize, json: bool) -> anyhow::Result<()> {
    let ranked = db
        .load_scores(position.as_ref().map(Position::code), limit)
        .context("failed to load scores")?;

    if json {
        let out = serde_json::to_string_pretty(&ranked).context("failed to serialize scores")?;
        println!("{out}");
        return Ok(());
    }

    if ranked.is_empty() {
        println!("no scored players");
        return Ok(());
    }

    println!(
        "{:>4}  {:<28} {:<4} {:>8} {:>8} {:>8}",
        "#", "player", "pos", "prod", "size", "cupps"
    );
    for (i, row) in ranked.iter().enumerate() {
        let label = if row.name.is_empty() {
            row.player_id.as_str()
        } else {
            row.name.as_str()
        };
        println!(
            "{:>4}  {:<28} {:<4} {:>8.2} {:>8.2} {:>8.2}",
            i + 1,
            label,
            row.position.to_uppercase(),
            row.production_score,
            row.size_score,
            row.cupps_score
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

fn init_tracing(verbose: bool, log_file: Option<&Path>) -> anyhow::Result<()> {
    use tracing_subscriber::fmt;
    use tracing_subscriber::EnvFilter;

    let default_filter = if verbose {
        "cupps=debug,cupps_scoring=debug,cupps_core=debug,warn"
    } else {
        "cupps=info,cupps_scoring=info,cupps_core=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    let builder = fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_target(true);

    match log_file {
        Some(path) => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("failed to create log file {}", path.display()))?;
            let subscriber = builder
                .with_writer(file)
                .with_ansi(false)
                .with_line_number(true)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set tracing subscriber")?;
        }
        None => {
            let subscriber = builder.with_writer(std::io::stderr).finish();
            tracing::subscriber::set_global_default(subscriber)
                .context("failed to set tracing subscriber")?;
        }
    }

    Ok(())
}
