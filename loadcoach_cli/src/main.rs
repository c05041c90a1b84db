use clap::{Parser, Subcommand};
use loadcoach_core::cold_start::suggest_cold_start;
use loadcoach_core::suggest::epley_e1rm;
use loadcoach_core::*;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "loadcoach")]
#[command(about = "Strength training load suggestions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Read configuration from this file instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Log a performed set
    Log {
        /// Exercise name (matched case-insensitively)
        #[arg(long, short)]
        exercise: String,

        /// Load lifted (kg)
        #[arg(long, short)]
        weight: f64,

        /// Reps performed
        #[arg(long, short)]
        reps: u32,

        /// Reps left in reserve
        #[arg(long, default_value_t = types::DEFAULT_PROXIMITY_TO_FAILURE, allow_negative_numbers = true)]
        rir: i32,

        /// Rest taken after the set (seconds)
        #[arg(long, default_value_t = types::DEFAULT_REST_SECONDS)]
        rest: u32,

        /// Body weight at the time of the set (kg)
        #[arg(long)]
        body_weight: Option<f64>,
    },

    /// Suggest the load for the next session of an exercise
    Suggest {
        #[arg(long, short)]
        exercise: String,

        /// Lower bound of the target rep range
        #[arg(long)]
        low: Option<u32>,

        /// Upper bound of the target rep range
        #[arg(long)]
        high: Option<u32>,

        /// Smallest load step available (kg)
        #[arg(long)]
        micro_increment: Option<f64>,

        /// Body weight for a cold start (kg)
        #[arg(long)]
        body_weight: Option<f64>,

        /// Planned reps for a cold start
        #[arg(long)]
        target_reps: Option<u32>,

        /// Print the suggestion as JSON
        #[arg(long)]
        json: bool,
    },

    /// Seed a first-session load from body weight, ignoring history
    ColdStart {
        #[arg(long, short)]
        exercise: String,

        #[arg(long)]
        body_weight: Option<f64>,

        #[arg(long)]
        target_reps: Option<u32>,

        #[arg(long)]
        micro_increment: Option<f64>,
    },

    /// Show recent sets of an exercise
    History {
        #[arg(long, short)]
        exercise: String,

        /// Maximum number of sets to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show or update the athlete profile
    Profile {
        /// Set current body weight (kg)
        #[arg(long)]
        body_weight: Option<f64>,
    },

    /// Roll up logged sets to the CSV archive
    Rollup {
        /// Clean up processed WAL files after rollup
        #[arg(long)]
        cleanup: bool,
    },
}

/// File locations under the data directory
struct DataPaths {
    wal_dir: PathBuf,
    wal: PathBuf,
    csv: PathBuf,
    profile: PathBuf,
}

impl DataPaths {
    fn new(data_dir: &Path) -> Self {
        let wal_dir = data_dir.join("wal");
        Self {
            wal: wal_dir.join("sets.wal"),
            wal_dir,
            csv: data_dir.join("sets.csv"),
            profile: data_dir.join("profile.json"),
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    loadcoach_core::logging::init_for_verbosity(cli.verbose);

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    config.validate()?;

    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let paths = DataPaths::new(&data_dir);

    match cli.command {
        Commands::Log {
            exercise,
            weight,
            reps,
            rir,
            rest,
            body_weight,
        } => cmd_log(&paths, exercise, weight, reps, rir, rest, body_weight),
        Commands::Suggest {
            exercise,
            low,
            high,
            micro_increment,
            body_weight,
            target_reps,
            json,
        } => {
            let mut params = SuggestionParams::from(&config.suggestion);
            params.target = RepRange::new(
                low.unwrap_or(params.target.low),
                high.unwrap_or(params.target.high),
            );
            if let Some(step) = micro_increment {
                params.micro_increment = step;
            }
            if let Some(reps) = target_reps {
                params.cold_start_target_reps = reps;
            }
            cmd_suggest(&paths, &config, &exercise, body_weight, &params, json)
        }
        Commands::ColdStart {
            exercise,
            body_weight,
            target_reps,
            micro_increment,
        } => cmd_cold_start(
            &paths,
            &config,
            &exercise,
            body_weight,
            target_reps.unwrap_or(config.suggestion.cold_start_target_reps),
            micro_increment.unwrap_or(config.suggestion.micro_increment),
        ),
        Commands::History { exercise, limit } => cmd_history(
            &paths,
            &exercise,
            limit.unwrap_or(config.suggestion.history_limit),
        ),
        Commands::Profile { body_weight } => cmd_profile(&paths, body_weight),
        Commands::Rollup { cleanup } => cmd_rollup(&paths, cleanup),
    }
}

fn cmd_log(
    paths: &DataPaths,
    exercise: String,
    weight: f64,
    reps: u32,
    rir: i32,
    rest: u32,
    body_weight: Option<f64>,
) -> Result<()> {
    let exercise = exercise.trim().to_string();
    if exercise.is_empty() {
        return Err(Error::Validation("exercise name is empty".into()));
    }
    if !weight.is_finite() || weight <= 0.0 {
        return Err(Error::Validation(format!(
            "weight must be a positive number, got {}",
            weight
        )));
    }
    if reps == 0 {
        return Err(Error::Validation("reps must be at least 1".into()));
    }
    if let Some(bw) = body_weight {
        if !bw.is_finite() || bw <= 0.0 {
            return Err(Error::Validation(format!(
                "body weight must be a positive number, got {}",
                bw
            )));
        }
    }

    let mut set = SetRecord::new(exercise, weight, reps)
        .with_proximity_to_failure(rir)
        .with_body_weight(body_weight);
    set.rest_seconds = Some(rest);

    let mut sink = JsonlSink::new(&paths.wal);
    sink.append(&set)?;

    tracing::info!("Logged set {} to {:?}", set.id, paths.wal);
    println!(
        "✓ Logged {}: {} kg x {} (RIR {})",
        set.exercise, set.weight, set.reps, set.proximity_to_failure
    );
    Ok(())
}

fn cmd_suggest(
    paths: &DataPaths,
    config: &Config,
    exercise: &str,
    body_weight: Option<f64>,
    params: &SuggestionParams,
    json: bool,
) -> Result<()> {
    let history = load_exercise_history(
        &paths.wal,
        &paths.csv,
        exercise,
        config.suggestion.history_limit,
    )?;

    let report = advise(
        exercise,
        &history,
        || lookup_body_weight(paths, config, body_weight),
        params,
    )?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        display_report(&report);
    }
    Ok(())
}

fn cmd_cold_start(
    paths: &DataPaths,
    config: &Config,
    exercise: &str,
    body_weight: Option<f64>,
    target_reps: u32,
    micro_increment: f64,
) -> Result<()> {
    let body_weight = lookup_body_weight(paths, config, body_weight)?;
    let result = suggest_cold_start(body_weight, exercise, target_reps, micro_increment);

    println!("{}", exercise);
    match result.suggested_load {
        Some(load) => println!("  Starting load: {} kg for {} reps", load, target_reps),
        None => println!("  No suggestion"),
    }
    println!("  Body weight used: {} kg", body_weight);
    if let Some(note) = result.rationale {
        println!("  {}", note);
    }
    Ok(())
}

fn cmd_history(paths: &DataPaths, exercise: &str, limit: usize) -> Result<()> {
    let sets = load_exercise_history(&paths.wal, &paths.csv, exercise, limit)?;

    if sets.is_empty() {
        println!("No sets logged for {}", exercise);
        return Ok(());
    }

    println!("{} ({} most recent sets)", exercise, sets.len());
    for set in &sets {
        let e1rm = if set.is_eligible() {
            format!("e1RM {:.1}", epley_e1rm(set.weight, set.reps))
        } else {
            "ignored".to_string()
        };
        println!(
            "  {}  {} kg x {} (RIR {})  {}",
            set.recorded_at.format("%Y-%m-%d %H:%M"),
            set.weight,
            set.reps,
            set.proximity_to_failure,
            e1rm
        );
    }
    Ok(())
}

fn cmd_profile(paths: &DataPaths, body_weight: Option<f64>) -> Result<()> {
    let profile = match body_weight {
        Some(kg) => {
            let profile = AthleteProfile::update(&paths.profile, |p| p.set_body_weight(kg))?;
            println!("✓ Profile updated");
            profile
        }
        None => AthleteProfile::load(&paths.profile)?,
    };

    match profile.body_weight_kg {
        Some(kg) => println!("  Body weight: {} kg", kg),
        None => println!("  Body weight: not set"),
    }
    if let Some(updated_at) = profile.updated_at {
        println!("  Updated: {}", updated_at.format("%Y-%m-%d %H:%M"));
    }
    Ok(())
}

fn cmd_rollup(paths: &DataPaths, cleanup: bool) -> Result<()> {
    if !paths.wal.exists() {
        println!("No WAL file found - nothing to roll up.");
        return Ok(());
    }

    let count = loadcoach_core::csv_rollup::wal_to_csv_and_archive(&paths.wal, &paths.csv)?;

    println!("✓ Rolled up {} sets to CSV", count);
    println!("  CSV: {}", paths.csv.display());

    if cleanup {
        let cleaned = loadcoach_core::csv_rollup::cleanup_processed_wals(&paths.wal_dir)?;
        if cleaned > 0 {
            println!("✓ Cleaned up {} processed WAL files", cleaned);
        }
    }

    Ok(())
}

/// Body weight for a cold start: flag, profile, logged sets, then config default
fn lookup_body_weight(paths: &DataPaths, config: &Config, explicit: Option<f64>) -> Result<f64> {
    if let Some(kg) = explicit.filter(|kg| kg.is_finite() && *kg > 0.0) {
        return Ok(kg);
    }

    let profile = AthleteProfile::load(&paths.profile)?;
    let logged = load_all_sets(&paths.wal, &paths.csv)?;
    Ok(resolve_body_weight(
        None,
        &profile,
        &logged,
        config.suggestion.default_body_weight_kg,
    ))
}

fn display_report(report: &SuggestionReport) {
    println!("{}", report.exercise);

    match (report.suggested_load, report.source) {
        (Some(load), SuggestionSource::History) => {
            println!("  Suggested load: {} kg (from history)", load);
        }
        (Some(load), _) => {
            println!("  Suggested load: {} kg (cold start)", load);
        }
        (None, _) => {
            println!("  No suggestion");
        }
    }

    if let Some(ref note) = report.note {
        println!("  {}", note);
    }

    if !report.samples.is_empty() {
        println!("  Based on {} recent sets:", report.samples.len());
        for set in &report.samples {
            println!(
                "    {} kg x {} (RIR {})  {}",
                set.weight,
                set.reps,
                set.proximity_to_failure,
                set.recorded_at.format("%Y-%m-%d")
            );
        }
    }
}
