//! Coffee Roulette DST Simulator CLI
//!
//! Run deterministic round-formation scenarios, form a real round from a
//! roster file, or convert history between CSV and JSON.

use clap::{Args, Parser, Subcommand};
use roulette_core::{Matchmaker, ParticipantId, RoundConfig};
use roulette_env::SystemContext;
use roulette_sim::{
    read_history, read_roster, write_history, CsvSession, ScenarioId, ScenarioResult,
    ScenarioRunner, SimError, SimExport, SimResult,
};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

/// Coffee Roulette Deterministic Simulation Testing CLI
#[derive(Parser, Debug)]
#[command(name = "roulette-sim")]
#[command(about = "Form coffee roulette rounds and run deterministic simulation tests", long_about = None)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run simulation scenarios against the engine
    Simulate(SimulateArgs),

    /// Form the next real round from a roster file
    Round(RoundArgs),

    /// Convert history between CSV session and JSON snapshot files
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
struct SimulateArgs {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Scenario to run (even_pairs, odd_sit_out, ..., all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to test (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Rounds per scenario (scenario default when omitted)
    #[arg(short, long)]
    rounds: Option<u32>,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export rounds and final history of a single scenario to a JSON file
    #[arg(long)]
    export: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct RoundArgs {
    /// Roster file (one id per line, or comma separated)
    #[arg(short, long)]
    roster: PathBuf,

    /// History snapshot, created if missing
    #[arg(long, default_value = "roulette_history.json")]
    history: PathBuf,

    /// Target group size
    #[arg(short, long, default_value = "2")]
    group_size: usize,

    /// Keep roster order instead of shuffling
    #[arg(long)]
    no_shuffle: bool,

    /// Let leftovers sit out and never repeat a composition
    #[arg(long)]
    no_odd_group: bool,

    /// Also write a CSV session backup
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Print the round without saving history
    #[arg(long)]
    dry_run: bool,
}

#[derive(Args, Debug)]
struct ConvertArgs {
    /// Source file (.csv or .json)
    input: PathBuf,

    /// Destination file (.json or .csv)
    output: PathBuf,

    /// Group size written to CSV output
    #[arg(short, long, default_value = "2")]
    group_size: usize,

    /// Roster written to CSV output (defaults to everyone in the history)
    #[arg(short, long)]
    roster: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging (stderr, so --json output stays clean)
    let level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let outcome = match cli.command {
        Command::Simulate(args) => simulate(args),
        Command::Round(args) => round(args),
        Command::Convert(args) => convert(args),
    };

    match outcome {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    }
}

/// Runs scenarios; returns false if any run failed.
fn simulate(args: SimulateArgs) -> SimResult<bool> {
    if !args.json {
        info!("Coffee Roulette DST Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        match args.scenario.parse() {
            Ok(scenario) => vec![scenario],
            Err(e) => {
                let names: Vec<&str> = ScenarioId::all().iter().map(ScenarioId::name).collect();
                eprintln!("Error: {}", e);
                eprintln!("Available scenarios: {}, all", names.join(", "));
                return Ok(false);
            }
        }
    };

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    let runner_for = |seed: u64| {
        let runner = ScenarioRunner::new(seed);
        match args.rounds {
            Some(rounds) => runner.with_rounds(rounds),
            None => runner,
        }
    };

    // Handle --export mode
    if let Some(export_path) = &args.export {
        if scenarios.len() > 1 {
            eprintln!("Error: --export only supports a single scenario, not 'all'");
            return Ok(false);
        }

        let result = runner_for(base_seed).run(scenarios[0]);
        SimExport::from_result(&result).write_to_file(export_path)?;
        info!(
            "Exported {} rounds to {}",
            result.reports.len(),
            export_path.display()
        );
        report(&result, args.json);
        return Ok(result.passed);
    }

    // Run simulations
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = runner_for(seed);

        for scenario in &scenarios {
            let result = runner.run(*scenario);
            if !args.json {
                report(&result, false);
            }
            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let failed: Vec<&ScenarioResult> = all_results.iter().filter(|r| !r.passed).collect();

    if args.json {
        // JSON output for CI parsing
        let summary = serde_json::json!({
            "total": total,
            "passed": total - failed.len(),
            "failed": failed.len(),
            "results": all_results.iter().map(result_json).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
        if failed.is_empty() {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed.len(), total);
            for result in &failed {
                error!(
                    "  - {} seed={}: {}",
                    result.scenario.name(),
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    Ok(failed.is_empty())
}

fn report(result: &ScenarioResult, json: bool) {
    if json {
        if let Ok(text) = serde_json::to_string_pretty(&result_json(result)) {
            println!("{}", text);
        }
    } else if result.passed {
        info!("✓ {} (seed={}) PASSED", result.scenario.name(), result.seed);
    } else {
        error!(
            "✗ {} (seed={}) FAILED: {}",
            result.scenario.name(),
            result.seed,
            result.failure_reason.as_deref().unwrap_or("unknown")
        );
    }
}

fn result_json(r: &ScenarioResult) -> serde_json::Value {
    serde_json::json!({
        "scenario": r.scenario.name(),
        "seed": r.seed,
        "passed": r.passed,
        "rounds_played": r.rounds_played,
        "final_round": r.final_round,
        "rounds_formed": r.metrics.rounds_formed,
        "empty_rounds": r.metrics.empty_rounds,
        "repeated_groups": r.metrics.repeated_groups,
        "sit_outs": r.metrics.sit_outs,
        "distinct_pairings": r.metrics.distinct_pairings,
        "failure_reason": r.failure_reason,
    })
}

/// Forms one round with OS randomness and persists the history.
fn round(args: RoundArgs) -> SimResult<bool> {
    let roster = read_roster(&args.roster)?;
    let history = read_history(&args.history)?;

    let mut matchmaker = Matchmaker::with_history(SystemContext::shared(), history);
    let config = RoundConfig::new(args.group_size)
        .with_shuffle(!args.no_shuffle)
        .with_odd_group(!args.no_odd_group);

    let report = matchmaker.create_round_report(&roster, &config)?;

    match report.round {
        Some(number) => {
            println!("Round {}", number);
            for group in &report.groups {
                println!("  {}", group);
            }
        }
        None => warn!("No valid grouping: every possible composition has already been used"),
    }
    if !report.sitting_out.is_empty() {
        let names: Vec<&str> = report.sitting_out.iter().map(ParticipantId::as_str).collect();
        println!("Sitting out: {}", names.join(", "));
    }

    if args.dry_run {
        info!("Dry run, history not saved");
    } else if report.round.is_some() {
        write_history(&args.history, matchmaker.history())?;
        info!("History saved to {}", args.history.display());
    }

    if let Some(csv) = &args.csv {
        CsvSession::new(&roster, args.group_size, matchmaker.history())
            .with_groups(&report.groups)
            .write_to(csv)?;
        info!("Session backup written to {}", csv.display());
    }

    Ok(true)
}

/// Converts between CSV sessions and JSON snapshots, by file extension.
fn convert(args: ConvertArgs) -> SimResult<bool> {
    if !args.input.exists() {
        return Err(SimError::io(
            &args.input,
            std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"),
        ));
    }

    match (extension(&args.input).as_deref(), extension(&args.output).as_deref()) {
        (Some("csv"), Some("json")) => {
            let session = CsvSession::read_from(&args.input)?;
            let history = session.into_history();
            write_history(&args.output, &history)?;
            info!(
                "Converted {} participants, {} rounds",
                history.len(),
                history.current_round_number()
            );
        }
        (Some("json"), Some("csv")) => {
            let history = read_history(&args.input)?;
            let roster = match &args.roster {
                Some(path) => read_roster(path)?,
                None => {
                    let mut ids: Vec<ParticipantId> =
                        history.participants().map(|(id, _)| id.clone()).collect();
                    ids.sort();
                    ids
                }
            };
            CsvSession::new(&roster, args.group_size, &history).write_to(&args.output)?;
            info!("Converted {} participants", history.len());
        }
        (Some("json" | "csv"), _) => return Err(SimError::UnsupportedFormat(args.output)),
        _ => return Err(SimError::UnsupportedFormat(args.input)),
    }

    Ok(true)
}

fn extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
}
