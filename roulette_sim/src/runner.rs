//! Scenario runner - executes round-formation test scenarios.

use crate::scenarios::ScenarioId;
use crate::world::{SimConfig, SimWorld};

use roulette_core::{HistorySnapshot, RoundConfig, RoundReport};
use tracing::{debug, info, warn};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Rounds attempted
    pub rounds_played: u32,

    /// Highest round number recorded by the engine
    pub final_round: u32,

    /// Virtual days elapsed
    pub days_elapsed: u64,

    /// Failure message if any
    pub failure_reason: Option<String>,

    /// Metrics collected during run
    pub metrics: ScenarioMetrics,

    /// Every engine report, in order
    pub reports: Vec<RoundReport>,

    /// Engine history at the end of the run
    pub history: HistorySnapshot,
}

/// Metrics collected during scenario execution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScenarioMetrics {
    /// Rounds that produced groups
    pub rounds_formed: u32,

    /// Rounds where no valid grouping existed
    pub empty_rounds: u32,

    /// Groups whose composition had occurred before
    pub repeated_groups: usize,

    /// Sum over rounds of participants left out
    pub sit_outs: usize,

    /// Distinct pairs that met at least once
    pub distinct_pairings: usize,

    /// Most times any one pair met
    pub max_times_met: usize,
}

/// Runs scenarios.
pub struct ScenarioRunner {
    /// Configuration seed
    seed: u64,

    /// Rounds override (scenario default when unset)
    rounds: Option<u32>,
}

impl ScenarioRunner {
    /// Creates a new scenario runner.
    pub fn new(seed: u64) -> Self {
        Self { seed, rounds: None }
    }

    /// Overrides the number of rounds played.
    pub fn with_rounds(mut self, rounds: u32) -> Self {
        self.rounds = Some(rounds);
        self
    }

    /// Runs a scenario and returns the result.
    pub fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let setup = scenario.setup();
        let rounds = self.rounds.unwrap_or(setup.default_rounds);

        let mut world = SimWorld::new(SimConfig {
            seed: self.seed,
            roster_size: setup.roster_size,
            round: RoundConfig::new(setup.group_size).with_odd_group(setup.allow_odd_group),
            churn: setup.churn,
            ..Default::default()
        });

        let mut metrics = ScenarioMetrics::default();
        let mut reports = Vec::new();
        let mut failure_reason = None;

        for _ in 0..rounds {
            let outcome = match world.play_round() {
                Ok(outcome) => outcome,
                Err(e) => {
                    failure_reason = Some(e.to_string());
                    break;
                }
            };

            match &outcome.audit {
                Ok(audit) => {
                    if outcome.report.is_empty() {
                        metrics.empty_rounds += 1;
                    } else {
                        metrics.rounds_formed += 1;
                    }
                    metrics.repeated_groups += audit.repeated_groups;
                    metrics.sit_outs += audit.sitting_out;

                    debug!(
                        "  day={} | round={:?} | groups={} | new pairs={} | sitting out={}",
                        world.days_elapsed(),
                        outcome.report.round,
                        outcome.report.groups.len(),
                        audit.new_pairings,
                        audit.sitting_out
                    );
                }
                Err(violation) => {
                    failure_reason = Some(violation.to_string());
                    reports.push(outcome.report);
                    break;
                }
            }
            reports.push(outcome.report);
        }

        metrics.distinct_pairings = world.oracle.distinct_pairings();
        metrics.max_times_met = world.oracle.max_meetings();

        if failure_reason.is_none() {
            failure_reason = check_expectations(scenario, rounds, &metrics, &reports);
        }
        let passed = failure_reason.is_none();

        if passed {
            info!(
                "✓ {} complete: {} rounds formed, {} empty, {} repeats, {} distinct pairs",
                scenario.name(),
                metrics.rounds_formed,
                metrics.empty_rounds,
                metrics.repeated_groups,
                metrics.distinct_pairings
            );
        } else {
            warn!(
                "✗ {} failed: {}",
                scenario.name(),
                failure_reason.as_deref().unwrap_or("unknown")
            );
        }

        ScenarioResult {
            scenario,
            seed: self.seed,
            passed,
            rounds_played: world.rounds_played(),
            final_round: world.matchmaker.current_round_number(),
            days_elapsed: world.days_elapsed(),
            failure_reason,
            metrics,
            reports,
            history: world.matchmaker.history().export(),
        }
    }

    /// Runs every scenario.
    pub fn run_all(&self) -> Vec<ScenarioResult> {
        ScenarioId::all()
            .into_iter()
            .map(|scenario| self.run(scenario))
            .collect()
    }
}

/// Scenario-level assertions on top of the per-round oracle.
fn check_expectations(
    scenario: ScenarioId,
    rounds: u32,
    metrics: &ScenarioMetrics,
    reports: &[RoundReport],
) -> Option<String> {
    match scenario {
        ScenarioId::EvenPairs
        | ScenarioId::OddInclusive
        | ScenarioId::Trios
        | ScenarioId::RosterChurn
        | ScenarioId::LargeRoster => (metrics.empty_rounds > 0)
            .then(|| format!("{} rounds formed no groups", metrics.empty_rounds)),

        ScenarioId::OddSitOut => reports
            .iter()
            .find(|report| !report.is_empty() && report.sitting_out.is_empty())
            .map(|report| format!("nobody sat out in round {:?}", report.round)),

        ScenarioId::StrictTrios => (rounds > 0 && metrics.rounds_formed == 0)
            .then(|| "no round could be formed".to_string()),

        ScenarioId::Exhaustion => {
            let expected = rounds.min(1);
            (metrics.rounds_formed != expected).then(|| {
                format!(
                    "expected {} formed round(s) before exhaustion, got {}",
                    expected, metrics.rounds_formed
                )
            })
        }
    }
}
