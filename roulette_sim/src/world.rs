//! SimWorld - The simulation harness container.

use crate::context::SimContext;
use crate::oracle::{Oracle, RoundAudit, Violation};

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use roulette_core::{Matchmaker, ParticipantId, RouletteResult, RoundConfig, RoundReport};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// One week between rounds.
pub const ROUND_INTERVAL: Duration = Duration::from_secs(7 * 24 * 60 * 60);

/// Configuration for a simulation run.
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// Master seed for determinism
    pub seed: u64,

    /// Participants on the initial roster
    pub roster_size: usize,

    /// Engine settings for every round
    pub round: RoundConfig,

    /// Replace one participant with a newcomer before every round
    pub churn: bool,

    /// Virtual time between rounds
    pub round_interval: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            roster_size: 8,
            round: RoundConfig::default(),
            churn: false,
            round_interval: ROUND_INTERVAL,
        }
    }
}

/// Everything one simulated round produced.
#[derive(Debug, Clone)]
pub struct RoundOutcome {
    /// Roster the round was formed from
    pub roster: Vec<ParticipantId>,

    /// Engine output
    pub report: RoundReport,

    /// Oracle verdict
    pub audit: Result<RoundAudit, Violation>,
}

/// The SimWorld - container for the entire simulation.
pub struct SimWorld {
    /// Configuration
    pub config: SimConfig,

    /// Shared simulation context (virtual clock + shuffle RNG)
    pub context: Arc<SimContext>,

    /// Engine under test
    pub matchmaker: Matchmaker<SimContext>,

    /// Ground truth oracle
    pub oracle: Oracle,

    /// Current roster
    roster: Vec<ParticipantId>,

    /// Separate stream for roster churn so shuffles stay reproducible
    churn_rng: ChaCha8Rng,

    /// Next id suffix for newcomers
    next_participant: usize,

    /// Rounds attempted (formed or not)
    rounds_played: u32,
}

impl SimWorld {
    /// Creates a new SimWorld with the given configuration.
    pub fn new(config: SimConfig) -> Self {
        // Derive separate seeds for different subsystems
        let context_seed = config.seed;
        let churn_seed = config.seed.wrapping_mul(0x9e3779b97f4a7c15);

        let context = SimContext::shared(context_seed);
        let matchmaker = Matchmaker::new(Arc::clone(&context));
        let oracle = Oracle::new(config.round.group_size, config.round.allow_odd_group);
        let roster = (0..config.roster_size).map(participant).collect();

        Self {
            next_participant: config.roster_size,
            config,
            context,
            matchmaker,
            oracle,
            roster,
            churn_rng: ChaCha8Rng::seed_from_u64(churn_seed),
            rounds_played: 0,
        }
    }

    /// Plays one round: churns the roster if configured, forms groups,
    /// audits them and advances the clock by one round interval.
    pub fn play_round(&mut self) -> RouletteResult<RoundOutcome> {
        if self.config.churn && self.rounds_played > 0 {
            self.churn();
        }

        let report = self
            .matchmaker
            .create_round_report(&self.roster, &self.config.round)?;
        let audit = self
            .oracle
            .observe(&self.roster, &report, self.matchmaker.history());

        self.context.advance_time(self.config.round_interval);
        self.rounds_played += 1;

        Ok(RoundOutcome {
            roster: self.roster.clone(),
            report,
            audit,
        })
    }

    /// Replaces a random participant with a newcomer.
    fn churn(&mut self) {
        if self.roster.is_empty() {
            return;
        }
        let index = self.churn_rng.gen_range(0..self.roster.len());
        let newcomer = participant(self.next_participant);
        self.next_participant += 1;

        debug!(left = %self.roster[index], joined = %newcomer, "roster churn");
        self.roster[index] = newcomer;
    }

    /// Returns the current roster.
    pub fn roster(&self) -> &[ParticipantId] {
        &self.roster
    }

    /// Returns the virtual time elapsed, in days.
    pub fn days_elapsed(&self) -> u64 {
        self.context.now().as_secs() / (24 * 60 * 60)
    }

    /// Returns the number of rounds attempted.
    pub fn rounds_played(&self) -> u32 {
        self.rounds_played
    }
}

fn participant(index: usize) -> ParticipantId {
    ParticipantId::new(format!("p{:03}@example.com", index))
}
