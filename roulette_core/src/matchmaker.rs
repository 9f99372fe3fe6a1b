//! Matchmaker - the Round Orchestrator.
//!
//! This module wires the leaves of the engine together behind a single
//! entry point, [`Matchmaker::create_round`]:
//!
//! ```text
//! roster ──► normalize ──► shuffle? ──► sit-out slot? ──► form_groups ──► record ──► groups
//!                             ▲                               │             │
//!                             │                               ▼             ▼
//!                      RouletteContext                     History ◄────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use roulette_core::{Matchmaker, RoundConfig};
//! use roulette_env::SystemContext;
//!
//! let mut matchmaker = Matchmaker::new(SystemContext::shared());
//! let groups = matchmaker.create_round(&roster, &RoundConfig::default())?;
//! ```

use crate::error::{RouletteError, RouletteResult};
use crate::formation::{form_groups, Slot};
use crate::group::{Group, ParticipantId};
use crate::history::History;
use crate::roster::normalize;
use crate::shuffle::shuffle;
use chrono::{DateTime, Utc};
use roulette_env::RouletteContext;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{debug, info};

/// Configuration for one round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundConfig {
    /// Target members per group (minimum 2)
    pub group_size: usize,

    /// Shuffle the roster before forming groups (default: true)
    pub shuffle: bool,

    /// Fold leftovers into an adjacent group and accept repeats rather than
    /// making people sit out (default: true)
    pub allow_odd_group: bool,
}

impl Default for RoundConfig {
    fn default() -> Self {
        Self {
            group_size: 2,
            shuffle: true,
            allow_odd_group: true,
        }
    }
}

impl RoundConfig {
    /// Creates a config for the given group size with default flags.
    pub fn new(group_size: usize) -> Self {
        Self {
            group_size,
            ..Self::default()
        }
    }

    /// Sets whether the roster is shuffled.
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle = shuffle;
        self
    }

    /// Sets the odd-group policy.
    pub fn with_odd_group(mut self, allow_odd_group: bool) -> Self {
        self.allow_odd_group = allow_odd_group;
        self
    }
}

/// Outcome of one round, including who was left out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundReport {
    /// Round number assigned, or `None` when no round could be formed
    pub round: Option<u32>,

    /// Groups for this round (possibly empty)
    pub groups: Vec<Group>,

    /// Normalized roster members that appear in no group
    pub sitting_out: Vec<ParticipantId>,
}

impl RoundReport {
    fn empty(sitting_out: Vec<ParticipantId>) -> Self {
        Self {
            round: None,
            groups: Vec::new(),
            sitting_out,
        }
    }

    /// True if no round was formed.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Forms rounds against one roster's history.
///
/// Generic over the context so the same code runs with OS entropy in
/// production or a seeded RNG in simulation. Each instance owns its own
/// [`History`]; independent rosters simply use separate matchmakers.
pub struct Matchmaker<Ctx>
where
    Ctx: RouletteContext,
{
    /// Environment context (randomness + wall clock)
    context: Arc<Ctx>,

    /// Everything recorded so far
    history: History,
}

impl<Ctx> Matchmaker<Ctx>
where
    Ctx: RouletteContext,
{
    /// Creates a matchmaker with an empty history.
    pub fn new(context: Arc<Ctx>) -> Self {
        Self::with_history(context, History::new())
    }

    /// Creates a matchmaker that continues from an existing history.
    pub fn with_history(context: Arc<Ctx>, history: History) -> Self {
        Self { context, history }
    }

    /// Creates this round's groups and records them.
    ///
    /// An empty result means no round could be formed; the history is then
    /// left untouched.
    ///
    /// # Errors
    /// [`RouletteError::InvalidGroupSize`] if `config.group_size < 2`.
    /// [`RouletteError::RoundLimit`] if round `u32::MAX` is already recorded.
    pub fn create_round(
        &mut self,
        ids: &[ParticipantId],
        config: &RoundConfig,
    ) -> RouletteResult<Vec<Group>> {
        Ok(self.create_round_report(ids, config)?.groups)
    }

    /// Like [`create_round`](Self::create_round) but also reports the round
    /// number and who sat out.
    pub fn create_round_report(
        &mut self,
        ids: &[ParticipantId],
        config: &RoundConfig,
    ) -> RouletteResult<RoundReport> {
        if config.group_size < 2 {
            return Err(RouletteError::InvalidGroupSize {
                group_size: config.group_size,
            });
        }
        if ids.is_empty() {
            return Ok(RoundReport::empty(Vec::new()));
        }

        let roster = normalize(ids);
        let ordered = if config.shuffle {
            shuffle(&roster, self.context.as_ref())
        } else {
            roster.clone()
        };

        let mut slots: Vec<Slot> = ordered.into_iter().map(Slot::Member).collect();
        if roster.len() % config.group_size != 0 && !config.allow_odd_group {
            slots.push(Slot::SitOut);
            debug!("a participant will sit out this round");
        }

        let groups = form_groups(
            &slots,
            config.group_size,
            config.allow_odd_group,
            &self.history,
        );

        let sitting_out = left_out(&roster, &groups);
        if groups.is_empty() {
            debug!(roster = roster.len(), "no valid grouping for this round");
            return Ok(RoundReport::empty(sitting_out));
        }

        let round = self
            .history
            .checked_next_round_number()
            .ok_or(RouletteError::RoundLimit {
                last_round: u32::MAX,
            })?;
        self.history.record(&groups, round, self.now());

        info!(
            round,
            groups = groups.len(),
            sitting_out = sitting_out.len(),
            "round recorded"
        );

        Ok(RoundReport {
            round: Some(round),
            groups,
            sitting_out,
        })
    }

    /// Highest round recorded so far (0 if none).
    pub fn current_round_number(&self) -> u32 {
        self.history.current_round_number()
    }

    /// Round number the next successful round will get.
    pub fn next_round_number(&self) -> u32 {
        self.history.next_round_number()
    }

    /// Read access to the history.
    pub fn history(&self) -> &History {
        &self.history
    }

    /// Mutable access, e.g. to import a snapshot or reset.
    pub fn history_mut(&mut self) -> &mut History {
        &mut self.history
    }

    /// Consumes the matchmaker and returns its history.
    pub fn into_history(self) -> History {
        self.history
    }

    /// Returns the environment context.
    pub fn context(&self) -> &Arc<Ctx> {
        &self.context
    }

    fn now(&self) -> DateTime<Utc> {
        DateTime::<Utc>::from(self.context.system_time())
    }
}

fn left_out(roster: &[ParticipantId], groups: &[Group]) -> Vec<ParticipantId> {
    let placed: HashSet<&ParticipantId> = groups.iter().flat_map(Group::iter).collect();
    roster
        .iter()
        .filter(|id| !placed.contains(id))
        .cloned()
        .collect()
}
