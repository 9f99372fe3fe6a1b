//! JSON exporter and file helpers.
//!
//! Exports scenario runs as JSON for offline inspection, and moves rosters
//! and history snapshots between the engine and disk.

use crate::error::{SimError, SimResult};
use crate::runner::ScenarioResult;
use crate::world::ROUND_INTERVAL;

use roulette_core::{History, HistorySnapshot, ParticipantId, RoundReport};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

/// A single round of simulation data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoundFrame {
    /// Virtual day the round was formed on
    pub day: u64,

    /// Round number, absent when no round could be formed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub round: Option<u32>,

    /// Groups in formation order
    pub groups: Vec<Vec<String>>,

    /// Participants placed in no group
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub sitting_out: Vec<String>,
}

impl RoundFrame {
    fn from_report(index: usize, report: &RoundReport) -> Self {
        Self {
            day: index as u64 * ROUND_INTERVAL.as_secs() / 86_400,
            round: report.round,
            groups: report
                .groups
                .iter()
                .map(|group| group.iter().map(ToString::to_string).collect())
                .collect(),
            sitting_out: report.sitting_out.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Complete simulation export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimExport {
    /// Scenario name
    pub scenario: String,

    /// Seed used
    pub seed: u64,

    /// Final results
    pub passed: bool,

    /// Failure message if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure_reason: Option<String>,

    /// All rounds
    pub frames: Vec<RoundFrame>,

    /// Engine history at the end of the run
    pub history: HistorySnapshot,
}

impl SimExport {
    /// Builds an export from a finished run.
    pub fn from_result(result: &ScenarioResult) -> Self {
        Self {
            scenario: result.scenario.name().to_string(),
            seed: result.seed,
            passed: result.passed,
            failure_reason: result.failure_reason.clone(),
            frames: result
                .reports
                .iter()
                .enumerate()
                .map(|(index, report)| RoundFrame::from_report(index, report))
                .collect(),
            history: result.history.clone(),
        }
    }

    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: impl AsRef<Path>) -> SimResult<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json).map_err(|e| SimError::io(path, e))
    }
}

/// Loads a history snapshot; a missing file is an empty history.
pub fn read_history(path: impl AsRef<Path>) -> SimResult<History> {
    let path = path.as_ref();
    if !path.exists() {
        debug!(path = %path.display(), "no history file, starting fresh");
        return Ok(History::new());
    }

    let json = fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
    let snapshot = HistorySnapshot::from_json(&json)?;
    debug!(
        path = %path.display(),
        participants = snapshot.participants.len(),
        "history loaded"
    );
    Ok(History::from_snapshot(snapshot))
}

/// Saves a history snapshot as pretty JSON.
pub fn write_history(path: impl AsRef<Path>, history: &History) -> SimResult<()> {
    let path = path.as_ref();
    let json = history.export().to_json()?;
    fs::write(path, json).map_err(|e| SimError::io(path, e))
}

/// Reads a roster file: ids separated by newlines or commas, `#` comments.
pub fn read_roster(path: impl AsRef<Path>) -> SimResult<Vec<ParticipantId>> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;

    let ids: Vec<ParticipantId> = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.starts_with('#'))
        .flat_map(|line| line.split(','))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ParticipantId::from)
        .collect();

    if ids.is_empty() {
        return Err(SimError::EmptyRoster(path.to_path_buf()));
    }
    Ok(ids)
}
