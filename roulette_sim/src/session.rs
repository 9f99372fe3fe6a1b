//! CSV session backups.
//!
//! A session file carries the roster, the group size, the latest round's
//! groups and the full contact log:
//!
//! ```text
//! Section,Data
//! Emails,"alice@x.io, bob@x.io, carol@x.io, dave@x.io"
//! Group Size,2
//! Pairs,"alice@x.io & carol@x.io
//! bob@x.io & dave@x.io"
//! Pairing History
//! Email,Paired With
//! alice@x.io,bob@x.io (Round 1, Date: 2024-01-01); carol@x.io (Round 2, Date: 2024-01-08)
//! ```
//!
//! Only the contact log is stored, so group keys are rebuilt on import
//! through [`History::import`]. Dates keep day precision.

use crate::error::{SimError, SimResult};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use roulette_core::{
    ContactSnapshot, Group, History, HistorySnapshot, ParticipantId, ParticipantSnapshot,
};
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// Contents of one CSV session file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CsvSession {
    /// Roster, in display order
    pub emails: Vec<String>,

    /// Target group size
    pub group_size: usize,

    /// Groups of the latest round
    pub pairs: Vec<Vec<String>>,

    /// Contact log
    pub history: HistorySnapshot,
}

impl CsvSession {
    /// Captures a roster and history.
    pub fn new(emails: &[ParticipantId], group_size: usize, history: &History) -> Self {
        Self {
            emails: emails.iter().map(ToString::to_string).collect(),
            group_size,
            pairs: Vec::new(),
            history: history.export(),
        }
    }

    /// Sets the latest round's groups.
    pub fn with_groups(mut self, groups: &[Group]) -> Self {
        self.pairs = groups
            .iter()
            .map(|group| group.iter().map(ToString::to_string).collect())
            .collect();
        self
    }

    /// Rebuilds the engine history, group keys included.
    pub fn into_history(self) -> History {
        History::from_snapshot(self.history)
    }

    /// Renders the session as CSV text.
    ///
    /// Ids are written without CSV escaping. Ids containing `", "`, `"; "`,
    /// `" & "` or a double quote do not survive [`parse`](Self::parse).
    pub fn to_csv(&self) -> String {
        let mut out = String::from("Section,Data\n");
        out.push_str(&format!("Emails,\"{}\"\n", self.emails.join(", ")));
        out.push_str(&format!("Group Size,{}\n", self.group_size));

        let pairs: Vec<String> = self.pairs.iter().map(|group| group.join(" & ")).collect();
        out.push_str(&format!("Pairs,\"{}\"\n", pairs.join("\n")));

        out.push_str("Pairing History\nEmail,Paired With\n");
        for (email, entry) in &self.history.participants {
            let contacts: Vec<String> = entry
                .has_paired_with
                .iter()
                .flat_map(|(partner, events)| {
                    events.iter().map(move |event| {
                        format!(
                            "{} (Round {}, Date: {})",
                            partner,
                            event.round,
                            event.date.format("%Y-%m-%d")
                        )
                    })
                })
                .collect();
            out.push_str(&format!("{},{}\n", email, contacts.join("; ")));
        }
        out
    }

    /// Parses CSV text.
    ///
    /// # Errors
    /// [`SimError::InvalidCsv`] if the `Emails` or `Group Size` line is
    /// missing or unreadable. Malformed history entries are skipped.
    pub fn parse(text: &str) -> SimResult<Self> {
        let lines: Vec<&str> = text.lines().collect();
        let mut emails = None;
        let mut group_size = None;
        let mut pairs = Vec::new();
        let mut history = HistorySnapshot::default();
        let mut in_history = false;

        let mut i = 0;
        while i < lines.len() {
            let line = lines[i].trim();

            if in_history {
                if line != "Email,Paired With" && line.contains(',') {
                    parse_history_row(line, &mut history);
                }
            } else if let Some(rest) = line.strip_prefix("Emails,") {
                emails = parse_emails(rest);
            } else if let Some(rest) = line.strip_prefix("Group Size,") {
                let value = rest.trim();
                let parsed = if value.is_empty() {
                    Ok(2)
                } else {
                    value.parse::<usize>()
                };
                group_size = Some(parsed.map_err(|_| {
                    SimError::InvalidCsv(format!("bad group size {:?}", value))
                })?);
            } else if let Some(rest) = line.strip_prefix("Pairs,") {
                let (parsed, next) = parse_pairs(rest, &lines, i);
                pairs = parsed;
                i = next;
            } else if line == "Pairing History" {
                in_history = true;
            }
            i += 1;
        }

        let emails = emails.ok_or_else(|| SimError::InvalidCsv("missing Emails line".into()))?;
        let group_size =
            group_size.ok_or_else(|| SimError::InvalidCsv("missing Group Size line".into()))?;

        debug!(
            emails = emails.len(),
            group_size,
            history = history.participants.len(),
            "CSV session parsed"
        );

        Ok(Self {
            emails,
            group_size,
            pairs,
            history,
        })
    }

    /// Reads a session file.
    pub fn read_from(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        Self::parse(&text)
    }

    /// Writes a session file.
    pub fn write_to(&self, path: impl AsRef<Path>) -> SimResult<()> {
        let path = path.as_ref();
        fs::write(path, self.to_csv()).map_err(|e| SimError::io(path, e))
    }
}

/// `None` unless the field is quoted; `""` is an empty roster.
fn parse_emails(rest: &str) -> Option<Vec<String>> {
    let inner = rest.strip_prefix('"')?.strip_suffix('"')?;
    Some(
        inner
            .split(", ")
            .map(str::trim)
            .filter(|email| !email.is_empty())
            .map(str::to_string)
            .collect(),
    )
}

/// Parses the `Pairs` field starting at line `start`.
///
/// Returns the groups and the index of the last line consumed. The field is
/// either one line with literal `\n` separators or a quoted block spanning
/// several lines.
fn parse_pairs(rest: &str, lines: &[&str], start: usize) -> (Vec<Vec<String>>, usize) {
    let Some(first) = rest.strip_prefix('"') else {
        return (Vec::new(), start);
    };

    if let Some(inner) = first.strip_suffix('"') {
        return (split_groups(inner.split("\\n")), start);
    }

    let mut body = vec![first];
    let mut i = start + 1;
    while i < lines.len() {
        let line = lines[i];
        if let Some(last) = line.strip_suffix('"') {
            body.push(last);
            break;
        }
        body.push(line);
        i += 1;
    }
    (split_groups(body.into_iter()), i.min(lines.len().saturating_sub(1)))
}

fn split_groups<'a>(lines: impl Iterator<Item = &'a str>) -> Vec<Vec<String>> {
    lines
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| line.split(" & ").map(|id| id.trim().to_string()).collect())
        .collect()
}

fn parse_history_row(row: &str, history: &mut HistorySnapshot) {
    let Some((email, paired_with)) = row.split_once(',') else {
        return;
    };
    let email = email.trim();
    let paired_with = paired_with.trim();
    if email.is_empty() || paired_with.is_empty() {
        return;
    }

    let mut entry = ParticipantSnapshot::default();
    for contact in paired_with.split("; ") {
        match parse_contact(contact) {
            Some((partner, event)) => entry
                .has_paired_with
                .entry(partner)
                .or_default()
                .push(event),
            None => warn!(participant = email, contact, "skipping unreadable contact"),
        }
    }

    if !entry.has_paired_with.is_empty() {
        history.participants.insert(email.to_string(), entry);
    }
}

/// Parses `partner (Round N, Date: D)`.
fn parse_contact(contact: &str) -> Option<(String, ContactSnapshot)> {
    let (partner, info) = contact.split_once(" (Round ")?;
    let (round, date) = info.split_once(", Date: ")?;

    let partner = partner.trim();
    if partner.is_empty() {
        return None;
    }
    let round = round.trim().parse().ok()?;
    let date = parse_date(date.trim().trim_end_matches(')').trim())?;

    Some((partner.to_string(), ContactSnapshot { date, round }))
}

/// Accepts ISO dates, RFC 3339 timestamps and US-style `M/D/YYYY`.
fn parse_date(text: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    ["%Y-%m-%d", "%m/%d/%Y"]
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|at| Utc.from_utc_datetime(&at))
}
