//! Participants, groups and the canonical group identity.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Separator used when joining sorted member ids into a [`GroupKey`].
///
/// ASCII unit separator: never present in an email address or display name.
pub const GROUP_KEY_DELIMITER: char = '\u{1f}';

/// Opaque participant identifier (typically an email address).
///
/// Equality is an exact string match. No case folding or trimming is applied.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Creates a participant id from anything string-like.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl AsRef<str> for ParticipantId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for ParticipantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Canonical, order-independent identity of a group's membership.
///
/// Built by sorting member ids byte-lexicographically and joining them with
/// [`GROUP_KEY_DELIMITER`].
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    /// Computes the key for a set of members, in any order.
    pub fn from_members<P: AsRef<str>>(members: &[P]) -> Self {
        let mut sorted: Vec<&str> = members.iter().map(AsRef::as_ref).collect();
        sorted.sort_unstable();

        let mut key = String::new();
        for (i, id) in sorted.iter().enumerate() {
            if i > 0 {
                key.push(GROUP_KEY_DELIMITER);
            }
            key.push_str(id);
        }
        Self(key)
    }

    /// Wraps an already-canonical key (e.g. restored from a snapshot).
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the raw key string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Render with a visible separator for logs
        write!(f, "{}", self.0.replace(GROUP_KEY_DELIMITER, "+"))
    }
}

/// One group of a round.
///
/// Member order carries no meaning for duplicate detection (see [`GroupKey`])
/// but is preserved for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Group {
    members: Vec<ParticipantId>,
}

impl Group {
    /// Creates a group from its members, keeping their order.
    pub fn new(members: Vec<ParticipantId>) -> Self {
        Self { members }
    }

    /// Returns the members in display order.
    pub fn members(&self) -> &[ParticipantId] {
        &self.members
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// True when the group has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// True if `id` is a member.
    pub fn contains(&self, id: &ParticipantId) -> bool {
        self.members.contains(id)
    }

    /// Canonical identity of this composition.
    pub fn key(&self) -> GroupKey {
        GroupKey::from_members(&self.members)
    }

    /// Appends a member (used when folding leftovers into a group).
    pub(crate) fn push(&mut self, id: ParticipantId) {
        self.members.push(id);
    }

    /// Consumes the group and returns its members.
    pub fn into_members(self) -> Vec<ParticipantId> {
        self.members
    }

    /// Iterates members in display order.
    pub fn iter(&self) -> std::slice::Iter<'_, ParticipantId> {
        self.members.iter()
    }
}

impl From<Vec<ParticipantId>> for Group {
    fn from(members: Vec<ParticipantId>) -> Self {
        Self::new(members)
    }
}

impl<'a> IntoIterator for &'a Group {
    type Item = &'a ParticipantId;
    type IntoIter = std::slice::Iter<'a, ParticipantId>;

    fn into_iter(self) -> Self::IntoIter {
        self.members.iter()
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, member) in self.members.iter().enumerate() {
            if i > 0 {
                f.write_str(" & ")?;
            }
            write!(f, "{}", member)?;
        }
        Ok(())
    }
}

/// Convenience for building id lists in tests and callers.
pub fn participants<I, S>(ids: I) -> Vec<ParticipantId>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ids.into_iter().map(ParticipantId::new).collect()
}
