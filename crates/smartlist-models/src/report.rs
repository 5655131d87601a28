use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether a roster line named the catalog item exactly.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RosterMatch {
    Exact,
    Differs,
}

/// One resolved roster line.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterEntry {
    /// Trimmed input line
    pub line: String,
    /// Catalog `Title (Year)`
    pub canonical: String,
    pub outcome: RosterMatch,
}

impl RosterEntry {
    pub fn new(line: impl Into<String>, canonical: impl Into<String>) -> Self {
        let line = line.into();
        let canonical = canonical.into();
        let outcome = if line == canonical {
            RosterMatch::Exact
        } else {
            RosterMatch::Differs
        };
        Self { line, canonical, outcome }
    }
}

impl fmt::Display for RosterEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self.outcome {
            RosterMatch::Exact => "==",
            RosterMatch::Differs => "!=",
        };
        write!(f, "{} {} {}", self.line, op, self.canonical)
    }
}

/// Diagnostics from the last manual-roster resolution.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RosterReport {
    pub entries: Vec<RosterEntry>,
}

impl RosterReport {
    pub fn push(&mut self, entry: RosterEntry) {
        self.entries.push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn mismatches(&self) -> impl Iterator<Item = &RosterEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.outcome == RosterMatch::Differs)
    }

    /// One diagnostic line per entry
    pub fn lines(&self) -> Vec<String> {
        self.entries.iter().map(|entry| entry.to_string()).collect()
    }
}

impl fmt::Display for RosterReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}
