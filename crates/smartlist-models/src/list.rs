use crate::filter::FilterSet;
use crate::ids::{CatalogId, ListId};
use crate::media::ListKind;
use crate::report::RosterReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Processing state of a list, persisted so it doubles as a per-list lease.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ScanState {
    /// Idle, eligible for triggering
    #[default]
    None,
    /// Trigger accepted, waiting for a worker
    Scheduled,
    /// A worker is resolving and reconciling the list
    Updating,
}

impl ScanState {
    pub fn is_idle(&self) -> bool {
        matches!(self, ScanState::None)
    }
}

impl fmt::Display for ScanState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ScanState::None => "idle",
            ScanState::Scheduled => "scheduled",
            ScanState::Updating => "updating",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Owner {
    pub username: String,
    /// Donor accounts: reverse filters and the priority queue
    #[serde(default)]
    pub is_privileged: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListDefinition {
    pub id: ListId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owner: Owner,
    pub kind: ListKind,
    #[serde(default)]
    pub scan_state: ScanState,
    /// `false` pauses the list until an operator re-enables it
    #[serde(default = "default_true")]
    pub process: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_processed: Option<DateTime<Utc>>,
    #[serde(default)]
    pub filters: FilterSet,
    /// Only honored for privileged owners
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reverse_filters: Option<FilterSet>,
    /// Manual roster, one `Title (Year)` per line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roster_report: Option<RosterReport>,
    /// Items believed to be in the upstream list; the reconciliation baseline
    #[serde(default)]
    pub tracked: BTreeSet<CatalogId>,
}

fn default_true() -> bool {
    true
}

impl ListDefinition {
    pub fn new(id: impl Into<ListId>, name: impl Into<String>, kind: ListKind, owner: Owner) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            owner,
            kind,
            scan_state: ScanState::None,
            process: true,
            last_processed: None,
            filters: FilterSet::default(),
            reverse_filters: None,
            roster: None,
            roster_report: None,
            tracked: BTreeSet::new(),
        }
    }

    /// Placeholder carrying only the id, for deleting a record that could not be loaded.
    pub fn stub(id: ListId) -> Self {
        Self::new(id, String::new(), ListKind::Movie, Owner::default())
    }

    /// Manual mode is active when the roster has any non-blank content.
    pub fn manual_roster(&self) -> Option<&str> {
        self.roster
            .as_deref()
            .filter(|roster| !roster.trim().is_empty())
    }

    /// Reverse filters in effect for this list, if any
    pub fn effective_reverse_filters(&self) -> Option<&FilterSet> {
        if !self.owner.is_privileged {
            return None;
        }
        self.reverse_filters
            .as_ref()
            .filter(|filters| !filters.is_unconstrained())
    }
}
