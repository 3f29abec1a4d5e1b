// 📋 Roster - Authoritative student list
//
// The roster is the name of record: every resolved ID takes its name from
// here, never from what a student typed. Loaded once per run and passed
// around as `&Roster`.

use crate::config::ReconcileConfig;
use crate::error::{SourceError, SourceResult};
use crate::normalize::normalize;
use crate::sources::read_table;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::{info, warn};

// ============================================================================
// ROSTER ENTRY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RosterEntry {
    /// Student number (7–8 digits, unique within a roster)
    pub id: String,

    /// Canonical name as written in the roster
    pub name: String,
}

impl RosterEntry {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        RosterEntry {
            id: id.into(),
            name: name.into(),
        }
    }
}

// ============================================================================
// ROSTER
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct Roster {
    entries: Vec<RosterEntry>,

    /// Normalized name per entry (same index as `entries`)
    normalized: Vec<String>,

    by_id: HashMap<String, usize>,
}

impl Roster {
    /// Build a roster; a repeated ID keeps its first row
    pub fn from_entries(entries: impl IntoIterator<Item = RosterEntry>) -> Self {
        let mut roster = Roster::default();

        for entry in entries {
            if roster.by_id.contains_key(&entry.id) {
                warn!(
                    "Duplicate roster ID {} ('{}') ignored, keeping first row",
                    entry.id, entry.name
                );
                continue;
            }

            roster.by_id.insert(entry.id.clone(), roster.entries.len());
            roster.normalized.push(normalize(&entry.name));
            roster.entries.push(entry);
        }

        roster
    }

    /// Load from a CSV or spreadsheet whose first row names the columns.
    ///
    /// The ID and name columns are located by header and must both exist.
    pub fn load(path: &Path, config: &ReconcileConfig) -> SourceResult<Self> {
        let mut rows = read_table(path)?.into_iter();

        let header = rows.next().unwrap_or_default();
        let id_col = find_column(&header, &config.id_column, path)?;
        let name_col = find_column(&header, &config.name_column, path)?;

        let entries = rows.filter_map(|row| {
            let id = row.get(id_col).cloned().unwrap_or_default();
            if id.is_empty() {
                return None;
            }
            let name = row.get(name_col).cloned().unwrap_or_default();
            Some(RosterEntry::new(id, name))
        });

        let roster = Roster::from_entries(entries);
        info!("Loaded roster of {} students from {}", roster.len(), path.display());

        Ok(roster)
    }

    /// Exact lookup by student number
    pub fn find_by_id(&self, id: &str) -> Option<&RosterEntry> {
        self.by_id.get(id).map(|&idx| &self.entries[idx])
    }

    /// Canonical name for an ID, if the roster has it
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.find_by_id(id).map(|entry| entry.name.as_str())
    }

    /// Entries paired with their normalized names, in roster order
    pub fn normalized_entries(&self) -> impl Iterator<Item = (&RosterEntry, &str)> {
        self.entries
            .iter()
            .zip(self.normalized.iter().map(String::as_str))
    }

    pub fn entries(&self) -> &[RosterEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn find_column(header: &[String], column: &str, path: &Path) -> SourceResult<usize> {
    header
        .iter()
        .position(|h| h == column)
        .ok_or_else(|| SourceError::MissingColumn {
            column: column.to_string(),
            path: path.to_path_buf(),
        })
}

// ============================================================================
// TESTS
// ============================================================================
