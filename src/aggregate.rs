// 🧮 Aggregator - merge several resolution runs into one list
//
// Only the student numbers of earlier runs are trusted; names are looked up
// again in the roster. First occurrence wins, output is sorted by ID.
// An unreadable source is skipped, never fatal.

use crate::config::ReconcileConfig;
use crate::roster::Roster;
use crate::sources::read_resolved_ids;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedSource {
    pub path: PathBuf,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AggregateReport {
    /// Student number → roster name (None when the roster lacks the ID), sorted by ID
    pub students: BTreeMap<String, Option<String>>,

    /// Sources read successfully
    pub sources_read: usize,

    pub skipped: Vec<SkippedSource>,
}

impl AggregateReport {
    /// Student number → display name, unknown IDs rendered as `unknown`
    pub fn named(&self, unknown: &str) -> BTreeMap<String, String> {
        self.students
            .iter()
            .map(|(id, name)| (id.clone(), name.clone().unwrap_or_else(|| unknown.to_string())))
            .collect()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} unique students from {} sources ({} skipped)",
            self.students.len(),
            self.sources_read,
            self.skipped.len()
        )
    }
}

/// Union ID lists from several runs, naming each ID from the roster.
///
/// Returns the merged mapping sorted by ID; IDs missing from the roster map to
/// `None`.
pub fn aggregate<S, I>(roster: &Roster, sources: S) -> BTreeMap<String, Option<String>>
where
    S: IntoIterator<Item = I>,
    I: IntoIterator<Item = String>,
{
    let mut students = BTreeMap::new();

    for source in sources {
        for id in source {
            // First occurrence wins; the roster decides the name either way
            students
                .entry(id)
                .or_insert_with_key(|id| roster.name_of(id).map(str::to_string));
        }
    }

    students
}

/// Merge previously written resolution CSVs.
pub fn aggregate_files(
    roster: &Roster,
    paths: &[PathBuf],
    config: &ReconcileConfig,
) -> AggregateReport {
    let mut report = AggregateReport::default();
    let mut id_lists = Vec::new();

    for path in paths {
        match read_resolved_ids(path, &config.resolved_id_column) {
            Ok(ids) => {
                info!("Read {} student numbers from {}", ids.len(), path.display());
                report.sources_read += 1;
                id_lists.push(ids);
            }
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                report.skipped.push(SkippedSource {
                    path: path.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    report.students = aggregate(roster, id_lists);
    report
}
