// 🧭 Resolution Pipeline - raw export token → student
//
// For each input, in order:
//   1. Embedded student number?  → trust it (roster name if known)
//   2. Otherwise a unique name match in the roster
//   3. Otherwise unmatched, kept verbatim
//
// Resolved records are keyed by student number. A later input that resolves
// to an ID already seen replaces that record's name/input but keeps its
// position, so output order is first-appearance order.

use crate::config::ReconcileConfig;
use crate::extract::IdExtractor;
use crate::matcher::{MatchOutcome, MatchPass, NameMatcher};
use crate::roster::Roster;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

// ============================================================================
// RESOLVED RECORD
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionMethod {
    /// Student number found in the input and in the roster
    Id,

    /// Student number found in the input but not in the roster
    IdNotInRoster,

    /// No number; unique roster name match
    Name(MatchPass),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedRecord {
    pub id: String,

    /// Roster name; None when the ID has no roster row
    pub name: Option<String>,

    /// The export token exactly as the student typed it
    pub original_input: String,

    pub method: ResolutionMethod,
}

impl ResolvedRecord {
    /// Name for display, with a sentinel for IDs the roster doesn't know
    pub fn display_name<'a>(&'a self, unknown: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(unknown)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Resolved(ResolvedRecord),
    Unmatched,
}

// ============================================================================
// RESOLUTION REPORT
// ============================================================================

#[derive(Debug, Clone, Default)]
pub struct ResolutionReport {
    records: Vec<ResolvedRecord>,
    index: HashMap<String, usize>,
    unmatched: Vec<String>,
    total_inputs: usize,
}

impl ResolutionReport {
    /// Insert or overwrite by ID (last write wins, first position kept)
    pub fn record(&mut self, record: ResolvedRecord) {
        match self.index.get(&record.id) {
            Some(&idx) => self.records[idx] = record,
            None => {
                self.index.insert(record.id.clone(), self.records.len());
                self.records.push(record);
            }
        }
    }

    pub fn add_unmatched(&mut self, raw: String) {
        self.unmatched.push(raw);
    }

    /// Resolved records in first-insertion order
    pub fn records(&self) -> &[ResolvedRecord] {
        &self.records
    }

    pub fn get(&self, id: &str) -> Option<&ResolvedRecord> {
        self.index.get(id).map(|&idx| &self.records[idx])
    }

    /// Unmatched raw inputs, verbatim, in input order
    pub fn unmatched(&self) -> &[String] {
        &self.unmatched
    }

    pub fn total_inputs(&self) -> usize {
        self.total_inputs
    }

    /// Distinct student numbers resolved
    pub fn matched_count(&self) -> usize {
        self.records.len()
    }

    pub fn unmatched_count(&self) -> usize {
        self.unmatched.len()
    }

    pub fn summary(&self) -> String {
        format!(
            "{} responses: {} students matched, {} unmatched",
            self.total_inputs,
            self.matched_count(),
            self.unmatched_count()
        )
    }
}

// ============================================================================
// RESOLVER
// ============================================================================

pub struct Resolver<'r> {
    roster: &'r Roster,
    extractor: IdExtractor,
    matcher: NameMatcher<'r>,
}

impl<'r> Resolver<'r> {
    /// Resolver with default extractor bounds and matcher passes
    pub fn new(roster: &'r Roster) -> Self {
        Resolver {
            roster,
            extractor: IdExtractor::default(),
            matcher: NameMatcher::new(roster),
        }
    }

    pub fn from_config(roster: &'r Roster, config: &ReconcileConfig) -> Self {
        Resolver {
            roster,
            extractor: IdExtractor::new(config.id_min_digits, config.id_max_digits),
            matcher: NameMatcher::new(roster).with_first_token_fallback(config.first_token_fallback),
        }
    }

    /// Resolve a single raw export token
    pub fn resolve(&self, raw: &str) -> Resolution {
        if let Some(id) = self.extractor.extract(raw) {
            let name = self.roster.name_of(id).map(str::to_string);
            let method = if name.is_some() {
                ResolutionMethod::Id
            } else {
                ResolutionMethod::IdNotInRoster
            };

            debug!("{:?} → {} by student number ({:?})", raw, id, method);
            return Resolution::Resolved(ResolvedRecord {
                id: id.to_string(),
                name,
                original_input: raw.to_string(),
                method,
            });
        }

        match self.matcher.find(raw) {
            MatchOutcome::Unique { entry, pass } => {
                debug!("{:?} → {} '{}' by name ({:?})", raw, entry.id, entry.name, pass);
                Resolution::Resolved(ResolvedRecord {
                    id: entry.id.clone(),
                    name: Some(entry.name.clone()),
                    original_input: raw.to_string(),
                    method: ResolutionMethod::Name(pass),
                })
            }
            MatchOutcome::Ambiguous { candidates } => {
                debug!("{:?} unmatched: {} roster names qualify", raw, candidates);
                Resolution::Unmatched
            }
            MatchOutcome::NoMatch => {
                debug!("{:?} unmatched: no roster name qualifies", raw);
                Resolution::Unmatched
            }
        }
    }

    /// Resolve every input, in order, into one report
    pub fn resolve_all<I, S>(&self, inputs: I) -> ResolutionReport
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = ResolutionReport::default();

        for input in inputs {
            let raw = input.as_ref();
            report.total_inputs += 1;

            match self.resolve(raw) {
                Resolution::Resolved(record) => report.record(record),
                Resolution::Unmatched => report.add_unmatched(raw.to_string()),
            }
        }

        report
    }
}

/// Resolve one token with default settings
pub fn resolve(raw: &str, roster: &Roster) -> Resolution {
    Resolver::new(roster).resolve(raw)
}

/// Resolve a batch of tokens with default settings
pub fn resolve_all<I, S>(inputs: I, roster: &Roster) -> ResolutionReport
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    Resolver::new(roster).resolve_all(inputs)
}

// ============================================================================
// TESTS
// ============================================================================
