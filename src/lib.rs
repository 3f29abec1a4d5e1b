// Roster Reconcile - Core Library
// Resolves noisy quiz-export tokens (numbers, names, typos, emoji) against a
// student roster. Used by the CLI and the integration tests.

pub mod error;
pub mod config;
pub mod logging;
pub mod normalize;      // Name normalization (accents, punctuation, case)
pub mod extract;        // Student number extraction
pub mod roster;         // Authoritative roster + ID index
pub mod matcher;        // Unique name matching
pub mod pipeline;       // Per-run resolution
pub mod aggregate;      // Cross-run merge
pub mod sources;        // CSV / spreadsheet readers
pub mod report;         // CSV / HTML writers

// Re-export commonly used types
pub use error::{SourceError, SourceResult};
pub use config::ReconcileConfig;
pub use normalize::normalize;
pub use extract::{extract_id, IdExtractor};
pub use roster::{Roster, RosterEntry};
pub use matcher::{match_by_name, MatchOutcome, MatchPass, NameMatcher};
pub use pipeline::{
    resolve, resolve_all,
    Resolution, ResolutionMethod, ResolutionReport, ResolvedRecord, Resolver,
};
pub use aggregate::{aggregate, aggregate_files, AggregateReport, SkippedSource};
pub use sources::{read_export, read_resolved_ids, read_table, TableFormat};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
