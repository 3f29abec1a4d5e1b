// ⚙️ Run Configuration
// Every knob has a default that reproduces the quiz-export layout,
// so a config file only needs the fields that differ.

use crate::error::{SourceError, SourceResult};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Leading export rows to skip (sheet header + quiz metadata)
    pub skip_rows: usize,

    /// Export column holding the raw student tokens (0 = column A)
    pub input_column: usize,

    /// Roster header for the student ID
    pub id_column: String,

    /// Roster header for the student name
    pub name_column: String,

    /// Header of the ID column in previously written reports (merge sources)
    pub resolved_id_column: String,

    /// Name rendered for an ID that has no roster row
    pub unknown_name: String,

    /// Shortest digit run accepted as an ID
    pub id_min_digits: usize,

    /// Longest digit run accepted as an ID
    pub id_max_digits: usize,

    /// Try the first input token alone before the all-parts pass
    pub first_token_fallback: bool,

    /// Emit an HTML report next to every CSV
    pub write_html: bool,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        ReconcileConfig {
            skip_rows: 6,
            input_column: 0,
            id_column: "ID".to_string(),
            name_column: "Nome".to_string(),
            resolved_id_column: "Student Number".to_string(),
            unknown_name: "Unknown".to_string(),
            id_min_digits: 7,
            id_max_digits: 8,
            first_token_fallback: false,
            write_html: true,
        }
    }
}

impl ReconcileConfig {
    /// Load a JSON config file; missing fields fall back to defaults
    pub fn from_json_file(path: &Path) -> SourceResult<Self> {
        if !path.exists() {
            return Err(SourceError::FileNotFound(path.to_path_buf()));
        }

        let text = std::fs::read_to_string(path)?;
        let config: ReconcileConfig = serde_json::from_str(&text)
            .map_err(|e| SourceError::Config(format!("{}: {}", path.display(), e)))?;

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> SourceResult<()> {
        if self.id_min_digits == 0 {
            return Err(SourceError::Config(
                "id_min_digits must be at least 1".to_string(),
            ));
        }

        if self.id_min_digits > self.id_max_digits {
            return Err(SourceError::Config(format!(
                "id_min_digits ({}) is greater than id_max_digits ({})",
                self.id_min_digits, self.id_max_digits
            )));
        }

        if self.id_column.trim().is_empty() || self.name_column.trim().is_empty() {
            return Err(SourceError::Config(
                "roster column names must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
