// 🔢 Identifier Extractor
//
// Pulls a student number out of free text: "id 1234567 ok" → "1234567".
//
// Policy for digit runs: only a MAXIMAL run of ASCII digits counts, and its
// whole length must fall in [min, max]. "123456789" is a 9-digit run and is
// ignored (never truncated to its first 7 or 8 digits); scanning continues
// with the next run.

use regex::Regex;
use std::sync::LazyLock;

/// Default accepted run lengths for student numbers
pub const DEFAULT_MIN_DIGITS: usize = 7;
pub const DEFAULT_MAX_DIGITS: usize = 8;

static DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("valid digit-run regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdExtractor {
    pub min_digits: usize,
    pub max_digits: usize,
}

impl IdExtractor {
    pub fn new(min_digits: usize, max_digits: usize) -> Self {
        IdExtractor {
            min_digits,
            max_digits,
        }
    }

    /// First maximal digit run whose length is within bounds
    pub fn extract<'a>(&self, text: &'a str) -> Option<&'a str> {
        DIGIT_RUN
            .find_iter(text)
            .map(|m| m.as_str())
            .find(|run| (self.min_digits..=self.max_digits).contains(&run.len()))
    }
}

impl Default for IdExtractor {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DIGITS, DEFAULT_MAX_DIGITS)
    }
}

/// Extract a 7–8 digit student number from `text`
pub fn extract_id(text: &str) -> Option<String> {
    IdExtractor::default().extract(text).map(str::to_string)
}
