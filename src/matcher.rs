// 🔍 Roster Matcher - Name → unique roster entry
//
// Passes, cheapest first:
//   1. Substring:  normalized roster name contains the whole normalized input
//   2. First token (optional): contains the first input token
//   3. All parts:  contains every input token, any order
//
// Each pass collects the FULL candidate set and only a single candidate
// counts as a match. Two "Maria"s in the roster means "Maria" is unmatched.

use crate::normalize::normalize;
use crate::roster::{Roster, RosterEntry};
use serde::{Deserialize, Serialize};

// ============================================================================
// MATCH RESULT
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchPass {
    /// Whole normalized input found inside the roster name
    Substring,

    /// Only the first input token was needed
    FirstToken,

    /// Every input token found, in any order
    AllParts,
}

#[derive(Debug, Clone, PartialEq)]
pub enum MatchOutcome<'r> {
    /// Exactly one roster entry qualified
    Unique {
        entry: &'r RosterEntry,
        pass: MatchPass,
    },

    /// More than one entry qualified in the last pass tried
    Ambiguous { candidates: usize },

    /// Nothing qualified (or the input normalized to nothing)
    NoMatch,
}

impl<'r> MatchOutcome<'r> {
    pub fn entry(&self) -> Option<&'r RosterEntry> {
        match self {
            MatchOutcome::Unique { entry, .. } => Some(*entry),
            _ => None,
        }
    }
}

// ============================================================================
// NAME MATCHER
// ============================================================================

pub struct NameMatcher<'r> {
    roster: &'r Roster,

    /// Enable the first-token pass between substring and all-parts (default: off)
    pub first_token_fallback: bool,
}

impl<'r> NameMatcher<'r> {
    pub fn new(roster: &'r Roster) -> Self {
        NameMatcher {
            roster,
            first_token_fallback: false,
        }
    }

    pub fn with_first_token_fallback(mut self, enabled: bool) -> Self {
        self.first_token_fallback = enabled;
        self
    }

    /// Resolve a raw name to a unique roster entry
    pub fn find(&self, raw_name: &str) -> MatchOutcome<'r> {
        let needle = normalize(raw_name);
        if needle.is_empty() {
            return MatchOutcome::NoMatch;
        }

        let substring = self.candidates(|name| name.contains(needle.as_str()));
        if let [entry] = substring.as_slice() {
            return MatchOutcome::Unique {
                entry: *entry,
                pass: MatchPass::Substring,
            };
        }

        let tokens: Vec<&str> = needle.split_whitespace().collect();

        if self.first_token_fallback {
            let first = tokens[0];
            let by_first = self.candidates(|name| name.contains(first));
            if let [entry] = by_first.as_slice() {
                return MatchOutcome::Unique {
                    entry: *entry,
                    pass: MatchPass::FirstToken,
                };
            }
        }

        let all_parts = self.candidates(|name| tokens.iter().all(|t| name.contains(*t)));
        match all_parts.as_slice() {
            [] => MatchOutcome::NoMatch,
            [entry] => MatchOutcome::Unique {
                entry: *entry,
                pass: MatchPass::AllParts,
            },
            many => MatchOutcome::Ambiguous {
                candidates: many.len(),
            },
        }
    }

    fn candidates<F>(&self, predicate: F) -> Vec<&'r RosterEntry>
    where
        F: Fn(&str) -> bool,
    {
        self.roster
            .normalized_entries()
            .filter(|(_, name)| predicate(*name))
            .map(|(entry, _)| entry)
            .collect()
    }
}

/// Unique roster entry for `raw_name`, or `None` when zero or several qualify
pub fn match_by_name<'r>(raw_name: &str, roster: &'r Roster) -> Option<&'r RosterEntry> {
    NameMatcher::new(roster).find(raw_name).entry()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_roster() -> Roster {
        Roster::from_entries(vec![
            RosterEntry::new("1001001", "Maria Silva"),
            RosterEntry::new("1001002", "Maria Souza"),
            RosterEntry::new("1001003", "João Pedro Silva"),
            RosterEntry::new("1001004", "Ana Pereira"),
            RosterEntry::new("1001005", "Bruno Costa"),
        ])
    }

    #[test]
    fn test_shared_first_name_is_ambiguous() {
        let roster = sample_roster();
        let matcher = NameMatcher::new(&roster);

        assert_eq!(
            matcher.find("Maria"),
            MatchOutcome::Ambiguous { candidates: 2 }
        );
        assert!(match_by_name("Maria", &roster).is_none());
    }

    #[test]
    fn test_full_name_is_unique() {
        let roster = sample_roster();

        let entry = match_by_name("Maria Silva", &roster).unwrap();
        assert_eq!(entry.id, "1001001");
    }

    #[test]
    fn test_reordered_tokens_use_all_parts() {
        let roster = sample_roster();
        let matcher = NameMatcher::new(&roster);

        match matcher.find("Silva Joao Pedro") {
            MatchOutcome::Unique { entry, pass } => {
                assert_eq!(entry.id, "1001003");
                assert_eq!(pass, MatchPass::AllParts);
            }
            other => panic!("expected unique match, got {:?}", other),
        }
    }

    #[test]
    fn test_partial_name_substring() {
        let roster = sample_roster();
        let matcher = NameMatcher::new(&roster);

        match matcher.find("bruno c") {
            MatchOutcome::Unique { entry, pass } => {
                assert_eq!(entry.name, "Bruno Costa");
                assert_eq!(pass, MatchPass::Substring);
            }
            other => panic!("expected unique match, got {:?}", other),
        }
    }

    #[test]
    fn test_accents_and_noise_ignored() {
        let roster = sample_roster();

        let entry = match_by_name("✨ JOAO   pedro ✨", &roster).unwrap();
        assert_eq!(entry.id, "1001003");
    }

    #[test]
    fn test_empty_normalized_input_never_matches() {
        let roster = sample_roster();
        let matcher = NameMatcher::new(&roster);

        assert_eq!(matcher.find(""), MatchOutcome::NoMatch);
        assert_eq!(matcher.find("🙂🙂"), MatchOutcome::NoMatch);
        assert_eq!(matcher.find("12345"), MatchOutcome::NoMatch);
    }

    #[test]
    fn test_unknown_name() {
        let roster = sample_roster();
        assert_eq!(NameMatcher::new(&roster).find("Zacarias"), MatchOutcome::NoMatch);
    }

    #[test]
    fn test_all_parts_ambiguous() {
        // Two roster names contain "silva"; only one also contains "maria"
        let roster = sample_roster();
        let matcher = NameMatcher::new(&roster);

        assert_eq!(matcher.find("Silva"), MatchOutcome::Ambiguous { candidates: 2 });
        assert_eq!(
            matcher.find("Silva Maria").entry().map(|e| e.id.as_str()),
            Some("1001001")
        );
    }

    #[test]
    fn test_first_token_fallback_off_by_default() {
        let roster = sample_roster();

        // "ana xyz": no substring hit, and "xyz" blocks all-parts
        assert!(match_by_name("Ana Xyz", &roster).is_none());

        let matcher = NameMatcher::new(&roster).with_first_token_fallback(true);
        match matcher.find("Ana Xyz") {
            MatchOutcome::Unique { entry, pass } => {
                assert_eq!(entry.id, "1001004");
                assert_eq!(pass, MatchPass::FirstToken);
            }
            other => panic!("expected first-token match, got {:?}", other),
        }
    }

    #[test]
    fn test_first_token_fallback_still_requires_uniqueness() {
        let roster = sample_roster();
        let matcher = NameMatcher::new(&roster).with_first_token_fallback(true);

        assert!(matcher.find("Maria Xyz").entry().is_none());
    }

    #[test]
    fn test_empty_roster() {
        let roster = Roster::default();
        assert_eq!(NameMatcher::new(&roster).find("Ana"), MatchOutcome::NoMatch);
    }
}
