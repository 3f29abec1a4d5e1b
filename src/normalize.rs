// 🔤 Name Normalizer
//
// "José  Ñandú!!" → "jose nandu"
//
// Decompose (NFD), drop combining marks, keep ASCII letters and whitespace,
// lowercase, collapse whitespace. The result is the only form names are
// ever compared in.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Normalize a name for comparison.
///
/// Empty or whitespace-only input yields an empty string, which callers must
/// treat as "no key" rather than as something that matches everything.
pub fn normalize(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return String::new();
    }

    let letters: String = trimmed
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace())
        .collect();

    letters
        .split_whitespace()
        .map(|word| word.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}
