//! Canonical form for answers.
//!
//! Two answers are "the same place" when their normalized forms are equal.
//! The validator collaborator is always queried with the normalized form,
//! and the used-answer set only ever holds normalized forms.

/// Normalizes an answer: transliterates to ASCII (stripping diacritics),
/// lowercases, trims, and collapses internal whitespace runs to one space.
///
/// Idempotent: `normalize(&normalize(x)) == normalize(x)`, because the
/// output is already lowercase single-spaced ASCII.
///
/// ```rust
/// use atlas_protocol::normalize;
///
/// assert_eq!(normalize("  São   Paulo "), "sao paulo");
/// assert_eq!(normalize("ZÜRICH"), "zurich");
/// ```
pub fn normalize(text: &str) -> String {
    let ascii = deunicode::deunicode(text).to_lowercase();
    ascii.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Case-folds a single character. Multi-character lowercase expansions
/// keep only their first character.
pub fn fold_letter(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}
