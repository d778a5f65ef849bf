//! Query normalization for football lookups.
//!
//! Pure text processing: no I/O, deterministic, unit-testable in isolation.

use serde::{Deserialize, Serialize};

use crate::football::error::FootballError;

/// Classification of a football query, derived from the endpoint that
/// received it rather than from the text itself.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// League or competition table lookup.
    League,
    /// Fixture lookup ("chelsea vs benfica").
    Match,
    /// Player lookup ("joao pedro").
    Player,
}

/// A canonicalized query ready for candidate resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedQuery {
    /// What kind of entity the query targets.
    pub kind: QueryKind,
    /// The original input, untouched.
    pub raw: String,
    /// Cleaned tokens. One entry for league/player queries and for match
    /// queries without a recognized separator; two order-preserving team
    /// tokens when a match query contained one.
    pub tokens: Vec<String>,
}

impl NormalizedQuery {
    /// The normalized query joined back into a single search string.
    #[must_use]
    pub fn text(&self) -> String {
        self.tokens.join(" ")
    }
}

/// Match-query separators, checked longest-first so `vs.` wins over `v`.
const SEPARATORS: [&str; 5] = [" vs. ", " vs ", " v. ", " v ", " - "];

/// Canonicalize a free-text query for the given kind.
///
/// Lowercases, trims, strips punctuation and collapses whitespace. For
/// [`QueryKind::Match`] the input is first split on a separator (`vs`,
/// `v.`, `-`) into two order-preserving team tokens; without a separator
/// the whole string becomes a single token and downstream resolution
/// treats the query as ambiguous-by-construction.
///
/// # Errors
/// Returns [`FootballError::InvalidQuery`] when nothing survives cleaning.
pub fn normalize(raw: &str, kind: QueryKind) -> Result<NormalizedQuery, FootballError> {
    let lowered = raw.trim().to_lowercase();

    let tokens = if kind == QueryKind::Match {
        split_match_tokens(&lowered)
    } else {
        vec![clean_text(&lowered)]
    };

    let tokens: Vec<String> = tokens.into_iter().filter(|t| !t.is_empty()).collect();
    if tokens.is_empty() {
        return Err(FootballError::InvalidQuery(format!(
            "nothing left after normalizing {raw:?}"
        )));
    }

    Ok(NormalizedQuery {
        kind,
        raw: raw.to_string(),
        tokens,
    })
}

/// Split a lowercased match query into team tokens.
///
/// Falls back to a single token when no separator is present or when one
/// side of the separator cleans down to nothing.
fn split_match_tokens(lowered: &str) -> Vec<String> {
    for sep in SEPARATORS {
        if let Some((left, right)) = lowered.split_once(sep) {
            let left = clean_text(left);
            let right = clean_text(right);
            if !left.is_empty() && !right.is_empty() {
                return vec![left, right];
            }
        }
    }
    // Bare hyphen form like "chelsea-benfica", only when unambiguous.
    if lowered.matches('-').count() == 1 && !lowered.contains(' ') {
        if let Some((left, right)) = lowered.split_once('-') {
            let left = clean_text(left);
            let right = clean_text(right);
            if !left.is_empty() && !right.is_empty() {
                return vec![left, right];
            }
        }
    }
    vec![clean_text(lowered)]
}

/// Lowercase, strip everything that is not alphanumeric, and collapse
/// whitespace. Shared with candidate scoring so queries and site names are
/// compared in the same space.
pub(crate) fn clean_text(text: &str) -> String {
    let mapped: String = text
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();
    mapped.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_match_query_splits_on_vs() {
        let q = normalize("Chelsea vs Benfica", QueryKind::Match).unwrap();
        assert_eq!(q.tokens, vec!["chelsea", "benfica"]);
    }

    #[test]
    fn test_match_separator_variants() {
        for raw in [
            "chelsea vs benfica",
            "chelsea vs. benfica",
            "chelsea v benfica",
            "chelsea v. benfica",
            "chelsea - benfica",
            "chelsea-benfica",
        ] {
            let q = normalize(raw, QueryKind::Match).unwrap();
            assert_eq!(q.tokens, vec!["chelsea", "benfica"], "input: {raw}");
        }
    }

    #[test]
    fn test_match_tokens_preserve_order_and_are_nonempty() {
        let q = normalize("  Real Madrid VS Manchester City  ", QueryKind::Match).unwrap();
        assert_eq!(q.tokens, vec!["real madrid", "manchester city"]);
        assert!(q.tokens.iter().all(|t| !t.is_empty()));
    }

    #[test]
    fn test_match_without_separator_is_single_token() {
        let q = normalize("premier league", QueryKind::Match).unwrap();
        assert_eq!(q.tokens, vec!["premier league"]);
    }

    #[test]
    fn test_hyphenated_name_is_not_split_when_spaced() {
        // A hyphen inside a multi-word query without surrounding spaces is
        // part of a name, not a separator.
        let q = normalize("paris saint-germain", QueryKind::Match).unwrap();
        assert_eq!(q.tokens, vec!["paris saint germain"]);
    }

    #[test]
    fn test_punctuation_stripped_and_whitespace_collapsed() {
        let q = normalize("  João   Pedro! ", QueryKind::Player).unwrap();
        assert_eq!(q.tokens, vec!["joão pedro"]);
    }

    #[test]
    fn test_empty_query_rejected() {
        assert!(matches!(
            normalize("  ?!  ", QueryKind::League),
            Err(FootballError::InvalidQuery(_))
        ));
    }

    #[test]
    fn test_text_joins_tokens() {
        let q = normalize("chelsea vs benfica", QueryKind::Match).unwrap();
        assert_eq!(q.text(), "chelsea benfica");
    }
}
