//! Candidate resolution: find the entity a free-text query refers to.
//!
//! Navigates the site search page, scores every listed entity against the
//! normalized query and selects the best match only when it clears the
//! acceptance threshold with a clear lead over the runner-up. A close
//! runner-up is surfaced as an ambiguity instead of a silent guess.

use std::sync::OnceLock;

use regex::Regex;
use url::Url;

use crate::football::config::FootballConfig;
use crate::football::error::FootballError;
use crate::football::query::{NormalizedQuery, QueryKind, clean_text};
use crate::football::session::{DomNode, ScrapeSession, navigate_with_retry};
use crate::football::types::Candidate;

/// Selectors for search results per kind, primary first. The class-fragment
/// selectors track the site's styled-component markup; the href filters
/// survive class-name churn.
const fn result_selectors(kind: QueryKind) -> &'static [&'static str] {
    match kind {
        QueryKind::League => &[
            "a[href*='/leagues/']",
            "a[href*='/league/']",
        ],
        QueryKind::Match => &[
            "div[class*='MatchSearchItem'] a",
            "a[href*='/matches/']",
            "a[href*='/match/']",
        ],
        QueryKind::Player => &[
            "a[href*='/players/']",
            "a[href*='/player/']",
        ],
    }
}

/// Search page URL for a normalized query.
pub(crate) fn search_url(base_url: &str, query: &NormalizedQuery) -> String {
    format!(
        "{}/search?q={}",
        base_url.trim_end_matches('/'),
        urlencoding::encode(&query.text())
    )
}

/// Resolve a normalized query to a single candidate inside `session`.
///
/// # Errors
/// - [`FootballError::NoMatch`] when nothing clears the threshold.
/// - [`FootballError::Ambiguous`] when the top two are within the margin.
/// - [`FootballError::Navigation`] when the search page cannot be loaded.
pub async fn resolve(
    session: &dyn ScrapeSession,
    query: &NormalizedQuery,
    config: &FootballConfig,
) -> Result<Candidate, FootballError> {
    navigate_with_retry(session, &search_url(&config.base_url, query), config).await?;

    let listed = collect_listed(session, query.kind, &config.base_url).await?;
    if listed.is_empty() {
        return Err(FootballError::NoMatch {
            query: query.text(),
        });
    }
    tracing::debug!("{} search results for {:?}", listed.len(), query.text());

    let scored = score_candidates(query, &listed, config);
    let best = select(scored, query, config)?;

    tracing::info!(
        "resolved {:?} -> {} (score {:.3})",
        query.raw,
        best.name,
        best.score
    );
    Ok(best)
}

/// Pull every listed entity name and URL off the loaded search page,
/// walking the selector fallbacks until one yields results.
async fn collect_listed(
    session: &dyn ScrapeSession,
    kind: QueryKind,
    base_url: &str,
) -> Result<Vec<DomNode>, FootballError> {
    let mut nodes = Vec::new();
    for selector in result_selectors(kind) {
        nodes = session.query_nodes(selector).await?;
        if !nodes.is_empty() {
            break;
        }
    }

    let base = Url::parse(base_url).ok();
    let mut seen = std::collections::HashSet::new();
    let mut listed = Vec::new();
    for node in nodes {
        if node.text.is_empty() {
            continue;
        }
        let href = node.href.as_deref().map(|h| absolutize(base.as_ref(), h));
        let key = href.clone().unwrap_or_else(|| node.text.clone());
        if seen.insert(key) {
            listed.push(DomNode {
                text: node.text,
                href,
            });
        }
    }
    Ok(listed)
}

/// Resolve a possibly relative href against the site base.
fn absolutize(base: Option<&Url>, href: &str) -> String {
    if href.starts_with("http") {
        return href.to_string();
    }
    base.and_then(|b| b.join(href).ok())
        .map_or_else(|| href.to_string(), |u| u.to_string())
}

/// Score every listed entity against the query. Deterministic: sorted by
/// score descending, ties broken by name.
pub(crate) fn score_candidates(
    query: &NormalizedQuery,
    listed: &[DomNode],
    config: &FootballConfig,
) -> Vec<Candidate> {
    let mut candidates: Vec<Candidate> = listed
        .iter()
        .map(|node| {
            let score = if query.kind == QueryKind::Match && query.tokens.len() == 2 {
                fixture_score(&query.tokens, &node.text, config.accept_threshold)
            } else {
                similarity(&query.text(), &node.text)
            };
            let url = node.href.clone().unwrap_or_default();
            Candidate {
                entity_id: extract_entity_id(&url),
                name: node.text.clone(),
                url,
                score,
            }
        })
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.name.cmp(&b.name))
    });
    candidates
}

/// Apply the threshold and margin policy to a scored, sorted list.
fn select(
    candidates: Vec<Candidate>,
    query: &NormalizedQuery,
    config: &FootballConfig,
) -> Result<Candidate, FootballError> {
    let mut iter = candidates.into_iter();
    let Some(best) = iter.next() else {
        return Err(FootballError::NoMatch {
            query: query.text(),
        });
    };

    if best.score < config.accept_threshold {
        return Err(FootballError::NoMatch {
            query: query.text(),
        });
    }

    if let Some(second) = iter.next() {
        if best.score - second.score < config.ambiguity_margin {
            return Err(FootballError::Ambiguous {
                candidates: vec![best.name, second.name],
            });
        }
    }

    Ok(best)
}

/// Similarity of two names in [0, 1]: Jaro-Winkler on the cleaned strings
/// blended with the fraction of query tokens present in the candidate.
pub(crate) fn similarity(query: &str, name: &str) -> f64 {
    let q = clean_text(query);
    let n = clean_text(name);
    if q.is_empty() || n.is_empty() {
        return 0.0;
    }
    let jw = strsim::jaro_winkler(&q, &n);
    (jw + token_overlap(&q, &n)) / 2.0
}

/// Fraction of `query` tokens that appear verbatim among `name` tokens.
fn token_overlap(query: &str, name: &str) -> f64 {
    let name_tokens: Vec<&str> = name.split_whitespace().collect();
    let query_tokens: Vec<&str> = query.split_whitespace().collect();
    if query_tokens.is_empty() {
        return 0.0;
    }
    let hits = query_tokens
        .iter()
        .filter(|t| name_tokens.contains(t))
        .count();
    hits as f64 / query_tokens.len() as f64
}

/// Score a fixture candidate against a two-token match query.
///
/// Both team tokens must independently match distinct fixture participants,
/// otherwise the candidate scores zero. This stops a fixture that mentions
/// only one of the two teams from winning.
pub(crate) fn fixture_score(tokens: &[String], fixture_name: &str, part_threshold: f64) -> f64 {
    let Some((home, away)) = split_fixture(fixture_name) else {
        return 0.0;
    };

    let straight = (
        similarity(&tokens[0], &home),
        similarity(&tokens[1], &away),
    );
    let crossed = (
        similarity(&tokens[0], &away),
        similarity(&tokens[1], &home),
    );

    let qualify = |pair: (f64, f64)| {
        if pair.0 >= part_threshold && pair.1 >= part_threshold {
            (pair.0 + pair.1) / 2.0
        } else {
            0.0
        }
    };

    qualify(straight).max(qualify(crossed))
}

/// Split a fixture display name into its two participants.
fn split_fixture(name: &str) -> Option<(String, String)> {
    for sep in [" vs ", " vs. ", " v ", " - ", " – ", " — "] {
        if let Some((home, away)) = name.split_once(sep) {
            let home = home.trim();
            let away = away.trim();
            if !home.is_empty() && !away.is_empty() {
                return Some((home.to_string(), away.to_string()));
            }
        }
    }
    None
}

/// Patterns for the numeric entity id embedded in site URLs: a fragment
/// (`#4813427`), a query parameter, a players path segment, or a bare
/// numeric segment of conservative length.
fn id_patterns() -> &'static [Regex] {
    static PATTERNS: OnceLock<Vec<Regex>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        [
            r"#(\d+)",
            r"(?:matchId|id)=(\d+)",
            r"/players/(\d+)",
            r"/(\d{5,8})(?:$|[#/?:\-])",
        ]
        .iter()
        .filter_map(|p| Regex::new(p).ok())
        .collect()
    })
}

/// Try each id pattern in order against a URL, hash or page source.
pub(crate) fn extract_entity_id(text: &str) -> Option<String> {
    if text.is_empty() {
        return None;
    }
    id_patterns()
        .iter()
        .find_map(|re| re.captures(text).and_then(|c| c.get(1)))
        .map(|m| m.as_str().to_string())
}
