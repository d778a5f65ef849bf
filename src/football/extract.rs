//! Structured extraction from resolved entity pages.
//!
//! Every field is read through a primary selector plus fallbacks, since the
//! site markup is not stable. Non-essential fields degrade to `None`;
//! essential fields abort the extraction with the field name, because a
//! silently incomplete record is worse than an explicit failure for the
//! consumers downstream (prompt construction, JSON snapshots).

use crate::football::config::FootballConfig;
use crate::football::error::FootballError;
use crate::football::query::QueryKind;
use crate::football::session::{DomNode, ScrapeSession, navigate_with_retry};
use crate::football::types::{
    Candidate, ExtractedRecord, LeagueTable, Lineups, MatchEvent, MatchRecord, PlayerRecord,
    SeasonStat, TeamRow,
};

const COMPETITION_SELECTORS: [&str; 3] = ["h1", "[class*='LeagueHeader'] h1", ".league-name"];
const TABLE_ROW_SELECTORS: [&str; 3] = [
    "table tbody tr",
    "[class*='TableRow']",
    ".league-table tr",
];
const MATCH_TEAM_SELECTORS: [&str; 3] = [
    "[class*='MatchHeader'] a[href*='/teams/']",
    "[class*='TeamName']",
    ".team-name",
];
const MATCH_SCORE_SELECTORS: [&str; 3] = [
    "[class*='MatchScore']",
    "[class*='ScoreText']",
    ".match-score",
];
const MATCH_STATUS_SELECTORS: [&str; 2] = ["[class*='MatchStatus']", ".match-status"];
const MATCH_KICKOFF_SELECTORS: [&str; 2] = ["[class*='MatchHeader'] time", "time"];
const MATCH_COMPETITION_SELECTORS: [&str; 2] = [
    "[class*='MatchHeader'] a[href*='/leagues/']",
    ".competition-name",
];
const MATCH_EVENT_SELECTORS: [&str; 2] = ["[class*='EventItem']", ".match-event"];
const LINEUP_HOME_SELECTORS: [&str; 2] = ["[class*='Lineup'] [class*='home'] li", ".lineup-home li"];
const LINEUP_AWAY_SELECTORS: [&str; 2] = ["[class*='Lineup'] [class*='away'] li", ".lineup-away li"];
const PLAYER_NAME_SELECTORS: [&str; 2] = ["[class*='PlayerName']", "h1"];
const PLAYER_TEAM_SELECTORS: [&str; 2] = ["[class*='PlayerTeam'] a", "a[href*='/teams/']"];
const PLAYER_POSITION_SELECTORS: [&str; 2] = ["[class*='PlayerPosition']", ".player-position"];
const PLAYER_NATIONALITY_SELECTORS: [&str; 2] = ["[class*='CountryName']", ".player-nationality"];
const PLAYER_STAT_SELECTORS: [&str; 2] = ["[class*='StatItem']", ".player-stat"];

/// Extract a record of the given kind from the candidate's page.
///
/// # Errors
/// [`FootballError::MissingField`] when an essential field is absent after
/// all fallbacks; [`FootballError::Navigation`] when the page will not load.
pub async fn extract(
    session: &dyn ScrapeSession,
    candidate: &Candidate,
    kind: QueryKind,
    config: &FootballConfig,
) -> Result<ExtractedRecord, FootballError> {
    navigate_with_retry(session, &candidate.url, config).await?;

    match kind {
        QueryKind::League => extract_league(session).await.map(ExtractedRecord::League),
        QueryKind::Match => extract_match(session).await.map(ExtractedRecord::Match),
        QueryKind::Player => extract_player(session).await.map(ExtractedRecord::Player),
    }
}

/// First non-empty text among the selector fallbacks.
async fn first_text(
    session: &dyn ScrapeSession,
    selectors: &[&str],
) -> Result<Option<String>, FootballError> {
    for selector in selectors {
        if let Some(text) = session.query_text(selector).await? {
            let text = text.trim().to_string();
            if !text.is_empty() {
                return Ok(Some(text));
            }
        }
    }
    Ok(None)
}

/// Like [`first_text`] but the field is essential.
async fn essential_text(
    session: &dyn ScrapeSession,
    selectors: &[&str],
    field: &'static str,
) -> Result<String, FootballError> {
    first_text(session, selectors)
        .await?
        .ok_or(FootballError::MissingField { field })
}

/// First non-empty node list among the selector fallbacks.
async fn first_nodes(
    session: &dyn ScrapeSession,
    selectors: &[&str],
) -> Result<Vec<DomNode>, FootballError> {
    for selector in selectors {
        let nodes = session.query_nodes(selector).await?;
        if !nodes.is_empty() {
            return Ok(nodes);
        }
    }
    Ok(Vec::new())
}

async fn extract_league(session: &dyn ScrapeSession) -> Result<LeagueTable, FootballError> {
    let competition = first_text(session, &COMPETITION_SELECTORS).await?;

    let row_nodes = first_nodes(session, &TABLE_ROW_SELECTORS).await?;
    if row_nodes.is_empty() {
        return Err(FootballError::MissingField {
            field: "league table rows",
        });
    }

    let rows: Vec<TeamRow> = row_nodes
        .iter()
        .filter_map(|node| parse_team_row(&node.text))
        .collect();
    if rows.is_empty() {
        // Rows matched but none carried a readable team name.
        return Err(FootballError::MissingField { field: "team name" });
    }

    Ok(LeagueTable { competition, rows })
}

/// Parse one rendered table row.
///
/// Rendered rows look like `"1 Arsenal 38 28 6 4 90 WWDWW"` with the exact
/// numeric columns varying by competition, so the shape is inferred: an
/// optional leading position, the team name as the run of non-numeric
/// tokens, then numeric columns read as played/won/drawn/lost with points
/// taken from the last number, plus an optional W/D/L form string.
fn parse_team_row(text: &str) -> Option<TeamRow> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return None;
    }

    let mut idx = 0;
    let position = parse_count(tokens[0]);
    if position.is_some() {
        idx = 1;
    }

    let mut name_parts = Vec::new();
    while idx < tokens.len() && parse_count(tokens[idx]).is_none() && !is_form(tokens[idx]) {
        name_parts.push(tokens[idx]);
        idx += 1;
    }
    if name_parts.is_empty() {
        return None;
    }
    let name = name_parts.join(" ");

    let mut numbers = Vec::new();
    let mut form = None;
    for token in &tokens[idx..] {
        if let Some(n) = parse_count(token) {
            numbers.push(n);
        } else if is_form(token) {
            form = Some((*token).to_string());
        }
    }

    let points = if numbers.len() >= 2 {
        numbers.last().copied()
    } else {
        None
    };

    Some(TeamRow {
        position,
        name,
        played: numbers.first().copied(),
        won: numbers.get(1).copied(),
        drawn: numbers.get(2).copied(),
        lost: numbers.get(3).copied(),
        points,
        form,
    })
}

/// Parse a table count, tolerating a trailing dot ("1.").
fn parse_count(token: &str) -> Option<u32> {
    token.trim_end_matches('.').parse().ok()
}

/// A form string is a short run of W/D/L letters.
fn is_form(token: &str) -> bool {
    token.len() >= 2 && token.chars().all(|c| matches!(c, 'W' | 'D' | 'L'))
}

async fn extract_match(session: &dyn ScrapeSession) -> Result<MatchRecord, FootballError> {
    let teams = first_nodes(session, &MATCH_TEAM_SELECTORS).await?;
    if teams.len() < 2 {
        return Err(FootballError::MissingField { field: "team names" });
    }
    let home_team = teams[0].text.clone();
    let away_team = teams[1].text.clone();

    let score = essential_text(session, &MATCH_SCORE_SELECTORS, "score").await?;

    let status = first_text(session, &MATCH_STATUS_SELECTORS).await?;
    let kickoff = first_text(session, &MATCH_KICKOFF_SELECTORS).await?;
    let competition = first_text(session, &MATCH_COMPETITION_SELECTORS).await?;

    let events = first_nodes(session, &MATCH_EVENT_SELECTORS)
        .await?
        .iter()
        .map(|node| parse_event(&node.text))
        .collect();

    let home_lineup = first_nodes(session, &LINEUP_HOME_SELECTORS).await?;
    let away_lineup = first_nodes(session, &LINEUP_AWAY_SELECTORS).await?;
    let lineups = if home_lineup.is_empty() && away_lineup.is_empty() {
        None
    } else {
        Some(Lineups {
            home: home_lineup.into_iter().map(|n| n.text).collect(),
            away: away_lineup.into_iter().map(|n| n.text).collect(),
        })
    };

    Ok(MatchRecord {
        home_team,
        away_team,
        score,
        competition,
        kickoff,
        status,
        events,
        lineups,
    })
}

/// Split "45+2' Goal - Enzo Fernandez" into minute and description.
fn parse_event(text: &str) -> MatchEvent {
    let mut parts = text.splitn(2, char::is_whitespace);
    let first = parts.next().unwrap_or_default();
    let rest = parts.next().unwrap_or_default().trim();

    let looks_like_minute =
        first.ends_with('\'') && first.chars().next().is_some_and(|c| c.is_ascii_digit());
    if looks_like_minute && !rest.is_empty() {
        MatchEvent {
            minute: Some(first.to_string()),
            description: rest.to_string(),
        }
    } else {
        MatchEvent {
            minute: None,
            description: text.trim().to_string(),
        }
    }
}

async fn extract_player(session: &dyn ScrapeSession) -> Result<PlayerRecord, FootballError> {
    let name = essential_text(session, &PLAYER_NAME_SELECTORS, "player name").await?;

    let team = first_text(session, &PLAYER_TEAM_SELECTORS).await?;
    let position = first_text(session, &PLAYER_POSITION_SELECTORS).await?;
    let nationality = first_text(session, &PLAYER_NATIONALITY_SELECTORS).await?;

    let stats = first_nodes(session, &PLAYER_STAT_SELECTORS)
        .await?
        .iter()
        .filter_map(|node| parse_stat(&node.text))
        .collect();

    Ok(PlayerRecord {
        name,
        team,
        position,
        nationality,
        stats,
    })
}

/// Split "Goals 12" into label and value; the value is the last token.
fn parse_stat(text: &str) -> Option<SeasonStat> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.len() < 2 {
        return None;
    }
    let (value, label) = tokens.split_last()?;
    Some(SeasonStat {
        label: label.join(" "),
        value: (*value).to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::football::session::fake::{FakePage, FakeSession};

    fn candidate(url: &str) -> Candidate {
        Candidate {
            name: "Test".to_string(),
            url: url.to_string(),
            entity_id: None,
            score: 1.0,
        }
    }

    fn text_nodes(texts: &[&str]) -> Vec<DomNode> {
        texts
            .iter()
            .map(|t| DomNode {
                text: (*t).to_string(),
                href: None,
            })
            .collect()
    }

    #[test]
    fn test_parse_team_row_full() {
        let row = parse_team_row("1 Arsenal 38 28 6 4 90 WWDWW").unwrap();
        assert_eq!(row.position, Some(1));
        assert_eq!(row.name, "Arsenal");
        assert_eq!(row.played, Some(38));
        assert_eq!(row.won, Some(28));
        assert_eq!(row.drawn, Some(6));
        assert_eq!(row.lost, Some(4));
        assert_eq!(row.points, Some(90));
        assert_eq!(row.form.as_deref(), Some("WWDWW"));
    }

    #[test]
    fn test_parse_team_row_multiword_name_without_stats() {
        let row = parse_team_row("2 Manchester City").unwrap();
        assert_eq!(row.name, "Manchester City");
        assert_eq!(row.played, None);
        assert_eq!(row.points, None);
    }

    #[test]
    fn test_parse_team_row_rejects_nameless_row() {
        assert!(parse_team_row("1 2 3 4").is_none());
        assert!(parse_team_row("").is_none());
    }

    #[test]
    fn test_parse_event_with_minute() {
        let event = parse_event("45+2' Goal - Enzo Fernandez");
        assert_eq!(event.minute.as_deref(), Some("45+2'"));
        assert_eq!(event.description, "Goal - Enzo Fernandez");
    }

    #[test]
    fn test_parse_event_without_minute() {
        let event = parse_event("Kickoff delayed");
        assert_eq!(event.minute, None);
        assert_eq!(event.description, "Kickoff delayed");
    }

    #[tokio::test]
    async fn test_extract_match_happy_path() {
        let session = FakeSession::new();
        let mut page = FakePage::default();
        page.nodes.insert(
            MATCH_TEAM_SELECTORS[0].to_string(),
            text_nodes(&["Chelsea", "Benfica"]),
        );
        page.texts
            .insert(MATCH_SCORE_SELECTORS[0].to_string(), "2 - 1".to_string());
        page.texts
            .insert(MATCH_STATUS_SELECTORS[0].to_string(), "FT".to_string());
        session.insert_page("https://site/matches/chelsea-vs-benfica", page);

        let record = extract(
            &session,
            &candidate("https://site/matches/chelsea-vs-benfica"),
            QueryKind::Match,
            &FootballConfig::default(),
        )
        .await
        .unwrap();

        match record {
            ExtractedRecord::Match(m) => {
                assert_eq!(m.home_team, "Chelsea");
                assert_eq!(m.away_team, "Benfica");
                assert_eq!(m.score, "2 - 1");
                assert_eq!(m.status.as_deref(), Some("FT"));
                // Missing non-essential fields degrade to absent.
                assert_eq!(m.competition, None);
                assert!(m.events.is_empty());
                assert!(m.lineups.is_none());
            }
            other => panic!("expected match record, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_extract_match_missing_score_is_essential() {
        let session = FakeSession::new();
        let mut page = FakePage::default();
        page.nodes.insert(
            MATCH_TEAM_SELECTORS[0].to_string(),
            text_nodes(&["Chelsea", "Benfica"]),
        );
        session.insert_page("https://site/m", page);

        let err = extract(
            &session,
            &candidate("https://site/m"),
            QueryKind::Match,
            &FootballConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, FootballError::MissingField { field: "score" }));
    }

    #[tokio::test]
    async fn test_extract_match_score_found_via_fallback_selector() {
        let session = FakeSession::new();
        let mut page = FakePage::default();
        page.nodes.insert(
            MATCH_TEAM_SELECTORS[1].to_string(),
            text_nodes(&["Chelsea", "Benfica"]),
        );
        page.texts
            .insert(MATCH_SCORE_SELECTORS[2].to_string(), "0 - 0".to_string());
        session.insert_page("https://site/m", page);

        let record = extract(
            &session,
            &candidate("https://site/m"),
            QueryKind::Match,
            &FootballConfig::default(),
        )
        .await
        .unwrap();
        match record {
            ExtractedRecord::Match(m) => assert_eq!(m.score, "0 - 0"),
            other => panic!("expected match record, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_extract_league_rows() {
        let session = FakeSession::new();
        let mut page = FakePage::default();
        page.texts
            .insert("h1".to_string(), "Premier League".to_string());
        page.nodes.insert(
            TABLE_ROW_SELECTORS[0].to_string(),
            text_nodes(&[
                "1 Arsenal 38 28 6 4 90 WWDWW",
                "2 Manchester City 38 27 7 4 88 WWWDW",
            ]),
        );
        session.insert_page("https://site/leagues/47", page);

        let record = extract(
            &session,
            &candidate("https://site/leagues/47"),
            QueryKind::League,
            &FootballConfig::default(),
        )
        .await
        .unwrap();
        match record {
            ExtractedRecord::League(table) => {
                assert_eq!(table.competition.as_deref(), Some("Premier League"));
                assert_eq!(table.rows.len(), 2);
                assert_eq!(table.rows[1].name, "Manchester City");
                assert_eq!(table.rows[1].points, Some(88));
            }
            other => panic!("expected league record, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_extract_league_without_rows_fails() {
        let session = FakeSession::new();
        session.insert_page("https://site/leagues/47", FakePage::default());

        let err = extract(
            &session,
            &candidate("https://site/leagues/47"),
            QueryKind::League,
            &FootballConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            FootballError::MissingField {
                field: "league table rows"
            }
        ));
    }

    #[tokio::test]
    async fn test_extract_player_with_optional_gaps() {
        let session = FakeSession::new();
        let mut page = FakePage::default();
        page.texts.insert(
            PLAYER_NAME_SELECTORS[0].to_string(),
            "Joao Pedro".to_string(),
        );
        page.nodes.insert(
            PLAYER_STAT_SELECTORS[0].to_string(),
            text_nodes(&["Goals 12", "Assists 4", "Rating 7.43"]),
        );
        session.insert_page("https://site/players/1021382", page);

        let record = extract(
            &session,
            &candidate("https://site/players/1021382"),
            QueryKind::Player,
            &FootballConfig::default(),
        )
        .await
        .unwrap();
        match record {
            ExtractedRecord::Player(p) => {
                assert_eq!(p.name, "Joao Pedro");
                assert_eq!(p.team, None);
                assert_eq!(p.nationality, None);
                assert_eq!(p.stats.len(), 3);
                assert_eq!(
                    p.stats[0],
                    SeasonStat {
                        label: "Goals".to_string(),
                        value: "12".to_string()
                    }
                );
            }
            other => panic!("expected player record, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_extract_player_missing_name_is_essential() {
        let session = FakeSession::new();
        session.insert_page("https://site/players/1", FakePage::default());

        let err = extract(
            &session,
            &candidate("https://site/players/1"),
            QueryKind::Player,
            &FootballConfig::default(),
        )
        .await
        .unwrap_err();
        assert!(matches!(
            err,
            FootballError::MissingField {
                field: "player name"
            }
        ));
    }
}
