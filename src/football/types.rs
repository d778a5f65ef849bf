//! Records produced by the football page extractor.

use serde::{Deserialize, Serialize};

/// A resolver-proposed entity with its similarity against the query.
///
/// Candidates are ephemeral: produced from pages loaded inside the current
/// session and discarded at the end of the request, never cached.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candidate {
    /// Display name as listed on the source site.
    pub name: String,
    /// Absolute URL of the entity page.
    pub url: String,
    /// Numeric entity id parsed from the URL or page, when present.
    pub entity_id: Option<String>,
    /// Similarity score against the normalized query, in [0, 1].
    pub score: f64,
}

/// Structured data extracted from an entity page, keyed by query kind.
///
/// Each variant has a disjoint field set and disjoint essential-field rules;
/// see the extractor for which fields abort the pipeline when missing.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExtractedRecord {
    /// Ordered league standings.
    League(LeagueTable),
    /// A single fixture.
    Match(MatchRecord),
    /// Player identity and season statistics.
    Player(PlayerRecord),
}

/// A league table: competition name plus ordered team rows.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LeagueTable {
    /// Competition display name, when the header could be read.
    pub competition: Option<String>,
    /// Rows in table order.
    pub rows: Vec<TeamRow>,
}

/// One row of a league table. Only the team name is essential; every
/// numeric column degrades to `None` when the markup drifts.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRow {
    /// Table position.
    pub position: Option<u32>,
    /// Team name.
    pub name: String,
    /// Matches played.
    pub played: Option<u32>,
    /// Wins.
    pub won: Option<u32>,
    /// Draws.
    pub drawn: Option<u32>,
    /// Losses.
    pub lost: Option<u32>,
    /// Points.
    pub points: Option<u32>,
    /// Recent form string such as "WWDLW".
    pub form: Option<String>,
}

/// A fixture with its score and optional context.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Home team name.
    pub home_team: String,
    /// Away team name.
    pub away_team: String,
    /// Current or final score, e.g. "2 - 1".
    pub score: String,
    /// Competition name.
    pub competition: Option<String>,
    /// Kickoff time as displayed by the site.
    pub kickoff: Option<String>,
    /// Match status ("FT", "HT", "45'").
    pub status: Option<String>,
    /// Timeline events, empty when none were listed.
    pub events: Vec<MatchEvent>,
    /// Starting lineups, when published.
    pub lineups: Option<Lineups>,
}

/// A single timeline event (goal, card, substitution).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchEvent {
    /// Match minute, e.g. "45+2'".
    pub minute: Option<String>,
    /// Event description as displayed.
    pub description: String,
}

/// Starting elevens for both sides.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Lineups {
    /// Home starters in listed order.
    pub home: Vec<String>,
    /// Away starters in listed order.
    pub away: Vec<String>,
}

/// Player identity plus season statistics.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlayerRecord {
    /// Player name.
    pub name: String,
    /// Current club.
    pub team: Option<String>,
    /// Playing position.
    pub position: Option<String>,
    /// Nationality.
    pub nationality: Option<String>,
    /// Season statistics in listed order.
    pub stats: Vec<SeasonStat>,
}

/// One labeled statistic, e.g. "Goals" / "12".
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonStat {
    /// Statistic label.
    pub label: String,
    /// Displayed value, kept as text (ratings like "7.43" and counts mix).
    pub value: String,
}
