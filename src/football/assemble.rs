//! Shapes extracted records into the response contract and handles the
//! optional JSON snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::football::query::QueryKind;
use crate::football::types::{Candidate, ExtractedRecord};

/// The body returned by the football endpoints.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FootballResponse {
    /// The caller's original query text.
    pub query: String,
    /// Which kind of lookup ran.
    pub kind: QueryKind,
    /// Display name of the resolved entity.
    pub entity: String,
    /// Page the data was extracted from.
    pub source_url: String,
    /// Numeric source-site id, when one could be determined.
    pub entity_id: Option<String>,
    /// Similarity score of the winning candidate.
    pub similarity: f64,
    /// When the extraction ran.
    pub scraped_at: DateTime<Utc>,
    /// The extracted data.
    pub record: ExtractedRecord,
    /// Snapshot outcome; present only when a save path was requested.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub persistence: Option<PersistenceStatus>,
}

/// Outcome of the optional JSON snapshot. A failed save never invalidates
/// the in-memory result; it is only flagged here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PersistenceStatus {
    /// Where the snapshot was written (or attempted).
    pub path: String,
    /// Whether the write succeeded.
    pub saved: bool,
    /// The write error, when one occurred.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Shape a record plus its provenance into the response body.
#[must_use]
pub fn assemble(raw_query: &str, candidate: Candidate, record: ExtractedRecord) -> FootballResponse {
    let kind = match record {
        ExtractedRecord::League(_) => QueryKind::League,
        ExtractedRecord::Match(_) => QueryKind::Match,
        ExtractedRecord::Player(_) => QueryKind::Player,
    };
    FootballResponse {
        query: raw_query.to_string(),
        kind,
        entity: candidate.name,
        source_url: candidate.url,
        entity_id: candidate.entity_id,
        similarity: candidate.score,
        scraped_at: Utc::now(),
        record,
        persistence: None,
    }
}

/// Write a pretty-JSON snapshot of the response to `path`.
///
/// Never fails the request: disk-full, permission and serialization
/// problems all come back as a `saved: false` status.
pub async fn persist(response: &FootballResponse, path: &str) -> PersistenceStatus {
    let payload = match serde_json::to_vec_pretty(response) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("snapshot serialization failed: {e}");
            return PersistenceStatus {
                path: path.to_string(),
                saved: false,
                error: Some(e.to_string()),
            };
        }
    };

    match tokio::fs::write(path, payload).await {
        Ok(()) => {
            tracing::info!("saved snapshot to {path}");
            PersistenceStatus {
                path: path.to_string(),
                saved: true,
                error: None,
            }
        }
        Err(e) => {
            tracing::error!("snapshot write to {path} failed: {e}");
            PersistenceStatus {
                path: path.to_string(),
                saved: false,
                error: Some(e.to_string()),
            }
        }
    }
}
