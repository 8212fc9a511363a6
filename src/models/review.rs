// src/models/review.rs
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

/// In-progress review input held by the form controller while the dialog is open.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewDraft {
    pub rating: Option<u8>, // Star rating, absent until the user picks one
    pub review: String,     // Review body
    pub name: String,       // Display name of the reviewer
    pub email: String,      // Contact address, never shown on the product page
}

impl ReviewDraft {
    /// Rating as the schema sees it: an absent rating counts as 0.
    pub fn rating_value(&self) -> u8 {
        self.rating.unwrap_or(0)
    }
}

/// A user attached to a review (e.g. someone who marked it helpful).
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewUser {
    pub id: String,
    pub name: String,
    pub avatar_url: String,
}

/// A reply posted under a review.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReplyComment {
    pub id: String,
    pub user_id: String,
    pub message: String,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    pub tag_user: Option<String>, // Name of the user being replied to, if any
}

/// A submitted review as stored in the storefront's review list.
/// Records are never mutated once appended.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
    pub id: usize,
    pub name: String,
    pub avatar_url: String,
    pub message: String,
    #[serde(with = "iso8601")]
    pub created_at: DateTime<Utc>,
    pub rating: u8,
    pub helpful: u32,
    pub users: Vec<ReviewUser>,
    pub reply_comment: Vec<ReplyComment>,
}

impl ReviewRecord {
    /// Builds a fresh record from a draft that already passed validation.
    pub fn from_draft(id: usize, draft: &ReviewDraft, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            avatar_url: String::new(),
            message: draft.review.clone(),
            created_at,
            rating: draft.rating_value(),
            helpful: 0,
            users: Vec::new(),
            reply_comment: Vec::new(),
        }
    }

    pub fn created_at_iso(&self) -> String {
        iso8601::format(&self.created_at)
    }
}

/// ISO-8601 timestamps with millisecond precision and a `Z` suffix,
/// e.g. `2024-03-01T12:30:00.000Z`.
mod iso8601 {
    use super::*;
    use serde::{Deserializer, Serializer};

    pub fn format(at: &DateTime<Utc>) -> String {
        at.to_rfc3339_opts(SecondsFormat::Millis, true)
    }

    pub fn serialize<S: Serializer>(at: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format(at))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|at| at.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
