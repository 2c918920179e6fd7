use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

use super::types::{Label, ToxicitySummary, Verdict};

/// A comment as exchanged with the web application.
///
/// Only `content` is read; the derived fields are rewritten on every pass.
/// Anything else the caller sends, the identifier included, stays in `extra`
/// and is written back under the key it arrived with.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// `null` and a missing field both read as empty text.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
    #[serde(default)]
    pub is_toxic: bool,
    #[serde(default)]
    pub classification: Label,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
    #[serde(
        default,
        rename = "createdAt",
        alias = "created_at",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Comment {
    /// Builds a comment keyed the way the web application keys it (`_id`).
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        let mut extra = Map::new();
        extra.insert("_id".to_string(), Value::String(id.into()));
        Self {
            content: content.into(),
            is_toxic: false,
            classification: Label::NonToxic,
            confidence: None,
            created_at: None,
            extra,
        }
    }

    /// `_id` first, then `id`. Non-string identifiers are not reported.
    pub fn id(&self) -> Option<&str> {
        ["_id", "id"]
            .iter()
            .find_map(|key| self.extra.get(*key).and_then(Value::as_str))
    }

    pub fn apply_verdict(&mut self, verdict: &Verdict) {
        self.is_toxic = verdict.is_toxic();
        self.classification = verdict.classification();
        self.confidence = Some(verdict.confidence());
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortOrder {
    #[default]
    #[serde(rename = "-createdAt")]
    Newest,
    #[serde(rename = "createdAt")]
    Oldest,
    #[serde(rename = "classification")]
    Classification,
}

/// Sorts in place. All orders are stable; undated comments go last.
pub fn sort_comments(comments: &mut [Comment], order: SortOrder) {
    match order {
        SortOrder::Newest => comments.sort_by(|a, b| by_date(a, b, true)),
        SortOrder::Oldest => comments.sort_by(|a, b| by_date(a, b, false)),
        SortOrder::Classification => comments.sort_by_key(|c| c.is_toxic),
    }
}

fn by_date(a: &Comment, b: &Comment, newest_first: bool) -> Ordering {
    match (a.created_at, b.created_at) {
        (Some(x), Some(y)) if newest_first => y.cmp(&x),
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

pub fn summarize(comments: &[Comment]) -> ToxicitySummary {
    let flagged = comments.iter().filter(|c| c.is_toxic).count();
    ToxicitySummary {
        total: comments.len(),
        appropriate: comments.len() - flagged,
        flagged,
    }
}
