//! API models

use serde::{Deserialize, Serialize};

/// Every Atelier response is wrapped in the same envelope
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: StatusBlock,
    #[serde(default)]
    pub console: Vec<String>,
    #[serde(default)]
    pub result: T,
}

/// Server side status of a request.
///
/// `summary` is `null` or empty when the request fully succeeded. For a compile
/// it carries the first compiler error even when the HTTP status is 200.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StatusBlock {
    #[serde(default)]
    pub errors: Vec<serde_json::Value>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl StatusBlock {
    /// The summary when it actually reports something
    pub fn reported_summary(&self) -> Option<&str> {
        self.summary.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// Document body sent on PUT /doc/{name}
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentBody {
    pub enc: bool,
    pub content: Vec<String>,
}

/// Result of GET /doc/{name}
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocumentInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub db: String,
    /// Version timestamp used as the optimistic concurrency token
    #[serde(default)]
    pub ts: String,
    #[serde(default)]
    pub cat: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub enc: bool,
    #[serde(default)]
    pub content: Vec<String>,
}

/// One entry of the DELETE /docs result list
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeletedDocument {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub db: String,
    /// Empty when the document was removed
    #[serde(default)]
    pub status: String,
}
