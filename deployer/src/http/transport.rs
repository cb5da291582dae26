//! Remote document operations

use async_trait::async_trait;

use atelier_models::DocumentBody;

use crate::deploy::doc_id::RemoteDocumentId;
use crate::deploy::outcome::OperationOutcome;

/// What the server holds for a document before it is written
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentSnapshot {
    /// Document exists, with its version token (empty means unknown)
    Present { version: String },

    /// Document does not exist yet
    Absent,
}

impl DocumentSnapshot {
    /// Token to send as the write precondition, only when non-empty
    pub fn precondition(&self) -> Option<&str> {
        match self {
            DocumentSnapshot::Present { version } if !version.is_empty() => Some(version.as_str()),
            _ => None,
        }
    }
}

/// Content uploaded for one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPayload {
    id: RemoteDocumentId,
    lines: Vec<String>,
}

impl DocumentPayload {
    /// Build a payload from raw file text, one entry per line without terminators
    pub fn from_text(id: RemoteDocumentId, text: &str) -> Self {
        Self {
            id,
            lines: text.lines().map(str::to_string).collect(),
        }
    }

    pub fn id(&self) -> &RemoteDocumentId {
        &self.id
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Wire body; content is always sent as plain text
    pub fn to_body(&self) -> DocumentBody {
        DocumentBody {
            enc: false,
            content: self.lines.clone(),
        }
    }
}

/// Document transport trait for testability
#[async_trait]
pub trait DocumentTransport: Send + Sync {
    /// Read the current version of a document
    async fn fetch(&self, id: &RemoteDocumentId) -> Result<DocumentSnapshot, OperationOutcome>;

    /// Create or replace a document, guarded by `precondition` when given
    async fn upsert(&self, payload: &DocumentPayload, precondition: Option<&str>)
        -> OperationOutcome;

    /// Delete all documents in one call
    async fn batch_delete(&self, ids: &[RemoteDocumentId]) -> OperationOutcome;

    /// Compile all documents in one call
    async fn batch_compile(&self, ids: &[RemoteDocumentId], flags: &str) -> OperationOutcome;
}
