//! Document API client

use async_trait::async_trait;
use reqwest::{header, Method, StatusCode};
use tracing::{debug, warn};

use atelier_models::{DeletedDocument, DocumentInfo};

use crate::deploy::doc_id::RemoteDocumentId;
use crate::deploy::outcome::{OperationOutcome, StatusClass};
use crate::http::client::AtelierClient;
use crate::http::transport::{DocumentPayload, DocumentSnapshot, DocumentTransport};

/// Compile flags used when none are configured
pub const DEFAULT_COMPILE_FLAGS: &str = "cukb";

fn ids_as_strs(ids: &[RemoteDocumentId]) -> Vec<&str> {
    ids.iter().map(RemoteDocumentId::as_str).collect()
}

#[async_trait]
impl DocumentTransport for AtelierClient {
    async fn fetch(&self, id: &RemoteDocumentId) -> Result<DocumentSnapshot, OperationOutcome> {
        let url = self
            .endpoint(&["doc", id.as_str()])
            .map_err(|e| OperationOutcome::transport_failure(&e))?;

        let decoded = self
            .send::<DocumentInfo>(self.request(Method::GET, url))
            .await
            .map_err(|e| OperationOutcome::transport_failure(&e))?;

        match decoded.status {
            StatusCode::OK if !decoded.parsed => {
                // No version token can be read from this body
                warn!("Document {} answered 200 without a readable body", id);
                let mut outcome = decoded.outcome();
                outcome.class = StatusClass::ServerError;
                Err(outcome)
            }
            StatusCode::OK => Ok(DocumentSnapshot::Present {
                version: decoded.envelope.result.ts,
            }),
            StatusCode::NOT_FOUND => Ok(DocumentSnapshot::Absent),
            _ => {
                // Anything but 200/404 is a failed read whatever its class
                let mut outcome = decoded.outcome();
                outcome.class = StatusClass::ServerError;
                Err(outcome)
            }
        }
    }

    async fn upsert(
        &self,
        payload: &DocumentPayload,
        precondition: Option<&str>,
    ) -> OperationOutcome {
        let url = match self.endpoint(&["doc", payload.id().as_str()]) {
            Ok(url) => url,
            Err(e) => return OperationOutcome::transport_failure(&e),
        };

        let mut request = self.request(Method::PUT, url).json(&payload.to_body());
        if let Some(version) = precondition.filter(|v| !v.is_empty()) {
            request = request.header(header::IF_NONE_MATCH, version);
        }

        match self.send::<serde_json::Value>(request).await {
            Ok(decoded) => decoded.outcome(),
            Err(e) => OperationOutcome::transport_failure(&e),
        }
    }

    async fn batch_delete(&self, ids: &[RemoteDocumentId]) -> OperationOutcome {
        let url = match self.endpoint(&["docs"]) {
            Ok(url) => url,
            Err(e) => return OperationOutcome::transport_failure(&e),
        };

        let request = self.request(Method::DELETE, url).json(&ids_as_strs(ids));
        match self.send::<Vec<DeletedDocument>>(request).await {
            Ok(decoded) => {
                for document in decoded.envelope.result.iter() {
                    if !document.status.is_empty() {
                        warn!("Document {} not deleted: {}", document.name, document.status);
                    }
                }
                decoded.outcome()
            }
            Err(e) => OperationOutcome::transport_failure(&e),
        }
    }

    async fn batch_compile(&self, ids: &[RemoteDocumentId], flags: &str) -> OperationOutcome {
        let mut url = match self.endpoint(&["action", "compile"]) {
            Ok(url) => url,
            Err(e) => return OperationOutcome::transport_failure(&e),
        };

        let flags = if flags.trim().is_empty() {
            DEFAULT_COMPILE_FLAGS
        } else {
            flags.trim()
        };
        url.query_pairs_mut()
            .append_pair("source", "0")
            .append_pair("flags", flags);
        debug!("Compiling {} documents with flags {}", ids.len(), flags);

        let request = self.request(Method::POST, url).json(&ids_as_strs(ids));
        match self.send::<serde_json::Value>(request).await {
            Ok(decoded) => decoded.outcome(),
            Err(e) => OperationOutcome::transport_failure(&e),
        }
    }
}
