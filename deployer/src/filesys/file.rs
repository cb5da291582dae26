//! Local source file access

use std::path::PathBuf;

use tokio::fs;

use crate::deploy::doc_id::RemoteDocumentId;
use crate::errors::DeployerError;
use crate::http::transport::DocumentPayload;

/// A local source file that is about to be uploaded
#[derive(Debug, Clone)]
pub struct SourceFile {
    path: PathBuf,
}

impl SourceFile {
    /// Create a new file reference
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the whole file as UTF-8 text
    pub async fn read_string(&self) -> Result<String, DeployerError> {
        Ok(fs::read_to_string(&self.path).await?)
    }

    /// Read the file into the payload for document `id`.
    ///
    /// The file handle is released before the upload starts.
    pub async fn read_payload(&self, id: RemoteDocumentId) -> Result<DocumentPayload, DeployerError> {
        let text = self.read_string().await?;
        Ok(DocumentPayload::from_text(id, &text))
    }
}
