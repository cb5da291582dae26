//! Deployment orchestration
//!
//! Uploads changed documents one at a time (fetch, then conditional write),
//! compiles them in a single batch, and deletes removed documents in a single
//! batch. Every outcome is folded into a [`DeploymentResult`]; nothing here
//! returns an error to the caller.

use std::slice;

use tracing::debug;

use crate::deploy::doc_id::{translate_all, RemoteDocumentId};
use crate::deploy::fsm::{SyncEvent, SyncFsm};
use crate::deploy::observer::{DeployEvent, DeployObserver};
use crate::deploy::outcome::{DeploymentResult, FileStatus, Operation, Severity};
use crate::filesys::file::SourceFile;
use crate::http::transport::DocumentTransport;

/// Drives one deployment run
pub struct Orchestrator<'a> {
    transport: &'a dyn DocumentTransport,
    observer: &'a dyn DeployObserver,
    source_root: String,
    compile_flags: String,
    fsm: SyncFsm,
    result: DeploymentResult,
}

impl<'a> Orchestrator<'a> {
    /// Create a new orchestrator
    pub fn new(
        transport: &'a dyn DocumentTransport,
        observer: &'a dyn DeployObserver,
        source_root: impl Into<String>,
        compile_flags: impl Into<String>,
    ) -> Self {
        Self {
            transport,
            observer,
            source_root: source_root.into(),
            compile_flags: compile_flags.into(),
            fsm: SyncFsm::new(),
            result: DeploymentResult::new(),
        }
    }

    /// Result accumulated so far
    pub fn result(&self) -> &DeploymentResult {
        &self.result
    }

    /// Finish the run and hand over the result
    pub fn into_result(self) -> DeploymentResult {
        self.result
    }

    /// Upload every changed file, then compile them all at once
    pub async fn deploy_docs(&mut self, changed_files: &[String]) {
        if changed_files.is_empty() {
            self.observer.on_event(&DeployEvent::NothingToDeploy);
            return;
        }

        let files = match translate_all(changed_files, &self.source_root) {
            Ok(files) => files,
            Err(e) => {
                self.reject(e.to_string());
                return;
            }
        };

        if !self.advance(SyncEvent::BeginUpload { total: files.len() }) {
            return;
        }

        for (path, id) in &files {
            if let Some(index) = self.fsm.current_file() {
                debug!("Deploying file {} of {}: {}", index + 1, files.len(), path);
            }
            let status = self.deploy_doc(path, id).await;
            self.result.record_file(path, id, status);
            if !self.advance(SyncEvent::FileProcessed) {
                return;
            }
        }

        // Failed uploads stay in the batch
        let ids: Vec<RemoteDocumentId> = files.into_iter().map(|(_, id)| id).collect();
        self.compile_docs(&ids).await;
        self.advance(SyncEvent::CompileFinished);
    }

    /// Compile documents in a single call
    pub async fn compile_docs(&mut self, ids: &[RemoteDocumentId]) {
        let outcome = self.transport.batch_compile(ids, &self.compile_flags).await;
        self.observer.on_event(&DeployEvent::Answered {
            operation: Operation::Compile,
            documents: ids,
            outcome: &outcome,
        });
        self.result.record_compile(ids, &outcome);
    }

    /// Delete every removed file in a single call
    pub async fn delete_docs(&mut self, deleted_files: &[String]) {
        if deleted_files.is_empty() {
            self.observer.on_event(&DeployEvent::NothingToDelete);
            return;
        }

        let ids: Vec<RemoteDocumentId> = match translate_all(deleted_files, &self.source_root) {
            Ok(files) => files.into_iter().map(|(_, id)| id).collect(),
            Err(e) => {
                self.reject(e.to_string());
                return;
            }
        };

        if !self.advance(SyncEvent::BeginDelete) {
            return;
        }

        let outcome = self.transport.batch_delete(&ids).await;
        self.observer.on_event(&DeployEvent::Answered {
            operation: Operation::Delete,
            documents: &ids,
            outcome: &outcome,
        });
        self.result.record_delete(&ids, &outcome);
        self.advance(SyncEvent::DeleteFinished);
    }

    /// Fetch, read and upload a single file
    async fn deploy_doc(&self, path: &str, id: &RemoteDocumentId) -> FileStatus {
        let snapshot = match self.transport.fetch(id).await {
            Ok(snapshot) => snapshot,
            Err(outcome) => {
                self.observer.on_event(&DeployEvent::FetchFailed {
                    path,
                    id,
                    outcome: &outcome,
                });
                return FileStatus::FetchFailed(outcome.diagnostic());
            }
        };

        let payload = match SourceFile::new(path).read_payload(id.clone()).await {
            Ok(payload) => payload,
            Err(e) => {
                let message = e.to_string();
                self.observer.on_event(&DeployEvent::ReadFailed {
                    path,
                    message: &message,
                });
                return FileStatus::ReadFailed(message);
            }
        };

        let outcome = self
            .transport
            .upsert(&payload, snapshot.precondition())
            .await;
        self.observer.on_event(&DeployEvent::Answered {
            operation: Operation::Upsert,
            documents: slice::from_ref(id),
            outcome: &outcome,
        });

        match outcome.severity(Operation::Upsert) {
            Severity::Success => FileStatus::Uploaded,
            Severity::Warning => FileStatus::UploadWarning(outcome.diagnostic()),
            Severity::Error => FileStatus::UploadFailed(outcome.diagnostic()),
        }
    }

    fn reject(&mut self, message: String) {
        self.observer.on_event(&DeployEvent::ConfigRejected { message: &message });
        self.result.record_config_error(message);
    }

    /// Apply a state transition, flagging the run if it is not allowed
    fn advance(&mut self, event: SyncEvent) -> bool {
        match self.fsm.process(event) {
            Ok(()) => true,
            Err(message) => {
                self.observer.on_event(&DeployEvent::Internal { message: &message });
                self.result.flag_error();
                false
            }
        }
    }
}
