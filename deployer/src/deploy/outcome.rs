//! Outcomes of remote calls and the run-wide result

use std::error::Error;

use http::StatusCode;

use crate::deploy::doc_id::RemoteDocumentId;

/// Closed set of status classes a remote call can end in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Ok,
    Created,
    Conflict,
    Locked,
    Forbidden,
    /// Any status outside the classified set, including transport failures
    ServerError,
}

impl StatusClass {
    /// Map a raw HTTP status once, at the call site
    pub fn from_status(status: StatusCode) -> Self {
        match status.as_u16() {
            200 => StatusClass::Ok,
            201 => StatusClass::Created,
            409 => StatusClass::Conflict,
            423 | 425 => StatusClass::Locked,
            403 => StatusClass::Forbidden,
            _ => StatusClass::ServerError,
        }
    }
}

/// Remote operation an outcome belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Upsert,
    Delete,
    Compile,
}

/// How an outcome counts towards the deployment verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Success,
    Warning,
    Error,
}

/// Result of a single remote call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationOutcome {
    pub class: StatusClass,
    /// Raw HTTP status, `None` when no response was received
    pub http_status: Option<u16>,
    /// `status.summary` reported by the server, if any
    pub summary: Option<String>,
    pub console: Vec<String>,
}

impl OperationOutcome {
    pub fn new(class: StatusClass, http_status: Option<u16>) -> Self {
        Self {
            class,
            http_status,
            summary: None,
            console: Vec::new(),
        }
    }

    pub fn with_summary(mut self, summary: Option<String>) -> Self {
        self.summary = summary.filter(|s| !s.trim().is_empty());
        self
    }

    pub fn with_console(mut self, console: Vec<String>) -> Self {
        self.console = console;
        self
    }

    /// Outcome for a request that never got a response
    pub fn transport_failure(error: &dyn Error) -> Self {
        Self::new(StatusClass::ServerError, None).with_summary(Some(error_chain(error)))
    }

    /// Decide how this outcome counts for the given operation
    pub fn severity(&self, operation: Operation) -> Severity {
        match operation {
            Operation::Fetch => match self.class {
                StatusClass::Ok => Severity::Success,
                _ => Severity::Error,
            },
            Operation::Upsert => match self.class {
                StatusClass::Ok | StatusClass::Created => Severity::Success,
                StatusClass::Conflict | StatusClass::Locked => Severity::Warning,
                StatusClass::Forbidden | StatusClass::ServerError => Severity::Error,
            },
            Operation::Delete => match self.class {
                StatusClass::Ok => Severity::Success,
                _ => Severity::Error,
            },
            // The server answers 200 even when units fail to compile
            Operation::Compile => match self.class {
                StatusClass::Ok | StatusClass::Created if self.summary.is_some() => {
                    Severity::Error
                }
                StatusClass::Ok | StatusClass::Created => Severity::Success,
                StatusClass::Conflict | StatusClass::Forbidden => Severity::Warning,
                StatusClass::Locked | StatusClass::ServerError => Severity::Error,
            },
        }
    }

    /// Best text to show for this outcome
    pub fn diagnostic(&self) -> String {
        let mut parts = Vec::new();
        if let Some(status) = self.http_status {
            parts.push(format!("HTTP {}", status));
        }
        if let Some(summary) = &self.summary {
            parts.push(summary.clone());
        }
        if self.summary.is_none() {
            let console = self.console.join("\n");
            if !console.trim().is_empty() {
                parts.push(console);
            }
        }
        parts.join(": ")
    }
}

/// Render an error with its sources, e.g. `error sending request: operation timed out`.
///
/// A source already quoted by the message above it is not repeated.
pub fn error_chain(error: &dyn Error) -> String {
    let mut rendered = error.to_string();
    let mut last = rendered.clone();
    let mut source = error.source();
    while let Some(cause) = source {
        let message = cause.to_string();
        if !last.contains(&message) {
            rendered.push_str(": ");
            rendered.push_str(&message);
        }
        last = message;
        source = cause.source();
    }
    rendered
}

/// What happened to one changed file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Uploaded,
    /// Upload rejected by contention, does not fail the run
    UploadWarning(String),
    UploadFailed(String),
    FetchFailed(String),
    ReadFailed(String),
}

impl FileStatus {
    pub fn severity(&self) -> Severity {
        match self {
            FileStatus::Uploaded => Severity::Success,
            FileStatus::UploadWarning(_) => Severity::Warning,
            FileStatus::UploadFailed(_) | FileStatus::FetchFailed(_) | FileStatus::ReadFailed(_) => {
                Severity::Error
            }
        }
    }
}

/// Per-file entry of the deployment report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: String,
    pub document: String,
    pub status: FileStatus,
}

/// Verdict of a batch call (compile or delete)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub documents: Vec<String>,
    pub severity: Severity,
    pub detail: String,
}

/// Run-wide accumulator
#[derive(Debug, Clone, Default)]
pub struct DeploymentResult {
    has_error: bool,
    files: Vec<FileReport>,
    compile: Option<BatchReport>,
    delete: Option<BatchReport>,
    config_errors: Vec<String>,
}

impl DeploymentResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_error(&self) -> bool {
        self.has_error
    }

    pub fn flag_error(&mut self) {
        self.has_error = true;
    }

    pub fn files(&self) -> &[FileReport] {
        &self.files
    }

    pub fn compile(&self) -> Option<&BatchReport> {
        self.compile.as_ref()
    }

    pub fn delete(&self) -> Option<&BatchReport> {
        self.delete.as_ref()
    }

    pub fn config_errors(&self) -> &[String] {
        &self.config_errors
    }

    pub fn record_file(&mut self, path: &str, id: &RemoteDocumentId, status: FileStatus) {
        if status.severity() == Severity::Error {
            self.flag_error();
        }
        self.files.push(FileReport {
            path: path.to_string(),
            document: id.to_string(),
            status,
        });
    }

    pub fn record_compile(&mut self, ids: &[RemoteDocumentId], outcome: &OperationOutcome) {
        self.compile = Some(self.record_batch(ids, outcome, Operation::Compile));
    }

    pub fn record_delete(&mut self, ids: &[RemoteDocumentId], outcome: &OperationOutcome) {
        self.delete = Some(self.record_batch(ids, outcome, Operation::Delete));
    }

    pub fn record_config_error(&mut self, message: String) {
        self.flag_error();
        self.config_errors.push(message);
    }

    fn record_batch(
        &mut self,
        ids: &[RemoteDocumentId],
        outcome: &OperationOutcome,
        operation: Operation,
    ) -> BatchReport {
        let severity = outcome.severity(operation);
        if severity == Severity::Error {
            self.flag_error();
        }
        BatchReport {
            documents: ids.iter().map(|id| id.to_string()).collect(),
            severity,
            detail: outcome.diagnostic(),
        }
    }

    /// Count files by severity: (uploaded, warned, failed)
    pub fn file_counts(&self) -> (usize, usize, usize) {
        self.files
            .iter()
            .fold((0, 0, 0), |(ok, warn, err), file| match file.status.severity() {
                Severity::Success => (ok + 1, warn, err),
                Severity::Warning => (ok, warn + 1, err),
                Severity::Error => (ok, warn, err + 1),
            })
    }
}
