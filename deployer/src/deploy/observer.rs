//! Observation hooks for a deployment run

use tracing::{error, info, warn};

use crate::deploy::doc_id::RemoteDocumentId;
use crate::deploy::outcome::{Operation, OperationOutcome, Severity};

/// Something worth reporting during a run
#[derive(Debug)]
pub enum DeployEvent<'a> {
    /// Changed file list is empty
    NothingToDeploy,

    /// Deleted file list is empty
    NothingToDelete,

    /// A file list was refused before any remote call
    ConfigRejected { message: &'a str },

    /// Fetch failed, the file is skipped
    FetchFailed {
        path: &'a str,
        id: &'a RemoteDocumentId,
        outcome: &'a OperationOutcome,
    },

    /// Local file could not be read, the file is skipped
    ReadFailed { path: &'a str, message: &'a str },

    /// A remote call answered
    Answered {
        operation: Operation,
        documents: &'a [RemoteDocumentId],
        outcome: &'a OperationOutcome,
    },

    /// The run hit an internal inconsistency
    Internal { message: &'a str },
}

/// Receives events from the orchestrator
pub trait DeployObserver: Send + Sync {
    fn on_event(&self, event: &DeployEvent<'_>);
}

/// Observer writing events to `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

fn names(documents: &[RemoteDocumentId]) -> String {
    documents
        .iter()
        .map(RemoteDocumentId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

impl DeployObserver for TracingObserver {
    fn on_event(&self, event: &DeployEvent<'_>) {
        match event {
            DeployEvent::NothingToDeploy => info!("0 files to deploy"),
            DeployEvent::NothingToDelete => info!("0 files to delete"),
            DeployEvent::ConfigRejected { message } => {
                error!("Invalid file list: {}", message)
            }
            DeployEvent::FetchFailed { path, id, outcome } => {
                error!(
                    "Unable to read {} from server, skipping {}: {}",
                    id,
                    path,
                    outcome.diagnostic()
                )
            }
            DeployEvent::ReadFailed { path, message } => {
                error!("Unable to read {}: {}", path, message)
            }
            DeployEvent::Answered {
                operation,
                documents,
                outcome,
            } => {
                let console = outcome.console.join("\n");
                match outcome.severity(*operation) {
                    Severity::Success => {
                        info!("{:?} {} succeeded", operation, names(documents));
                        if !console.trim().is_empty() {
                            info!("{}", console);
                        }
                    }
                    Severity::Warning => {
                        warn!(
                            "{:?} {}: {}",
                            operation,
                            names(documents),
                            outcome.diagnostic()
                        )
                    }
                    Severity::Error => {
                        error!(
                            "{:?} {} failed: {}",
                            operation,
                            names(documents),
                            outcome.diagnostic()
                        );
                        if outcome.summary.is_some() && !console.trim().is_empty() {
                            error!("{}", console);
                        }
                    }
                }
            }
            DeployEvent::Internal { message } => error!("Internal error: {}", message),
        }
    }
}
