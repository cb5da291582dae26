//! Deployment verdict and process exit status

use std::process::ExitCode;

use colored::Colorize;
use tracing::{error, info, warn};

use crate::deploy::outcome::{BatchReport, DeploymentResult, FileStatus, Severity};

/// Numeric exit status: 1 when anything failed, 0 otherwise
pub fn exit_status(result: &DeploymentResult) -> u8 {
    if result.has_error() {
        1
    } else {
        0
    }
}

/// Pick the exit status for a finished run
pub fn decide(result: &DeploymentResult) -> ExitCode {
    info!("Exiting with error status {}", result.has_error());
    ExitCode::from(exit_status(result))
}

/// Log a summary of the run and print the verdict line
pub fn summarize(result: &DeploymentResult) {
    let (uploaded, warned, failed) = result.file_counts();
    info!(
        "Files: {} uploaded, {} with warnings, {} failed",
        uploaded, warned, failed
    );

    for file in result.files() {
        match &file.status {
            FileStatus::Uploaded => {}
            FileStatus::UploadWarning(detail) => {
                warn!("{} ({}): {}", file.path, file.document, detail)
            }
            FileStatus::UploadFailed(detail)
            | FileStatus::FetchFailed(detail)
            | FileStatus::ReadFailed(detail) => {
                error!("{} ({}): {}", file.path, file.document, detail)
            }
        }
    }

    log_batch("Compile", result.compile());
    log_batch("Delete", result.delete());

    for message in result.config_errors() {
        error!("Configuration: {}", message);
    }

    let verdict = if result.has_error() {
        "DEPLOYMENT FAILED".red().bold()
    } else if warned > 0 || result.compile().is_some_and(|b| b.severity == Severity::Warning) {
        "DEPLOYMENT SUCCEEDED WITH WARNINGS".yellow().bold()
    } else {
        "DEPLOYMENT SUCCEEDED".green().bold()
    };
    eprintln!("{}", verdict);
}

fn log_batch(label: &str, batch: Option<&BatchReport>) {
    let Some(batch) = batch else {
        return;
    };
    match batch.severity {
        Severity::Success => info!("{} of {} documents succeeded", label, batch.documents.len()),
        Severity::Warning => warn!("{} returned a warning: {}", label, batch.detail),
        Severity::Error => error!("{} failed: {}", label, batch.detail),
    }
}
