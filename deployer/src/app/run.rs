//! Deployment run

use tracing::info;

use crate::app::options::DeploymentRequest;
use crate::deploy::observer::DeployObserver;
use crate::deploy::orchestrator::Orchestrator;
use crate::deploy::outcome::DeploymentResult;
use crate::errors::DeployerError;
use crate::http::client::AtelierClient;
use crate::http::transport::DocumentTransport;

/// Run a deployment against the configured IRIS server
pub async fn run(
    request: &DeploymentRequest,
    observer: &dyn DeployObserver,
) -> Result<DeploymentResult, DeployerError> {
    let client = AtelierClient::new(request)?;
    info!(
        "Deploying {} changed and {} deleted files to {}",
        request.changed_files.len(),
        request.deleted_files.len(),
        client.namespace_url()
    );

    Ok(run_with(request, &client, observer).await)
}

/// Run a deployment over any transport.
///
/// Uploads and compiles first, then deletes. Never fails; problems end up in
/// the returned result.
pub async fn run_with(
    request: &DeploymentRequest,
    transport: &dyn DocumentTransport,
    observer: &dyn DeployObserver,
) -> DeploymentResult {
    let mut orchestrator = Orchestrator::new(
        transport,
        observer,
        request.source_path.as_str(),
        request.compilation_flags.as_str(),
    );

    orchestrator.deploy_docs(&request.changed_files).await;
    orchestrator.delete_docs(&request.deleted_files).await;

    orchestrator.into_result()
}
