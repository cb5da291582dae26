//! IRIS Deployer - Entry Point
//!
//! Reads its configuration from flags or the `INPUT_*` variables set by the
//! CI action, deploys, and exits with 1 when anything failed.

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use secrecy::SecretString;
use tracing::{error, info};

use iris_deployer::app::options::{
    compile_flags_or_default, parse_file_list, ApiOptions, Credentials, DeploymentRequest, Scheme,
    ServerOptions,
};
use iris_deployer::app::run::run;
use iris_deployer::deploy::observer::TracingObserver;
use iris_deployer::deploy::report::{decide, summarize};
use iris_deployer::logs::{init_logging, LogLevel, LogOptions};
use iris_deployer::utils::version_info;

#[derive(Debug, Parser)]
#[command(
    name = "iris-deployer",
    version,
    about = "Deploy changed source files to an IRIS server and compile them."
)]
struct Cli {
    /// IRIS server host.
    #[arg(long, env = "INPUT_HOST")]
    host: String,

    /// IRIS web server port.
    #[arg(long, env = "INPUT_PORT")]
    port: u16,

    /// Namespace holding the documents.
    #[arg(long, env = "INPUT_NAMESPACE_IRIS")]
    namespace: String,

    /// Use https (1/0, true/false).
    #[arg(long, env = "INPUT_HTTPS", default_value = "0", value_parser = Scheme::from_flag)]
    https: Scheme,

    /// Base path of the Atelier API.
    #[arg(long, env = "INPUT_BASE_API_URL", default_value = "/api/atelier/")]
    base_api_url: String,

    /// Atelier API version.
    #[arg(long, env = "INPUT_VERSION_API", default_value = "v2")]
    api_version: String,

    /// User name for basic authentication.
    #[arg(long, env = "INPUT_IRIS_USR")]
    user: String,

    /// Password for basic authentication.
    #[arg(long, env = "INPUT_IRIS_PWD", hide_env_values = true)]
    password: String,

    /// Compiler flags (default: cukb).
    #[arg(long, env = "INPUT_COMPILATION_FLAGS")]
    compilation_flags: Option<String>,

    /// Prefix removed from file paths to build document names.
    #[arg(long, env = "INPUT_SOURCE_PATH", default_value = "")]
    source_path: String,

    /// Comma separated list of changed files.
    #[arg(long, env = "INPUT_CHANGED_FILES", default_value = "")]
    changed_files: String,

    /// Comma separated list of deleted files.
    #[arg(long, env = "INPUT_DELETED_FILES", default_value = "")]
    deleted_files: String,

    /// Timeout of each HTTP request, in seconds (default: none).
    #[arg(long, env = "INPUT_TIMEOUT_SECS")]
    timeout_secs: Option<u64>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "INPUT_LOG_LEVEL", default_value = "info")]
    log_level: LogLevel,

    /// Emit logs as JSON.
    #[arg(long, env = "INPUT_LOG_JSON", default_value_t = false)]
    log_json: bool,
}

impl Cli {
    fn into_request(self) -> DeploymentRequest {
        DeploymentRequest {
            server: ServerOptions {
                host: self.host,
                port: self.port,
                scheme: self.https,
            },
            api: ApiOptions {
                base_url: self.base_api_url,
                version: self.api_version,
                namespace: self.namespace,
            },
            credentials: Credentials {
                username: self.user,
                password: SecretString::from(self.password),
            },
            compilation_flags: compile_flags_or_default(self.compilation_flags.as_deref()),
            source_path: self.source_path,
            changed_files: parse_file_list(&self.changed_files),
            deleted_files: parse_file_list(&self.deleted_files),
            timeout_secs: self.timeout_secs,
        }
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let log_options = LogOptions {
        log_level: cli.log_level,
        json_format: cli.log_json,
    };
    if let Err(e) = init_logging(log_options) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let version = version_info();
    info!(
        "IRIS deployer {} ({}, built {})",
        version.version, version.git_hash, version.build_time
    );

    match deploy(cli.into_request()).await {
        Ok(code) => code,
        Err(e) => {
            error!("Deployment aborted: {:#}", e);
            ExitCode::from(1)
        }
    }
}

async fn deploy(request: DeploymentRequest) -> anyhow::Result<ExitCode> {
    let result = run(&request, &TracingObserver)
        .await
        .context("unable to start the deployment")?;

    summarize(&result);
    Ok(decide(&result))
}
