//! HTTP client implementation

use std::time::Duration;

use reqwest::{header, Client, Method, RequestBuilder, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use atelier_models::Envelope;

use crate::app::options::DeploymentRequest;
use crate::deploy::outcome::{OperationOutcome, StatusClass};
use crate::errors::DeployerError;

/// Authenticated session against one namespace of the Atelier API
pub struct AtelierClient {
    client: Client,
    namespace_url: Url,
    username: String,
    password: SecretString,
}

/// Response body decoded as far as possible
pub(crate) struct Decoded<T> {
    pub status: reqwest::StatusCode,
    pub envelope: Envelope<T>,
    /// Whether the body decoded as an Atelier envelope
    pub parsed: bool,
    /// Raw body when it was not an Atelier envelope
    pub raw: Option<String>,
}

impl<T> Decoded<T> {
    /// Turn the response into an outcome, keeping the server's diagnostics
    pub fn outcome(&self) -> OperationOutcome {
        let summary = self
            .envelope
            .status
            .reported_summary()
            .map(str::to_string)
            .or_else(|| self.raw.clone());

        OperationOutcome::new(StatusClass::from_status(self.status), Some(self.status.as_u16()))
            .with_summary(summary)
            .with_console(self.envelope.console.clone())
    }
}

impl AtelierClient {
    /// Create a new client for the request's server and namespace
    pub fn new(request: &DeploymentRequest) -> Result<Self, DeployerError> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );
        headers.insert(header::ACCEPT, header::HeaderValue::from_static("*/*"));

        let mut builder = Client::builder().default_headers(headers);
        // 0 or unset means no timeout
        if let Some(secs) = request.timeout_secs.filter(|secs| *secs > 0) {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder.build()?;

        Ok(Self {
            client,
            namespace_url: request.namespace_url()?,
            username: request.credentials.username.clone(),
            password: SecretString::from(request.credentials.password.expose_secret().to_string()),
        })
    }

    /// Get the namespace URL, e.g. `http://host:52773/api/atelier/v2/USER/`
    pub fn namespace_url(&self) -> &Url {
        &self.namespace_url
    }

    /// Build an endpoint URL below the namespace
    pub(crate) fn endpoint(&self, segments: &[&str]) -> Result<Url, DeployerError> {
        let mut url = self.namespace_url.clone();
        url.path_segments_mut()
            .map_err(|_| DeployerError::ConfigError("Namespace URL cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Start an authenticated request
    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!("{} {}", method, url);
        self.client
            .request(method, url)
            .basic_auth(&self.username, Some(self.password.expose_secret()))
    }

    /// Send a request and decode the Atelier envelope.
    ///
    /// Only a missing response is an error; every HTTP status is returned.
    pub(crate) async fn send<T: DeserializeOwned + Default>(
        &self,
        request: RequestBuilder,
    ) -> Result<Decoded<T>, DeployerError> {
        let response: Response = request.send().await?;
        let status = response.status();
        let body = response.text().await?;

        let (envelope, parsed, raw) = match serde_json::from_str::<Envelope<T>>(&body) {
            Ok(envelope) => (envelope, true, None),
            Err(e) => {
                debug!("Response is not an Atelier envelope ({}): {}", e, body);
                let raw = Some(body.trim().to_string()).filter(|b| !b.is_empty());
                (Envelope::default(), false, raw)
            }
        };

        Ok(Decoded {
            status,
            envelope,
            parsed,
            raw,
        })
    }
}
