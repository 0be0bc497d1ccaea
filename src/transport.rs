// SPDX-FileCopyrightText: 2025 RAprogramm <andrey.rozanov.vl@gmail.com>
// SPDX-License-Identifier: MIT

/// Blocking access to the GitHub REST API.
///
/// The pipeline only needs "GET this route, give me the JSON body". Upstream
/// error bodies come back as `Ok({"message": ...})` so the normalizer can
/// classify them; only failures that never produced a response are `Err`.
use std::time::Duration;

use masterror::AppError;
use octocrab::{Octocrab, service::middleware::retry::RetryConfig};
use serde_json::{Value, json};
use tokio::runtime::{Builder, Runtime};
use tracing::debug;

use crate::config::Settings;

/// Failure to obtain any response from the API.
#[derive(Debug, Clone, PartialEq, Eq, masterror::Error,)]
pub enum TransportError
{
    /// The bounded wait expired.
    #[error("request timed out after {seconds}s")]
    Timeout
    {
        seconds: u64,
    },
    /// The request could not be sent or the response could not be read.
    #[error("request failed: {message}")]
    Request
    {
        message: String,
    },
}

/// Source of raw API responses.
pub trait Transport
{
    /// Performs a GET request against `route` with optional query pairs.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] when no response was received.
    fn get(&self, route: &str, query: &[(&str, &str,)],) -> Result<Value, TransportError,>;
}

/// [`Transport`] backed by octocrab, driven one request at a time on a
/// current-thread runtime.
pub struct GitHubTransport
{
    runtime: Runtime,
    client:  Octocrab,
    timeout: Duration,
}

impl GitHubTransport
{
    /// Builds the client from resolved settings.
    ///
    /// # Errors
    ///
    /// Returns [`AppError`] when the runtime or the HTTP client cannot be
    /// initialized, or when the configured base URL is invalid.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use gitfo::{GitHubTransport, Settings, Transport};
    ///
    /// # fn example() -> Result<(), masterror::AppError> {
    /// let transport = GitHubTransport::new(&Settings::default(),)?;
    /// let body = transport.get("/rate_limit", &[],);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(settings: &Settings,) -> Result<Self, AppError,>
    {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| AppError::internal(format!("failed to start runtime: {e}"),),)?;

        let client = {
            // octocrab spawns its service worker on the ambient runtime
            let _guard = runtime.enter();

            let mut builder = Octocrab::builder().add_retry_config(RetryConfig::None,);
            if let Some(token,) = settings.token.as_deref() {
                builder = builder.personal_token(token,);
            }
            if let Some(base_url,) = settings.base_url.as_deref() {
                builder = builder.base_uri(base_url,).map_err(|e| {
                    AppError::validation(format!("invalid base URL '{base_url}': {e}"),)
                },)?;
            }
            builder.build().map_err(|e| {
                AppError::unauthorized(format!("failed to initialize GitHub client: {e}"),)
            },)?
        };

        Ok(Self {
            runtime,
            client,
            timeout: Duration::from_secs(settings.timeout_secs,),
        },)
    }
}

impl Transport for GitHubTransport
{
    fn get(&self, route: &str, query: &[(&str, &str,)],) -> Result<Value, TransportError,>
    {
        debug!("GET {} {:?}", route, query);

        let params: Vec<(&str, &str,),> = query.to_vec();
        let request = self.client.get::<Value, _, _,>(
            route,
            if params.is_empty() { None } else { Some(&params,) },
        );

        let seconds = self.timeout.as_secs();
        // the timer must be created inside the runtime
        let bounded = async { tokio::time::timeout(self.timeout, request,).await };
        match self.runtime.block_on(bounded,) {
            Err(_elapsed,) => Err(TransportError::Timeout {
                seconds,
            },),
            Ok(Ok(body,),) => Ok(body,),
            Ok(Err(error,),) => response_from_error(error,),
        }
    }
}

/// API errors carry a message body and are handed on for classification;
/// everything else is a transport failure.
fn response_from_error(error: octocrab::Error,) -> Result<Value, TransportError,>
{
    match error {
        octocrab::Error::GitHub {
            source, ..
        } => Ok(json!({ "message": source.message }),),
        other => Err(TransportError::Request {
            message: other.to_string(),
        },),
    }
}
