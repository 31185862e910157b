//! Answer backends.
//!
//! Provides the [`LanguageModel`] and [`ComputeEngine`] traits the router
//! dispatches to, plus their HTTP implementations for OpenAI Chat Completions
//! ([`openai`]) and Wolfram|Alpha ([`wolfram`]). Every failure surfaces as a
//! [`BackendError`] value; nothing here panics on a bad response.

pub mod openai;
pub mod wolfram;

use std::time::Duration;

use async_trait::async_trait;

use crate::conversation::Exchange;
use crate::notes::truncate_chars;

/// Longest slice of an upstream error body kept in a [`BackendError::Status`].
pub const ERROR_BODY_MAX_CHARS: usize = 200;

/// Failure talking to an external service.
#[derive(Debug, thiserror::Error)]
pub enum BackendError {
    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{service} returned HTTP {status}: {body}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("{service} rejected the request: {message}")]
    Rejected {
        service: &'static str,
        message: String,
    },
    #[error("failed to decode {service} response: {message}")]
    Decode {
        service: &'static str,
        message: String,
    },
    #[error("{service} returned no answer")]
    NoAnswer { service: &'static str },
}

/// Free-text completion with prior conversation as context.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Answer `prompt`, given the earlier exchanges of the session (oldest first).
    async fn complete(&self, prompt: &str, history: &[Exchange]) -> Result<String, BackendError>;
}

/// Evaluation of mathematical and scientific queries.
#[async_trait]
pub trait ComputeEngine: Send + Sync {
    async fn query(&self, input: &str) -> Result<String, BackendError>;
}

/// Build a `reqwest` client with the given request timeout.
pub(crate) fn http_client(
    service: &'static str,
    timeout_secs: u64,
) -> Result<reqwest::Client, BackendError> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|source| BackendError::Http { service, source })
}

/// Send a request, turning transport errors and non-2xx statuses into [`BackendError`].
pub(crate) async fn send(
    service: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, BackendError> {
    let response = request
        .send()
        .await
        .map_err(|source| BackendError::Http { service, source })?;

    let status = response.status();
    tracing::debug!(service, status = %status, "response received");

    if status.is_success() {
        return Ok(response);
    }

    // The full body goes to the log only; the error text reaches end users.
    let body = response.text().await.unwrap_or_default();
    tracing::warn!(service, status = %status, body = %body, "upstream error response");
    Err(BackendError::Status {
        service,
        status,
        body: truncate_chars(&body, ERROR_BODY_MAX_CHARS),
    })
}

/// Read and deserialize a JSON body.
pub(crate) async fn decode_json<T: serde::de::DeserializeOwned>(
    service: &'static str,
    response: reqwest::Response,
) -> Result<T, BackendError> {
    let body = response
        .text()
        .await
        .map_err(|source| BackendError::Http { service, source })?;
    serde_json::from_str(&body).map_err(|e| BackendError::Decode {
        service,
        message: e.to_string(),
    })
}
