//! Wolfram|Alpha Full Results API client.
//!
//! Queries `/query` with JSON output and plaintext format, then reduces the
//! returned pods to a short textual answer: the input interpretation followed
//! by the primary result.

use async_trait::async_trait;
use serde::Deserialize;

use super::{decode_json, http_client, send, BackendError, ComputeEngine};
use crate::config::WolframConfig;

const SERVICE: &str = "Wolfram|Alpha";

#[derive(Debug, Deserialize)]
struct QueryEnvelope {
    queryresult: QueryOutcome,
}

#[derive(Debug, Deserialize)]
struct QueryOutcome {
    #[serde(default)]
    success: bool,
    /// `false`, or an object with `code` and `msg` when the request was rejected.
    #[serde(default)]
    error: serde_json::Value,
    #[serde(default)]
    pods: Vec<Pod>,
}

#[derive(Debug, Deserialize)]
struct Pod {
    #[serde(default)]
    title: String,
    #[serde(default)]
    id: String,
    #[serde(default)]
    primary: bool,
    #[serde(default)]
    subpods: Vec<Subpod>,
}

#[derive(Debug, Deserialize)]
struct Subpod {
    #[serde(default)]
    plaintext: String,
}

impl Pod {
    fn is_input(&self) -> bool {
        self.id == "Input" || self.title.starts_with("Input")
    }

    fn text(&self) -> Option<String> {
        let lines: Vec<&str> = self
            .subpods
            .iter()
            .map(|s| s.plaintext.trim())
            .filter(|t| !t.is_empty())
            .collect();
        (!lines.is_empty()).then(|| lines.join("\n"))
    }
}

#[derive(Debug, Clone)]
pub struct WolframClient {
    client: reqwest::Client,
    base_url: String,
    app_id: String,
    units: Option<String>,
}

impl WolframClient {
    pub fn new(app_id: impl Into<String>, config: &WolframConfig) -> Result<Self, BackendError> {
        Ok(Self {
            client: http_client(SERVICE, config.timeout_secs)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            app_id: app_id.into(),
            units: config.units.clone(),
        })
    }
}

/// Reduce a query outcome to `"<input title>: <input>\n<result title>: <result>"`.
fn summarize(outcome: QueryOutcome) -> Result<String, BackendError> {
    if let Some(message) = outcome.error.get("msg").and_then(|m| m.as_str()) {
        return Err(BackendError::Rejected {
            service: SERVICE,
            message: message.to_string(),
        });
    }
    if !outcome.success {
        return Err(BackendError::NoAnswer { service: SERVICE });
    }

    let titled = |pod: &Pod| pod.text().map(|text| format!("{}: {}", pod.title, text));

    let answer = outcome
        .pods
        .iter()
        .filter(|p| p.primary)
        .find_map(titled)
        .or_else(|| outcome.pods.iter().filter(|p| !p.is_input()).find_map(titled))
        .ok_or(BackendError::NoAnswer { service: SERVICE })?;

    let mut lines = Vec::with_capacity(2);
    if let Some(input) = outcome.pods.iter().filter(|p| p.is_input()).find_map(titled) {
        lines.push(input);
    }
    lines.push(answer);
    Ok(lines.join("\n"))
}

#[async_trait]
impl ComputeEngine for WolframClient {
    async fn query(&self, input: &str) -> Result<String, BackendError> {
        let url = format!("{}/query", self.base_url);
        let mut params = vec![
            ("appid", self.app_id.as_str()),
            ("input", input),
            ("output", "json"),
            ("format", "plaintext"),
        ];
        if let Some(units) = &self.units {
            params.push(("units", units.as_str()));
        }

        tracing::debug!(input_len = input.len(), "wolfram query");

        let response = send(SERVICE, self.client.get(&url).query(&params)).await?;
        let envelope: QueryEnvelope = decode_json(SERVICE, response).await?;
        summarize(envelope.queryresult)
    }
}
