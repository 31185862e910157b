//! The query pipeline: classify, answer, record.
//!
//! [`Oracle::process`] is the single inbound operation. It never returns an
//! error: an initialization failure or a backend failure is reported as an
//! [`Classification::Error`] result, and persistence only affects `saved`.

use std::sync::Arc;

use serde::Serialize;

use crate::backend::openai::OpenAiClient;
use crate::backend::wolfram::WolframClient;
use crate::backend::{BackendError, ComputeEngine, LanguageModel};
use crate::config::{IrisConfig, Secrets, SecretsStatus};
use crate::conversation::{ConversationMemory, Exchange};
use crate::notes::notion::NotionClient;
use crate::notes::{NotesStore, Recorder};
use crate::router::{classify, Classification, Route};

/// What the caller gets back for one query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryResult {
    pub response: String,
    #[serde(rename = "type")]
    pub classification: Classification,
    pub saved: bool,
}

impl QueryResult {
    fn error(response: String) -> Self {
        Self {
            response,
            classification: Classification::Error,
            saved: false,
        }
    }
}

/// Secret availability plus initialization state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemStatus {
    #[serde(flatten)]
    pub secrets: SecretsStatus,
    pub initialized: bool,
    pub error: Option<String>,
}

/// The services a ready oracle dispatches to.
#[derive(Clone)]
pub struct Backends {
    pub language_model: Arc<dyn LanguageModel>,
    pub compute: Arc<dyn ComputeEngine>,
    pub recorder: Recorder,
}

pub struct Oracle {
    backends: Result<Backends, String>,
    secrets: SecretsStatus,
}

impl Oracle {
    /// Validate secrets and build the HTTP clients. A failure is stored, not returned.
    pub fn from_config(config: &IrisConfig, secrets: &Secrets) -> Self {
        match build_backends(config, secrets) {
            Ok(backends) => Self::new(secrets, backends),
            Err(reason) => Self::failed(reason, secrets.status()),
        }
    }

    /// Gate `backends` behind the credential check. When a required secret
    /// is missing the backends are dropped and the oracle stays unavailable.
    pub fn new(secrets: &Secrets, backends: Backends) -> Self {
        let status = secrets.status();
        match secrets.validate() {
            Ok(()) => {
                tracing::info!(
                    notes = backends.recorder.is_configured(),
                    "IRIS initialized"
                );
                Self::ready(backends, status)
            }
            Err(e) => Self::failed(e.to_string(), status),
        }
    }

    fn failed(reason: String, secrets: SecretsStatus) -> Self {
        tracing::error!(error = %reason, "IRIS initialization failed");
        Self::unavailable(reason, secrets)
    }

    pub fn ready(backends: Backends, secrets: SecretsStatus) -> Self {
        Self {
            backends: Ok(backends),
            secrets,
        }
    }

    pub fn unavailable(reason: impl Into<String>, secrets: SecretsStatus) -> Self {
        Self {
            backends: Err(reason.into()),
            secrets,
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.backends.is_ok()
    }

    pub fn init_error(&self) -> Option<&str> {
        self.backends.as_ref().err().map(String::as_str)
    }

    pub fn status(&self) -> SystemStatus {
        SystemStatus {
            secrets: self.secrets,
            initialized: self.is_initialized(),
            error: self.init_error().map(str::to_owned),
        }
    }

    /// Answer one query within a session.
    pub async fn process(&self, memory: &mut ConversationMemory, text: &str) -> QueryResult {
        let backends = match &self.backends {
            Ok(backends) => backends,
            Err(reason) => {
                return QueryResult::error(format!("IRIS is not initialized: {reason}"));
            }
        };

        let route = classify(text);
        let answer = match route {
            Route::Calculation => {
                tracing::info!("routing to compute engine");
                backends.compute.query(text).await
            }
            Route::Conversation => {
                tracing::info!(history = memory.len(), "routing to language model");
                backends.language_model.complete(text, memory.entries()).await
            }
        };

        let response = match answer {
            Ok(response) => response,
            Err(e) => return backend_failure(route, e),
        };

        let classification = Classification::from(route);
        memory.push(Exchange::new(text, response.clone(), classification));

        let saved = backends
            .recorder
            .record(text, &response, classification)
            .await;

        QueryResult {
            response,
            classification,
            saved,
        }
    }
}

fn backend_failure(route: Route, e: BackendError) -> QueryResult {
    tracing::warn!(route = ?route, error = %e, "backend call failed");
    QueryResult::error(format!("Sorry, I couldn't process your question: {e}"))
}

fn build_backends(config: &IrisConfig, secrets: &Secrets) -> Result<Backends, String> {
    secrets.validate().map_err(|e| e.to_string())?;

    // validate() guarantees the three required secrets.
    let (Some(openai_key), Some(wolfram_id), Some(notion_token)) = (
        &secrets.openai_api_key,
        &secrets.wolfram_app_id,
        &secrets.notion_token,
    ) else {
        return Err("required secrets missing".into());
    };

    let language_model = OpenAiClient::new(openai_key.as_str(), &config.openai)
        .map_err(|e| e.to_string())?;
    let compute = WolframClient::new(wolfram_id.as_str(), &config.wolfram)
        .map_err(|e| e.to_string())?;
    let notion: Arc<dyn NotesStore> = Arc::new(
        NotionClient::new(notion_token.as_str(), &config.notion).map_err(|e| e.to_string())?,
    );

    Ok(Backends {
        language_model: Arc::new(language_model),
        compute: Arc::new(compute),
        recorder: Recorder::new(Some(notion), secrets.notion_database_id.clone()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Availability;

    #[test]
    fn missing_secrets_leave_oracle_unavailable() {
        let oracle = Oracle::from_config(&IrisConfig::default(), &Secrets::default());
        assert!(!oracle.is_initialized());
        let status = oracle.status();
        assert_eq!(status.secrets.openai, Availability::Missing);
        assert!(status.error.unwrap().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn complete_secrets_initialize() {
        let secrets = Secrets {
            openai_api_key: Some("sk".into()),
            wolfram_app_id: Some("app".into()),
            notion_token: Some("secret".into()),
            notion_database_id: None,
        };
        let oracle = Oracle::from_config(&IrisConfig::default(), &secrets);
        assert!(oracle.is_initialized());
        assert!(oracle.init_error().is_none());
    }

    #[test]
    fn status_serializes_flat() {
        let oracle = Oracle::unavailable("boom", Secrets::default().status());
        let json = serde_json::to_value(oracle.status()).unwrap();
        assert_eq!(json["openai"], "missing");
        assert_eq!(json["initialized"], false);
        assert_eq!(json["error"], "boom");
    }

    #[tokio::test]
    async fn unavailable_oracle_short_circuits() {
        let oracle = Oracle::unavailable(
            "missing required secrets: OPENAI_API_KEY",
            Secrets::default().status(),
        );
        let mut memory = ConversationMemory::new();

        let result = oracle.process(&mut memory, "Calcule 2 + 2").await;
        assert_eq!(result.classification, Classification::Error);
        assert!(!result.saved);
        assert!(result.response.contains("OPENAI_API_KEY"));
        assert!(memory.is_empty());
    }
}
