//! OpenAI Chat Completions client.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{decode_json, http_client, send, BackendError, LanguageModel};
use crate::config::OpenAiConfig;
use crate::conversation::Exchange;

const SERVICE: &str = "OpenAI";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    fn new(role: &str, content: &str) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
    temperature: f32,
    system_prompt: Option<String>,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>, config: &OpenAiConfig) -> Result<Self, BackendError> {
        Ok(Self {
            client: http_client(SERVICE, config.timeout_secs)?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: api_key.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            system_prompt: config.system_prompt.clone(),
        })
    }

    /// System prompt, then each prior exchange as a user/assistant pair, then the prompt.
    pub fn build_messages(&self, prompt: &str, history: &[Exchange]) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() * 2 + 2);
        if let Some(system) = &self.system_prompt {
            messages.push(ChatMessage::new("system", system));
        }
        for exchange in history {
            messages.push(ChatMessage::new("user", &exchange.user));
            messages.push(ChatMessage::new("assistant", &exchange.assistant));
        }
        messages.push(ChatMessage::new("user", prompt));
        messages
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, prompt: &str, history: &[Exchange]) -> Result<String, BackendError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: self.build_messages(prompt, history),
            temperature: self.temperature,
        };

        tracing::debug!(model = %self.model, history = history.len(), "chat completion request");

        let response = send(
            SERVICE,
            self.client
                .post(&url)
                .bearer_auth(&self.api_key)
                .json(&request),
        )
        .await?;

        let body: ChatResponse = decode_json(SERVICE, response).await?;
        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or(BackendError::NoAnswer { service: SERVICE })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ERROR_BODY_MAX_CHARS;
    use crate::router::Classification;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> OpenAiClient {
        let config = OpenAiConfig {
            base_url: base_url.to_string(),
            ..OpenAiConfig::default()
        };
        OpenAiClient::new("sk-test", &config).unwrap()
    }

    #[test]
    fn messages_include_history_in_order() {
        let mut client = test_client("http://localhost");
        client.system_prompt = Some("You are IRIS.".into());
        let history = vec![Exchange::new("hi", "hello!", Classification::Conversation)];

        let messages = client.build_messages("and now?", &history);
        let roles: Vec<&str> = messages.iter().map(|m| m.role.as_str()).collect();
        assert_eq!(roles, ["system", "user", "assistant", "user"]);
        assert_eq!(messages[3].content, "and now?");
    }

    #[tokio::test]
    async fn complete_returns_first_choice() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(body_partial_json(serde_json::json!({"model": "gpt-3.5-turbo"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "choices": [{"message": {"role": "assistant", "content": "Bem, obrigado!"}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let answer = client.complete("Olá", &[]).await.unwrap();
        assert_eq!(answer, "Bem, obrigado!");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).complete("hi", &[]).await.unwrap_err();
        match err {
            BackendError::Status { status, body, .. } => {
                assert_eq!(status.as_u16(), 401);
                assert!(body.contains("invalid api key"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn oversized_error_body_is_capped() {
        let server = MockServer::start().await;
        let page = format!("<html>{}</html>", "x".repeat(5000));
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(502).set_body_string(page))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).complete("hi", &[]).await.unwrap_err();
        let message = err.to_string();
        assert!(message.starts_with("OpenAI returned HTTP 502"));
        assert!(message.chars().count() < ERROR_BODY_MAX_CHARS + 64);
        match err {
            BackendError::Status { body, .. } => {
                assert_eq!(body.chars().count(), ERROR_BODY_MAX_CHARS);
                assert!(body.starts_with("<html>"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn empty_choices_is_no_answer() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
            .mount(&server)
            .await;

        let err = test_client(&server.uri()).complete("hi", &[]).await.unwrap_err();
        assert!(matches!(err, BackendError::NoAnswer { .. }));
    }
}
