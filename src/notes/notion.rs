//! Notion `pages.create` client.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use serde_json::{json, Map, Value};

use super::{NotesStore, NotionRecord};
use crate::backend::{send, BackendError};
use crate::config::NotionConfig;

const SERVICE: &str = "Notion";

#[derive(Debug, Clone)]
pub struct NotionClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
    title_property: String,
    type_property: String,
    response_property: String,
}

impl NotionClient {
    pub fn new(token: impl Into<String>, config: &NotionConfig) -> Result<Self, BackendError> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Notion-Version",
            HeaderValue::from_str(&config.api_version).map_err(|e| BackendError::Rejected {
                service: SERVICE,
                message: format!("invalid API version header value: {e}"),
            })?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|source| BackendError::Http {
                service: SERVICE,
                source,
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            title_property: config.title_property.clone(),
            type_property: config.type_property.clone(),
            response_property: config.response_property.clone(),
        })
    }

    /// Request body for creating `record` as a row of `database_id`.
    pub fn page_body(&self, database_id: &str, record: &NotionRecord) -> Value {
        let mut properties = Map::new();
        properties.insert(
            self.title_property.clone(),
            json!({"title": [{"text": {"content": record.title}}]}),
        );
        properties.insert(
            self.type_property.clone(),
            json!({"select": {"name": record.kind.as_str()}}),
        );
        properties.insert(
            self.response_property.clone(),
            json!({"rich_text": [{"text": {"content": record.response}}]}),
        );

        json!({
            "parent": {"database_id": database_id},
            "properties": properties,
        })
    }
}

#[async_trait]
impl NotesStore for NotionClient {
    async fn create_page(
        &self,
        database_id: &str,
        record: &NotionRecord,
    ) -> Result<(), BackendError> {
        let url = format!("{}/pages", self.base_url);
        send(
            SERVICE,
            self.client
                .post(&url)
                .bearer_auth(&self.token)
                .json(&self.page_body(database_id, record)),
        )
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::router::Classification;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> NotionClient {
        let config = NotionConfig {
            base_url: base_url.to_string(),
            ..NotionConfig::default()
        };
        NotionClient::new("secret_abc", &config).unwrap()
    }

    #[test]
    fn body_uses_configured_property_names() {
        let client = test_client("http://localhost");
        let record = NotionRecord::new("Calcule 2 + 2", "4", Classification::Calculation);
        let body = client.page_body("db-1", &record);

        assert_eq!(body["parent"]["database_id"], "db-1");
        assert_eq!(
            body["properties"]["Título"]["title"][0]["text"]["content"],
            "Calcule 2 + 2"
        );
        assert_eq!(body["properties"]["Tipo"]["select"]["name"], "calculation");
        assert_eq!(
            body["properties"]["Resposta"]["rich_text"][0]["text"]["content"],
            "4"
        );
    }

    #[tokio::test]
    async fn create_page_posts_with_auth_and_version() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/pages"))
            .and(header("authorization", "Bearer secret_abc"))
            .and(header("notion-version", "2022-06-28"))
            .and(body_partial_json(json!({"parent": {"database_id": "db-1"}})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"object": "page"})))
            .expect(1)
            .mount(&server)
            .await;

        let record = NotionRecord::new("hi", "hello", Classification::Conversation);
        test_client(&server.uri())
            .create_page("db-1", &record)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn rejected_page_is_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_string("validation_error"))
            .mount(&server)
            .await;

        let record = NotionRecord::new("hi", "hello", Classification::Conversation);
        let err = test_client(&server.uri())
            .create_page("db-1", &record)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("400"));
    }
}
