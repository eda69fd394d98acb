//! HTTP client for the `/pacts` collection.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Response;
use serde::de::DeserializeOwned;
use tracing::instrument;
use url::Url;

use crate::error::RemoteError;
use crate::pact::{Pact, PactCreateRequest, PactQuery, PactUpdateRequest};

/// Connection settings for [`PactClient`].
#[derive(Debug, Clone)]
pub struct PactClientConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for PactClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

/// Thin wrapper over the REST endpoints. Cheap to clone; clones share the
/// underlying connection pool.
#[derive(Debug, Clone)]
pub struct PactClient {
    base_url: Url,
    client: Arc<reqwest::Client>,
}

impl PactClient {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::new_with_config(PactClientConfig {
            base_url: base_url.to_string(),
            ..PactClientConfig::default()
        })
    }

    pub fn new_with_config(config: PactClientConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("Invalid pact server URL: {}", config.base_url))?;
        if base_url.cannot_be_a_base() {
            anyhow::bail!("Pact server URL cannot be a base: {}", config.base_url);
        }

        let mut builder = reqwest::Client::builder();
        if !config.timeout.is_zero() {
            builder = builder.timeout(config.timeout);
        }
        let client = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            base_url,
            client: Arc::new(client),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `<base>/pacts[/<id>]`, keeping any path prefix on the base URL.
    fn endpoint(&self, id: Option<&str>) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("pacts");
            if let Some(id) = id {
                segments.push(id);
            }
        }
        url
    }

    /// Fetch pacts matching `query`. A 2xx body that is not a JSON array is
    /// treated as an empty list.
    #[instrument(skip(self), level = "debug")]
    pub async fn list(&self, query: &PactQuery) -> Result<Vec<Pact>, RemoteError> {
        let response = self
            .client
            .get(self.endpoint(None))
            .query(&query.to_query_pairs())
            .send()
            .await?;

        let body: serde_json::Value = handle_response(response).await?;
        match body {
            serde_json::Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| match serde_json::from_value::<Pact>(item) {
                    Ok(pact) => Some(pact),
                    Err(e) => {
                        tracing::warn!("Skipping malformed pact in list response: {}", e);
                        None
                    }
                })
                .collect()),
            other => {
                tracing::warn!(
                    "List response was not an array ({}), treating as empty",
                    json_kind(&other)
                );
                Ok(Vec::new())
            }
        }
    }

    #[instrument(skip(self), level = "debug")]
    pub async fn get(&self, id: &str) -> Result<Pact, RemoteError> {
        let response = self.client.get(self.endpoint(Some(id))).send().await?;
        handle_response(response).await
    }

    #[instrument(skip(self, request), level = "info")]
    pub async fn create(&self, request: &PactCreateRequest) -> Result<Pact, RemoteError> {
        let response = self
            .client
            .post(self.endpoint(None))
            .json(request)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Partial update via `PUT`. Only the fields set in `request` are sent.
    #[instrument(skip(self, request), level = "info")]
    pub async fn update(&self, id: &str, request: &PactUpdateRequest) -> Result<Pact, RemoteError> {
        let response = self
            .client
            .put(self.endpoint(Some(id)))
            .json(request)
            .send()
            .await?;
        handle_response(response).await
    }

    /// Delete a pact. The response body is ignored.
    #[instrument(skip(self), level = "info")]
    pub async fn delete(&self, id: &str) -> Result<(), RemoteError> {
        let response = self.client.delete(self.endpoint(Some(id))).send().await?;
        check_response(response).await?;
        Ok(())
    }
}

async fn check_response(response: Response) -> Result<Response, RemoteError> {
    let status = response.status();
    if status.is_success() {
        Ok(response)
    } else {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!("Pact server returned {}: {}", status, body);
        Err(RemoteError::HttpStatus(status.as_u16()))
    }
}

async fn handle_response<T: DeserializeOwned>(response: Response) -> Result<T, RemoteError> {
    let response = check_response(response).await?;
    let bytes = response.bytes().await?;
    serde_json::from_slice(&bytes).map_err(|e| RemoteError::Decode(e.to_string()))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "bool",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn test_endpoint_keeps_base_path() {
        let client = PactClient::new("http://example.test/api/").unwrap();
        assert_eq!(
            client.endpoint(Some("abc")).as_str(),
            "http://example.test/api/pacts/abc"
        );

        let client = PactClient::new("http://example.test").unwrap();
        assert_eq!(client.endpoint(None).as_str(), "http://example.test/pacts");
    }

    #[test]
    fn test_endpoint_escapes_id() {
        let client = PactClient::new("http://example.test").unwrap();
        assert_eq!(
            client.endpoint(Some("a/b")).as_str(),
            "http://example.test/pacts/a%2Fb"
        );
    }

    #[test]
    fn test_rejects_bad_base_url() {
        assert!(PactClient::new("not a url").is_err());
        assert!(PactClient::new("mailto:someone@example.test").is_err());
    }

    #[tokio::test]
    async fn test_list_sends_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pacts"))
            .and(query_param("sort", "desc"))
            .and(query_param("limit", "100"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
                {"id": "1", "name": "Run 5k", "description": "d", "date": null, "category": "health"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let client = PactClient::new(&server.uri()).unwrap();
        let pacts = client.list(&PactQuery::recent(100)).await.unwrap();
        assert_eq!(pacts.len(), 1);
        assert_eq!(pacts[0].category.as_deref(), Some("health"));
    }

    #[tokio::test]
    async fn test_list_object_body_is_empty() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pacts"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "detail": "unexpected"
            })))
            .mount(&server)
            .await;

        let client = PactClient::new(&server.uri()).unwrap();
        let pacts = client.list(&PactQuery::default()).await.unwrap();
        assert!(pacts.is_empty());
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/pacts/1"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = PactClient::new(&server.uri()).unwrap();
        let err = client.get("1").await.unwrap_err();
        assert!(matches!(err, RemoteError::Decode(_)));
    }

    #[tokio::test]
    async fn test_status_error_ignores_body() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .and(path("/pacts/gone"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(serde_json::json!({"detail": "Document not found"})),
            )
            .mount(&server)
            .await;

        let client = PactClient::new(&server.uri()).unwrap();
        assert_eq!(
            client.delete("gone").await.unwrap_err(),
            RemoteError::HttpStatus(404)
        );
    }
}
