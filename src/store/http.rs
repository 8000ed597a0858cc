use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde_json::Value;

use super::ContentStore;
use crate::error::StoreError;

/// Default timeout for store requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// REST client for the remote content store.
///
/// Collections map onto `{base}/{collection}` with GET/POST/PATCH/DELETE.
/// The client is stateless; fallback behavior on failure belongs to the
/// catalog layer, not here.
#[derive(Debug, Clone)]
pub struct HttpContentStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpContentStore {
    pub fn new(base_url: impl Into<String>) -> Result<Self, StoreError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
        })
    }

    /// Attach a bearer key sent with every request
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self, collection: &str) -> String {
        format!("{}/{}", self.base_url, collection)
    }

    fn document_url(&self, collection: &str, id: &str) -> String {
        format!("{}/{}/{}", self.base_url, collection, id)
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    async fn expect_success(
        response: Response,
        collection: &str,
        id: Option<&str>,
    ) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status.as_u16() == 404 {
            if let Some(id) = id {
                return Err(StoreError::NotFound {
                    collection: collection.to_string(),
                    id: id.to_string(),
                });
            }
        }
        let message = response.text().await.unwrap_or_default();
        Err(StoreError::Api {
            status: status.as_u16(),
            message,
        })
    }
}

#[async_trait]
impl ContentStore for HttpContentStore {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let request = self.authorize(self.client.get(self.collection_url(collection)));
        let response = Self::expect_success(request.send().await?, collection, None).await?;
        Ok(response.json().await?)
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        let request = self.authorize(self.client.get(self.document_url(collection, id)));
        let response = Self::expect_success(request.send().await?, collection, Some(id)).await?;
        Ok(response.json().await?)
    }

    async fn create(&self, collection: &str, doc: Value) -> Result<String, StoreError> {
        let request = self
            .authorize(self.client.post(self.collection_url(collection)))
            .json(&doc);
        let response = Self::expect_success(request.send().await?, collection, None).await?;

        // The store answers with the stored document; fall back to the
        // submitted id when the body carries none
        let created: Value = response.json().await.unwrap_or(Value::Null);
        let id = created
            .get("id")
            .and_then(|v| v.as_str())
            .or_else(|| doc.get("id").and_then(|v| v.as_str()))
            .unwrap_or_default()
            .to_string();
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let request = self
            .authorize(self.client.patch(self.document_url(collection, id)))
            .json(&patch);
        Self::expect_success(request.send().await?, collection, Some(id)).await?;
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let request = self.authorize(self.client.delete(self.document_url(collection, id)));
        Self::expect_success(request.send().await?, collection, Some(id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_construction() {
        let store = HttpContentStore::new("https://content.example.org/api/").unwrap();

        assert_eq!(store.base_url(), "https://content.example.org/api");
        assert_eq!(
            store.collection_url("sermons"),
            "https://content.example.org/api/sermons"
        );
        assert_eq!(
            store.document_url("sermons", "ep-1"),
            "https://content.example.org/api/sermons/ep-1"
        );
    }

    #[test]
    fn test_api_key_is_optional() {
        let store = HttpContentStore::new("https://content.example.org/api").unwrap();
        assert!(store.api_key.is_none());

        let store = store.with_api_key("secret");
        assert_eq!(store.api_key.as_deref(), Some("secret"));
    }
}
