use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::StoreError;
use crate::models::{ChurchEvent, Episode, GivingOption, NewsArticle, PaymentMethod, Series};

pub mod http;
pub mod memory;

pub use http::HttpContentStore;
pub use memory::MemoryStore;

/// A typed record living in one named store collection
pub trait Document: Serialize + DeserializeOwned {
    const COLLECTION: &'static str;

    fn id(&self) -> &str;
}

impl Document for Episode {
    const COLLECTION: &'static str = "sermons";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for Series {
    const COLLECTION: &'static str = "series";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for ChurchEvent {
    const COLLECTION: &'static str = "events";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for NewsArticle {
    const COLLECTION: &'static str = "news";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for GivingOption {
    const COLLECTION: &'static str = "givingOptions";

    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for PaymentMethod {
    const COLLECTION: &'static str = "paymentMethods";

    fn id(&self) -> &str {
        &self.id
    }
}

/// The remote document database, seen as raw JSON collections.
///
/// Every operation is atomic at the single-document level; there are no
/// cross-document transactions. Typed access goes through the generic
/// helpers below.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// List every document in a collection, in the store's natural order
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError>;

    async fn get(&self, collection: &str, id: &str) -> Result<Value, StoreError>;

    /// Create a document, returning its id (assigned by the store when the
    /// document does not carry one)
    async fn create(&self, collection: &str, doc: Value) -> Result<String, StoreError>;

    /// Partial update: only the keys present in `patch` change
    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError>;

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError>;
}

/// Fetch and decode a whole collection. Documents that fail to decode are an
/// error; partial results are never returned silently.
pub async fn list_documents<T: Document>(store: &dyn ContentStore) -> Result<Vec<T>, StoreError> {
    let raw = store.list(T::COLLECTION).await?;
    raw.into_iter()
        .map(|doc| serde_json::from_value(doc).map_err(StoreError::from))
        .collect()
}

pub async fn get_document<T: Document>(
    store: &dyn ContentStore,
    id: &str,
) -> Result<T, StoreError> {
    let raw = store.get(T::COLLECTION, id).await?;
    Ok(serde_json::from_value(raw)?)
}

pub async fn create_document<T: Document>(
    store: &dyn ContentStore,
    doc: &T,
) -> Result<String, StoreError> {
    store.create(T::COLLECTION, serde_json::to_value(doc)?).await
}

pub async fn update_document<T: Document>(
    store: &dyn ContentStore,
    id: &str,
    patch: Value,
) -> Result<(), StoreError> {
    store.update(T::COLLECTION, id, patch).await
}

pub async fn delete_document<T: Document>(
    store: &dyn ContentStore,
    id: &str,
) -> Result<(), StoreError> {
    store.delete(T::COLLECTION, id).await
}
