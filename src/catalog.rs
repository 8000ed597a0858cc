use std::sync::Arc;

use log::warn;
use serde_json::Value;

use crate::error::{PlayerError, StoreError};
use crate::logging::PlaybackLogger;
use crate::models::{
    ChurchEvent, Episode, GivingOption, NewsArticle, PaymentMethod, Series, Validate,
};
use crate::store::{self, ContentStore, Document};

/// Service layer over the content store.
///
/// List operations never fail the caller: a store error is logged and
/// swallowed into an empty list. Admin operations are the opposite — they
/// validate first and surface every failure, with no automatic retry.
pub struct Catalog {
    store: Arc<dyn ContentStore>,
    logger: PlaybackLogger,
}

impl Catalog {
    pub fn new(store: Arc<dyn ContentStore>, logger: PlaybackLogger) -> Self {
        Self { store, logger }
    }

    pub fn store(&self) -> &Arc<dyn ContentStore> {
        &self.store
    }

    /// All sermons, newest first
    pub async fn episodes(&self) -> Vec<Episode> {
        let mut episodes = self.list_or_empty::<Episode>().await;
        episodes.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        episodes
    }

    /// All series, alphabetical
    pub async fn series(&self) -> Vec<Series> {
        let mut series = self.list_or_empty::<Series>().await;
        series.sort_by(|a, b| a.title.cmp(&b.title));
        series
    }

    /// Episodes belonging to one series, by episode number
    pub async fn episodes_for_series(&self, series_id: &str) -> Vec<Episode> {
        let mut episodes: Vec<Episode> = self
            .list_or_empty::<Episode>()
            .await
            .into_iter()
            .filter(|episode| episode.series_id.as_deref() == Some(series_id))
            .collect();
        episodes.sort_by_key(|episode| episode.episode_number.unwrap_or(u32::MAX));
        episodes
    }

    /// Upcoming-to-past event listing, by date
    pub async fn events(&self) -> Vec<ChurchEvent> {
        let mut events = self.list_or_empty::<ChurchEvent>().await;
        events.sort_by_key(|event| event.date);
        events
    }

    /// News listing, featured articles first
    pub async fn news(&self) -> Vec<NewsArticle> {
        let mut articles = self.list_or_empty::<NewsArticle>().await;
        articles.sort_by_key(|article| !article.featured);
        articles
    }

    /// Active giving presets in display order
    pub async fn giving_options(&self) -> Vec<GivingOption> {
        let mut options: Vec<GivingOption> = self
            .list_or_empty::<GivingOption>()
            .await
            .into_iter()
            .filter(|option| option.is_active)
            .collect();
        options.sort_by_key(|option| option.order);
        options
    }

    /// Active payment methods in display order
    pub async fn payment_methods(&self) -> Vec<PaymentMethod> {
        let mut methods: Vec<PaymentMethod> = self
            .list_or_empty::<PaymentMethod>()
            .await
            .into_iter()
            .filter(|method| method.is_active)
            .collect();
        methods.sort_by_key(|method| method.order);
        methods
    }

    pub async fn get_episode(&self, id: &str) -> Result<Episode, PlayerError> {
        Ok(store::get_document::<Episode>(self.store.as_ref(), id).await?)
    }

    /// Create a record after validating it
    pub async fn create<T: Document + Validate>(&self, doc: &T) -> Result<String, PlayerError> {
        doc.validate()?;
        Ok(store::create_document(self.store.as_ref(), doc).await?)
    }

    /// Apply a partial update, validating the document it would produce
    /// before anything is written
    pub async fn update<T: Document + Validate>(
        &self,
        id: &str,
        patch: Value,
    ) -> Result<(), PlayerError> {
        let current = store::get_document::<T>(self.store.as_ref(), id).await?;
        let mut merged = serde_json::to_value(&current).map_err(StoreError::from)?;
        if let (Some(target), Some(changes)) = (merged.as_object_mut(), patch.as_object()) {
            for (key, value) in changes {
                target.insert(key.clone(), value.clone());
            }
        }
        let updated: T = serde_json::from_value(merged).map_err(StoreError::from)?;
        updated.validate()?;

        store::update_document::<T>(self.store.as_ref(), id, patch).await?;
        Ok(())
    }

    pub async fn delete<T: Document>(&self, id: &str) -> Result<(), PlayerError> {
        store::delete_document::<T>(self.store.as_ref(), id).await?;
        Ok(())
    }

    async fn list_or_empty<T: Document>(&self) -> Vec<T> {
        match store::list_documents::<T>(self.store.as_ref()).await {
            Ok(documents) => documents,
            Err(err) => {
                warn!("listing '{}' failed: {}", T::COLLECTION, err);
                self.logger.log_store_fallback(T::COLLECTION, &err.to_string());
                Vec::new()
            }
        }
    }
}
