use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use super::{ContentStore, Document};
use crate::error::StoreError;
use crate::models::{ChurchEvent, Episode, EventStatus, GivingOption, NewsArticle, PaymentMethod, Series};

/// In-process content store.
///
/// Backs the test suites and stands in as the static sample dataset when no
/// remote store is configured. Updates are shallow merges: only the keys
/// present in the patch change.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store seeded with a small believable content set, dated relative to
    /// now so the "Recent" category has something to show
    pub fn with_sample_content() -> Self {
        let store = Self::new();
        store.seed(&sample_series(), &sample_episodes(), &sample_events());
        {
            let mut collections = store.collections.lock().unwrap();
            collections.insert(
                NewsArticle::COLLECTION.to_string(),
                sample_news().iter().map(|a| serde_json::to_value(a).unwrap()).collect(),
            );
            collections.insert(
                GivingOption::COLLECTION.to_string(),
                sample_giving().iter().map(|g| serde_json::to_value(g).unwrap()).collect(),
            );
            collections.insert(
                PaymentMethod::COLLECTION.to_string(),
                sample_payment_methods()
                    .iter()
                    .map(|m| serde_json::to_value(m).unwrap())
                    .collect(),
            );
        }
        store
    }

    fn seed(&self, series: &[Series], episodes: &[Episode], events: &[ChurchEvent]) {
        let mut collections = self.collections.lock().unwrap();
        collections.insert(
            Series::COLLECTION.to_string(),
            series.iter().map(|s| serde_json::to_value(s).unwrap()).collect(),
        );
        collections.insert(
            Episode::COLLECTION.to_string(),
            episodes.iter().map(|e| serde_json::to_value(e).unwrap()).collect(),
        );
        collections.insert(
            ChurchEvent::COLLECTION.to_string(),
            events.iter().map(|e| serde_json::to_value(e).unwrap()).collect(),
        );
    }

    fn doc_id(doc: &Value) -> Option<&str> {
        doc.get("id").and_then(|v| v.as_str()).filter(|s| !s.is_empty())
    }
}

#[async_trait]
impl ContentStore for MemoryStore {
    async fn list(&self, collection: &str) -> Result<Vec<Value>, StoreError> {
        let collections = self.collections.lock().unwrap();
        Ok(collections.get(collection).cloned().unwrap_or_default())
    }

    async fn get(&self, collection: &str, id: &str) -> Result<Value, StoreError> {
        let collections = self.collections.lock().unwrap();
        collections
            .get(collection)
            .and_then(|docs| docs.iter().find(|doc| Self::doc_id(doc) == Some(id)))
            .cloned()
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
    }

    async fn create(&self, collection: &str, mut doc: Value) -> Result<String, StoreError> {
        let id = match Self::doc_id(&doc) {
            Some(id) => id.to_string(),
            None => {
                let id = Uuid::new_v4().to_string();
                if let Some(object) = doc.as_object_mut() {
                    object.insert("id".to_string(), json!(id));
                }
                id
            }
        };

        let mut collections = self.collections.lock().unwrap();
        collections.entry(collection.to_string()).or_default().push(doc);
        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, patch: Value) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().unwrap();
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.iter_mut().find(|doc| Self::doc_id(doc) == Some(id)))
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        if let (Some(target), Some(changes)) = (doc.as_object_mut(), patch.as_object()) {
            for (key, value) in changes {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), StoreError> {
        let mut collections = self.collections.lock().unwrap();
        let docs = collections
            .get_mut(collection)
            .ok_or_else(|| StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })?;

        let before = docs.len();
        docs.retain(|doc| Self::doc_id(doc) != Some(id));
        if docs.len() == before {
            return Err(StoreError::NotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            });
        }
        Ok(())
    }
}

fn sample_series() -> Vec<Series> {
    vec![
        Series {
            id: "series-grace".to_string(),
            title: "Growing in Grace".to_string(),
            description: "A walk through Ephesians on what grace changes".to_string(),
            cover_image: "https://cdn.example.org/covers/grace.jpg".to_string(),
            speaker: "Pastor John Mensah".to_string(),
            total_episodes: 8,
            category: "Sunday Service".to_string(),
        },
        Series {
            id: "series-psalms".to_string(),
            title: "Songs in the Night".to_string(),
            description: "Morning devotions in the Psalms".to_string(),
            cover_image: "https://cdn.example.org/covers/psalms.jpg".to_string(),
            speaker: "Pastor Ama Owusu".to_string(),
            total_episodes: 12,
            category: "Morning Devotion".to_string(),
        },
    ]
}

fn sample_episodes() -> Vec<Episode> {
    let now = Utc::now();
    vec![
        Episode {
            id: "ep-grace-1".to_string(),
            title: "Walking in Grace".to_string(),
            speaker: "Pastor John Mensah".to_string(),
            description: "Opening message of the grace series".to_string(),
            media_url: "https://cdn.example.org/sermons/ep-grace-1.mp3".to_string(),
            download_url: Some("https://cdn.example.org/sermons/ep-grace-1.mp3".to_string()),
            duration: "42:15".to_string(),
            published_at: now - ChronoDuration::days(21),
            category: "Sunday Service".to_string(),
            series_id: Some("series-grace".to_string()),
            episode_number: Some(1),
            tags: Some(vec!["grace".to_string(), "ephesians".to_string()]),
            thumbnail_url: None,
        },
        Episode {
            id: "ep-grace-2".to_string(),
            title: "Saved Through Faith".to_string(),
            speaker: "Pastor John Mensah".to_string(),
            description: "Ephesians 2 and the gift none of us earned".to_string(),
            media_url: "https://cdn.example.org/sermons/ep-grace-2.mp3".to_string(),
            download_url: None,
            duration: "38:02".to_string(),
            published_at: now - ChronoDuration::days(14),
            category: "Sunday Service".to_string(),
            series_id: Some("series-grace".to_string()),
            episode_number: Some(2),
            tags: None,
            thumbnail_url: None,
        },
        Episode {
            id: "ep-grace-3".to_string(),
            title: "Grace at Home".to_string(),
            speaker: "Pastor John Mensah".to_string(),
            description: "What grace looks like around the dinner table".to_string(),
            media_url: "https://cdn.example.org/sermons/ep-grace-3.mp3".to_string(),
            download_url: None,
            duration: "45:40".to_string(),
            published_at: now - ChronoDuration::days(7),
            category: "Sunday Service".to_string(),
            series_id: Some("series-grace".to_string()),
            episode_number: Some(3),
            tags: None,
            thumbnail_url: None,
        },
        Episode {
            id: "ep-psalms-1".to_string(),
            title: "The Lord Is My Shepherd".to_string(),
            speaker: "Pastor Ama Owusu".to_string(),
            description: "Psalm 23 for anxious mornings".to_string(),
            media_url: "https://cdn.example.org/sermons/ep-psalms-1.mp3".to_string(),
            download_url: None,
            duration: "18:30".to_string(),
            published_at: now - ChronoDuration::days(90),
            category: "Morning Devotion".to_string(),
            series_id: Some("series-psalms".to_string()),
            episode_number: Some(1),
            tags: None,
            thumbnail_url: None,
        },
        Episode {
            id: "ep-standalone".to_string(),
            title: "Christmas Eve Message".to_string(),
            speaker: "Pastor John Mensah".to_string(),
            description: "A standalone holiday message".to_string(),
            media_url: "https://cdn.example.org/sermons/ep-standalone.mp3".to_string(),
            download_url: None,
            duration: "1:02:10".to_string(),
            published_at: now - ChronoDuration::days(200),
            category: "Special Service".to_string(),
            series_id: None,
            episode_number: None,
            tags: None,
            thumbnail_url: None,
        },
    ]
}

fn sample_events() -> Vec<ChurchEvent> {
    let today = Utc::now().date_naive();
    vec![
        ChurchEvent {
            id: "event-prayer".to_string(),
            title: "All-Night Prayer".to_string(),
            description: "Monthly prayer vigil".to_string(),
            date: today + ChronoDuration::days(10),
            time: "9:00 PM".to_string(),
            location: "Main Auditorium".to_string(),
            category: "Prayer".to_string(),
            registration_required: false,
            max_attendees: None,
            status: EventStatus::Upcoming,
            tags: None,
        },
        ChurchEvent {
            id: "event-retreat".to_string(),
            title: "Youth Retreat".to_string(),
            description: "Weekend retreat for the youth ministry".to_string(),
            date: today + ChronoDuration::days(45),
            time: "8:00 AM".to_string(),
            location: "Lakeside Camp".to_string(),
            category: "Youth".to_string(),
            registration_required: true,
            max_attendees: Some(120),
            status: EventStatus::Upcoming,
            tags: Some(vec!["youth".to_string()]),
        },
    ]
}

fn sample_news() -> Vec<NewsArticle> {
    vec![
        NewsArticle {
            id: "news-building".to_string(),
            title: "Building Fund Reaches Halfway Mark".to_string(),
            content: "Thanks to the generosity of the congregation, the new sanctuary fund has passed fifty percent of its goal.".to_string(),
            excerpt: "The sanctuary fund passes 50%".to_string(),
            author: "Communications Team".to_string(),
            category: "Announcements".to_string(),
            tags: None,
            read_time: 3,
            image_url: None,
            featured: true,
        },
        NewsArticle {
            id: "news-volunteers".to_string(),
            title: "Welcome Team Needs Volunteers".to_string(),
            content: "The welcome team is looking for greeters for the second service.".to_string(),
            excerpt: String::new(),
            author: "Volunteer Coordination".to_string(),
            category: "Serving".to_string(),
            tags: None,
            read_time: 2,
            image_url: None,
            featured: false,
        },
    ]
}

fn sample_giving() -> Vec<GivingOption> {
    vec![
        GivingOption { id: "give-20".to_string(), amount: 20, is_popular: false, is_big_button: false, order: 1, is_active: true },
        GivingOption { id: "give-50".to_string(), amount: 50, is_popular: true, is_big_button: false, order: 2, is_active: true },
        GivingOption { id: "give-100".to_string(), amount: 100, is_popular: false, is_big_button: true, order: 3, is_active: true },
        GivingOption { id: "give-500".to_string(), amount: 500, is_popular: false, is_big_button: true, order: 4, is_active: false },
    ]
}

fn sample_payment_methods() -> Vec<PaymentMethod> {
    vec![
        PaymentMethod {
            id: "pm-momo".to_string(),
            name: "Mobile Money".to_string(),
            kind: "momo".to_string(),
            icon: "phone".to_string(),
            is_active: true,
            order: 1,
        },
        PaymentMethod {
            id: "pm-card".to_string(),
            name: "Debit/Credit Card".to_string(),
            kind: "card".to_string(),
            icon: "card".to_string(),
            is_active: true,
            order: 2,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Validate;
    use crate::store::{create_document, get_document, list_documents};

    #[tokio::test]
    async fn test_create_and_get_round_trip() {
        let store = MemoryStore::new();

        let id = store
            .create("sermons", json!({"id": "ep-1", "title": "Test"}))
            .await
            .unwrap();
        assert_eq!(id, "ep-1");

        let doc = store.get("sermons", "ep-1").await.unwrap();
        assert_eq!(doc.get("title").and_then(|v| v.as_str()), Some("Test"));
    }

    #[tokio::test]
    async fn test_create_assigns_id_when_missing() {
        let store = MemoryStore::new();

        let id = store.create("sermons", json!({"title": "No id"})).await.unwrap();
        assert!(!id.is_empty());

        let doc = store.get("sermons", &id).await.unwrap();
        assert_eq!(doc.get("id").and_then(|v| v.as_str()), Some(id.as_str()));
    }

    #[tokio::test]
    async fn test_partial_update_merges_only_given_keys() {
        let store = MemoryStore::new();
        store
            .create("sermons", json!({"id": "ep-1", "title": "Old", "speaker": "Pastor John"}))
            .await
            .unwrap();

        store
            .update("sermons", "ep-1", json!({"title": "New"}))
            .await
            .unwrap();

        let doc = store.get("sermons", "ep-1").await.unwrap();
        assert_eq!(doc.get("title").and_then(|v| v.as_str()), Some("New"));
        assert_eq!(doc.get("speaker").and_then(|v| v.as_str()), Some("Pastor John"));
    }

    #[tokio::test]
    async fn test_missing_documents_report_not_found() {
        let store = MemoryStore::new();

        assert!(matches!(
            store.get("sermons", "nope").await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.update("sermons", "nope", json!({})).await,
            Err(StoreError::NotFound { .. })
        ));
        assert!(matches!(
            store.delete("sermons", "nope").await,
            Err(StoreError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_delete_removes_document() {
        let store = MemoryStore::new();
        store.create("sermons", json!({"id": "ep-1"})).await.unwrap();

        store.delete("sermons", "ep-1").await.unwrap();
        assert!(store.get("sermons", "ep-1").await.is_err());
        assert!(store.list("sermons").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_unknown_collection_is_empty() {
        let store = MemoryStore::new();
        assert!(store.list("unknown").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sample_content_decodes_into_models() {
        let store = MemoryStore::with_sample_content();

        let episodes: Vec<Episode> = list_documents(&store).await.unwrap();
        let series: Vec<Series> = list_documents(&store).await.unwrap();
        let events: Vec<ChurchEvent> = list_documents(&store).await.unwrap();
        let news: Vec<NewsArticle> = list_documents(&store).await.unwrap();
        let giving: Vec<GivingOption> = list_documents(&store).await.unwrap();
        let methods: Vec<PaymentMethod> = list_documents(&store).await.unwrap();

        assert!(!episodes.is_empty());
        assert!(!series.is_empty());
        assert!(!events.is_empty());
        assert!(!news.is_empty());
        assert!(!giving.is_empty());
        assert!(!methods.is_empty());

        // Every seeded record passes its own admin validation
        assert!(episodes.iter().all(|e| e.validate().is_ok()));
        assert!(series.iter().all(|s| s.validate().is_ok()));
    }

    #[tokio::test]
    async fn test_typed_helpers_round_trip() {
        let store = MemoryStore::new();
        let episode: Episode = {
            let mut episodes = sample_episodes();
            episodes.remove(0)
        };

        let id = create_document(&store, &episode).await.unwrap();
        assert_eq!(id, episode.id);

        let fetched: Episode = get_document(&store, &id).await.unwrap();
        assert_eq!(fetched, episode);
    }
}
