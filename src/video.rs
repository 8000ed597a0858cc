use std::time::Duration;

use chrono::{TimeZone, Utc};
use log::{debug, warn};
use reqwest::Client;

use crate::error::StoreError;
use crate::models::VideoInfo;

/// Cap applied when the caller does not ask for one
pub const DEFAULT_MAX_RESULTS: usize = 25;

/// Client for the video platform's channel listing.
///
/// Degrades to a fixed mock list whenever the platform is unreachable or no
/// API endpoint is configured; callers only ever see a plain list and cannot
/// tell fallback from live data.
pub struct VideoProvider {
    client: Client,
    api_url: Option<String>,
    channel_id: Option<String>,
}

impl VideoProvider {
    pub fn new(
        api_url: Option<String>,
        channel_id: Option<String>,
        timeout: Duration,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.map(|url| url.trim_end_matches('/').to_string()),
            channel_id,
        })
    }

    /// A provider with no platform behind it; every listing is the mock list
    pub fn unconfigured() -> Self {
        Self {
            client: Client::new(),
            api_url: None,
            channel_id: None,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.api_url.is_some() && self.channel_id.is_some()
    }

    /// List channel videos, optionally capped at `limit`
    pub async fn list_videos(&self, limit: Option<usize>) -> Vec<VideoInfo> {
        let videos = match self.fetch(limit).await {
            Ok(videos) => videos,
            Err(StoreError::Unconfigured) => {
                debug!("video platform not configured, serving mock listing");
                mock_videos()
            }
            Err(err) => {
                warn!("video listing failed, serving mock listing: {}", err);
                mock_videos()
            }
        };

        let limit = limit.unwrap_or(DEFAULT_MAX_RESULTS);
        videos.into_iter().take(limit).collect()
    }

    async fn fetch(&self, limit: Option<usize>) -> Result<Vec<VideoInfo>, StoreError> {
        let (api_url, channel_id) = match (&self.api_url, &self.channel_id) {
            (Some(api_url), Some(channel_id)) => (api_url, channel_id),
            _ => return Err(StoreError::Unconfigured),
        };

        let url = format!(
            "{}/channels/{}/videos?maxResults={}",
            api_url,
            channel_id,
            limit.unwrap_or(DEFAULT_MAX_RESULTS)
        );

        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(StoreError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(response.json().await?)
    }
}

/// Fixed listing used whenever the platform cannot be asked
pub fn mock_videos() -> Vec<VideoInfo> {
    let channel = "Grace Chapel".to_string();
    vec![
        VideoInfo {
            id: "mock-1".to_string(),
            title: "Sunday Celebration Service".to_string(),
            description: "Full replay of the Sunday celebration service".to_string(),
            thumbnail: "https://cdn.example.org/thumbs/mock-1.jpg".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 6, 28, 12, 0, 0).unwrap(),
            duration: "1:45:20".to_string(),
            view_count: 12_400,
            channel_title: channel.clone(),
        },
        VideoInfo {
            id: "mock-2".to_string(),
            title: "Midweek Bible Study: Romans 8".to_string(),
            description: "Verse-by-verse study".to_string(),
            thumbnail: "https://cdn.example.org/thumbs/mock-2.jpg".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 6, 24, 19, 0, 0).unwrap(),
            duration: "58:11".to_string(),
            view_count: 3_750,
            channel_title: channel.clone(),
        },
        VideoInfo {
            id: "mock-3".to_string(),
            title: "Worship Night Highlights".to_string(),
            description: String::new(),
            thumbnail: "https://cdn.example.org/thumbs/mock-3.jpg".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 6, 20, 21, 30, 0).unwrap(),
            duration: "12:45".to_string(),
            view_count: 28_900,
            channel_title: channel.clone(),
        },
        VideoInfo {
            id: "mock-4".to_string(),
            title: "Youth Conference Day 1".to_string(),
            description: "Opening night of the annual youth conference".to_string(),
            thumbnail: "https://cdn.example.org/thumbs/mock-4.jpg".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 6, 12, 18, 0, 0).unwrap(),
            duration: "2:05:33".to_string(),
            view_count: 8_120,
            channel_title: channel.clone(),
        },
        VideoInfo {
            id: "mock-5".to_string(),
            title: "Testimony: A Story of Restoration".to_string(),
            description: String::new(),
            thumbnail: "https://cdn.example.org/thumbs/mock-5.jpg".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 6, 5, 9, 0, 0).unwrap(),
            duration: "9:58".to_string(),
            view_count: 1_040_000,
            channel_title: channel,
        },
    ]
}
