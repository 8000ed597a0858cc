use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::format;

/// Admin-form validation applied before a record is written to the store
pub trait Validate {
    fn validate(&self) -> Result<(), ValidationError>;
}

/// A single playable sermon belonging (by reference) to at most one series
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Episode {
    pub id: String,
    pub title: String,
    pub speaker: String,
    #[serde(default)]
    pub description: String,
    pub media_url: String,
    #[serde(default)]
    pub download_url: Option<String>,
    /// Display duration as stored ("M:SS", "MM:SS" or "H:MM:SS")
    pub duration: String,
    pub published_at: DateTime<Utc>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub series_id: Option<String>,
    /// 1-based position within the series
    #[serde(default)]
    pub episode_number: Option<u32>,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl Episode {
    /// Whether this episode carries a series back-reference
    pub fn is_in_series(&self) -> bool {
        self.series_id.is_some()
    }

    /// Whether a downloadable copy of the media is available
    pub fn is_downloadable(&self) -> bool {
        self.download_url.is_some()
    }
}

impl Validate for Episode {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "title" });
        }
        if self.speaker.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "speaker" });
        }
        if self.media_url.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "mediaUrl" });
        }
        if !self.media_url.contains("://") {
            return Err(ValidationError::InvalidValue {
                field: "mediaUrl",
                reason: format!("'{}' is not a resolvable locator", self.media_url),
            });
        }
        if format::parse_duration(&self.duration).is_err() {
            return Err(ValidationError::InvalidValue {
                field: "duration",
                reason: format!("'{}' is not in M:SS or H:MM:SS form", self.duration),
            });
        }
        if self.episode_number == Some(0) {
            return Err(ValidationError::InvalidValue {
                field: "episodeNumber",
                reason: "episode numbers are 1-based".to_string(),
            });
        }
        Ok(())
    }
}

/// A named grouping of episodes sharing a speaker and category
///
/// A series never embeds its episodes; membership lives on the episode's
/// `series_id` field and is resolved through the content index.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Series {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub cover_image: String,
    pub speaker: String,
    /// Declared count; may exceed the number of episodes actually loaded
    pub total_episodes: u32,
    #[serde(default)]
    pub category: String,
}

impl Validate for Series {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "title" });
        }
        if self.speaker.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "speaker" });
        }
        if self.total_episodes == 0 {
            return Err(ValidationError::InvalidValue {
                field: "totalEpisodes",
                reason: "a series declares at least one episode".to_string(),
            });
        }
        Ok(())
    }
}

/// Lifecycle state of a church event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Upcoming => "upcoming",
            EventStatus::Ongoing => "ongoing",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scheduled church event
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ChurchEvent {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub date: NaiveDate,
    /// Display time such as "10:00 AM"
    pub time: String,
    pub location: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub registration_required: bool,
    #[serde(default)]
    pub max_attendees: Option<u32>,
    pub status: EventStatus,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

impl ChurchEvent {
    /// Whether attendees can still sign up
    pub fn accepts_registration(&self) -> bool {
        self.registration_required && self.status == EventStatus::Upcoming
    }
}

impl Validate for ChurchEvent {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "title" });
        }
        if self.location.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "location" });
        }
        if self.max_attendees == Some(0) {
            return Err(ValidationError::InvalidValue {
                field: "maxAttendees",
                reason: "capacity must be positive when set".to_string(),
            });
        }
        Ok(())
    }
}

/// A published news article
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewsArticle {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    pub author: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Option<Vec<String>>,
    /// Estimated reading time in minutes
    pub read_time: u32,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub featured: bool,
}

impl NewsArticle {
    /// The excerpt, or the leading content when no excerpt was written
    pub fn preview(&self) -> &str {
        if self.excerpt.trim().is_empty() {
            &self.content
        } else {
            &self.excerpt
        }
    }
}

impl Validate for NewsArticle {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "title" });
        }
        if self.content.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "content" });
        }
        if self.author.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "author" });
        }
        if self.read_time == 0 {
            return Err(ValidationError::InvalidValue {
                field: "readTime",
                reason: "reading time is at least one minute".to_string(),
            });
        }
        Ok(())
    }
}

/// A preset donation amount shown on the giving screen
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GivingOption {
    pub id: String,
    /// Whole currency units
    pub amount: u32,
    #[serde(default)]
    pub is_popular: bool,
    #[serde(default)]
    pub is_big_button: bool,
    pub order: u32,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl Validate for GivingOption {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.amount == 0 {
            return Err(ValidationError::InvalidValue {
                field: "amount",
                reason: "donation amounts are positive".to_string(),
            });
        }
        Ok(())
    }
}

/// A configured payment method for the giving flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
    pub order: u32,
}

impl Validate for PaymentMethod {
    fn validate(&self) -> Result<(), ValidationError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "name" });
        }
        if self.kind.trim().is_empty() {
            return Err(ValidationError::MissingField { field: "type" });
        }
        Ok(())
    }
}

fn default_active() -> bool {
    true
}

/// Metadata for one channel video from the video platform
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VideoInfo {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub thumbnail: String,
    pub published_at: DateTime<Utc>,
    /// Display duration as reported by the platform
    pub duration: String,
    pub view_count: u64,
    pub channel_title: String,
}

impl VideoInfo {
    /// Compact "views" label for list rows
    pub fn view_count_label(&self) -> String {
        format!("{} views", format::format_view_count(self.view_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_episode() -> Episode {
        Episode {
            id: "ep-1".to_string(),
            title: "Walking in Grace".to_string(),
            speaker: "Pastor John Mensah".to_string(),
            description: "First message of the grace series".to_string(),
            media_url: "https://cdn.example.org/sermons/ep-1.mp3".to_string(),
            download_url: None,
            duration: "42:15".to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 6, 14, 9, 0, 0).unwrap(),
            category: "Sunday Service".to_string(),
            series_id: Some("series-grace".to_string()),
            episode_number: Some(1),
            tags: None,
            thumbnail_url: None,
        }
    }

    #[test]
    fn test_episode_helpers() {
        let mut episode = sample_episode();
        assert!(episode.is_in_series());
        assert!(!episode.is_downloadable());

        episode.download_url = Some("https://cdn.example.org/sermons/ep-1.mp3".to_string());
        assert!(episode.is_downloadable());

        episode.series_id = None;
        assert!(!episode.is_in_series());
    }

    #[test]
    fn test_episode_validation() {
        assert!(sample_episode().validate().is_ok());

        let mut missing_title = sample_episode();
        missing_title.title = "  ".to_string();
        assert!(missing_title.validate().is_err());

        let mut bad_url = sample_episode();
        bad_url.media_url = "not-a-url".to_string();
        assert!(bad_url.validate().is_err());

        let mut bad_duration = sample_episode();
        bad_duration.duration = "forty minutes".to_string();
        assert!(bad_duration.validate().is_err());

        let mut zero_number = sample_episode();
        zero_number.episode_number = Some(0);
        assert!(zero_number.validate().is_err());
    }

    #[test]
    fn test_episode_wire_format_is_camel_case() {
        let json = serde_json::to_value(sample_episode()).unwrap();
        assert!(json.get("mediaUrl").is_some());
        assert!(json.get("publishedAt").is_some());
        assert!(json.get("seriesId").is_some());
        assert!(json.get("media_url").is_none());

        let back: Episode = serde_json::from_value(json).unwrap();
        assert_eq!(back, sample_episode());
    }

    #[test]
    fn test_series_validation() {
        let series = Series {
            id: "series-grace".to_string(),
            title: "Growing in Grace".to_string(),
            description: "A walk through Ephesians".to_string(),
            cover_image: "https://cdn.example.org/covers/grace.jpg".to_string(),
            speaker: "Pastor John Mensah".to_string(),
            total_episodes: 8,
            category: "Sunday Service".to_string(),
        };
        assert!(series.validate().is_ok());

        let mut empty = series.clone();
        empty.total_episodes = 0;
        assert!(empty.validate().is_err());

        let mut unnamed = series;
        unnamed.title = String::new();
        assert!(unnamed.validate().is_err());
    }

    #[test]
    fn test_event_status_serde_is_lowercase() {
        let json = serde_json::to_string(&EventStatus::Upcoming).unwrap();
        assert_eq!(json, "\"upcoming\"");
        let status: EventStatus = serde_json::from_str("\"cancelled\"").unwrap();
        assert_eq!(status, EventStatus::Cancelled);
    }

    #[test]
    fn test_event_registration_window() {
        let mut event = ChurchEvent {
            id: "ev-1".to_string(),
            title: "Youth Conference".to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 9, 12).unwrap(),
            time: "10:00 AM".to_string(),
            location: "Main Hall".to_string(),
            category: "Conference".to_string(),
            registration_required: true,
            max_attendees: Some(250),
            status: EventStatus::Upcoming,
            tags: None,
        };
        assert!(event.accepts_registration());

        event.status = EventStatus::Completed;
        assert!(!event.accepts_registration());

        event.status = EventStatus::Upcoming;
        event.registration_required = false;
        assert!(!event.accepts_registration());
    }

    #[test]
    fn test_event_validation() {
        let event = ChurchEvent {
            id: "ev-1".to_string(),
            title: "Prayer Night".to_string(),
            description: String::new(),
            date: NaiveDate::from_ymd_opt(2026, 8, 21).unwrap(),
            time: "7:00 PM".to_string(),
            location: "Chapel".to_string(),
            category: "Prayer".to_string(),
            registration_required: false,
            max_attendees: None,
            status: EventStatus::Upcoming,
            tags: None,
        };
        assert!(event.validate().is_ok());

        let mut capped_at_zero = event.clone();
        capped_at_zero.max_attendees = Some(0);
        assert!(capped_at_zero.validate().is_err());

        let mut nowhere = event;
        nowhere.location = String::new();
        assert!(nowhere.validate().is_err());
    }

    #[test]
    fn test_news_preview_falls_back_to_content() {
        let mut article = NewsArticle {
            id: "news-1".to_string(),
            title: "New Building Fund".to_string(),
            content: "The building committee announced...".to_string(),
            excerpt: "Fund launch".to_string(),
            author: "Communications Team".to_string(),
            category: "Announcements".to_string(),
            tags: None,
            read_time: 3,
            image_url: None,
            featured: true,
        };
        assert_eq!(article.preview(), "Fund launch");

        article.excerpt = String::new();
        assert_eq!(article.preview(), "The building committee announced...");
    }

    #[test]
    fn test_news_validation() {
        let article = NewsArticle {
            id: "news-1".to_string(),
            title: "New Building Fund".to_string(),
            content: "The building committee announced...".to_string(),
            excerpt: String::new(),
            author: "Communications Team".to_string(),
            category: "Announcements".to_string(),
            tags: None,
            read_time: 3,
            image_url: None,
            featured: false,
        };
        assert!(article.validate().is_ok());

        let mut unread = article;
        unread.read_time = 0;
        assert!(unread.validate().is_err());
    }

    #[test]
    fn test_giving_option_validation() {
        let option = GivingOption {
            id: "give-50".to_string(),
            amount: 50,
            is_popular: true,
            is_big_button: false,
            order: 2,
            is_active: true,
        };
        assert!(option.validate().is_ok());

        let mut zero = option;
        zero.amount = 0;
        assert!(zero.validate().is_err());
    }

    #[test]
    fn test_payment_method_type_field_name() {
        let method = PaymentMethod {
            id: "pm-momo".to_string(),
            name: "Mobile Money".to_string(),
            kind: "momo".to_string(),
            icon: "phone".to_string(),
            is_active: true,
            order: 1,
        };
        assert!(method.validate().is_ok());

        let json = serde_json::to_value(&method).unwrap();
        assert_eq!(json.get("type").and_then(|v| v.as_str()), Some("momo"));
    }

    #[test]
    fn test_video_view_count_label() {
        let video = VideoInfo {
            id: "vid-1".to_string(),
            title: "Sunday Live Stream".to_string(),
            description: String::new(),
            thumbnail: String::new(),
            published_at: Utc.with_ymd_and_hms(2026, 5, 3, 10, 0, 0).unwrap(),
            duration: "1:24:05".to_string(),
            view_count: 15_300,
            channel_title: "Grace Chapel".to_string(),
        };
        assert_eq!(video.view_count_label(), "15.3K views");
    }
}
