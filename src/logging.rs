use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, error, info, warn};

/// Playback/content event for logging and debugging
#[derive(Debug, Clone)]
pub struct PlayerLogEvent {
    pub timestamp: DateTime<Utc>,
    pub event_type: PlayerEventType,
    pub details: String,
}

#[derive(Debug, Clone)]
pub enum PlayerEventType {
    PlaybackStarted,
    PlaybackPaused,
    PlaybackStopped,
    EpisodeChanged,
    EpisodeFinished,
    SeekOperation,
    MediaError,
    StoreFallback,
    ContentRefreshed,
}

impl PlayerEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlayerEventType::PlaybackStarted => "PLAYBACK_STARTED",
            PlayerEventType::PlaybackPaused => "PLAYBACK_PAUSED",
            PlayerEventType::PlaybackStopped => "PLAYBACK_STOPPED",
            PlayerEventType::EpisodeChanged => "EPISODE_CHANGED",
            PlayerEventType::EpisodeFinished => "EPISODE_FINISHED",
            PlayerEventType::SeekOperation => "SEEK_OPERATION",
            PlayerEventType::MediaError => "MEDIA_ERROR",
            PlayerEventType::StoreFallback => "STORE_FALLBACK",
            PlayerEventType::ContentRefreshed => "CONTENT_REFRESHED",
        }
    }
}

/// Logger keeping a bounded history of player operations
#[derive(Clone)]
pub struct PlaybackLogger {
    events: Arc<Mutex<VecDeque<PlayerLogEvent>>>,
    max_events: usize,
}

impl PlaybackLogger {
    pub fn new() -> Self {
        Self {
            events: Arc::new(Mutex::new(VecDeque::new())),
            max_events: 1000, // Keep last 1000 events
        }
    }

    /// Initialize logging system with appropriate log level
    pub fn init() -> Result<(), Box<dyn std::error::Error>> {
        let log_level =
            std::env::var("CHURCH_PLAYER_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let mut builder = env_logger::Builder::new();

        builder.format(|buf, record| {
            use std::io::Write;
            writeln!(
                buf,
                "{} [{}] [{}:{}] {}",
                chrono::Utc::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.file().unwrap_or("unknown"),
                record.line().unwrap_or(0),
                record.args()
            )
        });

        match log_level.to_lowercase().as_str() {
            "trace" => builder.filter_level(log::LevelFilter::Trace),
            "debug" => builder.filter_level(log::LevelFilter::Debug),
            "info" => builder.filter_level(log::LevelFilter::Info),
            "warn" => builder.filter_level(log::LevelFilter::Warn),
            "error" => builder.filter_level(log::LevelFilter::Error),
            _ => builder.filter_level(log::LevelFilter::Info),
        };

        builder.try_init()?;

        info!("Player logging initialized with level: {}", log_level);
        Ok(())
    }

    /// Log a player event
    pub fn log_event(&self, event_type: PlayerEventType, details: String) {
        let event = PlayerLogEvent {
            timestamp: Utc::now(),
            event_type: event_type.clone(),
            details: details.clone(),
        };

        {
            let mut events = self.events.lock().unwrap();
            events.push_back(event);
            while events.len() > self.max_events {
                events.pop_front();
            }
        }

        match event_type {
            PlayerEventType::PlaybackStarted
            | PlayerEventType::PlaybackPaused
            | PlayerEventType::PlaybackStopped
            | PlayerEventType::EpisodeChanged
            | PlayerEventType::EpisodeFinished
            | PlayerEventType::ContentRefreshed => {
                info!("[{}] {}", event_type.as_str(), details);
            }
            PlayerEventType::SeekOperation => {
                debug!("[{}] {}", event_type.as_str(), details);
            }
            PlayerEventType::StoreFallback => {
                warn!("[{}] {}", event_type.as_str(), details);
            }
            PlayerEventType::MediaError => {
                error!("[{}] {}", event_type.as_str(), details);
            }
        }
    }

    /// Log playback started event
    pub fn log_playback_started(&self, episode_title: &str, speaker: &str) {
        self.log_event(
            PlayerEventType::PlaybackStarted,
            format!("Started playing: {} ({})", episode_title, speaker),
        );
    }

    /// Log playback paused event
    pub fn log_playback_paused(&self, position: Duration) {
        self.log_event(
            PlayerEventType::PlaybackPaused,
            format!("Playback paused at position: {:.2}s", position.as_secs_f64()),
        );
    }

    /// Log playback stopped event
    pub fn log_playback_stopped(&self, reason: &str) {
        self.log_event(
            PlayerEventType::PlaybackStopped,
            format!("Playback stopped: {}", reason),
        );
    }

    /// Log episode change event
    pub fn log_episode_changed(&self, from_episode: Option<&str>, to_episode: &str) {
        let details = match from_episode {
            Some(from) => format!("Episode changed from '{}' to '{}'", from, to_episode),
            None => format!("Episode loaded: '{}'", to_episode),
        };
        self.log_event(PlayerEventType::EpisodeChanged, details);
    }

    /// Log seek operation
    pub fn log_seek_operation(&self, from_position: Duration, to_position: Duration) {
        self.log_event(
            PlayerEventType::SeekOperation,
            format!(
                "Seek from {:.2}s to {:.2}s",
                from_position.as_secs_f64(),
                to_position.as_secs_f64()
            ),
        );
    }

    /// Log media acquisition failure
    pub fn log_media_error(&self, media_url: &str, error: &str) {
        self.log_event(
            PlayerEventType::MediaError,
            format!("Media error for '{}': {}", media_url, error),
        );
    }

    /// Log a store fetch that fell back to a default value
    pub fn log_store_fallback(&self, collection: &str, error: &str) {
        self.log_event(
            PlayerEventType::StoreFallback,
            format!("Fetch of '{}' failed, using fallback: {}", collection, error),
        );
    }

    /// Get recent events for debugging
    pub fn get_recent_events(&self, count: usize) -> Vec<PlayerLogEvent> {
        let events = self.events.lock().unwrap();
        events
            .iter()
            .rev()
            .take(count)
            .cloned()
            .collect::<Vec<_>>()
            .into_iter()
            .rev()
            .collect()
    }

    /// Clear event history
    pub fn clear_events(&self) {
        let mut events = self.events.lock().unwrap();
        events.clear();
    }

    /// Get event statistics
    pub fn get_event_statistics(&self) -> EventStatistics {
        let events = self.events.lock().unwrap();
        let mut stats = EventStatistics::new();

        for event in events.iter() {
            match event.event_type {
                PlayerEventType::SeekOperation => stats.seek_operations += 1,
                PlayerEventType::MediaError => stats.media_errors += 1,
                PlayerEventType::StoreFallback => stats.store_fallbacks += 1,
                PlayerEventType::EpisodeChanged => stats.episode_changes += 1,
                _ => {}
            }
        }

        stats.total_events = events.len();
        stats
    }
}

impl Default for PlaybackLogger {
    fn default() -> Self {
        Self::new()
    }
}

/// Statistics about logged events
#[derive(Debug, Clone)]
pub struct EventStatistics {
    pub total_events: usize,
    pub seek_operations: usize,
    pub media_errors: usize,
    pub store_fallbacks: usize,
    pub episode_changes: usize,
}

impl EventStatistics {
    pub fn new() -> Self {
        Self {
            total_events: 0,
            seek_operations: 0,
            media_errors: 0,
            store_fallbacks: 0,
            episode_changes: 0,
        }
    }
}
