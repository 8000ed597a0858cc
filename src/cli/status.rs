use std::time::Duration;

use crate::error::PlayerError;
use crate::format;
use crate::models::{ChurchEvent, Episode, GivingOption, NewsArticle, PaymentMethod, Series, VideoInfo};
use crate::player::{PlaybackSession, Visibility};

/// Glyph ramp for waveform amplitudes, quietest to loudest
const AMPLITUDE_RAMP: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Placeholder for the unplayed portion of the seek bar
const UNPLAYED_GLYPH: char = '░';

/// Width of the rendered waveform bar in columns
pub const WAVEFORM_COLUMNS: usize = 50;

/// Status display formatter for the CLI
pub struct StatusDisplay;

impl StatusDisplay {
    /// Display the player panel according to its visibility state
    pub fn display_player(session: Option<&PlaybackSession>) {
        match session {
            Some(session) if session.visibility == Visibility::Minimized => {
                Self::display_mini_player(session);
            }
            Some(session) => Self::display_full_player(session),
            None => {
                println!("┌─ Player ────────────────────────────────────────────────┐");
                println!("│ No episode loaded");
                println!("└─────────────────────────────────────────────────────────┘");
            }
        }
    }

    /// Full-size player chrome with the waveform seek bar
    pub fn display_full_player(session: &PlaybackSession) {
        let state = if session.playing { "Playing" } else { "Paused" };

        println!("┌─ Now Playing ───────────────────────────────────────────┐");
        println!("│ {}", Self::truncate(&session.episode.title, 55));
        println!("│ {}", Self::truncate(&session.episode.speaker, 55));
        if let Some(number) = session.episode.episode_number {
            println!("│ Episode {}", number);
        }
        println!("│");
        println!(
            "│ {}",
            Self::render_waveform(&session.waveform, session.elapsed, session.duration, WAVEFORM_COLUMNS)
        );
        println!(
            "│ {} / {}  ({}%)  [{}]",
            format::format_duration(session.elapsed),
            format::format_duration(session.duration),
            (session.progress() * 100.0) as u8,
            state
        );
        println!("└─────────────────────────────────────────────────────────┘");
    }

    /// One-line mini player
    pub fn display_mini_player(session: &PlaybackSession) {
        let state = if session.playing { "▶" } else { "⏸" };
        println!(
            "{} {} | {}/{}",
            state,
            Self::truncate(&session.episode.title, 40),
            format::format_duration(session.elapsed),
            format::format_duration(session.duration),
        );
    }

    /// Render the waveform seek bar: played columns keep their amplitude
    /// glyph, unplayed columns become placeholders.
    pub fn render_waveform(
        waveform: &[f32],
        elapsed: Duration,
        total: Duration,
        columns: usize,
    ) -> String {
        if waveform.is_empty() || columns == 0 {
            return String::new();
        }

        (0..columns)
            .map(|column| {
                let point = column * waveform.len() / columns;
                if crate::player::waveform::is_played(column, columns, elapsed, total) {
                    Self::amplitude_glyph(waveform[point])
                } else {
                    UNPLAYED_GLYPH
                }
            })
            .collect()
    }

    fn amplitude_glyph(amplitude: f32) -> char {
        let normalized = ((amplitude - 0.1) / 0.8).clamp(0.0, 1.0);
        let index = (normalized * (AMPLITUDE_RAMP.len() - 1) as f32).round() as usize;
        AMPLITUDE_RAMP[index.min(AMPLITUDE_RAMP.len() - 1)]
    }

    /// List series with filter context
    pub fn display_series_list(series: &[&Series], query: &str, category: &str) {
        if series.is_empty() {
            println!("No series match (search: '{}', category: '{}')", query, category);
            return;
        }
        println!("Series ({} shown, category '{}'):", series.len(), category);
        for item in series {
            println!(
                "  {}: {} - {} ({} episodes)",
                item.id,
                Self::truncate(&item.title, 40),
                item.speaker,
                item.total_episodes
            );
        }
    }

    /// List episodes, marking the one that is loaded
    pub fn display_episode_list(episodes: &[&Episode], now_playing: Option<&str>) {
        if episodes.is_empty() {
            println!("No episodes match the active filter");
            return;
        }
        println!("Episodes ({} shown):", episodes.len());
        for episode in episodes {
            let marker = if now_playing == Some(episode.id.as_str()) { "▶" } else { " " };
            let number = episode
                .episode_number
                .map(|n| format!("{}. ", n))
                .unwrap_or_default();
            println!(
                "{} {}: {}{} - {} [{}]",
                marker,
                episode.id,
                number,
                Self::truncate(&episode.title, 38),
                episode.speaker,
                episode.duration
            );
        }
    }

    pub fn display_events(events: &[ChurchEvent]) {
        if events.is_empty() {
            println!("No events found");
            return;
        }
        println!("Events:");
        for event in events {
            let mut line = format!(
                "  {} - {} at {}, {} ({})",
                format::format_event_date(event.date),
                Self::truncate(&event.title, 36),
                event.time,
                event.location,
                event.status
            );
            if event.accepts_registration() {
                line.push_str(" [registration open]");
            }
            println!("{}", line);
        }
    }

    pub fn display_news(articles: &[NewsArticle]) {
        if articles.is_empty() {
            println!("No news articles found");
            return;
        }
        println!("News:");
        for article in articles {
            let marker = if article.featured { "*" } else { " " };
            println!(
                "{} {} - {} ({}, {})",
                marker,
                Self::truncate(&article.title, 42),
                Self::truncate(article.preview(), 40),
                article.author,
                format::format_read_time(article.read_time)
            );
        }
    }

    pub fn display_videos(videos: &[VideoInfo]) {
        if videos.is_empty() {
            println!("No videos found");
            return;
        }
        println!("Channel videos:");
        for video in videos {
            println!(
                "  {} [{}] - {} ({})",
                Self::truncate(&video.title, 44),
                video.duration,
                video.view_count_label(),
                video.published_at.format("%Y-%m-%d")
            );
        }
    }

    pub fn display_giving(options: &[GivingOption], methods: &[PaymentMethod]) {
        if options.is_empty() {
            println!("No giving presets configured");
        } else {
            println!("Giving presets:");
            for option in options {
                let mut line = format!("  {}", format::format_currency(option.amount));
                if option.is_popular {
                    line.push_str(" (popular)");
                }
                println!("{}", line);
            }
        }

        if !methods.is_empty() {
            println!("Payment methods:");
            for method in methods {
                println!("  {} ({})", method.name, method.kind);
            }
        }
    }

    /// Display error message with formatting
    pub fn display_error(error: &PlayerError) {
        eprintln!("Error: {}", error.user_message());
    }

    /// Display error with recovery suggestions
    pub fn display_error_with_recovery(error: &PlayerError, recoverable: bool) {
        eprintln!("Error: {}", error.user_message());

        let suggestions = error.recovery_suggestions();
        if !suggestions.is_empty() {
            eprintln!("Suggestions:");
            for suggestion in suggestions {
                eprintln!("  - {}", suggestion);
            }
        }
        if recoverable {
            eprintln!("This usually clears up on retry.");
        }
    }

    /// Minimal error display for very early failures
    pub fn display_simple_error(error: &PlayerError) {
        eprintln!("Error: {}", error);
    }

    /// Truncate string to fit display width
    fn truncate(s: &str, max_len: usize) -> String {
        if s.chars().count() <= max_len {
            s.to_string()
        } else {
            let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
            format!("{}...", cut)
        }
    }
}
