use std::time::Duration;

use log::{debug, info};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

use crate::error::PlaybackError;
use crate::format;
use crate::models::Episode;

pub mod runtime;
pub mod waveform;

use runtime::{AudioHandle, AudioRuntime, RuntimeStatus};

/// Default transport skip step
pub const DEFAULT_SKIP_STEP: Duration = Duration::from_secs(15);

/// UI visibility of the playback chrome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Hidden,
    Minimized,
    Expanded,
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Hidden => "hidden",
            Visibility::Minimized => "minimized",
            Visibility::Expanded => "expanded",
        }
    }
}

/// Normalized progress snapshot republished to subscribers
#[derive(Debug, Clone, PartialEq)]
pub struct PositionUpdate {
    pub episode_id: String,
    pub elapsed: Duration,
    pub duration: Duration,
    pub playing: bool,
}

impl PositionUpdate {
    /// Progress as a fraction in [0.0, 1.0]
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            0.0
        } else {
            (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        }
    }
}

/// Events observable by screens subscribed to the engine
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Position(PositionUpdate),
    Ended { episode_id: String },
}

/// Render snapshot of the one active session
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    pub episode: Episode,
    pub elapsed: Duration,
    pub duration: Duration,
    pub playing: bool,
    pub waveform: Vec<f32>,
    pub visibility: Visibility,
}

impl PlaybackSession {
    pub fn progress(&self) -> f32 {
        if self.duration.is_zero() {
            0.0
        } else {
            (self.elapsed.as_secs_f32() / self.duration.as_secs_f32()).min(1.0)
        }
    }

    pub fn remaining(&self) -> Duration {
        self.duration.saturating_sub(self.elapsed)
    }
}

struct ActiveSession {
    episode: Episode,
    elapsed: Duration,
    duration: Duration,
    playing: bool,
    waveform: Vec<f32>,
    handle: Box<dyn AudioHandle>,
}

/// Mediates all transport operations against the single shared playback
/// resource and republishes normalized progress to subscribers.
///
/// At most one session exists at any time; loading a new episode always
/// releases the previous resource before acquiring the next one.
pub struct PlaybackEngine {
    runtime: Box<dyn AudioRuntime>,
    session: Option<ActiveSession>,
    visibility: Visibility,
    status_rx: Option<UnboundedReceiver<RuntimeStatus>>,
    subscribers: Vec<UnboundedSender<PlayerEvent>>,
    loading: bool,
    skip_step: Duration,
}

impl PlaybackEngine {
    pub fn new(runtime: Box<dyn AudioRuntime>) -> Self {
        Self {
            runtime,
            session: None,
            visibility: Visibility::Hidden,
            status_rx: None,
            subscribers: Vec::new(),
            loading: false,
            skip_step: DEFAULT_SKIP_STEP,
        }
    }

    pub fn with_skip_step(runtime: Box<dyn AudioRuntime>, skip_step: Duration) -> Self {
        let mut engine = Self::new(runtime);
        engine.skip_step = skip_step;
        engine
    }

    /// Play an episode.
    ///
    /// On the already-loaded episode this toggles pause/resume without
    /// touching the resource. On a different episode the previous resource is
    /// released first, the declared duration parsed, a fresh waveform drawn,
    /// and the new resource acquired auto-playing with the chrome expanded.
    /// Acquisition failure surfaces to the caller and leaves no session.
    pub async fn play(&mut self, episode: Episode) -> Result<(), PlaybackError> {
        if self.loading {
            return Err(PlaybackError::OperationInFlight);
        }

        if let Some(session) = self.session.as_mut() {
            if session.episode.id == episode.id {
                if session.playing {
                    session.handle.pause()?;
                    session.playing = false;
                    debug!("paused '{}'", session.episode.title);
                } else {
                    session.handle.resume()?;
                    session.playing = true;
                    debug!("resumed '{}'", session.episode.title);
                }
                return Ok(());
            }
        }

        // Previous resource goes away before the next one is acquired, even
        // if that acquisition then fails
        self.release_session();

        let duration = format::parse_duration(&episode.duration)?;

        self.loading = true;
        let (status_tx, status_rx) = unbounded_channel();
        let acquired = self.runtime.acquire(&episode.media_url, duration, status_tx).await;
        self.loading = false;

        let handle = acquired?;

        info!("now playing '{}' ({})", episode.title, episode.speaker);
        self.session = Some(ActiveSession {
            episode,
            elapsed: Duration::ZERO,
            duration,
            playing: true,
            waveform: waveform::generate(),
            handle,
        });
        self.status_rx = Some(status_rx);
        self.visibility = Visibility::Expanded;
        Ok(())
    }

    /// Pause the loaded episode
    pub fn pause(&mut self) -> Result<(), PlaybackError> {
        let session = self.session.as_mut().ok_or(PlaybackError::NoSession)?;
        if session.playing {
            session.handle.pause()?;
            session.playing = false;
        }
        Ok(())
    }

    /// Resume the loaded episode
    pub fn resume(&mut self) -> Result<(), PlaybackError> {
        let session = self.session.as_mut().ok_or(PlaybackError::NoSession)?;
        if !session.playing {
            session.handle.resume()?;
            session.playing = true;
        }
        Ok(())
    }

    /// Seek to a position, clamped into `[0, duration]`. No-op without a
    /// session. The handle speaks milliseconds; conversion happens here.
    pub fn seek(&mut self, position: Duration) -> Result<(), PlaybackError> {
        let Some(session) = self.session.as_mut() else {
            return Ok(());
        };

        let clamped = position.min(session.duration);
        session.handle.seek_ms(clamped.as_millis() as u64)?;
        session.elapsed = clamped;
        Ok(())
    }

    /// Jump forward by the skip step, clamped at the end
    pub fn skip_forward(&mut self) -> Result<(), PlaybackError> {
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        let target = session.elapsed.saturating_add(self.skip_step);
        self.seek(target)
    }

    /// Jump backward by the skip step, clamped at the start
    pub fn skip_backward(&mut self) -> Result<(), PlaybackError> {
        let Some(session) = self.session.as_ref() else {
            return Ok(());
        };
        let target = session.elapsed.saturating_sub(self.skip_step);
        self.seek(target)
    }

    /// Release the resource, clear the session and hide the chrome.
    /// Idempotent when nothing is loaded.
    pub fn stop(&mut self) {
        if let Some(session) = self.session.as_ref() {
            info!("stopped '{}'", session.episode.title);
        }
        self.release_session();
    }

    /// Collapse the chrome to the mini player. Visibility only.
    pub fn minimize(&mut self) {
        if self.session.is_some() {
            self.visibility = Visibility::Minimized;
        }
    }

    /// Restore the full-screen chrome. Visibility only.
    pub fn expand(&mut self) {
        if self.session.is_some() {
            self.visibility = Visibility::Expanded;
        }
    }

    /// Drain pending runtime statuses, mirror them into the session, and
    /// fan the resulting events out to subscribers.
    ///
    /// Statuses overwrite position and playing state; an end-of-media status
    /// performs the same cleanup as `stop()`.
    pub fn poll_runtime(&mut self) -> Vec<PlayerEvent> {
        let mut statuses = Vec::new();
        if let Some(rx) = self.status_rx.as_mut() {
            while let Ok(status) = rx.try_recv() {
                statuses.push(status);
            }
        }

        let mut events = Vec::new();
        for status in statuses {
            events.extend(self.apply_status(status));
        }
        self.broadcast(&events);
        events
    }

    /// Subscribe to player events. The subscription lives exactly as long as
    /// the returned receiver.
    pub fn subscribe(&mut self) -> UnboundedReceiver<PlayerEvent> {
        let (tx, rx) = unbounded_channel();
        self.subscribers.push(tx);
        rx
    }

    /// Snapshot of the active session for rendering
    pub fn session(&self) -> Option<PlaybackSession> {
        self.session.as_ref().map(|session| PlaybackSession {
            episode: session.episode.clone(),
            elapsed: session.elapsed,
            duration: session.duration,
            playing: session.playing,
            waveform: session.waveform.clone(),
            visibility: self.visibility,
        })
    }

    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    pub fn is_loaded(&self, episode_id: &str) -> bool {
        self.session
            .as_ref()
            .map(|s| s.episode.id == episode_id)
            .unwrap_or(false)
    }

    pub fn is_playing(&self) -> bool {
        self.session.as_ref().map(|s| s.playing).unwrap_or(false)
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn skip_step(&self) -> Duration {
        self.skip_step
    }

    fn apply_status(&mut self, status: RuntimeStatus) -> Vec<PlayerEvent> {
        let Some(session) = self.session.as_mut() else {
            return Vec::new();
        };

        session.elapsed = status.position.min(session.duration);
        session.playing = status.playing && !status.finished;

        let mut events = vec![PlayerEvent::Position(PositionUpdate {
            episode_id: session.episode.id.clone(),
            elapsed: session.elapsed,
            duration: session.duration,
            playing: session.playing,
        })];

        if status.finished {
            let episode_id = session.episode.id.clone();
            info!("finished '{}'", session.episode.title);
            events.push(PlayerEvent::Ended { episode_id });
            self.release_session();
        }

        events
    }

    fn broadcast(&mut self, events: &[PlayerEvent]) {
        if events.is_empty() {
            return;
        }
        self.subscribers
            .retain(|tx| events.iter().all(|event| tx.send(event.clone()).is_ok()));
    }

    fn release_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.handle.release();
        }
        self.status_rx = None;
        self.visibility = Visibility::Hidden;
    }
}

#[cfg(test)]
mod tests {
    use super::runtime::mock::MockRuntime;
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::sync::atomic::Ordering;
    use std::sync::Arc;

    fn episode(id: &str, duration: &str) -> Episode {
        Episode {
            id: id.to_string(),
            title: format!("Episode {}", id),
            speaker: "Pastor John Mensah".to_string(),
            description: String::new(),
            media_url: format!("https://cdn.example.org/sermons/{}.mp3", id),
            download_url: None,
            duration: duration.to_string(),
            published_at: Utc.with_ymd_and_hms(2026, 6, 14, 9, 0, 0).unwrap(),
            category: "Sunday Service".to_string(),
            series_id: None,
            episode_number: None,
            tags: None,
            thumbnail_url: None,
        }
    }

    struct Harness {
        engine: PlaybackEngine,
        runtime: Arc<MockRuntime>,
    }

    fn harness() -> Harness {
        harness_with(MockRuntime::new())
    }

    fn harness_with(runtime: MockRuntime) -> Harness {
        let runtime = Arc::new(runtime);

        struct Shared(Arc<MockRuntime>);

        #[async_trait::async_trait]
        impl AudioRuntime for Shared {
            async fn acquire(
                &self,
                media_url: &str,
                duration: Duration,
                events: UnboundedSender<RuntimeStatus>,
            ) -> Result<Box<dyn AudioHandle>, PlaybackError> {
                self.0.acquire(media_url, duration, events).await
            }
        }

        Harness {
            engine: PlaybackEngine::new(Box::new(Shared(runtime.clone()))),
            runtime,
        }
    }

    #[tokio::test]
    async fn test_play_from_idle() {
        let mut h = harness();

        h.engine.play(episode("x", "3:00")).await.unwrap();

        let session = h.engine.session().unwrap();
        assert_eq!(session.episode.id, "x");
        assert!(session.playing);
        assert_eq!(session.elapsed, Duration::ZERO);
        assert_eq!(session.duration, Duration::from_secs(180));
        assert_eq!(session.visibility, Visibility::Expanded);
        assert_eq!(h.runtime.acquired.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_waveform_generated_per_load() {
        let mut h = harness();

        h.engine.play(episode("x", "3:00")).await.unwrap();
        let first = h.engine.session().unwrap().waveform;
        assert_eq!(first.len(), waveform::WAVEFORM_POINTS);
        assert!(first
            .iter()
            .all(|v| (waveform::MIN_AMPLITUDE..=waveform::MAX_AMPLITUDE).contains(v)));

        h.engine.play(episode("y", "4:00")).await.unwrap();
        let second = h.engine.session().unwrap().waveform;
        assert_eq!(second.len(), waveform::WAVEFORM_POINTS);
    }

    #[tokio::test]
    async fn test_play_toggle_law() {
        let mut h = harness();
        let ep = episode("x", "3:00");

        h.engine.play(ep.clone()).await.unwrap();
        assert!(h.engine.is_playing());

        h.engine.play(ep.clone()).await.unwrap();
        assert!(!h.engine.is_playing());
        assert!(h.engine.session().is_some());

        h.engine.play(ep).await.unwrap();
        assert!(h.engine.is_playing());

        // Toggling never re-acquires the resource
        assert_eq!(h.runtime.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(h.runtime.pauses.load(Ordering::SeqCst), 1);
        assert_eq!(h.runtime.resumes.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_single_session_on_switch() {
        let mut h = harness();

        h.engine.play(episode("a", "3:00")).await.unwrap();
        h.engine.play(episode("b", "5:00")).await.unwrap();

        let session = h.engine.session().unwrap();
        assert_eq!(session.episode.id, "b");
        assert_eq!(session.visibility, Visibility::Expanded);
        assert_eq!(h.runtime.acquired.load(Ordering::SeqCst), 2);
        assert_eq!(h.runtime.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_failed_acquisition_leaves_no_session() {
        let mut h = harness_with(MockRuntime::failing());

        let result = h.engine.play(episode("x", "3:00")).await;
        assert!(matches!(result, Err(PlaybackError::MediaUnavailable { .. })));
        assert!(h.engine.session().is_none());
        assert_eq!(h.engine.visibility(), Visibility::Hidden);
    }

    #[tokio::test]
    async fn test_failed_switch_still_releases_old_resource() {
        let mut h = harness();
        h.engine.play(episode("a", "3:00")).await.unwrap();

        // The old session is torn down even though the new episode's
        // duration string never parses
        let result = h.engine.play(episode("b", "not-a-duration")).await;
        assert!(matches!(result, Err(PlaybackError::InvalidDuration { .. })));
        assert!(h.engine.session().is_none());
        assert_eq!(h.engine.visibility(), Visibility::Hidden);
        assert_eq!(h.runtime.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_seek_clamping_law() {
        let mut h = harness();
        h.engine.play(episode("x", "3:00")).await.unwrap();

        for position in [0u64, 45, 180, 500, 10_000] {
            h.engine.seek(Duration::from_secs(position)).unwrap();
            let elapsed = h.engine.session().unwrap().elapsed;
            assert!(elapsed <= Duration::from_secs(180));
            assert_eq!(elapsed, Duration::from_secs(position.min(180)));
        }

        assert_eq!(*h.runtime.last_seek_ms.lock().unwrap(), Some(180_000));
    }

    #[tokio::test]
    async fn test_seek_without_session_is_noop() {
        let mut h = harness();
        h.engine.seek(Duration::from_secs(30)).unwrap();
        assert!(h.runtime.last_seek_ms.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn test_skip_near_inverse() {
        let mut h = harness();
        h.engine.play(episode("x", "3:00")).await.unwrap();

        h.engine.seek(Duration::from_secs(60)).unwrap();
        h.engine.skip_forward().unwrap();
        assert_eq!(h.engine.session().unwrap().elapsed, Duration::from_secs(75));
        h.engine.skip_backward().unwrap();
        assert_eq!(h.engine.session().unwrap().elapsed, Duration::from_secs(60));
    }

    #[tokio::test]
    async fn test_skip_clamps_at_boundaries() {
        let mut h = harness();
        h.engine.play(episode("x", "3:00")).await.unwrap();

        h.engine.seek(Duration::from_secs(5)).unwrap();
        h.engine.skip_backward().unwrap();
        assert_eq!(h.engine.session().unwrap().elapsed, Duration::ZERO);

        h.engine.seek(Duration::from_secs(170)).unwrap();
        h.engine.skip_forward().unwrap();
        assert_eq!(h.engine.session().unwrap().elapsed, Duration::from_secs(180));

        // Clamped at the end, the inverse no longer returns to the origin
        h.engine.skip_backward().unwrap();
        assert_eq!(h.engine.session().unwrap().elapsed, Duration::from_secs(165));
    }

    #[tokio::test]
    async fn test_stop_is_idempotent_and_hides_chrome() {
        let mut h = harness();

        // No session: a no-op that leaves the chrome hidden
        h.engine.stop();
        assert_eq!(h.engine.visibility(), Visibility::Hidden);

        h.engine.play(episode("x", "3:00")).await.unwrap();
        h.engine.stop();
        assert!(h.engine.session().is_none());
        assert_eq!(h.engine.visibility(), Visibility::Hidden);
        assert_eq!(h.runtime.released.load(Ordering::SeqCst), 1);

        h.engine.stop();
        assert_eq!(h.runtime.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_minimize_and_expand() {
        let mut h = harness();

        // Without a session visibility stays hidden
        h.engine.minimize();
        assert_eq!(h.engine.visibility(), Visibility::Hidden);

        h.engine.play(episode("x", "3:00")).await.unwrap();
        h.engine.minimize();
        assert_eq!(h.engine.visibility(), Visibility::Minimized);
        h.engine.expand();
        assert_eq!(h.engine.visibility(), Visibility::Expanded);

        // Visibility toggles never touch the resource
        assert_eq!(h.runtime.acquired.load(Ordering::SeqCst), 1);
        assert_eq!(h.runtime.released.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_status_overwrites_session_fields() {
        let mut h = harness();
        h.engine.play(episode("x", "3:00")).await.unwrap();

        h.runtime.emit(RuntimeStatus {
            position: Duration::from_secs(42),
            playing: true,
            finished: false,
        });
        let events = h.engine.poll_runtime();

        assert_eq!(h.engine.session().unwrap().elapsed, Duration::from_secs(42));
        assert_eq!(events.len(), 1);
        match &events[0] {
            PlayerEvent::Position(update) => {
                assert_eq!(update.episode_id, "x");
                assert_eq!(update.elapsed, Duration::from_secs(42));
                assert!(update.playing);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_status_position_is_clamped() {
        let mut h = harness();
        h.engine.play(episode("x", "3:00")).await.unwrap();

        h.runtime.emit(RuntimeStatus {
            position: Duration::from_secs(10_000),
            playing: true,
            finished: false,
        });
        h.engine.poll_runtime();

        assert_eq!(h.engine.session().unwrap().elapsed, Duration::from_secs(180));
    }

    #[tokio::test]
    async fn test_end_of_media_cleans_up_like_stop() {
        let mut h = harness();
        h.engine.play(episode("x", "3:00")).await.unwrap();

        h.runtime.emit(RuntimeStatus {
            position: Duration::from_secs(180),
            playing: false,
            finished: true,
        });
        let events = h.engine.poll_runtime();

        assert!(events.contains(&PlayerEvent::Ended {
            episode_id: "x".to_string()
        }));
        assert!(h.engine.session().is_none());
        assert_eq!(h.engine.visibility(), Visibility::Hidden);
        assert_eq!(h.runtime.released.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_subscribers_receive_events() {
        let mut h = harness();
        let mut updates = h.engine.subscribe();

        h.engine.play(episode("x", "3:00")).await.unwrap();
        h.runtime.emit(RuntimeStatus {
            position: Duration::from_secs(10),
            playing: true,
            finished: false,
        });
        h.engine.poll_runtime();

        match updates.try_recv().unwrap() {
            PlayerEvent::Position(update) => {
                assert_eq!(update.elapsed, Duration::from_secs(10));
                assert!((update.progress() - 10.0 / 180.0).abs() < 0.001);
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_dropped_subscriber_is_pruned() {
        let mut h = harness();
        let updates = h.engine.subscribe();
        drop(updates);

        h.engine.play(episode("x", "3:00")).await.unwrap();
        h.runtime.emit(RuntimeStatus {
            position: Duration::from_secs(10),
            playing: true,
            finished: false,
        });
        h.engine.poll_runtime();

        assert!(h.engine.subscribers.is_empty());
    }

    #[tokio::test]
    async fn test_pause_resume_require_session() {
        let mut h = harness();
        assert!(matches!(h.engine.pause(), Err(PlaybackError::NoSession)));
        assert!(matches!(h.engine.resume(), Err(PlaybackError::NoSession)));
    }
}
