use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::mpsc::UnboundedSender;

use crate::error::PlaybackError;

/// How often the clock runtime republishes its position
const STATUS_INTERVAL: Duration = Duration::from_millis(250);

/// Status payload pushed by the audio runtime while a resource is held
#[derive(Debug, Clone, PartialEq)]
pub struct RuntimeStatus {
    pub position: Duration,
    pub playing: bool,
    pub finished: bool,
}

/// The external audio runtime, reached only through this seam.
///
/// Acquisition is asynchronous and may fail; a successful acquire returns a
/// handle that owns the underlying resource and starts auto-playing.
/// Status updates flow back over the channel supplied by the caller.
#[async_trait]
pub trait AudioRuntime: Send + Sync {
    async fn acquire(
        &self,
        media_url: &str,
        duration: Duration,
        events: UnboundedSender<RuntimeStatus>,
    ) -> Result<Box<dyn AudioHandle>, PlaybackError>;
}

/// An acquired playback resource.
///
/// Positions are expressed in the runtime's native milliseconds; unit
/// conversion is the engine's responsibility.
pub trait AudioHandle: Send {
    fn resume(&mut self) -> Result<(), PlaybackError>;
    fn pause(&mut self) -> Result<(), PlaybackError>;
    fn seek_ms(&mut self, position_ms: u64) -> Result<(), PlaybackError>;
    /// Release the underlying resource. Must be idempotent.
    fn release(&mut self);
}

#[derive(Debug)]
struct ClockState {
    position: Duration,
    last_tick: Instant,
    playing: bool,
    duration: Duration,
    released: bool,
}

impl ClockState {
    /// Fold wall-clock time elapsed since the last observation into position
    fn advance(&mut self) {
        let now = Instant::now();
        if self.playing {
            self.position = (self.position + now.duration_since(self.last_tick)).min(self.duration);
        }
        self.last_tick = now;
    }

    fn finished(&self) -> bool {
        !self.duration.is_zero() && self.position >= self.duration
    }
}

/// Default runtime: advances position against the wall clock and emits
/// periodic status updates, ending naturally at the declared duration.
///
/// Stands in for the platform audio stack behind the same seam the real
/// runtime would use.
pub struct ClockRuntime;

impl ClockRuntime {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ClockRuntime {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AudioRuntime for ClockRuntime {
    async fn acquire(
        &self,
        media_url: &str,
        duration: Duration,
        events: UnboundedSender<RuntimeStatus>,
    ) -> Result<Box<dyn AudioHandle>, PlaybackError> {
        if !media_url.starts_with("http://") && !media_url.starts_with("https://") {
            return Err(PlaybackError::MediaUnavailable {
                url: media_url.to_string(),
            });
        }

        let state = Arc::new(Mutex::new(ClockState {
            position: Duration::ZERO,
            last_tick: Instant::now(),
            playing: true, // auto-play on acquisition
            duration,
            released: false,
        }));

        let task_state = state.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(STATUS_INTERVAL);
            loop {
                interval.tick().await;

                let status = {
                    let mut state = task_state.lock().unwrap();
                    if state.released {
                        break;
                    }
                    state.advance();
                    let finished = state.finished();
                    if finished {
                        state.playing = false;
                    }
                    RuntimeStatus {
                        position: state.position,
                        playing: state.playing,
                        finished,
                    }
                };

                let finished = status.finished;
                if events.send(status).is_err() {
                    // Listener went away; the session owning us is gone
                    break;
                }
                if finished {
                    break;
                }
            }
        });

        Ok(Box::new(ClockHandle { state }))
    }
}

struct ClockHandle {
    state: Arc<Mutex<ClockState>>,
}

impl AudioHandle for ClockHandle {
    fn resume(&mut self) -> Result<(), PlaybackError> {
        let mut state = self.state.lock().unwrap();
        state.advance();
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), PlaybackError> {
        let mut state = self.state.lock().unwrap();
        state.advance();
        state.playing = false;
        Ok(())
    }

    fn seek_ms(&mut self, position_ms: u64) -> Result<(), PlaybackError> {
        let mut state = self.state.lock().unwrap();
        state.position = Duration::from_millis(position_ms).min(state.duration);
        state.last_tick = Instant::now();
        Ok(())
    }

    fn release(&mut self) {
        self.state.lock().unwrap().released = true;
    }
}

impl Drop for ClockHandle {
    fn drop(&mut self) {
        self.release();
    }
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// Scripted runtime for engine tests: counts acquisitions and releases,
    /// optionally fails, and hands the status sender back to the test.
    pub struct MockRuntime {
        pub acquired: Arc<AtomicUsize>,
        pub released: Arc<AtomicUsize>,
        pub fail: bool,
        pub last_events: Arc<Mutex<Option<UnboundedSender<RuntimeStatus>>>>,
        pub last_seek_ms: Arc<Mutex<Option<u64>>>,
        pub pauses: Arc<AtomicUsize>,
        pub resumes: Arc<AtomicUsize>,
    }

    impl MockRuntime {
        pub fn new() -> Self {
            Self {
                acquired: Arc::new(AtomicUsize::new(0)),
                released: Arc::new(AtomicUsize::new(0)),
                fail: false,
                last_events: Arc::new(Mutex::new(None)),
                last_seek_ms: Arc::new(Mutex::new(None)),
                pauses: Arc::new(AtomicUsize::new(0)),
                resumes: Arc::new(AtomicUsize::new(0)),
            }
        }

        pub fn failing() -> Self {
            let mut runtime = Self::new();
            runtime.fail = true;
            runtime
        }

        /// Inject a status update as if the platform runtime had reported it
        pub fn emit(&self, status: RuntimeStatus) {
            let sender = self.last_events.lock().unwrap();
            if let Some(sender) = sender.as_ref() {
                let _ = sender.send(status);
            }
        }
    }

    #[async_trait]
    impl AudioRuntime for MockRuntime {
        async fn acquire(
            &self,
            media_url: &str,
            _duration: Duration,
            events: UnboundedSender<RuntimeStatus>,
        ) -> Result<Box<dyn AudioHandle>, PlaybackError> {
            if self.fail {
                return Err(PlaybackError::MediaUnavailable {
                    url: media_url.to_string(),
                });
            }
            self.acquired.fetch_add(1, Ordering::SeqCst);
            *self.last_events.lock().unwrap() = Some(events);
            Ok(Box::new(MockHandle {
                released: self.released.clone(),
                last_seek_ms: self.last_seek_ms.clone(),
                pauses: self.pauses.clone(),
                resumes: self.resumes.clone(),
                done: AtomicBool::new(false),
            }))
        }
    }

    pub struct MockHandle {
        released: Arc<AtomicUsize>,
        last_seek_ms: Arc<Mutex<Option<u64>>>,
        pauses: Arc<AtomicUsize>,
        resumes: Arc<AtomicUsize>,
        done: AtomicBool,
    }

    impl AudioHandle for MockHandle {
        fn resume(&mut self) -> Result<(), PlaybackError> {
            self.resumes.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn pause(&mut self) -> Result<(), PlaybackError> {
            self.pauses.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn seek_ms(&mut self, position_ms: u64) -> Result<(), PlaybackError> {
            *self.last_seek_ms.lock().unwrap() = Some(position_ms);
            Ok(())
        }

        fn release(&mut self) {
            if !self.done.swap(true, Ordering::SeqCst) {
                self.released.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    impl Drop for MockHandle {
        fn drop(&mut self) {
            self.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::unbounded_channel;

    #[tokio::test]
    async fn test_acquire_rejects_bad_locator() {
        let runtime = ClockRuntime::new();
        let (tx, _rx) = unbounded_channel();

        let result = runtime.acquire("file:///local.mp3", Duration::from_secs(60), tx).await;
        assert!(matches!(result, Err(PlaybackError::MediaUnavailable { .. })));
    }

    #[tokio::test]
    async fn test_position_advances_while_playing() {
        let runtime = ClockRuntime::new();
        let (tx, mut rx) = unbounded_channel();

        let _handle = runtime
            .acquire("https://cdn.example.org/a.mp3", Duration::from_secs(60), tx)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(600)).await;

        let mut last = None;
        while let Ok(status) = rx.try_recv() {
            last = Some(status);
        }

        let status = last.expect("runtime should have reported status");
        assert!(status.playing);
        assert!(!status.finished);
        assert!(status.position > Duration::ZERO);
        assert!(status.position <= Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_pause_freezes_position() {
        let runtime = ClockRuntime::new();
        let (tx, mut rx) = unbounded_channel();

        let mut handle = runtime
            .acquire("https://cdn.example.org/a.mp3", Duration::from_secs(60), tx)
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;
        handle.pause().unwrap();

        tokio::time::sleep(Duration::from_millis(300)).await;
        while rx.try_recv().is_ok() {}

        tokio::time::sleep(Duration::from_millis(700)).await;
        let mut paused_positions = Vec::new();
        while let Ok(status) = rx.try_recv() {
            assert!(!status.playing);
            paused_positions.push(status.position);
        }

        assert!(paused_positions.len() >= 2);
        assert!(paused_positions.windows(2).all(|w| w[0] == w[1]));
    }

    #[tokio::test]
    async fn test_seek_moves_position() {
        let runtime = ClockRuntime::new();
        let (tx, mut rx) = unbounded_channel();

        let mut handle = runtime
            .acquire("https://cdn.example.org/a.mp3", Duration::from_secs(300), tx)
            .await
            .unwrap();

        handle.seek_ms(120_000).unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;

        let mut last = None;
        while let Ok(status) = rx.try_recv() {
            last = Some(status);
        }

        let status = last.unwrap();
        assert!(status.position >= Duration::from_secs(120));
        assert!(status.position < Duration::from_secs(122));
    }

    #[tokio::test]
    async fn test_natural_end_of_media() {
        let runtime = ClockRuntime::new();
        let (tx, mut rx) = unbounded_channel();

        let _handle = runtime
            .acquire("https://cdn.example.org/a.mp3", Duration::from_millis(700), tx)
            .await
            .unwrap();

        let mut saw_finished = false;
        for _ in 0..20 {
            match tokio::time::timeout(Duration::from_millis(500), rx.recv()).await {
                Ok(Some(status)) => {
                    if status.finished {
                        assert!(!status.playing);
                        assert_eq!(status.position, Duration::from_millis(700));
                        saw_finished = true;
                        break;
                    }
                }
                _ => break,
            }
        }
        assert!(saw_finished, "runtime should signal end of media");
    }

    #[tokio::test]
    async fn test_release_stops_status_stream() {
        let runtime = ClockRuntime::new();
        let (tx, mut rx) = unbounded_channel();

        let mut handle = runtime
            .acquire("https://cdn.example.org/a.mp3", Duration::from_secs(60), tx)
            .await
            .unwrap();

        handle.release();

        // The emitting task observes the release and closes the channel
        let mut closed = false;
        for _ in 0..20 {
            match tokio::time::timeout(Duration::from_millis(500), rx.recv()).await {
                Ok(Some(_)) => continue,
                Ok(None) => {
                    closed = true;
                    break;
                }
                Err(_) => break,
            }
        }
        assert!(closed, "status stream should close after release");
    }
}
