mod browse;
mod catalog;
mod cli;
mod config;
mod error;
mod format;
mod logging;
mod models;
mod player;
mod store;
mod video;


use std::sync::Arc;
use std::time::Duration;

use log::{error, info, warn};

use browse::{filter_episodes, CategoryFilter, SeriesNavigator};
use catalog::Catalog;
use chrono::Utc;
use cli::{AdminAction, BrowseAction, CliApp, Commands, ParseError, StatusDisplay};
use config::ConfigManager;
use error::PlayerError;
use logging::PlaybackLogger;
use models::{ChurchEvent, Episode, GivingOption, NewsArticle, PaymentMethod, Series};
use player::runtime::{AudioRuntime, ClockRuntime};
use player::{PlaybackEngine, PlayerEvent};
use store::{ContentStore, HttpContentStore, MemoryStore};
use video::VideoProvider;

/// Main application controller that coordinates all components
pub struct AppController {
    engine: PlaybackEngine,
    navigator: SeriesNavigator,
    catalog: Catalog,
    videos: VideoProvider,
    config_manager: ConfigManager,
    logger: PlaybackLogger,
}

impl AppController {
    /// Create a new application controller from the on-disk configuration
    pub fn new() -> Result<Self, PlayerError> {
        // Initialize logging first (default to 'warn' if unspecified)
        if std::env::var("CHURCH_PLAYER_LOG_LEVEL").is_err() {
            std::env::set_var("CHURCH_PLAYER_LOG_LEVEL", "warn");
        }
        if let Err(e) = PlaybackLogger::init() {
            eprintln!("Warning: Failed to initialize logging: {}", e);
        }

        let config_manager = ConfigManager::new()?;
        let config = config_manager.get_config().clone();
        let timeout = Duration::from_secs(config.request_timeout_secs);

        let store: Arc<dyn ContentStore> = match &config.store_url {
            Some(url) => {
                let mut http = HttpContentStore::with_timeout(url.clone(), timeout)?;
                if let Some(key) = &config.store_api_key {
                    http = http.with_api_key(key.clone());
                }
                Arc::new(http)
            }
            None => {
                info!("no content store configured, serving sample content");
                Arc::new(MemoryStore::with_sample_content())
            }
        };

        let videos = VideoProvider::new(
            config.video_api_url.clone(),
            config.video_channel_id.clone(),
            timeout,
        )?;

        Ok(Self::with_components(
            config_manager,
            store,
            Box::new(ClockRuntime::new()),
            videos,
        ))
    }

    /// Assemble a controller from explicit parts (also the test entry point)
    pub fn with_components(
        config_manager: ConfigManager,
        store: Arc<dyn ContentStore>,
        runtime: Box<dyn AudioRuntime>,
        videos: VideoProvider,
    ) -> Self {
        let config = config_manager.get_config();
        let logger = PlaybackLogger::new();
        let catalog = Catalog::new(store, logger.clone());

        let engine = PlaybackEngine::with_skip_step(
            runtime,
            Duration::from_secs(config.skip_step_secs),
        );

        let mut navigator = SeriesNavigator::new();
        navigator.set_category(CategoryFilter::from_label(&config.default_category));

        Self {
            engine,
            navigator,
            catalog,
            videos,
            config_manager,
            logger,
        }
    }

    /// Fetch content and (re)build the browse state
    pub async fn initialize(&mut self) -> Result<(), PlayerError> {
        self.refresh_content().await;
        Ok(())
    }

    async fn refresh_content(&mut self) {
        let series = self.catalog.series().await;
        let episodes = self.catalog.episodes().await;
        self.logger.log_event(
            logging::PlayerEventType::ContentRefreshed,
            format!("{} series, {} sermons", series.len(), episodes.len()),
        );
        self.navigator.set_content(series, episodes);
    }

    /// Execute a single command
    pub async fn execute_command(&mut self, command: Commands) -> Result<(), PlayerError> {
        match command {
            Commands::Play { episode_id } => {
                let episode = match self.navigator.find_episode(&episode_id).cloned() {
                    Some(episode) => episode,
                    None => self.catalog.get_episode(&episode_id).await?,
                };

                let was_loaded = self.engine.is_loaded(&episode.id);
                let previous = self.engine.session().map(|s| s.episode.title.clone());
                self.engine.play(episode.clone()).await?;

                if was_loaded {
                    if self.engine.is_playing() {
                        println!("OK: Resumed - {}", episode.title);
                    } else {
                        self.logger
                            .log_playback_paused(self.engine.session().map(|s| s.elapsed).unwrap_or_default());
                        println!("OK: Paused - {}", episode.title);
                    }
                } else {
                    self.logger.log_episode_changed(previous.as_deref(), &episode.title);
                    self.logger.log_playback_started(&episode.title, &episode.speaker);
                    println!("Playing: {} - {}", episode.title, episode.speaker);
                }
            }
            Commands::Pause => {
                self.engine.pause()?;
                self.logger
                    .log_playback_paused(self.engine.session().map(|s| s.elapsed).unwrap_or_default());
                println!("OK: Paused");
            }
            Commands::Resume => {
                self.engine.resume()?;
                println!("OK: Resumed");
            }
            Commands::Stop => {
                self.engine.stop();
                self.logger.log_playback_stopped("user requested");
                println!("OK: Stopped");
            }
            Commands::Seek { position } => {
                if self.engine.session().is_none() {
                    println!("Nothing is playing");
                } else {
                    let target = CliApp::parse_time(&position)?;
                    let from = self.engine.session().map(|s| s.elapsed).unwrap_or_default();
                    self.engine.seek(target)?;
                    let landed = self.engine.session().map(|s| s.elapsed).unwrap_or_default();
                    self.logger.log_seek_operation(from, landed);
                    println!("Seeked to: {}", format::format_duration(landed));
                }
            }
            Commands::Forward => {
                self.engine.skip_forward()?;
                self.print_position();
            }
            Commands::Backward => {
                self.engine.skip_backward()?;
                self.print_position();
            }
            Commands::Minimize => {
                self.engine.minimize();
                println!("OK: Player minimized");
            }
            Commands::Expand => {
                self.engine.expand();
                println!("OK: Player expanded");
            }
            Commands::Status => {
                self.engine.poll_runtime();
                StatusDisplay::display_player(self.engine.session().as_ref());
                self.print_browse_context();
            }
            Commands::Watch => {
                println!("Watching status (updates every 250ms). Press Ctrl-C to stop.");
                loop {
                    let events = self.engine.poll_runtime();
                    print!("\x1B[2J\x1B[H");
                    StatusDisplay::display_player(self.engine.session().as_ref());
                    if events.iter().any(|e| matches!(e, PlayerEvent::Ended { .. })) {
                        println!("Episode finished");
                    }
                    tokio::time::sleep(Duration::from_millis(250)).await;
                }
            }
            Commands::Browse { action } => self.execute_browse(action),
            Commands::Search { query } => {
                let query = query.unwrap_or_default();
                if query.is_empty() {
                    println!("OK: Search cleared");
                } else {
                    println!("OK: Searching for '{}'", query);
                }
                self.navigator.set_search_query(query);
            }
            Commands::Category { name } => {
                let filter = CategoryFilter::from_label(name.as_deref().unwrap_or("All"));
                println!("OK: Category '{}'", filter.label());
                self.navigator.set_category(filter);
            }
            Commands::Refresh => {
                self.refresh_content().await;
                println!(
                    "OK: Refreshed - {} series, {} sermons",
                    self.navigator.visible_series().len(),
                    self.navigator.index().len()
                );
            }
            Commands::News => {
                let articles = self.catalog.news().await;
                StatusDisplay::display_news(&articles);
            }
            Commands::Events => {
                let events = self.catalog.events().await;
                StatusDisplay::display_events(&events);
            }
            Commands::Videos { limit } => {
                let videos = self.videos.list_videos(limit).await;
                StatusDisplay::display_videos(&videos);
            }
            Commands::Giving => {
                let options = self.catalog.giving_options().await;
                let methods = self.catalog.payment_methods().await;
                StatusDisplay::display_giving(&options, &methods);
            }
            Commands::Admin { action } => self.execute_admin(action).await?,
        }

        Ok(())
    }

    fn execute_browse(&mut self, action: BrowseAction) {
        match action {
            BrowseAction::Series => {
                let query = self.navigator.search_query().to_string();
                let label = self.navigator.category().label().to_string();
                StatusDisplay::display_series_list(&self.navigator.visible_series(), &query, &label);
            }
            BrowseAction::Open { series_id } => {
                if self.navigator.open_series(&series_id) {
                    let title = self
                        .navigator
                        .selected_series()
                        .map(|s| s.title.clone())
                        .unwrap_or_default();
                    println!("Opened series: {}", title);
                    let now_playing = self.engine.session().map(|s| s.episode.id);
                    StatusDisplay::display_episode_list(
                        &self.navigator.visible_episodes(),
                        now_playing.as_deref(),
                    );
                } else {
                    println!("No series with id '{}'", series_id);
                }
            }
            BrowseAction::Back => {
                self.navigator.go_back();
                println!("OK: Back to series list");
            }
            BrowseAction::Episodes => {
                let now_playing = self.engine.session().map(|s| s.episode.id);
                if self.navigator.is_series_view() {
                    // No series open: list all sermons under the active filter
                    let episodes = filter_episodes(
                        self.navigator.index().episodes(),
                        self.navigator.search_query(),
                        self.navigator.category(),
                        Utc::now().date_naive(),
                    );
                    StatusDisplay::display_episode_list(&episodes, now_playing.as_deref());
                } else {
                    StatusDisplay::display_episode_list(
                        &self.navigator.visible_episodes(),
                        now_playing.as_deref(),
                    );
                }
            }
        }
    }

    async fn execute_admin(&mut self, action: AdminAction) -> Result<(), PlayerError> {
        match action {
            AdminAction::Create { collection, json } => {
                let id = match collection.as_str() {
                    "sermons" => self.catalog.create(&parse_doc::<Episode>(&json)?).await?,
                    "series" => self.catalog.create(&parse_doc::<Series>(&json)?).await?,
                    "events" => self.catalog.create(&parse_doc::<ChurchEvent>(&json)?).await?,
                    "news" => self.catalog.create(&parse_doc::<NewsArticle>(&json)?).await?,
                    "givingOptions" => self.catalog.create(&parse_doc::<GivingOption>(&json)?).await?,
                    "paymentMethods" => {
                        self.catalog.create(&parse_doc::<PaymentMethod>(&json)?).await?
                    }
                    _ => return Err(ParseError::UnknownCollection { name: collection }.into()),
                };
                println!("OK: Created {}", id);
                self.refresh_browse_collections(&collection).await;
            }
            AdminAction::Update { collection, id, json } => {
                let patch = parse_patch(&json)?;
                match collection.as_str() {
                    "sermons" => self.catalog.update::<Episode>(&id, patch).await?,
                    "series" => self.catalog.update::<Series>(&id, patch).await?,
                    "events" => self.catalog.update::<ChurchEvent>(&id, patch).await?,
                    "news" => self.catalog.update::<NewsArticle>(&id, patch).await?,
                    "givingOptions" => self.catalog.update::<GivingOption>(&id, patch).await?,
                    "paymentMethods" => self.catalog.update::<PaymentMethod>(&id, patch).await?,
                    _ => return Err(ParseError::UnknownCollection { name: collection }.into()),
                }
                println!("OK: Updated {}", id);
                self.refresh_browse_collections(&collection).await;
            }
            AdminAction::Delete { collection, id } => {
                match collection.as_str() {
                    "sermons" => self.catalog.delete::<Episode>(&id).await?,
                    "series" => self.catalog.delete::<Series>(&id).await?,
                    "events" => self.catalog.delete::<ChurchEvent>(&id).await?,
                    "news" => self.catalog.delete::<NewsArticle>(&id).await?,
                    "givingOptions" => self.catalog.delete::<GivingOption>(&id).await?,
                    "paymentMethods" => self.catalog.delete::<PaymentMethod>(&id).await?,
                    _ => return Err(ParseError::UnknownCollection { name: collection }.into()),
                }
                println!("OK: Deleted {}", id);
                self.refresh_browse_collections(&collection).await;
            }
        }
        Ok(())
    }

    /// Browse state indexes sermons and series; rebuild it when they change
    async fn refresh_browse_collections(&mut self, collection: &str) {
        if collection == "sermons" || collection == "series" {
            self.refresh_content().await;
        }
    }

    fn print_position(&self) {
        match self.engine.session() {
            Some(session) => println!(
                "Position: {} / {}",
                format::format_duration(session.elapsed),
                format::format_duration(session.duration)
            ),
            None => println!("Nothing is playing"),
        }
    }

    fn print_browse_context(&self) {
        let view = if self.navigator.is_series_view() {
            "series list".to_string()
        } else {
            format!(
                "episodes of '{}'",
                self.navigator
                    .selected_series()
                    .map(|s| s.title.as_str())
                    .unwrap_or("?")
            )
        };
        println!(
            "Browse: {} | search: '{}' | category: '{}'",
            view,
            self.navigator.search_query(),
            self.navigator.category().label()
        );
    }

    /// Run interactive mode
    pub async fn run_interactive_mode(&mut self) -> Result<(), PlayerError> {
        println!("Church Media Player v0.1.0");
        println!("Type 'help' for available commands, 'exit' or 'quit' to quit.");
        println!();

        // Set up graceful shutdown handling
        let shutdown_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let shutdown_flag_clone = shutdown_flag.clone();

        ctrlc::set_handler(move || {
            println!("\nReceived interrupt signal. Shutting down gracefully...");
            shutdown_flag_clone.store(true, std::sync::atomic::Ordering::Relaxed);
        })
        .expect("Error setting Ctrl-C handler");

        // Non-blocking input using a dedicated stdin thread
        let mut interval = tokio::time::interval(Duration::from_millis(250));
        let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel::<String>();
        std::thread::spawn(move || {
            let stdin = std::io::stdin();
            let mut line = String::new();
            loop {
                line.clear();
                match stdin.read_line(&mut line) {
                    Ok(0) => {
                        let _ = tx.send(String::new());
                        break;
                    }
                    Ok(_) => {
                        let _ = tx.send(line.trim().to_string());
                    }
                    Err(_) => {
                        let _ = tx.send(String::new());
                        break;
                    }
                }
            }
        });
        let mut awaiting_input = false;

        loop {
            if shutdown_flag.load(std::sync::atomic::Ordering::Relaxed) {
                break;
            }

            if !awaiting_input {
                print!("> ");
                let _ = std::io::Write::flush(&mut std::io::stdout());
                awaiting_input = true;
            }

            tokio::select! {
                biased;

                line = rx.recv() => {
                    awaiting_input = false;
                    match line {
                        Some(line) => {
                            if line.is_empty() {
                                continue;
                            }
                            if line == "exit" || line == "quit" {
                                println!("Goodbye!");
                                break;
                            }
                            match CliApp::parse_command(&line) {
                                Ok(command) => {
                                    if let Err(e) = self.execute_command(command).await {
                                        self.handle_error(&e);
                                    }
                                }
                                Err(ParseError::HelpRequested) => {
                                    CliApp::display_help();
                                }
                                Err(e) => {
                                    eprintln!("Error: {}", e);
                                    println!("Type 'help' for available commands.");
                                }
                            }
                        }
                        None => {
                            // Channel closed / EOF
                            println!();
                            break;
                        }
                    }
                }

                // Periodic poll: mirror runtime status and announce endings
                _ = interval.tick() => {
                    let events = self.engine.poll_runtime();
                    for event in events {
                        if let PlayerEvent::Ended { .. } = event {
                            println!("\nEpisode finished");
                            self.logger.log_event(
                                logging::PlayerEventType::EpisodeFinished,
                                "natural end of media".to_string(),
                            );
                        }
                    }
                }
            }
        }

        self.shutdown().await?;

        Ok(())
    }

    /// Perform graceful shutdown with resource cleanup and config saving
    pub async fn shutdown(&mut self) -> Result<(), PlayerError> {
        println!("Shutting down...");

        // Stop playback; this is the mandatory resource release path
        self.engine.stop();

        if let Err(e) = self.save_current_config() {
            eprintln!("Warning: Error saving configuration: {}", e);
        }

        println!("Shutdown complete.");
        Ok(())
    }

    fn handle_error(&mut self, error: &PlayerError) {
        let severity = error.severity();
        match severity {
            error::ErrorSeverity::Info => info!("{}", error),
            error::ErrorSeverity::Warning => warn!("{}", error),
            error::ErrorSeverity::Error | error::ErrorSeverity::Critical => {
                error!("{}", error);
            }
        }
        if let PlayerError::Playback(playback) = error {
            self.logger
                .log_event(logging::PlayerEventType::MediaError, playback.to_string());
        }

        StatusDisplay::display_error_with_recovery(error, error.is_recoverable());
    }

    /// Save current state to configuration
    fn save_current_config(&mut self) -> Result<(), PlayerError> {
        let category = self.navigator.category().label().to_string();
        self.config_manager.update_config(|config| {
            config.default_category = category;
        })?;
        Ok(())
    }
}

fn parse_doc<T: serde::de::DeserializeOwned>(json: &str) -> Result<T, PlayerError> {
    serde_json::from_str(json)
        .map_err(|e| ParseError::InvalidJson(e.to_string()).into())
}

fn parse_patch(json: &str) -> Result<serde_json::Value, PlayerError> {
    let value: serde_json::Value =
        serde_json::from_str(json).map_err(|e| PlayerError::from(ParseError::InvalidJson(e.to_string())))?;
    if !value.is_object() {
        return Err(ParseError::InvalidJson("expected a JSON object".to_string()).into());
    }
    Ok(value)
}

#[tokio::main]
async fn main() -> Result<(), PlayerError> {
    let mut app = match AppController::new() {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Failed to initialize application: {}", e);
            StatusDisplay::display_simple_error(&e);
            std::process::exit(1);
        }
    };

    if let Err(e) = app.initialize().await {
        error!("Failed to initialize application: {}", e);
        app.handle_error(&e);
        std::process::exit(1);
    }

    let cli = CliApp::parse_args();

    match cli.command {
        Some(command) => {
            // Single command mode
            if let Err(e) = app.execute_command(command).await {
                app.handle_error(&e);
                std::process::exit(1);
            }
        }
        None => {
            // Interactive mode
            if let Err(e) = app.run_interactive_mode().await {
                app.handle_error(&e);
                std::process::exit(1);
            }
        }
    }

    info!("Application shutdown complete");
    Ok(())
}
