use thiserror::Error;

/// Main application error type
#[derive(Debug, Error)]
pub enum PlayerError {
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    #[error("Content store error: {0}")]
    Store(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("CLI parse error: {0}")]
    Parse(#[from] crate::cli::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PlayerError {
    /// Get a user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            PlayerError::Playback(err) => err.user_message(),
            PlayerError::Store(err) => err.user_message(),
            PlayerError::Config(err) => err.user_message(),
            PlayerError::Validation(err) => err.user_message(),
            PlayerError::Parse(err) => format!("Command error: {}", err),
            PlayerError::Io(err) => format!("File system error: {}", err),
        }
    }

    /// Get suggested recovery actions for the error
    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PlayerError::Playback(err) => err.recovery_suggestions(),
            PlayerError::Store(err) => err.recovery_suggestions(),
            PlayerError::Config(err) => err.recovery_suggestions(),
            PlayerError::Validation(_) => {
                vec!["Correct the highlighted field and submit again".to_string()]
            }
            PlayerError::Parse(_) => vec!["Type 'help' to see available commands".to_string()],
            PlayerError::Io(_) => vec!["Check file permissions and retry".to_string()],
        }
    }

    /// Check if this error allows the user to retry without changing anything
    pub fn is_recoverable(&self) -> bool {
        match self {
            PlayerError::Playback(err) => err.is_recoverable(),
            PlayerError::Store(err) => err.is_recoverable(),
            PlayerError::Config(_) => true,
            PlayerError::Validation(_) => false,
            PlayerError::Parse(_) => false,
            PlayerError::Io(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PlayerError::Playback(PlaybackError::OperationInFlight) => ErrorSeverity::Info,
            PlayerError::Playback(PlaybackError::NoSession) => ErrorSeverity::Info,
            PlayerError::Playback(_) => ErrorSeverity::Error,
            PlayerError::Store(_) => ErrorSeverity::Warning,
            PlayerError::Config(_) => ErrorSeverity::Warning,
            PlayerError::Validation(_) => ErrorSeverity::Warning,
            PlayerError::Parse(_) => ErrorSeverity::Info,
            PlayerError::Io(_) => ErrorSeverity::Error,
        }
    }
}

/// Error severity levels for logging and user feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl ErrorSeverity {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorSeverity::Info => "INFO",
            ErrorSeverity::Warning => "WARNING",
            ErrorSeverity::Error => "ERROR",
            ErrorSeverity::Critical => "CRITICAL",
        }
    }

    pub fn log_level(&self) -> log::Level {
        match self {
            ErrorSeverity::Info => log::Level::Info,
            ErrorSeverity::Warning => log::Level::Warn,
            ErrorSeverity::Error => log::Level::Error,
            ErrorSeverity::Critical => log::Level::Error,
        }
    }
}

/// Playback engine errors
#[derive(Debug, Error)]
pub enum PlaybackError {
    #[error("Media unavailable: {url}")]
    MediaUnavailable { url: String },

    #[error("Invalid duration string: '{value}'")]
    InvalidDuration { value: String },

    #[error("A playback operation is already in flight")]
    OperationInFlight,

    #[error("No episode is loaded")]
    NoSession,

    #[error("Audio runtime error: {0}")]
    Runtime(String),
}

impl PlaybackError {
    pub fn user_message(&self) -> String {
        match self {
            PlaybackError::MediaUnavailable { url } => {
                format!("Could not start playback - the media at '{}' is unavailable", url)
            }
            PlaybackError::InvalidDuration { value } => {
                format!("Episode has an unreadable duration ('{}')", value)
            }
            PlaybackError::OperationInFlight => {
                "Still loading the previous episode - try again in a moment".to_string()
            }
            PlaybackError::NoSession => "Nothing is playing".to_string(),
            PlaybackError::Runtime(msg) => format!("Playback interrupted: {}", msg),
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            PlaybackError::MediaUnavailable { .. } => vec![
                "Check your network connection".to_string(),
                "Try another episode".to_string(),
            ],
            PlaybackError::InvalidDuration { .. } => {
                vec!["Ask an admin to correct the episode's duration field".to_string()]
            }
            PlaybackError::OperationInFlight => vec!["Wait for the current load to finish".to_string()],
            PlaybackError::NoSession => vec!["Start an episode with 'play <id>'".to_string()],
            PlaybackError::Runtime(_) => vec!["Stop and restart playback".to_string()],
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            PlaybackError::MediaUnavailable { .. }
                | PlaybackError::OperationInFlight
                | PlaybackError::Runtime(_)
        )
    }
}

/// Remote content store errors
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Malformed document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Document not found: {collection}/{id}")]
    NotFound { collection: String, id: String },

    #[error("Content store is not configured")]
    Unconfigured,

    #[error("Store rejected the request ({status}): {message}")]
    Api { status: u16, message: String },
}

impl StoreError {
    pub fn user_message(&self) -> String {
        match self {
            StoreError::Http(_) => "Could not reach the content server".to_string(),
            StoreError::Json(_) => "The content server returned unreadable data".to_string(),
            StoreError::NotFound { collection, id } => {
                format!("No {} record with id '{}'", collection.trim_end_matches('s'), id)
            }
            StoreError::Unconfigured => {
                "No content server configured - using the built-in sample content".to_string()
            }
            StoreError::Api { status, message } => {
                format!("Content server rejected the request ({}): {}", status, message)
            }
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            StoreError::Http(_) => vec![
                "Check your network connection".to_string(),
                "Run 'refresh' once the connection is back".to_string(),
            ],
            StoreError::Json(_) => vec!["Run 'refresh' to fetch the content again".to_string()],
            StoreError::NotFound { .. } => {
                vec!["List the collection to see valid ids".to_string()]
            }
            StoreError::Unconfigured => {
                vec!["Set store_url in the configuration file".to_string()]
            }
            StoreError::Api { .. } => vec!["Verify the store API key in the configuration".to_string()],
        }
    }

    pub fn is_recoverable(&self) -> bool {
        matches!(self, StoreError::Http(_) | StoreError::Json(_))
    }
}

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Could not determine the configuration directory")]
    ConfigDirNotFound,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] toml::de::Error),
}

impl ConfigError {
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::ConfigDirNotFound => {
                "Could not locate a home directory for configuration".to_string()
            }
            ConfigError::Io(err) => format!("Could not read or write the configuration file: {}", err),
            ConfigError::Serialization(_) | ConfigError::Deserialization(_) => {
                "The configuration file is malformed".to_string()
            }
        }
    }

    pub fn recovery_suggestions(&self) -> Vec<String> {
        match self {
            ConfigError::ConfigDirNotFound => vec!["Set the HOME environment variable".to_string()],
            ConfigError::Io(_) => vec!["Check permissions on ~/.config/church-player".to_string()],
            ConfigError::Serialization(_) | ConfigError::Deserialization(_) => {
                vec!["Delete the config file to regenerate defaults".to_string()]
            }
        }
    }
}

/// Admin form validation errors, surfaced directly to the user
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ValidationError {
    pub fn user_message(&self) -> String {
        match self {
            ValidationError::MissingField { field } => format!("'{}' is required", field),
            ValidationError::InvalidValue { field, reason } => {
                format!("'{}' is invalid: {}", field, reason)
            }
        }
    }
}
