use std::time::Duration;

use clap::{Parser, Subcommand};

pub mod status;
pub use status::StatusDisplay;

/// Church media player CLI
#[derive(Parser)]
#[command(name = "churchplay")]
#[command(about = "Sermon player and content browser for the church community app")]
#[command(version = "0.1.0")]
pub struct CliApp {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available CLI commands
#[derive(Debug, Subcommand, PartialEq)]
pub enum Commands {
    /// Play an episode by id; on the loaded episode this toggles pause
    Play {
        /// Episode id (see 'browse episodes')
        episode_id: String,
    },
    /// Pause the loaded episode
    Pause,
    /// Resume the loaded episode
    Resume,
    /// Stop playback, release the audio resource and hide the player
    Stop,
    /// Seek to a time position
    Seek {
        /// Time offset (e.g., "1:30", "90", "90s")
        position: String,
    },
    /// Skip forward by the configured step
    #[command(alias = "ff")]
    Forward,
    /// Skip backward by the configured step
    #[command(alias = "rw")]
    Backward,
    /// Collapse the player to the mini bar
    Minimize,
    /// Restore the full player
    Expand,
    /// Display the player and browse state
    Status,
    /// Continuously redraw the player status (live view)
    Watch,
    /// Browse series and episodes
    Browse {
        #[command(subcommand)]
        action: BrowseAction,
    },
    /// Set the search text filter (no argument clears it)
    Search {
        query: Option<String>,
    },
    /// Set the category filter ("All", "Recent" or a literal category)
    Category {
        name: Option<String>,
    },
    /// Refetch all content from the store
    Refresh,
    /// List news articles
    News,
    /// List events
    Events,
    /// List channel videos
    Videos {
        /// Maximum number of videos to list
        limit: Option<usize>,
    },
    /// Show giving presets and payment methods
    Giving,
    /// Admin content management
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

/// Series/episode browsing subcommands
#[derive(Debug, Subcommand, PartialEq)]
pub enum BrowseAction {
    /// List series under the active filter
    Series,
    /// Open a series' episode list
    Open {
        /// Series id
        series_id: String,
    },
    /// Return to the series list
    Back,
    /// List episodes of the open series (or all sermons)
    Episodes,
}

/// Admin management subcommands
#[derive(Debug, Subcommand, PartialEq)]
pub enum AdminAction {
    /// Create a record from a JSON document
    Create {
        /// Collection name (sermons, series, events, news, givingOptions, paymentMethods)
        collection: String,
        /// The record as JSON
        json: String,
    },
    /// Apply a partial JSON update to a record
    Update {
        collection: String,
        id: String,
        /// The changed fields as JSON
        json: String,
    },
    /// Delete a record
    Delete {
        collection: String,
        id: String,
    },
}

impl CliApp {
    pub fn new() -> Self {
        Self { command: None }
    }

    /// Parse command line arguments
    pub fn parse_args() -> Self {
        <Self as clap::Parser>::parse()
    }

    /// Parse command from string (for interactive mode)
    pub fn parse_command(input: &str) -> Result<Commands, ParseError> {
        let args: Vec<&str> = input.trim().split_whitespace().collect();
        if args.is_empty() {
            return Err(ParseError::EmptyCommand);
        }

        match args[0] {
            "play" => {
                if args.len() > 1 {
                    Ok(Commands::Play {
                        episode_id: args[1].to_string(),
                    })
                } else {
                    Err(ParseError::MissingArgument {
                        command: "play".to_string(),
                        argument: "episode id".to_string(),
                    })
                }
            }
            "pause" => Ok(Commands::Pause),
            "resume" => Ok(Commands::Resume),
            "stop" => Ok(Commands::Stop),
            "seek" => {
                if args.len() > 1 {
                    Ok(Commands::Seek {
                        position: args[1].to_string(),
                    })
                } else {
                    Err(ParseError::MissingArgument {
                        command: "seek".to_string(),
                        argument: "position".to_string(),
                    })
                }
            }
            "forward" | "ff" => Ok(Commands::Forward),
            "backward" | "rw" => Ok(Commands::Backward),
            "minimize" => Ok(Commands::Minimize),
            "expand" => Ok(Commands::Expand),
            "status" => Ok(Commands::Status),
            "watch" => Ok(Commands::Watch),
            "browse" => {
                if args.len() < 2 {
                    return Err(ParseError::MissingArgument {
                        command: "browse".to_string(),
                        argument: "action".to_string(),
                    });
                }
                match args[1] {
                    "series" => Ok(Commands::Browse {
                        action: BrowseAction::Series,
                    }),
                    "open" => {
                        if args.len() > 2 {
                            Ok(Commands::Browse {
                                action: BrowseAction::Open {
                                    series_id: args[2].to_string(),
                                },
                            })
                        } else {
                            Err(ParseError::MissingArgument {
                                command: "browse open".to_string(),
                                argument: "series id".to_string(),
                            })
                        }
                    }
                    "back" => Ok(Commands::Browse {
                        action: BrowseAction::Back,
                    }),
                    "episodes" => Ok(Commands::Browse {
                        action: BrowseAction::Episodes,
                    }),
                    _ => Err(ParseError::UnknownCommand {
                        command: format!("browse {}", args[1]),
                    }),
                }
            }
            "search" => {
                if args.len() > 1 {
                    Ok(Commands::Search {
                        query: Some(args[1..].join(" ")),
                    })
                } else {
                    Ok(Commands::Search { query: None })
                }
            }
            "category" => {
                if args.len() > 1 {
                    Ok(Commands::Category {
                        name: Some(args[1..].join(" ")),
                    })
                } else {
                    Ok(Commands::Category { name: None })
                }
            }
            "refresh" => Ok(Commands::Refresh),
            "news" => Ok(Commands::News),
            "events" => Ok(Commands::Events),
            "videos" => {
                if args.len() > 1 {
                    match args[1].parse::<usize>() {
                        Ok(limit) => Ok(Commands::Videos { limit: Some(limit) }),
                        Err(_) => Err(ParseError::InvalidArgument {
                            argument: "limit".to_string(),
                            value: args[1].to_string(),
                            expected: "a number".to_string(),
                        }),
                    }
                } else {
                    Ok(Commands::Videos { limit: None })
                }
            }
            "giving" => Ok(Commands::Giving),
            "admin" => {
                if args.len() < 2 {
                    return Err(ParseError::MissingArgument {
                        command: "admin".to_string(),
                        argument: "action".to_string(),
                    });
                }
                match args[1] {
                    "create" => {
                        if args.len() > 3 {
                            Ok(Commands::Admin {
                                action: AdminAction::Create {
                                    collection: args[2].to_string(),
                                    json: args[3..].join(" "),
                                },
                            })
                        } else {
                            Err(ParseError::MissingArgument {
                                command: "admin create".to_string(),
                                argument: "collection and json".to_string(),
                            })
                        }
                    }
                    "update" => {
                        if args.len() > 4 {
                            Ok(Commands::Admin {
                                action: AdminAction::Update {
                                    collection: args[2].to_string(),
                                    id: args[3].to_string(),
                                    json: args[4..].join(" "),
                                },
                            })
                        } else {
                            Err(ParseError::MissingArgument {
                                command: "admin update".to_string(),
                                argument: "collection, id and json".to_string(),
                            })
                        }
                    }
                    "delete" => {
                        if args.len() > 3 {
                            Ok(Commands::Admin {
                                action: AdminAction::Delete {
                                    collection: args[2].to_string(),
                                    id: args[3].to_string(),
                                },
                            })
                        } else {
                            Err(ParseError::MissingArgument {
                                command: "admin delete".to_string(),
                                argument: "collection and id".to_string(),
                            })
                        }
                    }
                    _ => Err(ParseError::UnknownCommand {
                        command: format!("admin {}", args[1]),
                    }),
                }
            }
            "help" => Err(ParseError::HelpRequested),
            _ => Err(ParseError::UnknownCommand {
                command: args[0].to_string(),
            }),
        }
    }

    /// Parse a seek offset: "1:30", "90", "90s" or "1:30.5"
    pub fn parse_time(time_str: &str) -> Result<Duration, ParseError> {
        let trimmed = time_str.trim();

        if trimmed.is_empty() {
            return Err(ParseError::InvalidTimeFormat {
                input: time_str.to_string(),
            });
        }

        if trimmed.contains(':') {
            let parts: Vec<&str> = trimmed.split(':').collect();
            if parts.len() != 2 {
                return Err(ParseError::InvalidTimeFormat {
                    input: time_str.to_string(),
                });
            }

            let minutes: u64 = parts[0].parse().map_err(|_| ParseError::InvalidTimeFormat {
                input: time_str.to_string(),
            })?;

            let seconds_f64: f64 = parts[1].parse().map_err(|_| ParseError::InvalidTimeFormat {
                input: time_str.to_string(),
            })?;

            if seconds_f64 < 0.0 || seconds_f64 >= 60.0 {
                return Err(ParseError::InvalidTimeFormat {
                    input: time_str.to_string(),
                });
            }

            let total_seconds = minutes as f64 * 60.0 + seconds_f64;
            Ok(Duration::from_secs_f64(total_seconds))
        } else {
            let seconds_str = trimmed.trim_end_matches('s');
            let seconds_f64: f64 = seconds_str.parse().map_err(|_| ParseError::InvalidTimeFormat {
                input: time_str.to_string(),
            })?;

            if seconds_f64 < 0.0 {
                return Err(ParseError::InvalidTimeFormat {
                    input: time_str.to_string(),
                });
            }

            Ok(Duration::from_secs_f64(seconds_f64))
        }
    }

    /// Display help information
    pub fn display_help() {
        println!("Church Media Player - Available Commands:");
        println!();
        println!("Playback Control:");
        println!("  play <episode-id>   - Play an episode (toggles pause on the loaded one)");
        println!("  pause / resume      - Pause or resume the loaded episode");
        println!("  stop                - Stop playback and hide the player");
        println!("  seek <time>         - Seek to position (e.g., '1:30', '90s')");
        println!("  forward / backward  - Skip by the configured step");
        println!("  minimize / expand   - Collapse or restore the player chrome");
        println!();
        println!("Browsing:");
        println!("  browse series           - List series under the active filter");
        println!("  browse open <id>        - Open a series' episode list");
        println!("  browse back             - Return to the series list");
        println!("  browse episodes         - List episodes of the current view");
        println!("  search [text]           - Set or clear the search filter");
        println!("  category [name]         - Set the category ('All', 'Recent', or literal)");
        println!("  refresh                 - Refetch content from the store");
        println!();
        println!("Content:");
        println!("  news                - List news articles");
        println!("  events              - List events");
        println!("  videos [n]          - List channel videos");
        println!("  giving              - Show giving presets and payment methods");
        println!();
        println!("Admin:");
        println!("  admin create <collection> <json>       - Create a record");
        println!("  admin update <collection> <id> <json>  - Patch a record");
        println!("  admin delete <collection> <id>         - Delete a record");
        println!();
        println!("Information:");
        println!("  status              - Show player and browse state");
        println!("  watch               - Live status view");
        println!();
        println!("General:");
        println!("  help                - Show this help message");
        println!("  exit, quit          - Exit the player");
    }
}

impl Default for CliApp {
    fn default() -> Self {
        Self::new()
    }
}

/// Command parsing errors
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Empty command")]
    EmptyCommand,

    #[error("Unknown command: {command}")]
    UnknownCommand { command: String },

    #[error("Unknown collection: {name}")]
    UnknownCollection { name: String },

    #[error("Missing argument for {command}: {argument}")]
    MissingArgument { command: String, argument: String },

    #[error("Invalid argument {argument}: got '{value}', expected {expected}")]
    InvalidArgument {
        argument: String,
        value: String,
        expected: String,
    },

    #[error("Invalid time format: {input}")]
    InvalidTimeFormat { input: String },

    #[error("Invalid JSON document: {0}")]
    InvalidJson(String),

    #[error("Help requested")]
    HelpRequested,
}
