//! CLI command definitions and dispatch for the `postpilot` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod chat;
pub mod chats;
pub mod status;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Chat backend for the PostPilot social media content assistant.
#[derive(Parser)]
#[command(name = "postpilot", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Export tracing spans to stdout via OpenTelemetry.
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on (default from config, 3000).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to (default from config, 127.0.0.1).
        #[arg(long)]
        host: Option<String>,
    },

    /// Inspect and manage stored chats.
    Chats {
        #[command(subcommand)]
        action: ChatsAction,
    },

    /// Chat interactively through a running server.
    Chat {
        /// User id that owns the chats.
        #[arg(short, long)]
        user: String,

        /// Base URL of the PostPilot server.
        #[arg(long, env = "POSTPILOT_SERVER", default_value = "http://127.0.0.1:3000")]
        server: String,
    },

    /// Show chat counts and configuration.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ChatsAction {
    /// List a user's chats, most recently updated first.
    #[command(alias = "ls")]
    List {
        /// Owner of the chats.
        #[arg(short, long)]
        user: String,

        /// Page number (1-based).
        #[arg(long, default_value_t = 1)]
        page: i64,

        /// Chats per page.
        #[arg(long, default_value_t = 10)]
        limit: i64,

        /// Include every message (JSON output only shows them).
        #[arg(long)]
        full: bool,
    },

    /// Show a chat with all its messages.
    Show {
        /// Chat id.
        id: String,
    },

    /// Delete a chat permanently.
    #[command(alias = "rm")]
    Delete {
        /// Chat id.
        id: String,

        /// Skip the confirmation prompt.
        #[arg(short, long)]
        force: bool,
    },
}

/// Short human-readable age of a timestamp.
pub(crate) fn format_relative_time(dt: &chrono::DateTime<chrono::Utc>) -> String {
    let now = chrono::Utc::now();
    let diff = now - *dt;

    if diff.num_minutes() < 1 {
        "just now".to_string()
    } else if diff.num_hours() < 1 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_days() < 1 {
        format!("{}h ago", diff.num_hours())
    } else if diff.num_days() < 30 {
        format!("{}d ago", diff.num_days())
    } else {
        dt.format("%Y-%m-%d").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_chats_list() {
        let cli = Cli::try_parse_from(["postpilot", "chats", "list", "--user", "u1", "--page", "2"])
            .unwrap();
        match cli.command {
            Commands::Chats {
                action: ChatsAction::List { user, page, limit, full },
            } => {
                assert_eq!(user, "u1");
                assert_eq!(page, 2);
                assert_eq!(limit, 10);
                assert!(!full);
            }
            _ => panic!("expected chats list"),
        }
    }

    #[test]
    fn relative_time_buckets() {
        let now = Utc::now();
        assert_eq!(format_relative_time(&now), "just now");
        assert_eq!(format_relative_time(&(now - Duration::minutes(5))), "5m ago");
        assert_eq!(format_relative_time(&(now - Duration::hours(3))), "3h ago");
        assert_eq!(format_relative_time(&(now - Duration::days(2))), "2d ago");
    }
}
