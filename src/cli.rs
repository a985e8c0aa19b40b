//! Command-line interface definitions using clap

use clap::{Parser, Subcommand};

use crate::analytics::stats::DEFAULT_STATS_DAYS;

/// linkforge - short links with collision-free codes
#[derive(Parser)]
#[command(name = "linkforge")]
#[command(version)]
#[command(about = "Create, resolve and inspect short links", long_about = None)]
pub struct Cli {
    /// Path to the TOML configuration file
    #[arg(long, short = 'c', global = true)]
    pub config: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a short link with a generated code
    Create {
        /// Destination URL (http or https)
        url: String,

        /// Username of the owner
        #[arg(long)]
        owner: String,

        /// Days until the link expires
        #[arg(long)]
        days: Option<u32>,
    },

    /// Resolve a code, counting one click
    Resolve {
        code: String,

        /// Visitor address recorded with the click
        #[arg(long)]
        ip: Option<String>,

        #[arg(long)]
        user_agent: Option<String>,

        #[arg(long)]
        referrer: Option<String>,
    },

    /// Deactivate a link (cannot be undone)
    Deactivate { code: String },

    /// Show a link's stored record
    Info { code: String },

    /// List an owner's links, newest first
    List {
        #[arg(long)]
        owner: String,
    },

    /// Show click statistics for a link
    Stats {
        code: String,

        /// Window for the per-day breakdown
        #[arg(long, default_value_t = DEFAULT_STATS_DAYS)]
        days: u32,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Write a configuration file with every default filled in
    Generate {
        /// Output path (default: config.example.toml)
        output_path: Option<String>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

impl Commands {
    /// Whether the command works without a database
    pub fn is_offline(&self) -> bool {
        matches!(self, Commands::Config { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_create() {
        let cli = Cli::parse_from([
            "linkforge",
            "-c",
            "custom.toml",
            "create",
            "https://example.com/a",
            "--owner",
            "alice",
            "--days",
            "3",
        ]);
        assert_eq!(cli.config.as_deref(), Some("custom.toml"));
        match cli.command {
            Commands::Create { url, owner, days } => {
                assert_eq!(url, "https://example.com/a");
                assert_eq!(owner, "alice");
                assert_eq!(days, Some(3));
            }
            _ => panic!("expected create"),
        }
    }

    #[test]
    fn test_stats_default_days() {
        let cli = Cli::parse_from(["linkforge", "stats", "4C92"]);
        match cli.command {
            Commands::Stats { code, days } => {
                assert_eq!(code, "4C92");
                assert_eq!(days, DEFAULT_STATS_DAYS);
            }
            _ => panic!("expected stats"),
        }
    }

    #[test]
    fn test_resolve_flags() {
        let cli = Cli::parse_from([
            "linkforge",
            "resolve",
            "abc",
            "--ip",
            "10.0.0.1",
            "--user-agent",
            "curl/8.0",
        ]);
        assert!(!cli.command.is_offline());
        match cli.command {
            Commands::Resolve {
                ip, user_agent, referrer, ..
            } => {
                assert_eq!(ip.as_deref(), Some("10.0.0.1"));
                assert_eq!(user_agent.as_deref(), Some("curl/8.0"));
                assert!(referrer.is_none());
            }
            _ => panic!("expected resolve"),
        }
    }

    #[test]
    fn test_config_generate_is_offline() {
        let cli = Cli::parse_from(["linkforge", "config", "generate", "out.toml"]);
        assert!(cli.command.is_offline());
    }
}
