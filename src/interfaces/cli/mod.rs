//! CLI interface module

pub mod commands;

use std::fmt;

use crate::cli::{Commands, ConfigCommands};
use crate::config::StaticConfig;
use crate::errors::LinkforgeError;
use crate::runtime::{prepare_startup, shutdown};
use crate::services::ClickContext;
use commands::{
    create_link, deactivate_link, generate_config, link_info, link_stats, list_links,
    resolve_link,
};

#[derive(Debug)]
pub enum CliError {
    /// Startup failed before the command could run
    StartupError(String),
    /// The command ran and was refused
    Link(LinkforgeError),
    CommandError(String),
}

impl CliError {
    pub fn format_simple(&self) -> String {
        match self {
            CliError::StartupError(msg) => format!("Startup error: {}", msg),
            CliError::Link(err) => err.format_simple(),
            CliError::CommandError(msg) => format!("Command error: {}", msg),
        }
    }

    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        match self {
            CliError::StartupError(msg) => {
                format!("{} {}", "Startup error:".red().bold(), msg.white())
            }
            CliError::Link(err) => err.format_colored(),
            CliError::CommandError(msg) => {
                format!("{} {}", "Command error:".red().bold(), msg.white())
            }
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for CliError {}

impl From<LinkforgeError> for CliError {
    fn from(err: LinkforgeError) -> Self {
        CliError::Link(err)
    }
}

/// Run a CLI command from clap-parsed input
pub async fn run_cli_command(cmd: Commands, config: &StaticConfig) -> Result<(), CliError> {
    // Generate doesn't need storage
    if let Commands::Config {
        action: ConfigCommands::Generate { output_path, force },
    } = cmd
    {
        return generate_config(output_path, force).await;
    }

    let context = prepare_startup(config)
        .await
        .map_err(|e| CliError::StartupError(format!("{:#}", e)))?;
    let service = context.link_service.as_ref();

    let result = match cmd {
        Commands::Create { url, owner, days } => create_link(service, url, owner, days).await,

        Commands::Resolve {
            code,
            ip,
            user_agent,
            referrer,
        } => {
            let click = ClickContext {
                ip_address: ip,
                user_agent,
                referrer,
            };
            resolve_link(service, code, click).await
        }

        Commands::Deactivate { code } => deactivate_link(service, code).await,

        Commands::Info { code } => link_info(service, code).await,

        Commands::List { owner } => list_links(service, owner).await,

        Commands::Stats { code, days } => link_stats(service, code, days).await,

        Commands::Config { .. } => unreachable!("handled above"),
    };

    // the click of a `resolve` is still queued here
    shutdown(&context).await;
    result
}
