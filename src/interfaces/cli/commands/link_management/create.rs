use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::{CreateLinkRequest, LinkService};

pub async fn create_link(
    service: &LinkService,
    url: String,
    owner: String,
    days: Option<u32>,
) -> Result<(), CliError> {
    let link = service
        .create_link(CreateLinkRequest {
            target: url,
            expiration_days: days,
            owner,
        })
        .await?;

    println!(
        "{} Created short link: {} -> {} (expires: {})",
        "✓".bold().green(),
        link.code.cyan(),
        link.destination.blue().underline(),
        link.expires_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .yellow()
    );
    Ok(())
}
