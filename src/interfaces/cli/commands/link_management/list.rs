use colored::Colorize;

use super::print_link;
use crate::interfaces::cli::CliError;
use crate::services::LinkService;

pub async fn list_links(service: &LinkService, owner: String) -> Result<(), CliError> {
    let links = service.list_links(&owner).await?;

    if links.is_empty() {
        println!("{} No links for {}", "ℹ".bold().blue(), owner.cyan());
        return Ok(());
    }

    println!("{} ({}):", "Links".bold(), links.len());
    for link in &links {
        print_link(link);
    }
    Ok(())
}
