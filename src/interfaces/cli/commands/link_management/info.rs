use colored::Colorize;

use super::print_link;
use crate::interfaces::cli::CliError;
use crate::services::LinkService;

pub async fn link_info(service: &LinkService, code: String) -> Result<(), CliError> {
    let link = service.get_link(&code).await?;
    println!("{}", "Link:".bold());
    print_link(&link);
    println!(
        "    {} {}  {} {}",
        "owner:".dimmed(),
        link.owner_id,
        "created:".dimmed(),
        link.created_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    Ok(())
}
