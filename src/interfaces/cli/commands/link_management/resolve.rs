use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::{ClickContext, LinkService};

pub async fn resolve_link(
    service: &LinkService,
    code: String,
    context: ClickContext,
) -> Result<(), CliError> {
    let destination = service.resolve(&code, context).await?;
    println!(
        "{} {} -> {}",
        "→".bold().green(),
        code.cyan(),
        destination.blue().underline()
    );
    Ok(())
}
