use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::LinkService;
use crate::storage::DeactivateOutcome;

pub async fn deactivate_link(service: &LinkService, code: String) -> Result<(), CliError> {
    match service.deactivate(&code).await? {
        DeactivateOutcome::AlreadyInactive => println!(
            "{} Link {} was already inactive",
            "ℹ".bold().blue(),
            code.cyan()
        ),
        _ => println!("{} Deactivated link: {}", "✓".bold().green(), code.cyan()),
    }
    Ok(())
}
