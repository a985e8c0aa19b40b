//! Link management commands

mod create;
mod deactivate;
mod info;
mod list;
mod resolve;
mod stats;

pub use create::create_link;
pub use deactivate::deactivate_link;
pub use info::link_info;
pub use list::list_links;
pub use resolve::resolve_link;
pub use stats::link_stats;

use colored::Colorize;

use crate::services::LinkResponse;

fn print_link(link: &LinkResponse) {
    let status = if link.active {
        "active".green()
    } else {
        "inactive".red()
    };
    println!(
        "  {} -> {}",
        link.code.cyan(),
        link.destination.blue().underline()
    );
    println!(
        "    {} {}  {} {}  {} {}",
        "status:".dimmed(),
        status,
        "clicks:".dimmed(),
        link.click_count.to_string().magenta(),
        "expires:".dimmed(),
        link.expires_at
            .format("%Y-%m-%d %H:%M:%S UTC")
            .to_string()
            .yellow()
    );
}
