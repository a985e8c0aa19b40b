use std::collections::BTreeMap;

use colored::Colorize;

use crate::interfaces::cli::CliError;
use crate::services::LinkService;

fn print_breakdown(title: &str, counts: &BTreeMap<String, u64>) {
    if counts.is_empty() {
        return;
    }
    println!("  {}", title.bold());
    for (key, count) in counts {
        println!("    {:<16} {}", key, count.to_string().magenta());
    }
}

pub async fn link_stats(service: &LinkService, code: String, days: u32) -> Result<(), CliError> {
    let stats = service.get_stats(&code, Some(days)).await?;

    println!(
        "{} {} -> {}",
        "Stats for".bold(),
        stats.short_code.cyan(),
        stats.original_url.blue().underline()
    );

    if let Some(message) = &stats.message {
        println!("  {} {}", "⚠".bold().yellow(), message.yellow());
    }

    println!(
        "  {} {}",
        "total clicks:".dimmed(),
        stats.total_clicks.to_string().magenta()
    );
    print_breakdown(&format!("by date (last {} days)", days), &stats.clicks_by_date);
    print_breakdown("by browser", &stats.clicks_by_browser);
    print_breakdown("by device", &stats.clicks_by_device_type);
    Ok(())
}
