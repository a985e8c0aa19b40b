use std::sync::Arc;

use clap::Parser;

use linkforge::cli::Cli;
use linkforge::config::{StaticConfig, init_config};
use linkforge::interfaces::cli::run_cli_command;
use linkforge::system::init_logging;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // `config generate` must work even when the current config is broken
    let config = if cli.command.is_offline() {
        Arc::new(StaticConfig::default())
    } else {
        let config = init_config(cli.config.as_deref());
        if let Err(e) = config.validate() {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
        config
    };

    let _guard = match init_logging(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{}", e.format_colored());
            std::process::exit(1);
        }
    };

    if let Err(e) = run_cli_command(cli.command, &config).await {
        eprintln!("{}", e.format_colored());
        std::process::exit(1);
    }
}
