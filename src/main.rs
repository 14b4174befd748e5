use std::sync::Arc;

use clap::Parser;
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use pulse::application::config::AppConfig;
use pulse::application::context::AppContext;
use pulse::presentation::cli::app::{Cli, Commands};
use pulse::presentation::cli::commands::ping::run_ping;
use pulse::presentation::cli::commands::serve::{bind, ctrl_c, run_serve};

fn print_banner(listen_addr: &str) {
    println!("{}", "━".repeat(40).cyan());
    println!("{}", "  PULSE — Metric Anomaly Service".bold().cyan());
    println!("  {}", listen_addr.dimmed());
    println!("{}", "━".repeat(40).cyan());
}

fn setup_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_tracing(cli.verbose);

    let mut config = AppConfig::load(cli.config.as_deref())?;

    let listen = match cli.command {
        Some(Commands::Ping) => return run_ping(&config.store).await,
        Some(Commands::Serve { listen }) => listen,
        None => None,
    };
    if let Some(addr) = listen {
        config.server.listen_addr = addr;
    }

    let listener = bind(&config.server.listen_addr).await?;
    // Startup aborts here if the store cannot be reached.
    let ctx = Arc::new(AppContext::from_config(&config).await?);
    print_banner(&config.server.listen_addr);
    run_serve(ctx, listener, ctrl_c()).await
}
