mod cli;
mod commands;
mod config;
mod observability;
mod output;

use anyhow::Result;
use clap::Parser;

use cli::{Cli, Commands};
use output::print_error;

#[tokio::main]
async fn main() {
    // Load .env file if present (before anything else)
    if let Err(e) = dotenvy::dotenv() {
        // Not an error if .env doesn't exist - it's optional
        if !matches!(e, dotenvy::Error::Io(ref io_err) if io_err.kind() == std::io::ErrorKind::NotFound)
        {
            eprintln!("Warning: Failed to load .env file: {e}");
        }
    }

    observability::init_tracing();

    if let Err(e) = run().await {
        print_error(&format!("{e:#}"));
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    match &cli.command {
        Commands::Issue(args) => {
            let cfg = config::loader::load_config(cli.config.as_deref())?;
            observability::apply_logging_level(&cfg.logging.level);
            commands::issue::issue(&cfg, args).await?;
        }
        Commands::Verify(args) => {
            let cfg = config::loader::load_config(cli.config.as_deref())?;
            observability::apply_logging_level(&cfg.logging.level);
            commands::verify::verify(&cfg, args)?;
        }
        Commands::Keygen(args) => {
            commands::keygen::keygen(args)?;
        }
    }

    Ok(())
}
