//! secfetch - resolve secret placeholders in streamed text
//!
//! Reads lines from stdin, replaces placeholders with secret values and
//! writes the result to stdout. All diagnostics go to stderr.

mod cli;
mod driver;

use anyhow::{Context, Result};
use clap::Parser;
use secfetch_secrets::{build_registry, AwsClients, SecretResolver};
use std::process::ExitCode;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::Cli;

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_tracing(cli.verbose, cli.quiet);

    let config = cli.config();
    config.validate().context("invalid configuration")?;

    let clients = AwsClients::load(cli.region.clone()).await;
    let registry = build_registry(&config.prefixes, clients.ssm, clients.secrets_manager)?;
    let resolver = SecretResolver::from_config(registry, &config);

    let summary = driver::process(
        &resolver,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        config.ignore_errors,
    )
    .await
    .context("failed to write output")?;

    if summary.has_failures() && config.ignore_errors {
        info!(
            unresolved = summary.unresolved,
            "finished with unresolved placeholders (errors ignored)"
        );
    }

    Ok(summary.exit_code())
}

/// Initialize tracing on stderr with appropriate verbosity
fn init_tracing(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("info"),
            1 => EnvFilter::new("debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}
