//! Pelis - Browse movies on a Jellyfin media server
//!
//! A command-line front end that lists, searches and describes the movies of a
//! Jellyfin-compatible server and prints their stream URLs.

use std::env;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pelis::api::ApiClient;
use pelis::app::{describe_error, App};
use pelis::cli::{Cli, CliError};
use pelis::config::Config;
use pelis::service::MovieService;

/// Sends logs to stderr so command output on stdout stays clean
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pelis=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run(cli: Cli) -> Result<String, CliError> {
    let config = Config::from_lookup_with_overrides(
        |name| env::var(name).ok(),
        cli.base_url.as_deref(),
        cli.api_key.as_deref(),
        cli.timeout,
    )?;
    tracing::info!(base_url = %config.base_url, "using media server");

    let client = ApiClient::new(&config)?;
    let service = MovieService::new(client, config.cache_ttl);
    let app = App::new(service);

    app.execute(&cli.command).await
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(CliError::Api(error)) => {
            eprintln!("error: {}", describe_error(&error));
            ExitCode::FAILURE
        }
        Err(error) => {
            eprintln!("error: {}", error);
            ExitCode::FAILURE
        }
    }
}
