//! Command-line interface parsing for the pelis CLI
//!
//! This module handles parsing of CLI arguments using clap: global connection
//! flags that override the environment, and one subcommand per library lookup.

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::api::ApiError;
use crate::config::ConfigError;

/// Default number of movies listed per command
pub const DEFAULT_LIST_LIMIT: u32 = 50;

/// Error types surfaced by the CLI
#[derive(Debug, Error)]
pub enum CliError {
    /// Search was given an empty or whitespace-only term
    #[error("Search term must not be empty")]
    EmptySearchTerm,

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Pelis - Browse movies on a Jellyfin media server
#[derive(Parser, Debug)]
#[command(name = "pelis")]
#[command(about = "Browse and play movies from a Jellyfin media server")]
#[command(version)]
pub struct Cli {
    /// Media server root URL (overrides JELLYFIN_BASE_URL)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// API key (overrides JELLYFIN_API_KEY)
    #[arg(long, global = true, value_name = "KEY")]
    pub api_key: Option<String>,

    /// Request timeout in seconds (overrides PELIS_TIMEOUT_SECS)
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

/// Library lookups
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// List movies, newest first
    List {
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT, value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
    },
    /// Search movies by title
    ///
    /// Falls back to filtering the full listing locally if the server search fails.
    Search {
        term: String,
        #[arg(long, default_value_t = DEFAULT_LIST_LIMIT, value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
    },
    /// Show details for a movie
    Show { id: String },
    /// Recently added movies
    Recent {
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
    },
    /// Most played movies
    Popular {
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
    },
    /// Movies not yet watched
    Unwatched {
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
    },
    /// Movies in a genre
    Genre {
        genre: String,
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
    },
    /// Movies from a production year
    Year {
        year: i32,
        #[arg(long, default_value_t = 20, value_parser = clap::value_parser!(u32).range(1..))]
        limit: u32,
    },
    /// Print the direct stream URL for a movie
    PlayUrl { id: String },
    /// Print the user id requests are scoped to
    Whoami,
}

/// Trims a search term, rejecting empty input
pub fn parse_search_term(term: &str) -> Result<&str, CliError> {
    let trimmed = term.trim();
    if trimmed.is_empty() {
        Err(CliError::EmptySearchTerm)
    } else {
        Ok(trimmed)
    }
}
