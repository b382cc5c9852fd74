//! Integration tests for CLI argument handling
//!
//! Runs the binary for commands that need no live media server.

use std::process::Command;

/// Helper to run the CLI with given args and capture output
fn run_cli(args: &[&str]) -> std::process::Output {
    Command::new(env!("CARGO_BIN_EXE_pelis"))
        .args(args)
        .env_remove("JELLYFIN_API_KEY")
        .env_remove("JELLYFIN_BASE_URL")
        .env_remove("PELIS_TIMEOUT_SECS")
        .env_remove("PELIS_CACHE_TTL_SECS")
        .output()
        .expect("Failed to execute pelis")
}

/// Address of a local port with nothing listening on it
fn closed_port_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

#[test]
fn test_help_flag_exits_successfully() {
    let output = run_cli(&["--help"]);
    assert!(output.status.success(), "Expected --help to exit successfully");
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("pelis"), "Help should mention pelis");
    assert!(stdout.contains("search"), "Help should list the search command");
    assert!(stdout.contains("--api-key"), "Help should mention --api-key");
}

#[test]
fn test_missing_api_key_prints_error_and_exits() {
    let output = run_cli(&["list"]);
    assert!(!output.status.success(), "Expected missing API key to fail");
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("API key"),
        "Should explain the missing API key: {}",
        stderr
    );
}

#[test]
fn test_play_url_needs_no_server() {
    let output = run_cli(&[
        "play-url",
        "movie-1",
        "--api-key",
        "k",
        "--base-url",
        "http://media.lan:8096/",
    ]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        "http://media.lan:8096/Videos/movie-1/stream?static=true"
    );
}

#[test]
fn test_unreachable_server_reports_network_error() {
    let base_url = closed_port_url();
    let output = run_cli(&["whoami", "--api-key", "k", "--base-url", &base_url]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("Could not reach the media server"),
        "Should report a connectivity problem: {}",
        stderr
    );
}

#[test]
fn test_empty_search_term_is_rejected() {
    let output = run_cli(&["search", "  ", "--api-key", "k"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("must not be empty"), "{}", stderr);
}

#[cfg(test)]
mod unit_tests {
    //! Unit tests for CLI parsing that don't require running the binary

    use clap::Parser;
    use pelis::cli::{parse_search_term, Cli, Command};

    #[test]
    fn test_cli_parse_show() {
        let cli = Cli::parse_from(["pelis", "show", "abc"]);
        assert_eq!(cli.command, Command::Show { id: "abc".to_string() });
    }

    #[test]
    fn test_cli_parse_genre_default_limit() {
        let cli = Cli::parse_from(["pelis", "genre", "Drama"]);
        assert_eq!(
            cli.command,
            Command::Genre {
                genre: "Drama".to_string(),
                limit: 20
            }
        );
    }

    #[test]
    fn test_cli_parse_whoami() {
        let cli = Cli::parse_from(["pelis", "--api-key", "k", "whoami"]);
        assert_eq!(cli.command, Command::Whoami);
        assert_eq!(cli.api_key.as_deref(), Some("k"));
    }

    #[test]
    fn test_cli_rejects_non_numeric_year() {
        assert!(Cli::try_parse_from(["pelis", "year", "nineties"]).is_err());
    }

    #[test]
    fn test_parse_search_term_trims() {
        assert_eq!(parse_search_term(" alien ").unwrap(), "alien");
        assert!(parse_search_term("").is_err());
    }
}
