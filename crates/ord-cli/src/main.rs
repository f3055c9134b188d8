//! # ord CLI entry point
//!
//! Parses command-line arguments, installs the tracing subscriber and
//! dispatches to the subcommand handlers.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ord_cli::config::CliConfig;
use ord_cli::fetch::{run_fetch, FetchArgs};
use ord_cli::hash::{run_hash, HashArgs};
use ord_cli::validate::{run_validate, ValidateArgs};
use ord_cli::EXIT_FAILURE;

/// Open Resource Discovery ingestion toolchain.
///
/// Fetches, sanitizes and validates ORD documents the same way the
/// aggregator does, and prints the result as JSON.
#[derive(Parser, Debug)]
#[command(name = "ord", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    /// YAML or JSON configuration file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch, sanitize and validate an application's documents.
    Fetch(FetchArgs),

    /// Sanitize and locally validate document files.
    Validate(ValidateArgs),

    /// Print the structural hash of every resource in a document.
    Hash(HashArgs),
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);

    let result = match load_config(cli.config.as_deref()) {
        Ok(config) => match &cli.command {
            Commands::Fetch(args) => run_fetch(args, &config).await,
            Commands::Validate(args) => run_validate(args),
            Commands::Hash(args) => run_hash(args),
        },
        Err(e) => Err(e),
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(EXIT_FAILURE)
        }
    }
}

fn verbosity_filter(verbose: u8) -> EnvFilter {
    match verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    }
}

/// Logs go to stderr; stdout carries the report.
fn init_tracing(verbose: u8, json: bool) {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(verbosity_filter(verbose))
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<CliConfig> {
    match path {
        Some(path) => CliConfig::load(path),
        None => Ok(CliConfig::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_fetch_with_validator() {
        let cli = Cli::try_parse_from([
            "ord",
            "fetch",
            "--url",
            "https://app.acme.com/.well-known/open-resource-discovery",
            "--validator-url",
            "https://validator.acme.com",
            "--ruleset",
            "sap:core:v1",
            "--output",
            "report.json",
        ])
        .unwrap();
        let Commands::Fetch(args) = cli.command else {
            panic!("expected fetch");
        };
        assert_eq!(args.validator_url.as_deref(), Some("https://validator.acme.com"));
        assert_eq!(args.ruleset.as_deref(), Some("sap:core:v1"));
        assert_eq!(args.output, Some(PathBuf::from("report.json")));
        assert_eq!(args.app_namespace, "");
    }

    #[test]
    fn fetch_requires_url() {
        assert!(Cli::try_parse_from(["ord", "fetch"]).is_err());
    }

    #[test]
    fn parse_validate_files() {
        let cli = Cli::try_parse_from([
            "ord",
            "validate",
            "a.json",
            "b.yaml",
            "--base-url",
            "https://app.acme.com",
            "--stored",
            "stored.json",
        ])
        .unwrap();
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.files, vec![PathBuf::from("a.json"), PathBuf::from("b.yaml")]);
        assert_eq!(args.stored, Some(PathBuf::from("stored.json")));
    }

    #[test]
    fn validate_requires_files_and_base_url() {
        assert!(Cli::try_parse_from(["ord", "validate", "--base-url", "https://x.acme.com"]).is_err());
        assert!(Cli::try_parse_from(["ord", "validate", "a.json"]).is_err());
    }

    #[test]
    fn global_flags_anywhere() {
        let cli = Cli::try_parse_from(["ord", "hash", "doc.json", "-vv", "--log-json", "--config", "ord.yaml"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.log_json);
        assert_eq!(cli.config, Some(PathBuf::from("ord.yaml")));
    }

    #[test]
    fn missing_config_file_is_an_error() {
        assert!(load_config(Some(Path::new("/nonexistent/ord.yaml"))).is_err());
        assert_eq!(load_config(None).unwrap(), CliConfig::default());
    }
}
