use crate::output::SessionResult;
use crate::{logging, tui};
use anyhow::Context;
use clap::Parser;
use homeflake_core::config::Settings;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

/// Interactive switcher for isolated nix flake home profiles.
///
/// Prints exactly one JSON line on stdout describing the session outcome.
#[derive(Debug, Parser)]
#[command(name = "homeflake", version)]
pub struct Cli {
    /// Directory holding one subdirectory per flake (default: ~/nix)
    #[arg(long, value_name = "DIR")]
    catalog_dir: Option<PathBuf>,
    /// Profiles file (default: ~/.config/nix-profiles.json)
    #[arg(long = "store", value_name = "FILE")]
    store: Option<PathBuf>,
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    let log_buffer = logging::init();

    let result = Settings::from_env()
        .context("resolve settings")
        .map(|settings| {
            settings
                .with_catalog_dir(cli.catalog_dir)
                .with_store_path(cli.store)
        })
        .and_then(tui::run_tui);

    logging::replay_to_stderr(&log_buffer);

    match result {
        Ok(tui::SessionEnd::Finished(outcome)) => {
            info!(action = outcome.action(), "Session finished");
            print_result(&outcome)
        }
        Ok(tui::SessionEnd::ForceQuit) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "TUI error");
            print_result(&SessionResult::Error {
                error: format!("{err:#}"),
            });
            ExitCode::FAILURE
        }
    }
}

fn print_result(outcome: &SessionResult) -> ExitCode {
    match outcome.to_json_line() {
        Ok(line) => {
            println!("{line}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("failed to serialize session result: {err:#}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_overrides() {
        let cli = Cli::parse_from(["homeflake", "--catalog-dir", "/f", "--store", "/s.json"]);
        assert_eq!(cli.catalog_dir, Some(PathBuf::from("/f")));
        assert_eq!(cli.store, Some(PathBuf::from("/s.json")));
        let bare = Cli::parse_from(["homeflake"]);
        assert!(bare.catalog_dir.is_none() && bare.store.is_none());
    }
}
