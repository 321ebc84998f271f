//! echoline: a line echo utility
//!
//! Reads lines from one input origin and writes them back out:
//! - standard input or a file, echoed to standard output
//! - a single accepted TCP connection, echoed back to the peer
//! - local input forwarded to a remote listener
//!
//! Features:
//! - Raw, canonical, or interactive line reading
//! - Interactive line readers with prompt and history (basic, emacs, vi)
//! - Flat-file history persisted across sessions
//! - Configuration via CLI arguments or TOML file

mod config;
mod echo;
mod editor;
mod error;
mod history;
mod source;
mod transport;

use std::process::ExitCode;

use config::{Action, Config, LineReader};
use error::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    // Load configuration
    let config = match Config::load() {
        Ok(Action::Run(config)) => config,
        Ok(Action::Help(usage)) => {
            print!("{usage}");
            return ExitCode::SUCCESS;
        }
        Ok(Action::Version) => {
            print_version();
            return ExitCode::SUCCESS;
        }
        Err(e) => return exit_with(e),
    };

    // Initialize logging; stdout carries echoed data only
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    info!(
        strategy = ?config.strategy(),
        file = ?config.filename,
        socket = ?config.socket,
        connect_to = ?config.connect_to,
        history = ?config.history,
        "Starting echoline"
    );

    match transport::run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => exit_with(e),
    }
}

fn print_version() {
    println!("echoline {}", env!("CARGO_PKG_VERSION"));
    println!("Line readers: {}", LineReader::SUPPORTED.join(", "));
}

fn exit_with(e: Error) -> ExitCode {
    eprintln!("Error: {e}");
    ExitCode::from(e.exit_code())
}
