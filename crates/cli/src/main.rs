mod commands;

use anyhow::{Context, Result};
use clikit_argparse::{CommandTable, StderrSink};
use std::io::{IsTerminal, Write};
use std::path::Path;
use tracing_subscriber::{EnvFilter, fmt};

/// Overrides the program name shown in usage and error messages.
const PROGRAM_NAME_VAR: &str = "CLIKIT_PROGRAM_NAME";
const DEFAULT_PROGRAM_NAME: &str = "clikit";

fn main() -> Result<()> {
    // .env may set RUST_LOG, so it is loaded before the subscriber
    let dotenv = dotenvy::dotenv();
    init_tracing();
    match dotenv {
        Ok(path) => tracing::debug!(path = %path.display(), "loaded environment file"),
        Err(err) if err.not_found() => {}
        Err(err) => tracing::warn!("failed to load .env: {err}"),
    }

    let argv: Vec<String> = std::env::args().collect();
    let mut table = CommandTable::new(program_name(&argv));
    commands::register_all(&mut table).context("failed to register commands")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let status = table.dispatch(&argv, &StderrSink, &mut out);
    out.flush().context("failed to flush stdout")?;
    drop(out);

    std::process::exit(status);
}

fn program_name(argv: &[String]) -> String {
    if let Ok(name) = std::env::var(PROGRAM_NAME_VAR) {
        if !name.trim().is_empty() {
            return name;
        }
    }
    argv.first()
        .and_then(|arg0| Path::new(arg0).file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| DEFAULT_PROGRAM_NAME.to_string())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .init();
}
