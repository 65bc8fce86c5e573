//! CLI binary for `taskmaster`.
//!
//! This binary is a thin wrapper that opens a session and delegates to the
//! library.

use std::process::ExitCode;

use clap::Parser;
use taskmaster::cli::{run, Cli};
use taskmaster::{paths, App};
use tracing_subscriber::EnvFilter;

/// Environment variable controlling log verbosity.
const LOG_ENV_VAR: &str = "TASKMASTER_LOG";

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing();

    let Some(data_dir) = paths::data_dir() else {
        eprintln!("Error: could not determine home directory (set {})", paths::HOME_ENV_VAR);
        return ExitCode::from(1);
    };

    let mut app = match App::open(&data_dir) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::from(1);
        }
    };

    let output = run(cli.command, &mut app);

    for line in output.stdout {
        println!("{line}");
    }
    for line in output.stderr {
        eprintln!("{line}");
    }

    output.exit_code
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV_VAR).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .try_init();
}
