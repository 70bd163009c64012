//! # type-catalog
//!
//! Reads a JSON type universe, discovers every type reachable from the chosen
//! roots, and writes the resulting descriptor manifest as JSON.

use std::process::ExitCode;

use clap::Parser;
use tracing::error;

use crate::args::Args;

mod args;
mod logging;
mod run;

fn main() -> ExitCode {
    let args = Args::parse();

    // held until exit so buffered file logs are flushed
    let _guard = match logging::init(args.log_level, args.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(report) => {
            eprintln!("{report:?}");
            return ExitCode::FAILURE;
        },
    };

    match run::run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            error!(error = %report.current_context(), "Discovery failed");
            eprintln!("{report:?}");
            ExitCode::FAILURE
        },
    }
}
