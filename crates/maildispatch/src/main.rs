//! `maildispatch` - send an email over SMTP from the command line.
//!
//! Prints the outcome as JSON on stdout and exits with status 1 when the
//! send fails. Logs go to stderr.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Command};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "maildispatch=info,maildispatch_core=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Send(args) => commands::send(&args),
        Command::CheckConfig(args) => commands::check_config(&args),
    }
}
