//! Command-line arguments.

use clap::{Args, Parser, Subcommand, ValueEnum};
use maildispatch_core::DriverKind;
use std::path::PathBuf;

/// Send email over SMTP.
#[derive(Parser, Debug)]
#[command(name = "maildispatch", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send one email.
    Send(SendArgs),
    /// Load and validate a configuration file.
    CheckConfig(CheckConfigArgs),
}

/// Which transport carries the message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum Driver {
    /// Built-in SMTP client with certificate policy.
    #[default]
    Rich,
    /// lettre transport.
    Minimal,
}

impl From<Driver> for DriverKind {
    fn from(driver: Driver) -> Self {
        match driver {
            Driver::Rich => Self::Rich,
            Driver::Minimal => Self::Minimal,
        }
    }
}

#[derive(Args, Debug)]
pub struct SendArgs {
    /// SMTP configuration file (TOML).
    #[arg(long, env = "MAILDISPATCH_CONFIG")]
    pub config: PathBuf,

    /// Primary recipient; repeat for several.
    #[arg(long, required = true)]
    pub to: Vec<String>,

    /// Carbon-copy recipient.
    #[arg(long)]
    pub cc: Vec<String>,

    /// Blind carbon-copy recipient.
    #[arg(long)]
    pub bcc: Vec<String>,

    /// Reply-To address.
    #[arg(long)]
    pub reply_to: Vec<String>,

    /// Sender address; defaults to the configured sender.
    #[arg(long)]
    pub from: Option<String>,

    /// Sender display name.
    #[arg(long)]
    pub from_name: Option<String>,

    /// Subject line.
    #[arg(long)]
    pub subject: String,

    /// File holding the HTML body.
    #[arg(long)]
    pub body_file: PathBuf,

    /// File to attach; repeat for several.
    #[arg(long)]
    pub attach: Vec<PathBuf>,

    /// Transport driver.
    #[arg(long, value_enum, default_value_t)]
    pub driver: Driver,

    /// Correlation id echoed in logs and failure messages.
    #[arg(long, default_value = "")]
    pub process_id: String,

    /// `;`-separated tags.
    #[arg(long, default_value = "")]
    pub tags: String,

    /// Send synchronously instead of on an async runtime.
    #[arg(long)]
    pub blocking: bool,
}

#[derive(Args, Debug)]
pub struct CheckConfigArgs {
    /// SMTP configuration file (TOML).
    #[arg(long, env = "MAILDISPATCH_CONFIG")]
    pub config: PathBuf,
}
