//! Subcommand implementations.

use crate::cli::{CheckConfigArgs, SendArgs};
use anyhow::Context;
use maildispatch_core::{
    DriverKind, MailAddress, MailAttachment, MailItem, Mailer, SmtpConfig, SmtpResponse,
    Transport, validate_config,
};
use serde_json::json;
use std::process::ExitCode;
use tracing::info;

/// Sends one email and prints the outcome.
pub fn send(args: &SendArgs) -> anyhow::Result<ExitCode> {
    let config = SmtpConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;
    let item = build_item(args)?;

    let response = match DriverKind::from(args.driver) {
        DriverKind::Rich => dispatch(&Mailer::rich(config)?, &item, args.blocking)?,
        DriverKind::Minimal => dispatch(&Mailer::minimal(config)?, &item, args.blocking)?,
    };

    println!("{}", serde_json::to_string_pretty(&response.to_json())?);
    Ok(exit_code(response.is_success()))
}

/// Loads and validates a configuration file and prints the findings.
pub fn check_config(args: &CheckConfigArgs) -> anyhow::Result<ExitCode> {
    let config = SmtpConfig::load(&args.config)
        .with_context(|| format!("loading {}", args.config.display()))?;

    let errors = validate_config(&config).err().unwrap_or_default();
    let report = json!({
        "valid": errors.is_empty(),
        "host": config.host,
        "port": config.effective_port(),
        "implicit_tls": config.implicit_tls(),
        "authenticates": config.has_credentials(),
        "errors": errors
            .iter()
            .map(|e| json!({ "field": e.field(), "message": e.message() }))
            .collect::<Vec<_>>(),
    });

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(exit_code(errors.is_empty()))
}

fn build_item(args: &SendArgs) -> anyhow::Result<MailItem> {
    let body = std::fs::read_to_string(&args.body_file)
        .with_context(|| format!("reading {}", args.body_file.display()))?;
    let attachments = MailAttachment::from_files(&args.attach)?;

    let mut item = MailItem::new(args.subject.as_str(), body)
        .process_id(args.process_id.as_str())
        .tags(args.tags.as_str())
        .service_identifier("maildispatch-cli")
        .attach_all(attachments);

    if let Some(from) = &args.from {
        item = item.from(from.as_str());
    }
    if let Some(name) = &args.from_name {
        item = item.sender_display_name(name.as_str());
    }
    item.to.extend(addresses(&args.to));
    item.cc.extend(addresses(&args.cc));
    item.bcc.extend(addresses(&args.bcc));
    item.reply_to.extend(addresses(&args.reply_to));

    Ok(item)
}

fn addresses(list: &[String]) -> Vec<MailAddress> {
    list.iter().map(|a| MailAddress::new(a.as_str())).collect()
}

fn dispatch<T: Transport>(
    mailer: &Mailer<T>,
    item: &MailItem,
    blocking: bool,
) -> anyhow::Result<SmtpResponse> {
    if blocking {
        return Ok(mailer.send_blocking(item));
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    let response = runtime.block_on(mailer.send(item));
    info!(success = response.is_success(), "Send finished");
    Ok(response)
}

const fn exit_code(success: bool) -> ExitCode {
    if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
