//! Composition for the minimal driver, using `lettre`'s message builder.

use super::{ComposeError, resolve_sender};
use crate::config::SmtpConfig;
use crate::model::{MailAddress, MailItem};
use lettre::Message;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Mailbox, MultiPart, SinglePart};

/// Renders an item as a `lettre` message.
///
/// The resolved sender is written to both `From` and `Sender`. The envelope
/// is derived by `lettre` from To, Cc and Bcc.
///
/// # Errors
///
/// Returns an error if no sender can be resolved, an address is malformed,
/// or `lettre` refuses the message (for instance without recipients).
pub fn compose_lettre<E>(item: &MailItem<E>, config: &SmtpConfig) -> Result<Message, ComposeError> {
    let sender = mailbox(&resolve_sender(item, config)?)?;

    let mut builder = Message::builder()
        .from(sender.clone())
        .sender(sender)
        .subject(item.subject.as_str());

    for address in &item.reply_to {
        builder = builder.reply_to(mailbox(address)?);
    }
    for address in &item.to {
        builder = builder.to(mailbox(address)?);
    }
    for address in &item.cc {
        builder = builder.cc(mailbox(address)?);
    }
    for address in &item.bcc {
        builder = builder.bcc(mailbox(address)?);
    }

    let html = SinglePart::html(item.body.clone());
    let message = if item.attachments.is_empty() {
        builder.singlepart(html)
    } else {
        let mut parts = MultiPart::mixed().singlepart(html);
        for attachment in &item.attachments {
            let essence =
                maildispatch_mime::ContentType::from_filename(&attachment.filename).essence();
            let content_type = ContentType::parse(&essence)
                .map_err(|e| ComposeError::Message(format!("{essence}: {e}")))?;
            parts = parts.singlepart(
                Attachment::new(attachment.filename.clone())
                    .body(attachment.bytes.clone(), content_type),
            );
        }
        builder.multipart(parts)
    };

    message.map_err(|e| ComposeError::Message(e.to_string()))
}

fn mailbox(address: &MailAddress) -> Result<Mailbox, ComposeError> {
    let email = address
        .address
        .trim()
        .parse()
        .map_err(|_| ComposeError::InvalidAddress(address.address.clone()))?;
    let name = Some(address.display_name.trim())
        .filter(|name| !name.is_empty())
        .map(ToString::to_string);
    Ok(Mailbox::new(name, email))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::MailAttachment;

    fn config() -> SmtpConfig {
        SmtpConfig::new("smtp.example.com", 587).with_sender("noreply@example.com")
    }

    #[test]
    fn sender_and_envelope() {
        let item: MailItem = MailItem::new("Hello", "<p>hi</p>")
            .to("a@example.com")
            .cc("c@example.com")
            .bcc("hidden@example.com")
            .reply_to("support@example.com");
        let message = compose_lettre(&item, &config()).unwrap();
        let text = String::from_utf8(message.formatted()).unwrap();

        assert!(text.contains("Sender: noreply@example.com"));
        assert!(text.contains("Reply-To: support@example.com"));
        assert!(text.contains("Subject: Hello"));
        assert!(text.contains("text/html"));
        assert!(!text.contains("hidden@example.com"));
        assert_eq!(message.envelope().to().len(), 3);
    }

    #[test]
    fn attachments_are_added() {
        let item: MailItem = MailItem::new("s", "<p>b</p>")
            .to("a@example.com")
            .attach(MailAttachment::new("notes.txt", b"hello".to_vec()));
        let message = compose_lettre(&item, &config()).unwrap();
        let text = String::from_utf8(message.formatted()).unwrap();

        assert!(text.contains("multipart/mixed"));
        assert!(text.contains("notes.txt"));
    }

    #[test]
    fn no_recipients_is_refused() {
        let item: MailItem = MailItem::new("s", "b");
        assert!(matches!(
            compose_lettre(&item, &config()).unwrap_err(),
            ComposeError::Message(_)
        ));
    }

    #[test]
    fn malformed_address_is_reported() {
        let item: MailItem = MailItem::new("s", "b").to("nope");
        assert!(matches!(
            compose_lettre(&item, &config()).unwrap_err(),
            ComposeError::InvalidAddress(_)
        ));
    }
}
