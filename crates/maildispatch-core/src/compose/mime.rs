//! Composition for the rich driver, using the workspace MIME builder.

use super::{ComposeError, Envelope, resolve_sender};
use crate::config::SmtpConfig;
use crate::model::{MailAddress, MailItem};
use maildispatch_mime::{Attachment, Mailbox, Message, MessageBuilder};

/// A rendered message plus the envelope it travels in.
#[derive(Debug, Clone)]
pub struct ComposedMessage {
    /// MAIL FROM / RCPT TO addresses.
    pub envelope: Envelope,
    /// The RFC 5322 message.
    pub message: Message,
}

/// Renders an item as a MIME message.
///
/// # Errors
///
/// Returns an error if no sender can be resolved or an address is
/// malformed.
pub fn compose_mime<E>(
    item: &MailItem<E>,
    config: &SmtpConfig,
) -> Result<ComposedMessage, ComposeError> {
    let sender = resolve_sender(item, config)?;
    let envelope = Envelope::for_item(item, &sender);

    let mut builder = MessageBuilder::new()
        .from(mailbox(&sender)?)
        .subject(item.subject.as_str())
        .html_body(item.body.as_str());

    for address in &item.reply_to {
        builder = builder.reply_to(mailbox(address)?);
    }
    for address in &item.to {
        builder = builder.to(mailbox(address)?);
    }
    for address in &item.cc {
        builder = builder.cc(mailbox(address)?);
    }
    for attachment in &item.attachments {
        builder = builder.attach(Attachment::new(
            attachment.filename.as_str(),
            attachment.bytes.clone(),
        ));
    }

    Ok(ComposedMessage {
        envelope,
        message: builder.build()?,
    })
}

fn mailbox(address: &MailAddress) -> Result<Mailbox, ComposeError> {
    Ok(Mailbox::new(address.address.as_str())?.with_name(address.display_name.as_str()))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::MailAttachment;

    fn config() -> SmtpConfig {
        SmtpConfig::new("smtp.example.com", 587).with_sender("noreply@example.com")
    }

    fn rendered(composed: &ComposedMessage) -> String {
        String::from_utf8(composed.message.to_bytes()).unwrap()
    }

    #[test]
    fn headers_follow_item() {
        let item: MailItem = MailItem::new("Invoice 42", "<p>Due</p>")
            .sender_display_name("Billing")
            .to(MailAddress::new("a@example.com").with_name("Alice"))
            .cc("c@example.com")
            .bcc("hidden@example.com")
            .reply_to("support@example.com");
        let composed = compose_mime(&item, &config()).unwrap();
        let headers = composed.message.headers();

        assert_eq!(headers.get("From"), Some("Billing <noreply@example.com>"));
        assert_eq!(headers.get("To"), Some("Alice <a@example.com>"));
        assert_eq!(headers.get("Cc"), Some("c@example.com"));
        assert_eq!(headers.get("Reply-To"), Some("support@example.com"));
        assert_eq!(headers.get("Subject"), Some("Invoice 42"));
        assert!(!headers.contains("Bcc"));
        assert!(!rendered(&composed).contains("hidden@example.com"));
        assert_eq!(
            composed.envelope.recipients,
            ["a@example.com", "c@example.com", "hidden@example.com"]
        );
    }

    #[test]
    fn body_is_html() {
        let item: MailItem = MailItem::new("s", "<b>hi</b>").to("a@example.com");
        let composed = compose_mime(&item, &config()).unwrap();
        let content_type = composed.message.headers().get("Content-Type").unwrap();
        assert!(content_type.starts_with("text/html"));
    }

    #[test]
    fn attachments_make_multipart() {
        let item: MailItem = MailItem::new("s", "<p>see attached</p>")
            .to("a@example.com")
            .attach(MailAttachment::new("report.pdf", b"%PDF-1.4".to_vec()));
        let composed = compose_mime(&item, &config()).unwrap();
        let text = rendered(&composed);

        let content_type = composed.message.headers().get("Content-Type").unwrap();
        assert!(content_type.starts_with("multipart/mixed"));
        assert!(text.contains("application/pdf"));
        assert!(text.contains("filename=\"report.pdf\""));
        assert!(text.contains("JVBERi0xLjQ="));
    }

    #[test]
    fn missing_sender_is_reported() {
        let item: MailItem = MailItem::new("s", "b").to("a@example.com");
        let err = compose_mime(&item, &SmtpConfig::new("smtp.example.com", 587)).unwrap_err();
        assert_eq!(err, ComposeError::MissingSender);
    }

    #[test]
    fn malformed_recipient_is_reported() {
        let item: MailItem = MailItem::new("s", "b").to("not an address");
        let err = compose_mime(&item, &config()).unwrap_err();
        assert!(matches!(err, ComposeError::InvalidAddress(_)));
    }
}
