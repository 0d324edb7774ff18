//! MIME message generation.

use crate::content_type::ContentType;
use crate::encoding::{encode_base64_wrapped, encode_phrase, encode_rfc2047};
use crate::error::{Error, Result};
use crate::header::{Headers, fold_list};
use crate::mailbox::Mailbox;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::distributions::Alphanumeric;

/// A file attached to a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Filename presented to the recipient.
    pub filename: String,
    /// Content type of the data.
    pub content_type: ContentType,
    /// Raw bytes.
    pub data: Vec<u8>,
}

impl Attachment {
    /// Creates an attachment, guessing its content type from the filename.
    #[must_use]
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        let filename = filename.into();
        let content_type = ContentType::from_filename(&filename);
        Self {
            filename,
            content_type,
            data,
        }
    }

    /// Overrides the guessed content type.
    #[must_use]
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }
}

/// A rendered RFC 5322 message.
#[derive(Debug, Clone)]
pub struct Message {
    headers: Headers,
    body: Vec<u8>,
}

impl Message {
    /// Returns the top-level headers.
    #[must_use]
    pub const fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Returns the encoded body (everything after the blank line).
    #[must_use]
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Serializes the message with CRLF line endings, ready for `DATA`.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let head = self.headers.to_string();
        let mut out = Vec::with_capacity(head.len() + 2 + self.body.len());
        out.extend_from_slice(head.as_bytes());
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&self.body);
        out
    }
}

/// Builder for HTML messages with optional attachments.
///
/// Without attachments the message is a single `text/html` part; with
/// attachments it is `multipart/mixed` with the HTML part first. All bodies
/// are Base64 encoded.
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    from: Option<Mailbox>,
    sender: Option<Mailbox>,
    reply_to: Vec<Mailbox>,
    to: Vec<Mailbox>,
    cc: Vec<Mailbox>,
    subject: String,
    html_body: String,
    attachments: Vec<Attachment>,
    date: Option<DateTime<Utc>>,
    message_id: Option<String>,
    boundary: Option<String>,
}

impl MessageBuilder {
    /// Creates an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the `From` mailbox.
    #[must_use]
    pub fn from(mut self, from: Mailbox) -> Self {
        self.from = Some(from);
        self
    }

    /// Sets the `Sender` mailbox.
    #[must_use]
    pub fn sender(mut self, sender: Mailbox) -> Self {
        self.sender = Some(sender);
        self
    }

    /// Adds a `Reply-To` mailbox.
    #[must_use]
    pub fn reply_to(mut self, mailbox: Mailbox) -> Self {
        self.reply_to.push(mailbox);
        self
    }

    /// Adds a `To` mailbox.
    #[must_use]
    pub fn to(mut self, mailbox: Mailbox) -> Self {
        self.to.push(mailbox);
        self
    }

    /// Adds a `Cc` mailbox.
    #[must_use]
    pub fn cc(mut self, mailbox: Mailbox) -> Self {
        self.cc.push(mailbox);
        self
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the HTML body.
    #[must_use]
    pub fn html_body(mut self, html: impl Into<String>) -> Self {
        self.html_body = html.into();
        self
    }

    /// Adds an attachment.
    #[must_use]
    pub fn attach(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Fixes the `Date` header instead of using the current time.
    #[must_use]
    pub fn date(mut self, date: DateTime<Utc>) -> Self {
        self.date = Some(date);
        self
    }

    /// Fixes the `Message-ID` header (without angle brackets).
    #[must_use]
    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        self.message_id = Some(id.into());
        self
    }

    /// Fixes the multipart boundary instead of generating a random one.
    #[must_use]
    pub fn boundary(mut self, boundary: impl Into<String>) -> Self {
        self.boundary = Some(boundary.into());
        self
    }

    /// Renders the message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingHeader`] if no `From` mailbox was set and
    /// [`Error::InvalidHeader`] if a header value cannot be represented.
    pub fn build(self) -> Result<Message> {
        let from = self
            .from
            .ok_or_else(|| Error::MissingHeader("From".into()))?;

        let mut headers = Headers::new();
        let date = self.date.unwrap_or_else(Utc::now);
        headers.add("Date", date.to_rfc2822())?;
        headers.add("From", from.to_string())?;
        if let Some(sender) = &self.sender {
            headers.add("Sender", sender.to_string())?;
        }
        add_list(&mut headers, "Reply-To", &self.reply_to)?;
        add_list(&mut headers, "To", &self.to)?;
        add_list(&mut headers, "Cc", &self.cc)?;
        headers.add("Subject", encode_rfc2047(&self.subject))?;

        let id = self
            .message_id
            .unwrap_or_else(|| format!("{}@{}", random_token(24), message_id_domain(&from)));
        headers.add("Message-ID", format!("<{id}>"))?;
        headers.add("MIME-Version", "1.0")?;

        let html = encode_base64_wrapped(self.html_body.as_bytes());
        if self.attachments.is_empty() {
            headers.add("Content-Type", ContentType::text_html().to_string())?;
            headers.add("Content-Transfer-Encoding", "base64")?;
            return Ok(Message {
                headers,
                body: html.into_bytes(),
            });
        }

        let boundary = self.boundary.unwrap_or_else(|| random_token(40));
        headers.add(
            "Content-Type",
            ContentType::multipart_mixed(boundary.as_str()).to_string(),
        )?;

        let mut body = String::new();
        push_part(&mut body, &boundary, &part_headers_html()?, &html);
        for attachment in &self.attachments {
            let part_headers = part_headers_attachment(attachment)?;
            let encoded = encode_base64_wrapped(&attachment.data);
            push_part(&mut body, &boundary, &part_headers, &encoded);
        }
        body.push_str("--");
        body.push_str(&boundary);
        body.push_str("--\r\n");

        Ok(Message {
            headers,
            body: body.into_bytes(),
        })
    }
}

fn add_list(headers: &mut Headers, name: &str, mailboxes: &[Mailbox]) -> Result<()> {
    if mailboxes.is_empty() {
        return Ok(());
    }
    let rendered: Vec<String> = mailboxes.iter().map(ToString::to_string).collect();
    headers.add(name, fold_list(name, &rendered))
}

fn part_headers_html() -> Result<Headers> {
    let mut headers = Headers::new();
    headers.add("Content-Type", ContentType::text_html().to_string())?;
    headers.add("Content-Transfer-Encoding", "base64")?;
    Ok(headers)
}

fn part_headers_attachment(attachment: &Attachment) -> Result<Headers> {
    let content_type = attachment
        .content_type
        .clone()
        .with_parameter("name", attachment.filename.as_str());

    let mut headers = Headers::new();
    headers.add("Content-Type", content_type.to_string())?;
    headers.add("Content-Transfer-Encoding", "base64")?;
    let filename = quoted_filename(&attachment.filename);
    headers.add(
        "Content-Disposition",
        format!("attachment; filename={filename}"),
    )?;
    Ok(headers)
}

fn quoted_filename(filename: &str) -> String {
    let phrase = encode_phrase(filename);
    if phrase.starts_with('"') {
        phrase
    } else {
        format!("\"{phrase}\"")
    }
}

fn push_part(body: &mut String, boundary: &str, headers: &Headers, encoded: &str) {
    body.push_str("--");
    body.push_str(boundary);
    body.push_str("\r\n");
    body.push_str(&headers.to_string());
    body.push_str("\r\n");
    body.push_str(encoded);
}

fn message_id_domain(from: &Mailbox) -> String {
    let domain = from.domain();
    if domain.is_ascii() && !domain.is_empty() {
        domain.to_string()
    } else {
        "localhost".to_string()
    }
}

fn random_token(len: usize) -> String {
    rand::thread_rng()
        .sample_iter(Alphanumeric)
        .take(len)
        .map(char::from)
        .collect()
}
