//! The caller-facing description of one email.

use super::{MailAddress, MailAttachment};
use std::sync::Arc;

/// One email to send, plus correlation metadata echoed into logs and
/// responses.
///
/// `E` is an opaque caller entity. Drivers never look inside it; a
/// successful response hands back the same [`Arc`].
pub struct MailItem<E = ()> {
    /// Subject line.
    pub subject: String,
    /// HTML body.
    pub body: String,
    /// Sender address; falls back to the configured sender when blank.
    pub from: Option<String>,
    /// Display name for the sender.
    pub sender_display_name: Option<String>,
    /// Primary recipients.
    pub to: Vec<MailAddress>,
    /// Carbon-copy recipients.
    pub cc: Vec<MailAddress>,
    /// Blind carbon-copy recipients.
    pub bcc: Vec<MailAddress>,
    /// Reply-To addresses.
    pub reply_to: Vec<MailAddress>,
    /// Attachments in presentation order.
    pub attachments: Vec<MailAttachment>,
    /// Caller entity echoed on success.
    pub entity: Option<Arc<E>>,
    /// Correlation id included in generic failure messages.
    pub process_id: String,
    /// `;`-separated tags.
    pub tags: String,
    /// Originating stream.
    pub stream_identifier: String,
    /// Originating service.
    pub service_identifier: String,
}

impl<E> MailItem<E> {
    /// Creates an item with a subject and HTML body and nothing else.
    #[must_use]
    pub fn new(subject: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            body: body.into(),
            ..Self::default()
        }
    }

    /// Sets the sender address.
    #[must_use]
    pub fn from(mut self, address: impl Into<String>) -> Self {
        self.from = Some(address.into());
        self
    }

    /// Sets the sender display name.
    #[must_use]
    pub fn sender_display_name(mut self, name: impl Into<String>) -> Self {
        self.sender_display_name = Some(name.into());
        self
    }

    /// Appends a To recipient.
    #[must_use]
    pub fn to(mut self, address: impl Into<MailAddress>) -> Self {
        self.to.push(address.into());
        self
    }

    /// Appends a Cc recipient.
    #[must_use]
    pub fn cc(mut self, address: impl Into<MailAddress>) -> Self {
        self.cc.push(address.into());
        self
    }

    /// Appends a Bcc recipient.
    #[must_use]
    pub fn bcc(mut self, address: impl Into<MailAddress>) -> Self {
        self.bcc.push(address.into());
        self
    }

    /// Appends a Reply-To address.
    #[must_use]
    pub fn reply_to(mut self, address: impl Into<MailAddress>) -> Self {
        self.reply_to.push(address.into());
        self
    }

    /// Appends an attachment.
    #[must_use]
    pub fn attach(mut self, attachment: MailAttachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    /// Appends several attachments.
    #[must_use]
    pub fn attach_all(mut self, attachments: impl IntoIterator<Item = MailAttachment>) -> Self {
        self.attachments.extend(attachments);
        self
    }

    /// Sets the caller entity.
    #[must_use]
    pub fn entity(mut self, entity: Arc<E>) -> Self {
        self.entity = Some(entity);
        self
    }

    /// Sets the correlation id.
    #[must_use]
    pub fn process_id(mut self, process_id: impl Into<String>) -> Self {
        self.process_id = process_id.into();
        self
    }

    /// Sets the `;`-separated tags.
    #[must_use]
    pub fn tags(mut self, tags: impl Into<String>) -> Self {
        self.tags = tags.into();
        self
    }

    /// Sets the originating stream.
    #[must_use]
    pub fn stream_identifier(mut self, stream: impl Into<String>) -> Self {
        self.stream_identifier = stream.into();
        self
    }

    /// Sets the originating service.
    #[must_use]
    pub fn service_identifier(mut self, service: impl Into<String>) -> Self {
        self.service_identifier = service.into();
        self
    }

    /// Splits the tags on `;`, trimming and dropping empty entries.
    #[must_use]
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .split(';')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .collect()
    }

    /// Returns true if no To, Cc or Bcc recipient is set.
    #[must_use]
    pub fn has_no_recipients(&self) -> bool {
        self.to.is_empty() && self.cc.is_empty() && self.bcc.is_empty()
    }
}

// Manual impls so `E` needs neither `Default`, `Clone` nor `Debug`.
impl<E> Default for MailItem<E> {
    fn default() -> Self {
        Self {
            subject: String::new(),
            body: String::new(),
            from: None,
            sender_display_name: None,
            to: Vec::new(),
            cc: Vec::new(),
            bcc: Vec::new(),
            reply_to: Vec::new(),
            attachments: Vec::new(),
            entity: None,
            process_id: String::new(),
            tags: String::new(),
            stream_identifier: String::new(),
            service_identifier: String::new(),
        }
    }
}

impl<E> Clone for MailItem<E> {
    fn clone(&self) -> Self {
        Self {
            subject: self.subject.clone(),
            body: self.body.clone(),
            from: self.from.clone(),
            sender_display_name: self.sender_display_name.clone(),
            to: self.to.clone(),
            cc: self.cc.clone(),
            bcc: self.bcc.clone(),
            reply_to: self.reply_to.clone(),
            attachments: self.attachments.clone(),
            entity: self.entity.clone(),
            process_id: self.process_id.clone(),
            tags: self.tags.clone(),
            stream_identifier: self.stream_identifier.clone(),
            service_identifier: self.service_identifier.clone(),
        }
    }
}

impl<E> std::fmt::Debug for MailItem<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MailItem")
            .field("subject", &self.subject)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("cc", &self.cc)
            .field("bcc", &self.bcc)
            .field("reply_to", &self.reply_to)
            .field("attachments", &self.attachments.len())
            .field("has_entity", &self.entity.is_some())
            .field("process_id", &self.process_id)
            .field("tags", &self.tags)
            .finish_non_exhaustive()
    }
}
