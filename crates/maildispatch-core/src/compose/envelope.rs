//! SMTP envelope (MAIL FROM / RCPT TO).

use crate::model::{MailAddress, MailItem};

/// Envelope addresses for one transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Reverse path.
    pub from: String,
    /// Forward paths: To, then Cc, then Bcc, without duplicates.
    pub recipients: Vec<String>,
}

impl Envelope {
    /// Builds the envelope for an item sent by `sender`.
    ///
    /// A recipient already listed is skipped. Domains compare
    /// case-insensitively, local parts exactly (RFC 5321 section 2.4); the
    /// first spelling wins.
    #[must_use]
    pub fn for_item<E>(item: &MailItem<E>, sender: &MailAddress) -> Self {
        let mut recipients: Vec<String> = Vec::new();
        for address in item.to.iter().chain(&item.cc).chain(&item.bcc) {
            let address = address.address.trim();
            if address.is_empty() || recipients.iter().any(|r| same_mailbox(r, address)) {
                continue;
            }
            recipients.push(address.to_string());
        }

        Self {
            from: sender.address.clone(),
            recipients,
        }
    }
}

fn same_mailbox(a: &str, b: &str) -> bool {
    match (a.rsplit_once('@'), b.rsplit_once('@')) {
        (Some((local_a, domain_a)), Some((local_b, domain_b))) => {
            local_a == local_b && domain_a.eq_ignore_ascii_case(domain_b)
        }
        _ => a == b,
    }
}
