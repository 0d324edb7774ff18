//! Mail data model.

mod address;
mod attachment;
mod item;

pub use address::MailAddress;
pub use attachment::MailAttachment;
pub use item::MailItem;
