//! File attachments.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use std::io::Read;
use std::path::Path;

/// Bytes plus the filename presented to the recipient.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MailAttachment {
    /// Raw content.
    pub bytes: Vec<u8>,
    /// Filename shown to the recipient.
    pub filename: String,
}

impl MailAttachment {
    /// Creates an attachment from an in-memory buffer.
    #[must_use]
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
        }
    }

    /// Creates an attachment by draining a reader.
    ///
    /// # Errors
    ///
    /// Returns an error if reading fails.
    pub fn from_reader(filename: impl Into<String>, mut reader: impl Read) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Ok(Self::new(filename, bytes))
    }

    /// Reads a file eagerly; the attachment is named after the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Ok(Self::new(file_name(path)?, bytes))
    }

    /// Reads a file without blocking the async runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path).await?;
        Ok(Self::new(file_name(path)?, bytes))
    }

    /// Reads every file in `paths`, in order. No paths yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns the first read error.
    pub fn from_files<P: AsRef<Path>>(paths: &[P]) -> Result<Vec<Self>> {
        paths.iter().map(Self::from_file).collect()
    }

    /// Returns the content as standard Base64; empty content yields `""`.
    #[must_use]
    pub fn base64_content(&self) -> String {
        if self.bytes.is_empty() {
            return String::new();
        }
        STANDARD.encode(&self.bytes)
    }
}

fn file_name(path: &Path) -> Result<String> {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| Error::Config(format!("{} does not name a file", path.display())))
}
