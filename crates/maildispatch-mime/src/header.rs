//! MIME header handling.

use crate::error::{Error, Result};
use std::fmt;

/// Soft limit for a header line before folding (RFC 5322 section 2.1.1).
const FOLD_WIDTH: usize = 78;

/// Ordered collection of email headers.
///
/// Headers render in the order they were added; names keep their given case
/// and are matched case-insensitively.
#[derive(Debug, Clone, Default)]
pub struct Headers {
    headers: Vec<(String, String)>,
}

impl Headers {
    /// Creates a new empty header collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a header value.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is not a valid field name or the value
    /// contains a bare line break that is not folding whitespace.
    pub fn add(&mut self, name: impl Into<String>, value: impl Into<String>) -> Result<()> {
        let name = name.into();
        let value = value.into();
        validate(&name, &value)?;
        self.headers.push((name, value));
        Ok(())
    }

    /// Gets the first value for a header.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Checks whether a header is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Returns an iterator over all headers in order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.headers.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }
}

/// Joins list items (addresses) into one header value, folding between
/// items so lines stay near 78 columns.
#[must_use]
pub fn fold_list(name: &str, items: &[String]) -> String {
    let mut value = String::new();
    let mut column = name.len() + 2;

    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            if column + 2 + item.len() > FOLD_WIDTH {
                value.push_str(",\r\n ");
                column = 1;
            } else {
                value.push_str(", ");
                column += 2;
            }
        }
        value.push_str(item);
        // An encoded phrase may itself be folded; track the last line only.
        column = match item.rsplit_once('\n') {
            Some((_, tail)) => tail.len(),
            None => column + item.len(),
        };
    }
    value
}

fn validate(name: &str, value: &str) -> Result<()> {
    if name.is_empty() || !name.bytes().all(|b| b.is_ascii_graphic() && b != b':') {
        return Err(Error::InvalidHeader(format!(
            "Invalid header name: {name:?}"
        )));
    }

    // Every line break must be CRLF followed by whitespace (folding).
    let bytes = value.as_bytes();
    for (i, &b) in bytes.iter().enumerate() {
        let ok = match b {
            b'\r' => bytes.get(i + 1) == Some(&b'\n'),
            b'\n' => {
                i > 0 && bytes[i - 1] == b'\r' && matches!(bytes.get(i + 1), Some(b' ' | b'\t'))
            }
            _ => true,
        };
        if !ok {
            return Err(Error::InvalidHeader(format!(
                "Line break in value of {name}"
            )));
        }
    }
    Ok(())
}

impl fmt::Display for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (name, value) in &self.headers {
            write!(f, "{name}: {value}\r\n")?;
        }
        Ok(())
    }
}
