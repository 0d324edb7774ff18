//! MIME content type handling.

use crate::encoding::{encode_rfc2047, needs_encoding, quote};
use std::fmt;
use std::path::Path;

/// MIME content type with parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentType {
    /// Main type (e.g., "text", "image", "multipart").
    pub main_type: String,
    /// Subtype (e.g., "plain", "html", "jpeg").
    pub sub_type: String,
    /// Parameters in insertion order (e.g., charset=utf-8, boundary=xxx).
    pub parameters: Vec<(String, String)>,
}

impl ContentType {
    /// Creates a new content type.
    #[must_use]
    pub fn new(main_type: impl Into<String>, sub_type: impl Into<String>) -> Self {
        Self {
            main_type: main_type.into(),
            sub_type: sub_type.into(),
            parameters: Vec::new(),
        }
    }

    /// Creates a text/html content type.
    #[must_use]
    pub fn text_html() -> Self {
        Self::new("text", "html").with_parameter("charset", "utf-8")
    }

    /// Creates a multipart/mixed content type with boundary.
    #[must_use]
    pub fn multipart_mixed(boundary: impl Into<String>) -> Self {
        Self::new("multipart", "mixed").with_parameter("boundary", boundary)
    }

    /// Creates the application/octet-stream fallback type.
    #[must_use]
    pub fn octet_stream() -> Self {
        Self::new("application", "octet-stream")
    }

    /// Guesses a content type from a filename's extension.
    ///
    /// Unknown or missing extensions fall back to `application/octet-stream`.
    #[must_use]
    pub fn from_filename(filename: &str) -> Self {
        let ext = Path::new(filename)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        let (main, sub) = match ext.as_deref() {
            Some("txt" | "log") => ("text", "plain"),
            Some("htm" | "html") => ("text", "html"),
            Some("csv") => ("text", "csv"),
            Some("xml") => ("application", "xml"),
            Some("json") => ("application", "json"),
            Some("pdf") => ("application", "pdf"),
            Some("zip") => ("application", "zip"),
            Some("gz") => ("application", "gzip"),
            Some("doc") => ("application", "msword"),
            Some("docx") => (
                "application",
                "vnd.openxmlformats-officedocument.wordprocessingml.document",
            ),
            Some("xls") => ("application", "vnd.ms-excel"),
            Some("xlsx") => (
                "application",
                "vnd.openxmlformats-officedocument.spreadsheetml.sheet",
            ),
            Some("png") => ("image", "png"),
            Some("jpg" | "jpeg") => ("image", "jpeg"),
            Some("gif") => ("image", "gif"),
            Some("svg") => ("image", "svg+xml"),
            Some("ics") => ("text", "calendar"),
            _ => return Self::octet_stream(),
        };
        Self::new(main, sub)
    }

    /// Adds a parameter.
    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((key.into(), value.into()));
        self
    }

    /// Returns a parameter value by name (case-insensitive).
    #[must_use]
    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    /// Returns the boundary parameter if present.
    #[must_use]
    pub fn boundary(&self) -> Option<&str> {
        self.parameter("boundary")
    }

    /// Returns `type/subtype` without parameters.
    #[must_use]
    pub fn essence(&self) -> String {
        format!("{}/{}", self.main_type, self.sub_type)
    }

    /// Checks if this is a multipart content type.
    #[must_use]
    pub fn is_multipart(&self) -> bool {
        self.main_type.eq_ignore_ascii_case("multipart")
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.main_type, self.sub_type)?;

        for (key, value) in &self.parameters {
            if needs_encoding(value) {
                write!(f, "; {key}=\"{}\"", encode_rfc2047(value))?;
            } else if value.is_empty()
                || value.contains(|c: char| c.is_whitespace() || "()<>@,;:\\\"/[]?=".contains(c))
            {
                write!(f, "; {key}={}", quote(value))?;
            } else {
                write!(f, "; {key}={value}")?;
            }
        }

        Ok(())
    }
}
