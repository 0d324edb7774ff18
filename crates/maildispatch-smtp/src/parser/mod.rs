//! SMTP reply parser.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Parses an SMTP reply from its response lines (line endings stripped).
///
/// - Single: `250 OK`
/// - Multi: `250-First line`, `250-Second line`, `250 Last line`
///
/// # Errors
///
/// Returns [`Error::Protocol`] if the reply is malformed or the lines carry
/// different codes.
pub fn parse_reply(lines: &[String]) -> Result<Reply> {
    let Some(first) = lines.first() else {
        return Err(Error::Protocol("Empty reply".into()));
    };

    let code = parse_code(first)?;

    let mut message = Vec::with_capacity(lines.len());
    for line in lines {
        if parse_code(line)? != code {
            return Err(Error::Protocol(format!(
                "Reply code changed mid-reply: {line}"
            )));
        }
        match line.as_bytes().get(3) {
            None => message.push(String::new()),
            Some(b' ' | b'-') => message.push(line[4..].to_string()),
            Some(_) => {
                return Err(Error::Protocol(format!("Malformed reply line: {line}")));
            }
        }
    }

    Ok(Reply::new(code, message))
}

fn parse_code(line: &str) -> Result<ReplyCode> {
    let digits = line
        .get(0..3)
        .filter(|d| d.bytes().all(|b| b.is_ascii_digit()))
        .ok_or_else(|| Error::Protocol(format!("Invalid reply code: {line}")))?;

    digits
        .parse::<u16>()
        .map(ReplyCode::new)
        .map_err(|_| Error::Protocol(format!("Invalid reply code: {line}")))
}

/// Checks if a line is the last line of a (possibly multi-line) reply.
///
/// Continuation lines use `-` after the code; the last line uses a space or
/// ends right after the code.
#[must_use]
pub fn is_last_reply_line(line: &str) -> bool {
    line.as_bytes().get(3).is_none_or(|&b| b != b'-')
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn lines(raw: &[&str]) -> Vec<String> {
        raw.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn single_line_reply() {
        let reply = parse_reply(&lines(&["250 OK"])).unwrap();
        assert_eq!(reply.code.as_u16(), 250);
        assert_eq!(reply.message, vec!["OK"]);
    }

    #[test]
    fn multi_line_reply() {
        let reply = parse_reply(&lines(&[
            "250-smtp.example.com",
            "250-AUTH PLAIN LOGIN",
            "250 STARTTLS",
        ]))
        .unwrap();
        assert_eq!(
            reply.message,
            vec!["smtp.example.com", "AUTH PLAIN LOGIN", "STARTTLS"]
        );
    }

    #[test]
    fn bare_code_line() {
        let reply = parse_reply(&lines(&["250"])).unwrap();
        assert_eq!(reply.message, vec![String::new()]);
    }

    #[test]
    fn last_line_detection() {
        assert!(is_last_reply_line("250 OK"));
        assert!(is_last_reply_line("250"));
        assert!(!is_last_reply_line("250-Continuing"));
    }

    #[test]
    fn rejects_empty() {
        assert!(parse_reply(&[]).is_err());
    }

    #[test]
    fn rejects_short_and_non_numeric() {
        assert!(parse_reply(&lines(&["25"])).is_err());
        assert!(parse_reply(&lines(&["ABC OK"])).is_err());
    }

    #[test]
    fn rejects_mixed_codes() {
        let err = parse_reply(&lines(&["250-first", "251 second"])).unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[test]
    fn rejects_bad_separator() {
        assert!(parse_reply(&lines(&["250xOK"])).is_err());
    }
}
