//! Type-state SMTP client.

use super::{ServerInfo, SmtpStream};
use crate::command::Command;
use crate::error::{Error, Result};
use crate::parser::{is_last_reply_line, parse_reply};
use crate::types::{Address, AuthMechanism, Reply, ReplyCode};
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use std::marker::PhantomData;
use std::sync::Arc;
use tokio_rustls::rustls::ClientConfig;
use tracing::debug;

/// Type-state marker for connected state.
#[derive(Debug)]
pub struct Connected;

/// Type-state marker for authenticated state.
#[derive(Debug)]
pub struct Authenticated;

/// Type-state marker for mail transaction started.
#[derive(Debug)]
pub struct MailTransaction;

/// Type-state marker for recipient added.
#[derive(Debug)]
pub struct RecipientAdded;

/// Type-state marker for data mode.
#[derive(Debug)]
pub struct Data;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::Connected {}
    impl Sealed for super::Authenticated {}
}

/// States from which a mail transaction may start.
pub trait ReadyForMail: sealed::Sealed {}
impl ReadyForMail for Connected {}
impl ReadyForMail for Authenticated {}

/// SMTP client with type-state pattern.
#[derive(Debug)]
pub struct Client<State> {
    stream: SmtpStream,
    server_info: ServerInfo,
    _state: PhantomData<State>,
}

/// Connection trait for all states.
pub trait SmtpConnection {
    /// Returns the server information.
    fn server_info(&self) -> &ServerInfo;

    /// Returns true once the connection is encrypted.
    fn is_tls(&self) -> bool;
}

impl<S> SmtpConnection for Client<S> {
    fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    fn is_tls(&self) -> bool {
        self.stream.is_tls()
    }
}

impl Client<Connected> {
    /// Creates a client from a stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns an error if reading the greeting fails or if the server returns an error.
    pub async fn from_stream(mut stream: SmtpStream) -> Result<Self> {
        let greeting = read_reply(&mut stream).await?;
        if greeting.code != ReplyCode::SERVICE_READY {
            return Err(reply_error(&greeting));
        }

        let hostname = greeting
            .message
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        debug!(server = %hostname, "SMTP greeting received");

        Ok(Self {
            stream,
            server_info: ServerInfo {
                hostname,
                extensions: Vec::new(),
            },
            _state: PhantomData,
        })
    }

    /// Sends EHLO and discovers server capabilities.
    ///
    /// # Errors
    ///
    /// Returns an error if the EHLO command fails.
    pub async fn ehlo(mut self, client_hostname: &str) -> Result<Self> {
        let reply = self
            .expect_success(Command::Ehlo {
                hostname: client_hostname.to_string(),
            })
            .await?;
        self.server_info.replace_extensions(&reply.message);
        Ok(self)
    }

    /// Upgrades the connection to TLS using STARTTLS, then repeats EHLO.
    ///
    /// The handshake runs with `tls`, so its certificate verifier decides
    /// whether the server is trusted.
    ///
    /// # Errors
    ///
    /// Returns an error if STARTTLS is not advertised, the server refuses it,
    /// or the handshake fails.
    pub async fn starttls(
        mut self,
        hostname: &str,
        client_hostname: &str,
        tls: Arc<ClientConfig>,
    ) -> Result<Self> {
        if !self.server_info.supports_starttls() {
            return Err(Error::NotSupported("STARTTLS".into()));
        }

        self.expect_success(Command::StartTls).await?;
        self.stream = self.stream.upgrade_to_tls(hostname, tls).await?;
        debug!(server = %hostname, "TLS established via STARTTLS");

        // Capabilities learned before the upgrade must be discarded (RFC 3207).
        self.ehlo(client_hostname).await
    }

    /// Authenticates with the best advertised mechanism (PLAIN, then LOGIN).
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotSupported`] if neither mechanism is advertised and
    /// [`Error::AuthenticationFailed`] if the server rejects the credentials.
    pub async fn authenticate(
        self,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated>> {
        match self.server_info.preferred_auth_mechanism() {
            Some(AuthMechanism::Plain) => self.auth_plain(username, password).await,
            Some(AuthMechanism::Login) => self.auth_login(username, password).await,
            None => Err(Error::NotSupported("AUTH PLAIN or LOGIN".into())),
        }
    }

    /// Authenticates using the PLAIN mechanism (RFC 4616).
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub async fn auth_plain(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated>> {
        let credentials = format!("\0{username}\0{password}");
        let reply = self
            .send_command(Command::Auth {
                mechanism: AuthMechanism::Plain,
                initial_response: Some(BASE64.encode(credentials.as_bytes())),
            })
            .await?;

        if reply.code != ReplyCode::AUTH_SUCCEEDED {
            return Err(auth_error(&reply));
        }
        debug!("authenticated with PLAIN");
        Ok(self.transition())
    }

    /// Authenticates using the LOGIN mechanism.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication fails.
    pub async fn auth_login(
        mut self,
        username: &str,
        password: &str,
    ) -> Result<Client<Authenticated>> {
        let steps = [
            Command::Auth {
                mechanism: AuthMechanism::Login,
                initial_response: None,
            },
            Command::AuthResponse(BASE64.encode(username.as_bytes())),
        ];
        for cmd in steps {
            let reply = self.send_command(cmd).await?;
            if reply.code != ReplyCode::AUTH_CONTINUE {
                return Err(auth_error(&reply));
            }
        }

        let reply = self
            .send_command(Command::AuthResponse(BASE64.encode(password.as_bytes())))
            .await?;
        if reply.code != ReplyCode::AUTH_SUCCEEDED {
            return Err(auth_error(&reply));
        }
        debug!("authenticated with LOGIN");
        Ok(self.transition())
    }
}

impl<S: ReadyForMail> Client<S> {
    /// Starts a mail transaction.
    ///
    /// `SMTPUTF8` is requested when the sender address needs it.
    ///
    /// # Errors
    ///
    /// Returns an error if the address needs SMTPUTF8 and the server lacks
    /// it, or if the MAIL FROM command fails.
    pub async fn mail_from(mut self, from: Address) -> Result<Client<MailTransaction>> {
        let smtputf8 = !from.is_ascii();
        if smtputf8 && !self.server_info.supports_smtputf8() {
            return Err(Error::NotSupported("SMTPUTF8".into()));
        }

        self.expect_success(Command::MailFrom {
            from,
            eight_bit: false,
            smtputf8,
        })
        .await?;
        Ok(self.transition())
    }
}

impl Client<MailTransaction> {
    /// Adds the first recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Client<RecipientAdded>> {
        self.expect_success(Command::RcptTo { to }).await?;
        Ok(self.transition())
    }
}

impl Client<RecipientAdded> {
    /// Adds another recipient to the transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the RCPT TO command fails.
    pub async fn rcpt_to(mut self, to: Address) -> Result<Self> {
        self.expect_success(Command::RcptTo { to }).await?;
        Ok(self)
    }

    /// Begins sending message data.
    ///
    /// # Errors
    ///
    /// Returns an error if the DATA command fails.
    pub async fn data(mut self) -> Result<Client<Data>> {
        let reply = self.send_command(Command::Data).await?;
        if reply.code != ReplyCode::START_DATA {
            return Err(reply_error(&reply));
        }
        Ok(self.transition())
    }
}

impl Client<Data> {
    /// Sends the message content and completes the transaction.
    ///
    /// Line endings are normalized to CRLF, lines starting with `.` are
    /// dot-stuffed, and the terminating `.` line is appended.
    ///
    /// # Errors
    ///
    /// Returns an error if sending the message fails or the server rejects it.
    pub async fn send_message(mut self, message: &[u8]) -> Result<Client<Connected>> {
        let payload = encode_data(message);
        debug!(bytes = payload.len(), "C: <message data>");
        self.stream.write_all(&payload).await?;

        let reply = read_reply(&mut self.stream).await?;
        debug!(code = %reply.code, "S: end of data");
        if !reply.is_success() {
            return Err(reply_error(&reply));
        }
        Ok(self.transition())
    }
}

// Common implementation for all states
impl<S> Client<S> {
    /// Sends QUIT and closes the connection (available in any state).
    ///
    /// # Errors
    ///
    /// Returns an error if the QUIT command fails.
    pub async fn quit(mut self) -> Result<()> {
        let reply = self.send_command(Command::Quit).await?;
        if !reply.is_success() {
            return Err(reply_error(&reply));
        }
        Ok(())
    }

    async fn send_command(&mut self, cmd: Command) -> Result<Reply> {
        debug!(command = %cmd.redacted(), "C:");
        self.stream.write_all(&cmd.serialize()).await?;
        let reply = read_reply(&mut self.stream).await?;
        debug!(code = %reply.code, "S:");
        Ok(reply)
    }

    async fn expect_success(&mut self, cmd: Command) -> Result<Reply> {
        let reply = self.send_command(cmd).await?;
        if !reply.is_success() {
            return Err(reply_error(&reply));
        }
        Ok(reply)
    }

    fn transition<T>(self) -> Client<T> {
        Client {
            stream: self.stream,
            server_info: self.server_info,
            _state: PhantomData,
        }
    }
}

async fn read_reply(stream: &mut SmtpStream) -> Result<Reply> {
    let mut lines = Vec::new();
    loop {
        let line = stream.read_line().await?;
        let is_last = is_last_reply_line(&line);
        lines.push(line);
        if is_last {
            break;
        }
    }
    parse_reply(&lines)
}

fn reply_error(reply: &Reply) -> Error {
    Error::smtp_error(reply.code.as_u16(), reply.message_text())
}

fn auth_error(reply: &Reply) -> Error {
    if reply.code.is_auth_rejection() {
        Error::AuthenticationFailed {
            code: reply.code.as_u16(),
            message: reply.message_text(),
        }
    } else {
        reply_error(reply)
    }
}

/// Normalizes line endings to CRLF, dot-stuffs, and appends the terminator.
fn encode_data(message: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(message.len() + message.len() / 64 + 5);
    let body = message.strip_suffix(b"\n").unwrap_or(message);
    let body = body.strip_suffix(b"\r").unwrap_or(body);

    if !body.is_empty() {
        for line in body.split(|&b| b == b'\n') {
            let line = line.strip_suffix(b"\r").unwrap_or(line);
            if line.first() == Some(&b'.') {
                out.push(b'.');
            }
            out.extend_from_slice(line);
            out.extend_from_slice(b"\r\n");
        }
    }
    out.extend_from_slice(b".\r\n");
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_normalizes_line_endings() {
        assert_eq!(encode_data(b"a\nb\r\nc"), b"a\r\nb\r\nc\r\n.\r\n");
        assert_eq!(encode_data(b"a\r\n"), b"a\r\n.\r\n");
    }

    #[test]
    fn data_stuffs_leading_dots() {
        assert_eq!(
            encode_data(b".hidden\r\n..two"),
            b"..hidden\r\n...two\r\n.\r\n"
        );
        assert_eq!(encode_data(b"mid.dot"), b"mid.dot\r\n.\r\n");
    }

    #[test]
    fn data_empty_message() {
        assert_eq!(encode_data(b""), b".\r\n");
    }

    #[test]
    fn auth_errors_are_classified() {
        let rejected = Reply::new(ReplyCode::AUTH_FAILED, vec!["bad credentials".into()]);
        assert!(matches!(
            auth_error(&rejected),
            Error::AuthenticationFailed { code: 535, .. }
        ));

        let unsupported = Reply::new(ReplyCode::new(504), vec!["unrecognized".into()]);
        assert!(matches!(
            auth_error(&unsupported),
            Error::SmtpError { code: 504, .. }
        ));
    }
}
