//! Low-level SMTP stream handling.

use crate::error::{Error, Result};
use rustls::pki_types::ServerName;
use std::io;
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpStream;
use tokio_rustls::{TlsConnector, rustls::ClientConfig};

/// Longest reply line accepted from a server (RFC 5321 allows 512 octets).
const MAX_LINE_LENGTH: usize = 4096;

/// SMTP stream (TCP or TLS).
#[derive(Debug)]
pub enum SmtpStream {
    /// Plain TCP connection.
    Tcp(BufReader<TcpStream>),
    /// TLS-encrypted connection.
    Tls(Box<BufReader<tokio_rustls::client::TlsStream<TcpStream>>>),
}

impl SmtpStream {
    /// Returns true once the connection is encrypted.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }

    /// Reads one line from the stream, without the line ending.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails, the server closed the connection,
    /// or the line is unreasonably long.
    pub async fn read_line(&mut self) -> Result<String> {
        let mut line = Vec::new();
        let read = match self {
            Self::Tcp(reader) => read_capped(reader, &mut line).await?,
            Self::Tls(reader) => read_capped(&mut **reader, &mut line).await?,
        };

        if read == 0 {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "connection closed by server",
            )));
        }
        if line.len() > MAX_LINE_LENGTH {
            return Err(Error::Protocol(format!(
                "Reply line exceeds {MAX_LINE_LENGTH} bytes"
            )));
        }

        let line = String::from_utf8(line)
            .map_err(|_| Error::Protocol("Reply line is not valid UTF-8".into()))?;
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Writes data to the stream and flushes it.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        match self {
            Self::Tcp(reader) => {
                reader.get_mut().write_all(data).await?;
                reader.get_mut().flush().await?;
            }
            Self::Tls(reader) => {
                reader.get_mut().write_all(data).await?;
                reader.get_mut().flush().await?;
            }
        }
        Ok(())
    }

    /// Upgrades a TCP stream to TLS using the given client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream is already encrypted or the TLS
    /// handshake fails (including a certificate rejected by the
    /// configuration's verifier).
    pub async fn upgrade_to_tls(self, hostname: &str, tls: Arc<ClientConfig>) -> Result<Self> {
        let tcp_stream = match self {
            Self::Tcp(reader) => reader.into_inner(),
            Self::Tls(_) => return Err(Error::InvalidState("Already using TLS".into())),
        };

        let tls_stream = handshake(tcp_stream, hostname, tls).await?;
        Ok(Self::Tls(Box::new(BufReader::new(tls_stream))))
    }
}

/// Connects to an SMTP server over plain TCP.
///
/// # Errors
///
/// Returns an error if the connection fails.
pub async fn connect(hostname: &str, port: u16) -> Result<SmtpStream> {
    let stream = TcpStream::connect((hostname, port)).await?;
    Ok(SmtpStream::Tcp(BufReader::new(stream)))
}

/// Connects to an SMTP server over implicit TLS (port 465).
///
/// # Errors
///
/// Returns an error if the connection or TLS handshake fails.
pub async fn connect_tls(hostname: &str, port: u16, tls: Arc<ClientConfig>) -> Result<SmtpStream> {
    let tcp_stream = TcpStream::connect((hostname, port)).await?;
    let tls_stream = handshake(tcp_stream, hostname, tls).await?;
    Ok(SmtpStream::Tls(Box::new(BufReader::new(tls_stream))))
}

/// Reads up to and including `\n`, but never more than one byte past
/// [`MAX_LINE_LENGTH`].
async fn read_capped<R>(reader: &mut R, line: &mut Vec<u8>) -> io::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let limit = u64::try_from(MAX_LINE_LENGTH + 1).unwrap_or(u64::MAX);
    reader.take(limit).read_until(b'\n', line).await
}

async fn handshake(
    tcp_stream: TcpStream,
    hostname: &str,
    tls: Arc<ClientConfig>,
) -> Result<tokio_rustls::client::TlsStream<TcpStream>> {
    let server_name = ServerName::try_from(hostname.to_string())
        .map_err(|_| Error::Protocol(format!("Invalid hostname: {hostname}")))?;

    let connector = TlsConnector::from(tls);
    let tls_stream = connector.connect(server_name, tcp_stream).await?;
    Ok(tls_stream)
}

/// The crypto provider every TLS configuration in this workspace is built with.
#[must_use]
pub fn crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    Arc::new(rustls::crypto::ring::default_provider())
}
