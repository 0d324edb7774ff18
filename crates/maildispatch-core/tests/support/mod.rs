//! Shared fixtures: a stub transport and a scripted SMTP server.

#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use maildispatch_core::{MailItem, SendError, Transport};
use std::sync::Mutex;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Transport that returns a canned outcome and counts calls.
#[derive(Debug, Default)]
pub struct StubTransport {
    fault: Mutex<Option<SendError>>,
    calls: Mutex<usize>,
}

impl StubTransport {
    /// A transport whose deliveries succeed.
    pub fn succeeding() -> Self {
        Self::default()
    }

    /// A transport whose next delivery fails with `fault`.
    pub fn failing(fault: SendError) -> Self {
        Self {
            fault: Mutex::new(Some(fault)),
            calls: Mutex::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

impl Transport for StubTransport {
    async fn deliver<E: Send + Sync>(&self, _item: &MailItem<E>) -> Result<(), SendError> {
        *self.calls.lock().unwrap() += 1;
        let fault = self.fault.lock().unwrap().take();
        fault.map_or(Ok(()), Err)
    }
}

/// One exchange: the line prefix the server expects and its raw reply.
///
/// After a `354` reply the server collects message data; the next step's
/// prefix is then matched against the lone `.` terminator.
pub type Step = (&'static str, &'static str);

/// Spawns a server on the loopback interface that sends `greeting`, then
/// plays `steps` in order.
///
/// The handle yields every line the client sent, data lines included.
pub async fn scripted_server(
    greeting: &'static str,
    steps: Vec<Step>,
) -> (u16, JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    let handle = tokio::spawn(async move {
        let (socket, _) = listener.accept().await.unwrap();
        let (read, mut write) = socket.into_split();
        let mut reader = BufReader::new(read);
        let mut transcript = Vec::new();
        let mut in_data = false;

        write.write_all(greeting.as_bytes()).await.unwrap();

        for (expected, reply) in steps {
            let line = loop {
                let mut raw = String::new();
                if reader.read_line(&mut raw).await.unwrap() == 0 {
                    return transcript;
                }
                let line = raw.trim_end_matches(['\r', '\n']).to_string();
                if in_data && line != "." {
                    transcript.push(line);
                    continue;
                }
                break line;
            };

            assert!(
                line.starts_with(expected),
                "expected {expected:?}, got {line:?}"
            );
            transcript.push(line);
            write.write_all(reply.as_bytes()).await.unwrap();
            in_data = reply.starts_with("354");
        }
        transcript
    });

    (port, handle)
}

pub const GREETING: &str = "220 mx.test ESMTP ready\r\n";
pub const EHLO_AUTH: &str = "250-mx.test\r\n250-SIZE 1048576\r\n250 AUTH PLAIN LOGIN\r\n";
pub const EHLO_BARE: &str = "250-mx.test\r\n250 8BITMIME\r\n";
