//! Drives the client against a scripted SMTP server on the loopback interface.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use maildispatch_smtp::connection::{connect, crypto_provider};
use maildispatch_smtp::{Address, Client, Error, Extension, SmtpConnection};
use rustls::{ClientConfig, RootCertStore};
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// One exchange: the line prefix the server expects and its raw reply.
///
/// After a `354` reply the server collects message data; the next step's
/// prefix is then matched against the lone `.` terminator.
type Step = (&'static str, &'static str);

/// Spawns a server that sends `greeting`, then plays `steps` in order.
///
/// The handle yields every line the client sent, data lines included.
async fn scripted_server(
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
            in_data = false;

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

const GREETING: &str = "220 mx.test ESMTP ready\r\n";
const EHLO_PLAIN: &str = "250-mx.test\r\n250-SIZE 1048576\r\n250 AUTH PLAIN LOGIN\r\n";
const EHLO_LOGIN: &str = "250-mx.test\r\n250 AUTH LOGIN\r\n";
const EHLO_BARE: &str = "250 mx.test\r\n";

fn no_roots() -> Arc<ClientConfig> {
    let config = ClientConfig::builder_with_provider(crypto_provider())
        .with_safe_default_protocol_versions()
        .unwrap()
        .with_root_certificates(RootCertStore::empty())
        .with_no_client_auth();
    Arc::new(config)
}

fn addr(s: &str) -> Address {
    Address::new(s).unwrap()
}

#[tokio::test]
async fn full_transaction_with_plain_auth() {
    let (port, server) = scripted_server(
        GREETING,
        vec![
            ("EHLO client.test", EHLO_PLAIN),
            ("AUTH PLAIN AHVzZXIAcGFzcw==", "235 2.7.0 Accepted\r\n"),
            ("MAIL FROM:<sender@test>", "250 OK\r\n"),
            ("RCPT TO:<a@test>", "250 OK\r\n"),
            ("RCPT TO:<b@test>", "250 OK\r\n"),
            ("DATA", "354 End data with <CR><LF>.<CR><LF>\r\n"),
            (".", "250 2.0.0 Queued\r\n"),
            ("QUIT", "221 Bye\r\n"),
        ],
    )
    .await;

    let stream = connect("127.0.0.1", port).await.unwrap();
    let client = Client::from_stream(stream).await.unwrap();
    assert_eq!(client.server_info().hostname, "mx.test");

    let client = client.ehlo("client.test").await.unwrap();
    assert!(
        client
            .server_info()
            .supports(&Extension::Size(Some(1_048_576)))
    );
    assert!(!client.is_tls());

    let client = client.authenticate("user", "pass").await.unwrap();
    let client = client.mail_from(addr("sender@test")).await.unwrap();
    let client = client.rcpt_to(addr("a@test")).await.unwrap();
    let client = client.rcpt_to(addr("b@test")).await.unwrap();
    let client = client.data().await.unwrap();
    let client = client
        .send_message(b"Subject: Hi\r\n\r\n.leading dot\nplain line\r\n")
        .await
        .unwrap();
    client.quit().await.unwrap();

    let transcript = server.await.unwrap();
    assert!(transcript.contains(&"..leading dot".to_string()));
    assert!(transcript.contains(&"plain line".to_string()));
    assert_eq!(transcript.last().map(String::as_str), Some("QUIT"));
}

#[tokio::test]
async fn login_auth_when_only_login_is_advertised() {
    let (port, server) = scripted_server(
        GREETING,
        vec![
            ("EHLO client.test", EHLO_LOGIN),
            ("AUTH LOGIN", "334 VXNlcm5hbWU6\r\n"),
            ("dXNlcg==", "334 UGFzc3dvcmQ6\r\n"),
            ("cGFzcw==", "235 Accepted\r\n"),
            ("QUIT", "221 Bye\r\n"),
        ],
    )
    .await;

    let stream = connect("127.0.0.1", port).await.unwrap();
    let client = Client::from_stream(stream).await.unwrap();
    let client = client.ehlo("client.test").await.unwrap();
    let client = client.authenticate("user", "pass").await.unwrap();
    client.quit().await.unwrap();

    server.await.unwrap();
}

#[tokio::test]
async fn rejected_credentials_are_an_authentication_error() {
    let (port, _server) = scripted_server(
        GREETING,
        vec![
            ("EHLO client.test", EHLO_PLAIN),
            ("AUTH PLAIN", "535 5.7.8 Authentication credentials invalid\r\n"),
        ],
    )
    .await;

    let stream = connect("127.0.0.1", port).await.unwrap();
    let client = Client::from_stream(stream).await.unwrap();
    let client = client.ehlo("client.test").await.unwrap();
    let err = client.authenticate("user", "wrong").await.unwrap_err();

    assert!(matches!(err, Error::AuthenticationFailed { code: 535, .. }));
}

#[tokio::test]
async fn rejected_recipient_carries_code() {
    let (port, _server) = scripted_server(
        GREETING,
        vec![
            ("EHLO client.test", EHLO_BARE),
            ("MAIL FROM:<sender@test>", "250 OK\r\n"),
            ("RCPT TO:<nobody@test>", "550 5.1.1 No such user\r\n"),
        ],
    )
    .await;

    let stream = connect("127.0.0.1", port).await.unwrap();
    let client = Client::from_stream(stream).await.unwrap();
    let client = client.ehlo("client.test").await.unwrap();
    let client = client.mail_from(addr("sender@test")).await.unwrap();
    let err = client.rcpt_to(addr("nobody@test")).await.unwrap_err();

    assert_eq!(err.code(), Some(550));
    assert!(err.to_string().contains("No such user"));
}

#[tokio::test]
async fn starttls_requires_advertisement() {
    let (port, _server) = scripted_server(GREETING, vec![("EHLO client.test", EHLO_BARE)]).await;

    let stream = connect("127.0.0.1", port).await.unwrap();
    let client = Client::from_stream(stream).await.unwrap();
    let client = client.ehlo("client.test").await.unwrap();
    let err = client
        .starttls("127.0.0.1", "client.test", no_roots())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::NotSupported(_)));
}

#[tokio::test]
async fn authenticate_without_known_mechanism_is_not_supported() {
    let (port, _server) = scripted_server(
        GREETING,
        vec![("EHLO client.test", "250-mx.test\r\n250 AUTH CRAM-MD5\r\n")],
    )
    .await;

    let stream = connect("127.0.0.1", port).await.unwrap();
    let client = Client::from_stream(stream).await.unwrap();
    let client = client.ehlo("client.test").await.unwrap();
    let err = client.authenticate("user", "pass").await.unwrap_err();

    assert!(matches!(err, Error::NotSupported(_)));
}

#[tokio::test]
async fn unwelcoming_greeting_fails() {
    let (port, _server) = scripted_server("554 No service\r\n", vec![]).await;

    let stream = connect("127.0.0.1", port).await.unwrap();
    let err = Client::from_stream(stream).await.unwrap_err();

    assert_eq!(err.code(), Some(554));
}

#[tokio::test]
async fn server_hangup_is_io_error() {
    let (port, _server) = scripted_server(GREETING, vec![]).await;

    let stream = connect("127.0.0.1", port).await.unwrap();
    let client = Client::from_stream(stream).await.unwrap();
    let err = client.ehlo("client.test").await.unwrap_err();

    assert!(matches!(err, Error::Io(_)));
}
