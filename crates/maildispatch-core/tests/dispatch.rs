//! End-to-end sends through the mailer, against a stub transport and a
//! scripted SMTP server.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use maildispatch_core::{
    AUTHENTICATION_FAILED, FailureKind, MailAddress, MailAttachment, MailItem, Mailer,
    MinimalDriver, RichDriver, SendError, SmtpConfig,
};
use std::sync::Arc;
use support::{EHLO_AUTH, EHLO_BARE, GREETING, StubTransport, scripted_server};

#[derive(Debug, PartialEq)]
struct Notification {
    id: u64,
}

fn rich_mailer(port: u16, credentials: bool) -> Mailer<RichDriver> {
    let mut config = SmtpConfig::new("127.0.0.1", port).with_sender("noreply@example.com");
    if credentials {
        config = config.with_credentials("user", "pass");
    }
    Mailer::new(
        RichDriver::new(Arc::new(config))
            .unwrap()
            .with_client_hostname("client.test"),
    )
}

fn minimal_mailer(port: u16) -> Mailer<MinimalDriver> {
    let config = SmtpConfig::new("127.0.0.1", port).with_sender("noreply@example.com");
    Mailer::minimal(config).unwrap()
}

fn item() -> MailItem<Notification> {
    MailItem::new("Your order shipped", "<p>On its way.</p>")
        .to(MailAddress::new("alice@example.com").with_name("Alice"))
        .cc("bob@example.com")
        .bcc("audit@example.com")
        .process_id("order-1001")
        .stream_identifier("orders")
        .service_identifier("shipping")
        .entity(Arc::new(Notification { id: 1001 }))
}

#[tokio::test]
async fn stub_success_echoes_the_same_entity() {
    let mailer = Mailer::new(StubTransport::succeeding());
    let item = item();

    let response = mailer.send(&item).await;

    assert!(response.is_success());
    assert!(response.errors().is_empty());
    assert!(Arc::ptr_eq(
        response.result().unwrap(),
        item.entity.as_ref().unwrap()
    ));
    assert_eq!(mailer.transport().calls(), 1);
}

#[tokio::test]
async fn stub_generic_fault_names_process_and_fault() {
    let mailer = Mailer::new(StubTransport::failing(SendError::Other(
        "connection reset by peer".into(),
    )));

    let response = mailer.send(&item()).await;

    assert!(!response.is_success());
    assert_eq!(response.errors().len(), 1);
    let message = &response.errors()[0];
    assert!(message.contains("order-1001"));
    assert!(message.contains("connection reset by peer"));
    assert_eq!(response.failure_kind(), Some(FailureKind::Generic));
    assert!(response.fault().is_some());
}

#[test]
fn send_blocking_waits_for_delivery() {
    let mailer = Mailer::new(StubTransport::succeeding());
    let item = item();

    let response = mailer.send_blocking(&item);

    assert!(response.is_success());
    assert_eq!(response.result().unwrap().id, 1001);
}

#[tokio::test]
async fn rich_driver_delivers_to_every_recipient() {
    let (port, server) = scripted_server(
        GREETING,
        vec![
            ("EHLO client.test", EHLO_AUTH),
            ("AUTH PLAIN AHVzZXIAcGFzcw==", "235 2.7.0 Accepted\r\n"),
            ("MAIL FROM:<noreply@example.com>", "250 OK\r\n"),
            ("RCPT TO:<alice@example.com>", "250 OK\r\n"),
            ("RCPT TO:<bob@example.com>", "250 OK\r\n"),
            ("RCPT TO:<audit@example.com>", "250 OK\r\n"),
            ("DATA", "354 Go ahead\r\n"),
            (".", "250 2.0.0 Queued\r\n"),
            ("QUIT", "221 Bye\r\n"),
        ],
    )
    .await;

    let item = item().attach(MailAttachment::new("label.txt", b"TRACK-1001".to_vec()));
    let response = rich_mailer(port, true).send(&item).await;
    assert!(response.is_success(), "{:?}", response.errors());

    let transcript = server.await.unwrap();
    let has_line = |line: &str| transcript.iter().any(|l| l == line);
    assert!(has_line("Subject: Your order shipped"));
    assert!(has_line("To: Alice <alice@example.com>"));
    assert!(transcript.iter().any(|l| l.contains("label.txt")));
    assert!(!transcript.iter().any(|l| l.starts_with("Bcc:")));
}

#[tokio::test]
async fn rich_driver_skips_auth_without_username() {
    let (port, server) = scripted_server(
        GREETING,
        vec![
            ("EHLO client.test", EHLO_BARE),
            ("MAIL FROM:<noreply@example.com>", "250 OK\r\n"),
            ("RCPT TO:<alice@example.com>", "250 OK\r\n"),
            ("RCPT TO:<bob@example.com>", "250 OK\r\n"),
            ("RCPT TO:<audit@example.com>", "250 OK\r\n"),
            ("DATA", "354 Go ahead\r\n"),
            (".", "250 Queued\r\n"),
            ("QUIT", "221 Bye\r\n"),
        ],
    )
    .await;

    let response = rich_mailer(port, false).send(&item()).await;
    assert!(response.is_success(), "{:?}", response.errors());
    assert!(!server.await.unwrap().iter().any(|l| l.starts_with("AUTH")));
}

#[tokio::test]
async fn rejected_recipient_reports_status_code() {
    let (port, _server) = scripted_server(
        GREETING,
        vec![
            ("EHLO client.test", EHLO_BARE),
            ("MAIL FROM:", "250 OK\r\n"),
            ("RCPT TO:<alice@example.com>", "550 5.1.1 Mailbox unavailable\r\n"),
        ],
    )
    .await;

    let response = rich_mailer(port, false).send(&item()).await;

    assert!(!response.is_success());
    assert_eq!(response.errors().len(), 1);
    let message = &response.errors()[0];
    assert!(message.starts_with("Error trying to connect: "));
    assert!(message.contains("550"));
    assert_eq!(response.failure_kind(), Some(FailureKind::Connection));
    assert_eq!(response.error_body().unwrap().error_code, "SMTP_CONNECTION");
}

#[tokio::test]
async fn rejected_credentials_have_fixed_message() {
    let (port, _server) = scripted_server(
        GREETING,
        vec![
            ("EHLO client.test", EHLO_AUTH),
            ("AUTH PLAIN", "535 5.7.8 Authentication credentials invalid\r\n"),
        ],
    )
    .await;

    let response = rich_mailer(port, true).send(&item()).await;

    assert_eq!(response.errors(), [AUTHENTICATION_FAILED]);
    assert_eq!(response.failure_kind(), Some(FailureKind::Authentication));
    assert_eq!(response.result().unwrap().id, 1001);
}

#[tokio::test]
async fn item_without_recipients_fails() {
    // Port 9 is never contacted: the driver refuses before connecting.
    let item: MailItem<Notification> = MailItem::new("s", "<p>b</p>").process_id("empty-1");
    let response = rich_mailer(9, false).send(&item).await;

    assert!(!response.is_success());
    assert!(matches!(response.fault(), Some(SendError::NoRecipients)));
    assert!(response.errors()[0].contains("empty-1"));
}

#[tokio::test]
async fn server_hangup_is_generic_failure() {
    let (port, _server) = scripted_server(GREETING, vec![]).await;

    let response = rich_mailer(port, false).send(&item()).await;

    assert_eq!(response.failure_kind(), Some(FailureKind::Generic));
    assert!(response.errors()[0].contains("order-1001"));
}

#[tokio::test]
async fn minimal_driver_refused_greeting_reports_status_code() {
    let (port, _server) = scripted_server("554 5.7.1 no service for you\r\n", vec![]).await;

    let response = minimal_mailer(port).send(&item()).await;

    assert!(!response.is_success());
    assert_eq!(response.errors().len(), 1);
    let message = &response.errors()[0];
    assert!(message.starts_with("Error trying to connect: "));
    assert!(message.contains("554"));
    assert_eq!(response.failure_kind(), Some(FailureKind::Connection));
    assert!(matches!(
        response.fault(),
        Some(SendError::Command { code: 554, .. })
    ));
}

#[tokio::test]
async fn minimal_driver_requires_starttls() {
    let (port, server) = scripted_server(GREETING, vec![("EHLO", EHLO_BARE)]).await;

    let response = minimal_mailer(port).send(&item()).await;

    assert!(!response.is_success());
    assert_eq!(response.failure_kind(), Some(FailureKind::Generic));
    assert!(response.errors()[0].contains("order-1001"));
    assert_eq!(response.result().unwrap().id, 1001);

    let transcript = server.await.unwrap();
    assert!(!transcript.iter().any(|l| l.starts_with("MAIL FROM")));
}
