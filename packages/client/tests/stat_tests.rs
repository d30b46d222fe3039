mod common;

use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{MockTransport, delivered, multistatus_file, respond, url};
use httpfs_client::operations::stat::MAX_STAT_BODY;
use httpfs_client::prelude::*;

fn stat(target: StatTarget, context: OperationContext) -> (StatOperation, Pending<StatInfo>) {
    StatOperation::new(
        url("https://origin.example.org/ns/file.bin"),
        context,
        StatKind::new(target),
    )
}

const DAV_ORIGIN: StatTarget = StatTarget {
    dav: true,
    origin: true,
};

#[test]
fn test_head_stat_uses_content_length() {
    let (mut op, mut pending) = stat(StatTarget::default(), OperationContext::default());
    let mut transport = MockTransport::new();

    assert_eq!(op.setup(&mut transport), Step::Perform);
    assert_eq!(transport.method, RequestMethod::Head);
    assert!(transport.callbacks);
    assert_eq!(op.phase(), Phase::AwaitingHeaders);

    let result = respond(&mut op, &["HTTP/1.1 200 OK", "Content-Length: 4096"], &[]);
    assert_eq!(op.complete(&mut transport, result), Step::Done);

    let info = delivered(&mut pending).expect("stat should succeed");
    assert_eq!(info.size, 4096);
    assert!(!info.is_dir());
    assert!(info.flags.readable);
    assert!(op.is_done());
    assert_eq!(op.phase(), Phase::Done);
}

#[test]
fn test_head_stat_without_size_fails() {
    let (mut op, mut pending) = stat(StatTarget::default(), OperationContext::default());
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let result = respond(&mut op, &["HTTP/1.1 200 OK"], &[]);
    op.complete(&mut transport, result);

    let err = delivered(&mut pending).expect_err("size is required");
    assert!(err.is_missing_metadata());
    assert_eq!(err.code().subcode, Subcode::FsError);
    assert_eq!(err.message(), "Server responded without object size");
}

#[test]
fn test_propfind_stat_decodes_multistatus() {
    let (mut op, mut pending) = stat(DAV_ORIGIN, OperationContext::default());
    let mut transport = MockTransport::new();
    op.setup(&mut transport);
    assert_eq!(transport.method, RequestMethod::Propfind);
    assert_eq!(transport.header("depth"), Some("1"));

    let body = multistatus_file(1024);
    let result = respond(
        &mut op,
        &["HTTP/1.1 207 Multi-Status", "Content-Type: application/xml"],
        &[body.as_bytes()],
    );
    op.complete(&mut transport, result);

    let info = delivered(&mut pending).expect("propfind stat should succeed");
    assert_eq!(info.size, 1024);
    assert!(!info.is_dir());
}

#[test]
fn test_propfind_body_split_across_chunks() {
    let (mut op, mut pending) = stat(DAV_ORIGIN, OperationContext::default());
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let body = multistatus_file(77);
    let (first, second) = body.as_bytes().split_at(body.len() / 3);
    let result = respond(&mut op, &["HTTP/1.1 207 Multi-Status"], &[first, second]);
    op.complete(&mut transport, result);

    assert_eq!(delivered(&mut pending).expect("stat").size, 77);
}

#[test]
fn test_propfind_directory_without_size_fails_stat() {
    let (mut op, mut pending) = stat(DAV_ORIGIN, OperationContext::default());
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let result = respond(
        &mut op,
        &["HTTP/1.1 207 Multi-Status"],
        &[common::MULTISTATUS_DIRECTORY.as_bytes()],
    );
    op.complete(&mut transport, result);

    let err = delivered(&mut pending).expect_err("directory has no size");
    assert!(err.is_missing_metadata());
}

#[test]
fn test_malformed_multistatus_is_decode_failure() {
    let (mut op, mut pending) = stat(DAV_ORIGIN, OperationContext::default());
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let body = br#"<D:error xmlns:D="DAV:"><D:response/></D:error>"#;
    let result = respond(&mut op, &["HTTP/1.1 207 Multi-Status"], &[body]);
    op.complete(&mut transport, result);

    let err = delivered(&mut pending).expect_err("wrong root element");
    assert!(err.is_decode());
}

#[test]
fn test_oversized_propfind_body_fails_decode() {
    let (mut op, mut pending) = stat(DAV_ORIGIN, OperationContext::default());
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let chunk = vec![b' '; MAX_STAT_BODY / 2 + 1];
    let result = respond(&mut op, &["HTTP/1.1 207 Multi-Status"], &[&chunk, &chunk]);
    assert_eq!(result, Err(TransportError::Aborted));
    assert!(!op.is_done());

    assert_eq!(op.complete(&mut transport, result), Step::Done);
    let err = delivered(&mut pending).expect_err("oversized body");
    assert!(err.is_decode());
}

#[test]
fn test_error_status_fails_before_body() {
    let (mut op, mut pending) = stat(DAV_ORIGIN, OperationContext::default());
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    assert_eq!(op.on_header_line(b"HTTP/1.1 404 Not Found\r\n"), Progress::Continue);
    assert_eq!(op.on_header_line(b"\r\n"), Progress::Abort);
    assert!(op.is_done());

    // Late callbacks are ignored.
    assert_eq!(op.on_body(b"<html>not found</html>"), Progress::Abort);
    assert_eq!(op.complete(&mut transport, Err(TransportError::Aborted)), Step::Done);

    let err = delivered(&mut pending).expect_err("404 must fail");
    assert_eq!(err.status(), Some(http::StatusCode::NOT_FOUND));
    assert_eq!(err.code().class, ErrorClass::ErrorResponse);
    assert_eq!(err.code().subcode, Subcode::NotFound);
    assert_eq!(err.message(), "Not Found");
}

#[test]
fn test_header_timeout() {
    let config = OperationConfig::default().with_header_timeout(Duration::from_secs(5));
    let (mut op, mut pending) = stat(StatTarget::default(), OperationContext::new(config));
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let now = Instant::now();
    assert!(!op.header_timeout_expired_at(now));
    assert!(op.header_timeout_expired_at(now + Duration::from_secs(6)));

    assert_eq!(op.complete(&mut transport, Err(TransportError::Aborted)), Step::Done);
    let err = delivered(&mut pending).expect_err("timed out");
    assert!(err.is_timeout());
    assert_eq!(err.code().class, ErrorClass::OperationExpired);
}

#[test]
fn test_header_timeout_not_reported_once_headers_arrive() {
    let (mut op, _pending) = stat(StatTarget::default(), OperationContext::default());
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    op.on_header_line(b"HTTP/1.1 200 OK\r\n");
    let later = Instant::now() + Duration::from_secs(3600);
    assert!(!op.header_timeout_expired_at(later));
    assert_eq!(op.on_progress(), Progress::Continue);
}

#[test]
fn test_transport_failure_is_reported() {
    let (mut op, mut pending) = stat(StatTarget::default(), OperationContext::default());
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let result = Err(TransportError::Dns("origin.example.org".to_string()));
    assert_eq!(op.complete(&mut transport, result), Step::Done);

    let err = delivered(&mut pending).expect_err("dns failure");
    assert!(err.is_transport());
    assert_eq!(err.code().class, ErrorClass::Transport);
    assert_eq!(err.code().subcode, Subcode::NoServer);
}

#[test]
fn test_result_delivered_once() {
    let (mut op, mut pending) = stat(StatTarget::default(), OperationContext::default());
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    op.fail(httpfs_client::error::internal("first"));
    op.fail(httpfs_client::error::internal("second"));
    let result = respond(&mut op, &["HTTP/1.1 200 OK", "Content-Length: 1"], &[]);
    op.complete(&mut transport, result);

    let err = delivered(&mut pending).expect_err("first failure wins");
    assert!(err.message().starts_with("first"));
    assert!(pending.try_recv().is_err());
}

#[test]
fn test_release_handle_restores_transport() {
    let cert = ClientCertConfig::new("/etc/grid/cert.pem", "/etc/grid/key.pem");
    let config = OperationConfig::default()
        .with_client_cert(cert)
        .with_x509_host("origin.example.org");
    let (mut op, _pending) = stat(DAV_ORIGIN, OperationContext::new(config));
    let mut transport = MockTransport::new();
    op.setup(&mut transport);
    assert!(transport.client_cert.is_some());
    assert!(!transport.headers.is_empty());
    assert_eq!(transport.method, RequestMethod::Propfind);

    op.release_handle(&mut transport);
    assert_eq!(transport.method, RequestMethod::Get);
    assert!(!transport.callbacks);
    assert!(transport.client_cert.is_none());
    assert!(transport.headers.is_empty());
    assert_eq!(transport.connect_mode, ConnectMode::Direct);
}

#[test]
fn test_stats_track_outcomes() {
    let stats = Arc::new(OperationStats::default());
    let context = OperationContext::default().with_stats(Arc::clone(&stats));

    let (mut ok, _ok_pending) = stat(StatTarget::default(), context.clone());
    let mut transport = MockTransport::new();
    ok.setup(&mut transport);
    let result = respond(&mut ok, &["HTTP/1.1 200 OK", "Content-Length: 10"], &[]);
    ok.complete(&mut transport, result);

    let (mut bad, _bad_pending) = stat(StatTarget::default(), context);
    let mut transport = MockTransport::new();
    bad.setup(&mut transport);
    let result = respond(&mut bad, &["HTTP/1.1 500 Internal Server Error"], &[]);
    bad.complete(&mut transport, result);

    let snapshot = stats.snapshot();
    assert_eq!(snapshot.operations_started, 2);
    assert_eq!(snapshot.operations_succeeded, 1);
    assert_eq!(snapshot.operations_failed, 1);
}
