mod common;

use bytes::BytesMut;
use common::{MockTransport, delivered, respond, url};
use httpfs_client::prelude::*;

const FILE_URL: &str = "https://cache.example.org/ns/file.bin";

fn read(offset: u64, length: u64) -> (ReadOperation, Pending<ChunkInfo>) {
    let buffer = BytesMut::zeroed(length as usize);
    ReadOperation::new(
        url(FILE_URL),
        OperationContext::default(),
        ReadKind::new(offset, length, buffer),
    )
}

#[test]
fn test_zero_length_read_skips_network() {
    let (mut op, mut pending) = read(100, 0);
    let mut transport = MockTransport::new();

    assert_eq!(op.setup(&mut transport), Step::Done);
    assert!(transport.url.is_none());
    assert!(!transport.callbacks);

    let chunk = delivered(&mut pending).expect("zero-length read succeeds");
    assert_eq!(chunk.offset, 100);
    assert_eq!(chunk.length, 0);
    assert!(chunk.buffer.is_empty());
}

#[test]
fn test_range_header_is_inclusive() {
    let (mut op, _pending) = read(1024, 512);
    let mut transport = MockTransport::new();
    assert_eq!(op.setup(&mut transport), Step::Perform);
    assert_eq!(transport.method, RequestMethod::Get);
    assert_eq!(transport.header("range"), Some("bytes=1024-1535"));
}

#[test]
fn test_read_copies_chunks_in_order() {
    let (mut op, mut pending) = read(10, 8);
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let result = respond(
        &mut op,
        &["HTTP/1.1 206 Partial Content", "Content-Range: bytes 10-17/100"],
        &[b"abc", b"defgh"],
    );
    op.complete(&mut transport, result);

    let chunk = delivered(&mut pending).expect("read succeeds");
    assert_eq!(chunk.offset, 10);
    assert_eq!(chunk.length, 8);
    assert_eq!(&chunk.buffer[..], b"abcdefgh");
}

#[test]
fn test_short_read_returns_written_bytes() {
    let (mut op, mut pending) = read(0, 16);
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let result = respond(&mut op, &["HTTP/1.1 206 Partial Content", "Content-Range: bytes 0-3/4"], &[b"tail"]);
    op.complete(&mut transport, result);

    let chunk = delivered(&mut pending).expect("short read is still a success");
    assert_eq!(chunk.length, 4);
    assert_eq!(&chunk.buffer[..], b"tail");
}

#[test]
fn test_offset_mismatch_fails_before_copy() {
    let (mut op, mut pending) = read(4096, 4);
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let result = respond(&mut op, &["HTTP/1.1 200 OK"], &[b"from the start"]);
    assert_eq!(result, Err(TransportError::Aborted));
    op.complete(&mut transport, result);

    let err = delivered(&mut pending).expect_err("wrong offset");
    assert!(err.is_protocol());
    assert_eq!(
        err.message(),
        "Server did not return content with correct offset (read operation at offset 4096)"
    );
}

#[test]
fn test_overrun_fails_instead_of_truncating() {
    let (mut op, mut pending) = read(0, 4);
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    assert_eq!(op.on_header_line(b"HTTP/1.1 206 Partial Content\r\n"), Progress::Continue);
    op.on_header_line(b"Content-Range: bytes 0-3/10\r\n");
    op.on_header_line(b"\r\n");
    assert_eq!(op.on_body(b"abc"), Progress::Continue);
    assert_eq!(op.on_body(b"de"), Progress::Abort);
    assert_eq!(op.kind().written(), 3);

    op.complete(&mut transport, Err(TransportError::Aborted));
    let err = delivered(&mut pending).expect_err("overrun");
    assert!(err.message().starts_with("Server sent back more data than requested"));
    assert_eq!(err.code().subcode, Subcode::ServerError);
}

#[test]
fn test_multipart_byterange_is_rejected() {
    let (mut op, mut pending) = read(0, 4);
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let result = respond(
        &mut op,
        &[
            "HTTP/1.1 206 Partial Content",
            "Content-Type: multipart/byteranges; boundary=xyz",
        ],
        &[b"--xyz"],
    );
    op.complete(&mut transport, result);

    let err = delivered(&mut pending).expect_err("multipart unsupported");
    assert!(err.message().contains("multipart byterange"));
}

#[test]
fn test_status_error_message_names_offset() {
    let (mut op, mut pending) = read(512, 4);
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let result = respond(&mut op, &["HTTP/1.1 416 Range Not Satisfiable"], &[]);
    op.complete(&mut transport, result);

    let err = delivered(&mut pending).expect_err("416");
    assert_eq!(err.message(), "Range Not Satisfiable (read operation at offset 512)");
    assert_eq!(err.code().subcode, Subcode::ArgInvalid);
}

#[test]
fn test_undersized_buffer_is_rejected() {
    let (mut op, mut pending) = ReadOperation::new(
        url(FILE_URL),
        OperationContext::default(),
        ReadKind::new(0, 64, BytesMut::zeroed(8)),
    );
    let mut transport = MockTransport::new();
    assert_eq!(op.setup(&mut transport), Step::Done);

    let err = delivered(&mut pending).expect_err("buffer too small");
    assert!(err.is_builder());
}

#[test]
fn test_page_read_checksums_each_page() {
    let config = OperationConfig::default().with_page_size(4);
    let (mut op, mut pending) = PageReadOperation::new(
        url(FILE_URL),
        OperationContext::new(config),
        PageReadKind::new(0, 10, BytesMut::zeroed(10)),
    );
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let data = b"0123456789";
    let result = respond(
        &mut op,
        &["HTTP/1.1 206 Partial Content", "Content-Range: bytes 0-9/10"],
        &[data],
    );
    op.complete(&mut transport, result);

    let page = delivered(&mut pending).expect("page read succeeds");
    assert_eq!(page.length, 10);
    assert_eq!(page.checksums.len(), 3);
    assert_eq!(page.checksums[0], crc32c::crc32c(b"0123"));
    assert_eq!(page.checksums[2], crc32c::crc32c(b"89"));
}

#[test]
fn test_page_read_failure_keeps_offset_context() {
    let (mut op, mut pending) = PageReadOperation::new(
        url(FILE_URL),
        OperationContext::default(),
        PageReadKind::new(8192, 16, BytesMut::zeroed(16)),
    );
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    op.complete(&mut transport, Err(TransportError::Io("connection reset".to_string())));
    let err = delivered(&mut pending).expect_err("io failure");
    assert!(err.message().ends_with("(read operation at offset 8192)"));
}
