mod common;

use common::{MULTISTATUS_DIRECTORY, MockTransport, delivered, respond, url};
use httpfs_client::operations::listdir::MAX_LISTING_BODY;
use httpfs_client::prelude::*;

fn listdir() -> (ListdirOperation, Pending<DirectoryListing>) {
    ListdirOperation::new(
        url("https://origin.example.org/ns/dir/"),
        OperationContext::default(),
        ListdirKind::new(),
    )
}

#[test]
fn test_listdir_issues_depth_one_propfind() {
    let (mut op, _pending) = listdir();
    let mut transport = MockTransport::new();
    assert_eq!(op.setup(&mut transport), Step::Perform);
    assert_eq!(transport.method, RequestMethod::Propfind);
    assert_eq!(transport.header("depth"), Some("1"));
}

#[test]
fn test_listdir_delivers_raw_body() {
    let (mut op, mut pending) = listdir();
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let (head, tail) = MULTISTATUS_DIRECTORY.as_bytes().split_at(100);
    let result = respond(&mut op, &["HTTP/1.1 207 Multi-Status"], &[head, tail]);
    op.complete(&mut transport, result);

    let listing = delivered(&mut pending).expect("listing succeeds");
    assert_eq!(listing.body.as_ref(), MULTISTATUS_DIRECTORY.as_bytes());
    assert_eq!(listing.url.as_str(), "https://origin.example.org/ns/dir/");

    let entries = listing.entries().expect("listing decodes");
    assert_eq!(entries.len(), 2);
    assert!(entries[0].is_dir);
    assert_eq!(entries[1].href, "/ns/dir/a.txt");
    assert_eq!(entries[1].size, Some(3));
}

#[test]
fn test_oversized_listing_fails() {
    let (mut op, mut pending) = listdir();
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let chunk = vec![b' '; MAX_LISTING_BODY];
    let result = respond(&mut op, &["HTTP/1.1 207 Multi-Status"], &[&chunk, b"<"]);
    assert_eq!(result, Err(TransportError::Aborted));
    op.complete(&mut transport, result);

    let err = delivered(&mut pending).expect_err("listing too large");
    assert!(err.is_decode());
}

#[test]
fn test_missing_directory() {
    let (mut op, mut pending) = listdir();
    let mut transport = MockTransport::new();
    op.setup(&mut transport);

    let result = respond(&mut op, &["HTTP/1.1 404 Not Found"], &[]);
    op.complete(&mut transport, result);

    let err = delivered(&mut pending).expect_err("missing directory");
    assert_eq!(err.code().subcode, Subcode::NotFound);
}
