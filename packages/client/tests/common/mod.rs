//! Shared fixtures: a recording transport, a scripted broker and a response feeder.
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use http::HeaderMap;
use httpfs_client::prelude::*;
use socket2::{Domain, Socket, Type};

/// Records every configuration call an operation makes.
#[derive(Debug, Default)]
pub struct MockTransport {
    pub url: Option<Url>,
    pub method: RequestMethod,
    pub headers: HeaderMap,
    pub client_cert: Option<ClientCertConfig>,
    pub connect_mode: ConnectMode,
    pub callbacks: bool,
    /// Every URL set, in order.
    pub url_history: Vec<Url>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

impl Transport for MockTransport {
    fn set_url(&mut self, url: &Url) {
        self.url = Some(url.clone());
        self.url_history.push(url.clone());
    }

    fn set_method(&mut self, method: RequestMethod) {
        self.method = method;
    }

    fn set_headers(&mut self, headers: HeaderMap) {
        self.headers = headers;
    }

    fn clear_headers(&mut self) {
        self.headers.clear();
    }

    fn set_client_cert(&mut self, cert: Option<&ClientCertConfig>) {
        self.client_cert = cert.cloned();
    }

    fn set_connect_mode(&mut self, mode: ConnectMode) {
        self.connect_mode = mode;
    }

    fn set_callbacks(&mut self, enabled: bool) {
        self.callbacks = enabled;
    }

    fn effective_url(&self) -> Option<Url> {
        self.url.clone()
    }
}

/// Feeds a response to `op` the way a driver would.
///
/// Header lines get CRLF endings and a terminating blank line. Returns the
/// transfer result the driver would report: `Aborted` as soon as a callback
/// asks to stop.
pub fn respond(
    op: &mut dyn HttpOperation,
    head: &[&str],
    body: &[&[u8]],
) -> std::result::Result<(), TransportError> {
    for line in head {
        if op.on_header_line(format!("{line}\r\n").as_bytes()).is_abort() {
            return Err(TransportError::Aborted);
        }
    }
    if op.on_header_line(b"\r\n").is_abort() {
        return Err(TransportError::Aborted);
    }
    for chunk in body {
        if op.on_body(chunk).is_abort() {
            return Err(TransportError::Aborted);
        }
    }
    Ok(())
}

pub fn url(s: &str) -> Url {
    Url::parse(s).expect("test URL should parse")
}

/// Takes the delivered result, panicking if none was delivered.
pub fn delivered<T>(pending: &mut Pending<T>) -> Result<T> {
    pending.try_recv().expect("operation should have delivered a result")
}

pub fn multistatus_file(size: u64) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:" xmlns:lp1="DAV:">
  <D:response>
    <D:href>/ns/file.bin</D:href>
    <D:propstat>
      <D:prop>
        <lp1:getcontentlength>{size}</lp1:getcontentlength>
        <lp1:resourcetype/>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#
    )
}

pub const MULTISTATUS_DIRECTORY: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<D:multistatus xmlns:D="DAV:">
  <D:response>
    <D:href>/ns/dir/</D:href>
    <D:propstat>
      <D:prop>
        <D:resourcetype><D:collection/></D:resourcetype>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
  <D:response>
    <D:href>/ns/dir/a.txt</D:href>
    <D:propstat>
      <D:prop>
        <D:getcontentlength>3</D:getcontentlength>
        <D:resourcetype/>
      </D:prop>
      <D:status>HTTP/1.1 200 OK</D:status>
    </D:propstat>
  </D:response>
</D:multistatus>"#;

/// A broker whose sessions hand out fresh, unconnected sockets.
#[derive(Debug, Default)]
pub struct MockBroker {
    pub fail_start: bool,
    pub fail_finish: bool,
    opened: Mutex<Vec<String>>,
    finished: Arc<AtomicUsize>,
}

impl MockBroker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_start() -> Self {
        Self {
            fail_start: true,
            ..Self::default()
        }
    }

    pub fn failing_finish() -> Self {
        Self {
            fail_finish: true,
            ..Self::default()
        }
    }

    /// Broker URLs sessions were opened for.
    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().expect("broker log lock").clone()
    }

    pub fn finished(&self) -> usize {
        self.finished.load(Ordering::SeqCst)
    }
}

impl BrokerConnector for MockBroker {
    fn open(&self, broker_url: &str) -> std::result::Result<Box<dyn BrokerSession>, BrokerError> {
        self.opened
            .lock()
            .expect("broker log lock")
            .push(broker_url.to_string());
        Ok(Box::new(MockSession {
            url: broker_url.to_string(),
            fail_start: self.fail_start,
            fail_finish: self.fail_finish,
            rendezvous: None,
            finished: Arc::clone(&self.finished),
        }))
    }
}

struct MockSession {
    url: String,
    fail_start: bool,
    fail_finish: bool,
    rendezvous: Option<Socket>,
    finished: Arc<AtomicUsize>,
}

fn new_socket() -> std::io::Result<Socket> {
    Socket::new(Domain::IPV4, Type::STREAM, None)
}

impl BrokerSession for MockSession {
    fn start_request(&mut self) -> std::result::Result<(), BrokerError> {
        if self.fail_start {
            return Err(BrokerError::Start {
                url: self.url.clone(),
                reason: "connection refused".to_string(),
            });
        }
        let socket = new_socket().map_err(|e| BrokerError::Start {
            url: self.url.clone(),
            reason: e.to_string(),
        })?;
        self.rendezvous = Some(socket);
        Ok(())
    }

    fn poll_socket(&self) -> Option<&Socket> {
        self.rendezvous.as_ref()
    }

    fn finish_request(&mut self) -> std::result::Result<Socket, BrokerError> {
        if self.fail_finish {
            return Err(BrokerError::Finish {
                url: self.url.clone(),
                reason: "peer never called back".to_string(),
            });
        }
        self.finished.fetch_add(1, Ordering::SeqCst);
        new_socket().map_err(|e| BrokerError::Finish {
            url: self.url.clone(),
            reason: e.to_string(),
        })
    }
}
