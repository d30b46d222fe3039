//! State shared by every operation kind

use std::time::{Duration, Instant};

use socket2::Socket;
use url::Url;

use super::Phase;
use crate::broker::{BrokerAssociation, BrokerError};
use crate::config::{OperationConfig, OperationContext};
use crate::error::{self, Error, Result, is_error_status};
use crate::http::{HeaderState, MirrorHint};
use crate::transport::{ConnectMode, RequestMethod, Transport, TransportError};

/// The request-independent half of an operation: target, header state,
/// redirect and broker bookkeeping, header timeout and the done flag.
#[derive(Debug)]
pub struct OperationCore {
    url: Url,
    context: OperationContext,
    header_timeout: Duration,
    header_deadline: Option<Instant>,
    received_header: bool,
    timed_out: bool,
    headers: HeaderState,
    mirror: Option<MirrorHint>,
    x509: bool,
    broker_url: Option<String>,
    broker: Option<BrokerAssociation>,
    broker_attempted: bool,
    bound: bool,
    phase: Phase,
    done: bool,
}

impl OperationCore {
    #[must_use]
    pub fn new(url: Url, context: OperationContext) -> Self {
        let header_timeout = context.config.effective_header_timeout();
        Self {
            url,
            context,
            header_timeout,
            header_deadline: None,
            received_header: false,
            timed_out: false,
            headers: HeaderState::new(),
            mirror: None,
            x509: false,
            broker_url: None,
            broker: None,
            broker_attempted: false,
            bound: false,
            phase: Phase::Created,
            done: false,
        }
    }

    pub(crate) fn set_broker_url(&mut self, url: Option<String>) {
        self.broker_url = url;
    }

    pub(crate) fn set_x509(&mut self, x509: bool) {
        self.x509 = x509;
    }

    #[must_use]
    pub fn url(&self) -> &Url {
        &self.url
    }

    #[must_use]
    pub fn config(&self) -> &OperationConfig {
        &self.context.config
    }

    #[must_use]
    pub fn context(&self) -> &OperationContext {
        &self.context
    }

    /// Headers of the most recent response.
    #[must_use]
    pub fn headers(&self) -> &HeaderState {
        &self.headers
    }

    /// The mirror hint captured from the last redirect.
    #[must_use]
    pub fn mirror(&self) -> Option<&MirrorHint> {
        self.mirror.as_ref()
    }

    /// Whether requests carry client certificate material.
    #[must_use]
    pub fn uses_x509(&self) -> bool {
        self.x509
    }

    /// The broker URL in effect for this operation, if any.
    #[must_use]
    pub fn broker_url(&self) -> Option<&str> {
        self.broker_url.as_deref()
    }

    #[must_use]
    pub fn header_timeout(&self) -> Duration {
        self.header_timeout
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub(crate) fn set_phase(&mut self, phase: Phase) {
        if !self.done {
            self.phase = phase;
        }
    }

    #[inline]
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done
    }

    /// Irreversible.
    pub(crate) fn mark_done(&mut self) {
        self.done = true;
        self.phase = Phase::Done;
    }

    pub(crate) fn timed_out(&self) -> bool {
        self.timed_out
    }

    fn arm_header_deadline(&mut self, now: Instant) {
        self.header_deadline = Some(now + self.header_timeout);
        self.received_header = false;
        self.timed_out = false;
    }

    /// Applies the request-independent transport configuration.
    ///
    /// Returns `true` when a broker handoff was started and the request must
    /// wait for its socket.
    pub(crate) fn bind(&mut self, transport: &mut dyn Transport, now: Instant) -> Result<bool> {
        self.arm_header_deadline(now);
        self.bound = true;

        transport.set_url(&self.url);
        transport.set_callbacks(true);

        if self.x509 || self.context.config.requires_x509(self.url.host_str()) {
            self.x509 = true;
            self.apply_client_cert(transport);
        }

        match self.broker_url.clone() {
            Some(broker_url) => {
                self.start_broker(&broker_url, transport)?;
                Ok(true)
            }
            None => {
                transport.set_connect_mode(ConnectMode::Direct);
                Ok(false)
            }
        }
    }

    fn apply_client_cert(&self, transport: &mut dyn Transport) {
        let cert = self.context.config.client_cert.as_ref();
        if cert.is_none() {
            tracing::warn!(
                target: "httpfs::operation",
                url = %self.url,
                "X.509 auth requested but no client certificate is configured"
            );
        }
        transport.set_client_cert(cert);
    }

    fn start_broker(&mut self, broker_url: &str, transport: &mut dyn Transport) -> Result<()> {
        // A previous association, and any socket it still holds, is closed here.
        self.broker = None;
        self.broker_attempted = true;
        self.broker_url = Some(broker_url.to_string());

        let mut association = BrokerAssociation::open(broker_url, self.context.broker.as_ref())
            .map_err(|e| broker_start_error(broker_url, e))?;
        association
            .start()
            .map_err(|e| broker_start_error(broker_url, e))?;

        tracing::debug!(
            target: "httpfs::operation",
            url = %self.url,
            broker = broker_url,
            "Started broker request"
        );
        self.broker = Some(association);
        transport.set_connect_mode(ConnectMode::Broker);
        Ok(())
    }

    /// Engages the broker after a failed direct connection, at most once per
    /// operation. Returns `Ok(false)` when no retry applies.
    pub(crate) fn retry_with_broker(&mut self, transport: &mut dyn Transport) -> Result<bool> {
        if self.broker_attempted {
            return Ok(false);
        }
        let Some(broker_url) = self
            .broker_url
            .clone()
            .or_else(|| self.context.config.broker_url.clone())
        else {
            return Ok(false);
        };
        tracing::debug!(
            target: "httpfs::operation",
            url = %self.url,
            broker = %broker_url,
            "Direct connection failed, retrying through broker"
        );
        self.start_broker(&broker_url, transport)?;
        self.arm_header_deadline(Instant::now());
        Ok(true)
    }

    /// Records a header line. Returns the failure to deliver when the
    /// completed headers carry an HTTP error status.
    pub(crate) fn on_header_line(&mut self, line: &[u8]) -> Option<Error> {
        self.received_header = true;
        if let Err(e) = self.headers.parse_line(line) {
            tracing::debug!(
                target: "httpfs::operation",
                url = %self.url,
                error = %e,
                "Failed to parse response header"
            );
        }
        if !self.headers.is_complete() || !is_error_status(self.headers.status_code()) {
            return None;
        }
        tracing::debug!(
            target: "httpfs::operation",
            url = %self.url,
            status = self.headers.status_code(),
            "Server returned an error status"
        );
        Some(self.status_error())
    }

    /// The failure matching the current error status.
    pub(crate) fn status_error(&self) -> Error {
        match self.headers.status() {
            Some(status) => error::status(status, self.headers.status_message()),
            None => error::protocol(format!(
                "Server returned invalid status code {}",
                self.headers.status_code()
            )),
        }
    }

    /// Reconfigures `transport` for the redirect in the current headers.
    ///
    /// Returns `true` when the redirect carried a broker hint and the
    /// reissued request must wait for a broker socket.
    pub(crate) fn follow_redirect(&mut self, transport: &mut dyn Transport) -> Result<bool> {
        let broker = self.headers.broker().map(str::to_string);
        self.broker = None;

        let Some(location) = self.headers.location() else {
            tracing::warn!(
                target: "httpfs::operation",
                url = %self.url,
                "Server returned a redirect with no new location"
            );
            return Err(error::redirect("Server returned redirect without updated location"));
        };
        let target = self.url.join(location).map_err(|e| {
            error::redirect(format!("Server returned unusable redirect location {location:?}")).with(e)
        })?;

        tracing::debug!(
            target: "httpfs::operation",
            from = %self.url,
            to = %target,
            "Following redirect"
        );
        self.url = target;
        transport.set_url(&self.url);
        self.context.stats.record_redirect();

        self.mirror = self.headers.mirror().cloned();

        if self.headers.x509_required() {
            tracing::debug!(
                target: "httpfs::operation",
                url = %self.url,
                "Will use client X509 auth for future operations"
            );
            self.x509 = true;
            self.apply_client_cert(transport);
        }

        self.headers = HeaderState::new();
        self.arm_header_deadline(Instant::now());
        self.set_phase(Phase::Configured);

        match broker {
            Some(broker_url) => {
                self.start_broker(&broker_url, transport)?;
                Ok(true)
            }
            None => {
                transport.set_connect_mode(ConnectMode::Direct);
                Ok(false)
            }
        }
    }

    /// Evaluates the header deadline at `now`.
    pub(crate) fn header_timeout_expired_at(&mut self, now: Instant) -> bool {
        if self.received_header {
            return false;
        }
        let expired = self.header_deadline.is_some_and(|deadline| now > deadline);
        if expired && !self.timed_out {
            self.timed_out = true;
            self.context.stats.record_header_timeout();
            tracing::debug!(
                target: "httpfs::operation",
                url = %self.url,
                timeout_secs = self.header_timeout.as_secs_f64(),
                "Header timeout expired"
            );
        }
        expired
    }

    pub(crate) fn wait_socket(&self) -> Option<&Socket> {
        self.broker.as_ref()?.pending_socket()
    }

    /// Finishes the pending broker handoff and keeps the socket for the transport.
    pub(crate) fn finish_broker(&mut self) -> Result<()> {
        let Some(association) = self.broker.as_mut() else {
            return Err(error::internal("No broker request is pending"));
        };
        if let Err(e) = association.finish() {
            tracing::error!(
                target: "httpfs::operation",
                url = %self.url,
                broker = association.url(),
                error = %e,
                "Error when getting socket from broker"
            );
            return Err(error::transport(TransportError::ConnectFailed(e.to_string())));
        }
        tracing::debug!(
            target: "httpfs::operation",
            url = %self.url,
            broker = association.url(),
            "Got reverse connection from broker"
        );
        self.context.stats.record_broker_handoff();
        self.arm_header_deadline(Instant::now());
        Ok(())
    }

    pub(crate) fn take_socket(&mut self) -> Option<Socket> {
        self.broker.as_mut()?.take_socket()
    }

    /// Undoes [`bind`](Self::bind) and puts the method back to `GET`.
    /// Returns whether anything was bound.
    pub(crate) fn release(&mut self, transport: &mut dyn Transport) -> bool {
        if !self.bound {
            return false;
        }
        self.bound = false;
        transport.set_callbacks(false);
        transport.set_method(RequestMethod::Get);
        transport.clear_headers();
        transport.set_client_cert(None);
        transport.set_connect_mode(ConnectMode::Direct);
        self.broker = None;
        true
    }
}

fn broker_start_error(broker_url: &str, e: BrokerError) -> Error {
    let message = format!("Failed to start a read request for broker {broker_url}: {e}");
    error::broker(message, e)
}
