use std::fmt;
use std::time::Instant;

use socket2::Socket;
use url::Url;

use super::base::OperationCore;
use super::sink::{Pending, ResultSink};
use super::{HttpOperation, Phase, Progress, Step};
use crate::config::OperationContext;
use crate::error::{self, Error, Result, is_error_status};
use crate::transport::{Transport, TransportError};

/// Outcome of [`OperationKind::configure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Configured {
    /// The request is ready to be issued.
    Pending,
    /// Nothing needs to go over the network; succeed right away.
    Complete,
}

/// The request-specific half of an operation.
///
/// A kind builds its request, consumes the body and decodes the success
/// payload. Everything else (redirects, brokers, timeouts, result delivery)
/// is handled by [`Operation`].
pub trait OperationKind: Send {
    type Output: Send + 'static;

    /// Short name used in log lines.
    const NAME: &'static str;

    /// Sets the method and request headers on `transport`.
    fn configure(&mut self, core: &OperationCore, transport: &mut dyn Transport) -> Result<Configured>;

    /// Adjusts the request after `core` followed a redirect.
    fn on_redirect(&mut self, _core: &OperationCore, _transport: &mut dyn Transport) {}

    /// Consumes a body chunk of a non-redirect response.
    ///
    /// `Ok(Progress::Abort)` stops the transfer and leaves the failure to
    /// [`pending_failure`](Self::pending_failure); `Err` fails immediately.
    fn on_body(&mut self, core: &OperationCore, chunk: &[u8]) -> Result<Progress>;

    /// A failure recorded by an earlier `Ok(Progress::Abort)`.
    fn pending_failure(&mut self) -> Option<Error> {
        None
    }

    /// Decodes the success payload.
    fn finish(&mut self, core: &OperationCore, transport: &dyn Transport) -> Result<Self::Output>;

    /// Adds kind-specific context to a failure before delivery.
    fn decorate(&self, error: Error) -> Error {
        error
    }

    /// Drops any caller-provided resources once a failure was delivered.
    fn discard(&mut self) {}

    /// Reverses what `configure` and `on_redirect` set on `transport`.
    fn release(&mut self, _transport: &mut dyn Transport) {}
}

/// An operation of kind `K`: shared state, the kind and its one-shot result sink.
pub struct Operation<K: OperationKind> {
    core: OperationCore,
    kind: K,
    sink: ResultSink<K::Output>,
}

impl<K: OperationKind> Operation<K> {
    /// Creates the operation and the receiver its single result arrives on.
    #[must_use]
    pub fn new(url: Url, context: OperationContext, kind: K) -> (Self, Pending<K::Output>) {
        let (sink, pending) = ResultSink::channel();
        let operation = Self {
            core: OperationCore::new(url, context),
            kind,
            sink,
        };
        (operation, pending)
    }

    /// Connects through `broker_url` from the first request on.
    #[must_use]
    pub fn with_broker_url(mut self, broker_url: impl Into<String>) -> Self {
        self.core.set_broker_url(Some(broker_url.into()));
        self
    }

    /// Sends client certificate material from the first request on.
    #[must_use]
    pub fn with_x509(mut self, x509: bool) -> Self {
        self.core.set_x509(x509);
        self
    }

    #[must_use]
    pub fn core(&self) -> &OperationCore {
        &self.core
    }

    #[must_use]
    pub fn kind(&self) -> &K {
        &self.kind
    }
}

impl<K: OperationKind> HttpOperation for Operation<K> {
    fn url(&self) -> &Url {
        self.core.url()
    }

    fn phase(&self) -> Phase {
        self.core.phase()
    }

    fn is_done(&self) -> bool {
        self.core.is_done()
    }

    fn setup(&mut self, transport: &mut dyn Transport) -> Step {
        if self.core.is_done() {
            return Step::Done;
        }
        self.core.context().stats.record_started();

        match self.kind.configure(&self.core, transport) {
            Err(e) => {
                self.fail(e);
                Step::Done
            }
            Ok(Configured::Complete) => {
                self.succeed(&*transport);
                Step::Done
            }
            Ok(Configured::Pending) => match self.core.bind(transport, Instant::now()) {
                Err(e) => {
                    self.fail(e);
                    Step::Done
                }
                Ok(true) => {
                    self.core.set_phase(Phase::Configured);
                    Step::AwaitSocket
                }
                Ok(false) => {
                    self.core.set_phase(Phase::AwaitingHeaders);
                    Step::Perform
                }
            },
        }
    }

    fn on_header_line(&mut self, line: &[u8]) -> Progress {
        if self.core.is_done() {
            return Progress::Abort;
        }
        match self.core.on_header_line(line) {
            Some(failure) => {
                self.fail(failure);
                Progress::Abort
            }
            None => Progress::Continue,
        }
    }

    fn on_body(&mut self, chunk: &[u8]) -> Progress {
        if self.core.is_done() {
            return Progress::Abort;
        }
        // Redirect bodies are neither payload nor XML.
        if self.core.headers().is_redirect() {
            return Progress::Continue;
        }
        self.core.set_phase(Phase::BodyStreaming);
        self.core.context().stats.record_body_bytes(chunk.len());

        match self.kind.on_body(&self.core, chunk) {
            Ok(progress) => progress,
            Err(e) => {
                self.fail(e);
                Progress::Abort
            }
        }
    }

    fn is_redirect(&self) -> bool {
        self.core.headers().is_redirect()
    }

    fn redirect(&mut self, transport: &mut dyn Transport) -> Step {
        if self.core.is_done() {
            return Step::Done;
        }
        match self.core.follow_redirect(transport) {
            Err(e) => {
                self.fail(e);
                Step::Done
            }
            Ok(await_socket) => {
                self.kind.on_redirect(&self.core, transport);
                if await_socket {
                    Step::AwaitSocket
                } else {
                    self.core.set_phase(Phase::AwaitingHeaders);
                    Step::Perform
                }
            }
        }
    }

    fn header_timeout_expired_at(&mut self, now: Instant) -> bool {
        !self.core.is_done() && self.core.header_timeout_expired_at(now)
    }

    fn wait_socket(&self) -> Option<&Socket> {
        if self.core.is_done() {
            return None;
        }
        self.core.wait_socket()
    }

    fn wait_socket_callback(&mut self) -> Step {
        if self.core.is_done() {
            return Step::Done;
        }
        match self.core.finish_broker() {
            Ok(()) => {
                self.core.set_phase(Phase::AwaitingHeaders);
                Step::Perform
            }
            Err(e) => {
                self.fail(e);
                Step::Done
            }
        }
    }

    fn take_socket(&mut self) -> Option<Socket> {
        self.core.take_socket()
    }

    fn complete(
        &mut self,
        transport: &mut dyn Transport,
        result: std::result::Result<(), TransportError>,
    ) -> Step {
        if self.core.is_done() {
            return Step::Done;
        }

        if let Err(e) = result {
            if self.core.timed_out() {
                let timeout = self.core.header_timeout();
                self.fail(error::header_timeout(timeout));
                return Step::Done;
            }
            if e.is_connect_failure() {
                match self.core.retry_with_broker(transport) {
                    Ok(true) => {
                        self.core.set_phase(Phase::Configured);
                        return Step::AwaitSocket;
                    }
                    Ok(false) => {}
                    Err(failure) => {
                        self.fail(failure);
                        return Step::Done;
                    }
                }
            }
            let failure = self
                .kind
                .pending_failure()
                .unwrap_or_else(|| error::transport(e));
            self.fail(failure);
            return Step::Done;
        }

        let headers = self.core.headers();
        if !headers.is_complete() {
            self.fail(error::protocol(
                "Server closed the response before its headers were complete",
            ));
            return Step::Done;
        }
        if headers.is_redirect() {
            return self.redirect(transport);
        }
        if is_error_status(headers.status_code()) {
            let failure = self.core.status_error();
            self.fail(failure);
            return Step::Done;
        }
        if let Some(failure) = self.kind.pending_failure() {
            self.fail(failure);
            return Step::Done;
        }

        self.succeed(&*transport);
        Step::Done
    }

    fn succeed(&mut self, transport: &dyn Transport) {
        if self.sink.is_consumed() {
            self.core.mark_done();
            return;
        }
        match self.kind.finish(&self.core, transport) {
            Ok(output) => {
                self.core.mark_done();
                if self.sink.deliver(Ok(output)) {
                    self.core.context().stats.record_succeeded();
                }
            }
            Err(e) => self.fail(e),
        }
    }

    fn fail(&mut self, error: Error) {
        self.core.mark_done();
        if self.sink.is_consumed() {
            return;
        }
        let error = self.kind.decorate(error).with_url(self.core.url().clone());
        self.kind.discard();

        tracing::debug!(
            target: "httpfs::operation",
            operation = K::NAME,
            url = %self.core.url(),
            code = ?error.code(),
            error = error.message(),
            "Operation failed"
        );
        if self.sink.deliver(Err(error)) {
            self.core.context().stats.record_failed();
        }
    }

    fn release_handle(&mut self, transport: &mut dyn Transport) {
        if self.core.release(transport) {
            self.kind.release(transport);
        }
    }
}

impl<K: OperationKind> fmt::Debug for Operation<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("kind", &K::NAME)
            .field("core", &self.core)
            .field("delivered", &self.sink.is_consumed())
            .finish()
    }
}
