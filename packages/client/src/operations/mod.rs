//! HTTP filesystem operations
//!
//! Each filesystem call (stat, open, read, page read, listdir) is an
//! [`Operation`] driven through the object-safe [`HttpOperation`] trait. The
//! driver owns the event loop and the transport handles; the operation only
//! reacts to the callbacks below and reports exactly one result through the
//! [`Pending`] receiver handed out at construction.
//!
//! A typical drive looks like:
//!
//! ```text
//! setup ──Perform──▶ header lines ─▶ body chunks ─▶ complete ──Done──▶ release_handle
//!   │                      ▲                           │
//!   └─AwaitSocket─▶ wait_socket / wait_socket_callback │
//!                          └────────Perform────────────┘ (redirect, broker retry)
//! ```

mod base;
mod kind;
pub mod listdir;
pub mod open;
pub mod page_read;
pub mod read;
mod sink;
pub mod stat;

use std::time::Instant;

use socket2::Socket;
use url::Url;

use crate::error::Error;
use crate::transport::{Transport, TransportError};

pub use base::OperationCore;
pub use kind::{Configured, Operation, OperationKind};
pub use listdir::{DirectoryListing, ListdirKind, ListdirOperation};
pub use open::{OpenKind, OpenOperation};
pub use page_read::{PageInfo, PageReadKind, PageReadOperation};
pub use read::{ChunkInfo, ReadKind, ReadOperation};
pub use sink::{Pending, ResultSink};
pub use stat::{StatFlags, StatInfo, StatKind, StatOperation, StatTarget};

/// Answer to a data callback: keep the transfer going or abort it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Progress {
    Continue,
    Abort,
}

impl Progress {
    #[inline]
    #[must_use]
    pub fn is_abort(self) -> bool {
        matches!(self, Progress::Abort)
    }
}

/// What the driver must do next with an operation's transport handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Issue (or re-issue) the request on the handle.
    Perform,
    /// Poll [`HttpOperation::wait_socket`] and call
    /// [`HttpOperation::wait_socket_callback`] once it is readable.
    AwaitSocket,
    /// The result has been delivered; release the handle.
    Done,
}

/// Lifecycle position of an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Created,
    /// Bound to a transport, waiting for a broker socket before the request can go out.
    Configured,
    AwaitingHeaders,
    BodyStreaming,
    Done,
}

/// The driver-facing side of an operation.
///
/// All methods are called from the single thread currently driving the
/// operation's transport handle. Callbacks arriving after the operation is
/// done are accepted and ignored.
pub trait HttpOperation: Send {
    /// Current target, updated on every redirect.
    fn url(&self) -> &Url;

    fn phase(&self) -> Phase;

    fn is_done(&self) -> bool;

    /// Binds the operation to `transport` and arms the header timeout.
    fn setup(&mut self, transport: &mut dyn Transport) -> Step;

    /// Feeds one raw response header line.
    fn on_header_line(&mut self, line: &[u8]) -> Progress;

    /// Feeds one chunk of the response body.
    fn on_body(&mut self, chunk: &[u8]) -> Progress;

    /// Periodic progress poll; aborts when the header timeout has expired.
    fn on_progress(&mut self) -> Progress {
        if self.is_done() || self.header_timeout_expired() {
            Progress::Abort
        } else {
            Progress::Continue
        }
    }

    /// True when the last complete response was a 3xx.
    fn is_redirect(&self) -> bool;

    /// Follows the redirect described by the last response.
    fn redirect(&mut self, transport: &mut dyn Transport) -> Step;

    /// True, and remembered, once the deadline passed without any header.
    fn header_timeout_expired(&mut self) -> bool {
        self.header_timeout_expired_at(Instant::now())
    }

    fn header_timeout_expired_at(&mut self, now: Instant) -> bool;

    /// Descriptor of a pending broker handoff, if one is in progress.
    fn wait_socket(&self) -> Option<&Socket>;

    /// Completes a broker handoff once [`wait_socket`](Self::wait_socket) is
    /// readable. Blocks; the driver runs it off the event loop.
    fn wait_socket_callback(&mut self) -> Step;

    /// The transport's socket-open hook. Yields the broker socket exactly once.
    fn take_socket(&mut self) -> Option<Socket>;

    /// Reports the end of a transfer and returns the next step.
    fn complete(&mut self, transport: &mut dyn Transport, result: Result<(), TransportError>) -> Step;

    /// Delivers the success payload, or the failure decoding it produced.
    fn succeed(&mut self, transport: &dyn Transport);

    /// Delivers `error` unless a result was already delivered.
    fn fail(&mut self, error: Error);

    /// Reverses everything `setup` and `redirect` configured on `transport`.
    fn release_handle(&mut self, transport: &mut dyn Transport);
}
