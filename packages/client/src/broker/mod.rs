//! Connection broker seam
//!
//! When a server cannot be reached directly, a broker exchanges a rendez-vous
//! request for an already connected TCP socket. The exchange has two halves: a
//! non-blocking [`BrokerSession::start_request`] that yields a pollable
//! descriptor, and a blocking [`BrokerSession::finish_request`] the driver runs
//! off the event loop once that descriptor turns readable.

mod association;

pub use association::BrokerAssociation;

use socket2::Socket;
use thiserror::Error;

/// Opens broker sessions for a broker URL.
pub trait BrokerConnector: Send + Sync {
    fn open(&self, broker_url: &str) -> Result<Box<dyn BrokerSession>, BrokerError>;
}

/// One rendez-vous exchange with a broker.
pub trait BrokerSession: Send {
    /// Sends the rendez-vous request without blocking.
    fn start_request(&mut self) -> Result<(), BrokerError>;

    /// The descriptor to wait on while a started request is pending.
    fn poll_socket(&self) -> Option<&Socket>;

    /// Waits for the broker's answer and returns the connected socket.
    fn finish_request(&mut self) -> Result<Socket, BrokerError>;
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BrokerError {
    #[error("no connection broker is configured for {0}")]
    NotConfigured(String),
    #[error("failed to start a request for broker {url}: {reason}")]
    Start { url: String, reason: String },
    #[error("broker {url} did not supply a socket: {reason}")]
    Finish { url: String, reason: String },
    #[error("broker request for {0} was never started")]
    NotStarted(String),
}
