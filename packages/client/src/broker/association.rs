use std::fmt;
use std::sync::Arc;

use socket2::Socket;

use super::{BrokerConnector, BrokerError, BrokerSession};

/// A broker session owned by one operation, plus the socket it handed over.
///
/// The socket is held until the transport's socket-open hook takes it; after
/// that the operation no longer owns it and nothing here will close it.
pub struct BrokerAssociation {
    url: String,
    session: Box<dyn BrokerSession>,
    started: bool,
    socket: Option<Socket>,
}

impl BrokerAssociation {
    /// Opens a session for `url` without contacting the broker yet.
    pub fn open(url: &str, connector: Option<&Arc<dyn BrokerConnector>>) -> Result<Self, BrokerError> {
        let connector = connector.ok_or_else(|| BrokerError::NotConfigured(url.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            session: connector.open(url)?,
            started: false,
            socket: None,
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn start(&mut self) -> Result<(), BrokerError> {
        self.session.start_request()?;
        self.started = true;
        Ok(())
    }

    /// The descriptor to poll, present only while a started request awaits its socket.
    #[must_use]
    pub fn pending_socket(&self) -> Option<&Socket> {
        if self.started && self.socket.is_none() {
            self.session.poll_socket()
        } else {
            None
        }
    }

    /// Completes the rendez-vous and keeps the resulting socket for handoff.
    pub fn finish(&mut self) -> Result<(), BrokerError> {
        if !self.started {
            return Err(BrokerError::NotStarted(self.url.clone()));
        }
        self.started = false;
        let socket = self.session.finish_request()?;
        self.socket = Some(socket);
        Ok(())
    }

    /// Surrenders the socket to the transport. Returns `None` on every call after the first.
    pub fn take_socket(&mut self) -> Option<Socket> {
        self.socket.take()
    }
}

impl fmt::Debug for BrokerAssociation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BrokerAssociation")
            .field("url", &self.url)
            .field("started", &self.started)
            .field("has_socket", &self.socket.is_some())
            .finish()
    }
}
