use tokio::sync::oneshot;

use crate::error::Result;

/// The caller's end of an operation: resolves exactly once.
pub type Pending<T> = oneshot::Receiver<Result<T>>;

/// The operation's end: consumed by the first delivery.
#[derive(Debug)]
pub struct ResultSink<T> {
    sender: Option<oneshot::Sender<Result<T>>>,
}

impl<T> ResultSink<T> {
    #[must_use]
    pub fn channel() -> (Self, Pending<T>) {
        let (sender, receiver) = oneshot::channel();
        (
            Self {
                sender: Some(sender),
            },
            receiver,
        )
    }

    #[inline]
    #[must_use]
    pub fn is_consumed(&self) -> bool {
        self.sender.is_none()
    }

    /// Sends `result` if nothing was sent before.
    ///
    /// Returns whether this call consumed the sink. A caller that already
    /// dropped its [`Pending`] still counts as delivered to.
    pub fn deliver(&mut self, result: Result<T>) -> bool {
        match self.sender.take() {
            Some(sender) => {
                let _ = sender.send(result);
                true
            }
            None => false,
        }
    }
}
