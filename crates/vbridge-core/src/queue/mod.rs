use std::time::Duration;

use tokio::sync::{Mutex, mpsc};
use vbridge_model::Envelope;

use crate::error::QueueError;

/// Outbound side of the work queue consumed by the worker.
///
/// `enqueue` must not block: a full or closed queue is reported immediately.
pub trait WorkQueue: Send + Sync + 'static {
    fn enqueue(&self, envelope: Envelope) -> Result<(), QueueError>;
}

enum Tx {
    Bounded(mpsc::Sender<Envelope>),
    Unbounded(mpsc::UnboundedSender<Envelope>),
}

enum Rx {
    Bounded(mpsc::Receiver<Envelope>),
    Unbounded(mpsc::UnboundedReceiver<Envelope>),
}

impl Rx {
    async fn recv(&mut self) -> Option<Envelope> {
        match self {
            Rx::Bounded(rx) => rx.recv().await,
            Rx::Unbounded(rx) => rx.recv().await,
        }
    }
}

/// In-process [`WorkQueue`] backed by a tokio mpsc channel.
pub struct ChannelQueue {
    tx: Tx,
}

/// Worker half of a [`ChannelQueue`].
///
/// Safe to share between several consumers; each envelope is handed out once.
pub struct QueueReceiver {
    rx: Mutex<Rx>,
}

impl ChannelQueue {
    /// Create a queue. `capacity == 0` means unbounded.
    pub fn channel(capacity: usize) -> (ChannelQueue, QueueReceiver) {
        let (tx, rx) = if capacity == 0 {
            let (tx, rx) = mpsc::unbounded_channel();
            (Tx::Unbounded(tx), Rx::Unbounded(rx))
        } else {
            let (tx, rx) = mpsc::channel(capacity);
            (Tx::Bounded(tx), Rx::Bounded(rx))
        };
        (ChannelQueue { tx }, QueueReceiver { rx: Mutex::new(rx) })
    }
}

impl WorkQueue for ChannelQueue {
    fn enqueue(&self, envelope: Envelope) -> Result<(), QueueError> {
        match &self.tx {
            Tx::Bounded(tx) => tx.try_send(envelope).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => QueueError::Full,
                mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
            }),
            Tx::Unbounded(tx) => tx.send(envelope).map_err(|_| QueueError::Closed),
        }
    }
}

impl QueueReceiver {
    /// Next envelope; `None` once every sender is gone and the queue is drained.
    pub async fn recv(&self) -> Option<Envelope> {
        self.rx.lock().await.recv().await
    }

    /// Like [`recv`](Self::recv) but gives up after `wait`.
    pub async fn recv_timeout(&self, wait: Duration) -> Option<Envelope> {
        tokio::time::timeout(wait, self.recv()).await.ok().flatten()
    }
}
