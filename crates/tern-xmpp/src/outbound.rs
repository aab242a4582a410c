use futures::future::BoxFuture;
use tokio::sync::mpsc;
use tracing::warn;

use crate::error::SendError;
use crate::stanza::Stanza;

/// The send primitive the transport layer exposes to the core.
///
/// Handlers may call `send` from `handle`, since it only initiates delivery.
/// `send_confirmed` is what the blocking public API drives through the
/// [`crate::bridge::SyncBridge`].
pub trait StanzaSender: Send + Sync + 'static {
    /// Queue a stanza for delivery without waiting on the transport.
    fn send(&self, stanza: Stanza);

    /// Send a stanza and resolve once the transport confirms it.
    fn send_confirmed(&self, stanza: Stanza) -> BoxFuture<'static, Result<(), SendError>>;
}

/// [`StanzaSender`] backed by an unbounded queue drained by the transport
/// task. Confirmation here means accepted by the queue; wire-level
/// acknowledgements are the transport's concern.
pub struct QueueSender {
    tx: mpsc::UnboundedSender<Stanza>,
}

impl QueueSender {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Stanza>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl StanzaSender for QueueSender {
    fn send(&self, stanza: Stanza) {
        if self.tx.send(stanza).is_err() {
            warn!("transport queue closed, dropping outbound stanza");
        }
    }

    fn send_confirmed(&self, stanza: Stanza) -> BoxFuture<'static, Result<(), SendError>> {
        let result = self.tx.send(stanza).map_err(|_| SendError::Closed);
        Box::pin(async move { result })
    }
}
