use futures::Stream;
use pid::Pid;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::envelope::Envelope;
use crate::router::Router;

/// The inbound queue of one actor.
///
/// This implements the `futures` crate's [`Stream`](#impl-Stream) trait, yielding messages in
/// the order they were sent. Dropping the mailbox unregisters its [`Pid`] from the router.
pub struct Mailbox<M: Send + 'static> {
    pid: Pid,
    rx: UnboundedReceiverStream<Envelope<M>>,
    router: Router<M>,
}

impl<M: Send + 'static> Mailbox<M> {
    pub(crate) fn new(
        pid: Pid,
        rx: UnboundedReceiverStream<Envelope<M>>,
        router: Router<M>,
    ) -> Mailbox<M> {
        Mailbox { pid, rx, router }
    }

    /// The address other actors reach this mailbox at.
    pub fn pid(&self) -> &Pid {
        &self.pid
    }

    /// Sends `body` to `to`, from this mailbox.
    pub fn send(&self, to: &Pid, body: M) {
        self.router.send(&self.pid, to, body)
    }
}

impl<M: Send + 'static> Stream for Mailbox<M> {
    type Item = Envelope<M>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.rx).poll_next(cx)
    }
}

impl<M: Send + 'static> Drop for Mailbox<M> {
    fn drop(&mut self) {
        self.router.unregister(&self.pid);
    }
}
