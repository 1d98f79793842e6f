use futures::channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use crate::envelope::Envelope;

/// What happens to a message caught by [`crate::Router::intercept`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Hand a copy to the interceptor and deliver the message as usual.
    Deliver,
    /// Hand the message to the interceptor and do not deliver it.
    Drop,
}

pub(crate) type Predicate<M> = Box<dyn Fn(&Envelope<M>) -> bool + Send + Sync>;

pub(crate) enum Action<M> {
    Deliver {
        tx: oneshot::Sender<Envelope<M>>,
        copy: fn(&Envelope<M>) -> Envelope<M>,
    },
    Drop {
        tx: oneshot::Sender<Envelope<M>>,
    },
}

pub(crate) struct Filter<M> {
    pub(crate) predicate: Predicate<M>,
    pub(crate) action: Action<M>,
}

impl<M> Filter<M> {
    /// Runs the action of a matched filter; returns the envelope if it still has to be delivered.
    pub(crate) fn apply(self, envelope: Envelope<M>) -> Option<Envelope<M>> {
        match self.action {
            Action::Deliver { tx, copy } => {
                let _ = tx.send(copy(&envelope));
                Some(envelope)
            }
            Action::Drop { tx } => {
                log::debug!(
                    "Intercepted and dropped message from {} to {}",
                    envelope.from,
                    envelope.to
                );
                let _ = tx.send(envelope);
                None
            }
        }
    }
}

/// Resolves to the first envelope matching an interception, or `None` if the router went away
/// before one was sent.
#[must_use = "futures do nothing unless you `.await` or poll them"]
pub struct Intercepted<M> {
    pub(crate) rx: oneshot::Receiver<Envelope<M>>,
}

impl<M> Future for Intercepted<M> {
    type Output = Option<Envelope<M>>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}
