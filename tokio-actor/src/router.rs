use futures::channel::oneshot;
use log::{debug, trace};
use pid::Pid;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::envelope::Envelope;
use crate::intercept::{Action, Disposition, Filter, Intercepted};
use crate::mailbox::Mailbox;

pub(crate) struct Inner<M> {
    host: String,
    port: u16,
    next_id: AtomicU64,
    mailboxes: RwLock<HashMap<Pid, mpsc::UnboundedSender<Envelope<M>>>>,
    filters: Mutex<Vec<Filter<M>>>,
}

/// Delivers messages between the mailboxes of one node.
///
/// Cloning a router is cheap, all clones share the same mailboxes.
pub struct Router<M> {
    pub(crate) inner: Arc<Inner<M>>,
}

impl<M> Clone for Router<M> {
    fn clone(&self) -> Self {
        Router {
            inner: self.inner.clone(),
        }
    }
}

impl<M: Send + 'static> Router<M> {
    /// Creates a router for the node at `host`:`port`; every spawned [`Pid`] carries them.
    pub fn new<H: Into<String>>(host: H, port: u16) -> Router<M> {
        Router {
            inner: Arc::new(Inner {
                host: host.into(),
                port,
                next_id: AtomicU64::new(1),
                mailboxes: RwLock::new(HashMap::new()),
                filters: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Registers a new mailbox with an id of the form `name(N)`.
    ///
    /// The mailbox stays reachable until it is dropped.
    pub fn spawn(&self, name: &str) -> Result<Mailbox<M>, pid::Error> {
        let n = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let pid = Pid::from_parts(
            format!("{}({})", name, n),
            self.inner.host.clone(),
            self.inner.port,
        )?;
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner
            .mailboxes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(pid.clone(), tx);
        trace!("Spawned mailbox {}", pid);
        Ok(Mailbox::new(
            pid,
            UnboundedReceiverStream::new(rx),
            self.clone(),
        ))
    }

    /// Sends `body` from `from` to `to`.
    ///
    /// This never fails: a message to a mailbox that doesn't exist (anymore) is dropped.
    pub fn send(&self, from: &Pid, to: &Pid, body: M) {
        let envelope = Envelope {
            from: from.clone(),
            to: to.clone(),
            body,
        };
        let envelope = match self.filter(envelope) {
            Some(envelope) => envelope,
            None => return,
        };
        let mailboxes = self
            .inner
            .mailboxes
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        match mailboxes.get(to) {
            Some(tx) => {
                if tx.send(envelope).is_err() {
                    debug!("Dropping message from {} to {}: mailbox closed", from, to);
                }
            }
            None => debug!("Dropping message from {} to unknown {}", from, to),
        }
    }

    /// Whether a mailbox is currently registered at `pid`.
    pub fn is_alive(&self, pid: &Pid) -> bool {
        self.inner
            .mailboxes
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(pid)
    }

    pub(crate) fn unregister(&self, pid: &Pid) {
        self.inner
            .mailboxes
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(pid);
        trace!("Terminated mailbox {}", pid);
    }

    fn filter(&self, envelope: Envelope<M>) -> Option<Envelope<M>> {
        let mut filters = self
            .inner
            .filters
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        match filters
            .iter()
            .position(|filter| (filter.predicate)(&envelope))
        {
            Some(index) => filters.remove(index).apply(envelope),
            None => Some(envelope),
        }
    }
}

impl<M: Clone + Send + 'static> Router<M> {
    /// Catches the next message matching `predicate`.
    ///
    /// The returned future resolves to that message; depending on `disposition` the message
    /// is delivered as usual or swallowed. Each interception fires at most once.
    pub fn intercept<F>(&self, predicate: F, disposition: Disposition) -> Intercepted<M>
    where
        F: Fn(&Envelope<M>) -> bool + Send + Sync + 'static,
    {
        let (tx, rx) = oneshot::channel();
        let action = match disposition {
            Disposition::Deliver => Action::Deliver {
                tx,
                copy: Envelope::clone,
            },
            Disposition::Drop => Action::Drop { tx },
        };
        self.inner
            .filters
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Filter {
                predicate: Box::new(predicate),
                action,
            });
        Intercepted { rx }
    }
}
