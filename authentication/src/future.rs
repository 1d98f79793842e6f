// Copyright (c) 2024 procauth contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! One-shot result handles.
//!
//! A [`Promise`] is the write side, an [`AuthFuture`] the read side. The promise is consumed
//! when it is completed, so an outcome is delivered at most once; dropping it unfulfilled
//! resolves the handle to [`AuthError::Aborted`].

use futures::channel::oneshot;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::task::{Context, Poll};

use crate::error::AuthError;

/// Write side of an [`AuthFuture`].
#[derive(Debug)]
pub struct Promise<T> {
    tx: oneshot::Sender<Result<T, AuthError>>,
}

impl<T> Promise<T> {
    /// Creates a connected promise and handle.
    pub fn new() -> (Promise<T>, AuthFuture<T>) {
        let (tx, rx) = oneshot::channel();
        (Promise { tx }, AuthFuture { rx, ready: None })
    }

    /// Resolves the handle with `value`; `false` if nobody holds the handle anymore.
    pub fn set(self, value: T) -> bool {
        self.complete(Ok(value))
    }

    /// Fails the handle with `error`; `false` if nobody holds the handle anymore.
    pub fn fail(self, error: AuthError) -> bool {
        self.complete(Err(error))
    }

    /// Resolves the handle with `result`; `false` if nobody holds the handle anymore.
    pub fn complete(self, result: Result<T, AuthError>) -> bool {
        self.tx.send(result).is_ok()
    }
}

/// The outcome of an authentication attempt, available once.
///
/// Awaiting the handle yields the outcome, or the [`AuthError`] that prevented one.
#[must_use = "futures do nothing unless you `.await` or poll them"]
#[derive(Debug)]
pub struct AuthFuture<T> {
    rx: oneshot::Receiver<Result<T, AuthError>>,
    ready: Option<Result<T, AuthError>>,
}

// The value is never pinned in place, only moved out.
impl<T> Unpin for AuthFuture<T> {}

impl<T> AuthFuture<T> {
    /// Whether the outcome is still unknown. This never blocks.
    pub fn is_pending(&mut self) -> bool {
        if self.ready.is_some() {
            return false;
        }
        match self.rx.try_recv() {
            Ok(Some(result)) => {
                self.ready = Some(result);
                false
            }
            Ok(None) => true,
            Err(oneshot::Canceled) => {
                self.ready = Some(Err(abandoned()));
                false
            }
        }
    }
}

impl<T> Future for AuthFuture<T> {
    type Output = Result<T, AuthError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        if let Some(result) = self.ready.take() {
            return Poll::Ready(result);
        }
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|result| result.unwrap_or_else(|_| Err(abandoned())))
    }
}

fn abandoned() -> AuthError {
    AuthError::Aborted(String::from("promise abandoned"))
}

static NEXT_INSTANCE: AtomicU64 = AtomicU64::new(1);

/// A fresh identifier for one authentication attempt.
pub(crate) fn next_instance() -> u64 {
    NEXT_INSTANCE.fetch_add(1, Ordering::Relaxed)
}

struct Armed<T> {
    instance: u64,
    promise: Promise<T>,
}

/// The promise of the running attempt, shared between its owner and its task.
///
/// Whoever takes the promise out first decides the outcome. The task only takes a promise
/// armed with its own instance, so a torn down attempt can never resolve its successor.
pub(crate) struct Slot<T> {
    armed: Arc<Mutex<Option<Armed<T>>>>,
}

impl<T> Clone for Slot<T> {
    fn clone(&self) -> Self {
        Slot {
            armed: self.armed.clone(),
        }
    }
}

impl<T> Slot<T> {
    pub(crate) fn new() -> Slot<T> {
        Slot {
            armed: Arc::new(Mutex::new(None)),
        }
    }

    /// Arms the slot for `instance` and returns the matching handle.
    pub(crate) fn arm(&self, instance: u64) -> AuthFuture<T> {
        let (promise, future) = Promise::new();
        let previous = self
            .armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .replace(Armed { instance, promise });
        if let Some(previous) = previous {
            previous
                .promise
                .fail(AuthError::Aborted(String::from("superseded")));
        }
        future
    }

    pub(crate) fn is_armed(&self) -> bool {
        self.armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Takes the promise if it still belongs to `instance`.
    pub(crate) fn take(&self, instance: u64) -> Option<Promise<T>> {
        let mut armed = self.armed.lock().unwrap_or_else(PoisonError::into_inner);
        if armed.as_ref().map(|current| current.instance) == Some(instance) {
            armed.take().map(|current| current.promise)
        } else {
            None
        }
    }

    /// Fails whatever promise is armed with [`AuthError::Aborted`]; `false` if there was none.
    pub(crate) fn abort(&self, reason: &str) -> bool {
        let armed = self
            .armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        match armed {
            Some(armed) => {
                armed.promise.fail(AuthError::Aborted(reason.to_owned()));
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn set_resolves() {
        let (promise, mut future) = Promise::new();
        assert!(future.is_pending());
        assert!(promise.set(42));
        assert!(!future.is_pending());
        assert_eq!(future.await, Ok(42));
    }

    #[tokio::test]
    async fn fail_resolves() {
        let (promise, future) = Promise::<bool>::new();
        promise.fail(AuthError::Fault(String::from("disk on fire")));
        assert_eq!(
            future.await,
            Err(AuthError::Fault(String::from("disk on fire")))
        );
    }

    #[tokio::test]
    async fn dropped_promise_aborts() {
        let (promise, mut future) = Promise::<bool>::new();
        drop(promise);
        assert!(!future.is_pending());
        assert!(matches!(future.await, Err(AuthError::Aborted(_))));
    }

    #[test]
    fn set_without_handle() {
        let (promise, future) = Promise::new();
        drop(future);
        assert!(!promise.set(()));
    }

    #[tokio::test]
    async fn slot_only_resolves_own_instance() {
        let slot = Slot::new();
        let future = slot.arm(7);
        assert!(slot.is_armed());
        assert!(slot.take(8).is_none());

        let promise = slot.take(7).unwrap();
        assert!(!slot.is_armed());
        assert!(slot.take(7).is_none());
        promise.set(true);
        assert_eq!(future.await, Ok(true));
    }

    #[tokio::test]
    async fn abort_wins_over_late_take() {
        let slot = Slot::<Option<String>>::new();
        let future = slot.arm(1);
        assert!(slot.abort("owner gone"));
        assert!(slot.take(1).is_none());
        assert!(!slot.abort("owner gone"));
        assert_eq!(
            future.await,
            Err(AuthError::Aborted(String::from("owner gone")))
        );
    }

    #[tokio::test]
    async fn rearming_aborts_previous() {
        let slot = Slot::<bool>::new();
        let first = slot.arm(1);
        let second = slot.arm(2);
        assert!(matches!(first.await, Err(AuthError::Aborted(_))));
        slot.take(2).unwrap().set(false);
        assert_eq!(second.await, Ok(false));
    }

    #[test]
    fn instances_are_unique() {
        assert_ne!(next_instance(), next_instance());
    }
}
