// Copyright (c) 2024 procauth contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use futures::stream::StreamExt;
use sasl::client::mechanisms::CramMd5;
use sasl::client::Mechanism;
use sasl::common::Credential;
use tokio::task::JoinHandle;
use tokio_actor::{Envelope, Pid};

use crate::error::{Error, UsageError};
use crate::future::{next_instance, AuthFuture, Slot};
use crate::message::Message;
use crate::{Mailbox, Router};

/// The client side: proves knowledge of a secret to an authenticator.
///
/// Each call to [`CramMd5Authenticatee::authenticate`] runs one exchange in its own task with
/// its own mailbox. A new attempt may be started once the previous one resolved. Dropping the
/// authenticatee aborts a running attempt.
pub struct CramMd5Authenticatee {
    router: Router,
    slot: Slot<bool>,
    task: Option<JoinHandle<()>>,
}

impl CramMd5Authenticatee {
    pub fn new(router: Router) -> CramMd5Authenticatee {
        CramMd5Authenticatee {
            router,
            slot: Slot::new(),
            task: None,
        }
    }

    /// Announces `client` to `server` and answers the challenge that follows with
    /// `credential`.
    ///
    /// The handle resolves to `true` once the server accepted the response, to `false` when
    /// it refused it or the exchange broke down.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn authenticate(
        &mut self,
        server: &Pid,
        client: &Pid,
        credential: Credential,
    ) -> Result<AuthFuture<bool>, Error> {
        if self.slot.is_armed() {
            return Err(UsageError::AuthenticationInProgress.into());
        }
        let mechanism = CramMd5::from_credentials(credential)?;
        let mailbox = self.router.spawn("crammd5-authenticatee")?;
        if let Some(task) = self.task.take() {
            task.abort();
        }

        let instance = next_instance();
        let future = self.slot.arm(instance);
        debug!(
            "Authenticating '{}' with {} from {}",
            mechanism.principal(),
            server,
            mailbox.pid()
        );
        mailbox.send(
            server,
            Message::Announce {
                pid: client.clone(),
            },
        );

        let attempt = Attempt {
            mailbox,
            mechanism,
            slot: self.slot.clone(),
            instance,
        };
        self.task = Some(tokio::spawn(attempt.run()));
        Ok(future)
    }
}

impl Drop for CramMd5Authenticatee {
    fn drop(&mut self) {
        if self.slot.abort("authenticatee destructed") {
            debug!("Aborted running authentication");
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

enum State {
    AwaitingChallenge,
    AwaitingOutcome { server: Pid },
}

struct Attempt {
    mailbox: Mailbox,
    mechanism: CramMd5,
    slot: Slot<bool>,
    instance: u64,
}

impl Attempt {
    async fn run(mut self) {
        let mut state = State::AwaitingChallenge;
        while let Some(Envelope { from, body, .. }) = self.mailbox.next().await {
            state = match (state, body) {
                (State::AwaitingChallenge, Message::Step { data }) => {
                    match self.mechanism.response(&data) {
                        Ok(response) => {
                            trace!("Answering challenge from {}", from);
                            self.mailbox.send(&from, Message::Step { data: response });
                            State::AwaitingOutcome { server: from }
                        }
                        Err(e) => {
                            warn!("Cannot answer challenge from {}: {}", from, e);
                            return self.resolve(false);
                        }
                    }
                }
                (State::AwaitingChallenge, body) => {
                    // The challenger is unknown until its first step.
                    debug!("Ignoring {} from {} before the challenge", body.kind(), from);
                    State::AwaitingChallenge
                }
                (State::AwaitingOutcome { server }, body) if from != server => {
                    debug!("Ignoring {} from {}, expected {}", body.kind(), from, server);
                    State::AwaitingOutcome { server }
                }
                (State::AwaitingOutcome { .. }, Message::Completed) => {
                    if let Err(e) = self.mechanism.success(&[]) {
                        warn!("Cannot complete authentication: {}", e);
                        return self.resolve(false);
                    }
                    info!("Authenticated '{}'", self.mechanism.principal());
                    return self.resolve(true);
                }
                (State::AwaitingOutcome { .. }, Message::Failed) => {
                    info!("Authentication of '{}' refused", self.mechanism.principal());
                    return self.resolve(false);
                }
                (State::AwaitingOutcome { .. }, Message::Error { reason }) => {
                    warn!("Authentication error from {}: {}", from, reason);
                    return self.resolve(false);
                }
                (State::AwaitingOutcome { .. }, body) => {
                    warn!("Unexpected {} message from {}", body.kind(), from);
                    return self.resolve(false);
                }
            };
        }
        if let Some(promise) = self.slot.take(self.instance) {
            promise.fail(crate::AuthError::Aborted(String::from("mailbox closed")));
        }
    }

    fn resolve(&self, authenticated: bool) {
        match self.slot.take(self.instance) {
            Some(promise) => {
                promise.set(authenticated);
            }
            None => debug!("Attempt {} was torn down, dropping its outcome", self.instance),
        }
    }
}
