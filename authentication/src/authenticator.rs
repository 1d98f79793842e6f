// Copyright (c) 2024 procauth contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use futures::stream::StreamExt;
use sasl::server::mechanisms::CramMd5;
use sasl::secret::Plain;
use sasl::server::{Mechanism, Provider, Response};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_actor::{Envelope, Pid};

use crate::config::Config;
use crate::error::{AuthError, Error, UsageError};
use crate::future::{next_instance, AuthFuture, Slot};
use crate::message::Message;
use crate::secrets::Secrets;
use crate::{Mailbox, Router};

/// Shared handle to whatever looks up secrets for an attempt.
pub type SharedProvider = Arc<dyn Provider<Plain> + Send + Sync>;

enum Source {
    Secrets(Secrets),
    Provider(SharedProvider),
}

impl Source {
    fn provider(&self) -> SharedProvider {
        match self {
            // Secrets loaded from now on don't affect this attempt.
            Source::Secrets(secrets) => secrets.snapshot() as SharedProvider,
            Source::Provider(provider) => provider.clone(),
        }
    }
}

enum State {
    Idle,
    Initialized { client: Pid },
    Challenged,
}

/// The server side: challenges one client and checks its answer.
///
/// An authenticator is good for a single attempt: bind it to a client with
/// [`initialize`](CramMd5Authenticator::initialize), then start the exchange with
/// [`authenticate`](CramMd5Authenticator::authenticate). Dropping it while the exchange runs
/// resolves the handle to [`AuthError::Aborted`] and nothing more is sent to the client.
pub struct CramMd5Authenticator {
    router: Router,
    source: Source,
    realm: String,
    state: State,
    slot: Slot<Option<String>>,
    task: Option<JoinHandle<()>>,
}

impl CramMd5Authenticator {
    /// Creates an authenticator checking responses against `secrets`, as they are when
    /// [`authenticate`](CramMd5Authenticator::authenticate) is called.
    pub fn new(router: Router, secrets: Secrets, config: &Config) -> CramMd5Authenticator {
        CramMd5Authenticator::from_source(router, Source::Secrets(secrets), config)
    }

    /// Creates an authenticator looking secrets up in `provider`.
    ///
    /// A provider failing with [`sasl::server::ProviderError::Unavailable`] resolves the
    /// attempt to [`AuthError::Fault`].
    pub fn with_provider(
        router: Router,
        provider: SharedProvider,
        config: &Config,
    ) -> CramMd5Authenticator {
        CramMd5Authenticator::from_source(router, Source::Provider(provider), config)
    }

    fn from_source(router: Router, source: Source, config: &Config) -> CramMd5Authenticator {
        CramMd5Authenticator {
            router,
            source,
            realm: config.realm.clone(),
            state: State::Idle,
            slot: Slot::new(),
            task: None,
        }
    }

    /// Binds the authenticator to `client`, the only peer it will talk to.
    pub fn initialize(&mut self, client: Pid) -> Result<(), Error> {
        match self.state {
            State::Idle => {
                self.state = State::Initialized { client };
                Ok(())
            }
            _ => Err(UsageError::AlreadyInitialized.into()),
        }
    }

    /// Challenges the client.
    ///
    /// The handle resolves to the authenticated principal, or to `None` if the client was
    /// refused or misbehaved. A failure to look up or verify the secret resolves it to
    /// [`AuthError::Fault`].
    ///
    /// # Panics
    ///
    /// Panics if called outside of a tokio runtime.
    pub fn authenticate(&mut self) -> Result<AuthFuture<Option<String>>, Error> {
        let client = match &self.state {
            State::Idle => return Err(UsageError::NotInitialized.into()),
            State::Initialized { client } => client.clone(),
            State::Challenged if self.slot.is_armed() => {
                return Err(UsageError::AuthenticationInProgress.into())
            }
            State::Challenged => return Err(UsageError::AlreadyAuthenticated.into()),
        };

        let mut mechanism = CramMd5::new(self.source.provider(), self.realm.as_str());
        let challenge = mechanism.challenge()?;
        let mailbox = self.router.spawn("crammd5-authenticator")?;

        let instance = next_instance();
        let future = self.slot.arm(instance);
        debug!("Challenging {} from {}", client, mailbox.pid());
        mailbox.send(&client, Message::Step { data: challenge });

        let exchange = Exchange {
            mailbox,
            client,
            mechanism,
            slot: self.slot.clone(),
            instance,
        };
        self.task = Some(tokio::spawn(exchange.run()));
        self.state = State::Challenged;
        Ok(future)
    }
}

impl Drop for CramMd5Authenticator {
    fn drop(&mut self) {
        if self.slot.abort("authenticator destructed") {
            debug!("Aborted running authentication");
        }
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

struct Exchange {
    mailbox: Mailbox,
    client: Pid,
    mechanism: CramMd5<SharedProvider>,
    slot: Slot<Option<String>>,
    instance: u64,
}

impl Exchange {
    async fn run(mut self) {
        while let Some(Envelope { from, body, .. }) = self.mailbox.next().await {
            if from != self.client {
                debug!(
                    "Ignoring {} from {}, expected {}",
                    body.kind(),
                    from,
                    self.client
                );
                continue;
            }
            let data = match body {
                Message::Step { data } => data,
                body => {
                    warn!("Unexpected {} message from {}", body.kind(), from);
                    let reason = format!("unexpected {} message", body.kind());
                    return self.finish(Message::Error { reason }, Ok(None));
                }
            };
            return match self.mechanism.respond(&data) {
                Ok(Response::Success(principal, _)) => {
                    info!("Authenticated '{}' at {}", principal, from);
                    self.finish(Message::Completed, Ok(Some(principal)))
                }
                Ok(Response::Proceed(_)) => {
                    warn!("CRAM-MD5 asked for another round with {}", from);
                    let reason = String::from("unexpected continuation");
                    self.finish(Message::Error { reason }, Ok(None))
                }
                Err(e) if e.is_rejection() => {
                    info!("Refused {}: {}", from, e);
                    self.finish(Message::Failed, Ok(None))
                }
                Err(e) if e.is_fault() => {
                    error!("Cannot verify response from {}: {}", from, e);
                    let reason = e.to_string();
                    self.finish(Message::Error { reason }, Err(AuthError::Fault(e.to_string())))
                }
                Err(e) => {
                    warn!("Bad response from {}: {}", from, e);
                    let reason = e.to_string();
                    self.finish(Message::Error { reason }, Ok(None))
                }
            };
        }
        if let Some(promise) = self.slot.take(self.instance) {
            promise.fail(AuthError::Aborted(String::from("mailbox closed")));
        }
    }

    /// Replies to the client and resolves the handle, unless the attempt was torn down.
    fn finish(&self, reply: Message, outcome: Result<Option<String>, AuthError>) {
        match self.slot.take(self.instance) {
            Some(promise) => {
                self.mailbox.send(&self.client, reply);
                promise.complete(outcome);
            }
            None => debug!(
                "Attempt {} was torn down, not replying to {}",
                self.instance, self.client
            ),
        }
    }
}
