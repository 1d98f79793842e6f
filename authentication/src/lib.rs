// Copyright (c) 2024 procauth contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! CRAM-MD5 authentication between actors.
//!
//! A [`CramMd5Authenticatee`] (the client) announces itself to a rendezvous actor, which hands
//! the client's [`Pid`] to a [`CramMd5Authenticator`] (the server). The server challenges, the
//! client responds, and the server closes the exchange. Both sides get an [`AuthFuture`] for
//! the outcome.
//!
//! ```
//! use authentication::{
//!     Config, CramMd5Authenticatee, CramMd5Authenticator, Credential, Message, Router, Secrets,
//! };
//! use futures::StreamExt;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let router = Router::new("127.0.0.1", 5050);
//! let mut rendezvous = router.spawn("rendezvous").unwrap();
//!
//! let secrets = Secrets::new();
//! secrets.load(vec![Credential::new("benh", "secret")]);
//!
//! let mut authenticatee = CramMd5Authenticatee::new(router.clone());
//! let client = authenticatee
//!     .authenticate(
//!         rendezvous.pid(),
//!         rendezvous.pid(),
//!         Credential::new("benh", "secret"),
//!     )
//!     .unwrap();
//!
//! let announce = rendezvous.next().await.unwrap();
//! assert!(matches!(announce.body, Message::Announce { .. }));
//!
//! let mut authenticator = CramMd5Authenticator::new(router, secrets, &Config::default());
//! authenticator.initialize(announce.from).unwrap();
//! let server = authenticator.authenticate().unwrap();
//!
//! assert_eq!(client.await, Ok(true));
//! assert_eq!(server.await, Ok(Some(String::from("benh"))));
//! # }
//! ```

#![deny(bare_trait_objects)]

#[macro_use]
extern crate log;

mod authenticatee;
mod authenticator;
pub mod config;
pub mod error;
pub mod future;
pub mod message;
pub mod module;
pub mod secrets;

pub use crate::authenticatee::CramMd5Authenticatee;
pub use crate::authenticator::{CramMd5Authenticator, SharedProvider};
pub use crate::config::Config;
pub use crate::error::{AuthError, Error, UsageError};
pub use crate::future::{AuthFuture, Promise};
pub use crate::message::Message;
pub use crate::module::{Authenticatee, Authenticator, Context, Registry};
pub use crate::secrets::{Secrets, Snapshot};

// Re-exports
pub use sasl::common::Credential;
pub use tokio_actor::{Disposition, Envelope, Pid, PidError};

/// Routes [`Message`]s between the actors of one node.
pub type Router = tokio_actor::Router<Message>;
/// The inbound queue of one actor.
pub type Mailbox = tokio_actor::Mailbox<Message>;
