// Copyright (c) 2024 procauth contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! In-process actor transport with tokio.
//!
//! A [`Router`] hands out [`Mailbox`]es, each addressed by a [`Pid`]. Sending is
//! fire-and-forget: [`Router::send`] never blocks and never fails, messages to addresses that
//! are gone are logged and dropped. Delivery between one sender and one receiver is in order.
//!
//! ```
//! use futures::StreamExt;
//! use tokio_actor::Router;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let router = Router::new("127.0.0.1", 5050);
//! let ping = router.spawn("ping").unwrap();
//! let mut pong = router.spawn("pong").unwrap();
//!
//! ping.send(pong.pid(), "hello");
//!
//! let envelope = pong.next().await.unwrap();
//! assert_eq!(&envelope.from, ping.pid());
//! assert_eq!(envelope.body, "hello");
//! # }
//! ```

#![deny(unsafe_code, missing_docs, bare_trait_objects)]

mod envelope;
pub use crate::envelope::Envelope;
mod intercept;
pub use crate::intercept::{Disposition, Intercepted};
mod mailbox;
pub use crate::mailbox::Mailbox;
mod router;
pub use crate::router::Router;

// Re-exports
pub use pid::{Error as PidError, Pid};
