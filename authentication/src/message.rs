// Copyright (c) 2024 procauth contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use tokio_actor::Pid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The messages of a CRAM-MD5 exchange.
///
/// The client announces itself, the server sends a challenge `Step`, the client answers with
/// a response `Step` and the server closes with exactly one of `Completed`, `Failed` or
/// `Error`.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// Client to rendezvous: `pid` wants to authenticate.
    Announce {
        /// The client that wants to authenticate.
        pid: Pid,
    },
    /// A challenge or a response.
    Step {
        /// The SASL payload.
        data: Vec<u8>,
    },
    /// The response was accepted.
    Completed,
    /// The response was refused.
    Failed,
    /// The exchange broke down.
    Error {
        /// Human readable cause.
        reason: String,
    },
}

impl Message {
    /// Short name for logging.
    pub fn kind(&self) -> &'static str {
        match self {
            Message::Announce { .. } => "announce",
            Message::Step { .. } => "step",
            Message::Completed => "completed",
            Message::Failed => "failed",
            Message::Error { .. } => "error",
        }
    }
}
