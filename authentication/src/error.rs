// Copyright (c) 2024 procauth contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::error::Error as StdError;
use std::fmt;
use tokio_actor::PidError;

/// Misuse of an authenticator or authenticatee; never caused by the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UsageError {
    /// `authenticate` was called on an authenticator that has no client yet.
    NotInitialized,
    /// `initialize` was called more than once.
    AlreadyInitialized,
    /// An attempt is still running.
    AuthenticationInProgress,
    /// The authenticator already finished its one attempt.
    AlreadyAuthenticated,
}

impl fmt::Display for UsageError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            UsageError::NotInitialized => write!(fmt, "authenticator is not initialized"),
            UsageError::AlreadyInitialized => write!(fmt, "authenticator is already initialized"),
            UsageError::AuthenticationInProgress => write!(fmt, "authentication is in progress"),
            UsageError::AlreadyAuthenticated => write!(fmt, "authentication already completed"),
        }
    }
}

impl StdError for UsageError {}

/// Why an attempt produced no outcome.
///
/// A refused or malformed exchange is not an error: the handle then resolves to a negative
/// outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The attempt was torn down before it finished.
    Aborted(String),
    /// The local side could not carry out the exchange.
    Fault(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            AuthError::Aborted(reason) => write!(fmt, "authentication aborted: {}", reason),
            AuthError::Fault(reason) => write!(fmt, "authentication fault: {}", reason),
        }
    }
}

impl StdError for AuthError {}

/// Errors returned synchronously when starting an attempt.
#[derive(Debug, PartialEq)]
pub enum Error {
    /// The call is not allowed in the current state.
    Usage(UsageError),
    /// The client mechanism rejected its credential.
    Client(sasl::client::MechanismError),
    /// The server mechanism could not issue a challenge.
    Server(sasl::server::MechanismError),
    /// A mailbox could not be addressed.
    Pid(PidError),
    /// No module is registered under this name.
    UnknownModule(String),
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::Usage(e) => write!(fmt, "usage error: {}", e),
            Error::Client(e) => write!(fmt, "client mechanism error: {}", e),
            Error::Server(e) => write!(fmt, "server mechanism error: {}", e),
            Error::Pid(e) => write!(fmt, "pid error: {}", e),
            Error::UnknownModule(name) => write!(fmt, "no authentication module named {}", name),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Usage(e) => Some(e),
            Error::Client(e) => Some(e),
            Error::Server(e) => Some(e),
            Error::Pid(e) => Some(e),
            Error::UnknownModule(_) => None,
        }
    }
}

impl From<UsageError> for Error {
    fn from(e: UsageError) -> Self {
        Error::Usage(e)
    }
}

impl From<sasl::client::MechanismError> for Error {
    fn from(e: sasl::client::MechanismError) -> Self {
        Error::Client(e)
    }
}

impl From<sasl::server::MechanismError> for Error {
    fn from(e: sasl::server::MechanismError) -> Self {
        Error::Server(e)
    }
}

impl From<PidError> for Error {
    fn from(e: PidError) -> Self {
        Error::Pid(e)
    }
}
