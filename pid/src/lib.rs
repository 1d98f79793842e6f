// Copyright (c) 2024 procauth contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#![deny(missing_docs)]

//! Represents the address of an actor mailbox, a [`Pid`], in the form `id@host:port`:
//! - the id names one actor within a node, for example `authenticator(3)`
//! - the host and port name the node the actor lives on, for example `127.0.0.1:5050`
//!
//! Creating a [`Pid`] fails when the id or the host is empty, when the id itself contains a `@`,
//! or when the port is missing or not a 16-bit number.

use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};

mod error;
pub use crate::error::Error;

/// The address of one actor's mailbox.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pid {
    id: String,
    host: String,
    port: u16,
}

impl Pid {
    /// Constructs a Pid from a string of the form `id`@`host`:`port`.
    ///
    /// # Examples
    ///
    /// ```
    /// use pid::Pid;
    /// # use pid::Error;
    ///
    /// # fn main() -> Result<(), Error> {
    /// let pid = Pid::new("authenticator(1)@127.0.0.1:5050")?;
    ///
    /// assert_eq!(pid.id(), "authenticator(1)");
    /// assert_eq!(pid.host(), "127.0.0.1");
    /// assert_eq!(pid.port(), 5050);
    /// # Ok(())
    /// # }
    /// ```
    pub fn new(s: &str) -> Result<Pid, Error> {
        let (id, address) = s.split_once('@').ok_or(Error::IdMissing)?;
        let (host, port) = address.rsplit_once(':').ok_or(Error::PortMissing)?;
        let port = port.parse()?;
        Pid::from_parts(id, host, port)
    }

    /// Build a [`Pid`] from its parts, checking the same rules as [`Pid::new`].
    pub fn from_parts<I, H>(id: I, host: H, port: u16) -> Result<Pid, Error>
    where
        I: Into<String>,
        H: Into<String>,
    {
        let id = id.into();
        let host = host.into();
        if id.is_empty() {
            return Err(Error::IdEmpty);
        }
        if id.contains('@') {
            return Err(Error::IdContainsAt);
        }
        if host.is_empty() {
            return Err(Error::HostEmpty);
        }
        Ok(Pid { id, host, port })
    }

    /// The id of the actor within its node.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The host of the node.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The port of the node.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Another actor living on the same node.
    pub fn with_id<I: Into<String>>(&self, id: I) -> Result<Pid, Error> {
        Pid::from_parts(id, self.host.clone(), self.port)
    }
}

impl FromStr for Pid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Pid, Error> {
        Pid::new(s)
    }
}

impl fmt::Display for Pid {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(fmt, "{}@{}:{}", self.id, self.host, self.port)
    }
}

impl fmt::Debug for Pid {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        write!(fmt, "Pid({})", self)
    }
}

#[cfg(feature = "serde")]
impl Serialize for Pid {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for Pid {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Pid::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn can_parse_pids() {
        let pid = Pid::from_str("master@10.0.0.1:5050").unwrap();
        assert_eq!(pid.id(), "master");
        assert_eq!(pid.host(), "10.0.0.1");
        assert_eq!(pid.port(), 5050);
        assert_eq!(pid, Pid::from_parts("master", "10.0.0.1", 5050).unwrap());
    }

    #[test]
    fn display_round_trips() {
        let pid = Pid::from_parts("crammd5-authenticatee(7)", "localhost", 0).unwrap();
        assert_eq!(pid.to_string(), "crammd5-authenticatee(7)@localhost:0");
        assert_eq!(Pid::new(&pid.to_string()), Ok(pid));
    }

    #[test]
    fn port_is_taken_from_the_last_colon() {
        let pid = Pid::new("a@::1:5050").unwrap();
        assert_eq!(pid.host(), "::1");
        assert_eq!(pid.port(), 5050);
    }

    #[test]
    fn invalid_pids() {
        assert_eq!(Pid::new("master"), Err(Error::IdMissing));
        assert_eq!(Pid::new("@host:1"), Err(Error::IdEmpty));
        assert_eq!(Pid::new("a@:1"), Err(Error::HostEmpty));
        assert_eq!(Pid::new("a@host"), Err(Error::PortMissing));
        assert!(matches!(
            Pid::new("a@host:65536"),
            Err(Error::PortInvalid(_))
        ));
        assert_eq!(
            Pid::from_parts("a@b", "host", 1),
            Err(Error::IdContainsAt)
        );
    }

    #[test]
    fn with_id_keeps_the_node() {
        let master = Pid::new("master@10.0.0.1:5050").unwrap();
        let other = master.with_id("slave(1)").unwrap();
        assert_eq!(other.to_string(), "slave(1)@10.0.0.1:5050");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn serde_as_string() {
        use serde_test::{assert_tokens, Token};

        let pid = Pid::new("master@10.0.0.1:5050").unwrap();
        assert_tokens(&pid, &[Token::Str("master@10.0.0.1:5050")]);
    }
}
