// Copyright (c) 2024 procauth contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::error::Error as StdError;
use std::fmt;
use std::num::ParseIntError;

/// An error that signifies that a `Pid` cannot be parsed from a string or built from its parts.
#[derive(Debug, PartialEq, Eq)]
pub enum Error {
    /// Happens when there is no `@` separating the id from the host.
    IdMissing,

    /// Happens when the id is empty, that is the string starts with a @.
    IdEmpty,

    /// Happens when the id contains a @ of its own.
    IdContainsAt,

    /// Happens when the host is empty, that is the string contains the @: sequence.
    HostEmpty,

    /// Happens when there is no `:` separating the host from the port.
    PortMissing,

    /// Happens when the port isn't a 16-bit unsigned integer.
    PortInvalid(ParseIntError),
}

impl From<ParseIntError> for Error {
    fn from(e: ParseIntError) -> Error {
        Error::PortInvalid(e)
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::PortInvalid(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::IdMissing => write!(fmt, "no id found in this pid"),
            Error::IdEmpty => write!(fmt, "id empty despite the presence of a @"),
            Error::IdContainsAt => write!(fmt, "id contains a @"),
            Error::HostEmpty => write!(fmt, "host empty"),
            Error::PortMissing => write!(fmt, "no port found in this pid"),
            Error::PortInvalid(e) => write!(fmt, "invalid port: {}", e),
        }
    }
}
