//! The client half: turning challenges into responses.

use crate::common::Credential;
use std::fmt;

/// Things that can go wrong while a client mechanism runs.
#[derive(Debug, PartialEq)]
pub enum MechanismError {
    /// CRAM-MD5 was given a credential with an empty principal.
    CramMd5RequiresPrincipal,

    /// The server sent an empty challenge.
    CannotDecodeChallenge,
    /// The secret could not be used as an HMAC key.
    #[cfg(feature = "cram-md5")]
    InvalidKeyLength(hmac::digest::InvalidLength),
    /// A challenge or outcome arrived in the wrong phase.
    InvalidState,
}

#[cfg(feature = "cram-md5")]
impl From<hmac::digest::InvalidLength> for MechanismError {
    fn from(err: hmac::digest::InvalidLength) -> MechanismError {
        MechanismError::InvalidKeyLength(err)
    }
}

impl fmt::Display for MechanismError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        write!(
            fmt,
            "{}",
            match self {
                MechanismError::CramMd5RequiresPrincipal => "CRAM-MD5 requires a principal",

                MechanismError::CannotDecodeChallenge => "can't decode challenge",
                #[cfg(feature = "cram-md5")]
                MechanismError::InvalidKeyLength(err) =>
                    return write!(fmt, "invalid key length: {}", err),
                MechanismError::InvalidState => "not in the right state to receive this message",
            }
        )
    }
}

impl std::error::Error for MechanismError {}

/// A trait which defines SASL mechanisms.
pub trait Mechanism {
    /// The name of the mechanism.
    fn name(&self) -> &str;

    /// Creates this mechanism from a `Credential`.
    fn from_credentials(credential: Credential) -> Result<Self, MechanismError>
    where
        Self: Sized;

    /// Provides initial payload of the SASL mechanism.
    fn initial(&mut self) -> Vec<u8> {
        Vec::new()
    }

    /// Creates a response to the SASL challenge.
    fn response(&mut self, _challenge: &[u8]) -> Result<Vec<u8>, MechanismError> {
        Ok(Vec::new())
    }

    /// Verifies the server success response, if there is one.
    fn success(&mut self, _data: &[u8]) -> Result<(), MechanismError> {
        Ok(())
    }
}

pub mod mechanisms;
