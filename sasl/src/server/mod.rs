//! The server half: issuing challenges and checking responses.

use crate::secret::Secret;
use std::error::Error;
use std::fmt;
use std::sync::Arc;

/// A source of secrets, looked up by principal.
pub trait Provider<S: Secret> {
    /// Returns the secret of `principal`, or why there isn't one.
    fn provide(&self, principal: &str) -> Result<S, ProviderError>;
}

impl<S: Secret, P: Provider<S> + ?Sized> Provider<S> for Arc<P> {
    fn provide(&self, principal: &str) -> Result<S, ProviderError> {
        (**self).provide(principal)
    }
}

/// Why a [`Provider`] could not hand out a secret.
#[derive(Debug, PartialEq)]
pub enum ProviderError {
    /// The principal is not known to the provider.
    UnknownPrincipal,
    /// The provider itself failed; this is never the client's fault.
    Unavailable(String),
}

/// Things that can go wrong while a server mechanism runs.
#[derive(Debug, PartialEq)]
pub enum MechanismError {
    /// The client sent data before it was challenged.
    UnexpectedInitialResponse,
    /// No random data could be gathered for the challenge.
    #[cfg(feature = "cram-md5")]
    RandomFailure(getrandom::Error),

    /// The response is not `principal SP digest`.
    CannotDecodeResponse,
    /// The response carries an empty principal.
    NoPrincipal,
    /// The digest is not 32 hexadecimal digits.
    InvalidDigest,
    /// The secret provider refused or failed.
    ProviderError(ProviderError),
    /// The secret could not be used as an HMAC key.
    #[cfg(feature = "cram-md5")]
    InvalidKeyLength(hmac::digest::InvalidLength),
    /// The digest does not match the principal's secret.
    AuthenticationFailed,
    /// The exchange already finished.
    SaslSessionAlreadyOver,
}

impl MechanismError {
    /// Whether the client's credential was refused, as opposed to a malformed exchange or a
    /// fault on our side.
    pub fn is_rejection(&self) -> bool {
        matches!(
            self,
            MechanismError::AuthenticationFailed
                | MechanismError::ProviderError(ProviderError::UnknownPrincipal)
        )
    }

    /// Whether this is a fault of the server itself (randomness, keying, secret storage).
    pub fn is_fault(&self) -> bool {
        match self {
            #[cfg(feature = "cram-md5")]
            MechanismError::RandomFailure(_) | MechanismError::InvalidKeyLength(_) => true,
            MechanismError::ProviderError(ProviderError::Unavailable(_)) => true,
            _ => false,
        }
    }
}

impl From<ProviderError> for MechanismError {
    fn from(err: ProviderError) -> MechanismError {
        MechanismError::ProviderError(err)
    }
}

#[cfg(feature = "cram-md5")]
impl From<hmac::digest::InvalidLength> for MechanismError {
    fn from(err: hmac::digest::InvalidLength) -> MechanismError {
        MechanismError::InvalidKeyLength(err)
    }
}

#[cfg(feature = "cram-md5")]
impl From<getrandom::Error> for MechanismError {
    fn from(err: getrandom::Error) -> MechanismError {
        MechanismError::RandomFailure(err)
    }
}

impl fmt::Display for ProviderError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ProviderError::UnknownPrincipal => write!(fmt, "unknown principal"),
            ProviderError::Unavailable(reason) => write!(fmt, "provider unavailable: {}", reason),
        }
    }
}

impl fmt::Display for MechanismError {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MechanismError::UnexpectedInitialResponse => {
                write!(fmt, "unexpected initial response")
            }
            #[cfg(feature = "cram-md5")]
            MechanismError::RandomFailure(err) => {
                write!(fmt, "failure to get random data: {}", err)
            }

            MechanismError::CannotDecodeResponse => write!(fmt, "can’t decode response"),
            MechanismError::NoPrincipal => write!(fmt, "no principal"),
            MechanismError::InvalidDigest => write!(fmt, "invalid digest"),
            MechanismError::ProviderError(err) => write!(fmt, "provider error: {}", err),
            #[cfg(feature = "cram-md5")]
            MechanismError::InvalidKeyLength(err) => write!(fmt, "invalid key length: {}", err),
            MechanismError::AuthenticationFailed => write!(fmt, "authentication failed"),
            MechanismError::SaslSessionAlreadyOver => write!(fmt, "SASL session already over"),
        }
    }
}

impl Error for ProviderError {}

impl Error for MechanismError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            MechanismError::ProviderError(err) => Some(err),
            _ => None,
        }
    }
}

/// A trait which defines server-side SASL mechanisms.
pub trait Mechanism {
    /// The name of the mechanism.
    fn name(&self) -> &str;

    /// Feeds the next client payload to the mechanism.
    ///
    /// For mechanisms where the server speaks first, the first call takes an empty payload.
    fn respond(&mut self, payload: &[u8]) -> Result<Response, MechanismError>;
}

/// What to do after a successful [`Mechanism::respond`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// The principal is authenticated; the data, if any, goes along with the success.
    Success(String, Vec<u8>),
    /// Send the data to the client and wait for its answer.
    Proceed(Vec<u8>),
}

pub mod mechanisms;
