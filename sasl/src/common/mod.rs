//! Types shared by the client and server halves.

use std::fmt;

#[cfg(feature = "cram-md5")]
#[cfg_attr(docsrs, doc(cfg(feature = "cram-md5")))]
pub mod cram_md5;

/// A principal together with the secret it shares with the verifier.
///
/// Once built a credential cannot be changed in place, the builder methods consume it.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential {
    principal: String,
    secret: Vec<u8>,
}

impl Credential {
    /// Creates a credential for `principal` holding `secret`.
    pub fn new<N: Into<String>, S: Into<Vec<u8>>>(principal: N, secret: S) -> Credential {
        Credential {
            principal: principal.into(),
            secret: secret.into(),
        }
    }

    /// Creates a new Credential with the specified principal.
    pub fn with_principal<N: Into<String>>(mut self, principal: N) -> Credential {
        self.principal = principal.into();
        self
    }

    /// Creates a new Credential with the specified secret.
    pub fn with_secret<S: Into<Vec<u8>>>(mut self, secret: S) -> Credential {
        self.secret = secret.into();
        self
    }

    /// The identity being claimed.
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// The shared secret.
    pub fn secret(&self) -> &[u8] {
        &self.secret
    }
}

impl fmt::Debug for Credential {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.debug_struct("Credential")
            .field("principal", &self.principal)
            .field("secret", &"<redacted>")
            .finish()
    }
}
