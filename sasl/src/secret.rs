//! Secrets as stored on the verifying side.

use std::fmt;

use crate::common::Credential;

/// Marker for the kinds of secrets a [`crate::server::Provider`] can hand out.
pub trait Secret {}

/// A plaintext shared secret.
///
/// CRAM-MD5 keys its HMAC with the secret itself, so the verifier has to keep it around in this
/// form.
#[derive(Clone, PartialEq, Eq)]
pub struct Plain(pub Vec<u8>);

impl Secret for Plain {}

impl Plain {
    /// The raw bytes of the secret.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl<'a> From<&'a Credential> for Plain {
    fn from(credential: &'a Credential) -> Plain {
        Plain(credential.secret().to_vec())
    }
}

impl fmt::Debug for Plain {
    fn fmt(&self, fmt: &mut fmt::Formatter) -> fmt::Result {
        fmt.write_str("Plain(<redacted>)")
    }
}
