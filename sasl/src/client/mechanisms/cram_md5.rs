//! Provides the SASL "CRAM-MD5" mechanism.

use crate::client::{Mechanism, MechanismError};
use crate::common::{cram_md5, Credential};

enum CramMd5State {
    Init,
    Responded,
    Done,
}

/// A struct for the SASL CRAM-MD5 mechanism.
pub struct CramMd5 {
    principal: String,
    secret: Vec<u8>,
    state: CramMd5State,
}

impl CramMd5 {
    /// Constructs a new struct for authenticating using the SASL CRAM-MD5 mechanism.
    ///
    /// It is recommended that instead you use a `Credential` struct and turn it into the
    /// requested mechanism using `from_credentials`.
    pub fn new<N: Into<String>, S: Into<Vec<u8>>>(principal: N, secret: S) -> CramMd5 {
        CramMd5 {
            principal: principal.into(),
            secret: secret.into(),
            state: CramMd5State::Init,
        }
    }

    /// The principal this mechanism authenticates as.
    pub fn principal(&self) -> &str {
        &self.principal
    }
}

impl Mechanism for CramMd5 {
    fn name(&self) -> &str {
        "CRAM-MD5"
    }

    fn from_credentials(credential: Credential) -> Result<CramMd5, MechanismError> {
        if credential.principal().is_empty() {
            return Err(MechanismError::CramMd5RequiresPrincipal);
        }
        Ok(CramMd5::new(credential.principal(), credential.secret()))
    }

    fn response(&mut self, challenge: &[u8]) -> Result<Vec<u8>, MechanismError> {
        match self.state {
            CramMd5State::Init => {
                if challenge.is_empty() {
                    self.state = CramMd5State::Done;
                    return Err(MechanismError::CannotDecodeChallenge);
                }
                let ret = cram_md5::respond(&self.principal, &self.secret, challenge)?;
                self.state = CramMd5State::Responded;
                Ok(ret)
            }
            _ => Err(MechanismError::InvalidState),
        }
    }

    fn success(&mut self, _data: &[u8]) -> Result<(), MechanismError> {
        match self.state {
            CramMd5State::Responded => {
                self.state = CramMd5State::Done;
                Ok(())
            }
            _ => Err(MechanismError::InvalidState),
        }
    }
}
