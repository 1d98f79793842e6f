use std::mem;

use crate::common::cram_md5::{self, generate_challenge, DIGEST_HEX_LEN};
use crate::secret;
use crate::server::{Mechanism, MechanismError, Provider, Response};

enum CramMd5State {
    Init,
    SentChallenge { challenge: Vec<u8> },
    Done,
}

/// The verifying side of CRAM-MD5.
///
/// The first [`Mechanism::respond`] call takes an empty payload and yields the challenge, the
/// second takes the client's response and yields the authenticated principal. Any failure ends
/// the exchange.
pub struct CramMd5<P>
where
    P: Provider<secret::Plain>,
{
    realm: String,
    state: CramMd5State,
    provider: P,
}

impl<P> CramMd5<P>
where
    P: Provider<secret::Plain>,
{
    /// Creates a mechanism that looks secrets up in `provider` and stamps `realm` into its
    /// challenge.
    pub fn new<R: Into<String>>(provider: P, realm: R) -> CramMd5<P> {
        CramMd5 {
            realm: realm.into(),
            state: CramMd5State::Init,
            provider,
        }
    }

    /// Issues the challenge; the same as calling [`Mechanism::respond`] with an empty payload
    /// on a fresh mechanism.
    pub fn challenge(&mut self) -> Result<Vec<u8>, MechanismError> {
        match mem::replace(&mut self.state, CramMd5State::Done) {
            CramMd5State::Init => {
                let challenge = generate_challenge(&self.realm)?;
                self.state = CramMd5State::SentChallenge {
                    challenge: challenge.clone(),
                };
                Ok(challenge)
            }
            _ => Err(MechanismError::SaslSessionAlreadyOver),
        }
    }

    // Used for testing.
    #[doc(hidden)]
    #[cfg(test)]
    pub fn new_with_challenge(provider: P, challenge: &[u8]) -> CramMd5<P> {
        CramMd5 {
            realm: String::new(),
            state: CramMd5State::SentChallenge {
                challenge: challenge.to_vec(),
            },
            provider,
        }
    }
}

fn parse_response(payload: &[u8]) -> Result<(String, Vec<u8>), MechanismError> {
    let payload = std::str::from_utf8(payload).map_err(|_| MechanismError::CannotDecodeResponse)?;
    // Principals may contain spaces, the digest never does.
    let (principal, digest) = payload
        .rsplit_once(' ')
        .ok_or(MechanismError::CannotDecodeResponse)?;
    if principal.is_empty() {
        return Err(MechanismError::NoPrincipal);
    }
    if digest.len() != DIGEST_HEX_LEN {
        return Err(MechanismError::InvalidDigest);
    }
    let digest = hex::decode(digest).map_err(|_| MechanismError::InvalidDigest)?;
    Ok((principal.to_owned(), digest))
}

impl<P> Mechanism for CramMd5<P>
where
    P: Provider<secret::Plain>,
{
    fn name(&self) -> &str {
        "CRAM-MD5"
    }

    fn respond(&mut self, payload: &[u8]) -> Result<Response, MechanismError> {
        match mem::replace(&mut self.state, CramMd5State::Done) {
            CramMd5State::Init => {
                if !payload.is_empty() {
                    return Err(MechanismError::UnexpectedInitialResponse);
                }
                self.state = CramMd5State::Init;
                self.challenge().map(Response::Proceed)
            }
            CramMd5State::SentChallenge { challenge } => {
                let (principal, digest) = parse_response(payload)?;
                let secret = self.provider.provide(&principal)?;
                if cram_md5::verify(secret.as_bytes(), &challenge, &digest)? {
                    Ok(Response::Success(principal, Vec::new()))
                } else {
                    Err(MechanismError::AuthenticationFailed)
                }
            }
            CramMd5State::Done => Err(MechanismError::SaslSessionAlreadyOver),
        }
    }
}
