use pid::Pid;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A message in flight, with the addresses of both ends.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope<M> {
    /// The mailbox the message was sent from; replies go here.
    pub from: Pid,
    /// The mailbox the message is addressed to.
    pub to: Pid,
    /// The message itself.
    pub body: M,
}
