// Copyright (c) 2024 procauth contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use sasl::common::Credential;
use sasl::secret::Plain;
use sasl::server::{Provider, ProviderError};
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

/// An immutable table of principals and their secrets.
#[derive(Debug, Default)]
pub struct Snapshot {
    secrets: HashMap<String, Plain>,
}

impl Snapshot {
    pub fn lookup(&self, principal: &str) -> Option<&Plain> {
        self.secrets.get(principal)
    }

    pub fn len(&self) -> usize {
        self.secrets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.secrets.is_empty()
    }
}

impl Provider<Plain> for Snapshot {
    fn provide(&self, principal: &str) -> Result<Plain, ProviderError> {
        self.lookup(principal)
            .cloned()
            .ok_or(ProviderError::UnknownPrincipal)
    }
}

/// The secrets authenticators check responses against.
///
/// Clones share the same table. [`Secrets::load`] replaces the whole table at once; an
/// attempt keeps using the [`Snapshot`] it started with.
#[derive(Debug, Clone, Default)]
pub struct Secrets {
    current: Arc<RwLock<Arc<Snapshot>>>,
}

impl Secrets {
    pub fn new() -> Secrets {
        Secrets::default()
    }

    /// Replaces the table with `credentials`. For duplicate principals the last one wins.
    pub fn load<I>(&self, credentials: I)
    where
        I: IntoIterator<Item = Credential>,
    {
        let mut secrets = HashMap::new();
        for credential in credentials {
            let secret = Plain::from(&credential);
            if secrets
                .insert(credential.principal().to_owned(), secret)
                .is_some()
            {
                warn!(
                    "Duplicate secret for '{}', keeping the last one",
                    credential.principal()
                );
            }
        }
        debug!("Loaded secrets for {} principals", secrets.len());
        *self.current.write().unwrap_or_else(PoisonError::into_inner) =
            Arc::new(Snapshot { secrets });
    }

    pub fn lookup(&self, principal: &str) -> Option<Plain> {
        self.snapshot().lookup(principal).cloned()
    }

    /// The current table.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty() {
        let secrets = Secrets::new();
        assert!(secrets.snapshot().is_empty());
        assert_eq!(secrets.lookup("benh"), None);
    }

    #[test]
    fn load_and_lookup() {
        let secrets = Secrets::new();
        secrets.load(vec![
            Credential::new("benh", "secret"),
            Credential::new("vinod", "hunter2"),
        ]);
        assert_eq!(secrets.lookup("benh"), Some(Plain(b"secret".to_vec())));
        assert_eq!(secrets.lookup("vinod"), Some(Plain(b"hunter2".to_vec())));
        assert_eq!(secrets.lookup("tim"), None);
    }

    #[test]
    fn last_duplicate_wins() {
        let secrets = Secrets::new();
        secrets.load(vec![
            Credential::new("benh", "first"),
            Credential::new("benh", "second"),
        ]);
        assert_eq!(secrets.snapshot().len(), 1);
        assert_eq!(secrets.lookup("benh"), Some(Plain(b"second".to_vec())));
    }

    #[test]
    fn snapshot_survives_reload() {
        let secrets = Secrets::new();
        secrets.load(vec![Credential::new("benh", "secret")]);
        let before = secrets.snapshot();

        secrets.clone().load(vec![Credential::new("vinod", "hunter2")]);

        assert!(before.lookup("benh").is_some());
        assert!(before.lookup("vinod").is_none());
        assert_eq!(secrets.lookup("benh"), None);
        assert!(secrets.lookup("vinod").is_some());
    }

    #[test]
    fn provider() {
        let secrets = Secrets::new();
        secrets.load(vec![Credential::new("benh", "secret")]);
        let snapshot = secrets.snapshot();
        assert_eq!(snapshot.provide("benh"), Ok(Plain(b"secret".to_vec())));
        assert_eq!(snapshot.provide("tim"), Err(ProviderError::UnknownPrincipal));
    }
}
