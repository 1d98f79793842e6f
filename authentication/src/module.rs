// Copyright (c) 2024 procauth contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pluggable authentication modules, selected by name through [`Config`].

use sasl::common::Credential;
use std::collections::HashMap;
use std::sync::Arc;
use tokio_actor::Pid;

use crate::authenticatee::CramMd5Authenticatee;
use crate::authenticator::CramMd5Authenticator;
use crate::config::{Config, CRAM_MD5};
use crate::error::Error;
use crate::future::AuthFuture;
use crate::secrets::Secrets;
use crate::Router;

/// The server side of an authentication mechanism.
pub trait Authenticator: Send {
    /// Binds the authenticator to the client it will talk to.
    fn initialize(&mut self, client: Pid) -> Result<(), Error>;

    /// Starts the exchange; resolves to the authenticated principal, if any.
    fn authenticate(&mut self) -> Result<AuthFuture<Option<String>>, Error>;
}

/// The client side of an authentication mechanism.
pub trait Authenticatee: Send {
    /// Announces `client` to `server` and authenticates with `credential`.
    fn authenticate(
        &mut self,
        server: &Pid,
        client: &Pid,
        credential: Credential,
    ) -> Result<AuthFuture<bool>, Error>;
}

impl Authenticator for CramMd5Authenticator {
    fn initialize(&mut self, client: Pid) -> Result<(), Error> {
        CramMd5Authenticator::initialize(self, client)
    }

    fn authenticate(&mut self) -> Result<AuthFuture<Option<String>>, Error> {
        CramMd5Authenticator::authenticate(self)
    }
}

impl Authenticatee for CramMd5Authenticatee {
    fn authenticate(
        &mut self,
        server: &Pid,
        client: &Pid,
        credential: Credential,
    ) -> Result<AuthFuture<bool>, Error> {
        CramMd5Authenticatee::authenticate(self, server, client, credential)
    }
}

/// What a module factory gets to build its instance from.
#[derive(Clone)]
pub struct Context {
    pub router: Router,
    pub secrets: Secrets,
    pub config: Config,
}

type AuthenticatorFactory = Arc<dyn Fn(&Context) -> Box<dyn Authenticator> + Send + Sync>;
type AuthenticateeFactory = Arc<dyn Fn(&Context) -> Box<dyn Authenticatee> + Send + Sync>;

/// Named factories for authenticators and authenticatees.
///
/// The default registry knows the built-in CRAM-MD5 modules under [`CRAM_MD5`].
#[derive(Clone)]
pub struct Registry {
    authenticators: HashMap<String, AuthenticatorFactory>,
    authenticatees: HashMap<String, AuthenticateeFactory>,
}

impl Default for Registry {
    fn default() -> Self {
        let mut registry = Registry::empty();
        registry.register_authenticator(CRAM_MD5, |context: &Context| {
            Box::new(CramMd5Authenticator::new(
                context.router.clone(),
                context.secrets.clone(),
                &context.config,
            )) as Box<dyn Authenticator>
        });
        registry.register_authenticatee(CRAM_MD5, |context: &Context| {
            Box::new(CramMd5Authenticatee::new(context.router.clone())) as Box<dyn Authenticatee>
        });
        registry
    }
}

impl Registry {
    /// A registry without any modules.
    pub fn empty() -> Registry {
        Registry {
            authenticators: HashMap::new(),
            authenticatees: HashMap::new(),
        }
    }

    /// Registers an authenticator factory, replacing any previous one of the same name.
    pub fn register_authenticator<N, F>(&mut self, name: N, factory: F)
    where
        N: Into<String>,
        F: Fn(&Context) -> Box<dyn Authenticator> + Send + Sync + 'static,
    {
        self.authenticators.insert(name.into(), Arc::new(factory));
    }

    /// Registers an authenticatee factory, replacing any previous one of the same name.
    pub fn register_authenticatee<N, F>(&mut self, name: N, factory: F)
    where
        N: Into<String>,
        F: Fn(&Context) -> Box<dyn Authenticatee> + Send + Sync + 'static,
    {
        self.authenticatees.insert(name.into(), Arc::new(factory));
    }

    /// Creates the authenticator named by `context.config.authenticator`.
    pub fn create_authenticator(
        &self,
        context: &Context,
    ) -> Result<Box<dyn Authenticator>, Error> {
        let name = &context.config.authenticator;
        match self.authenticators.get(name) {
            Some(factory) => {
                debug!("Creating authenticator '{}'", name);
                Ok(factory(context))
            }
            None => Err(Error::UnknownModule(name.clone())),
        }
    }

    /// Creates the authenticatee named by `context.config.authenticatee`.
    pub fn create_authenticatee(
        &self,
        context: &Context,
    ) -> Result<Box<dyn Authenticatee>, Error> {
        let name = &context.config.authenticatee;
        match self.authenticatees.get(name) {
            Some(factory) => {
                debug!("Creating authenticatee '{}'", name);
                Ok(factory(context))
            }
            None => Err(Error::UnknownModule(name.clone())),
        }
    }
}
