// Copyright (c) 2024 procauth contributors.
//
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// Name of the built-in CRAM-MD5 modules.
pub const CRAM_MD5: &str = "crammd5";

/// Settings for creating authenticators and authenticatees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Stamped into every challenge.
    pub realm: String,
    /// Registry name of the authenticator to create.
    pub authenticator: String,
    /// Registry name of the authenticatee to create.
    pub authenticatee: String,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            realm: String::from("localhost"),
            authenticator: String::from(CRAM_MD5),
            authenticatee: String::from(CRAM_MD5),
        }
    }
}

impl Config {
    pub fn with_realm<R: Into<String>>(mut self, realm: R) -> Config {
        self.realm = realm.into();
        self
    }

    pub fn with_authenticator<N: Into<String>>(mut self, name: N) -> Config {
        self.authenticator = name.into();
        self
    }

    pub fn with_authenticatee<N: Into<String>>(mut self, name: N) -> Config {
        self.authenticatee = name.into();
        self
    }
}
