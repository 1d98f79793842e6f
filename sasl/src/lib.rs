//! This crate provides the two halves of the CRAM-MD5 SASL mechanism, as described in
//! [RFC 2195](https://tools.ietf.org/html/rfc2195).
//!
//! The client half turns a server challenge into a response proving knowledge of a shared
//! secret, the server half issues challenges and checks responses against a [`server::Provider`]
//! of secrets. Neither half does any I/O; moving the bytes around is up to the caller.
//!
//! # Examples
//!
//! ```rust
//! use sasl::client::mechanisms::CramMd5;
//! use sasl::client::Mechanism;
//! use sasl::common::Credential;
//!
//! let creds = Credential::default()
//!     .with_principal("tim")
//!     .with_secret("tanstaaftanstaaf");
//!
//! let mut mechanism = CramMd5::from_credentials(creds).unwrap();
//!
//! let response = mechanism
//!     .response(b"<1896.697170952@postoffice.reston.mci.net>")
//!     .unwrap();
//!
//! assert_eq!(response, b"tim b913a602c7eda7a495b4e6e7334d3890");
//! ```
//!
//! # Usage
//!
//! You can use this in your crate by adding this under `dependencies` in your `Cargo.toml`:
//!
//! ```toml,ignore
//! sasl = "*"
//! ```

#![deny(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod client;
pub mod common;
pub mod secret;
pub mod server;
