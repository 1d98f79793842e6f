//! Provides the client side of the supported SASL mechanisms.

#[cfg(feature = "cram-md5")]
mod cram_md5;

#[cfg(feature = "cram-md5")]
#[cfg_attr(docsrs, doc(cfg(feature = "cram-md5")))]
pub use self::cram_md5::CramMd5;
