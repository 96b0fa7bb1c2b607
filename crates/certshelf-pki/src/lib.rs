#![forbid(unsafe_code)]
#![doc = "X.509 certificate summaries for certshelf."]

#[cfg(feature = "x509")]
pub mod x509;
