#![forbid(unsafe_code)]
#![doc = "Common error types for certshelf: DER decoding and certificate storage."]

pub mod error;

pub use error::*;
