//! X.509 certificate extraction.
//!
//! The extractor never touches raw bytes: it consumes the tree produced by
//! [`certshelf_utils::asn1::Decoder`] and walks the fixed `Certificate`
//! shape, failing at the first step whose tag, count or order deviates.

mod certificate;
mod name;
mod text;

pub use certificate::{decode_certificate, decode_certificate_with, extract, CertificateSummary};
pub use name::{Name, RdnAttribute};
