#![forbid(unsafe_code)]
#![doc = "Utility modules for certshelf: ASN.1 DER decoding and OIDs."]

#[cfg(feature = "asn1")]
pub mod asn1;

#[cfg(feature = "oid")]
pub mod oid;
