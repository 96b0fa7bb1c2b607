//! Distinguished names (RDNSequence).

use std::fmt;

use certshelf_types::DecodeError;
use certshelf_utils::asn1::{tags, TagClass, TlvNode};
use certshelf_utils::oid::{known, Oid};

use super::certificate::expect_constructed;

/// One `type, value` pair inside a Name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RdnAttribute {
    /// Attribute type.
    pub oid: Oid,
    /// Decoded string content of the attribute value. Constructed values
    /// are kept as `#` followed by the hex of their DER encoding.
    pub value: String,
}

impl RdnAttribute {
    /// Dotted-decimal attribute type, e.g. `"2.5.4.3"`.
    pub fn type_string(&self) -> String {
        self.oid.to_dot_string()
    }
}

/// A distinguished name, flattened across its RDNs in encoding order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Name {
    pub attributes: Vec<RdnAttribute>,
}

impl Name {
    /// Decode a Name element. `field` ("issuer" or "subject") labels errors.
    ///
    /// Every RDN must be a non-empty SET, and every member must be a
    /// SEQUENCE of exactly an OBJECT IDENTIFIER and a value. A commonName
    /// value must be a primitive string; other attributes may carry any value.
    pub fn from_node(node: &TlvNode<'_>, field: &'static str) -> Result<Self, DecodeError> {
        let rdns = expect_constructed(node, tags::SEQUENCE, field)?;
        let mut attributes = Vec::new();
        for rdn in rdns {
            let members = expect_constructed(rdn, tags::SET, field)?;
            if members.is_empty() {
                return Err(DecodeError::unexpected(
                    field,
                    format!("empty RelativeDistinguishedName at offset {}", rdn.offset()),
                ));
            }
            for atv in members {
                attributes.push(parse_attribute(atv, field)?);
            }
        }
        Ok(Self { attributes })
    }

    /// First value whose attribute type equals `oid`.
    pub fn find(&self, oid: &Oid) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| &attr.oid == oid)
            .map(|attr| attr.value.as_str())
    }

    /// The commonName (2.5.4.3) value, if present.
    pub fn common_name(&self) -> Option<&str> {
        self.find(&known::common_name())
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .attributes
            .iter()
            .map(|attr| match known::oid_to_dn_short_name(&attr.oid) {
                Some(short) => format!("{short}={}", attr.value),
                None => format!("{}={}", attr.oid, attr.value),
            })
            .collect();
        write!(f, "{}", parts.join(", "))
    }
}

fn parse_attribute(atv: &TlvNode<'_>, field: &'static str) -> Result<RdnAttribute, DecodeError> {
    let pair = expect_constructed(atv, tags::SEQUENCE, field)?;
    let [type_node, value_node] = pair else {
        return Err(DecodeError::unexpected(
            field,
            format!(
                "AttributeTypeAndValue at offset {} has {} elements, expected 2",
                atv.offset(),
                pair.len()
            ),
        ));
    };

    let oid_bytes = match type_node.primitive_bytes() {
        Some(bytes) if type_node.is_universal(tags::OID) => bytes,
        _ => {
            return Err(DecodeError::unexpected(
                field,
                format!(
                    "expected OBJECT IDENTIFIER at offset {}, found {}",
                    type_node.offset(),
                    type_node.tag()
                ),
            ))
        }
    };
    let oid = Oid::from_der_value(oid_bytes)?;

    let value = match value_node.primitive_bytes() {
        Some(raw) => value_text(value_node, raw),
        None if oid == known::common_name() => {
            return Err(DecodeError::unexpected(
                field,
                format!(
                    "commonName value at offset {} must be a string, found constructed {}",
                    value_node.offset(),
                    value_node.tag()
                ),
            ))
        }
        None => hex_value(value_node.raw()),
    };

    Ok(RdnAttribute { oid, value })
}

/// `#` followed by the hex of the whole encoded value.
fn hex_value(der: &[u8]) -> String {
    let mut out = String::with_capacity(1 + der.len() * 2);
    out.push('#');
    for b in der {
        out.push_str(&format!("{b:02x}"));
    }
    out
}

/// String content of an attribute value. The tag only selects the character
/// encoding; any primitive value is accepted.
fn value_text(node: &TlvNode<'_>, raw: &[u8]) -> String {
    if node.class() != TagClass::Universal {
        return String::from_utf8_lossy(raw).into_owned();
    }
    match node.number() {
        tags::BMP_STRING => {
            let units = raw.chunks(2).map(|pair| match pair {
                [hi, lo] => u16::from_be_bytes([*hi, *lo]),
                _ => 0xFFFD,
            });
            char::decode_utf16(units)
                .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
                .collect()
        }
        tags::UNIVERSAL_STRING => raw
            .chunks(4)
            .map(|quad| match quad {
                [a, b, c, d] => char::from_u32(u32::from_be_bytes([*a, *b, *c, *d]))
                    .unwrap_or(char::REPLACEMENT_CHARACTER),
                _ => char::REPLACEMENT_CHARACTER,
            })
            .collect(),
        // TeletexString is in practice either UTF-8 or Latin-1.
        tags::T61_STRING => match std::str::from_utf8(raw) {
            Ok(s) => s.to_string(),
            Err(_) => raw.iter().map(|&b| char::from(b)).collect(),
        },
        _ => String::from_utf8_lossy(raw).into_owned(),
    }
}
