//! ASN.1 DER decoding into a tree of tagged nodes.
//!
//! [`decode`] turns a byte buffer into a single [`TlvNode`] whose constructed
//! elements own their children and whose primitive elements borrow their
//! content from the input. The tree carries no schema knowledge.

mod datetime;
mod decoder;
mod encoder;
mod tag;

use std::fmt::Write as _;

pub use datetime::{decode_time, parse_generalized_time, parse_utc_time};
pub use decoder::{
    decode, Decoder, DecoderConfig, DecoderConfigBuilder, DEFAULT_MAX_DEPTH,
    DEFAULT_MAX_INPUT_LEN,
};
pub use encoder::Encoder;

/// UNIVERSAL tag numbers.
pub mod tags {
    pub const BOOLEAN: u32 = 1;
    pub const INTEGER: u32 = 2;
    pub const BIT_STRING: u32 = 3;
    pub const OCTET_STRING: u32 = 4;
    pub const NULL: u32 = 5;
    pub const OID: u32 = 6;
    pub const UTF8_STRING: u32 = 12;
    pub const SEQUENCE: u32 = 16;
    pub const SET: u32 = 17;
    pub const NUMERIC_STRING: u32 = 18;
    pub const PRINTABLE_STRING: u32 = 19;
    pub const T61_STRING: u32 = 20;
    pub const IA5_STRING: u32 = 22;
    pub const UTC_TIME: u32 = 23;
    pub const GENERALIZED_TIME: u32 = 24;
    pub const VISIBLE_STRING: u32 = 26;
    pub const UNIVERSAL_STRING: u32 = 28;
    pub const BMP_STRING: u32 = 30;
}

/// Represents a parsed ASN.1 tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Tag {
    pub class: TagClass,
    pub constructed: bool,
    pub number: u32,
}

/// ASN.1 tag class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagClass {
    Universal,
    Application,
    ContextSpecific,
    Private,
}

/// Content of a decoded element: raw bytes or child elements, never both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content<'a> {
    Primitive(&'a [u8]),
    Constructed(Vec<TlvNode<'a>>),
}

/// One decoded ASN.1 element.
///
/// Nodes are produced only by [`Decoder`] and are immutable. For a
/// constructed node the children's encodings exactly tile its content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlvNode<'a> {
    pub(crate) tag: Tag,
    pub(crate) offset: usize,
    pub(crate) header_len: usize,
    pub(crate) raw: &'a [u8],
    pub(crate) content: Content<'a>,
}

impl<'a> TlvNode<'a> {
    pub fn tag(&self) -> Tag {
        self.tag
    }

    pub fn class(&self) -> TagClass {
        self.tag.class
    }

    pub fn is_constructed(&self) -> bool {
        self.tag.constructed
    }

    pub fn number(&self) -> u32 {
        self.tag.number
    }

    /// Offset of the identifier octet within the decoded buffer.
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Length of the identifier and length octets.
    pub fn header_len(&self) -> usize {
        self.header_len
    }

    /// Declared content length in bytes.
    pub fn content_len(&self) -> usize {
        self.raw.len() - self.header_len
    }

    /// The complete encoding of this element (tag, length and content).
    pub fn raw(&self) -> &'a [u8] {
        self.raw
    }

    pub fn content(&self) -> &Content<'a> {
        &self.content
    }

    /// Child elements; empty for primitive nodes.
    pub fn children(&self) -> &[TlvNode<'a>] {
        match &self.content {
            Content::Constructed(children) => children,
            Content::Primitive(_) => &[],
        }
    }

    pub fn child(&self, index: usize) -> Option<&TlvNode<'a>> {
        self.children().get(index)
    }

    /// Content bytes of a primitive node; `None` for constructed nodes.
    pub fn primitive_bytes(&self) -> Option<&'a [u8]> {
        match self.content {
            Content::Primitive(bytes) => Some(bytes),
            Content::Constructed(_) => None,
        }
    }

    /// True if this is a UNIVERSAL element with the given tag number.
    pub fn is_universal(&self, number: u32) -> bool {
        self.tag.class == TagClass::Universal && self.tag.number == number
    }

    /// True if this is a CONTEXT-SPECIFIC element with the given tag number.
    pub fn is_context(&self, number: u32) -> bool {
        self.tag.class == TagClass::ContextSpecific && self.tag.number == number
    }

    /// Number of nodes in this subtree, including this one.
    pub fn node_count(&self) -> usize {
        1 + self.children().iter().map(TlvNode::node_count).sum::<usize>()
    }

    /// Render the subtree one element per line, in the style of `asn1parse`.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        self.dump_into(&mut out, 0);
        out
    }

    fn dump_into(&self, out: &mut String, depth: usize) {
        let form = if self.is_constructed() { "cons" } else { "prim" };
        let _ = write!(
            out,
            "{:>5}:d={depth:<2} hl={} l={:>4} {form}: {}",
            self.offset,
            self.header_len,
            self.content_len(),
            self.tag
        );
        if let Some(value) = self.primitive_bytes().and_then(|v| self.value_preview(v)) {
            let _ = write!(out, " :{value}");
        }
        out.push('\n');
        for child in self.children() {
            child.dump_into(out, depth + 1);
        }
    }

    fn value_preview(&self, value: &[u8]) -> Option<String> {
        if self.class() != TagClass::Universal {
            return None;
        }
        match self.number() {
            tags::INTEGER => Some(value.iter().map(|b| format!("{b:02X}")).collect()),
            #[cfg(feature = "oid")]
            tags::OID => crate::oid::Oid::from_der_value(value)
                .ok()
                .map(|oid| match crate::oid::known::oid_to_attribute_label(&oid) {
                    Some(label) => label.to_string(),
                    None => oid.to_dot_string(),
                }),
            tags::UTF8_STRING
            | tags::NUMERIC_STRING
            | tags::PRINTABLE_STRING
            | tags::T61_STRING
            | tags::IA5_STRING
            | tags::UTC_TIME
            | tags::GENERALIZED_TIME
            | tags::VISIBLE_STRING => Some(String::from_utf8_lossy(value).into_owned()),
            _ => None,
        }
    }
}
