//! ASN.1 DER decoder.

use super::{Content, Tag, TlvNode};
use certshelf_types::DecodeError;
use tracing::{debug, trace};

/// Default bound on element nesting (the top-level element is depth 1).
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// Default bound on the size of a decoded buffer (1 MiB).
pub const DEFAULT_MAX_INPUT_LEN: usize = 1 << 20;

/// Resource bounds applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecoderConfig {
    /// Maximum nesting depth.
    pub max_depth: usize,
    /// Maximum accepted input size in bytes.
    pub max_input_len: usize,
}

impl DecoderConfig {
    /// Create a builder for decoder configuration.
    pub fn builder() -> DecoderConfigBuilder {
        DecoderConfigBuilder::default()
    }
}

impl Default for DecoderConfig {
    fn default() -> Self {
        DecoderConfigBuilder::default().build()
    }
}

/// Builder for `DecoderConfig`.
#[derive(Debug)]
pub struct DecoderConfigBuilder {
    max_depth: usize,
    max_input_len: usize,
}

impl Default for DecoderConfigBuilder {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            max_input_len: DEFAULT_MAX_INPUT_LEN,
        }
    }
}

impl DecoderConfigBuilder {
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn max_input_len(mut self, len: usize) -> Self {
        self.max_input_len = len;
        self
    }

    pub fn build(self) -> DecoderConfig {
        DecoderConfig {
            max_depth: self.max_depth,
            max_input_len: self.max_input_len,
        }
    }
}

/// A DER decoder producing a [`TlvNode`] tree.
#[derive(Debug, Clone, Default)]
pub struct Decoder {
    config: DecoderConfig,
}

impl Decoder {
    /// Create a decoder with the given configuration.
    pub fn new(config: DecoderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decode exactly one top-level element spanning all of `data`.
    pub fn decode<'a>(&self, data: &'a [u8]) -> Result<TlvNode<'a>, DecodeError> {
        if data.len() > self.config.max_input_len {
            return Err(DecodeError::InputTooLarge {
                size: data.len(),
                limit: self.config.max_input_len,
            });
        }

        let mut reader = Reader {
            data,
            pos: 0,
            max_depth: self.config.max_depth,
        };
        let root = reader.read_node(data.len(), 1).map_err(|e| {
            debug!(error = %e, len = data.len(), "DER decode failed");
            e
        })?;

        if reader.pos != data.len() {
            let count = data.len() - reader.pos;
            debug!(count, "DER decode found trailing data");
            return Err(DecodeError::TrailingData { count });
        }

        debug!(len = data.len(), nodes = root.node_count(), "decoded DER element");
        Ok(root)
    }
}

/// Decode `data` with the default configuration.
pub fn decode(data: &[u8]) -> Result<TlvNode<'_>, DecodeError> {
    Decoder::default().decode(data)
}

/// Cursor over the input buffer. Every read is bounded by an explicit `end`
/// so a child can never consume bytes outside its parent's content.
struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
    max_depth: usize,
}

impl<'a> Reader<'a> {
    fn read_node(&mut self, end: usize, depth: usize) -> Result<TlvNode<'a>, DecodeError> {
        if depth > self.max_depth {
            return Err(DecodeError::DepthExceeded {
                limit: self.max_depth,
            });
        }

        let start = self.pos;
        let (tag, tag_len) = Tag::from_bytes(&self.data[start..end], start)?;
        self.pos += tag_len;

        let length = self.read_length(end)?;
        let header_len = self.pos - start;

        let available = end - self.pos;
        if length > available {
            return Err(DecodeError::TruncatedInput {
                offset: self.pos,
                need: length,
                available,
            });
        }
        let content_end = self.pos + length;

        let content = if tag.constructed {
            let mut children = Vec::new();
            while self.pos < content_end {
                children.push(self.read_node(content_end, depth + 1)?);
            }
            Content::Constructed(children)
        } else {
            let bytes = &self.data[self.pos..content_end];
            self.pos = content_end;
            Content::Primitive(bytes)
        };

        trace!(offset = start, depth, %tag, length, "decoded element");
        Ok(TlvNode {
            tag,
            offset: start,
            header_len,
            raw: &self.data[start..content_end],
            content,
        })
    }

    /// Parse a DER length.
    fn read_length(&mut self, end: usize) -> Result<usize, DecodeError> {
        let offset = self.pos;
        if offset >= end {
            return Err(DecodeError::TruncatedInput {
                offset,
                need: 1,
                available: 0,
            });
        }

        let first = self.data[offset];
        self.pos += 1;

        if first < 0x80 {
            return Ok(first as usize);
        }
        if first == 0x80 {
            return Err(DecodeError::InvalidLengthEncoding {
                offset,
                reason: "indefinite length is not allowed in DER",
            });
        }
        if first == 0xFF {
            return Err(DecodeError::InvalidLengthEncoding {
                offset,
                reason: "reserved length octet 0xFF",
            });
        }

        let num_bytes = (first & 0x7F) as usize;
        if num_bytes > core::mem::size_of::<usize>() {
            return Err(DecodeError::InvalidLengthEncoding {
                offset,
                reason: "length field wider than the platform word",
            });
        }
        let available = end - self.pos;
        if num_bytes > available {
            return Err(DecodeError::TruncatedInput {
                offset: self.pos,
                need: num_bytes,
                available,
            });
        }

        let octets = &self.data[self.pos..self.pos + num_bytes];
        if octets[0] == 0 {
            return Err(DecodeError::InvalidLengthEncoding {
                offset,
                reason: "long-form length has a leading zero octet",
            });
        }
        let mut length: usize = 0;
        for &b in octets {
            length = length
                .checked_mul(256)
                .and_then(|l| l.checked_add(b as usize))
                .ok_or(DecodeError::InvalidLengthEncoding {
                    offset,
                    reason: "length overflows",
                })?;
        }
        if length < 0x80 {
            return Err(DecodeError::InvalidLengthEncoding {
                offset,
                reason: "long-form length used for a short length",
            });
        }
        self.pos += num_bytes;
        Ok(length)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asn1::{tags, Encoder, TagClass};
    use certshelf_types::DecodeErrorKind;

    fn nested_sequences(levels: usize) -> Vec<u8> {
        let mut der = vec![0x30, 0x00];
        for _ in 1..levels {
            let mut enc = Encoder::new();
            enc.write_sequence(&der);
            der = enc.finish();
        }
        der
    }

    #[test]
    fn test_decode_integer() {
        let data = [0x02, 0x01, 0x2A];
        let node = decode(&data).unwrap();
        assert!(node.is_universal(tags::INTEGER));
        assert!(!node.is_constructed());
        assert_eq!(node.primitive_bytes(), Some(&[0x2A][..]));
        assert_eq!(node.content_len(), 1);
    }

    #[test]
    fn test_decode_set_of_integers() {
        // SET { INTEGER 42, INTEGER 7 }
        let data = [0x31, 0x06, 0x02, 0x01, 0x2A, 0x02, 0x01, 0x07];
        let node = decode(&data).unwrap();
        assert!(node.is_universal(tags::SET));
        let children = node.children();
        assert_eq!(children.len(), 2);
        assert_eq!(children[0].primitive_bytes(), Some(&[0x2A][..]));
        assert_eq!(children[1].primitive_bytes(), Some(&[0x07][..]));
        assert_eq!(children[1].offset(), 5);
    }

    #[test]
    fn test_decode_empty_sequence() {
        let node = decode(&[0x30, 0x00]).unwrap();
        assert!(node.is_constructed());
        assert!(node.children().is_empty());
    }

    #[test]
    fn test_decode_long_form_length() {
        let payload = vec![0xAB; 200];
        let mut enc = Encoder::new();
        enc.write_octet_string(&payload);
        let der = enc.finish();
        assert_eq!(&der[..3], &[0x04, 0x81, 200]);
        let node = decode(&der).unwrap();
        assert_eq!(node.header_len(), 3);
        assert_eq!(node.primitive_bytes().unwrap().len(), 200);
    }

    #[test]
    fn test_decode_high_tag_number() {
        // [APPLICATION 201] primitive, 1 byte
        let data = [0x5F, 0x81, 0x49, 0x01, 0x00];
        let node = decode(&data).unwrap();
        assert_eq!(node.class(), TagClass::Application);
        assert_eq!(node.number(), 201);
        assert_eq!(node.header_len(), 4);
    }

    #[test]
    fn test_truncated_content() {
        // Claims 5 content bytes, only 2 present
        let err = decode(&[0x04, 0x05, 0x01, 0x02]).unwrap_err();
        assert_eq!(
            err,
            DecodeError::TruncatedInput {
                offset: 2,
                need: 5,
                available: 2
            }
        );
    }

    #[test]
    fn test_truncated_long_length() {
        let err = decode(&[0x04, 0x82, 0x01]).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TruncatedInput);
    }

    #[test]
    fn test_missing_length() {
        let err = decode(&[0x30]).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TruncatedInput);
        let err = decode(&[]).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TruncatedInput);
    }

    #[test]
    fn test_child_overruns_parent() {
        // SEQUENCE of length 3 whose child claims 4 content bytes
        let data = [0x30, 0x03, 0x04, 0x04, 0x00, 0x00, 0x00];
        let err = decode(&data).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::TruncatedInput);
    }

    #[test]
    fn test_indefinite_length_rejected() {
        let err = decode(&[0x30, 0x80, 0x00, 0x00]).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::InvalidLengthEncoding);
    }

    #[test]
    fn test_non_minimal_lengths_rejected() {
        // Long form for a short length
        let err = decode(&[0x04, 0x81, 0x01, 0x00]).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::InvalidLengthEncoding);
        // Leading zero length octet
        let mut data = vec![0x04, 0x82, 0x00, 0x80];
        data.extend(vec![0u8; 0x80]);
        let err = decode(&data).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::InvalidLengthEncoding);
        // Reserved 0xFF
        let err = decode(&[0x04, 0xFF]).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::InvalidLengthEncoding);
    }

    #[test]
    fn test_huge_length_does_not_overflow() {
        let data = [0x04, 0x88, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF];
        let err = decode(&data).unwrap_err();
        assert!(matches!(
            err.kind(),
            DecodeErrorKind::TruncatedInput | DecodeErrorKind::InvalidLengthEncoding
        ));
        let data = [0x04, 0x89, 1, 1, 1, 1, 1, 1, 1, 1, 1];
        let err = decode(&data).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::InvalidLengthEncoding);
    }

    #[test]
    fn test_trailing_data() {
        let err = decode(&[0x05, 0x00, 0x05, 0x00]).unwrap_err();
        assert_eq!(err, DecodeError::TrailingData { count: 2 });
    }

    #[test]
    fn test_invalid_tag_inside_sequence() {
        let data = [0x30, 0x03, 0x1F, 0x80, 0x01];
        let err = decode(&data).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::InvalidTagEncoding);
    }

    #[test]
    fn test_depth_at_limit_is_accepted() {
        let der = nested_sequences(DEFAULT_MAX_DEPTH);
        let mut node = decode(&der).unwrap();
        let mut depth = 1;
        while let Some(child) = node.child(0) {
            node = child.clone();
            depth += 1;
        }
        assert_eq!(depth, DEFAULT_MAX_DEPTH);
    }

    #[test]
    fn test_depth_past_limit_is_rejected() {
        let der = nested_sequences(DEFAULT_MAX_DEPTH + 1);
        let err = decode(&der).unwrap_err();
        assert_eq!(err, DecodeError::DepthExceeded { limit: 64 });
    }

    #[test]
    fn test_deeply_nested_input_does_not_overflow_stack() {
        // 10k well-formed nested SEQUENCEs; the depth bound must trip long
        // before recursion gets anywhere near that deep.
        fn push_len(out: &mut Vec<u8>, len: usize) {
            if len < 0x80 {
                out.push(len as u8);
            } else {
                let bytes: Vec<u8> = len
                    .to_be_bytes()
                    .into_iter()
                    .skip_while(|&b| b == 0)
                    .collect();
                out.push(0x80 | bytes.len() as u8);
                out.extend_from_slice(&bytes);
            }
        }

        let levels = 10_000;
        let mut content_lens = Vec::with_capacity(levels);
        let mut encoded = 0usize;
        for _ in 0..levels {
            content_lens.push(encoded);
            let mut header = vec![0x30];
            push_len(&mut header, encoded);
            encoded += header.len();
        }
        let mut data = Vec::with_capacity(encoded);
        for &len in content_lens.iter().rev() {
            data.push(0x30);
            push_len(&mut data, len);
        }
        assert_eq!(data.len(), encoded);

        let err = decode(&data).unwrap_err();
        assert_eq!(err, DecodeError::DepthExceeded { limit: DEFAULT_MAX_DEPTH });
    }

    #[test]
    fn test_custom_config() {
        let config = DecoderConfig::builder().max_depth(2).max_input_len(16).build();
        let decoder = Decoder::new(config);
        assert_eq!(decoder.config().max_depth, 2);

        assert!(decoder.decode(&nested_sequences(2)).is_ok());
        let err = decoder.decode(&nested_sequences(3)).unwrap_err();
        assert_eq!(err, DecodeError::DepthExceeded { limit: 2 });

        let err = decoder.decode(&[0u8; 17]).unwrap_err();
        assert_eq!(err, DecodeError::InputTooLarge { size: 17, limit: 16 });
    }

    #[test]
    fn test_default_config() {
        let config = DecoderConfig::default();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert_eq!(config.max_input_len, DEFAULT_MAX_INPUT_LEN);
    }
}
