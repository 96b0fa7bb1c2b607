//! ASN.1 tag parsing and encoding.

use std::fmt;

use super::{tags, Tag, TagClass};
use certshelf_types::DecodeError;

impl Tag {
    /// Create a UNIVERSAL tag.
    pub fn universal(number: u32, constructed: bool) -> Self {
        Tag {
            class: TagClass::Universal,
            constructed,
            number,
        }
    }

    /// Create a CONTEXT-SPECIFIC tag.
    pub fn context(number: u32, constructed: bool) -> Self {
        Tag {
            class: TagClass::ContextSpecific,
            constructed,
            number,
        }
    }

    /// Parse a tag from the first bytes of `input`.
    ///
    /// `offset` is the position of `input` within the whole buffer and is
    /// only used for error reporting. Returns the tag and the number of
    /// identifier octets consumed.
    pub fn from_bytes(input: &[u8], offset: usize) -> Result<(Self, usize), DecodeError> {
        let Some(&first) = input.first() else {
            return Err(DecodeError::TruncatedInput {
                offset,
                need: 1,
                available: 0,
            });
        };

        let class = match first >> 6 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        };
        let constructed = (first & 0x20) != 0;

        let low_bits = first & 0x1F;
        if low_bits < 0x1F {
            return Ok((
                Tag {
                    class,
                    constructed,
                    number: low_bits as u32,
                },
                1,
            ));
        }

        // High-tag-number form: base-128, high bit set on all but the last octet.
        let mut number: u32 = 0;
        let mut i = 1;
        loop {
            let Some(&byte) = input.get(i) else {
                return Err(DecodeError::TruncatedInput {
                    offset: offset + i,
                    need: 1,
                    available: 0,
                });
            };
            if i == 1 && byte == 0x80 {
                return Err(DecodeError::InvalidTagEncoding {
                    offset: offset + i,
                    reason: "leading 0x80 octet in high tag number",
                });
            }
            if number > (u32::MAX >> 7) {
                return Err(DecodeError::InvalidTagEncoding {
                    offset: offset + i,
                    reason: "tag number does not fit in 32 bits",
                });
            }
            number = (number << 7) | (byte & 0x7F) as u32;
            i += 1;
            if (byte & 0x80) == 0 {
                break;
            }
        }

        if number < 0x1F {
            return Err(DecodeError::InvalidTagEncoding {
                offset,
                reason: "high tag number form used for a low tag number",
            });
        }

        Ok((
            Tag {
                class,
                constructed,
                number,
            },
            i,
        ))
    }

    /// Encode this tag to bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        let class_bits = match self.class {
            TagClass::Universal => 0x00,
            TagClass::Application => 0x40,
            TagClass::ContextSpecific => 0x80,
            TagClass::Private => 0xC0,
        };
        let constructed_bit = if self.constructed { 0x20 } else { 0x00 };

        if self.number < 0x1F {
            vec![class_bits | constructed_bit | (self.number as u8)]
        } else {
            let mut result = vec![class_bits | constructed_bit | 0x1F];
            let mut num = self.number;
            let mut bytes = Vec::new();
            while num > 0 {
                bytes.push((num & 0x7F) as u8);
                num >>= 7;
            }
            bytes.reverse();
            let last = bytes.len() - 1;
            for (i, b) in bytes.iter().enumerate() {
                if i < last {
                    result.push(b | 0x80);
                } else {
                    result.push(*b);
                }
            }
            result
        }
    }
}

fn universal_name(number: u32) -> Option<&'static str> {
    Some(match number {
        tags::BOOLEAN => "BOOLEAN",
        tags::INTEGER => "INTEGER",
        tags::BIT_STRING => "BIT STRING",
        tags::OCTET_STRING => "OCTET STRING",
        tags::NULL => "NULL",
        tags::OID => "OBJECT IDENTIFIER",
        tags::UTF8_STRING => "UTF8String",
        tags::SEQUENCE => "SEQUENCE",
        tags::SET => "SET",
        tags::NUMERIC_STRING => "NumericString",
        tags::PRINTABLE_STRING => "PrintableString",
        tags::T61_STRING => "T61String",
        tags::IA5_STRING => "IA5String",
        tags::UTC_TIME => "UTCTime",
        tags::GENERALIZED_TIME => "GeneralizedTime",
        tags::VISIBLE_STRING => "VisibleString",
        tags::UNIVERSAL_STRING => "UniversalString",
        tags::BMP_STRING => "BMPString",
        _ => return None,
    })
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.class {
            TagClass::Universal => match universal_name(self.number) {
                Some(name) => f.write_str(name),
                None => write!(f, "[UNIVERSAL {}]", self.number),
            },
            TagClass::Application => write!(f, "[APPLICATION {}]", self.number),
            TagClass::ContextSpecific => write!(f, "[{}]", self.number),
            TagClass::Private => write!(f, "[PRIVATE {}]", self.number),
        }
    }
}
