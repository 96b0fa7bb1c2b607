//! OID (Object Identifier) handling.

use certshelf_types::DecodeError;

/// A parsed OID represented as a sequence of arc values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: Vec<u32>,
}

impl Oid {
    /// Create an OID from a slice of arc values.
    pub fn new(arcs: &[u32]) -> Self {
        Self {
            arcs: arcs.to_vec(),
        }
    }

    /// Return the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Encode this OID to DER bytes (just the value, no tag/length).
    pub fn to_der_value(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        if let [first, second, rest @ ..] = self.arcs.as_slice() {
            encode_arc(&mut buf, first.saturating_mul(40).saturating_add(*second));
            for &arc in rest {
                encode_arc(&mut buf, arc);
            }
        }
        buf
    }

    /// Parse an OID from DER value bytes.
    ///
    /// The first subidentifier packs the first two arcs as `40 * X + Y`
    /// with `X` in 0..=2.
    pub fn from_der_value(data: &[u8]) -> Result<Self, DecodeError> {
        if data.is_empty() {
            return Err(DecodeError::InvalidOidEncoding {
                reason: "empty object identifier",
            });
        }

        let (first, mut i) = decode_arc(data)?;
        let mut arcs = match first {
            0..=39 => vec![0, first],
            40..=79 => vec![1, first - 40],
            _ => vec![2, first - 80],
        };

        while i < data.len() {
            let (arc, consumed) = decode_arc(&data[i..])?;
            arcs.push(arc);
            i += consumed;
        }

        Ok(Self { arcs })
    }

    /// Return the dotted-string representation (e.g., "2.5.4.3").
    pub fn to_dot_string(&self) -> String {
        self.arcs
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(".")
    }
}

impl std::fmt::Display for Oid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_dot_string())
    }
}

fn encode_arc(buf: &mut Vec<u8>, mut value: u32) {
    if value < 0x80 {
        buf.push(value as u8);
        return;
    }
    let mut bytes = Vec::new();
    while value > 0 {
        bytes.push((value & 0x7F) as u8);
        value >>= 7;
    }
    bytes.reverse();
    let last = bytes.len() - 1;
    for (i, b) in bytes.iter().enumerate() {
        if i < last {
            buf.push(b | 0x80);
        } else {
            buf.push(*b);
        }
    }
}

fn decode_arc(data: &[u8]) -> Result<(u32, usize), DecodeError> {
    if data.first() == Some(&0x80) {
        return Err(DecodeError::InvalidOidEncoding {
            reason: "subidentifier has a leading 0x80 octet",
        });
    }
    let mut value: u32 = 0;
    for (i, &byte) in data.iter().enumerate() {
        if value > (u32::MAX >> 7) {
            return Err(DecodeError::InvalidOidEncoding {
                reason: "subidentifier does not fit in 32 bits",
            });
        }
        value = (value << 7) | (byte & 0x7F) as u32;
        if (byte & 0x80) == 0 {
            return Ok((value, i + 1));
        }
    }
    Err(DecodeError::InvalidOidEncoding {
        reason: "truncated subidentifier",
    })
}

// Well-known OIDs
pub mod known {
    use super::Oid;

    // DN Attribute Type OIDs (X.520)
    pub fn common_name() -> Oid {
        Oid::new(&[2, 5, 4, 3])
    }
    pub fn surname() -> Oid {
        Oid::new(&[2, 5, 4, 4])
    }
    pub fn serial_number_attr() -> Oid {
        Oid::new(&[2, 5, 4, 5])
    }
    pub fn country_name() -> Oid {
        Oid::new(&[2, 5, 4, 6])
    }
    pub fn locality_name() -> Oid {
        Oid::new(&[2, 5, 4, 7])
    }
    pub fn state_or_province_name() -> Oid {
        Oid::new(&[2, 5, 4, 8])
    }
    pub fn street_address() -> Oid {
        Oid::new(&[2, 5, 4, 9])
    }
    pub fn organization_name() -> Oid {
        Oid::new(&[2, 5, 4, 10])
    }
    pub fn organizational_unit_name() -> Oid {
        Oid::new(&[2, 5, 4, 11])
    }
    pub fn title() -> Oid {
        Oid::new(&[2, 5, 4, 12])
    }
    pub fn given_name() -> Oid {
        Oid::new(&[2, 5, 4, 42])
    }
    pub fn email_address() -> Oid {
        Oid::new(&[1, 2, 840, 113549, 1, 9, 1])
    }
    pub fn domain_component() -> Oid {
        Oid::new(&[0, 9, 2342, 19200300, 100, 1, 25])
    }

    /// Map a well-known DN attribute OID to its short name.
    pub fn oid_to_dn_short_name(oid: &Oid) -> Option<&'static str> {
        match oid.arcs() {
            [2, 5, 4, 3] => Some("CN"),
            [2, 5, 4, 4] => Some("SN"),
            [2, 5, 4, 5] => Some("serialNumber"),
            [2, 5, 4, 6] => Some("C"),
            [2, 5, 4, 7] => Some("L"),
            [2, 5, 4, 8] => Some("ST"),
            [2, 5, 4, 9] => Some("street"),
            [2, 5, 4, 10] => Some("O"),
            [2, 5, 4, 11] => Some("OU"),
            [2, 5, 4, 12] => Some("title"),
            [2, 5, 4, 42] => Some("GN"),
            [1, 2, 840, 113549, 1, 9, 1] => Some("emailAddress"),
            [0, 9, 2342, 19200300, 100, 1, 25] => Some("DC"),
            _ => None,
        }
    }

    /// Map a well-known OID to its human-readable label.
    pub fn oid_to_attribute_label(oid: &Oid) -> Option<&'static str> {
        match oid.arcs() {
            [2, 5, 4, 3] => Some("commonName"),
            [2, 5, 4, 4] => Some("surname"),
            [2, 5, 4, 5] => Some("serialNumber"),
            [2, 5, 4, 6] => Some("countryName"),
            [2, 5, 4, 7] => Some("localityName"),
            [2, 5, 4, 8] => Some("stateOrProvinceName"),
            [2, 5, 4, 9] => Some("streetAddress"),
            [2, 5, 4, 10] => Some("organizationName"),
            [2, 5, 4, 11] => Some("organizationalUnitName"),
            [2, 5, 4, 12] => Some("title"),
            [2, 5, 4, 42] => Some("givenName"),
            [1, 2, 840, 113549, 1, 9, 1] => Some("emailAddress"),
            [0, 9, 2342, 19200300, 100, 1, 25] => Some("domainComponent"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certshelf_types::DecodeErrorKind;

    #[test]
    fn test_oid_roundtrip() {
        let oid = Oid::new(&[1, 2, 840, 113549, 1, 1, 1]);
        let der = oid.to_der_value();
        let parsed = Oid::from_der_value(&der).unwrap();
        assert_eq!(oid, parsed);
    }

    #[test]
    fn test_dot_string() {
        let oid = Oid::new(&[1, 2, 840, 113549, 1, 1, 1]);
        assert_eq!(oid.to_dot_string(), "1.2.840.113549.1.1.1");
        assert_eq!(known::common_name().to_string(), "2.5.4.3");
    }

    #[test]
    fn test_common_name_der() {
        assert_eq!(known::common_name().to_der_value(), &[0x55, 0x04, 0x03]);
        let oid = Oid::from_der_value(&[0x55, 0x04, 0x03]).unwrap();
        assert_eq!(oid, known::common_name());
    }

    #[test]
    fn test_first_arc_two_with_large_second() {
        // 2.999.3: first subidentifier 1079 = 0x88 0x37
        let oid = Oid::from_der_value(&[0x88, 0x37, 0x03]).unwrap();
        assert_eq!(oid.arcs(), &[2, 999, 3]);
        assert_eq!(oid.to_der_value(), &[0x88, 0x37, 0x03]);
    }

    #[test]
    fn test_invalid_encodings() {
        for bad in [
            &b""[..],                           // empty
            &[0x55, 0x04, 0x83],                 // truncated last arc
            &[0x55, 0x80, 0x01],                 // leading 0x80
            &[0x55, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F], // more than 32 bits
        ] {
            let err = Oid::from_der_value(bad).unwrap_err();
            assert_eq!(err.kind(), DecodeErrorKind::InvalidOidEncoding, "{bad:?}");
        }
    }

    #[test]
    fn test_labels() {
        assert_eq!(
            known::oid_to_attribute_label(&known::common_name()),
            Some("commonName")
        );
        assert_eq!(known::oid_to_dn_short_name(&known::organization_name()), Some("O"));
        assert_eq!(known::oid_to_dn_short_name(&Oid::new(&[1, 2, 3])), None);
    }
}
