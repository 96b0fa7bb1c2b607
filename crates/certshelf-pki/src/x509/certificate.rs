//! Certificate summary extraction.

use certshelf_types::DecodeError;
use certshelf_utils::asn1::{decode_time, tags, Decoder, TlvNode};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use tracing::debug;

use super::name::Name;
use super::text::hex_colon;

/// Flat result of extracting one certificate.
///
/// Holds no reference to the decoded tree, so it can be stored and
/// serialized on its own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateSummary {
    pub subject_common_name: String,
    pub issuer_common_name: String,
    #[serde(with = "time::serde::rfc3339")]
    pub not_before: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub not_after: OffsetDateTime,
    /// Certificate version (1-3); 0 for records stored without it.
    #[serde(default)]
    pub version: u8,
    /// Serial number as colon-separated hex.
    #[serde(default)]
    pub serial_number: String,
    /// Full subject DN, e.g. `CN=example, O=Org`.
    #[serde(default)]
    pub subject: String,
    /// Full issuer DN.
    #[serde(default)]
    pub issuer: String,
}

impl CertificateSummary {
    /// True if `at` lies within `[not_before, not_after]`.
    pub fn is_valid_at(&self, at: OffsetDateTime) -> bool {
        self.not_before <= at && at <= self.not_after
    }

    /// True if subject and issuer name the same entity.
    ///
    /// Compares full DNs when both are known, otherwise the common names.
    pub fn is_self_issued(&self) -> bool {
        if !self.subject.is_empty() && !self.issuer.is_empty() {
            self.subject == self.issuer
        } else {
            self.subject_common_name == self.issuer_common_name
        }
    }
}

/// Decode and extract a DER certificate with the default decoder limits.
pub fn decode_certificate(data: &[u8]) -> Result<CertificateSummary, DecodeError> {
    decode_certificate_with(&Decoder::default(), data)
}

/// Decode and extract a DER certificate with a caller-supplied decoder.
pub fn decode_certificate_with(
    decoder: &Decoder,
    data: &[u8],
) -> Result<CertificateSummary, DecodeError> {
    let root = decoder.decode(data)?;
    extract(&root)
}

/// Walk a decoded tree along the X.509 `Certificate` shape.
///
/// ```text
/// Certificate ::= SEQUENCE { tbsCertificate, signatureAlgorithm, signatureValue }
/// TBSCertificate ::= SEQUENCE {
///     version [0] EXPLICIT INTEGER OPTIONAL, serialNumber, signature,
///     issuer, validity, subject, subjectPublicKeyInfo,
///     issuerUniqueID [1] OPTIONAL, subjectUniqueID [2] OPTIONAL,
///     extensions [3] OPTIONAL }
/// ```
pub fn extract(root: &TlvNode<'_>) -> Result<CertificateSummary, DecodeError> {
    let top = expect_constructed(root, tags::SEQUENCE, "certificate")?;
    let [tbs, _signature_algorithm, _signature_value] = top else {
        return Err(DecodeError::unexpected(
            "certificate",
            format!("expected 3 elements, found {}", top.len()),
        ));
    };

    let fields = expect_constructed(tbs, tags::SEQUENCE, "tbsCertificate")?;

    // version [0] EXPLICIT, absent means v1
    let (version, fields) = match fields.split_first() {
        Some((first, rest)) if first.is_context(0) => (parse_version(first)?, rest),
        _ => (1, fields),
    };

    let [serial, signature, issuer, validity, subject, spki, trailing @ ..] = fields else {
        return Err(DecodeError::unexpected(
            "tbsCertificate",
            format!(
                "expected at least 6 fields after version, found {}",
                fields.len()
            ),
        ));
    };

    let serial_number = parse_serial(serial)?;
    expect_constructed(signature, tags::SEQUENCE, "signature")?;

    let issuer = Name::from_node(issuer, "issuer")?;
    let issuer_common_name = required_common_name(&issuer, "issuer")?;

    let (not_before, not_after) = parse_validity(validity)?;

    let subject = Name::from_node(subject, "subject")?;
    let subject_common_name = required_common_name(&subject, "subject")?;

    expect_constructed(spki, tags::SEQUENCE, "subjectPublicKeyInfo")?;
    check_trailing(trailing)?;

    debug!(
        subject = %subject_common_name,
        issuer = %issuer_common_name,
        version,
        "extracted certificate summary"
    );

    Ok(CertificateSummary {
        subject_common_name,
        issuer_common_name,
        not_before,
        not_after,
        version,
        serial_number,
        subject: subject.to_string(),
        issuer: issuer.to_string(),
    })
}

/// Children of `node`, which must be a constructed UNIVERSAL `number`.
pub(super) fn expect_constructed<'n, 'a>(
    node: &'n TlvNode<'a>,
    number: u32,
    step: &'static str,
) -> Result<&'n [TlvNode<'a>], DecodeError> {
    if !node.is_universal(number) || !node.is_constructed() {
        return Err(DecodeError::unexpected(
            step,
            format!(
                "expected constructed {} at offset {}, found {} {}",
                certshelf_utils::asn1::Tag::universal(number, true),
                node.offset(),
                if node.is_constructed() { "constructed" } else { "primitive" },
                node.tag()
            ),
        ));
    }
    Ok(node.children())
}

fn parse_version(node: &TlvNode<'_>) -> Result<u8, DecodeError> {
    let inner = match node.children() {
        [inner] if node.is_constructed() => inner,
        _ => {
            return Err(DecodeError::unexpected(
                "version",
                "[0] must wrap exactly one INTEGER",
            ))
        }
    };
    match inner.primitive_bytes() {
        Some(&[v]) if inner.is_universal(tags::INTEGER) && v <= 2 => Ok(v + 1),
        Some(_) if inner.is_universal(tags::INTEGER) => Err(DecodeError::unexpected(
            "version",
            "unsupported version value",
        )),
        _ => Err(DecodeError::unexpected(
            "version",
            format!("expected INTEGER, found {}", inner.tag()),
        )),
    }
}

fn parse_serial(node: &TlvNode<'_>) -> Result<String, DecodeError> {
    match node.primitive_bytes() {
        Some(bytes) if node.is_universal(tags::INTEGER) && !bytes.is_empty() => {
            Ok(hex_colon(bytes))
        }
        Some(_) if node.is_universal(tags::INTEGER) => Err(DecodeError::unexpected(
            "serialNumber",
            "empty INTEGER",
        )),
        _ => Err(DecodeError::unexpected(
            "serialNumber",
            format!("expected INTEGER, found {}", node.tag()),
        )),
    }
}

fn parse_validity(node: &TlvNode<'_>) -> Result<(OffsetDateTime, OffsetDateTime), DecodeError> {
    let times = expect_constructed(node, tags::SEQUENCE, "validity")?;
    let [not_before, not_after] = times else {
        return Err(DecodeError::unexpected(
            "validity",
            format!("expected 2 time values, found {}", times.len()),
        ));
    };
    Ok((decode_time(not_before)?, decode_time(not_after)?))
}

fn required_common_name(name: &Name, field: &'static str) -> Result<String, DecodeError> {
    name.common_name()
        .map(str::to_string)
        .ok_or(DecodeError::AttributeNotFound {
            attribute: "commonName",
            name: field,
        })
}

/// issuerUniqueID [1], subjectUniqueID [2], extensions [3]: each optional,
/// in that order. Contents are not interpreted.
fn check_trailing(trailing: &[TlvNode<'_>]) -> Result<(), DecodeError> {
    let mut last = 0;
    for node in trailing {
        let number = node.number();
        let allowed = (1..=3).contains(&number) && number > last;
        if !node.is_context(number) || !allowed {
            return Err(DecodeError::unexpected(
                "tbsCertificate",
                format!(
                    "unexpected {} at offset {} after subjectPublicKeyInfo",
                    node.tag(),
                    node.offset()
                ),
            ));
        }
        last = number;
    }
    Ok(())
}
