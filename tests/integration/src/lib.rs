//! Integration tests for certshelf.
//! Decoder, extractor and store exercised together.

#[cfg(test)]
mod tests {
    use certshelf_pki::x509::{decode_certificate, decode_certificate_with, extract};
    use certshelf_store::{CertificateStore, JsonFileBackend, MemoryBackend};
    use certshelf_types::{DecodeError, DecodeErrorKind};
    use certshelf_utils::asn1::{
        decode, parse_utc_time, Decoder, DecoderConfig, Encoder, DEFAULT_MAX_DEPTH,
    };
    use certshelf_utils::oid::known;
    use time::{Date, Month, OffsetDateTime, Time};

    const RSA_CA_DER: &[u8] = include_bytes!("../../../crates/certshelf-pki/testdata/rsa_ca.der");
    const LEAF_DER: &[u8] = include_bytes!("../../../crates/certshelf-pki/testdata/leaf.der");
    const NO_CN_DER: &[u8] = include_bytes!("../../../crates/certshelf-pki/testdata/no_cn.der");

    fn utc(year: i32, month: Month, day: u8) -> OffsetDateTime {
        Date::from_calendar_date(year, month, day)
            .unwrap()
            .with_time(Time::MIDNIGHT)
            .assume_utc()
    }

    fn sequence(content: &[u8]) -> Vec<u8> {
        let mut enc = Encoder::new();
        enc.write_sequence(content);
        enc.finish()
    }

    fn cn_name(cn: &str) -> Vec<u8> {
        let mut atv = Encoder::new();
        atv.write_oid(&known::common_name().to_der_value())
            .write_printable_string(cn);
        let mut set = Encoder::new();
        set.write_set(&sequence(&atv.finish()));
        sequence(&set.finish())
    }

    fn algorithm() -> Vec<u8> {
        let mut alg = Encoder::new();
        // sha256WithRSAEncryption
        alg.write_oid(&[0x2A, 0x86, 0x48, 0x86, 0xF7, 0x0D, 0x01, 0x01, 0x0B])
            .write_null();
        sequence(&alg.finish())
    }

    fn certificate(
        issuer: &str,
        subject: &str,
        not_before: OffsetDateTime,
        not_after: OffsetDateTime,
    ) -> Vec<u8> {
        let mut times = Encoder::new();
        times.write_time(not_before).write_time(not_after);

        let mut spki = Encoder::new();
        spki.write_raw(&algorithm()).write_bit_string(0, &[0x00]);

        let mut version = Encoder::new();
        version.write_integer(&[0x02]);

        let mut tbs = Encoder::new();
        tbs.write_context_specific(0, true, &version.finish())
            .write_integer(&[0x10, 0x01])
            .write_raw(&algorithm())
            .write_raw(&cn_name(issuer))
            .write_raw(&sequence(&times.finish()))
            .write_raw(&cn_name(subject))
            .write_raw(&sequence(&spki.finish()));

        let mut cert = Encoder::new();
        cert.write_raw(&sequence(&tbs.finish()))
            .write_raw(&algorithm())
            .write_bit_string(0, &[0xAB; 16]);
        sequence(&cert.finish())
    }

    fn nested_sequences(levels: usize) -> Vec<u8> {
        let mut der = Vec::new();
        for _ in 0..levels {
            der = sequence(&der);
        }
        der
    }

    #[test]
    fn test_fixture_roundtrip_exact_fields() {
        let not_before = utc(2024, Month::March, 1);
        let not_after = utc(2051, Month::March, 1);
        let der = certificate("Example CA", "Example CA", not_before, not_after);

        let summary = decode_certificate(&der).unwrap();
        assert_eq!(summary.subject_common_name, "Example CA");
        assert_eq!(summary.issuer_common_name, "Example CA");
        assert_eq!(summary.not_before, not_before);
        assert_eq!(summary.not_after, not_after);
        assert_eq!(summary.serial_number, "10:01");
        assert!(summary.is_self_issued());
    }

    #[test]
    fn test_every_prefix_is_truncated() {
        for der in [RSA_CA_DER, LEAF_DER] {
            for len in 0..der.len() {
                let err = decode(&der[..len]).unwrap_err();
                assert_eq!(
                    err.kind(),
                    DecodeErrorKind::TruncatedInput,
                    "prefix of {len} bytes: {err}"
                );
            }
        }
    }

    #[test]
    fn test_indefinite_length_rejected() {
        for der in [
            &[0x30, 0x80, 0x00, 0x00][..],
            &[0x30, 0x06, 0x30, 0x80, 0x02, 0x01, 0x00, 0x00],
            &[0x04, 0x80],
        ] {
            let err = decode(der).unwrap_err();
            assert_eq!(err.kind(), DecodeErrorKind::InvalidLengthEncoding, "{der:02X?}");
        }
    }

    #[test]
    fn test_nesting_bound() {
        let at_limit = nested_sequences(DEFAULT_MAX_DEPTH);
        let root = decode(&at_limit).unwrap();
        assert_eq!(root.node_count(), DEFAULT_MAX_DEPTH);

        let too_deep = nested_sequences(DEFAULT_MAX_DEPTH + 1);
        assert_eq!(
            decode(&too_deep).unwrap_err(),
            DecodeError::DepthExceeded {
                limit: DEFAULT_MAX_DEPTH
            }
        );

        let shallow = Decoder::new(DecoderConfig::builder().max_depth(4).build());
        assert!(shallow.decode(&nested_sequences(4)).is_ok());
        assert_eq!(
            shallow.decode(&nested_sequences(5)).unwrap_err().kind(),
            DecodeErrorKind::DepthExceeded
        );
    }

    #[test]
    fn test_deep_nesting_through_extractor() {
        let decoder = Decoder::new(DecoderConfig::builder().max_depth(5).build());
        let err = decode_certificate_with(&decoder, RSA_CA_DER).unwrap_err();
        assert_eq!(err.kind(), DecodeErrorKind::DepthExceeded);
    }

    #[test]
    fn test_utc_time_pivot() {
        assert_eq!(parse_utc_time(b"500101000000Z").unwrap().year(), 1950);
        assert_eq!(parse_utc_time(b"491231235959Z").unwrap().year(), 2049);
    }

    #[test]
    fn test_subject_without_common_name_fails_whole_extraction() {
        let err = decode_certificate(NO_CN_DER).unwrap_err();
        assert_eq!(
            err,
            DecodeError::AttributeNotFound {
                attribute: "commonName",
                name: "subject"
            }
        );
    }

    #[test]
    fn test_trailing_data_rejected() {
        let mut der = LEAF_DER.to_vec();
        der.push(0x00);
        assert_eq!(
            decode_certificate(&der).unwrap_err(),
            DecodeError::TrailingData { count: 1 }
        );
    }

    #[test]
    fn test_not_a_certificate() {
        // A well-formed DER value that is not a certificate
        let der = sequence(&[0x02, 0x01, 0x05]);
        let root = decode(&der).unwrap();
        assert_eq!(
            extract(&root).unwrap_err().kind(),
            DecodeErrorKind::UnexpectedStructure
        );
    }

    #[test]
    fn test_single_byte_corruption_never_panics() {
        for der in [RSA_CA_DER, LEAF_DER] {
            for i in 0..der.len() {
                for flip in [0x01u8, 0x80, 0xFF] {
                    let mut mutated = der.to_vec();
                    mutated[i] ^= flip;
                    // either outcome is fine; reaching here means no panic
                    let _ = decode_certificate(&mutated);
                }
            }
        }
    }

    #[test]
    fn test_pseudo_random_input_never_panics() {
        let mut state: u64 = 0x9E37_79B9_7F4A_7C15;
        let mut next = move || {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state
        };
        for _ in 0..2000 {
            let len = (next() % 96) as usize;
            let mut buf: Vec<u8> = (0..len).map(|_| next() as u8).collect();
            if let Some(first) = buf.first_mut() {
                *first = 0x30;
            }
            let _ = decode_certificate(&buf);
        }
    }

    #[test]
    fn test_store_add_then_delete_is_empty() {
        let mut store = CertificateStore::new(MemoryBackend::new());
        store.add_from_bytes(LEAF_DER).unwrap();
        store.delete_at(0).unwrap();
        assert!(store.list().unwrap().is_empty());
    }

    #[test]
    fn test_file_store_lifecycle() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("certificates.json");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();

        let mut store = CertificateStore::new(JsonFileBackend::new(&path));
        store.add_from_bytes(RSA_CA_DER).unwrap();
        assert!(store.add_from_bytes(NO_CN_DER).is_err());
        store.add_from_bytes(LEAF_DER).unwrap();

        let reopened = CertificateStore::new(JsonFileBackend::new(&path));
        let names: Vec<String> = reopened
            .list()
            .unwrap()
            .into_iter()
            .map(|c| c.subject_common_name)
            .collect();
        assert_eq!(names, ["Test RSA", "www.example.test"]);

        store.delete_at(1).unwrap();
        store.delete_at(0).unwrap();
        assert!(reopened.is_empty().unwrap());
    }
}
