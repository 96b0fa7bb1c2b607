#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(summary) = certshelf_pki::x509::decode_certificate(data) {
        let _ = summary.to_text();
    }
});
