#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(root) = certshelf_utils::asn1::decode(data) {
        // a successful decode spans the whole input
        assert_eq!(root.raw().len(), data.len());
        let _ = root.dump();
    }
});
