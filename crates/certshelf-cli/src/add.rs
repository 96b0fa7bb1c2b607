//! Add command: decode a certificate file and append it to the store.

use std::io::Write;
use std::path::Path;

use certshelf_store::{CertificateStore, JsonFileBackend};
use certshelf_utils::asn1::Decoder;

use crate::input::read_input;

pub fn run(
    store_path: &Path,
    decoder: &Decoder,
    file: &Path,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = read_input(file, decoder.config().max_input_len)?;
    let mut store =
        CertificateStore::with_decoder(JsonFileBackend::new(store_path), decoder.clone());
    let summary = store.add_from_bytes(&data)?;

    writeln!(out, "Certificate added successfully.")?;
    writeln!(
        out,
        "  {} (issuer: {}, expires {})",
        summary.subject_common_name,
        summary.issuer_common_name,
        summary.not_after.date()
    )?;
    Ok(())
}
