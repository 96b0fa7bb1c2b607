//! Inspect command: decode a certificate file without storing it.

use std::io::Write;
use std::path::Path;

use certshelf_pki::x509::decode_certificate_with;
use certshelf_utils::asn1::Decoder;

use crate::input::read_input;

pub fn run(
    decoder: &Decoder,
    file: &Path,
    json: bool,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = read_input(file, decoder.config().max_input_len)?;
    let summary = decode_certificate_with(decoder, &data)?;

    if json {
        serde_json::to_writer_pretty(&mut *out, &summary)?;
        writeln!(out)?;
    } else {
        write!(out, "{}", summary.to_text())?;
    }
    Ok(())
}
