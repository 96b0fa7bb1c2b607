//! asn1parse command: print the decoded element tree.

use std::io::Write;
use std::path::Path;

use certshelf_utils::asn1::Decoder;

use crate::input::read_input;

pub fn run(
    decoder: &Decoder,
    file: &Path,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = read_input(file, decoder.config().max_input_len)?;
    let root = decoder.decode(&data)?;
    write!(out, "{}", root.dump())?;
    Ok(())
}
