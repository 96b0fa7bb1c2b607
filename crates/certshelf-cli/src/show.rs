//! Show command: detail view of one stored certificate.

use std::io::Write;
use std::path::Path;

use certshelf_store::{CertificateStore, JsonFileBackend};

pub fn run(
    store_path: &Path,
    index: usize,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let store = CertificateStore::new(JsonFileBackend::new(store_path));
    let summary = store.get(index)?;
    write!(out, "{}", summary.to_text())?;
    Ok(())
}
