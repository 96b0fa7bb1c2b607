//! Delete command.

use std::io::Write;
use std::path::Path;

use certshelf_store::{CertificateStore, JsonFileBackend};

pub fn run(
    store_path: &Path,
    index: usize,
    out: &mut dyn Write,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut store = CertificateStore::new(JsonFileBackend::new(store_path));
    let removed = store.delete_at(index)?;
    writeln!(
        out,
        "Deleted certificate {index}: {}",
        removed.subject_common_name
    )?;
    Ok(())
}
