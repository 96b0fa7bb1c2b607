//! List command.

use std::io::Write;
use std::path::Path;

use certshelf_store::{CertificateStore, JsonFileBackend};

pub fn run(store_path: &Path, out: &mut dyn Write) -> Result<(), Box<dyn std::error::Error>> {
    let store = CertificateStore::new(JsonFileBackend::new(store_path));
    let certificates = store.list()?;
    if certificates.is_empty() {
        writeln!(out, "No certificates stored.")?;
        return Ok(());
    }

    writeln!(out, "{:>5}  {:<40} {:<40} EXPIRES", "INDEX", "COMMON NAME", "ISSUER")?;
    for (index, cert) in certificates.iter().enumerate() {
        writeln!(
            out,
            "{index:>5}  {:<40} {:<40} {}",
            cert.subject_common_name,
            cert.issuer_common_name,
            cert.not_after.date()
        )?;
    }
    Ok(())
}
