//! Storage backends holding the whole certificate collection in one slot.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use certshelf_pki::x509::CertificateSummary;
use certshelf_types::StoreError;
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use tracing::debug;

/// Version written into (and the newest accepted from) store documents.
pub const SCHEMA_VERSION: u32 = 1;

/// Whole-collection persistence: every call reads or replaces the full list.
pub trait StorageBackend {
    /// Load the stored collection in insertion order.
    fn load_all(&self) -> Result<Vec<CertificateSummary>, StoreError>;

    /// Replace the stored collection.
    fn save_all(&mut self, certificates: &[CertificateSummary]) -> Result<(), StoreError>;
}

#[derive(Serialize)]
struct DocumentRef<'a> {
    version: u32,
    certificates: &'a [CertificateSummary],
}

#[derive(Deserialize)]
struct Header {
    version: u32,
}

#[derive(Deserialize)]
struct Document {
    certificates: Vec<CertificateSummary>,
}

/// Parse a versioned store document.
fn parse_document(bytes: &[u8]) -> Result<Vec<CertificateSummary>, StoreError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Vec::new());
    }
    let value: serde_json::Value = serde_json::from_slice(bytes)?;
    if !value.is_object() {
        return Err(StoreError::Json(serde::de::Error::custom(
            "store document must be a JSON object",
        )));
    }

    let header = Header::deserialize(&value)?;
    if header.version > SCHEMA_VERSION {
        return Err(StoreError::UnsupportedVersion {
            found: header.version,
            supported: SCHEMA_VERSION,
        });
    }
    let document = Document::deserialize(value)?;
    Ok(document.certificates)
}

/// A JSON document on disk.
///
/// A missing file reads as an empty collection. Saves write a temporary file
/// next to the target and rename it into place.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl StorageBackend for JsonFileBackend {
    fn load_all(&self) -> Result<Vec<CertificateSummary>, StoreError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file missing, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e.into()),
        };
        let certificates = parse_document(&bytes)?;
        debug!(
            path = %self.path.display(),
            count = certificates.len(),
            "loaded certificate store"
        );
        Ok(certificates)
    }

    fn save_all(&mut self, certificates: &[CertificateSummary]) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let mut tmp = NamedTempFile::new_in(dir)?;
        let document = DocumentRef {
            version: SCHEMA_VERSION,
            certificates,
        };
        serde_json::to_writer_pretty(&mut tmp, &document)?;
        tmp.write_all(b"\n")?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| StoreError::Io(e.error))?;
        debug!(
            path = %self.path.display(),
            count = certificates.len(),
            "saved certificate store"
        );
        Ok(())
    }
}

/// An in-process collection, for tests and embedding.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    certificates: Vec<CertificateSummary>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_certificates(certificates: Vec<CertificateSummary>) -> Self {
        Self { certificates }
    }
}

impl StorageBackend for MemoryBackend {
    fn load_all(&self) -> Result<Vec<CertificateSummary>, StoreError> {
        Ok(self.certificates.clone())
    }

    fn save_all(&mut self, certificates: &[CertificateSummary]) -> Result<(), StoreError> {
        self.certificates = certificates.to_vec();
        Ok(())
    }
}
