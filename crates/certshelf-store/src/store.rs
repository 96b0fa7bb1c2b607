//! The certificate collection as seen by a presentation layer.

use certshelf_pki::x509::{decode_certificate_with, CertificateSummary};
use certshelf_types::StoreError;
use certshelf_utils::asn1::Decoder;
use tracing::{debug, warn};

use crate::backend::StorageBackend;

/// Ordered collection of certificate summaries over a [`StorageBackend`].
///
/// Mutations load the whole collection, change it and save it back; they
/// take `&mut self` so one store performs them one at a time. A failed
/// decode never reaches the backend.
#[derive(Debug)]
pub struct CertificateStore<B> {
    backend: B,
    decoder: Decoder,
}

impl<B: StorageBackend> CertificateStore<B> {
    pub fn new(backend: B) -> Self {
        Self::with_decoder(backend, Decoder::default())
    }

    /// Use `decoder` (and its limits) for certificates added to this store.
    pub fn with_decoder(backend: B, decoder: Decoder) -> Self {
        Self { backend, decoder }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// All stored summaries in insertion order.
    pub fn list(&self) -> Result<Vec<CertificateSummary>, StoreError> {
        self.backend.load_all()
    }

    /// The summary at `index`.
    pub fn get(&self, index: usize) -> Result<CertificateSummary, StoreError> {
        let mut all = self.backend.load_all()?;
        if index >= all.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: all.len(),
            });
        }
        Ok(all.swap_remove(index))
    }

    /// Decode `data` and append the summary.
    ///
    /// Decoding happens before storage is read, so a rejected certificate
    /// leaves the collection unchanged.
    pub fn add_from_bytes(&mut self, data: &[u8]) -> Result<CertificateSummary, StoreError> {
        let summary = decode_certificate_with(&self.decoder, data).map_err(|e| {
            warn!(error = %e, len = data.len(), "rejected certificate");
            e
        })?;

        let mut all = self.backend.load_all()?;
        all.push(summary.clone());
        self.backend.save_all(&all)?;

        debug!(
            subject = %summary.subject_common_name,
            index = all.len() - 1,
            "added certificate"
        );
        Ok(summary)
    }

    /// Remove and return the summary at `index`.
    pub fn delete_at(&mut self, index: usize) -> Result<CertificateSummary, StoreError> {
        let mut all = self.backend.load_all()?;
        if index >= all.len() {
            return Err(StoreError::IndexOutOfRange {
                index,
                len: all.len(),
            });
        }
        let removed = all.remove(index);
        self.backend.save_all(&all)?;

        debug!(
            subject = %removed.subject_common_name,
            index,
            remaining = all.len(),
            "deleted certificate"
        );
        Ok(removed)
    }

    pub fn len(&self) -> Result<usize, StoreError> {
        Ok(self.backend.load_all()?.len())
    }

    pub fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}
