#![forbid(unsafe_code)]
#![doc = "Persistence for decoded certificate summaries."]

mod backend;
mod store;

pub use backend::{JsonFileBackend, MemoryBackend, StorageBackend, SCHEMA_VERSION};
pub use store::CertificateStore;
