use super::mem_backend::MemBackend;
use super::record_store::RecordStore;

/// Test store: a [`RecordStore`] that never touches the filesystem.
pub type InMemoryStore = RecordStore<MemBackend>;

impl RecordStore<MemBackend> {
    pub fn new() -> Self {
        RecordStore::with_backend(MemBackend::new())
    }
}

impl Default for RecordStore<MemBackend> {
    fn default() -> Self {
        Self::new()
    }
}
