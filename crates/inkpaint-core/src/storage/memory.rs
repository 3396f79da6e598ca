//! In-memory storage implementation.

use super::{Storage, StorageError, StorageResult};
use crate::document::Document;
use crate::inkscript;
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory storage for testing and ephemeral use.
///
/// Documents are kept as serialized text so a load goes through the same
/// parser as a file would.
#[derive(Default)]
pub struct MemoryStorage {
    documents: RwLock<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(e: impl std::fmt::Display) -> StorageError {
    StorageError::Other(format!("Lock error: {}", e))
}

impl Storage for MemoryStorage {
    fn save(&self, id: &str, document: &Document) -> StorageResult<()> {
        let text = inkscript::serialize(document);
        self.documents.write().map_err(lock_error)?.insert(id.to_string(), text);
        Ok(())
    }

    fn load(&self, id: &str) -> StorageResult<Document> {
        let docs = self.documents.read().map_err(lock_error)?;
        let text = docs.get(id).ok_or_else(|| StorageError::NotFound(id.to_string()))?;
        Ok(inkscript::parse(text)?)
    }

    fn delete(&self, id: &str) -> StorageResult<()> {
        self.documents.write().map_err(lock_error)?.remove(id);
        Ok(())
    }

    fn list(&self) -> StorageResult<Vec<String>> {
        let docs = self.documents.read().map_err(lock_error)?;
        Ok(docs.keys().cloned().collect())
    }

    fn exists(&self, id: &str) -> StorageResult<bool> {
        Ok(self.documents.read().map_err(lock_error)?.contains_key(id))
    }
}
