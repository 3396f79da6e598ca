//! Storage abstraction for persistence.
//!
//! Documents are persisted as InkScript text. Every write goes through
//! [`write_atomic`] so a failed save never clobbers the previous file.

mod autosave;
mod file;
mod memory;

pub use autosave::{AUTOSAVE_KEY, AutoSaveManager, DEFAULT_AUTOSAVE_INTERVAL_SECS, create_autosave_manager};
pub use file::FileStorage;
pub use memory::MemoryStorage;

use crate::document::Document;
use crate::inkscript::{self, FormatError};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File extension for InkScript documents.
pub const INKS_EXTENSION: &str = "inks";

/// Storage errors.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Document not found: {0}")]
    NotFound(String),
    #[error(transparent)]
    Format(#[from] FormatError),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Other(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for document storage backends.
pub trait Storage: Send + Sync {
    /// Save a document.
    fn save(&self, id: &str, document: &Document) -> StorageResult<()>;

    /// Load a document.
    fn load(&self, id: &str) -> StorageResult<Document>;

    /// Delete a document. Deleting a missing document is not an error.
    fn delete(&self, id: &str) -> StorageResult<()>;

    /// List all document IDs.
    fn list(&self) -> StorageResult<Vec<String>>;

    /// Check if a document exists.
    fn exists(&self, id: &str) -> StorageResult<bool>;
}

/// Read and parse an `.inks` file.
pub fn load_file(path: &Path) -> StorageResult<Document> {
    let text = fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StorageError::NotFound(path.display().to_string()),
        _ => StorageError::Io(format!("Failed to read {}: {}", path.display(), e)),
    })?;
    let doc = inkscript::parse(&text)?;
    log::info!("Loaded {} ({} strokes)", path.display(), doc.stroke_count());
    Ok(doc)
}

/// Serialize a document and publish it atomically at `path`.
pub fn save_file(path: &Path, document: &Document) -> StorageResult<()> {
    write_atomic(path, inkscript::serialize(document).as_bytes())?;
    log::info!("Saved {}", path.display());
    Ok(())
}

/// Write `contents` to a temporary sibling of `path`, flush it to disk and
/// rename it over `path`. On failure the temporary file is removed and any
/// existing file at `path` is left as it was.
pub fn write_atomic(path: &Path, contents: &[u8]) -> StorageResult<()> {
    let tmp = temp_sibling(path);
    let result = (|| -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(contents)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    })();

    result.map_err(|e| {
        if tmp.exists() {
            if let Err(cleanup) = fs::remove_file(&tmp) {
                log::warn!("Failed to remove {}: {}", tmp.display(), cleanup);
            }
        }
        StorageError::Io(format!("Failed to write {}: {}", path.display(), e))
    })
}

fn temp_sibling(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "document".to_string());
    path.with_file_name(format!(".{name}.{}.tmp", std::process::id()))
}
