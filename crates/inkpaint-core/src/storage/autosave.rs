//! Auto-save and crash recovery.
//!
//! The manager only decides *whether* to save and where the recovery copy
//! lives; the host owns the timer and calls [`AutoSaveManager::maybe_save`]
//! periodically with a point-in-time snapshot of the document.

use crate::document::Document;
use crate::storage::{FileStorage, Storage, StorageResult};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Default auto-save interval in seconds.
pub const DEFAULT_AUTOSAVE_INTERVAL_SECS: u64 = 60;

/// Storage key of the recovery copy.
pub const AUTOSAVE_KEY: &str = "inkscript_autosave";

/// Manages automatic document persistence.
pub struct AutoSaveManager<S: Storage> {
    storage: Arc<S>,
    interval: Duration,
    last_save: Option<Instant>,
    dirty: bool,
}

impl<S: Storage> AutoSaveManager<S> {
    /// Create a new auto-save manager with the given storage backend.
    pub fn new(storage: Arc<S>) -> Self {
        Self {
            storage,
            interval: Duration::from_secs(DEFAULT_AUTOSAVE_INTERVAL_SECS),
            last_save: None,
            dirty: false,
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Mark the document as having unsaved changes.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Dirty and the interval has elapsed since the last save.
    pub fn should_save(&self) -> bool {
        if !self.dirty {
            return false;
        }
        match self.last_save {
            Some(last) => last.elapsed() >= self.interval,
            None => true,
        }
    }

    /// Save the recovery copy if [`should_save`](Self::should_save).
    /// Returns true if a save was performed.
    pub fn maybe_save(&mut self, document: &Document) -> StorageResult<bool> {
        if !self.should_save() {
            return Ok(false);
        }
        self.save(document)?;
        Ok(true)
    }

    /// Save the recovery copy if there are unsaved changes, regardless of
    /// the interval. Returns true if a save was performed.
    pub fn autosave(&mut self, document: &Document) -> StorageResult<bool> {
        if !self.dirty {
            return Ok(false);
        }
        self.save(document)?;
        Ok(true)
    }

    /// Force-save the recovery copy.
    pub fn save(&mut self, document: &Document) -> StorageResult<()> {
        self.storage.save(AUTOSAVE_KEY, document)?;
        self.last_save = Some(Instant::now());
        self.dirty = false;
        log::debug!("Autosaved {} strokes", document.stroke_count());
        Ok(())
    }

    /// Whether a recovery copy from an earlier session exists.
    pub fn recovery_available(&self) -> bool {
        self.storage.exists(AUTOSAVE_KEY).unwrap_or(false)
    }

    /// Load the recovery copy.
    pub fn recover(&mut self) -> StorageResult<Document> {
        let doc = self.storage.load(AUTOSAVE_KEY)?;
        self.dirty = false;
        self.last_save = Some(Instant::now());
        log::info!("Recovered autosave with {} strokes", doc.stroke_count());
        Ok(doc)
    }

    /// Delete the recovery copy, e.g. after the user declines recovery or
    /// after a clean explicit save.
    pub fn discard_recovery(&self) -> StorageResult<()> {
        self.storage.delete(AUTOSAVE_KEY)
    }

    pub fn storage(&self) -> &Arc<S> {
        &self.storage
    }
}

/// Auto-save manager writing `inkscript_autosave.inks` to the system temp
/// directory.
pub fn create_autosave_manager() -> StorageResult<AutoSaveManager<FileStorage>> {
    let storage = FileStorage::new(std::env::temp_dir())?;
    Ok(AutoSaveManager::new(Arc::new(storage)))
}
