//! # Snapshot Persistence Port
//!
//! The store rewrites its full snapshot after every mutation through a
//! `SnapshotSink`. The sink is injected at construction, so the
//! application wires a JSON file while tests wire an in-memory sink.
//!
//! Durability is fire-and-forget: callers never await a write, and a
//! failed write is logged, not propagated. A crash can lose the last
//! few mutations, which a single-terminal shop tolerates.

use std::fs;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use thiserror::Error;

use crate::snapshot::Snapshot;

// =============================================================================
// Errors
// =============================================================================

/// Snapshot persistence failures.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("snapshot encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),
}

// =============================================================================
// Sink Trait
// =============================================================================

/// Where snapshots go. One `save` call per store mutation.
pub trait SnapshotSink: Send {
    /// Persists a full snapshot, replacing the previous one.
    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError>;

    /// Loads the last persisted snapshot, if any.
    fn load(&self) -> Result<Option<Snapshot>, PersistError>;
}

// =============================================================================
// JSON File Sink
// =============================================================================

/// Persists snapshots as a single JSON document on disk.
///
/// Writes go to a sibling temp file first and are renamed into place,
/// so a crash mid-write never truncates the previous snapshot.
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonFileSink { path: path.into() }
    }

    /// The file this sink writes to.
    pub fn path(&self) -> &PathBuf {
        &self.path
    }
}

impl SnapshotSink for JsonFileSink {
    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        let json = serde_json::to_vec_pretty(snapshot)?;
        let tmp = self.path.with_extension("tmp");
        fs::write(&tmp, &json)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>, PersistError> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

// =============================================================================
// Memory Sink
// =============================================================================

/// Keeps the last snapshot in memory. Cloned handles share storage, so a
/// test can hold one handle and inspect what the store persisted.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    last: Arc<Mutex<Option<Snapshot>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        MemorySink::default()
    }

    /// Returns a copy of the last persisted snapshot.
    pub fn last(&self) -> Option<Snapshot> {
        self.last.lock().expect("snapshot mutex poisoned").clone()
    }
}

impl SnapshotSink for MemorySink {
    fn save(&self, snapshot: &Snapshot) -> Result<(), PersistError> {
        *self.last.lock().expect("snapshot mutex poisoned") = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>, PersistError> {
        Ok(self.last())
    }
}

// =============================================================================
// Null Sink
// =============================================================================

/// Discards every snapshot. For tests that don't care about persistence.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl SnapshotSink for NullSink {
    fn save(&self, _snapshot: &Snapshot) -> Result<(), PersistError> {
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>, PersistError> {
        Ok(None)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("bodega-{}-{}.json", name, uuid::Uuid::new_v4()))
    }

    #[test]
    fn test_file_sink_round_trip() {
        let path = scratch_path("roundtrip");
        let sink = JsonFileSink::new(&path);

        assert!(sink.load().unwrap().is_none());

        let snapshot = Snapshot::default();
        sink.save(&snapshot).unwrap();

        let loaded = sink.load().unwrap().expect("snapshot saved");
        assert_eq!(loaded.sale_counter, snapshot.sale_counter);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_file_sink_overwrites_previous_snapshot() {
        let path = scratch_path("overwrite");
        let sink = JsonFileSink::new(&path);

        let mut snapshot = Snapshot::default();
        snapshot.sale_counter = Some(1);
        sink.save(&snapshot).unwrap();

        snapshot.sale_counter = Some(2);
        sink.save(&snapshot).unwrap();

        let loaded = sink.load().unwrap().unwrap();
        assert_eq!(loaded.sale_counter, Some(2));

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_memory_sink_shares_storage_across_handles() {
        let sink = MemorySink::new();
        let handle = sink.clone();

        sink.save(&Snapshot::default()).unwrap();
        assert!(handle.last().is_some());
    }

    #[test]
    fn test_null_sink_discards() {
        let sink = NullSink;
        sink.save(&Snapshot::default()).unwrap();
        assert!(sink.load().unwrap().is_none());
    }
}
