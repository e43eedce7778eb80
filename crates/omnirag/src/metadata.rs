//! Document metadata store
//!
//! Durable mapping from `doc_id` to [`DocumentRecord`], persisted as a single
//! JSON object. The store is the source of truth for the document list and
//! for filename lookups; the engine-side index is opaque to it.
//!
//! Load and save failures never propagate: the service must come up even with
//! a corrupt or unwritable metadata file, accepting data loss. Failures are
//! reported through structured logs only.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Status assigned to every record; no intermediate states are modeled.
pub const STATUS_PROCESSED: &str = "processed";

/// Metadata for one uploaded, successfully processed document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DocumentRecord {
    /// Identifier assigned by the engine; unique key
    pub doc_id: String,
    /// Original upload name; not guaranteed unique across records
    pub file_name: String,
    /// Byte length captured at upload time
    pub file_size: u64,
    /// Creation time, immutable
    pub upload_timestamp: DateTime<Utc>,
    /// Lifecycle tag, fixed to "processed" once the record exists
    pub status: String,
}

/// JSON-file-backed store of document records, ordered by insertion.
pub struct MetadataStore {
    path: PathBuf,
    records: RwLock<IndexMap<String, DocumentRecord>>,
}

impl MetadataStore {
    /// Open the store, reading the backing file if present. A missing file
    /// starts an empty store; an unreadable or corrupt file does too, with
    /// the failure logged.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let records = match Self::load(&path) {
            Ok(records) => records,
            Err(e) => {
                tracing::error!(
                    "Error loading metadata from {}: {}; starting empty",
                    path.display(),
                    e
                );
                IndexMap::new()
            }
        };

        Self {
            path,
            records: RwLock::new(records),
        }
    }

    fn load(path: &Path) -> io::Result<IndexMap<String, DocumentRecord>> {
        if !path.exists() {
            return Ok(IndexMap::new());
        }

        let data = fs::read_to_string(path)?;
        serde_json::from_str(&data)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    /// Persist the full snapshot, overwriting the backing file. In-memory
    /// state is left untouched on failure.
    fn save(&self, records: &IndexMap<String, DocumentRecord>) {
        let result = (|| -> io::Result<()> {
            let data = serde_json::to_string_pretty(records)?;
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&self.path, data)
        })();

        if let Err(e) = result {
            tracing::error!("Error saving metadata to {}: {}", self.path.display(), e);
        }
    }

    /// Insert or overwrite the record for `doc_id` with a fresh timestamp and
    /// fixed status, then persist. Re-adding an existing id overwrites the
    /// record in place, keeping its position in iteration order.
    pub fn add(&self, doc_id: &str, file_name: &str, file_size: u64) -> DocumentRecord {
        let record = DocumentRecord {
            doc_id: doc_id.to_string(),
            file_name: file_name.to_string(),
            file_size,
            upload_timestamp: Utc::now(),
            status: STATUS_PROCESSED.to_string(),
        };

        let mut records = self.records.write();
        records.insert(doc_id.to_string(), record.clone());
        self.save(&records);
        record
    }

    /// Get a record by `doc_id`.
    pub fn get(&self, doc_id: &str) -> Option<DocumentRecord> {
        self.records.read().get(doc_id).cloned()
    }

    /// Get a record by filename. Linear scan; if multiple records share a
    /// filename, the first match in insertion order wins.
    pub fn get_by_name(&self, file_name: &str) -> Option<DocumentRecord> {
        self.records
            .read()
            .values()
            .find(|r| r.file_name == file_name)
            .cloned()
    }

    /// Snapshot of all records in insertion (upload) order.
    pub fn list_all(&self) -> Vec<DocumentRecord> {
        self.records.read().values().cloned().collect()
    }

    /// Remove the record for `doc_id` and persist. Returns whether a record
    /// existed. The engine-side index is never touched.
    pub fn delete(&self, doc_id: &str) -> bool {
        let mut records = self.records.write();
        if records.shift_remove(doc_id).is_some() {
            self.save(&records);
            true
        } else {
            false
        }
    }

    /// Number of records currently in the store.
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}
