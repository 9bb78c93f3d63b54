//! The growth archive: every finished generation, in one JSON file.
//!
//! Writes are copy-on-write full overwrites: the complete array is
//! serialized to a sibling temp file and renamed over the original, so a
//! crash mid-write never leaves a truncated archive.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serplens_core::Generation;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("archive IO error at {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("archive serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// In-memory archive with write-through persistence, newest first.
pub struct GrowthArchive {
    path: PathBuf,
    records: Vec<Generation>,
}

impl GrowthArchive {
    /// Opens the archive at `path`, loading existing records. A missing
    /// file is an empty archive; it is created on first write.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError` if the file exists but cannot be read or
    /// parsed.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, ArchiveError> {
        let path = path.into();
        let records = match fs::read_to_string(&path) {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(io_error(&path, e)),
        };
        info!(path = %path.display(), records = records.len(), "growth archive opened");
        Ok(Self { path, records })
    }

    /// All records, newest first.
    #[must_use]
    pub fn records(&self) -> &[Generation] {
        &self.records
    }

    #[must_use]
    pub fn find(&self, id: &str) -> Option<&Generation> {
        self.records.iter().find(|g| g.id == id)
    }

    /// Inserts a new generation at the front and persists.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError` if the rewrite fails; the in-memory state
    /// is rolled back so memory and disk stay consistent.
    pub fn append(&mut self, generation: Generation) -> Result<(), ArchiveError> {
        self.records.insert(0, generation);
        if let Err(e) = self.persist() {
            self.records.remove(0);
            return Err(e);
        }
        Ok(())
    }

    /// Replaces the record with the same id and persists. Unknown ids are
    /// a no-op returning `false`.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError` if the rewrite fails.
    pub fn update(&mut self, generation: Generation) -> Result<bool, ArchiveError> {
        let Some(slot) = self.records.iter_mut().find(|g| g.id == generation.id) else {
            return Ok(false);
        };
        let previous = std::mem::replace(slot, generation);
        if let Err(e) = self.persist() {
            if let Some(slot) = self.records.iter_mut().find(|g| g.id == previous.id) {
                *slot = previous;
            }
            return Err(e);
        }
        Ok(true)
    }

    /// Removes the record with the given id and persists. Returns whether
    /// anything was removed.
    ///
    /// # Errors
    ///
    /// Returns `ArchiveError` if the rewrite fails.
    pub fn remove(&mut self, id: &str) -> Result<bool, ArchiveError> {
        let Some(index) = self.records.iter().position(|g| g.id == id) else {
            return Ok(false);
        };
        let removed = self.records.remove(index);
        if let Err(e) = self.persist() {
            self.records.insert(index, removed);
            return Err(e);
        }
        Ok(true)
    }

    fn persist(&self) -> Result<(), ArchiveError> {
        let serialized = serde_json::to_string_pretty(&self.records)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, serialized).map_err(|e| io_error(&tmp, e))?;
        fs::rename(&tmp, &self.path).map_err(|e| io_error(&self.path, e))
    }
}

fn io_error(path: &Path, source: io::Error) -> ArchiveError {
    ArchiveError::Io {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generation(id: &str) -> Generation {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "timestamp": 1_700_000_000_000_i64,
            "url": "https://www.emiratesnbd.com/en/cards",
            "profileId": "enbd",
            "pageType": "product",
            "modelProvider": "gemini",
            "extracted": {},
            "seoVariants": [
                {"h1": "A", "metaTitle": "A", "metaDescription": "A"}
            ],
            "schemaJsonld": {"@context": "https://schema.org", "@graph": []}
        }))
        .unwrap()
    }

    #[test]
    fn open_missing_file_is_empty_archive() {
        let dir = tempfile::tempdir().unwrap();
        let archive = GrowthArchive::open(dir.path().join("archive.json")).unwrap();
        assert!(archive.records().is_empty());
    }

    #[test]
    fn append_persists_and_reloads_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.json");

        let mut archive = GrowthArchive::open(&path).unwrap();
        archive.append(generation("first1234")).unwrap();
        archive.append(generation("second567")).unwrap();

        let reloaded = GrowthArchive::open(&path).unwrap();
        assert_eq!(reloaded.records().len(), 2);
        assert_eq!(reloaded.records()[0].id, "second567");
        assert_eq!(reloaded.records()[1].id, "first1234");
    }

    #[test]
    fn update_replaces_matching_record() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.json");

        let mut archive = GrowthArchive::open(&path).unwrap();
        archive.append(generation("abc123def")).unwrap();

        let mut updated = generation("abc123def");
        updated.schema_commentary = Some("Enhanced.".to_string());
        assert!(archive.update(updated).unwrap());

        let reloaded = GrowthArchive::open(&path).unwrap();
        assert_eq!(
            reloaded.records()[0].schema_commentary.as_deref(),
            Some("Enhanced.")
        );
    }

    #[test]
    fn update_unknown_id_is_noop() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = GrowthArchive::open(dir.path().join("archive.json")).unwrap();
        archive.append(generation("abc123def")).unwrap();
        assert!(!archive.update(generation("zzzzzzzzz")).unwrap());
        assert_eq!(archive.records().len(), 1);
    }

    #[test]
    fn remove_deletes_by_id() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.json");

        let mut archive = GrowthArchive::open(&path).unwrap();
        archive.append(generation("keep12345")).unwrap();
        archive.append(generation("drop12345")).unwrap();

        assert!(archive.remove("drop12345").unwrap());
        assert!(!archive.remove("drop12345").unwrap());

        let reloaded = GrowthArchive::open(&path).unwrap();
        assert_eq!(reloaded.records().len(), 1);
        assert_eq!(reloaded.records()[0].id, "keep12345");
    }

    #[test]
    fn open_rejects_corrupt_archive() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("archive.json");
        fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            GrowthArchive::open(&path),
            Err(ArchiveError::Serialize(_))
        ));
    }

    #[test]
    fn find_locates_record() {
        let dir = tempfile::tempdir().unwrap();
        let mut archive = GrowthArchive::open(dir.path().join("archive.json")).unwrap();
        archive.append(generation("abc123def")).unwrap();
        assert!(archive.find("abc123def").is_some());
        assert!(archive.find("missing").is_none());
    }
}
