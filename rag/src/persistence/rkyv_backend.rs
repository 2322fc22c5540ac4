//! rkyv-based binary persistence.

use rkyv::rancor::Error as RkyvError;
use rkyv::util::AlignedVec;
use rkyv::{from_bytes, to_bytes};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;
use xxhash_rust::xxh3::Xxh3;

use crate::error::{RagError, Result};
use crate::index::VectorIndex;
use crate::types::{Chunk, IndexEntry, ModelIdentity};

use super::Persistence;

const INDEX_FILE: &str = "index.rkyv";
const FORMAT_VERSION: u32 = 1;

/// On-disk layout of an index snapshot.
#[derive(rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
#[rkyv(derive(Debug))]
struct IndexFile {
    format_version: u32,
    model: String,
    dimension: u64,
    checksum: u64,
    entries: Vec<EntryData>,
}

/// Internal entry data for rkyv serialization.
#[derive(Clone, rkyv::Archive, rkyv::Serialize, rkyv::Deserialize)]
#[rkyv(derive(Debug))]
struct EntryData {
    source_id: String,
    index: u64,
    segment: u64,
    start: u64,
    text: String,
    embedding: Vec<f32>,
}

impl From<&IndexEntry> for EntryData {
    fn from(entry: &IndexEntry) -> Self {
        Self {
            source_id: entry.chunk.source_id.clone(),
            index: entry.chunk.index as u64,
            segment: entry.chunk.segment as u64,
            start: entry.chunk.start as u64,
            text: entry.chunk.text.clone(),
            embedding: entry.embedding.clone(),
        }
    }
}

impl From<EntryData> for IndexEntry {
    fn from(data: EntryData) -> Self {
        let chunk = Chunk::new(
            data.source_id,
            data.index as usize,
            data.segment as usize,
            data.start as usize,
            data.text,
        );
        Self::new(chunk, data.embedding)
    }
}

fn checksum(model: &str, dimension: u64, entries: &[EntryData]) -> u64 {
    let mut hasher = Xxh3::new();
    hasher.update(model.as_bytes());
    hasher.update(&dimension.to_le_bytes());
    for entry in entries {
        hasher.update(entry.source_id.as_bytes());
        hasher.update(&entry.index.to_le_bytes());
        hasher.update(&entry.segment.to_le_bytes());
        hasher.update(&entry.start.to_le_bytes());
        hasher.update(entry.text.as_bytes());
        for value in &entry.embedding {
            hasher.update(&value.to_le_bytes());
        }
    }
    hasher.digest()
}

/// Binary persistence using rkyv for fast serialization.
///
/// The index lives in `index.rkyv` inside the configured directory. Saves go to a
/// temporary file in the same directory which is synced and then renamed over the
/// previous snapshot, so readers observe either the old index or the new one.
///
/// # Example
///
/// ```rust,no_run
/// use pdfqa_rag::persistence::{Persistence, RkyvPersistence};
///
/// let persistence = RkyvPersistence::new("./db");
/// // persistence.save(&index)?;
/// // let loaded = persistence.load()?;
/// ```
#[derive(Debug, Clone)]
pub struct RkyvPersistence {
    dir: PathBuf,
    file: PathBuf,
}

impl RkyvPersistence {
    /// Creates a new rkyv persistence backend.
    ///
    /// # Arguments
    /// * `dir` - Index directory; created on first save
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let file = dir.join(INDEX_FILE);
        Self { dir, file }
    }

    /// Directory holding the index file.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn persistence_error(&self, source: std::io::Error) -> RagError {
        RagError::Persistence {
            path: self.file.clone(),
            source,
        }
    }
}

impl Persistence for RkyvPersistence {
    fn save(&self, index: &VectorIndex) -> Result<()> {
        fs::create_dir_all(&self.dir).map_err(|e| self.persistence_error(e))?;

        let entries: Vec<EntryData> = index.entries().iter().map(EntryData::from).collect();
        let model = index.identity().model.clone();
        let dimension = index.dimension() as u64;
        let snapshot = IndexFile {
            format_version: FORMAT_VERSION,
            checksum: checksum(&model, dimension, &entries),
            model,
            dimension,
            entries,
        };

        let bytes =
            to_bytes::<RkyvError>(&snapshot).map_err(|e| RagError::Serialization(e.to_string()))?;

        let mut staging =
            NamedTempFile::new_in(&self.dir).map_err(|e| self.persistence_error(e))?;
        staging
            .write_all(&bytes)
            .and_then(|()| staging.as_file().sync_all())
            .map_err(|e| self.persistence_error(e))?;
        staging
            .persist(&self.file)
            .map_err(|e| self.persistence_error(e.error))?;

        debug!(path = %self.file.display(), entries = index.len(), bytes = bytes.len(), "index saved");
        Ok(())
    }

    fn load(&self) -> Result<VectorIndex> {
        if !self.exists() {
            return Err(RagError::IndexNotFound(self.dir.clone()));
        }

        let raw = fs::read(&self.file).map_err(|e| self.persistence_error(e))?;

        // rkyv validates alignment, and a plain Vec gives no guarantee.
        let mut bytes = AlignedVec::<16>::with_capacity(raw.len());
        bytes.extend_from_slice(&raw);

        let snapshot = from_bytes::<IndexFile, RkyvError>(&bytes)
            .map_err(|e| RagError::IndexCorrupted(e.to_string()))?;

        if snapshot.format_version != FORMAT_VERSION {
            return Err(RagError::IndexCorrupted(format!(
                "unsupported format version {}",
                snapshot.format_version
            )));
        }
        if checksum(&snapshot.model, snapshot.dimension, &snapshot.entries) != snapshot.checksum {
            return Err(RagError::IndexCorrupted("checksum mismatch".into()));
        }

        let dimension = usize::try_from(snapshot.dimension)
            .map_err(|_| RagError::IndexCorrupted("dimension out of range".into()))?;
        let identity = ModelIdentity::new(snapshot.model, dimension);
        let entries = snapshot.entries.into_iter().map(IndexEntry::from).collect();

        VectorIndex::from_entries(identity, entries)
    }

    fn exists(&self) -> bool {
        self.file.is_file()
    }

    fn remove(&self) -> Result<bool> {
        match fs::remove_file(&self.file) {
            Ok(()) => Ok(true),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(self.persistence_error(err)),
        }
    }

    fn path(&self) -> &Path {
        &self.file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_index() -> VectorIndex {
        VectorIndex::build(
            ModelIdentity::new("mock-embedder", 4),
            vec![
                Chunk::new("a.pdf", 0, 0, 0, "hello"),
                Chunk::new("a.pdf", 1, 1, 0, "wörld"),
            ],
            vec![vec![1.0, 2.0, 3.0, 4.0], vec![-0.5, 0.0, 0.25, 1.0]],
        )
        .unwrap()
    }

    #[test]
    fn save_and_load() {
        let dir = tempdir().unwrap();
        let persistence = RkyvPersistence::new(dir.path());
        let index = sample_index();

        persistence.save(&index).unwrap();
        assert!(persistence.exists());
        assert_eq!(persistence.path(), dir.path().join("index.rkyv"));

        let loaded = persistence.load().unwrap();
        assert_eq!(loaded, index);
        assert_eq!(loaded.identity().model, "mock-embedder");
    }

    #[test]
    fn load_nonexistent() {
        let dir = tempdir().unwrap();
        let persistence = RkyvPersistence::new(dir.path().join("missing"));

        assert!(!persistence.exists());
        assert!(matches!(
            persistence.load(),
            Err(RagError::IndexNotFound(_))
        ));
    }

    #[test]
    fn save_replaces_previous_snapshot() {
        let dir = tempdir().unwrap();
        let persistence = RkyvPersistence::new(dir.path());
        persistence.save(&sample_index()).unwrap();

        let replacement = VectorIndex::build(
            ModelIdentity::new("mock-embedder", 2),
            vec![Chunk::new("b.pdf", 0, 0, 0, "only")],
            vec![vec![0.0, 1.0]],
        )
        .unwrap();
        persistence.save(&replacement).unwrap();

        assert_eq!(persistence.load().unwrap(), replacement);
        let leftovers = fs::read_dir(dir.path()).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[test]
    fn corrupted_file_detected() {
        let dir = tempdir().unwrap();
        let persistence = RkyvPersistence::new(dir.path());
        persistence.save(&sample_index()).unwrap();

        let mut bytes = fs::read(persistence.path()).unwrap();
        let target = bytes
            .windows(5)
            .position(|w| w == b"hello")
            .unwrap();
        bytes[target] = b'j';
        fs::write(persistence.path(), &bytes).unwrap();

        assert!(matches!(
            persistence.load(),
            Err(RagError::IndexCorrupted(_))
        ));

        fs::write(persistence.path(), b"garbage").unwrap();
        assert!(matches!(
            persistence.load(),
            Err(RagError::IndexCorrupted(_))
        ));
    }

    #[test]
    fn remove_deletes_snapshot() {
        let dir = tempdir().unwrap();
        let persistence = RkyvPersistence::new(dir.path());

        assert!(!persistence.remove().unwrap());
        persistence.save(&sample_index()).unwrap();
        assert!(persistence.remove().unwrap());
        assert!(!persistence.exists());
    }

    #[test]
    fn save_empty() {
        let dir = tempdir().unwrap();
        let persistence = RkyvPersistence::new(dir.path());
        let empty = VectorIndex::build(ModelIdentity::new("mock", 8), vec![], vec![]).unwrap();

        persistence.save(&empty).unwrap();
        let loaded = persistence.load().unwrap();
        assert!(loaded.is_empty());
        assert_eq!(loaded.dimension(), 8);
    }
}
