//! Ingestion progress reporting and directory scanning.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Progress update during ingestion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestProgress {
    /// Number of files handled so far.
    pub processed: usize,
    /// Total number of files in the batch.
    pub total: usize,
    /// File the update refers to (if any).
    pub current_file: Option<String>,
    /// Current stage of ingestion.
    pub stage: IngestStage,
}

impl IngestProgress {
    /// Creates a new progress update.
    #[must_use]
    pub const fn new(
        processed: usize,
        total: usize,
        current_file: Option<String>,
        stage: IngestStage,
    ) -> Self {
        Self {
            processed,
            total,
            current_file,
            stage,
        }
    }
}

/// Stages of the ingestion process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IngestStage {
    /// Scanning a directory for files.
    Scanning,
    /// Extracting and chunking files.
    Extracting,
    /// A file was extracted and chunked.
    Chunked {
        /// Chunks produced by the file.
        chunks: usize,
    },
    /// File was skipped due to an error.
    Skipped {
        /// Reason the file was skipped.
        reason: String,
    },
    /// Embedding all chunks.
    Embedding {
        /// Number of chunks to embed.
        chunks: usize,
    },
    /// Writing the new index.
    Saving,
    /// Ingestion completed successfully.
    Done,
}

/// Result of walking a directory.
#[derive(Debug, Default)]
pub(crate) struct DirectoryScan {
    /// Regular files, sorted by path.
    pub files: Vec<PathBuf>,
    /// Entries that could not be inspected, sorted by path.
    pub unreadable: Vec<(PathBuf, io::Error)>,
}

/// Collects all regular files under `root`.
///
/// Hidden entries (names starting with `.`) are ignored. Entries below `root` that
/// cannot be inspected, such as dangling symlinks, are reported in
/// [`DirectoryScan::unreadable`] instead of failing the walk.
pub(crate) fn collect_files(root: &Path) -> Result<DirectoryScan> {
    fs::metadata(root)?;

    let mut stack = vec![root.to_path_buf()];
    let mut scan = DirectoryScan::default();

    while let Some(path) = stack.pop() {
        let metadata = match fs::metadata(&path) {
            Ok(metadata) => metadata,
            Err(err) => {
                scan.unreadable.push((path, err));
                continue;
            }
        };

        if metadata.is_dir() {
            let entries = match fs::read_dir(&path) {
                Ok(entries) => entries,
                Err(err) => {
                    scan.unreadable.push((path, err));
                    continue;
                }
            };
            for entry in entries {
                let entry = entry?;
                if entry.file_name().to_string_lossy().starts_with('.') {
                    continue;
                }
                stack.push(entry.path());
            }
        } else if metadata.is_file() {
            scan.files.push(path);
        }
    }

    scan.files.sort();
    scan.unreadable.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(scan)
}
