//! Production snapshot sink writing the textual grid dump to a file.

use crate::error::EnvError;
use crate::sink::SnapshotSink;
use crate::types::Snapshot;
use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Append-only text log of snapshots.
///
/// The file is opened in create+append mode, so snapshots from a new run land
/// after those of any previous run; nothing is ever truncated. Each append is
/// flushed before returning so a failure surfaces on the snapshot that caused it.
pub struct TextFileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    appended: u64,
}

impl TextFileSink {
    /// Opens (or creates) the log at `path` for appending.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, EnvError> {
        let path = path.as_ref().to_path_buf();
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        debug!("Opened snapshot log {}", path.display());

        Ok(Self {
            path,
            writer: BufWriter::new(file),
            appended: 0,
        })
    }

    /// Returns the log path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the number of snapshots appended through this handle.
    pub fn appended(&self) -> u64 {
        self.appended
    }
}

impl SnapshotSink for TextFileSink {
    fn append(&mut self, snapshot: &Snapshot) -> Result<(), EnvError> {
        write!(self.writer, "{}", snapshot)?;
        self.writer.flush()?;
        self.appended += 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_sink_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");

        let mut sink = TextFileSink::open(&path).unwrap();
        assert_eq!(sink.path(), path.as_path());
        sink.append(&Snapshot::new(2, vec![2, 2, 2, 2])).unwrap();
        sink.append(&Snapshot::new(2, vec![1, 2, 0, 2])).unwrap();
        assert_eq!(sink.appended(), 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "22\n22\n\n12\n02\n\n");
    }

    #[test]
    fn test_text_sink_appends_across_handles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("output.txt");

        {
            let mut first = TextFileSink::open(&path).unwrap();
            first.append(&Snapshot::filled(1, 5)).unwrap();
        }
        {
            let mut second = TextFileSink::open(&path).unwrap();
            second.append(&Snapshot::filled(1, 0)).unwrap();
        }

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "5\n\n0\n\n");
    }

    #[test]
    fn test_text_sink_unwritable_destination() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("output.txt");

        let result = TextFileSink::open(&path);
        assert!(matches!(result, Err(EnvError::Io(_))));
    }
}
