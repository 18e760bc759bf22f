//! Destinations for finished containers.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Receives a finished container under its file name.
pub trait BlobSink {
    fn save(&self, name: &str, bytes: &[u8]) -> io::Result<()>;
}

/// Writes containers into a directory.
///
/// Files are written to a temporary name first and renamed into place, so a
/// reader never sees a partial container.
#[derive(Debug, Clone)]
pub struct FileSink {
    directory: PathBuf,
}

impl FileSink {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
        }
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Path a blob named `name` is written to.
    pub fn path_for(&self, name: &str) -> PathBuf {
        self.directory.join(name)
    }
}

impl BlobSink for FileSink {
    fn save(&self, name: &str, bytes: &[u8]) -> io::Result<()> {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid output file name '{}'", name),
            ));
        }

        fs::create_dir_all(&self.directory)?;
        let path = self.path_for(name);
        let temp_path = self.directory.join(format!("{}.part", name));
        if let Err(e) = fs::write(&temp_path, bytes).and_then(|()| fs::rename(&temp_path, &path)) {
            // Best effort, the original error is what the caller needs
            let _ = fs::remove_file(&temp_path);
            return Err(e);
        }

        debug!(path = %path.display(), bytes = bytes.len(), "Export written");
        Ok(())
    }
}
