//! Directory file sink.

use std::path::{Path, PathBuf};

use folio_core::{FileSink, FolioResult};

/// Writes exported files into a directory, creating it on first save.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
    saved: Vec<PathBuf>,
}

impl DirectorySink {
    /// Create a sink writing into `dir`.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            saved: Vec::new(),
        }
    }

    /// Output directory.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths written so far, oldest first.
    #[must_use]
    pub fn saved(&self) -> &[PathBuf] {
        &self.saved
    }
}

impl FileSink for DirectorySink {
    fn save(&mut self, file_name: &str, bytes: &[u8]) -> FolioResult<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, bytes)?;
        tracing::info!("Wrote {} ({} bytes)", path.display(), bytes.len());
        self.saved.push(path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn creates_directory_and_writes() {
        let dir = tempfile::tempdir().expect("tempdir");
        let out = dir.path().join("nested").join("out");
        let mut sink = DirectorySink::new(&out);

        sink.save("doc.pdf", b"%PDF-1.3").expect("save");

        let written = std::fs::read(out.join("doc.pdf")).expect("read");
        assert_eq!(written, b"%PDF-1.3");
        assert_eq!(sink.saved(), [out.join("doc.pdf")]);
    }
}
