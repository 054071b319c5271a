//! Temporary storage for one uploaded resume.

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};

/// An uploaded file written to the upload directory for the duration of one request.
///
/// Removal happens exactly once: through `discard`, or on drop if the request
/// unwinds before reaching it.
#[derive(Debug)]
pub struct UploadedFile {
    file: NamedTempFile,
    original_name: Option<String>,
    size: usize,
}

impl UploadedFile {
    /// Writes `bytes` to a fresh `resume-*.pdf` file inside `dir`, creating `dir` if needed.
    pub fn persist(
        dir: &Path,
        original_name: Option<String>,
        bytes: &[u8],
    ) -> std::io::Result<Self> {
        std::fs::create_dir_all(dir)?;
        let mut file = tempfile::Builder::new()
            .prefix("resume-")
            .suffix(".pdf")
            .tempfile_in(dir)?;
        file.write_all(bytes)?;
        file.flush()?;
        debug!(
            "Stored upload {:?} ({} bytes) at {}",
            original_name,
            bytes.len(),
            file.path().display()
        );
        Ok(Self {
            file,
            original_name,
            size: bytes.len(),
        })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Deletes the file. Failures are logged, never returned.
    pub fn discard(self) {
        let path: PathBuf = self.file.path().to_path_buf();
        match self.file.close() {
            Ok(()) => debug!("Removed temporary upload {}", path.display()),
            Err(e) => warn!("Failed to remove temporary upload {}: {e}", path.display()),
        }
    }
}
