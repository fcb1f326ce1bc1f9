//! Materialized artifacts: temporary files holding a normalized or
//! transpiled script body.
//!
//! An artifact is owned by the resolution step that created it and is
//! deleted exactly once — explicitly via [`Artifact::remove`] on the
//! success path, or by the `Drop` backstop when resolution fails.

use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Guard over a temporary script file.
#[derive(Debug)]
pub struct Artifact {
    path: Option<PathBuf>,
}

impl Artifact {
    /// Write `contents` to a fresh file `{base}.{unique}.{ext}` in `dir`.
    ///
    /// The unique fragment keeps concurrent resolutions of the same
    /// input from colliding.
    pub async fn write(
        dir: &Path,
        base: &str,
        ext: &str,
        contents: &[u8],
    ) -> std::io::Result<Self> {
        let unique = Uuid::new_v4().simple().to_string();
        let path = dir.join(format!("{}.{}.{}", base, &unique[..8], ext));
        tokio::fs::write(&path, contents).await?;
        Ok(Self { path: Some(path) })
    }

    /// Adopt an existing file (the external compiler's output) so it is
    /// cleaned up like any other artifact.
    pub fn claim(path: PathBuf) -> Self {
        Self { path: Some(path) }
    }

    /// Location of the materialized file.
    pub fn path(&self) -> &Path {
        self.path
            .as_deref()
            .unwrap_or_else(|| Path::new(""))
    }

    /// Delete the file, consuming the guard. Failures surface as I/O
    /// errors; the `Drop` backstop will not run again for this file.
    pub fn remove(mut self) -> std::io::Result<()> {
        match self.path.take() {
            Some(path) => std::fs::remove_file(path),
            None => Ok(()),
        }
    }
}

impl Drop for Artifact {
    fn drop(&mut self) {
        if let Some(path) = self.path.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}
