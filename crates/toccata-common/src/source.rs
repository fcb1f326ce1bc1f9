use std::path::{Path, PathBuf};

/// A reference to script input: where the bytes live plus the logical
/// identity reported to the user.
///
/// `path` may point at a materialized temp file partway through
/// resolution; `origin` always names the input the user supplied (a real
/// file, or a synthetic label like `stdin`). Diagnostics and the load
/// context are bound to `origin`, never to an intermediate path.
#[derive(Debug, Clone)]
pub struct SourceRef {
    pub path: PathBuf,
    pub origin: PathBuf,
}

impl SourceRef {
    /// A source whose logical identity is the path itself.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            origin: path.clone(),
            path,
        }
    }

    /// A materialized source that still reports `origin` to the user.
    pub fn with_origin(path: impl Into<PathBuf>, origin: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            origin: origin.into(),
        }
    }

    /// File extension of `path`, lowercased. Empty string when absent.
    pub fn extension(&self) -> String {
        self.path
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
            .unwrap_or_default()
    }

    /// Directory containing `path`, falling back to `.` at the root.
    pub fn parent_dir(&self) -> PathBuf {
        match self.path.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        }
    }

    /// File name of `path` as a string, for naming derived artifacts.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .unwrap_or_else(|| Path::new("script").as_os_str())
            .to_string_lossy()
            .to_string()
    }
}
