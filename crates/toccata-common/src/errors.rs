use std::path::PathBuf;

use thiserror::Error;

/// Errors produced while resolving and running a script.
///
/// Only `Execution` is an expected, user-facing failure: the top-level
/// caller prints its message alone and exits. `UnrecognizedFormat` and
/// `Compilation` are user-fixable source problems reported with an
/// `error:` prefix. `Io` indicates an environment problem and is left
/// to crash loudly.
#[derive(Error, Debug)]
pub enum ScriptError {
    #[error("unrecognized script format '{extension}' ({})", path.display())]
    UnrecognizedFormat { extension: String, path: PathBuf },

    #[error("{0}")]
    Compilation(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Execution(String),
}

pub type Result<T> = std::result::Result<T, ScriptError>;
