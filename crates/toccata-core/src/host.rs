//! Collaborator seams: the external compiler and the module-executing
//! runtime the resolver hands finished scripts to.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use toccata_common::Result;

/// Context bound before a module is loaded: the effective script
/// location as the script should see it.
///
/// Both values come from the original origin, never from an
/// intermediate materialized path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadContext {
    pub script_file: PathBuf,
    pub script_dir: PathBuf,
}

impl LoadContext {
    pub fn for_origin(origin: &Path) -> Self {
        let script_dir = match origin.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };
        Self {
            script_file: origin.to_path_buf(),
            script_dir,
        }
    }
}

/// External compiler for typed-superset sources.
#[async_trait]
pub trait Compiler: Send + Sync {
    /// Compile `input`, producing an executable module at the
    /// deterministic sibling path (same stem, executable extension),
    /// and return that path. Compiler failure is a `Compilation` error;
    /// it aborts the chain and is never retried.
    async fn compile(&self, input: &Path) -> Result<PathBuf>;
}

/// The runtime that loads and executes a finished module.
#[async_trait]
pub trait ModuleLoader: Send + Sync {
    /// Load and run `script` with `ctx` bound. Runtime failure is
    /// surfaced as an `Execution` error.
    async fn load(&self, script: &Path, ctx: &LoadContext) -> Result<()>;
}
