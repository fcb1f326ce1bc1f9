//! Format resolution: maps a source reference to an executable module,
//! transforming through zero or more intermediate representations.
//!
//! Dispatch is a loop over a closed set of pending-transformation
//! variants. Every transforming step materializes the executable
//! extension (or the configured default, which is never empty), so the
//! chain shrinks each iteration and always terminates.

use std::path::PathBuf;

use toccata_common::{Result, ScriptError, SourceRef};

use crate::artifact::Artifact;
use crate::extract;
use crate::host::{Compiler, LoadContext, ModuleLoader};

/// The extension materialized transforms produce and the loader runs.
pub const EXECUTABLE_EXT: &str = "mjs";

/// Extensions accepted as directly loadable.
const EXECUTABLE_EXTS: &[&str] = &["mjs", "js", "cjs"];

/// What the current source still needs before it can be loaded.
enum Pending {
    /// No extension: the content is already script text, it only needs
    /// a materialized location with the default extension.
    Raw(SourceRef),
    /// Markdown: run the literate extractor.
    Literate(SourceRef),
    /// Typed superset: hand to the external compiler.
    Transpiled(SourceRef),
    /// Ready to load.
    Executable(SourceRef),
    /// No handler for this extension.
    Unknown(SourceRef),
}

impl Pending {
    fn classify(source: SourceRef) -> Self {
        match source.extension().as_str() {
            "" => Pending::Raw(source),
            "md" => Pending::Literate(source),
            "ts" => Pending::Transpiled(source),
            ext if EXECUTABLE_EXTS.contains(&ext) => Pending::Executable(source),
            _ => Pending::Unknown(source),
        }
    }
}

/// Drives a source through format handlers until it executes.
pub struct Resolver<C, L> {
    compiler: C,
    loader: L,
    default_ext: String,
}

impl<C: Compiler, L: ModuleLoader> Resolver<C, L> {
    pub fn new(compiler: C, loader: L) -> Self {
        Self {
            compiler,
            loader,
            default_ext: EXECUTABLE_EXT.to_string(),
        }
    }

    /// Extension assumed for extensionless and in-memory input. A
    /// leading dot is tolerated; an empty value keeps the default.
    pub fn with_default_extension(mut self, ext: &str) -> Self {
        let ext = ext.trim_start_matches('.');
        if !ext.is_empty() {
            self.default_ext = ext.to_lowercase();
        }
        self
    }

    /// Resolve and execute a script file.
    pub async fn run(&self, source: SourceRef) -> Result<()> {
        let mut artifacts = Vec::new();
        let outcome = self.drive(source, &mut artifacts).await;
        Self::cleanup(artifacts, outcome)
    }

    /// Resolve and execute in-memory script text (stdin, `--eval`).
    /// `origin` is the synthetic label reported to the user.
    pub async fn run_text(&self, text: &str, origin: impl Into<PathBuf>) -> Result<()> {
        let origin = origin.into();
        let base = origin
            .file_name()
            .map(|name| name.to_string_lossy().to_string())
            .unwrap_or_else(|| "script".to_string());

        let mut artifacts = Vec::new();
        let first = Artifact::write(
            &std::env::temp_dir(),
            &base,
            &self.default_ext,
            text.as_bytes(),
        )
        .await?;
        let source = SourceRef::with_origin(first.path().to_path_buf(), origin);
        artifacts.push(first);

        let outcome = self.drive(source, &mut artifacts).await;
        Self::cleanup(artifacts, outcome)
    }

    /// Strict read-then-delete: artifacts outlive the loader, then are
    /// removed exactly once. On the failure path the original error
    /// wins and the `Drop` backstop deletes the files.
    fn cleanup(artifacts: Vec<Artifact>, outcome: Result<()>) -> Result<()> {
        match outcome {
            Ok(()) => {
                for artifact in artifacts {
                    artifact.remove()?;
                }
                Ok(())
            }
            Err(e) => {
                drop(artifacts);
                Err(e)
            }
        }
    }

    async fn drive(&self, mut source: SourceRef, artifacts: &mut Vec<Artifact>) -> Result<()> {
        loop {
            match Pending::classify(source) {
                Pending::Raw(src) => {
                    let bytes = tokio::fs::read(&src.path).await?;
                    source = Self::materialize(&src, &self.default_ext, &bytes, artifacts).await?;
                }

                Pending::Literate(src) => {
                    let text = tokio::fs::read_to_string(&src.path).await?;
                    let body = extract::extract(&text);
                    source =
                        Self::materialize(&src, EXECUTABLE_EXT, body.as_bytes(), artifacts).await?;
                }

                Pending::Transpiled(src) => {
                    let output = self.compiler.compile(&src.path).await?;
                    let next = SourceRef::with_origin(output.clone(), src.origin);
                    artifacts.push(Artifact::claim(output));
                    source = next;
                }

                Pending::Executable(src) => {
                    let ctx = LoadContext::for_origin(&src.origin);
                    return self.loader.load(&src.path, &ctx).await;
                }

                Pending::Unknown(src) => {
                    return Err(ScriptError::UnrecognizedFormat {
                        extension: src.extension(),
                        path: src.origin,
                    });
                }
            }
        }
    }

    /// Write `contents` next to the current source and continue the
    /// chain under the same origin.
    async fn materialize(
        src: &SourceRef,
        ext: &str,
        contents: &[u8],
        artifacts: &mut Vec<Artifact>,
    ) -> Result<SourceRef> {
        let artifact = Artifact::write(&src.parent_dir(), &src.file_name(), ext, contents).await?;
        let next = SourceRef::with_origin(artifact.path().to_path_buf(), src.origin.clone());
        artifacts.push(artifact);
        Ok(next)
    }
}
