//! Concrete collaborators: the external compiler and the script runtime,
//! both invoked as child processes.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use toccata_common::{Result, ScriptError};
use toccata_core::resolve::EXECUTABLE_EXT;
use toccata_core::{Compiler, LoadContext, ModuleLoader};

/// Runs the configured transpiler with the input path appended. The
/// contract is that a successful run leaves an executable module at the
/// sibling path (same stem, executable extension).
pub struct CommandCompiler {
    pub command: String,
    pub args: Vec<String>,
    pub quiet: bool,
}

#[async_trait]
impl Compiler for CommandCompiler {
    async fn compile(&self, input: &Path) -> Result<PathBuf> {
        if !self.quiet {
            eprintln!("compiling {}", input.display());
        }

        let output = Command::new(&self.command)
            .args(&self.args)
            .arg(input)
            .output()
            .await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ScriptError::Compilation(stderr.trim().to_string()));
        }

        let produced = input.with_extension(EXECUTABLE_EXT);
        if !produced.is_file() {
            return Err(ScriptError::Compilation(format!(
                "compiler produced no output at {}",
                produced.display()
            )));
        }
        Ok(produced)
    }
}

/// Runs the configured runtime on the finished module, forwarding the
/// script's own arguments and exporting the load context for the child.
pub struct RuntimeLoader {
    pub command: String,
    pub args: Vec<String>,
    pub script_args: Vec<String>,
}

#[async_trait]
impl ModuleLoader for RuntimeLoader {
    async fn load(&self, script: &Path, ctx: &LoadContext) -> Result<()> {
        let status = Command::new(&self.command)
            .args(&self.args)
            .arg(script)
            .args(&self.script_args)
            .env("TOCCATA_SCRIPT_FILE", &ctx.script_file)
            .env("TOCCATA_SCRIPT_DIR", &ctx.script_dir)
            .status()
            .await?;

        if status.success() {
            Ok(())
        } else {
            Err(ScriptError::Execution(format!(
                "script failed with exit code {}",
                status.code().unwrap_or(1)
            )))
        }
    }
}
