use std::path::{Path, PathBuf};

use serde::Deserialize;

/// The parsed Toccata.toml manifest.
///
/// Both sections are optional; a missing manifest is not an error for
/// callers (they fall back to `Manifest::default()`).
#[derive(Debug, Clone, Default)]
pub struct Manifest {
    pub runtime: RuntimeSection,
    pub compiler: CompilerSection,
    /// The directory containing the Toccata.toml file.
    pub root_dir: PathBuf,
}

/// `[runtime]` — the command that executes a resolved module.
#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeSection {
    #[serde(default = "default_runtime_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// `[compiler]` — the command that transpiles typed sources.
#[derive(Debug, Clone, Deserialize)]
pub struct CompilerSection {
    #[serde(default = "default_compiler_command")]
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_runtime_command() -> String {
    "node".to_string()
}

fn default_compiler_command() -> String {
    "tsc".to_string()
}

impl Default for RuntimeSection {
    fn default() -> Self {
        Self {
            command: default_runtime_command(),
            args: Vec::new(),
        }
    }
}

impl Default for CompilerSection {
    fn default() -> Self {
        Self {
            command: default_compiler_command(),
            args: Vec::new(),
        }
    }
}

/// Raw TOML structure for deserialization.
#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    runtime: Option<RuntimeSection>,
    #[serde(default)]
    compiler: Option<CompilerSection>,
}

/// Errors that can occur when loading a manifest.
#[derive(Debug, thiserror::Error)]
pub enum ManifestError {
    #[error("no Toccata.toml found (searched from {0})")]
    NotFound(String),
    #[error("failed to read Toccata.toml: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("invalid Toccata.toml: {0}")]
    ParseError(String),
    #[error("invalid Toccata.toml: [{0}] command must not be empty")]
    EmptyCommand(String),
}

/// Walk up from `start_dir` looking for `Toccata.toml`.
/// Returns the path to the manifest file if found.
pub fn find_manifest(start_dir: &Path) -> Option<PathBuf> {
    let mut current = start_dir.to_path_buf();
    loop {
        let candidate = current.join("Toccata.toml");
        if candidate.is_file() {
            return Some(candidate);
        }
        if !current.pop() {
            return None;
        }
    }
}

/// Load and validate a Toccata.toml manifest from a file path.
pub fn load_manifest(path: &Path) -> Result<Manifest, ManifestError> {
    let content = std::fs::read_to_string(path)?;
    let root_dir = path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .to_path_buf();
    parse_manifest(&content, root_dir)
}

/// Parse and validate a Toccata.toml manifest from a string.
pub fn parse_manifest(content: &str, root_dir: PathBuf) -> Result<Manifest, ManifestError> {
    let raw: RawManifest =
        toml::from_str(content).map_err(|e| ManifestError::ParseError(e.to_string()))?;

    let runtime = raw.runtime.unwrap_or_default();
    let compiler = raw.compiler.unwrap_or_default();

    if runtime.command.trim().is_empty() {
        return Err(ManifestError::EmptyCommand("runtime".to_string()));
    }
    if compiler.command.trim().is_empty() {
        return Err(ManifestError::EmptyCommand("compiler".to_string()));
    }

    Ok(Manifest {
        runtime,
        compiler,
        root_dir,
    })
}

/// Find and load the manifest starting from a script's directory.
pub fn find_and_load_manifest(script: &Path) -> Result<Manifest, ManifestError> {
    let start_dir = script.parent().unwrap_or_else(|| Path::new("."));
    let manifest_path = find_manifest(start_dir)
        .ok_or_else(|| ManifestError::NotFound(start_dir.display().to_string()))?;
    load_manifest(&manifest_path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_empty_manifest_uses_defaults() {
        let manifest = parse_manifest("", PathBuf::from(".")).unwrap();
        assert_eq!(manifest.runtime.command, "node");
        assert!(manifest.runtime.args.is_empty());
        assert_eq!(manifest.compiler.command, "tsc");
        assert!(manifest.compiler.args.is_empty());
    }

    #[test]
    fn parse_full_manifest() {
        let toml = r#"
[runtime]
command = "deno"
args = ["run", "--allow-all"]

[compiler]
command = "swc"
args = ["--config-file", "swc.json"]
"#;
        let manifest = parse_manifest(toml, PathBuf::from("/proj")).unwrap();
        assert_eq!(manifest.runtime.command, "deno");
        assert_eq!(manifest.runtime.args, vec!["run", "--allow-all"]);
        assert_eq!(manifest.compiler.command, "swc");
        assert_eq!(manifest.root_dir, PathBuf::from("/proj"));
    }

    #[test]
    fn partial_manifest_keeps_other_defaults() {
        let toml = r#"
[runtime]
command = "bun"
"#;
        let manifest = parse_manifest(toml, PathBuf::from(".")).unwrap();
        assert_eq!(manifest.runtime.command, "bun");
        assert_eq!(manifest.compiler.command, "tsc");
    }

    #[test]
    fn empty_command_is_rejected() {
        let toml = r#"
[runtime]
command = ""
"#;
        let err = parse_manifest(toml, PathBuf::from(".")).unwrap_err();
        assert!(matches!(err, ManifestError::EmptyCommand(ref s) if s == "runtime"));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = parse_manifest("[runtime", PathBuf::from(".")).unwrap_err();
        assert!(matches!(err, ManifestError::ParseError(_)));
    }

    #[test]
    fn find_manifest_walks_up() {
        let dir = std::env::temp_dir().join(format!("toccata-manifest-test-{}", std::process::id()));
        let nested = dir.join("a/b");
        std::fs::create_dir_all(&nested).unwrap();
        std::fs::write(dir.join("Toccata.toml"), "[runtime]\ncommand = \"node\"\n").unwrap();

        let found = find_manifest(&nested).unwrap();
        assert_eq!(found, dir.join("Toccata.toml"));

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
