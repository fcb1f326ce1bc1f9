use std::path::PathBuf;
use std::process;

use clap::Parser;
use tokio::io::AsyncReadExt;

use toccata_common::manifest::{self, Manifest, ManifestError};
use toccata_common::{ScriptError, SourceRef};
use toccata_core::Resolver;

mod host;

use host::{CommandCompiler, RuntimeLoader};

/// Toccata script runner — runs plain, literate, and typed scripts.
#[derive(Parser)]
#[command(
    name = "toccata",
    version,
    about,
    long_about = "Toccata script runner.\n\nResolves a script's source format (markdown, typed superset, plain module,\nor extensionless), normalizes it into an executable module, and runs it with\nthe configured runtime.\n\nExamples:\n  toccata build.md                Run a literate markdown script\n  toccata deploy.ts               Transpile and run a typed script\n  toccata tasks --fast            Run an extensionless script with one arg\n  cat script.mjs | toccata        Run standard input\n  toccata -e \"console.log(1)\"     Evaluate inline script text"
)]
struct Cli {
    /// Path to the script ('-' or omitted reads standard input)
    script: Option<PathBuf>,

    /// Run the given script text instead of a file
    #[arg(short, long, value_name = "CODE", conflicts_with = "script")]
    eval: Option<String>,

    /// Extension assumed for extensionless and piped input
    #[arg(long, default_value = "mjs")]
    ext: String,

    /// Suppress the compiler progress line
    #[arg(short, long)]
    quiet: bool,

    /// Arguments forwarded to the script
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    args: Vec<String>,
}

#[tokio::main]
async fn main() -> Result<(), ScriptError> {
    let cli = Cli::parse();

    // Manifest lookup anchors at the script's directory; piped and inline
    // input anchor at the current directory. A missing Toccata.toml just
    // means defaults.
    let anchor = match &cli.script {
        Some(path) if path.as_os_str() != "-" => path.clone(),
        _ => std::env::current_dir()?.join("stdin"),
    };
    let manifest = match manifest::find_and_load_manifest(&anchor) {
        Ok(m) => m,
        Err(ManifestError::NotFound(_)) => Manifest::default(),
        Err(e) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
    };

    let resolver = Resolver::new(
        CommandCompiler {
            command: manifest.compiler.command,
            args: manifest.compiler.args,
            quiet: cli.quiet,
        },
        RuntimeLoader {
            command: manifest.runtime.command,
            args: manifest.runtime.args,
            script_args: cli.args,
        },
    )
    .with_default_extension(&cli.ext);

    let outcome = if let Some(code) = cli.eval {
        resolver.run_text(&code, "eval").await
    } else {
        match &cli.script {
            Some(path) if path.as_os_str() != "-" => {
                resolver.run(SourceRef::from_path(path)).await
            }
            _ => {
                let mut text = String::new();
                tokio::io::stdin().read_to_string(&mut text).await?;
                resolver.run_text(&text, "stdin").await
            }
        }
    };

    match outcome {
        Ok(()) => Ok(()),
        // Expected failure from the script itself: clean one-line message.
        Err(ScriptError::Execution(message)) => {
            eprintln!("{}", message);
            process::exit(1);
        }
        // User-fixable source problems.
        Err(e @ (ScriptError::UnrecognizedFormat { .. } | ScriptError::Compilation(_))) => {
            eprintln!("error: {}", e);
            process::exit(1);
        }
        // Environment problems crash loudly.
        Err(e @ ScriptError::Io(_)) => Err(e),
    }
}
