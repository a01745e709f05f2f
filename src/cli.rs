//! Minimal CLI: schema → three shim artifacts
use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use clap::Parser;
use colored::Colorize;
use indexmap::IndexMap;
use indexmap::map::Entry;
use rayon::prelude::*;
use tracing::info;

use crate::generate::{self, Options};
use crate::naming;

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate typed C++ shims (declaration, implementation, gMock double) from a Wayland protocol description
#[derive(Parser, Debug)]
#[command(name = "gen-shim", version)]
pub struct CommandLineInterface {
    /// protocol schema (.xml, or .json); a quoted glob pattern selects several
    schema: String,

    /// directory the generated files are written to
    out_dir: PathBuf,

    /// also write the resolved structured description as `<stem>-shim.json`
    #[arg(long, default_value_t = false)]
    dump_ir: bool,

    /// run every stage but write nothing
    #[arg(long, default_value_t = false)]
    dry_run: bool,

    /// more log output (-v: info, -vv: debug); RUST_LOG takes precedence
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn init_logging(&self) {
        let default_level = match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        };
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
            )
            .with_writer(std::io::stderr)
            .with_target(false)
            .init();
    }

    pub fn options(&self) -> Options {
        Options {
            dump_ir: self.dump_ir,
            dry_run: self.dry_run,
        }
    }

    pub fn run(&self) -> anyhow::Result<()> {
        let schema_paths = resolve_file_path_pattern(&self.schema)
            .with_context(|| format!("failed to resolve schema path `{}`", self.schema))?;
        ensure_distinct_stems(&schema_paths)?;
        let options = self.options();

        // each protocol is independent; nothing is shared between them
        let results: Vec<(PathBuf, Result<Vec<PathBuf>, crate::error::GenError>)> = schema_paths
            .into_par_iter()
            .map(|path| {
                let result = generate::generate(&path, &self.out_dir, &options);
                (path, result)
            })
            .collect();

        let mut failures = 0usize;
        for (path, result) in &results {
            match result {
                Ok(written) => {
                    info!(schema = %path.display(), artifacts = written.len(), "generated");
                    if self.dry_run {
                        for target in written {
                            println!("{}", target.display());
                        }
                    }
                }
                Err(err) => {
                    failures += 1;
                    eprintln!("{} {err}", "error:".red().bold());
                }
            }
        }

        if failures > 0 {
            bail!("{failures} of {} protocol(s) failed", results.len());
        }
        Ok(())
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn resolve_file_path_pattern(pattern: &str) -> anyhow::Result<Vec<PathBuf>> {
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
    }

    if !has_glob_chars(pattern) {
        // Treat as a literal path
        return Ok(vec![Path::new(pattern).to_path_buf()]);
    }

    let mut out = Vec::<PathBuf>::new();
    for entry in glob::glob(pattern)? {
        out.push(entry?);
    }
    if out.is_empty() {
        // Pattern was explicitly a glob but matched nothing -> surface as an error
        bail!("glob pattern matched no files: {pattern}");
    }
    out.sort();
    Ok(out)
}

/// Artifacts are named after the file stem, so two schemas sharing one would
/// write the same files.
fn ensure_distinct_stems(schema_paths: &[PathBuf]) -> anyhow::Result<()> {
    let mut seen = IndexMap::<String, &Path>::new();
    for path in schema_paths {
        // no stem is reported per protocol by `generate`
        let Some(stem) = naming::file_stem(path) else {
            continue;
        };
        match seen.entry(stem) {
            Entry::Occupied(first) => bail!(
                "schemas `{}` and `{}` share the file stem `{}` and would write the same artifacts",
                first.get().display(),
                path.display(),
                first.key(),
            ),
            Entry::Vacant(slot) => {
                slot.insert(path);
            }
        }
    }
    Ok(())
}

// ------------------------------- Tests ------------------------------------ //
