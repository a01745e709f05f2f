//! One protocol, end to end: load → transcribe → render → write.
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{GenError, Result};
use crate::ir::Protocol;
use crate::naming::{self, ArtifactNames};
use crate::render;
use crate::schema;
use crate::transcribe::transcribe;

#[derive(Debug, Clone, Copy, Default)]
pub struct Options {
    /// also write the structured description as `<stem>-shim.json`
    pub dump_ir: bool,
    /// render everything, write nothing
    pub dry_run: bool,
}

/// Artifact file name → contents, in write order.
pub type Artifacts = Vec<(String, String)>;

pub fn load_protocol(schema_path: &Path) -> Result<Protocol> {
    let stem = naming::file_stem(schema_path)
        .ok_or_else(|| GenError::NoFileStem(schema_path.to_path_buf()))?;
    let tree = schema::load(schema_path)?;
    if !tree.name.is_empty() && tree.name != stem {
        debug!(protocol = %tree.name, %stem, "protocol name differs from file stem");
    }
    transcribe(&tree, &stem)
}

pub fn render_artifacts(protocol: &Protocol, options: &Options) -> Result<Artifacts> {
    let names = ArtifactNames::for_stem(&protocol.name_hyphen);
    let rendered = render::render_all(protocol);
    let mut artifacts = vec![
        (names.declaration, rendered.declaration),
        (names.implementation, rendered.implementation),
        (names.test_double, rendered.test_double),
    ];
    if options.dump_ir {
        let mut json = serde_json::to_string_pretty(protocol)?;
        json.push('\n');
        artifacts.push((names.ir_dump, json));
    }
    Ok(artifacts)
}

/// Generate all artifacts for one schema file. Returns the paths written
/// (or that would be written, for a dry run).
pub fn generate(schema_path: &Path, out_dir: &Path, options: &Options) -> Result<Vec<PathBuf>> {
    let protocol = load_protocol(schema_path)?;
    let artifacts = render_artifacts(&protocol, options)?;
    if options.dry_run {
        return Ok(artifacts.iter().map(|(name, _)| out_dir.join(name)).collect());
    }
    write_artifacts(out_dir, &artifacts)
}

/// Write every artifact or none. Contents go to `*.tmp` siblings first. Once
/// all of them are on disk each target is swapped in, with any file it
/// replaces parked as `*.bak` until the last swap succeeded. A failed swap
/// puts the previous files back.
pub fn write_artifacts(out_dir: &Path, artifacts: &[(String, String)]) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out_dir).map_err(|source| GenError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut staged: Vec<Staged> = Vec::with_capacity(artifacts.len());
    for (name, contents) in artifacts {
        let tmp = out_dir.join(format!("{name}.tmp"));
        if let Err(source) = std::fs::write(&tmp, contents) {
            discard(staged.iter().map(|s| s.tmp.as_path()).chain([tmp.as_path()]));
            return Err(GenError::Io { path: tmp, source });
        }
        staged.push(Staged {
            tmp,
            target: out_dir.join(name),
            backup: out_dir.join(format!("{name}.bak")),
            replaced: false,
        });
    }

    for i in 0..staged.len() {
        if let Err(source) = staged[i].swap_in() {
            let path = staged[i].target.clone();
            roll_back(&staged[..=i]);
            discard(staged[i..].iter().map(|s| s.tmp.as_path()));
            return Err(GenError::Io { path, source });
        }
    }

    discard(staged.iter().filter(|s| s.replaced).map(|s| s.backup.as_path()));
    Ok(staged
        .into_iter()
        .map(|s| {
            info!(path = %s.target.display(), "wrote artifact");
            s.target
        })
        .collect())
}

/// One artifact between staging and commit.
struct Staged {
    tmp: PathBuf,
    target: PathBuf,
    backup: PathBuf,
    /// an earlier file at `target` now sits at `backup`
    replaced: bool,
}

impl Staged {
    fn swap_in(&mut self) -> std::io::Result<()> {
        if std::fs::symlink_metadata(&self.target).is_ok() {
            std::fs::rename(&self.target, &self.backup)?;
            self.replaced = true;
        }
        std::fs::rename(&self.tmp, &self.target)
    }
}

/// Undo the swaps of `done`. The last entry may have failed half way, in
/// which case its target was never written.
fn roll_back(done: &[Staged]) {
    for (i, staged) in done.iter().enumerate().rev() {
        let committed = i + 1 < done.len();
        if committed {
            discard([staged.target.as_path()]);
        }
        if staged.replaced {
            if let Err(err) = std::fs::rename(&staged.backup, &staged.target) {
                warn!(path = %staged.target.display(), %err, "failed to restore previous artifact");
            }
        }
    }
}

fn discard<'a>(paths: impl IntoIterator<Item = &'a Path>) {
    for path in paths {
        if let Err(err) = std::fs::remove_file(path) {
            if err.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %path.display(), %err, "failed to remove staged artifact");
            }
        }
    }
}

// ------------------------------- Tests ------------------------------------ //
