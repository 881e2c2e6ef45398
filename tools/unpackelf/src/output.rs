//! Writing artifacts to the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use unpackelf_bootimg::{Artifact, Contents};

use crate::verbose::vprintln;

/// Path of the artifact `key` for the image named `image_name`.
pub fn artifact_path(dir: &Path, image_name: &str, key: &str) -> PathBuf {
    dir.join(format!("{image_name}-{key}"))
}

/// Write every artifact into `dir`, creating it if needed.
///
/// Binary payloads are written verbatim; text values and raw lines get a
/// trailing newline.
pub fn write_artifacts(dir: &Path, image_name: &str, artifacts: &[Artifact<'_>]) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("creating output directory {}", dir.display()))?;

    for artifact in artifacts {
        let path = artifact_path(dir, image_name, &artifact.key);
        let len = match &artifact.contents {
            Contents::Binary(data) => {
                fs::write(&path, data)
                    .with_context(|| format!("Could not open file {} for writing", path.display()))?;
                data.len()
            }
            Contents::Text(value) => {
                let line = format!("{value}\n");
                fs::write(&path, &line)
                    .with_context(|| format!("Could not open file {} for writing", path.display()))?;
                line.len()
            }
            Contents::Line(data) => {
                let mut line = Vec::with_capacity(data.len() + 1);
                line.extend_from_slice(data);
                line.push(b'\n');
                fs::write(&path, &line)
                    .with_context(|| format!("Could not open file {} for writing", path.display()))?;
                line.len()
            }
        };
        vprintln!("  wrote {} ({len} bytes)", path.display());
    }

    Ok(())
}
