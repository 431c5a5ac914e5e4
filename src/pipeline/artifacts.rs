//! Artifact directory management

use std::path::{Path, PathBuf};

use crate::error::FilesystemError;

/// Default directory the report run writes chart images into.
pub const DEFAULT_PLOTS_DIR: &str = "static/plots";

/// Ensure `dir` exists, creating every missing parent.
///
/// Succeeds silently when the directory is already there, so repeated calls
/// are harmless.
pub fn ensure_artifact_dir(dir: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(dir).map_err(|source| FilesystemError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

/// Write `bytes` to `dir/name`, replacing any previous artifact of that name.
///
/// The write is not atomic: a concurrent reader may see a partial file.
pub fn write_artifact(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, FilesystemError> {
    let path = dir.join(name);
    std::fs::write(&path, bytes).map_err(|source| FilesystemError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
