//! Package-runner shim for Windows shells.

use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tracing::info;

/// Batch file name written by [`write_npx_shim`].
pub const SHIM_FILE_NAME: &str = "codex.cmd";

const SHIM_BODY: &str = "@echo off\r\nnpx codex --no-update-notifier %*\r\n";

/// Write a `codex.cmd` that forwards every argument to `npx codex`.
///
/// Creates `dir` if needed and returns the path of the shim.
pub fn write_npx_shim(dir: &Path) -> std::io::Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(SHIM_FILE_NAME);
    std::fs::write(&path, SHIM_BODY)?;
    info!(path = %path.display(), "wrote npx shim");
    Ok(path)
}

/// Whether `dir` is one of the entries of the current `PATH`.
pub fn path_in_env(dir: &Path) -> bool {
    std::env::var_os("PATH").is_some_and(|path| path_list_contains(&path, dir))
}

fn path_list_contains(path: &OsStr, dir: &Path) -> bool {
    std::env::split_paths(path).any(|entry| same_dir(&entry, dir))
}

fn same_dir(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    match (std::fs::canonicalize(a), std::fs::canonicalize(b)) {
        (Ok(a), Ok(b)) => a == b,
        _ => false,
    }
}
