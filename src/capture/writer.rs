//! All-or-nothing file output.
//!
//! Every file is first written to `<path>.partial` and synced. Only when all
//! of them are on disk are they renamed over their destinations, so a failed
//! capture never leaves a truncated file where a previous map used to be.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CaptureError;

/// Temporary path a file is staged at before being committed.
pub(crate) fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}

/// Write every `(path, bytes)` pair, committing only after all were staged.
pub(crate) fn write_files(files: &[(&Path, &[u8])]) -> Result<(), CaptureError> {
    let mut staged: Vec<(PathBuf, &Path)> = Vec::with_capacity(files.len());

    for &(path, bytes) in files {
        match stage(path, bytes) {
            Ok(tmp) => staged.push((tmp, path)),
            Err(e) => {
                discard(&staged);
                return Err(e);
            }
        }
    }

    for (i, (tmp, path)) in staged.iter().enumerate() {
        if let Err(source) = fs::rename(tmp, path) {
            discard(&staged[i..]);
            return Err(CaptureError::WriteFailed {
                path: path.to_path_buf(),
                source,
            });
        }
    }
    Ok(())
}

fn stage(path: &Path, bytes: &[u8]) -> Result<PathBuf, CaptureError> {
    let write_failed = |source: std::io::Error| CaptureError::WriteFailed {
        path: path.to_path_buf(),
        source,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(write_failed)?;
    }

    let tmp = partial_path(path);
    let result = File::create(&tmp).and_then(|mut file| {
        file.write_all(bytes)?;
        file.sync_all()
    });
    if let Err(source) = result {
        let _ = fs::remove_file(&tmp);
        return Err(write_failed(source));
    }
    Ok(tmp)
}

fn discard(staged: &[(PathBuf, &Path)]) {
    for (tmp, _) in staged {
        if let Err(e) = fs::remove_file(tmp) {
            log::warn!("Failed to remove {}: {}", tmp.display(), e);
        }
    }
}
