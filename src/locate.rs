//! Deterministic discovery of the predictor's output artifact. The predictor
//! may scatter files under `outdir`; we always pick the lexicographically
//! first image so repeated runs agree.

use crate::error::Error;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

const RESULT_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "bmp"];

/// Walk `output_root` recursively in sorted order and return the first
/// regular file with an image extension. A zero predictor exit does not
/// guarantee output exists, so "nothing found" is its own failure.
pub fn find_result(output_root: &Path) -> Result<PathBuf, Error> {
    match walk(output_root)? {
        Some(path) => Ok(path),
        None => Err(Error::ResultNotFound(output_root.to_path_buf())),
    }
}

fn walk(dir: &Path) -> io::Result<Option<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .map(|entry| entry.map(|e| e.path()))
        .collect::<io::Result<_>>()?;
    entries.sort();

    for path in entries {
        if path.is_dir() {
            if let Some(found) = walk(&path)? {
                return Ok(Some(found));
            }
        } else if has_image_extension(&path) {
            return Ok(Some(path));
        }
    }
    Ok(None)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            RESULT_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}
