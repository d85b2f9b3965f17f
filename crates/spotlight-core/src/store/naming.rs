//! Output filenames: sanitized title stem plus a numeric suffix on collision.

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use super::IMAGE_EXTENSION;
use crate::descriptor::ImageDescriptor;

/// Room left for the numeric suffix and `.jpg` under Linux NAME_MAX (255).
const STEM_MAX: usize = 230;

const FALLBACK_STEM: &str = "image";

/// Makes a title usable as a filename stem on Linux.
///
/// Only `/`, `\`, NUL and other control characters become `_`; whitespace,
/// dots and underscores are kept as-is. Truncates to `STEM_MAX` bytes on a
/// char boundary.
pub fn sanitize_stem(title: &str) -> String {
    let out: String = title
        .chars()
        .map(|c| if c == '/' || c == '\\' || c.is_control() { '_' } else { c })
        .collect();
    let mut take = out.len().min(STEM_MAX);
    while take > 0 && !out.is_char_boundary(take) {
        take -= 1;
    }
    out[..take].to_string()
}

/// Stem for a descriptor: sanitized title, else sanitized id, else `image`.
pub fn stem_for(descriptor: &ImageDescriptor) -> String {
    [descriptor.title(), descriptor.id()]
        .iter()
        .map(|s| sanitize_stem(s))
        .find(|s| !s.is_empty())
        .unwrap_or_else(|| FALLBACK_STEM.to_string())
}

/// `<dir>/<stem>.jpg` for n == 0, `<dir>/<stem><n>.jpg` otherwise.
pub fn candidate_path(dir: &Path, stem: &str, n: u64) -> PathBuf {
    if n == 0 {
        dir.join(format!("{}.{}", stem, IMAGE_EXTENSION))
    } else {
        dir.join(format!("{}{}.{}", stem, n, IMAGE_EXTENSION))
    }
}

/// Creates the first free `<stem>[n].jpg` in `dir` with create-new semantics,
/// so a name already on disk (ours or anyone else's) is never overwritten.
pub fn create_unique(dir: &Path, stem: &str) -> Result<(File, PathBuf), (PathBuf, io::Error)> {
    let mut n = 0u64;
    loop {
        let path = candidate_path(dir, stem, n);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => n += 1,
            Err(e) => return Err((path, e)),
        }
    }
}
