//! Startup scan of the output directory.

use std::fs;
use std::path::{Path, PathBuf};

use super::IMAGE_EXTENSION;
use crate::error::StoreError;

/// Recognized image files directly under `dir`, sorted by file name.
pub(crate) fn list_images(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
    let scan_err = |source| StoreError::Scan {
        path: dir.to_path_buf(),
        source,
    };
    let mut out = Vec::new();
    for entry in fs::read_dir(dir).map_err(scan_err)? {
        let entry = entry.map_err(scan_err)?;
        let path = entry.path();
        if !entry.file_type().map_err(scan_err)?.is_file() {
            continue;
        }
        if has_image_extension(&path) {
            out.push(path);
        }
    }
    out.sort();
    Ok(out)
}

/// True if the extension is `jpg`, ignoring case.
pub fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(IMAGE_EXTENSION))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extension_case_insensitive() {
        assert!(has_image_extension(Path::new("a.jpg")));
        assert!(has_image_extension(Path::new("a.JPG")));
        assert!(!has_image_extension(Path::new("a.jpeg")));
        assert!(!has_image_extension(Path::new("a.png")));
        assert!(!has_image_extension(Path::new("jpg")));
    }

    #[test]
    fn lists_only_image_files_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.jpg"), b"1").unwrap();
        fs::write(dir.path().join("a.JPG"), b"2").unwrap();
        fs::write(dir.path().join("notes.txt"), b"3").unwrap();
        fs::create_dir(dir.path().join("sub.jpg")).unwrap();
        let found = list_images(dir.path()).unwrap();
        assert_eq!(
            found,
            vec![dir.path().join("a.JPG"), dir.path().join("b.jpg")]
        );
    }
}
