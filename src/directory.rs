use std::path::Path;

use walkdir::WalkDir;

use crate::error::{PackageError, Result};

/// Sums the sizes of all regular files below `dir`. Symlinks are not followed.
pub fn directory_size(dir: &Path) -> Result<u64> {
    if !dir.is_dir() {
        return Err(PackageError::io(
            format!("Cannot measure {}", dir.display()),
            std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
        ));
    }

    let mut total = 0u64;
    for ent in WalkDir::new(dir) {
        let ent = ent?;
        if ent.file_type().is_file() {
            total += ent.metadata()?.len();
        }
    }
    Ok(total)
}
