//! Native-filesystem operations shared by the disk and composite-root
//! backends.
//!
//! Both backends differ only in how they anchor a target under a native
//! root; everything after that anchoring is the same metadata read,
//! stream open, listing and delete against `std::fs`.

use std::fs;
use std::io::Read;
use std::path::Path;
use std::time::SystemTime;

use mountfs_core::VfsError;

pub(crate) fn open(path: &Path) -> Result<Box<dyn Read + Send>, VfsError> {
    Ok(Box::new(fs::File::open(path)?))
}

pub(crate) fn exists(path: &Path) -> Result<bool, VfsError> {
    Ok(path.try_exists()?)
}

pub(crate) fn is_directory(path: &Path) -> Result<bool, VfsError> {
    Ok(fs::metadata(path)?.is_dir())
}

pub(crate) fn size(path: &Path) -> Result<u64, VfsError> {
    Ok(fs::metadata(path)?.len())
}

pub(crate) fn last_modified(path: &Path) -> Result<SystemTime, VfsError> {
    Ok(fs::metadata(path)?.modified()?)
}

/// Immediate child names, sorted for deterministic listings. The
/// directory iterator is fully drained; on error it is dropped and its
/// native handle released either way.
pub(crate) fn directory_entries(path: &Path) -> Result<Vec<String>, VfsError> {
    let mut names = Vec::new();
    for entry in fs::read_dir(path)? {
        names.push(entry?.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Delete a file or empty directory if present, reporting whether
/// anything was actually removed.
pub(crate) fn delete_if_exists(path: &Path) -> Result<bool, VfsError> {
    let metadata = match fs::symlink_metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(e.into()),
    };
    if metadata.is_dir() {
        fs::remove_dir(path)?;
    } else {
        fs::remove_file(path)?;
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delete_reports_whether_something_was_removed() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("gone.txt");
        fs::write(&file, b"x").unwrap();

        assert!(delete_if_exists(&file).unwrap());
        assert!(!delete_if_exists(&file).unwrap());
    }

    #[test]
    fn entries_are_sorted() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("b.txt"), b"").unwrap();
        fs::write(dir.path().join("a.txt"), b"").unwrap();

        assert_eq!(directory_entries(dir.path()).unwrap(), vec!["a.txt", "b.txt"]);
    }

    #[test]
    fn listing_a_file_is_an_io_fault() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, b"x").unwrap();

        assert!(matches!(
            directory_entries(&file),
            Err(VfsError::Io(_))
        ));
    }
}
