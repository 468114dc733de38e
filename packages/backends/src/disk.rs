//! Backend over a real directory tree.

use std::io::Read;
use std::path::PathBuf;
use std::time::SystemTime;

use mountfs_core::{native_relative, FileSystem, VfsError, VirtualFile};

use crate::native;

/// A filesystem rooted at one native directory.
///
/// Read/write capable. Close is a no-op: a real filesystem cannot be
/// closed.
pub struct DiskFileSystem {
    root: PathBuf,
}

impl DiskFileSystem {
    /// Construct a disk filesystem with the given native root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        log::trace!("constructed disk filesystem at root {}", root.display());
        DiskFileSystem { root }
    }

    fn native_path(
        &self,
        mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<PathBuf, VfsError> {
        if target == mount_point {
            Ok(self.root.clone())
        } else {
            Ok(self.root.join(native_relative(mount_point, target)?))
        }
    }
}

impl FileSystem for DiskFileSystem {
    fn open(
        &self,
        mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<Box<dyn Read + Send>, VfsError> {
        native::open(&self.native_path(mount_point, target)?)
    }

    fn exists(&self, mount_point: &VirtualFile, target: &VirtualFile) -> Result<bool, VfsError> {
        native::exists(&self.native_path(mount_point, target)?)
    }

    fn is_directory(
        &self,
        mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<bool, VfsError> {
        native::is_directory(&self.native_path(mount_point, target)?)
    }

    fn size(&self, mount_point: &VirtualFile, target: &VirtualFile) -> Result<u64, VfsError> {
        native::size(&self.native_path(mount_point, target)?)
    }

    fn last_modified(
        &self,
        mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<SystemTime, VfsError> {
        native::last_modified(&self.native_path(mount_point, target)?)
    }

    fn directory_entries(
        &self,
        mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<Vec<String>, VfsError> {
        native::directory_entries(&self.native_path(mount_point, target)?)
    }

    fn delete(&self, mount_point: &VirtualFile, target: &VirtualFile) -> Result<bool, VfsError> {
        native::delete_if_exists(&self.native_path(mount_point, target)?)
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn mount_source(&self) -> Option<PathBuf> {
        Some(self.root.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use mountfs_core::vpath;

    use super::*;

    fn mount() -> VirtualFile {
        VirtualFile::new(vpath!("deploy"))
    }

    fn target(path: &str) -> VirtualFile {
        VirtualFile::new(vpath!("deploy").join(&vpath!(path)))
    }

    #[test]
    fn mount_root_target_is_the_native_root() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.txt"), b"").unwrap();
        let disk = DiskFileSystem::new(dir.path());

        assert!(disk.exists(&mount(), &mount()).unwrap());
        assert!(disk.is_directory(&mount(), &mount()).unwrap());
        assert_eq!(
            disk.directory_entries(&mount(), &mount()).unwrap(),
            vec!["a.txt"]
        );
    }

    #[test]
    fn attributes_of_a_nested_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        fs::write(dir.path().join("sub/x.txt"), b"hello disk").unwrap();
        let disk = DiskFileSystem::new(dir.path());

        let file = target("sub/x.txt");
        assert!(disk.exists(&mount(), &file).unwrap());
        assert!(!disk.is_directory(&mount(), &file).unwrap());
        assert!(disk.is_file(&mount(), &file).unwrap());
        assert_eq!(disk.size(&mount(), &file).unwrap(), 10);
        assert!(disk.last_modified(&mount(), &file).is_ok());
    }

    #[test]
    fn open_reads_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.txt"), b"payload").unwrap();
        let disk = DiskFileSystem::new(dir.path());

        let mut stream = disk.open(&mount(), &target("x.txt")).unwrap();
        let mut contents = Vec::new();
        stream.read_to_end(&mut contents).unwrap();
        assert_eq!(contents, b"payload");
    }

    #[test]
    fn delete_is_true_exactly_when_the_target_existed() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("x.txt"), b"x").unwrap();
        let disk = DiskFileSystem::new(dir.path());

        assert!(disk.delete(&mount(), &target("x.txt")).unwrap());
        assert!(!disk.delete(&mount(), &target("x.txt")).unwrap());
        assert!(!disk.exists(&mount(), &target("x.txt")).unwrap());
    }

    #[test]
    fn attribute_read_failure_is_a_fault() {
        let dir = tempfile::tempdir().unwrap();
        let disk = DiskFileSystem::new(dir.path());

        assert!(matches!(
            disk.is_directory(&mount(), &target("absent")),
            Err(VfsError::Io(_))
        ));
        assert!(!disk.exists(&mount(), &target("absent")).unwrap());
    }

    #[test]
    fn writable_with_a_source_and_noop_close() {
        let dir = tempfile::tempdir().unwrap();
        let disk = DiskFileSystem::new(dir.path());

        assert!(!disk.is_read_only());
        assert_eq!(disk.mount_source(), Some(dir.path().to_path_buf()));
        disk.close().unwrap();
        assert!(disk.exists(&mount(), &mount()).unwrap());
    }

    #[test]
    fn code_signers_decline_by_default() {
        let dir = tempfile::tempdir().unwrap();
        let disk = DiskFileSystem::new(dir.path());
        assert!(disk.code_signers(&mount(), &mount()).unwrap().is_none());
    }
}
