//! The composite-root backend: many physical roots behind one mount.

use std::io::Read;
use std::path::PathBuf;
use std::time::SystemTime;

use mountfs_core::{FileSystem, VfsError, VirtualFile, NEEDS_CONVERSION};

use crate::native;

/// A stateless filesystem serving arbitrary absolute virtual paths
/// directly as native paths.
///
/// One shared value can serve several independent volumes under a
/// single logical mount; construct it once at startup and pass it by
/// reference. There is no single mount source to report.
#[derive(Debug, Default, Clone, Copy)]
pub struct RootFileSystem;

impl RootFileSystem {
    pub fn new() -> Self {
        RootFileSystem
    }

    fn native_path(&self, target: &VirtualFile) -> PathBuf {
        let components = &target.path().components;
        if NEEDS_CONVERSION {
            PathBuf::from(components.join(std::path::MAIN_SEPARATOR_STR))
        } else {
            PathBuf::from(format!("/{}", components.join("/")))
        }
    }
}

impl FileSystem for RootFileSystem {
    fn open(
        &self,
        _mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<Box<dyn Read + Send>, VfsError> {
        native::open(&self.native_path(target))
    }

    fn exists(&self, _mount_point: &VirtualFile, target: &VirtualFile) -> Result<bool, VfsError> {
        native::exists(&self.native_path(target))
    }

    fn is_directory(
        &self,
        _mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<bool, VfsError> {
        native::is_directory(&self.native_path(target))
    }

    fn size(&self, _mount_point: &VirtualFile, target: &VirtualFile) -> Result<u64, VfsError> {
        native::size(&self.native_path(target))
    }

    fn last_modified(
        &self,
        _mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<SystemTime, VfsError> {
        native::last_modified(&self.native_path(target))
    }

    fn directory_entries(
        &self,
        _mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<Vec<String>, VfsError> {
        native::directory_entries(&self.native_path(target))
    }

    fn delete(&self, _mount_point: &VirtualFile, target: &VirtualFile) -> Result<bool, VfsError> {
        native::delete_if_exists(&self.native_path(target))
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn mount_source(&self) -> Option<PathBuf> {
        None
    }
}
