//! In-memory stand-ins for backends and nodes, shared by unit tests.

use std::io::{Cursor, Read};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::VfsError;
use crate::file::VirtualFile;
use crate::fs::FileSystem;
use crate::node::Node;
use crate::path::VirtualPath;

/// A backend where nothing exists and every effect declines.
#[derive(Default)]
pub(crate) struct StubFileSystem;

impl FileSystem for StubFileSystem {
    fn open(
        &self,
        _mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<Box<dyn Read + Send>, VfsError> {
        Err(VfsError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("stub has no contents for '{}'", target),
        )))
    }

    fn exists(&self, _mount_point: &VirtualFile, _target: &VirtualFile) -> Result<bool, VfsError> {
        Ok(false)
    }

    fn is_directory(
        &self,
        _mount_point: &VirtualFile,
        _target: &VirtualFile,
    ) -> Result<bool, VfsError> {
        Ok(false)
    }

    fn size(&self, _mount_point: &VirtualFile, _target: &VirtualFile) -> Result<u64, VfsError> {
        Ok(0)
    }

    fn last_modified(
        &self,
        _mount_point: &VirtualFile,
        _target: &VirtualFile,
    ) -> Result<SystemTime, VfsError> {
        Ok(SystemTime::UNIX_EPOCH)
    }

    fn directory_entries(
        &self,
        _mount_point: &VirtualFile,
        _target: &VirtualFile,
    ) -> Result<Vec<String>, VfsError> {
        Ok(Vec::new())
    }

    fn delete(&self, _mount_point: &VirtualFile, _target: &VirtualFile) -> Result<bool, VfsError> {
        Ok(false)
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn mount_source(&self) -> Option<PathBuf> {
        None
    }
}

/// A fixed in-memory tree for exercising the resolution walk.
pub(crate) struct MemoryNode {
    file: VirtualFile,
    directory: bool,
    content: Vec<u8>,
    children: Vec<Arc<MemoryNode>>,
}

impl MemoryNode {
    pub(crate) fn dir(path: VirtualPath, children: Vec<Arc<MemoryNode>>) -> Arc<Self> {
        Arc::new(MemoryNode {
            file: VirtualFile::new(path),
            directory: true,
            content: Vec::new(),
            children,
        })
    }

    pub(crate) fn leaf(path: VirtualPath, content: &[u8]) -> Arc<Self> {
        Arc::new(MemoryNode {
            file: VirtualFile::new(path),
            directory: false,
            content: content.to_vec(),
            children: Vec::new(),
        })
    }
}

impl Node for MemoryNode {
    fn name(&self) -> String {
        self.file.name().to_string()
    }

    fn file(&self) -> VirtualFile {
        self.file.clone()
    }

    fn child(&self, name: &str) -> Result<Option<Arc<dyn Node>>, VfsError> {
        Ok(self
            .children
            .iter()
            .find(|c| c.name() == name)
            .map(|c| c.clone() as Arc<dyn Node>))
    }

    fn children(&self, recursive: bool) -> Result<Vec<Arc<dyn Node>>, VfsError> {
        let mut nodes: Vec<Arc<dyn Node>> = Vec::new();
        for child in &self.children {
            nodes.push(child.clone());
            if recursive && child.directory {
                nodes.extend(child.children(true)?);
            }
        }
        Ok(nodes)
    }

    fn exists(&self) -> Result<bool, VfsError> {
        Ok(true)
    }

    fn is_directory(&self) -> Result<bool, VfsError> {
        Ok(self.directory)
    }

    fn is_file(&self) -> Result<bool, VfsError> {
        Ok(!self.directory)
    }

    fn size(&self) -> Result<u64, VfsError> {
        Ok(self.content.len() as u64)
    }

    fn last_modified(&self) -> Result<SystemTime, VfsError> {
        Ok(SystemTime::UNIX_EPOCH)
    }

    fn open(&self) -> Result<Box<dyn Read + Send>, VfsError> {
        Ok(Box::new(Cursor::new(self.content.clone())))
    }

    fn delete(&self) -> Result<bool, VfsError> {
        Ok(false)
    }
}
