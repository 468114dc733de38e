//! Tree nodes: resolvable points in a mount's path tree.

use std::io::Read;
use std::sync::Arc;
use std::time::SystemTime;

use crate::error::VfsError;
use crate::file::VirtualFile;
use crate::fs::FileSystem;

/// A resolvable point in a mount's path tree.
///
/// Resolution walks the tree one segment at a time through `child` and
/// never touches a backend path outside the walk. The attribute methods
/// answer for the node itself, delegating to whichever backend serves
/// its mount.
pub trait Node: Send + Sync {
    /// The node's own name (final path component; empty for a root).
    fn name(&self) -> String;

    /// The opaque resource handle for this node.
    fn file(&self) -> VirtualFile;

    /// Look up an immediate child by name, or `None` when absent.
    fn child(&self, name: &str) -> Result<Option<Arc<dyn Node>>, VfsError>;

    /// Enumerate children, immediate or the whole subtree.
    fn children(&self, recursive: bool) -> Result<Vec<Arc<dyn Node>>, VfsError>;

    /// Whether this node currently exists in its backend.
    fn exists(&self) -> Result<bool, VfsError>;

    /// Whether this node is a directory.
    fn is_directory(&self) -> Result<bool, VfsError>;

    /// Whether this node is a plain file.
    fn is_file(&self) -> Result<bool, VfsError>;

    /// Size in bytes.
    fn size(&self) -> Result<u64, VfsError>;

    /// Last modification time.
    fn last_modified(&self) -> Result<SystemTime, VfsError>;

    /// Open this node's contents for reading.
    fn open(&self) -> Result<Box<dyn Read + Send>, VfsError>;

    /// Delete this node, reporting whether anything was removed.
    fn delete(&self) -> Result<bool, VfsError>;
}

/// Generic `Node` over a mounted `FileSystem`.
///
/// Carries the mount root handle alongside its own, so every query can
/// hand the backend the pair it needs for native path computation.
pub struct BackendNode {
    fs: Arc<dyn FileSystem>,
    mount_point: VirtualFile,
    file: VirtualFile,
}

impl BackendNode {
    /// The root node of a mount: its file is the mount point itself.
    pub fn root(fs: Arc<dyn FileSystem>, mount_point: VirtualFile) -> Arc<Self> {
        Arc::new(BackendNode {
            fs,
            file: mount_point.clone(),
            mount_point,
        })
    }

    fn descend(&self, name: &str) -> Result<BackendNode, VfsError> {
        let path = self.file.path().child(name)?;
        Ok(BackendNode {
            fs: self.fs.clone(),
            mount_point: self.mount_point.clone(),
            file: VirtualFile::new(path),
        })
    }
}

impl Node for BackendNode {
    fn name(&self) -> String {
        self.file.name().to_string()
    }

    fn file(&self) -> VirtualFile {
        self.file.clone()
    }

    fn child(&self, name: &str) -> Result<Option<Arc<dyn Node>>, VfsError> {
        let child = self.descend(name)?;
        if self.fs.exists(&self.mount_point, &child.file)? {
            Ok(Some(Arc::new(child)))
        } else {
            Ok(None)
        }
    }

    fn children(&self, recursive: bool) -> Result<Vec<Arc<dyn Node>>, VfsError> {
        let names = self.fs.directory_entries(&self.mount_point, &self.file)?;
        let mut nodes: Vec<Arc<dyn Node>> = Vec::with_capacity(names.len());
        for name in names {
            let child = Arc::new(self.descend(&name)?);
            let descend_further = recursive && child.is_directory()?;
            nodes.push(child.clone());
            if descend_further {
                nodes.extend(child.children(true)?);
            }
        }
        Ok(nodes)
    }

    fn exists(&self) -> Result<bool, VfsError> {
        self.fs.exists(&self.mount_point, &self.file)
    }

    fn is_directory(&self) -> Result<bool, VfsError> {
        self.fs.is_directory(&self.mount_point, &self.file)
    }

    fn is_file(&self) -> Result<bool, VfsError> {
        self.fs.is_file(&self.mount_point, &self.file)
    }

    fn size(&self) -> Result<u64, VfsError> {
        self.fs.size(&self.mount_point, &self.file)
    }

    fn last_modified(&self) -> Result<SystemTime, VfsError> {
        self.fs.last_modified(&self.mount_point, &self.file)
    }

    fn open(&self) -> Result<Box<dyn Read + Send>, VfsError> {
        self.fs.open(&self.mount_point, &self.file)
    }

    fn delete(&self) -> Result<bool, VfsError> {
        self.fs.delete(&self.mount_point, &self.file)
    }
}
