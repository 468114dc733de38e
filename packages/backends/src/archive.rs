//! Read-only backend over a single tar archive.
//!
//! The archive's entry table is indexed into a navigable tree at
//! construction time; entry contents are read lazily by seeking into
//! the archive file, so nothing is extracted up front.

use std::collections::BTreeMap;
use std::io::{Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, SystemTime};

use mountfs_core::{CodeSigner, FileSystem, VfsError, VirtualFile, VirtualPath};

use crate::native;

#[derive(Debug)]
struct ArchiveEntry {
    offset: u64,
    size: u64,
    mtime: u64,
    is_dir: bool,
    children: BTreeMap<String, ArchiveEntry>,
}

impl ArchiveEntry {
    fn dir(mtime: u64) -> Self {
        ArchiveEntry {
            offset: 0,
            size: 0,
            mtime,
            is_dir: true,
            children: BTreeMap::new(),
        }
    }

    fn file(offset: u64, size: u64, mtime: u64) -> Self {
        ArchiveEntry {
            offset,
            size,
            mtime,
            is_dir: false,
            children: BTreeMap::new(),
        }
    }

    fn lookup(&self, path: &VirtualPath) -> Option<&ArchiveEntry> {
        let mut current = self;
        for component in &path.components {
            current = current.children.get(component)?;
        }
        Some(current)
    }

    /// Insert at `components`, synthesizing intermediate directories for
    /// archives that carry no explicit directory entries.
    fn insert(&mut self, components: &[String], entry: ArchiveEntry) {
        match components {
            [] => {
                self.mtime = entry.mtime;
                self.is_dir = entry.is_dir;
            }
            [name] => match self.children.get_mut(name) {
                // An explicit entry for a previously synthesized
                // directory refreshes its metadata but keeps children.
                Some(existing) if existing.is_dir && entry.is_dir => {
                    existing.mtime = entry.mtime;
                }
                _ => {
                    self.children.insert(name.clone(), entry);
                }
            },
            [name, rest @ ..] => {
                self.children
                    .entry(name.clone())
                    .or_insert_with(|| ArchiveEntry::dir(0))
                    .insert(rest, entry);
            }
        }
    }
}

/// A filesystem over one tar archive. Always read-only.
///
/// When the target is the mount root itself, queries answer for the
/// archive file on disk, which is the root node. The entry index is
/// released exactly once by `close`; queries on a closed instance are
/// caller errors surfaced as I/O faults.
pub struct ArchiveFileSystem {
    archive_path: PathBuf,
    index: Mutex<Option<ArchiveEntry>>,
}

impl ArchiveFileSystem {
    /// Open and index the archive at `archive_path`.
    pub fn open(archive_path: impl Into<PathBuf>) -> Result<Self, VfsError> {
        let archive_path = archive_path.into();
        let file = std::fs::File::open(&archive_path)?;
        let mut archive = tar::Archive::new(file);

        let mut root = ArchiveEntry::dir(0);
        let mut indexed = 0usize;
        for entry in archive.entries()? {
            let entry = entry?;
            let entry_type = entry.header().entry_type();
            let (is_dir, is_file) = (entry_type.is_dir(), entry_type.is_file());
            if !is_dir && !is_file {
                continue;
            }
            let components: Vec<String> = entry
                .path()?
                .components()
                .filter_map(|c| match c {
                    std::path::Component::Normal(name) => {
                        Some(name.to_string_lossy().into_owned())
                    }
                    _ => None,
                })
                .collect();
            if components.is_empty() {
                continue;
            }
            let mtime = entry.header().mtime().unwrap_or(0);
            let indexed_entry = if is_dir {
                ArchiveEntry::dir(mtime)
            } else {
                ArchiveEntry::file(entry.raw_file_position(), entry.size(), mtime)
            };
            root.insert(&components, indexed_entry);
            indexed += 1;
        }

        log::trace!(
            "indexed {} entries from archive {}",
            indexed,
            archive_path.display()
        );
        Ok(ArchiveFileSystem {
            archive_path,
            index: Mutex::new(Some(root)),
        })
    }

    /// The archive file backing this mount.
    pub fn archive_path(&self) -> &Path {
        &self.archive_path
    }

    fn relative(
        mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<VirtualPath, VfsError> {
        target
            .path_relative_to(mount_point)
            .ok_or_else(|| VfsError::InvalidArgument {
                message: format!("'{}' is not under mount point '{}'", target, mount_point),
            })
    }

    fn with_entry<T>(
        &self,
        relative: &VirtualPath,
        f: impl FnOnce(&ArchiveEntry) -> Result<T, VfsError>,
    ) -> Result<T, VfsError> {
        let guard = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        let root = guard.as_ref().ok_or_else(|| {
            VfsError::Io(std::io::Error::other(format!(
                "archive filesystem {} is closed",
                self.archive_path.display()
            )))
        })?;
        let entry = root.lookup(relative).ok_or_else(|| {
            VfsError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!(
                    "no entry '{}' in archive {}",
                    relative,
                    self.archive_path.display()
                ),
            ))
        })?;
        f(entry)
    }

    fn entry_exists(&self, relative: &VirtualPath) -> Result<bool, VfsError> {
        let guard = self.index.lock().unwrap_or_else(PoisonError::into_inner);
        let root = guard.as_ref().ok_or_else(|| {
            VfsError::Io(std::io::Error::other(format!(
                "archive filesystem {} is closed",
                self.archive_path.display()
            )))
        })?;
        Ok(root.lookup(relative).is_some())
    }
}

impl FileSystem for ArchiveFileSystem {
    fn open(
        &self,
        mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<Box<dyn Read + Send>, VfsError> {
        if target == mount_point {
            return native::open(&self.archive_path);
        }
        let relative = Self::relative(mount_point, target)?;
        let (offset, size) = self.with_entry(&relative, |entry| {
            if entry.is_dir {
                return Err(VfsError::Io(std::io::Error::other(format!(
                    "'{}' is a directory in archive {}",
                    relative,
                    self.archive_path.display()
                ))));
            }
            Ok((entry.offset, entry.size))
        })?;

        let mut file = std::fs::File::open(&self.archive_path)?;
        file.seek(SeekFrom::Start(offset))?;
        Ok(Box::new(file.take(size)))
    }

    fn exists(&self, mount_point: &VirtualFile, target: &VirtualFile) -> Result<bool, VfsError> {
        if target == mount_point {
            return native::exists(&self.archive_path);
        }
        self.entry_exists(&Self::relative(mount_point, target)?)
    }

    fn is_directory(
        &self,
        mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<bool, VfsError> {
        if target == mount_point {
            return native::is_directory(&self.archive_path);
        }
        let relative = Self::relative(mount_point, target)?;
        self.with_entry(&relative, |entry| Ok(entry.is_dir))
    }

    fn size(&self, mount_point: &VirtualFile, target: &VirtualFile) -> Result<u64, VfsError> {
        if target == mount_point {
            return native::size(&self.archive_path);
        }
        let relative = Self::relative(mount_point, target)?;
        self.with_entry(&relative, |entry| Ok(entry.size))
    }

    fn last_modified(
        &self,
        mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<SystemTime, VfsError> {
        if target == mount_point {
            return native::last_modified(&self.archive_path);
        }
        let relative = Self::relative(mount_point, target)?;
        self.with_entry(&relative, |entry| {
            Ok(SystemTime::UNIX_EPOCH + Duration::from_secs(entry.mtime))
        })
    }

    fn directory_entries(
        &self,
        mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<Vec<String>, VfsError> {
        let relative = if target == mount_point {
            VirtualPath::root()
        } else {
            Self::relative(mount_point, target)?
        };
        self.with_entry(&relative, |entry| {
            if !entry.is_dir {
                return Err(VfsError::Io(std::io::Error::other(format!(
                    "'{}' is not a directory in archive {}",
                    relative,
                    self.archive_path.display()
                ))));
            }
            Ok(entry.children.keys().cloned().collect())
        })
    }

    fn delete(&self, _mount_point: &VirtualFile, _target: &VirtualFile) -> Result<bool, VfsError> {
        Ok(false)
    }

    fn is_read_only(&self) -> bool {
        true
    }

    fn mount_source(&self) -> Option<PathBuf> {
        Some(self.archive_path.clone())
    }

    fn code_signers(
        &self,
        _mount_point: &VirtualFile,
        _target: &VirtualFile,
    ) -> Result<Option<Vec<CodeSigner>>, VfsError> {
        // Signer metadata is not recorded in the entry index; the query
        // declines rather than faulting.
        Ok(None)
    }

    fn close(&self) -> Result<(), VfsError> {
        self.index
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        Ok(())
    }
}
