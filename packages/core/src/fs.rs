//! The backend capability interface.
//!
//! A `FileSystem` translates virtual path operations on one mount into a
//! concrete storage medium's operations. All calls are synchronous and
//! blocking; there is no cancellation or retry model. Every operation
//! takes the mount root alongside the target so the backend can compute
//! its native path without holding per-call state.

use std::io::Read;
use std::path::PathBuf;
use std::time::SystemTime;

use crate::error::VfsError;
use crate::file::VirtualFile;
use crate::path::VirtualPath;

/// True when the platform's native separator differs from the virtual `/`.
pub const NEEDS_CONVERSION: bool = std::path::MAIN_SEPARATOR != '/';

/// Code-signing metadata attached to an entry by its container.
///
/// No current backend produces signers; the query is an explicitly
/// unsupported capability that declines with `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeSigner {
    /// Distinguished name of the signing identity.
    pub subject: String,
}

/// Path of `target` relative to `mount_point`, converted to the native
/// separator when the platform requires it.
///
/// This is the one path-conversion helper shared by all backends; each
/// backend anchors the result under its own native root.
pub fn native_relative(
    mount_point: &VirtualFile,
    target: &VirtualFile,
) -> Result<String, VfsError> {
    let relative = target
        .path_relative_to(mount_point)
        .ok_or_else(|| VfsError::InvalidArgument {
            message: format!("'{}' is not under mount point '{}'", target, mount_point),
        })?;
    Ok(to_native(&relative))
}

fn to_native(path: &VirtualPath) -> String {
    if NEEDS_CONVERSION {
        path.components.join(std::path::MAIN_SEPARATOR_STR)
    } else {
        path.components.join("/")
    }
}

/// A pluggable filesystem implementation serving one mount.
///
/// Implementations are selected by construction: a real directory tree,
/// the shared composite-root instance, or a read-only archive view. Not
/// every variant supports every effect; an unsupported effect declines
/// (`delete` returns `Ok(false)`, `code_signers` returns `Ok(None)`)
/// rather than erroring.
pub trait FileSystem: Send + Sync {
    /// Open the target for reading as a byte stream.
    fn open(
        &self,
        mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<Box<dyn Read + Send>, VfsError>;

    /// Whether the target exists.
    fn exists(&self, mount_point: &VirtualFile, target: &VirtualFile) -> Result<bool, VfsError>;

    /// Whether the target is a directory. A failure to read attributes is
    /// an `Io` fault, not an "unknown" state.
    fn is_directory(
        &self,
        mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<bool, VfsError>;

    /// Whether the target is a plain file.
    fn is_file(&self, mount_point: &VirtualFile, target: &VirtualFile) -> Result<bool, VfsError> {
        Ok(!self.is_directory(mount_point, target)?)
    }

    /// Size of the target in bytes.
    fn size(&self, mount_point: &VirtualFile, target: &VirtualFile) -> Result<u64, VfsError>;

    /// Last modification time of the target.
    fn last_modified(
        &self,
        mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<SystemTime, VfsError>;

    /// Names of the target's immediate children.
    fn directory_entries(
        &self,
        mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<Vec<String>, VfsError>;

    /// Delete the target, reporting whether anything was removed.
    /// Read-only backends always report `false`.
    fn delete(&self, mount_point: &VirtualFile, target: &VirtualFile) -> Result<bool, VfsError>;

    /// Whether this backend rejects mutation.
    fn is_read_only(&self) -> bool;

    /// The native path backing this mount, when there is a single one.
    fn mount_source(&self) -> Option<PathBuf>;

    /// Code signers recorded for the target, when the backend can supply
    /// them. The default declines.
    fn code_signers(
        &self,
        mount_point: &VirtualFile,
        target: &VirtualFile,
    ) -> Result<Option<Vec<CodeSigner>>, VfsError> {
        let _ = (mount_point, target);
        Ok(None)
    }

    /// Release backend-held resources.
    ///
    /// Called once at unmount. Must be safe to call on an already-closed
    /// instance; queries after close are caller errors. Unmounting while
    /// reads are in flight is the caller's hazard, not arbitrated here.
    fn close(&self) -> Result<(), VfsError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vpath;

    #[test]
    fn native_relative_of_nested_target() {
        let mount = VirtualFile::new(vpath!("deploy"));
        let target = VirtualFile::new(vpath!("deploy/lib/a.tar"));
        assert_eq!(native_relative(&mount, &target).unwrap(), "lib/a.tar");
    }

    #[test]
    fn native_relative_of_mount_itself_is_empty() {
        let mount = VirtualFile::new(vpath!("deploy"));
        assert_eq!(native_relative(&mount, &mount).unwrap(), "");
    }

    #[test]
    fn native_relative_outside_mount_is_rejected() {
        let mount = VirtualFile::new(vpath!("deploy"));
        let target = VirtualFile::new(vpath!("other/file"));
        assert!(matches!(
            native_relative(&mount, &target),
            Err(VfsError::InvalidArgument { .. })
        ));
    }
}
