//! Extended attributes on the real filesystem, via the `xattr` crate.

use super::backend::AttrBackend;
use std::io;
use std::path::Path;

/// Backend over the operating system's extended attributes.
///
/// With `follow_symlinks` every call acts on the symlink target; otherwise a
/// symlink's own attributes are used.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsBackend {
    follow_symlinks: bool,
}

impl OsBackend {
    pub fn new(follow_symlinks: bool) -> Self {
        Self { follow_symlinks }
    }

    /// Whether extended attributes are available on this platform at all.
    pub fn platform_supported() -> bool {
        xattr::SUPPORTED_PLATFORM
    }
}

impl AttrBackend for OsBackend {
    fn get(&self, path: &Path, name: &str) -> io::Result<Option<Vec<u8>>> {
        if self.follow_symlinks {
            xattr::get_deref(path, name)
        } else {
            xattr::get(path, name)
        }
    }

    fn set(&self, path: &Path, name: &str, value: &[u8]) -> io::Result<()> {
        if self.follow_symlinks {
            xattr::set_deref(path, name, value)
        } else {
            xattr::set(path, name, value)
        }
    }

    fn remove(&self, path: &Path, name: &str) -> io::Result<()> {
        let result = if self.follow_symlinks {
            xattr::remove_deref(path, name)
        } else {
            xattr::remove(path, name)
        };
        match result {
            Err(err) if is_missing_attr(&err) => {
                tracing::trace!(path = %path.display(), name, "attribute already absent");
                Ok(())
            }
            other => other,
        }
    }

    fn list(&self, path: &Path) -> io::Result<Vec<String>> {
        let names = if self.follow_symlinks {
            xattr::list_deref(path)?
        } else {
            xattr::list(path)?
        };
        Ok(names
            .map(|name| name.to_string_lossy().into_owned())
            .collect())
    }
}

#[cfg(any(target_os = "linux", target_os = "android"))]
fn is_missing_attr(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::ENODATA)
}

#[cfg(any(
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd"
))]
fn is_missing_attr(err: &io::Error) -> bool {
    err.raw_os_error() == Some(libc::ENOATTR)
}

#[cfg(not(any(
    target_os = "linux",
    target_os = "android",
    target_os = "macos",
    target_os = "ios",
    target_os = "freebsd",
    target_os = "netbsd"
)))]
fn is_missing_attr(_err: &io::Error) -> bool {
    false
}
