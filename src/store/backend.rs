use std::io;
use std::path::Path;

/// Raw extended-attribute primitive.
///
/// Values are opaque bytes here; encoding is the caller's business.
pub trait AttrBackend {
    /// Read an attribute. `Ok(None)` means the attribute is not present.
    fn get(&self, path: &Path, name: &str) -> io::Result<Option<Vec<u8>>>;

    /// Create or replace an attribute.
    fn set(&self, path: &Path, name: &str, value: &[u8]) -> io::Result<()>;

    /// Remove an attribute. Removing an absent attribute succeeds.
    fn remove(&self, path: &Path, name: &str) -> io::Result<()>;

    /// Names of every attribute on the node, in backend order.
    fn list(&self, path: &Path) -> io::Result<Vec<String>>;
}

impl<T: AttrBackend + ?Sized> AttrBackend for &T {
    fn get(&self, path: &Path, name: &str) -> io::Result<Option<Vec<u8>>> {
        (**self).get(path, name)
    }

    fn set(&self, path: &Path, name: &str, value: &[u8]) -> io::Result<()> {
        (**self).set(path, name, value)
    }

    fn remove(&self, path: &Path, name: &str) -> io::Result<()> {
        (**self).remove(path, name)
    }

    fn list(&self, path: &Path) -> io::Result<Vec<String>> {
        (**self).list(path)
    }
}
