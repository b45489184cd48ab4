use super::backend::AttrBackend;
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, HashMap};
use std::io;
use std::path::{Path, PathBuf};

/// In-memory attribute backend for testing.
///
/// Uses `RefCell` since filetags is single-threaded. Every `set` and
/// `remove` call is counted so tests can assert that no-op edits never reach
/// the backend.
#[derive(Debug, Default)]
pub struct MemBackend {
    attrs: RefCell<HashMap<PathBuf, BTreeMap<String, Vec<u8>>>>,
    failures: RefCell<HashMap<PathBuf, io::ErrorKind>>,
    attr_failures: RefCell<HashMap<(PathBuf, String), io::ErrorKind>>,
    writes: Cell<usize>,
}

impl MemBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every call for `path` fail with `kind`.
    pub fn fail_path(&self, path: impl Into<PathBuf>, kind: io::ErrorKind) {
        self.failures.borrow_mut().insert(path.into(), kind);
    }

    /// Make `get` of one attribute on `path` fail with `kind`.
    pub fn fail_attr(&self, path: impl Into<PathBuf>, name: &str, kind: io::ErrorKind) {
        self.attr_failures
            .borrow_mut()
            .insert((path.into(), name.to_string()), kind);
    }

    /// Number of mutating calls (`set` and `remove`) seen so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Raw stored value, bypassing failure injection.
    pub fn raw(&self, path: &Path, name: &str) -> Option<Vec<u8>> {
        self.attrs
            .borrow()
            .get(path)
            .and_then(|attrs| attrs.get(name))
            .cloned()
    }

    fn check(&self, path: &Path) -> io::Result<()> {
        match self.failures.borrow().get(path) {
            Some(kind) => Err(io::Error::from(*kind)),
            None => Ok(()),
        }
    }
}

impl AttrBackend for MemBackend {
    fn get(&self, path: &Path, name: &str) -> io::Result<Option<Vec<u8>>> {
        self.check(path)?;
        let key = (path.to_path_buf(), name.to_string());
        if let Some(kind) = self.attr_failures.borrow().get(&key) {
            return Err(io::Error::from(*kind));
        }
        Ok(self.raw(path, name))
    }

    fn set(&self, path: &Path, name: &str, value: &[u8]) -> io::Result<()> {
        self.check(path)?;
        self.writes.set(self.writes.get() + 1);
        self.attrs
            .borrow_mut()
            .entry(path.to_path_buf())
            .or_default()
            .insert(name.to_string(), value.to_vec());
        Ok(())
    }

    fn remove(&self, path: &Path, name: &str) -> io::Result<()> {
        self.check(path)?;
        self.writes.set(self.writes.get() + 1);
        if let Some(attrs) = self.attrs.borrow_mut().get_mut(path) {
            attrs.remove(name);
        }
        Ok(())
    }

    fn list(&self, path: &Path) -> io::Result<Vec<String>> {
        self.check(path)?;
        Ok(self
            .attrs
            .borrow()
            .get(path)
            .map(|attrs| attrs.keys().cloned().collect())
            .unwrap_or_default())
    }
}
