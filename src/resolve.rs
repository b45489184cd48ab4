//! Candidate path resolution.
//!
//! Turns the user's path arguments (or the working directory when there are
//! none) into the ordered, deduplicated list of nodes to operate on.
//!
//! # Ordering
//!
//! Explicit paths keep their given order. Directory listings are sorted by
//! file name at every level and walked depth first, so a directory always
//! precedes its contents. A path reached more than once keeps its first
//! position.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;
use walkdir::{DirEntry, WalkDir};

/// Which kinds of nodes survive resolution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum PathFilter {
    #[default]
    None,
    FilesOnly,
    DirsOnly,
}

impl PathFilter {
    fn keeps(self, kind: PathKind) -> bool {
        match self {
            PathFilter::None => true,
            PathFilter::FilesOnly => kind == PathKind::File,
            PathFilter::DirsOnly => kind == PathKind::Directory,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResolveOptions {
    pub recurse: bool,
    pub follow_symlinks: bool,
    pub filter: PathFilter,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    File,
    Directory,
}

/// A resolved node to operate on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Candidate {
    /// Absolute path of the node.
    pub path: PathBuf,
    /// Kind of the node, or of its target when it is a symlink.
    /// Broken symlinks count as files.
    pub kind: PathKind,
    /// The node itself is a symlink.
    pub symlink: bool,
}

impl Candidate {
    pub fn is_dir(&self) -> bool {
        self.kind == PathKind::Directory
    }

    fn from_entry(entry: &DirEntry) -> Self {
        let symlink = entry.path_is_symlink();
        let is_dir = if entry.file_type().is_dir() {
            true
        } else if symlink {
            target_is_dir(entry.path())
        } else {
            false
        };
        Self {
            path: entry.path().to_path_buf(),
            kind: if is_dir {
                PathKind::Directory
            } else {
                PathKind::File
            },
            symlink,
        }
    }
}

/// A single path that could not be resolved. Processing continues.
#[derive(Error, Debug)]
pub enum ResolutionError {
    #[error("file does not exist: {path}")]
    Missing { path: PathBuf },

    #[error("cannot inspect {path}: {source}")]
    Inaccessible { path: PathBuf, source: io::Error },

    #[error("cannot walk {path}: {source}")]
    Walk {
        path: PathBuf,
        source: walkdir::Error,
    },
}

impl ResolutionError {
    pub fn path(&self) -> &Path {
        match self {
            ResolutionError::Missing { path }
            | ResolutionError::Inaccessible { path, .. }
            | ResolutionError::Walk { path, .. } => path,
        }
    }
}

/// Resolution cannot start at all.
#[derive(Error, Debug)]
pub enum ResolveError {
    #[error("unable to list working directory {path}: {source}")]
    WorkingDir {
        path: PathBuf,
        source: walkdir::Error,
    },
}

pub type Resolved = Result<Candidate, ResolutionError>;

#[derive(Debug, Clone)]
pub struct PathResolver {
    options: ResolveOptions,
    cwd: PathBuf,
}

impl PathResolver {
    /// Resolver rooted at `cwd`, which must be absolute.
    pub fn new(options: ResolveOptions, cwd: impl Into<PathBuf>) -> Self {
        Self {
            options,
            cwd: cwd.into(),
        }
    }

    /// Resolve `explicit` paths, or the working directory when empty.
    pub fn resolve(&self, explicit: &[PathBuf]) -> Result<Vec<Resolved>, ResolveError> {
        let mut out = Resolution::default();

        if explicit.is_empty() {
            self.resolve_working_dir(&mut out)?;
        } else {
            for path in explicit {
                self.resolve_explicit(&self.absolute(path), &mut out);
            }
        }

        tracing::debug!(
            candidates = out.items.len(),
            filter = ?self.options.filter,
            recurse = self.options.recurse,
            "resolved paths"
        );
        Ok(out.items)
    }

    fn resolve_working_dir(&self, out: &mut Resolution) -> Result<(), ResolveError> {
        let mut walker = self.walker(&self.cwd).min_depth(1);
        if !self.options.recurse {
            walker = walker.max_depth(1);
        }
        for entry in walker {
            match entry {
                Ok(entry) => out.push_candidate(Candidate::from_entry(&entry), self.options.filter),
                Err(source) if source.depth() == 0 => {
                    return Err(ResolveError::WorkingDir {
                        path: self.cwd.clone(),
                        source,
                    });
                }
                Err(source) => out.push_walk_error(source, &self.cwd),
            }
        }
        Ok(())
    }

    fn resolve_explicit(&self, path: &Path, out: &mut Resolution) {
        let meta = match fs::symlink_metadata(path) {
            Ok(meta) => meta,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "explicit path does not exist");
                out.push_error(ResolutionError::Missing {
                    path: path.to_path_buf(),
                });
                return;
            }
            Err(source) => {
                out.push_error(ResolutionError::Inaccessible {
                    path: path.to_path_buf(),
                    source,
                });
                return;
            }
        };

        let symlink = meta.file_type().is_symlink();
        let is_dir = if symlink {
            target_is_dir(path)
        } else {
            meta.is_dir()
        };
        let descend = self.options.recurse && is_dir && (!symlink || self.options.follow_symlinks);

        if !descend {
            let kind = if is_dir {
                PathKind::Directory
            } else {
                PathKind::File
            };
            out.push_candidate(
                Candidate {
                    path: path.to_path_buf(),
                    kind,
                    symlink,
                },
                self.options.filter,
            );
            return;
        }

        for entry in self.walker(path) {
            match entry {
                Ok(entry) => out.push_candidate(Candidate::from_entry(&entry), self.options.filter),
                Err(source) => out.push_walk_error(source, path),
            }
        }
    }

    fn walker(&self, root: &Path) -> WalkDir {
        WalkDir::new(root)
            .follow_links(self.options.follow_symlinks)
            .sort_by_file_name()
    }

    /// Join onto the working directory and normalise lexically: `.` is
    /// dropped and `..` pops the previous component. Symlinks are not
    /// consulted, so `link/..` collapses to the link's parent.
    fn absolute(&self, path: &Path) -> PathBuf {
        let joined = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        };
        let mut normalized = PathBuf::new();
        for component in joined.components() {
            match component {
                Component::CurDir => {}
                Component::ParentDir => {
                    normalized.pop();
                }
                other => normalized.push(other),
            }
        }
        normalized
    }
}

#[derive(Default)]
struct Resolution {
    items: Vec<Resolved>,
    seen: HashSet<PathBuf>,
}

impl Resolution {
    fn push_candidate(&mut self, candidate: Candidate, filter: PathFilter) {
        if !filter.keeps(candidate.kind) {
            return;
        }
        if self.seen.insert(candidate.path.clone()) {
            self.items.push(Ok(candidate));
        }
    }

    fn push_error(&mut self, error: ResolutionError) {
        if self.seen.insert(error.path().to_path_buf()) {
            self.items.push(Err(error));
        }
    }

    fn push_walk_error(&mut self, source: walkdir::Error, root: &Path) {
        let path = source
            .path()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| root.to_path_buf());
        tracing::debug!(path = %path.display(), error = %source, "walk error");
        self.push_error(ResolutionError::Walk { path, source });
    }
}

fn target_is_dir(path: &Path) -> bool {
    fs::metadata(path).map(|meta| meta.is_dir()).unwrap_or(false)
}
