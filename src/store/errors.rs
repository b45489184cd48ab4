use crate::codec::DecodeError;
use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Coarse classification of an attribute I/O failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoKind {
    NotFound,
    PermissionDenied,
    /// The filesystem does not support (user) extended attributes.
    Unsupported,
    Other,
}

impl IoKind {
    pub fn classify(err: &io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => IoKind::NotFound,
            io::ErrorKind::PermissionDenied => IoKind::PermissionDenied,
            io::ErrorKind::Unsupported => IoKind::Unsupported,
            _ if is_unsupported_errno(err) => IoKind::Unsupported,
            _ => IoKind::Other,
        }
    }
}

#[cfg(unix)]
fn is_unsupported_errno(err: &io::Error) -> bool {
    matches!(err.raw_os_error(), Some(code) if code == libc::ENOTSUP || code == libc::EOPNOTSUPP)
}

#[cfg(not(unix))]
fn is_unsupported_errno(_err: &io::Error) -> bool {
    false
}

impl fmt::Display for IoKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            IoKind::NotFound => "not found",
            IoKind::PermissionDenied => "permission denied",
            IoKind::Unsupported => "not supported",
            IoKind::Other => "I/O error",
        };
        f.write_str(text)
    }
}

#[derive(Error, Debug)]
pub enum AttrError {
    #[error("cannot access {attr} on {path} ({kind}): {source}")]
    Io {
        path: PathBuf,
        attr: String,
        kind: IoKind,
        source: io::Error,
    },

    #[error("malformed {attr} on {path}: {source}")]
    Decode {
        path: PathBuf,
        attr: String,
        source: DecodeError,
    },
}

impl AttrError {
    pub(crate) fn io(path: impl Into<PathBuf>, attr: &str, source: io::Error) -> Self {
        AttrError::Io {
            path: path.into(),
            attr: attr.to_string(),
            kind: IoKind::classify(&source),
            source,
        }
    }

    pub fn kind(&self) -> Option<IoKind> {
        match self {
            AttrError::Io { kind, .. } => Some(*kind),
            AttrError::Decode { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_std_kinds() {
        let err = io::Error::from(io::ErrorKind::PermissionDenied);
        assert_eq!(IoKind::classify(&err), IoKind::PermissionDenied);
        let err = io::Error::from(io::ErrorKind::NotFound);
        assert_eq!(IoKind::classify(&err), IoKind::NotFound);
        let err = io::Error::new(io::ErrorKind::Other, "boom");
        assert_eq!(IoKind::classify(&err), IoKind::Other);
    }

    #[test]
    #[cfg(unix)]
    fn test_classify_enotsup() {
        let err = io::Error::from_raw_os_error(libc::EOPNOTSUPP);
        assert_eq!(IoKind::classify(&err), IoKind::Unsupported);
    }
}
