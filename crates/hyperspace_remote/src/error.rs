//! Error type for remote collaborators

use std::fmt;
use std::io;
use hyperspace_core::SnapshotError;

/// Failure of a persistence or texture call
#[derive(Debug)]
pub enum RemoteError {
    /// Temporary failure (timeout, overload); worth retrying
    Transient(String),
    /// The service refused the request
    Rejected(String),
    /// The session or record does not exist
    NotFound,
    /// The caller cancelled the request
    Cancelled,
    /// Local storage failed (permission denied, disk full, etc.)
    Storage(io::Error),
    /// Payload could not be encoded or decoded
    Serialize(String),
}

impl RemoteError {
    /// True if retrying the same call may succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, RemoteError::Transient(_) | RemoteError::Storage(_))
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RemoteError::Cancelled)
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RemoteError::Transient(msg) => write!(f, "Transient remote error: {}", msg),
            RemoteError::Rejected(msg) => write!(f, "Request rejected: {}", msg),
            RemoteError::NotFound => write!(f, "Not found"),
            RemoteError::Cancelled => write!(f, "Cancelled"),
            RemoteError::Storage(e) => write!(f, "Storage error: {}", e),
            RemoteError::Serialize(msg) => write!(f, "Serialize error: {}", msg),
        }
    }
}

impl std::error::Error for RemoteError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RemoteError::Storage(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for RemoteError {
    fn from(e: io::Error) -> Self {
        if e.kind() == io::ErrorKind::NotFound {
            RemoteError::NotFound
        } else {
            RemoteError::Storage(e)
        }
    }
}

impl From<SnapshotError> for RemoteError {
    fn from(e: SnapshotError) -> Self {
        match e {
            SnapshotError::Io(io) => RemoteError::from(io),
            other => RemoteError::Serialize(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(RemoteError::Transient("timeout".into()).is_transient());
        assert!(RemoteError::Storage(io::Error::new(io::ErrorKind::Other, "busy")).is_transient());
        assert!(!RemoteError::NotFound.is_transient());
        assert!(!RemoteError::Cancelled.is_transient());
        assert!(!RemoteError::Rejected("bad".into()).is_transient());
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err: RemoteError = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(matches!(err, RemoteError::NotFound));
    }

    #[test]
    fn test_display() {
        assert_eq!(RemoteError::Transient("x".into()).to_string(), "Transient remote error: x");
        assert_eq!(RemoteError::Cancelled.to_string(), "Cancelled");
    }
}
