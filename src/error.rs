//! Error types for hashmirror operations

use std::error::Error;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Which tree of a pair an operation was working on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeSide {
	Source,
	Target,
}

impl fmt::Display for TreeSide {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			TreeSide::Source => write!(f, "source"),
			TreeSide::Target => write!(f, "target"),
		}
	}
}

/// Main error type for sync operations
///
/// Each variant has a fixed blast radius:
/// `Config` ends the whole run, `InvalidPair`, `DirectoryCreate` and
/// `Fingerprint` abort the current pair, `Copy` skips a single file.
#[derive(Debug)]
pub enum SyncError {
	/// Config file missing, unreadable or of the wrong shape
	Config { path: PathBuf, message: String },

	/// Source/target combination that cannot be synced
	InvalidPair { message: String },

	/// Target root or a mirrored directory could not be created
	DirectoryCreate { path: PathBuf, source: io::Error },

	/// Walking or hashing one of the trees failed
	Fingerprint { side: TreeSide, root: PathBuf, source: io::Error },

	/// Copying a single file failed
	Copy { from: PathBuf, to: PathBuf, source: io::Error },

	/// I/O error
	Io(io::Error),
}

impl fmt::Display for SyncError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			SyncError::Config { path, message } => {
				write!(f, "Cannot load config {}: {}", path.display(), message)
			}
			SyncError::InvalidPair { message } => write!(f, "Invalid sync pair: {}", message),
			SyncError::DirectoryCreate { path, source } => {
				write!(f, "Cannot create directory {}: {}", path.display(), source)
			}
			SyncError::Fingerprint { side, root, source } => {
				write!(f, "Cannot fingerprint {} tree {}: {}", side, root.display(), source)
			}
			SyncError::Copy { from, to, source } => {
				write!(f, "Cannot copy {} to {}: {}", from.display(), to.display(), source)
			}
			SyncError::Io(e) => write!(f, "I/O error: {}", e),
		}
	}
}

impl Error for SyncError {
	fn source(&self) -> Option<&(dyn Error + 'static)> {
		match self {
			SyncError::DirectoryCreate { source, .. }
			| SyncError::Fingerprint { source, .. }
			| SyncError::Copy { source, .. } => Some(source),
			SyncError::Io(e) => Some(e),
			SyncError::Config { .. } | SyncError::InvalidPair { .. } => None,
		}
	}
}

impl From<io::Error> for SyncError {
	fn from(e: io::Error) -> Self {
		SyncError::Io(e)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_fingerprint_error_display_names_side() {
		let err = SyncError::Fingerprint {
			side: TreeSide::Target,
			root: PathBuf::from("/tmp/t"),
			source: io::Error::new(io::ErrorKind::PermissionDenied, "denied"),
		};
		let msg = err.to_string();
		assert!(msg.contains("target"));
		assert!(msg.contains("/tmp/t"));
		assert!(err.source().is_some());
	}
}

// vim: ts=4
