//! Sync pair validation
//!
//! A target inside its own source would be walked as part of the source
//! and grow on every run, so such pairs are refused before anything is
//! created.

use std::env;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::config::SyncPairSpec;
use crate::error::SyncError;

/// Make `path` absolute against the working directory and fold `.`/`..`
///
/// Purely lexical: symlinks are not resolved and the path need not exist.
pub fn normalize_path(path: &Path) -> io::Result<PathBuf> {
	normalize_path_from(path, env::current_dir)
}

fn normalize_path_from<F>(path: &Path, cwd: F) -> io::Result<PathBuf>
where
	F: FnOnce() -> io::Result<PathBuf>,
{
	let joined = if path.is_absolute() { path.to_path_buf() } else { cwd()?.join(path) };

	let mut out = PathBuf::new();
	for c in joined.components() {
		match c {
			Component::CurDir => {}
			Component::ParentDir => {
				out.pop();
			}
			other => out.push(other.as_os_str()),
		}
	}
	Ok(out)
}

/// Check if `path` is `root` or lies below it
pub fn is_path_within_root(path: &Path, root: &Path) -> bool {
	path.starts_with(root)
}

/// Validate a pair before syncing it
pub fn validate_pair(pair: &SyncPairSpec) -> Result<(), SyncError> {
	check_pair(pair, env::current_dir)
}

fn check_pair<F>(pair: &SyncPairSpec, cwd: F) -> Result<(), SyncError>
where
	F: Fn() -> io::Result<PathBuf>,
{
	if pair.source_root.as_os_str().is_empty() || pair.target_root.as_os_str().is_empty() {
		return Err(SyncError::InvalidPair {
			message: format!("{}: source and target paths must not be empty", pair.name),
		});
	}

	let resolve = |path: &Path| {
		normalize_path_from(path, &cwd).map_err(|e| SyncError::InvalidPair {
			message: format!("{}: cannot resolve {}: {}", pair.name, path.display(), e),
		})
	};
	let source = resolve(pair.source_root.as_path())?;
	let target = resolve(pair.target_root.as_path())?;

	if source == target {
		return Err(SyncError::InvalidPair {
			message: format!("{}: source and target are the same directory", pair.name),
		});
	}
	if is_path_within_root(&target, &source) {
		return Err(SyncError::InvalidPair {
			message: format!(
				"{}: target {} is inside source {}",
				pair.name,
				target.display(),
				source.display()
			),
		});
	}
	Ok(())
}


// vim: ts=4
