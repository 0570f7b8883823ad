//! Core value types shared by the walker, fingerprinter and synchronizer

use std::collections::BTreeMap;
use std::ffi::{OsStr, OsString};
use std::fmt;
use std::path::{Component, Path, PathBuf};

/// Path of a tree entry relative to its tree root
///
/// Built by component-wise prefix stripping, so roots that share a string
/// prefix or carry a trailing separator always produce the same keys.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub struct RelPath {
	components: Vec<OsString>,
}

impl RelPath {
	/// The tree root itself
	pub fn root() -> Self {
		RelPath { components: Vec::new() }
	}

	/// Strip `root` from `path`
	///
	/// Returns None when `path` is not inside `root` or when the remainder
	/// holds anything but plain names (`..`, prefixes).
	pub fn from_prefixed(root: &Path, path: &Path) -> Option<Self> {
		let rest = path.strip_prefix(root).ok()?;
		Self::from_relative(rest)
	}

	/// Build from an already-relative path
	pub fn from_relative(path: &Path) -> Option<Self> {
		let mut components = Vec::new();
		for c in path.components() {
			match c {
				Component::Normal(name) => components.push(name.to_os_string()),
				Component::CurDir => {}
				_ => return None,
			}
		}
		Some(RelPath { components })
	}

	/// Child entry below this path
	pub fn join<S: AsRef<OsStr>>(&self, name: S) -> Self {
		let mut components = self.components.clone();
		components.push(name.as_ref().to_os_string());
		RelPath { components }
	}

	/// True for the tree root
	pub fn is_root(&self) -> bool {
		self.components.is_empty()
	}

	/// Resolve against a tree root
	pub fn under(&self, root: &Path) -> PathBuf {
		let mut p = root.to_path_buf();
		for c in &self.components {
			p.push(c);
		}
		p
	}
}

impl fmt::Display for RelPath {
	/// Canonical form: components joined by `/`, empty for the root
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for (i, c) in self.components.iter().enumerate() {
			if i > 0 {
				f.write_str("/")?;
			}
			write!(f, "{}", c.to_string_lossy())?;
		}
		Ok(())
	}
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum EntryKind {
	File,
	Dir,
	/// Symlinks, sockets, devices, FIFOs
	Other,
}

/// One node discovered while walking a tree
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TreeEntry {
	pub path: RelPath,
	pub kind: EntryKind,
	/// File size in bytes (0 for non-files)
	pub size: u64,
}

/// Hex-encoded content digest
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct ContentHash(String);

impl ContentHash {
	pub fn from_digest(hash: &blake3::Hash) -> Self {
		ContentHash(hex::encode(hash.as_bytes()))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}
}

impl fmt::Display for ContentHash {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

/// Relative path -> content hash for every regular file of one tree
pub type FingerprintMap = BTreeMap<RelPath, ContentHash>;


// vim: ts=4
