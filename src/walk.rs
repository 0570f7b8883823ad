//! Recursive directory traversal
//!
//! Produces a flat list of entries tagged with their kind. The walk never
//! follows symlinks and never hashes or copies anything, so both the
//! fingerprinter and the skeleton mirror consume the same listing.

use std::fs;
use std::io;
use std::path::Path;

use crate::logging::*;
use crate::types::{EntryKind, RelPath, TreeEntry};

/// Walk `root` recursively
///
/// The root is always the first entry (kind `Dir`, empty path). Children are
/// listed in name order, each directory immediately followed by its
/// contents. Any failure to read a directory or stat an entry ends the walk.
pub fn walk_tree(root: &Path) -> io::Result<Vec<TreeEntry>> {
	let meta = fs::metadata(root)?;
	if !meta.is_dir() {
		return Err(io::Error::new(
			io::ErrorKind::Other,
			format!("{} is not a directory", root.display()),
		));
	}

	let mut entries = vec![TreeEntry { path: RelPath::root(), kind: EntryKind::Dir, size: 0 }];
	walk_dir(root, &RelPath::root(), &mut entries)?;
	debug!("Walked {}: {} entries", root.display(), entries.len());
	Ok(entries)
}

fn walk_dir(dir: &Path, rel: &RelPath, entries: &mut Vec<TreeEntry>) -> io::Result<()> {
	let mut children = fs::read_dir(dir)?.collect::<io::Result<Vec<fs::DirEntry>>>()?;
	children.sort_by_key(|e| e.file_name());

	for child in children {
		let path = child.path();
		let meta = fs::symlink_metadata(&path)?;
		let child_rel = rel.join(child.file_name());

		if meta.is_dir() {
			entries.push(TreeEntry { path: child_rel.clone(), kind: EntryKind::Dir, size: 0 });
			walk_dir(&path, &child_rel, entries)?;
		} else if meta.is_file() {
			entries.push(TreeEntry { path: child_rel, kind: EntryKind::File, size: meta.len() });
		} else {
			trace!("Skipping non-regular entry {}", path.display());
			entries.push(TreeEntry { path: child_rel, kind: EntryKind::Other, size: 0 });
		}
	}
	Ok(())
}

#[cfg(test)]
mod tests {
	use super::*;
	use tempfile::TempDir;

	fn kinds(entries: &[TreeEntry]) -> Vec<(String, EntryKind)> {
		entries.iter().map(|e| (e.path.to_string(), e.kind)).collect()
	}

	#[test]
	fn test_walk_lists_root_first_then_sorted_children() {
		let tmp = TempDir::new().unwrap();
		fs::create_dir_all(tmp.path().join("sub/empty")).unwrap();
		fs::write(tmp.path().join("b.txt"), "B").unwrap();
		fs::write(tmp.path().join("a.txt"), "A").unwrap();
		fs::write(tmp.path().join("sub/c.txt"), "CC").unwrap();

		let entries = walk_tree(tmp.path()).unwrap();
		assert_eq!(
			kinds(&entries),
			vec![
				("".to_string(), EntryKind::Dir),
				("a.txt".to_string(), EntryKind::File),
				("b.txt".to_string(), EntryKind::File),
				("sub".to_string(), EntryKind::Dir),
				("sub/c.txt".to_string(), EntryKind::File),
				("sub/empty".to_string(), EntryKind::Dir),
			]
		);
		let c = entries.iter().find(|e| e.path.to_string() == "sub/c.txt").unwrap();
		assert_eq!(c.size, 2);
	}

	#[cfg(unix)]
	#[test]
	fn test_walk_reports_symlinks_as_other() {
		let tmp = TempDir::new().unwrap();
		fs::create_dir(tmp.path().join("real")).unwrap();
		fs::write(tmp.path().join("real/f.txt"), "F").unwrap();
		std::os::unix::fs::symlink(tmp.path().join("real"), tmp.path().join("link")).unwrap();

		let entries = walk_tree(tmp.path()).unwrap();
		let link = entries.iter().find(|e| e.path.to_string() == "link").unwrap();
		assert_eq!(link.kind, EntryKind::Other);
		// Not followed
		assert!(!entries.iter().any(|e| e.path.to_string() == "link/f.txt"));
	}

	#[test]
	fn test_walk_missing_root_fails() {
		let tmp = TempDir::new().unwrap();
		let err = walk_tree(&tmp.path().join("nope")).unwrap_err();
		assert_eq!(err.kind(), io::ErrorKind::NotFound);
	}

	#[test]
	fn test_walk_file_root_fails() {
		let tmp = TempDir::new().unwrap();
		let file = tmp.path().join("f");
		fs::write(&file, "x").unwrap();
		assert!(walk_tree(&file).is_err());
	}
}

// vim: ts=4
