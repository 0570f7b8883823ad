//! Content fingerprinting of directory trees

use std::path::Path;
use tokio::fs as afs;
use tokio::io::AsyncReadExt;

use crate::logging::*;
use crate::types::{ContentHash, EntryKind, FingerprintMap, TreeEntry};
use crate::walk::walk_tree;

/// Read buffer size used while hashing
pub const HASH_BUFFER_SIZE: usize = 64 * 1024;

/// Stream a file through BLAKE3 and return its hex digest
///
/// The file handle lives only for the duration of this call.
pub async fn hash_file(path: &Path) -> std::io::Result<ContentHash> {
	let mut file = afs::File::open(path).await?;
	let mut hasher = blake3::Hasher::new();
	let mut buf = vec![0u8; HASH_BUFFER_SIZE];
	loop {
		let n = file.read(&mut buf).await?;
		if n == 0 {
			break;
		}
		hasher.update(&buf[..n]);
	}
	Ok(ContentHash::from_digest(&hasher.finalize()))
}

/// Hash every regular file below `root`
///
/// Directories and non-regular entries are skipped. The first walk or read
/// error aborts and is returned; nothing computed so far is kept.
pub async fn fingerprint_tree(root: &Path) -> std::io::Result<FingerprintMap> {
	let entries = walk_tree(root)?;
	fingerprint_entries(root, &entries).await
}

/// Hash the regular files of an existing walk of `root`
pub async fn fingerprint_entries(
	root: &Path,
	entries: &[TreeEntry],
) -> std::io::Result<FingerprintMap> {
	let mut map = FingerprintMap::new();

	for entry in entries.iter().filter(|e| e.kind == EntryKind::File) {
		let hash = hash_file(&entry.path.under(root)).await?;
		trace!("{} {}", hash, entry.path);
		map.insert(entry.path.clone(), hash);
	}

	debug!("Fingerprinted {}: {} files", root.display(), map.len());
	Ok(map)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::RelPath;
	use std::fs;
	use tempfile::TempDir;

	fn rel(s: &str) -> RelPath {
		RelPath::from_relative(Path::new(s)).unwrap()
	}

	#[tokio::test]
	async fn test_hash_file_matches_one_shot_digest() {
		let tmp = TempDir::new().unwrap();
		let path = tmp.path().join("big.bin");
		// Spans several read buffers
		let data: Vec<u8> = (0..(HASH_BUFFER_SIZE * 3 + 17)).map(|i| (i % 251) as u8).collect();
		fs::write(&path, &data).unwrap();

		let streamed = hash_file(&path).await.unwrap();
		assert_eq!(streamed, ContentHash::from_digest(&blake3::hash(&data)));
	}

	#[tokio::test]
	async fn test_fingerprint_keys_are_relative_to_root() {
		let tmp = TempDir::new().unwrap();
		fs::create_dir_all(tmp.path().join("sub/empty")).unwrap();
		fs::write(tmp.path().join("a.txt"), "X").unwrap();
		fs::write(tmp.path().join("sub/b.txt"), "Y").unwrap();

		let map = fingerprint_tree(tmp.path()).await.unwrap();
		let keys: Vec<String> = map.keys().map(|k| k.to_string()).collect();
		assert_eq!(keys, vec!["a.txt", "sub/b.txt"]);
		assert_eq!(map[&rel("a.txt")], ContentHash::from_digest(&blake3::hash(b"X")));
	}

	#[tokio::test]
	async fn test_same_content_in_two_trees_yields_equal_maps() {
		let one = TempDir::new().unwrap();
		let two = TempDir::new().unwrap();
		for dir in &[one.path(), two.path()] {
			fs::create_dir(dir.join("d")).unwrap();
			fs::write(dir.join("d/f.txt"), "same").unwrap();
		}

		let a = fingerprint_tree(one.path()).await.unwrap();
		let b = fingerprint_tree(two.path()).await.unwrap();
		assert_eq!(a, b);
	}

	#[tokio::test]
	async fn test_fingerprint_missing_root_is_error() {
		let tmp = TempDir::new().unwrap();
		assert!(fingerprint_tree(&tmp.path().join("missing")).await.is_err());
	}

	#[cfg(unix)]
	#[tokio::test]
	async fn test_fingerprint_skips_symlinks() {
		let tmp = TempDir::new().unwrap();
		fs::write(tmp.path().join("real.txt"), "R").unwrap();
		std::os::unix::fs::symlink(tmp.path().join("real.txt"), tmp.path().join("link.txt"))
			.unwrap();

		let map = fingerprint_tree(tmp.path()).await.unwrap();
		assert_eq!(map.len(), 1);
		assert!(map.contains_key(&rel("real.txt")));
	}
}

// vim: ts=4
