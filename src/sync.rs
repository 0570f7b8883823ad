//! Directory tree synchronization
//!
//! One pair at a time, strictly in order:
//! 1. validate the pair
//! 2. make sure the target root exists
//! 3. fingerprint the source tree, then the target tree
//! 4. mirror the source directory skeleton into the target
//! 5. copy every file whose hash is missing or different in the target
//!
//! Steps 1-4 abort the pair on failure. A failed copy in step 5 only skips
//! that file. Files that exist only in the target are never touched.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio::fs as afs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

use crate::callbacks::{NoProgressCallback, SyncEvent, SyncProgressCallback};
use crate::config::{ErrorPolicy, SyncOptions, SyncPairSpec};
use crate::error::{SyncError, TreeSide};
use crate::fingerprint::fingerprint_entries;
use crate::logging::*;
use crate::types::{EntryKind, FingerprintMap, RelPath, TreeEntry};
use crate::validation::validate_pair;
use crate::walk::walk_tree;

fn fingerprint_error(side: TreeSide, root: &Path) -> impl FnOnce(io::Error) -> SyncError {
	let root = root.to_path_buf();
	move |source| SyncError::Fingerprint { side, root, source }
}

/// A file that has to be copied from source to target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CopyCandidate {
	pub path: RelPath,
	/// True when the target has no file at this path, false when it differs
	pub missing: bool,
}

/// Diff two fingerprint maps
///
/// Every source path that is absent from the target or hashes differently
/// is returned, in path order. Target-only paths never appear.
pub fn plan_copies(source: &FingerprintMap, target: &FingerprintMap) -> Vec<CopyCandidate> {
	source
		.iter()
		.filter_map(|(path, hash)| match target.get(path) {
			None => Some(CopyCandidate { path: path.clone(), missing: true }),
			Some(other) if other != hash => {
				Some(CopyCandidate { path: path.clone(), missing: false })
			}
			Some(_) => None,
		})
		.collect()
}

/// Stream `from` into `to`, creating or truncating `to`
///
/// Returns the number of bytes written. Both handles are closed before
/// returning. A symlink at `to` is refused rather than written through.
pub async fn copy_file(from: &Path, to: &Path, buffer_size: usize) -> io::Result<u64> {
	let mut src = afs::File::open(from).await?;
	if let Ok(meta) = afs::symlink_metadata(to).await {
		if meta.file_type().is_symlink() {
			return Err(not_a_plain_entry(to, "file"));
		}
	}
	let mut dst = afs::File::create(to).await?;
	let mut buf = vec![0u8; buffer_size.max(1)];
	let mut total = 0u64;
	loop {
		let n = src.read(&mut buf).await?;
		if n == 0 {
			break;
		}
		dst.write_all(&buf[..n]).await?;
		total += n as u64;
	}
	dst.flush().await?;
	Ok(total)
}

fn not_a_plain_entry(path: &Path, kind: &str) -> io::Error {
	io::Error::new(
		io::ErrorKind::AlreadyExists,
		format!("{} exists and is not a plain {}", path.display(), kind),
	)
}

/// Create every directory of `entries` below `target_root` that is missing
///
/// Returns the directories that were created (or would be, in dry run).
/// Anything else already at a mirrored path, symlinks included, is an error.
pub fn mirror_skeleton(
	entries: &[TreeEntry],
	target_root: &Path,
	dry_run: bool,
) -> Result<Vec<RelPath>, SyncError> {
	let mut created = Vec::new();
	for entry in entries.iter().filter(|e| e.kind == EntryKind::Dir) {
		let dir = entry.path.under(target_root);
		match fs::symlink_metadata(&dir) {
			Ok(meta) if meta.is_dir() => continue,
			// The target root itself may be a link the user configured
			Ok(meta) if entry.path.is_root() && meta.file_type().is_symlink() && dir.is_dir() => {
				continue
			}
			Ok(_) => {
				let source = not_a_plain_entry(&dir, "directory");
				return Err(SyncError::DirectoryCreate { path: dir, source });
			}
			Err(e) if e.kind() == io::ErrorKind::NotFound => {}
			Err(source) => return Err(SyncError::DirectoryCreate { path: dir, source }),
		}
		if !dry_run {
			fs::create_dir_all(&dir)
				.map_err(|source| SyncError::DirectoryCreate { path: dir.clone(), source })?;
		}
		created.push(entry.path.clone());
	}
	Ok(created)
}

/// What happened while syncing one pair
#[derive(Debug, Clone, Default)]
pub struct PairReport {
	pub name: String,
	/// Regular files found in the source tree
	pub source_files: usize,
	/// Regular files found in the target tree before copying
	pub target_files: usize,
	/// Directories created below the target root (root excluded)
	pub dirs_created: Vec<RelPath>,
	/// Files found missing or different
	pub planned: Vec<RelPath>,
	/// Files copied successfully
	pub copied: Vec<RelPath>,
	pub bytes_copied: u64,
	/// Source size of the planned files, as seen by the walk
	pub bytes_planned: u64,
	/// Files whose copy failed, with the error message
	pub failed: Vec<(RelPath, String)>,
	pub dry_run: bool,
	pub duration: Duration,
}

/// Final state of one pair
#[derive(Debug)]
pub enum PairOutcome {
	/// Every planned copy succeeded
	Synced(PairReport),
	/// The pair ran to the end but some copies failed
	PartiallySynced(PairReport),
	/// The pair was abandoned before copying
	Aborted(SyncError),
	/// Not attempted because the run halted on an earlier pair
	Skipped,
}

impl PairOutcome {
	fn from_report(report: PairReport) -> Self {
		if report.failed.is_empty() {
			PairOutcome::Synced(report)
		} else {
			PairOutcome::PartiallySynced(report)
		}
	}

	pub fn report(&self) -> Option<&PairReport> {
		match self {
			PairOutcome::Synced(r) | PairOutcome::PartiallySynced(r) => Some(r),
			PairOutcome::Aborted(_) | PairOutcome::Skipped => None,
		}
	}

	pub fn is_synced(&self) -> bool {
		matches!(self, PairOutcome::Synced(_))
	}

	pub fn is_aborted(&self) -> bool {
		matches!(self, PairOutcome::Aborted(_))
	}
}

/// Outcomes of a run, in config order
#[derive(Debug, Default)]
pub struct RunSummary {
	pub pairs: Vec<(String, PairOutcome)>,
}

impl RunSummary {
	/// True when every pair was fully synced
	pub fn is_success(&self) -> bool {
		self.pairs.iter().all(|(_, o)| o.is_synced())
	}

	pub fn files_copied(&self) -> usize {
		self.pairs.iter().filter_map(|(_, o)| o.report()).map(|r| r.copied.len()).sum()
	}

	pub fn count<F: Fn(&PairOutcome) -> bool>(&self, pred: F) -> usize {
		self.pairs.iter().filter(|(_, o)| pred(o)).count()
	}

	pub fn outcome(&self, name: &str) -> Option<&PairOutcome> {
		self.pairs.iter().find(|(n, _)| n == name).map(|(_, o)| o)
	}
}

/// Runs sync pairs with a fixed set of options
pub struct Synchronizer {
	options: SyncOptions,
	callbacks: Box<dyn SyncProgressCallback>,
}

impl Default for Synchronizer {
	fn default() -> Self {
		Self::new()
	}
}

impl Synchronizer {
	pub fn new() -> Self {
		Synchronizer { options: SyncOptions::default(), callbacks: Box::new(NoProgressCallback) }
	}

	pub fn options(mut self, options: SyncOptions) -> Self {
		self.options = options;
		self
	}

	pub fn dry_run(mut self, dry_run: bool) -> Self {
		self.options.dry_run = dry_run;
		self
	}

	pub fn error_policy(mut self, policy: ErrorPolicy) -> Self {
		self.options.error_policy = policy;
		self
	}

	pub fn copy_buffer_size(mut self, size: usize) -> Self {
		self.options.copy_buffer_size = size;
		self
	}

	pub fn callbacks<C: SyncProgressCallback + 'static>(mut self, callbacks: C) -> Self {
		self.callbacks = Box::new(callbacks);
		self
	}

	/// Sync every pair in order, honoring the error policy
	pub async fn run(&self, pairs: &[SyncPairSpec]) -> RunSummary {
		let mut summary = RunSummary::default();
		let mut halted = false;

		for pair in pairs {
			if halted {
				self.callbacks.on_event(SyncEvent::PairSkipped { name: pair.name.clone() });
				summary.pairs.push((pair.name.clone(), PairOutcome::Skipped));
				continue;
			}

			let outcome = self.sync_pair(pair).await;
			if outcome.is_aborted() && self.options.error_policy == ErrorPolicy::Halt {
				warn!("Halting run after pair '{}' was aborted", pair.name);
				halted = true;
			}
			summary.pairs.push((pair.name.clone(), outcome));
		}
		summary
	}

	/// Sync a single pair and classify the result
	pub async fn sync_pair(&self, pair: &SyncPairSpec) -> PairOutcome {
		self.callbacks.on_event(SyncEvent::PairStarted {
			name: pair.name.clone(),
			source: pair.source_root.clone(),
			target: pair.target_root.clone(),
		});

		match self.try_sync_pair(pair).await {
			Ok(report) => {
				info!(
					"Pair '{}': {} copied, {} failed, {} dirs created in {:?}",
					pair.name,
					report.copied.len(),
					report.failed.len(),
					report.dirs_created.len(),
					report.duration
				);
				self.callbacks.on_event(SyncEvent::PairFinished {
					name: pair.name.clone(),
					source: pair.source_root.clone(),
					target: pair.target_root.clone(),
					copied: report.copied.len(),
					failed: report.failed.len(),
				});
				PairOutcome::from_report(report)
			}
			Err(e) => {
				error!("Pair '{}' aborted: {}", pair.name, e);
				self.callbacks
					.on_event(SyncEvent::PairAborted { name: pair.name.clone(), error: e.to_string() });
				PairOutcome::Aborted(e)
			}
		}
	}

	/// Sync a single pair, returning the first pair-level error
	pub async fn try_sync_pair(&self, pair: &SyncPairSpec) -> Result<PairReport, SyncError> {
		let start = Instant::now();
		let dry_run = self.options.dry_run;
		let source_root = pair.source_root.as_path();
		let target_root = pair.target_root.as_path();

		validate_pair(pair)?;

		if !dry_run {
			fs::create_dir_all(target_root).map_err(|source| SyncError::DirectoryCreate {
				path: target_root.to_path_buf(),
				source,
			})?;
		}

		debug!("Fingerprinting source {}", source_root.display());
		let source_entries =
			walk_tree(source_root).map_err(fingerprint_error(TreeSide::Source, source_root))?;
		let source_map = fingerprint_entries(source_root, &source_entries)
			.await
			.map_err(fingerprint_error(TreeSide::Source, source_root))?;

		debug!("Fingerprinting target {}", target_root.display());
		let target_map = if dry_run && !target_root.exists() {
			FingerprintMap::new()
		} else {
			let entries =
				walk_tree(target_root).map_err(fingerprint_error(TreeSide::Target, target_root))?;
			fingerprint_entries(target_root, &entries)
				.await
				.map_err(fingerprint_error(TreeSide::Target, target_root))?
		};

		let dirs_created: Vec<RelPath> = mirror_skeleton(&source_entries, target_root, dry_run)?
			.into_iter()
			.filter(|p| !p.is_root())
			.collect();
		for dir in &dirs_created {
			self.callbacks.on_event(SyncEvent::DirCreated { path: dir.clone(), dry_run });
		}

		let sizes: BTreeMap<&RelPath, u64> = source_entries
			.iter()
			.filter(|e| e.kind == EntryKind::File)
			.map(|e| (&e.path, e.size))
			.collect();

		let mut report = PairReport {
			name: pair.name.clone(),
			source_files: source_map.len(),
			target_files: target_map.len(),
			dirs_created,
			dry_run,
			..Default::default()
		};

		for candidate in plan_copies(&source_map, &target_map) {
			let path = candidate.path;
			self.callbacks
				.on_event(SyncEvent::FileDiffers { path: path.clone(), missing: candidate.missing });
			report.bytes_planned += sizes.get(&path).copied().unwrap_or(0);
			report.planned.push(path.clone());
			if dry_run {
				continue;
			}

			let from = path.under(source_root);
			let to = path.under(target_root);
			match copy_file(&from, &to, self.options.copy_buffer_size).await {
				Ok(bytes) => {
					debug!("Copied {} ({} bytes)", path, bytes);
					self.callbacks.on_event(SyncEvent::FileCopied { path: path.clone(), bytes });
					report.bytes_copied += bytes;
					report.copied.push(path);
				}
				Err(source) => {
					let err = SyncError::Copy { from, to, source };
					warn!("{}", err);
					self.callbacks
						.on_event(SyncEvent::CopyFailed { path: path.clone(), error: err.to_string() });
					report.failed.push((path, err.to_string()));
				}
			}
		}

		report.duration = start.elapsed();
		Ok(report)
	}
}

/// Sync `pairs` with default options and no status output
pub async fn sync_pairs(pairs: &[SyncPairSpec]) -> RunSummary {
	Synchronizer::new().run(pairs).await
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::types::ContentHash;

	fn rel(s: &str) -> RelPath {
		RelPath::from_relative(Path::new(s)).unwrap()
	}

	fn map(items: &[(&str, &[u8])]) -> FingerprintMap {
		items
			.iter()
			.map(|(p, data)| (rel(p), ContentHash::from_digest(&blake3::hash(data))))
			.collect()
	}

	#[test]
	fn test_plan_identical_maps_is_empty() {
		let m = map(&[("a.txt", b"X"), ("sub/b.txt", b"Y")]);
		assert!(plan_copies(&m, &m.clone()).is_empty());
	}

	#[test]
	fn test_plan_marks_missing_and_differing() {
		let source = map(&[("a.txt", b"X2"), ("new.txt", b"N"), ("same.txt", b"S")]);
		let target = map(&[("a.txt", b"X1"), ("same.txt", b"S")]);

		let plan = plan_copies(&source, &target);
		assert_eq!(
			plan,
			vec![
				CopyCandidate { path: rel("a.txt"), missing: false },
				CopyCandidate { path: rel("new.txt"), missing: true },
			]
		);
	}

	#[test]
	fn test_plan_ignores_target_only_files() {
		let source = map(&[("a.txt", b"X")]);
		let target = map(&[("a.txt", b"X"), ("extra.txt", b"E")]);
		assert!(plan_copies(&source, &target).is_empty());
	}

	#[test]
	fn test_outcome_classification() {
		let ok = PairOutcome::from_report(PairReport::default());
		assert!(ok.is_synced());

		let partial = PairOutcome::from_report(PairReport {
			failed: vec![(rel("a"), "boom".into())],
			..Default::default()
		});
		assert!(matches!(partial, PairOutcome::PartiallySynced(_)));
		assert!(partial.report().is_some());
	}

	#[test]
	fn test_summary_success_requires_all_synced() {
		let summary = RunSummary {
			pairs: vec![
				("a".into(), PairOutcome::Synced(PairReport::default())),
				("b".into(), PairOutcome::Skipped),
			],
		};
		assert!(!summary.is_success());
		assert_eq!(summary.count(|o| matches!(o, PairOutcome::Skipped)), 1);
		assert!(summary.outcome("a").unwrap().is_synced());
	}
}

// vim: ts=4
