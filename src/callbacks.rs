//! Callback traits for status reporting
//!
//! The synchronizer reports what it does as `SyncEvent`s. The CLI turns them
//! into human-readable lines on stdout with [`StatusPrinter`]; library users
//! can pass any closure instead.

use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use crate::types::RelPath;

/// Events emitted while syncing
#[derive(Debug, Clone, PartialEq)]
pub enum SyncEvent {
	/// A pair is about to be processed
	PairStarted { name: String, source: PathBuf, target: PathBuf },

	/// A directory was created below the target root (or would be, in dry run)
	DirCreated { path: RelPath, dry_run: bool },

	/// A source file is missing from the target or has different content
	FileDiffers { path: RelPath, missing: bool },

	/// A copy attempt succeeded
	FileCopied { path: RelPath, bytes: u64 },

	/// A copy attempt failed; the file was skipped
	CopyFailed { path: RelPath, error: String },

	/// The pair could not be synced at all
	PairAborted { name: String, error: String },

	/// The pair ran to the end
	PairFinished {
		name: String,
		source: PathBuf,
		target: PathBuf,
		copied: usize,
		failed: usize,
	},

	/// The pair was not attempted because the run halted earlier
	PairSkipped { name: String },
}

/// Trait for receiving sync events
pub trait SyncProgressCallback: Send + Sync {
	fn on_event(&self, _event: SyncEvent) {}
}

impl<T: Fn(SyncEvent) + Send + Sync> SyncProgressCallback for T {
	fn on_event(&self, event: SyncEvent) {
		self(event);
	}
}

/// Callback that drops every event
pub struct NoProgressCallback;

impl SyncProgressCallback for NoProgressCallback {}

/// Writes one status line per event
pub struct StatusPrinter<W: Write + Send> {
	out: Mutex<W>,
}

impl StatusPrinter<io::Stdout> {
	pub fn stdout() -> Self {
		StatusPrinter::new(io::stdout())
	}
}

impl<W: Write + Send> StatusPrinter<W> {
	pub fn new(out: W) -> Self {
		StatusPrinter { out: Mutex::new(out) }
	}

	pub fn into_inner(self) -> W {
		self.out.into_inner().unwrap_or_else(|e| e.into_inner())
	}

	/// Render an event as a single line
	pub fn format_event(event: &SyncEvent) -> String {
		match event {
			SyncEvent::PairStarted { name, source, target } => {
				format!("[{}] syncing {} -> {}", name, source.display(), target.display())
			}
			SyncEvent::DirCreated { path, dry_run } => {
				let verb = if *dry_run { "would create" } else { "created" };
				format!("{} directory /{}", verb, path)
			}
			SyncEvent::FileDiffers { path, missing: true } => {
				format!("file /{} is missing in target", path)
			}
			SyncEvent::FileDiffers { path, missing: false } => {
				format!("file /{} content differs", path)
			}
			SyncEvent::FileCopied { path, bytes } => format!("copied /{} ({} bytes)", path, bytes),
			SyncEvent::CopyFailed { path, error } => format!("copy of /{} failed: {}", path, error),
			SyncEvent::PairAborted { name, error } => format!("[{}] aborted: {}", name, error),
			SyncEvent::PairFinished { name, source, target, copied, failed } => format!(
				"Name: {}, OriginalPath: {}, TargetPath: {} ({} copied, {} failed)",
				name,
				source.display(),
				target.display(),
				copied,
				failed
			),
			SyncEvent::PairSkipped { name } => format!("[{}] skipped", name),
		}
	}
}

impl<W: Write + Send> SyncProgressCallback for StatusPrinter<W> {
	fn on_event(&self, event: SyncEvent) {
		let line = Self::format_event(&event);
		let mut out = self.out.lock().unwrap_or_else(|e| e.into_inner());
		// Status output is best effort
		let _ = writeln!(out, "{}", line);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::path::Path;

	#[test]
	fn test_closure_is_a_callback() {
		let seen = Mutex::new(Vec::new());
		let cb = |e: SyncEvent| seen.lock().unwrap().push(e);
		cb.on_event(SyncEvent::PairSkipped { name: "a".into() });
		assert_eq!(seen.lock().unwrap().len(), 1);
	}

	#[test]
	fn test_printer_writes_lines() {
		let printer = StatusPrinter::new(Vec::new());
		let path = RelPath::from_relative(Path::new("sub/b.txt")).unwrap();
		printer.on_event(SyncEvent::FileDiffers { path: path.clone(), missing: true });
		printer.on_event(SyncEvent::FileCopied { path, bytes: 1 });

		let text = String::from_utf8(printer.into_inner()).unwrap();
		let lines: Vec<&str> = text.lines().collect();
		assert_eq!(
			lines,
			vec!["file /sub/b.txt is missing in target", "copied /sub/b.txt (1 bytes)"]
		);
	}

	#[test]
	fn test_pair_finished_line_names_paths() {
		let line = StatusPrinter::<Vec<u8>>::format_event(&SyncEvent::PairFinished {
			name: "docs".into(),
			source: PathBuf::from("/s"),
			target: PathBuf::from("/t"),
			copied: 2,
			failed: 0,
		});
		assert!(line.starts_with("Name: docs, OriginalPath: /s, TargetPath: /t"));
	}
}

// vim: ts=4
