//! Configuration for hashmirror runs
//!
//! Two layers:
//! 1. The pair list, a JSON array read from a file (default `./config`)
//! 2. Runtime options (`SyncOptions`), built from defaults and CLI flags

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SyncError;

/// Config file looked up relative to the working directory
pub const DEFAULT_CONFIG_PATH: &str = "config";

/// Buffer size for streaming copies
pub const DEFAULT_COPY_BUFFER_SIZE: usize = 64 * 1024;

/// One source -> target directory pair
///
/// Paths are used as given: absolute, or relative to the process working
/// directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SyncPairSpec {
	/// Display label
	pub name: String,

	/// Source directory
	#[serde(rename = "originalPath")]
	pub source_root: PathBuf,

	/// Destination directory
	#[serde(rename = "targetPath")]
	pub target_root: PathBuf,
}

impl SyncPairSpec {
	pub fn new<S: Into<String>, P: Into<PathBuf>, Q: Into<PathBuf>>(
		name: S,
		source_root: P,
		target_root: Q,
	) -> Self {
		SyncPairSpec {
			name: name.into(),
			source_root: source_root.into(),
			target_root: target_root.into(),
		}
	}
}

/// Parse the pair list from config text
///
/// Accepts strict JSON as well as JSON5 (comments, trailing commas).
pub fn parse_config(text: &str) -> Result<Vec<SyncPairSpec>, String> {
	json5::from_str::<Vec<SyncPairSpec>>(text).map_err(|e| e.to_string())
}

/// Read and parse the pair list from `path`
pub fn load_config(path: &Path) -> Result<Vec<SyncPairSpec>, SyncError> {
	let text = fs::read_to_string(path)
		.map_err(|e| SyncError::Config { path: path.to_path_buf(), message: e.to_string() })?;
	parse_config(&text).map_err(|message| SyncError::Config { path: path.to_path_buf(), message })
}

/// What to do with the remaining pairs after one pair is aborted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ErrorPolicy {
	/// Report the aborted pair and move on to the next one
	#[default]
	Continue,
	/// Stop; remaining pairs are reported as skipped
	Halt,
}

/// Runtime options for a sync run
#[derive(Debug, Clone)]
pub struct SyncOptions {
	/// Plan changes without touching the target
	pub dry_run: bool,

	/// Handling of aborted pairs
	pub error_policy: ErrorPolicy,

	/// Buffer size for streaming copies
	pub copy_buffer_size: usize,
}

impl Default for SyncOptions {
	fn default() -> Self {
		SyncOptions {
			dry_run: false,
			error_policy: ErrorPolicy::Continue,
			copy_buffer_size: DEFAULT_COPY_BUFFER_SIZE,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_parse_config_reads_pairs_in_order() {
		let pairs = parse_config(
			r#"[
				{"name": "docs", "originalPath": "/src/docs", "targetPath": "/backup/docs"},
				{"name": "photos", "originalPath": "photos", "targetPath": "../mirror/photos"}
			]"#,
		)
		.unwrap();
		assert_eq!(pairs.len(), 2);
		assert_eq!(pairs[0], SyncPairSpec::new("docs", "/src/docs", "/backup/docs"));
		assert_eq!(pairs[1].name, "photos");
		assert_eq!(pairs[1].target_root, PathBuf::from("../mirror/photos"));
	}

	#[test]
	fn test_parse_config_empty_array() {
		assert!(parse_config("[]").unwrap().is_empty());
	}

	#[test]
	fn test_parse_config_accepts_comments() {
		let pairs = parse_config(
			r#"[
				// nightly mirror
				{name: "a", originalPath: "x", targetPath: "y",},
			]"#,
		)
		.unwrap();
		assert_eq!(pairs.len(), 1);
	}

	#[test]
	fn test_parse_config_rejects_missing_field() {
		assert!(parse_config(r#"[{"name": "a", "originalPath": "x"}]"#).is_err());
	}

	#[test]
	fn test_parse_config_rejects_object_top_level() {
		assert!(parse_config(r#"{"items": []}"#).is_err());
	}

	#[test]
	fn test_parse_config_rejects_unknown_field() {
		let text = r#"[{"name": "a", "originalPath": "x", "targetPath": "y", "delete": true}]"#;
		assert!(parse_config(text).is_err());
	}

	#[test]
	fn test_options_default() {
		let opts = SyncOptions::default();
		assert!(!opts.dry_run);
		assert_eq!(opts.error_policy, ErrorPolicy::Continue);
		assert_eq!(opts.copy_buffer_size, DEFAULT_COPY_BUFFER_SIZE);
	}
}

// vim: ts=4
