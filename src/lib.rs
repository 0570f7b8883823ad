//! # hashmirror - Content-Hash Directory Mirroring
//!
//! hashmirror makes a target directory tree match a source tree by copying
//! only the files whose content hash is missing or different in the target.
//! Directory structure is mirrored, including empty directories. Files that
//! exist only in the target are left alone.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use hashmirror::config::SyncPairSpec;
//! use hashmirror::sync::sync_pairs;
//!
//! #[tokio::main]
//! async fn main() {
//!     let pairs = vec![SyncPairSpec::new("docs", "./docs", "/backup/docs")];
//!     let summary = sync_pairs(&pairs).await;
//!     println!("Copied {} files", summary.files_copied());
//! }
//! ```
//!
//! ## Using the Builder Pattern
//!
//! ```rust,ignore
//! use hashmirror::callbacks::StatusPrinter;
//! use hashmirror::config::{load_config, ErrorPolicy};
//! use hashmirror::sync::Synchronizer;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pairs = load_config("config".as_ref())?;
//!     let summary = Synchronizer::new()
//!         .error_policy(ErrorPolicy::Halt)
//!         .callbacks(StatusPrinter::stdout())
//!         .run(&pairs)
//!         .await;
//!     assert!(summary.is_success());
//!     Ok(())
//! }
//! ```

pub mod callbacks;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod logging;
pub mod sync;
pub mod types;
pub mod validation;
pub mod walk;

// Re-export commonly used types and functions
pub use config::{ErrorPolicy, SyncOptions, SyncPairSpec};
pub use error::{SyncError, TreeSide};
pub use sync::{PairOutcome, PairReport, RunSummary, Synchronizer};
pub use types::{ContentHash, EntryKind, FingerprintMap, RelPath, TreeEntry};

// vim: ts=4
