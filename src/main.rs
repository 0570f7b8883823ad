use clap::{Arg, ArgAction, Command};
use std::path::PathBuf;
use std::process;

use hashmirror::callbacks::{NoProgressCallback, StatusPrinter};
use hashmirror::config::{load_config, ErrorPolicy, DEFAULT_CONFIG_PATH};
use hashmirror::logging::*;
use hashmirror::sync::{PairOutcome, Synchronizer};

/// Some pair was aborted or partially synced
const EXIT_PAIR_FAILED: i32 = 1;
/// Config could not be loaded, nothing was synced
const EXIT_CONFIG: i32 = 2;

fn cli() -> Command {
	Command::new("hashmirror")
		.version(env!("CARGO_PKG_VERSION"))
		.author("Szilard Hajba <szilu@symbion.hu>")
		.about("Mirror directory trees, copying only files whose content changed")
		.arg(
			Arg::new("config")
				.short('c')
				.long("config")
				.value_name("FILE")
				.default_value(DEFAULT_CONFIG_PATH)
				.help("JSON array of {name, originalPath, targetPath} pairs"),
		)
		.arg(
			Arg::new("dry-run")
				.short('n')
				.long("dry-run")
				.action(ArgAction::SetTrue)
				.help("Report what would be copied without touching targets"),
		)
		.arg(
			Arg::new("halt-on-error")
				.long("halt-on-error")
				.action(ArgAction::SetTrue)
				.help("Stop after the first aborted pair instead of continuing"),
		)
		.arg(
			Arg::new("quiet")
				.short('q')
				.long("quiet")
				.action(ArgAction::SetTrue)
				.help("Do not print status lines"),
		)
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
	init_tracing();
	let matches = cli().get_matches();

	let config_path = matches
		.get_one::<String>("config")
		.map(PathBuf::from)
		.unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH));
	let pairs = match load_config(&config_path) {
		Ok(pairs) => pairs,
		Err(e) => {
			error!("{}", e);
			process::exit(EXIT_CONFIG);
		}
	};
	info!("Loaded {} sync pairs from {}", pairs.len(), config_path.display());

	let policy =
		if matches.get_flag("halt-on-error") { ErrorPolicy::Halt } else { ErrorPolicy::Continue };
	let synchronizer =
		Synchronizer::new().dry_run(matches.get_flag("dry-run")).error_policy(policy);
	let synchronizer = if matches.get_flag("quiet") {
		synchronizer.callbacks(NoProgressCallback)
	} else {
		synchronizer.callbacks(StatusPrinter::stdout())
	};

	let summary = synchronizer.run(&pairs).await;

	let aborted = summary.count(PairOutcome::is_aborted);
	let partial = summary.count(|o| matches!(o, PairOutcome::PartiallySynced(_)));
	let skipped = summary.count(|o| matches!(o, PairOutcome::Skipped));
	info!(
		"Done: {} pairs, {} files copied, {} aborted, {} partial, {} skipped",
		summary.pairs.len(),
		summary.files_copied(),
		aborted,
		partial,
		skipped
	);

	if aborted + partial > 0 {
		process::exit(EXIT_PAIR_FAILED);
	}
}

// vim: ts=4
