use crate::error::{Result, WaitfixError};
use crate::fixer::discover::has_trigger;
use crate::rules::{RewriteEngine, RuleHit};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Options for a fix run.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixOptions {
	/// Compute rewrites but never write files.
	pub dry_run: bool,
}

/// What happened to a single file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
	/// No trigger substring present; the engine was not run.
	Skipped,

	/// Triggers present but the rewrite left the text unchanged.
	Unchanged,

	/// The rewrite changed the text.
	Fixed(FixedFile),
}

/// A file whose text the engine changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedFile {
	/// File content as read from disk.
	pub original: String,

	/// Content after every rule has run.
	pub rewritten: String,

	/// Total substitutions across all rules.
	pub changes: usize,

	/// Per-rule substitution counts, in pipeline order.
	pub hits: Vec<RuleHit>,

	/// Substitutions flagged for manual review.
	pub needs_review: usize,

	/// False in dry-run mode.
	pub written: bool,
}

/// Read, rewrite, and (unless dry-run) persist one file.
///
/// The file is only written when the rewritten text differs from the
/// original.
pub fn fix_file(
	engine: &RewriteEngine,
	path: &Path,
	triggers: &[String],
	options: FixOptions,
) -> Result<FileOutcome> {
	let original =
		std::fs::read_to_string(path).map_err(|source| WaitfixError::FileReadError {
			path: path.to_path_buf(),
			source,
		})?;

	if !has_trigger(&original, triggers) {
		debug!(path = %path.display(), "no trigger, skipping");
		return Ok(FileOutcome::Skipped);
	}

	let result = engine.rewrite(&original);
	if result.text == original {
		debug!(path = %path.display(), "no rule matched");
		return Ok(FileOutcome::Unchanged);
	}

	let needs_review = result.needs_review();

	if !options.dry_run {
		std::fs::write(path, &result.text).map_err(|source| WaitfixError::FileWriteError {
			path: path.to_path_buf(),
			source,
		})?;
	}

	info!(
		path = %path.display(),
		changes = result.changes,
		dry_run = options.dry_run,
		"rewrote file"
	);

	Ok(FileOutcome::Fixed(FixedFile {
		original,
		rewritten: result.text,
		changes: result.changes,
		hits: result.hits,
		needs_review,
		written: !options.dry_run,
	}))
}

/// A file that could not be processed.
#[derive(Debug)]
pub struct FileFailure {
	pub path: PathBuf,
	pub error: WaitfixError,
}

/// Totals for a batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
	/// Candidate files considered.
	pub files_scanned: usize,

	/// Files whose text changed.
	pub files_changed: usize,

	/// Substitutions across all changed files.
	pub total_changes: usize,

	/// Substitutions flagged for manual review.
	pub needs_review: usize,

	/// Files that failed to read or write.
	pub failures: Vec<FileFailure>,
}

impl BatchSummary {
	pub fn has_failures(&self) -> bool {
		!self.failures.is_empty()
	}
}

/// Run [`fix_file`] over every path in order.
///
/// A failing file is recorded in the summary and the batch moves on.
/// `on_file` is called once per successfully processed file.
pub fn run_batch<F>(
	engine: &RewriteEngine,
	files: &[PathBuf],
	triggers: &[String],
	options: FixOptions,
	mut on_file: F,
) -> BatchSummary
where
	F: FnMut(&Path, &FileOutcome),
{
	let mut summary = BatchSummary::default();

	for path in files {
		summary.files_scanned += 1;

		match fix_file(engine, path, triggers, options) {
			Ok(outcome) => {
				if let FileOutcome::Fixed(ref fixed) = outcome {
					summary.files_changed += 1;
					summary.total_changes += fixed.changes;
					summary.needs_review += fixed.needs_review;
				}
				on_file(path, &outcome);
			}
			Err(error) => {
				warn!(path = %path.display(), error = %error, "failed to process file");
				summary.failures.push(FileFailure {
					path: path.clone(),
					error,
				});
			}
		}
	}

	summary
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	fn triggers() -> Vec<String> {
		vec!["waitForTimeout".to_string(), "networkidle".to_string()]
	}

	fn engine() -> RewriteEngine {
		RewriteEngine::builtin().unwrap()
	}

	#[test]
	fn test_fix_file_writes_changes() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("a.spec.ts");
		fs::write(&path, "await page.waitForLoadState('networkidle')\n").unwrap();

		let outcome = fix_file(&engine(), &path, &triggers(), FixOptions::default()).unwrap();

		match outcome {
			FileOutcome::Fixed(fixed) => {
				assert_eq!(fixed.changes, 1);
				assert!(fixed.written);
				assert_eq!(fixed.needs_review, 0);
			}
			other => panic!("Expected Fixed, got {other:?}"),
		}
		assert_eq!(
			fs::read_to_string(&path).unwrap(),
			"await page.waitForSelector('body', { timeout: 5000 })\n"
		);
	}

	#[test]
	fn test_fix_file_dry_run_leaves_file() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("a.spec.ts");
		let content = "await page.waitForTimeout(10)\n";
		fs::write(&path, content).unwrap();

		let outcome = fix_file(&engine(), &path, &triggers(), FixOptions { dry_run: true }).unwrap();

		match outcome {
			FileOutcome::Fixed(fixed) => {
				assert!(!fixed.written);
				assert_eq!(fixed.original, content);
				assert_eq!(fixed.needs_review, 1);
			}
			other => panic!("Expected Fixed, got {other:?}"),
		}
		assert_eq!(fs::read_to_string(&path).unwrap(), content);
	}

	#[test]
	fn test_fix_file_without_trigger_is_skipped() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("a.spec.ts");
		// goto would be rewritten, but the file has no trigger substring.
		fs::write(&path, "await page.goto(url)\n").unwrap();

		let outcome = fix_file(&engine(), &path, &triggers(), FixOptions::default()).unwrap();
		assert_eq!(outcome, FileOutcome::Skipped);
		assert_eq!(fs::read_to_string(&path).unwrap(), "await page.goto(url)\n");
	}

	#[test]
	fn test_fix_file_trigger_without_match_is_unchanged() {
		let temp_dir = tempfile::tempdir().unwrap();
		let path = temp_dir.path().join("a.spec.ts");
		fs::write(&path, "// never use waitForTimeout here\n").unwrap();

		let outcome = fix_file(&engine(), &path, &triggers(), FixOptions::default()).unwrap();
		assert_eq!(outcome, FileOutcome::Unchanged);
	}

	#[test]
	fn test_run_batch_continues_after_failure() {
		let temp_dir = tempfile::tempdir().unwrap();
		let good = temp_dir.path().join("good.spec.ts");
		let missing = temp_dir.path().join("missing.spec.ts");
		let clean = temp_dir.path().join("clean.spec.ts");
		fs::write(&good, "await page.goto(url)\nawait page.waitForTimeout(5)\n").unwrap();
		fs::write(&clean, "expect(1).toBe(1)\n").unwrap();

		let mut seen = Vec::new();
		let summary = run_batch(
			&engine(),
			&[missing.clone(), good.clone(), clean.clone()],
			&triggers(),
			FixOptions::default(),
			|path, _| seen.push(path.to_path_buf()),
		);

		assert_eq!(summary.files_scanned, 3);
		assert_eq!(summary.files_changed, 1);
		assert_eq!(summary.total_changes, 2);
		assert_eq!(summary.needs_review, 1);
		assert!(summary.has_failures());
		assert_eq!(summary.failures.len(), 1);
		assert_eq!(summary.failures[0].path, missing);
		assert!(matches!(
			summary.failures[0].error,
			WaitfixError::FileReadError { .. }
		));
		assert_eq!(seen, vec![good, clean]);
	}
}
