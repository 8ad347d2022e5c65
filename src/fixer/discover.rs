use crate::error::{Result, WaitfixError};
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::{DirEntry, WalkDir};

/// Recursively collect files under `root` whose names end with one of
/// `suffixes`, pruning directories named in `exclude_dirs`.
///
/// Results are sorted by path. An unreadable subdirectory is logged and
/// skipped; only a failure on `root` itself is an error.
pub fn find_candidates(
	root: &Path,
	suffixes: &[String],
	exclude_dirs: &[String],
) -> Result<Vec<PathBuf>> {
	if !root.is_dir() {
		return Err(WaitfixError::DirectoryNotFound {
			path: root.to_path_buf(),
		});
	}

	let mut files = Vec::new();
	let walker = WalkDir::new(root)
		.sort_by_file_name()
		.into_iter()
		.filter_entry(|entry| !is_excluded(entry, exclude_dirs));

	for entry in walker {
		let entry = match entry {
			Ok(entry) => entry,
			Err(source) if source.depth() == 0 => {
				return Err(WaitfixError::WalkError {
					root: root.to_path_buf(),
					source,
				});
			}
			Err(e) => {
				warn!(error = %e, "skipping unreadable entry");
				continue;
			}
		};

		if entry.file_type().is_file() && has_suffix(entry.path(), suffixes) {
			files.push(entry.into_path());
		}
	}

	Ok(files)
}

fn is_excluded(entry: &DirEntry, exclude_dirs: &[String]) -> bool {
	entry.depth() > 0
		&& entry.file_type().is_dir()
		&& entry
			.file_name()
			.to_str()
			.is_some_and(|name| exclude_dirs.iter().any(|d| d == name))
}

/// Check whether the file name ends with one of `suffixes`.
///
/// A file named exactly like the suffix (e.g. `.spec.ts`) does not count.
pub fn has_suffix(path: &Path, suffixes: &[String]) -> bool {
	path.file_name()
		.and_then(|name| name.to_str())
		.is_some_and(|name| {
			suffixes
				.iter()
				.any(|suffix| name.len() > suffix.len() && name.ends_with(suffix.as_str()))
		})
}

/// Check whether `content` contains any trigger substring.
pub fn has_trigger(content: &str, triggers: &[String]) -> bool {
	triggers
		.iter()
		.any(|trigger| content.contains(trigger.as_str()))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::fs;

	fn strings(values: &[&str]) -> Vec<String> {
		values.iter().map(|s| s.to_string()).collect()
	}

	#[test]
	fn test_has_suffix() {
		let suffixes = strings(&[".spec.ts"]);
		assert!(has_suffix(Path::new("tests/login.spec.ts"), &suffixes));
		assert!(!has_suffix(Path::new("tests/login.ts"), &suffixes));
		assert!(!has_suffix(Path::new("tests/login.spec.tsx"), &suffixes));
		assert!(!has_suffix(Path::new("tests/.spec.ts"), &suffixes));
	}

	#[test]
	fn test_has_trigger_either_substring() {
		let triggers = strings(&["waitForTimeout", "networkidle"]);
		assert!(has_trigger("await page.waitForTimeout(1)", &triggers));
		assert!(has_trigger("waitForLoadState('networkidle')", &triggers));
		assert!(!has_trigger("await page.click()", &triggers));
	}

	#[test]
	fn test_find_candidates_recursive_sorted_and_pruned() {
		let temp_dir = tempfile::tempdir().unwrap();
		let root = temp_dir.path();
		fs::create_dir_all(root.join("auth")).unwrap();
		fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
		fs::write(root.join("b.spec.ts"), "").unwrap();
		fs::write(root.join("a.spec.ts"), "").unwrap();
		fs::write(root.join("helper.ts"), "").unwrap();
		fs::write(root.join("auth/login.spec.ts"), "").unwrap();
		fs::write(root.join("node_modules/pkg/x.spec.ts"), "").unwrap();

		let files = find_candidates(
			root,
			&strings(&[".spec.ts"]),
			&strings(&["node_modules"]),
		)
		.unwrap();

		let relative: Vec<_> = files
			.iter()
			.map(|p| p.strip_prefix(root).unwrap().to_path_buf())
			.collect();
		assert_eq!(
			relative,
			vec![
				PathBuf::from("a.spec.ts"),
				PathBuf::from("auth/login.spec.ts"),
				PathBuf::from("b.spec.ts"),
			]
		);
	}

	#[test]
	fn test_find_candidates_missing_root() {
		let temp_dir = tempfile::tempdir().unwrap();
		let missing = temp_dir.path().join("nope");

		match find_candidates(&missing, &strings(&[".spec.ts"]), &[]).unwrap_err() {
			WaitfixError::DirectoryNotFound { path } => assert_eq!(path, missing),
			_ => panic!("Expected DirectoryNotFound error"),
		}
	}
}
