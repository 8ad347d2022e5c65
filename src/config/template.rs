/// Generate the template written by `waitfix --init`.
pub fn generate_init_template() -> String {
	r#"# waitfix configuration
#
# Stop looking for .waitfix.toml files in parent directories.
root = true

# Directory to scan, relative to this file.
tests-dir = "tests"

# Filename suffixes of test files to rewrite.
suffixes = [".spec.ts"]

# A file is only rewritten if it contains one of these substrings.
triggers = ["waitForTimeout", "networkidle"]

# Directory names skipped while scanning.
exclude-dirs = ["node_modules", ".git"]

# Built-in rules to switch off:
# network-idle, goto-timeout, iframe-wait, click-wait, fixed-timeout
disable = []

# Extra rules run after the built-in contextual rules and before the
# fixed-timeout catch-all.
#
# [[rules]]
# name = "hover-wait"
# pattern = 'await (\w+)\.hover\(\)\n(\s*)await (\w+)\.waitForTimeout\(\d+\)'
# replacement = "await $1.hover()\n${2}await $3.waitForLoadState('domcontentloaded')"
# mode = "document"            # or "line"
# skip_if_contains = []
# skip_continuations = false
# review_note = "TODO: check hover wait"
"#
	.to_string()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::parser::parse_config_str;
	use std::path::PathBuf;

	#[test]
	fn test_template_parses() {
		let template = generate_init_template();
		let config = parse_config_str(&template, &PathBuf::from(".waitfix.toml")).unwrap();

		assert!(config.root);
		assert_eq!(config.tests_dir, Some(PathBuf::from("tests")));
		assert!(config.rules.is_empty());
	}
}
