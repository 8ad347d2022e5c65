use crate::config::types::Config;
use crate::error::{Result, WaitfixError};
use std::path::Path;

/// Parse a config file from the given path.
pub fn parse_config_file(path: &Path) -> Result<Config> {
	let content =
		std::fs::read_to_string(path).map_err(|source| WaitfixError::ConfigReadError {
			path: path.to_path_buf(),
			source,
		})?;

	parse_config_str(&content, path)
}

/// Parse a config from a string (useful for testing).
pub fn parse_config_str(content: &str, path: &Path) -> Result<Config> {
	let config: Config =
		toml::from_str(content).map_err(|source| WaitfixError::ConfigParseError {
			path: path.to_path_buf(),
			source,
		})?;

	config.validate()?;

	Ok(config)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::config::types::RuleMode;
	use std::path::PathBuf;

	#[test]
	fn test_parse_empty_config() {
		let path = PathBuf::from("test.toml");
		let config = parse_config_str("", &path).unwrap();

		assert!(!config.root);
		assert!(config.root_config_lookup_disable_env_var.is_none());
		assert!(config.tests_dir.is_none());
		assert!(config.suffixes.is_none());
		assert!(config.disable.is_empty());
		assert!(config.rules.is_empty());
	}

	#[test]
	fn test_parse_basic_config() {
		let content = r#"
root = true
root-config-lookup-disable-env-var = "CI"
tests-dir = "e2e"
suffixes = [".spec.ts", ".spec.js"]
triggers = ["waitForTimeout"]
exclude-dirs = ["fixtures"]
disable = ["goto-timeout"]
"#;
		let path = PathBuf::from("test.toml");
		let config = parse_config_str(content, &path).unwrap();

		assert!(config.root);
		assert_eq!(
			config.root_config_lookup_disable_env_var,
			Some("CI".to_string())
		);
		assert_eq!(config.tests_dir, Some(PathBuf::from("e2e")));
		assert_eq!(
			config.suffixes,
			Some(vec![".spec.ts".to_string(), ".spec.js".to_string()])
		);
		assert_eq!(config.triggers, Some(vec!["waitForTimeout".to_string()]));
		assert_eq!(config.exclude_dirs, Some(vec!["fixtures".to_string()]));
		assert_eq!(config.disable, vec!["goto-timeout".to_string()]);
	}

	#[test]
	fn test_parse_rules_array_of_tables() {
		let content = r#"
[[rules]]
name = "hover-wait"
pattern = 'await (\w+)\.hover\(\)'
replacement = "await $1.hover({ trial: true })"

[[rules]]
name = "sleep"
description = "flag sleep() helpers"
pattern = 'sleep\((\d+)\)'
replacement = "pause($1)"
mode = "line"
skip_if_contains = ["// keep"]
skip_continuations = true
review_note = "check pause"
"#;
		let path = PathBuf::from("test.toml");
		let config = parse_config_str(content, &path).unwrap();

		assert_eq!(config.rules.len(), 2);

		let rule1 = &config.rules[0];
		assert_eq!(rule1.name, "hover-wait");
		assert_eq!(rule1.pattern, r"await (\w+)\.hover\(\)");
		assert_eq!(rule1.mode, RuleMode::Document);
		assert!(rule1.review_note.is_none());

		let rule2 = &config.rules[1];
		assert_eq!(rule2.mode, RuleMode::Line);
		assert_eq!(rule2.description, Some("flag sleep() helpers".to_string()));
		assert_eq!(rule2.skip_if_contains, vec!["// keep".to_string()]);
		assert!(rule2.skip_continuations);
		assert_eq!(rule2.review_note, Some("check pause".to_string()));
	}

	#[test]
	fn test_parse_rules_inline_tables() {
		let content = r#"
rules = [
    { name = "a", pattern = "x", replacement = "y" },
    { name = "b", pattern = "z", replacement = "w", mode = "line" },
]
"#;
		let path = PathBuf::from("test.toml");
		let config = parse_config_str(content, &path).unwrap();

		assert_eq!(config.rules.len(), 2);
	}

	#[test]
	fn test_invalid_toml() {
		let path = PathBuf::from("test.toml");
		let result = parse_config_str("invalid toml [[[", &path);
		assert!(matches!(
			result,
			Err(WaitfixError::ConfigParseError { .. })
		));
	}

	#[test]
	fn test_rule_missing_pattern() {
		let content = r#"
[[rules]]
name = "a"
replacement = "y"
"#;
		let path = PathBuf::from("test.toml");
		assert!(parse_config_str(content, &path).is_err());
	}

	#[test]
	fn test_unknown_mode_rejected() {
		let content = r#"
[[rules]]
name = "a"
pattern = "x"
replacement = "y"
mode = "paragraph"
"#;
		let path = PathBuf::from("test.toml");
		assert!(matches!(
			parse_config_str(content, &path),
			Err(WaitfixError::ConfigParseError { .. })
		));
	}

	#[test]
	fn test_unknown_disabled_rule() {
		let path = PathBuf::from("test.toml");
		let result = parse_config_str(r#"disable = ["nope"]"#, &path);

		match result.unwrap_err() {
			WaitfixError::UnknownRule { name } => assert_eq!(name, "nope"),
			_ => panic!("Expected UnknownRule error"),
		}
	}

	#[test]
	fn test_duplicate_rule_names() {
		let content = r#"
[[rules]]
name = "a"
pattern = "x"
replacement = "y"

[[rules]]
name = "a"
pattern = "z"
replacement = "w"
"#;
		let path = PathBuf::from("test.toml");

		match parse_config_str(content, &path).unwrap_err() {
			WaitfixError::DuplicateRule { name } => assert_eq!(name, "a"),
			_ => panic!("Expected DuplicateRule error"),
		}
	}

	#[test]
	fn test_rule_shadowing_builtin() {
		let content = r#"
[[rules]]
name = "fixed-timeout"
pattern = "x"
replacement = "y"
"#;
		let path = PathBuf::from("test.toml");
		assert!(matches!(
			parse_config_str(content, &path),
			Err(WaitfixError::DuplicateRule { .. })
		));
	}

	#[test]
	fn test_empty_rule_name() {
		let content = r#"
[[rules]]
name = "  "
pattern = "x"
replacement = "y"
"#;
		let path = PathBuf::from("test.toml");
		assert!(matches!(
			parse_config_str(content, &path),
			Err(WaitfixError::EmptyRuleName { .. })
		));
	}
}
