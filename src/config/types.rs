use crate::error::WaitfixError;
use crate::rules::builtin;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::PathBuf;

/// Config file name looked up in each directory of the cascade.
pub const CONFIG_FILE_NAME: &str = ".waitfix.toml";

/// Directory scanned when neither the CLI nor any config names one.
pub const DEFAULT_TESTS_DIR: &str = "tests";

/// Filename suffixes selected when no config overrides them.
pub const DEFAULT_SUFFIXES: &[&str] = &[".spec.ts"];

/// Substrings a file must contain before the engine runs on it.
pub const DEFAULT_TRIGGERS: &[&str] = &["waitForTimeout", "networkidle"];

/// Directory names pruned from the scan.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &["node_modules", ".git"];

/// Top-level configuration from a `.waitfix.toml` file.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
	/// If true, stop walking up the directory tree after this file.
	#[serde(default)]
	pub root: bool,

	/// Environment variable name that, if truthy, skips ~/.waitfix.toml lookup.
	/// Useful for CI environments.
	#[serde(default)]
	pub root_config_lookup_disable_env_var: Option<String>,

	/// Directory to scan, relative to the directory holding this file.
	#[serde(default)]
	pub tests_dir: Option<PathBuf>,

	/// Filename suffixes of candidate test files, e.g. ".spec.ts".
	#[serde(default)]
	pub suffixes: Option<Vec<String>>,

	/// Substrings that mark a file as worth rewriting.
	#[serde(default)]
	pub triggers: Option<Vec<String>>,

	/// Directory names skipped while scanning.
	#[serde(default)]
	pub exclude_dirs: Option<Vec<String>>,

	/// Built-in rule names to switch off.
	#[serde(default)]
	pub disable: Vec<String>,

	/// Additional rewrite rules. They run after the contextual built-ins and
	/// before the fixed-timeout catch-all.
	#[serde(default)]
	pub rules: Vec<Rule>,
}

/// How a user-defined rule scans text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleMode {
	#[default]
	Document,
	Line,
}

/// A user-defined rewrite rule.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Rule {
	/// Unique name, shown in reports and listings.
	pub name: String,

	/// Optional one-line description.
	#[serde(default)]
	pub description: Option<String>,

	/// Regex to match.
	pub pattern: String,

	/// Replacement template using regex capture syntax (`$1`, `${name}`).
	pub replacement: String,

	/// Whether to match the whole document or line by line.
	#[serde(default)]
	pub mode: RuleMode,

	/// Skip any scope (document or line) containing one of these substrings.
	#[serde(default)]
	pub skip_if_contains: Vec<String>,

	/// Skip scopes ending in a trailing comma.
	#[serde(default)]
	pub skip_continuations: bool,

	/// If set, insert `// <review_note>` above each replacement.
	#[serde(default)]
	pub review_note: Option<String>,
}

/// A loaded configuration with its source path for debugging/display.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
	/// The parsed configuration.
	pub config: Config,

	/// The path this config was loaded from.
	pub path: PathBuf,
}

/// Merged configuration from multiple config files in the cascade.
#[derive(Debug, Clone)]
pub struct MergedConfig {
	/// Tests directory from the most specific config that sets one,
	/// already resolved against that config's directory.
	pub tests_dir: Option<PathBuf>,

	/// Effective filename suffixes.
	pub suffixes: Vec<String>,

	/// Effective trigger substrings.
	pub triggers: Vec<String>,

	/// Effective excluded directory names.
	pub exclude_dirs: Vec<String>,

	/// Union of disabled built-in rules.
	pub disabled: Vec<String>,

	/// All user rules from all configs, in cascade order.
	pub rules: Vec<RuleWithSource>,
}

impl Default for MergedConfig {
	fn default() -> Self {
		MergedConfig {
			tests_dir: None,
			suffixes: to_strings(DEFAULT_SUFFIXES),
			triggers: to_strings(DEFAULT_TRIGGERS),
			exclude_dirs: to_strings(DEFAULT_EXCLUDE_DIRS),
			disabled: Vec::new(),
			rules: Vec::new(),
		}
	}
}

pub(crate) fn to_strings(values: &[&str]) -> Vec<String> {
	values.iter().map(|s| s.to_string()).collect()
}

/// A rule with its source config path for debugging/display.
#[derive(Debug, Clone)]
pub struct RuleWithSource {
	/// The rule itself.
	pub rule: Rule,

	/// The config file this rule came from.
	pub source: PathBuf,
}

impl Rule {
	/// Validate fields that serde cannot check on its own.
	pub fn validate(&self) -> Result<(), WaitfixError> {
		if self.name.trim().is_empty() {
			return Err(WaitfixError::EmptyRuleName {
				pattern: self.pattern.clone(),
			});
		}

		if builtin::is_builtin(&self.name) {
			return Err(WaitfixError::DuplicateRule {
				name: self.name.clone(),
			});
		}

		Ok(())
	}
}

impl Config {
	/// Validate rule names and the disable list.
	pub fn validate(&self) -> Result<(), WaitfixError> {
		for name in &self.disable {
			if !builtin::is_builtin(name) {
				return Err(WaitfixError::UnknownRule { name: name.clone() });
			}
		}

		let mut seen = HashSet::new();
		for rule in &self.rules {
			rule.validate()?;
			if !seen.insert(rule.name.as_str()) {
				return Err(WaitfixError::DuplicateRule {
					name: rule.name.clone(),
				});
			}
		}

		Ok(())
	}
}
