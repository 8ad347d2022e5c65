use crate::config::parser::parse_config_file;
use crate::config::types::{
	CONFIG_FILE_NAME, DEFAULT_EXCLUDE_DIRS, DEFAULT_SUFFIXES, DEFAULT_TRIGGERS, LoadedConfig,
	MergedConfig, RuleWithSource, to_strings,
};
use crate::error::{Result, WaitfixError};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Environment variable that, if truthy, always skips ~/.waitfix.toml.
pub const USER_CONFIG_DISABLE_ENV_VAR: &str = "WAITFIX_NO_USER_CONFIG";

/// Discover and load all config files in the cascade.
///
/// The cascade order is:
/// 1. Start from `start_dir` and look for `.waitfix.toml`
/// 2. If found and `root = true`, stop walking up
/// 3. Otherwise, continue up the directory tree
/// 4. Finally, check ~/.waitfix.toml (unless disabled)
///
/// Returns configs in cascade order (most specific first).
pub fn discover_configs(start_dir: &Path) -> Result<Vec<LoadedConfig>> {
	let mut configs = Vec::new();
	let mut current_dir = start_dir.to_path_buf();

	loop {
		let config_path = current_dir.join(CONFIG_FILE_NAME);

		if config_path.is_file() {
			let config = parse_config_file(&config_path)?;
			debug!(path = %config_path.display(), "loaded config");
			let is_root = config.root;

			configs.push(LoadedConfig {
				config,
				path: config_path,
			});

			if is_root {
				break;
			}
		}

		match current_dir.parent() {
			Some(parent) => current_dir = parent.to_path_buf(),
			None => break,
		}
	}

	if let Some(user_config) = load_user_config(&configs)? {
		// The walk may already have reached the home directory.
		if !configs.iter().any(|c| c.path == user_config.path) {
			configs.push(user_config);
		}
	}

	Ok(configs)
}

/// Load the user's ~/.waitfix.toml if it exists and isn't disabled.
fn load_user_config(existing_configs: &[LoadedConfig]) -> Result<Option<LoadedConfig>> {
	if is_env_truthy(USER_CONFIG_DISABLE_ENV_VAR) {
		return Ok(None);
	}

	for loaded in existing_configs {
		if let Some(ref env_var) = loaded.config.root_config_lookup_disable_env_var
			&& is_env_truthy(env_var)
		{
			return Ok(None);
		}
	}

	let user_config_path = user_config_path()?;

	if user_config_path.is_file() {
		let config = parse_config_file(&user_config_path)?;
		debug!(path = %user_config_path.display(), "loaded user config");
		Ok(Some(LoadedConfig {
			config,
			path: user_config_path,
		}))
	} else {
		Ok(None)
	}
}

/// Check if an environment variable is set to a truthy value.
fn is_env_truthy(var_name: &str) -> bool {
	match std::env::var(var_name) {
		Ok(value) => {
			let lower = value.to_lowercase();
			!value.is_empty() && lower != "0" && lower != "false" && lower != "no"
		}
		Err(_) => false,
	}
}

/// Merge multiple configs into a single effective config.
///
/// Settings come from the most specific config that sets them, falling back
/// to the built-in defaults. Disabled rules are unioned and user rules are
/// collected in cascade order.
pub fn merge_configs(configs: &[LoadedConfig]) -> MergedConfig {
	let mut tests_dir = None;
	let mut suffixes = None;
	let mut triggers = None;
	let mut exclude_dirs = None;
	let mut disabled: Vec<String> = Vec::new();
	let mut rules = Vec::new();

	for loaded in configs {
		let config = &loaded.config;

		if tests_dir.is_none()
			&& let Some(ref dir) = config.tests_dir
		{
			let base = loaded.path.parent().unwrap_or_else(|| Path::new(""));
			tests_dir = Some(base.join(dir));
		}
		if suffixes.is_none() {
			suffixes = config.suffixes.clone();
		}
		if triggers.is_none() {
			triggers = config.triggers.clone();
		}
		if exclude_dirs.is_none() {
			exclude_dirs = config.exclude_dirs.clone();
		}

		for name in &config.disable {
			if !disabled.contains(name) {
				disabled.push(name.clone());
			}
		}

		for rule in &config.rules {
			rules.push(RuleWithSource {
				rule: rule.clone(),
				source: loaded.path.clone(),
			});
		}
	}

	MergedConfig {
		tests_dir,
		suffixes: suffixes.unwrap_or_else(|| to_strings(DEFAULT_SUFFIXES)),
		triggers: triggers.unwrap_or_else(|| to_strings(DEFAULT_TRIGGERS)),
		exclude_dirs: exclude_dirs.unwrap_or_else(|| to_strings(DEFAULT_EXCLUDE_DIRS)),
		disabled,
		rules,
	}
}

/// Convenience function to discover, load, and merge configs from a directory.
pub fn load_merged_config(start_dir: &Path) -> Result<MergedConfig> {
	let configs = discover_configs(start_dir)?;
	Ok(merge_configs(&configs))
}

/// Get the path to the user's config file.
pub fn user_config_path() -> Result<PathBuf> {
	let home_dir = dirs::home_dir().ok_or(WaitfixError::HomeDirectoryNotFound)?;
	Ok(home_dir.join(CONFIG_FILE_NAME))
}
