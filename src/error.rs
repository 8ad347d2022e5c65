use std::path::PathBuf;

/// Library-level structured errors for waitfix.
///
/// Use `thiserror` for structured errors that library consumers can match on.
/// The CLI binary wraps these with `anyhow` for rich context chains.
#[derive(Debug, thiserror::Error)]
pub enum WaitfixError {
	#[error("Failed to read config file: {path}")]
	ConfigReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to parse config file: {path}")]
	ConfigParseError {
		path: PathBuf,
		#[source]
		source: toml::de::Error,
	},

	#[error("Invalid regex pattern in rule: {pattern}")]
	InvalidRegex {
		pattern: String,
		#[source]
		source: regex::Error,
	},

	#[error("Duplicate rule name: {name}")]
	DuplicateRule { name: String },

	#[error("Unknown built-in rule: {name}")]
	UnknownRule { name: String },

	#[error("Rule name must not be empty (pattern: {pattern})")]
	EmptyRuleName { pattern: String },

	#[error("Failed to read file: {path}")]
	FileReadError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to write file: {path}")]
	FileWriteError {
		path: PathBuf,
		#[source]
		source: std::io::Error,
	},

	#[error("Failed to walk directory: {root}")]
	WalkError {
		root: PathBuf,
		#[source]
		source: walkdir::Error,
	},

	#[error("Directory not found: {path}")]
	DirectoryNotFound { path: PathBuf },

	#[error("Failed to resolve home directory")]
	HomeDirectoryNotFound,
}

/// Result type alias using WaitfixError.
pub type Result<T> = std::result::Result<T, WaitfixError>;
