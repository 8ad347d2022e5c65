use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

use waitfix_cli::config::types::{CONFIG_FILE_NAME, DEFAULT_TESTS_DIR};
use waitfix_cli::config::{
	discover_configs, generate_init_template, load_merged_config, user_config_path,
};
use waitfix_cli::fixer::{FileOutcome, FixOptions, find_candidates, run_batch};
use waitfix_cli::rules::RewriteEngine;
use waitfix_cli::rules::builtin::REVIEW_NOTE;

#[derive(Parser)]
#[command(name = "waitfix")]
#[command(
	author,
	version,
	about = "Rewrite fragile waits in end-to-end test files into deterministic ones"
)]
struct Cli {
	#[command(subcommand)]
	command: Option<Commands>,

	/// Directory to scan (default: tests-dir from config, else ./tests).
	/// A directory named like a subcommand must be given as a path, e.g. ./rules or ./config
	#[arg(value_name = "DIR")]
	dir: Option<PathBuf>,

	/// Filename suffix of test files; may be repeated (overrides config)
	#[arg(short, long = "suffix", value_name = "SUFFIX")]
	suffixes: Vec<String>,

	/// Show what would change without writing any file
	#[arg(short = 'n', long)]
	dry_run: bool,

	/// Print a unified diff for each changed file
	#[arg(short, long)]
	diff: bool,

	/// Like --dry-run, but exit with failure if any file would change
	#[arg(long)]
	check: bool,

	/// Increase log verbosity (-v, -vv, -vvv)
	#[arg(short, long, action = clap::ArgAction::Count, global = true)]
	verbose: u8,

	/// Create a template .waitfix.toml in the current directory
	#[arg(long)]
	init: bool,

	/// Overwrite existing .waitfix.toml when using --init
	#[arg(long, requires = "init")]
	force: bool,
}

#[derive(Subcommand)]
enum Commands {
	/// List the effective rewrite rules in the order they run
	Rules,
	/// Configuration management commands
	Config {
		#[command(subcommand)]
		action: ConfigAction,
	},
}

#[derive(Subcommand)]
enum ConfigAction {
	/// Display discovered configuration files in cascade order
	Show,
	/// Check all config files and user rules for errors without rewriting anything
	Validate,
}

fn main() -> ExitCode {
	let cli = Cli::parse();
	init_logging(cli.verbose);

	match run(cli) {
		Ok(code) => code,
		Err(e) => {
			eprintln!("error: {e:?}");
			ExitCode::FAILURE
		}
	}
}

fn init_logging(verbose: u8) {
	let default_directive = match verbose {
		0 => "waitfix_cli=warn",
		1 => "waitfix_cli=info",
		2 => "waitfix_cli=debug",
		_ => "waitfix_cli=trace",
	};
	let filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_target(false)
		.with_writer(std::io::stderr)
		.compact()
		.init();
}

fn run(cli: Cli) -> Result<ExitCode> {
	if cli.init {
		return handle_init(cli.force);
	}

	if let Some(command) = &cli.command {
		return match command {
			Commands::Rules => handle_rules(),
			Commands::Config { action } => match action {
				ConfigAction::Show => handle_config_show(),
				ConfigAction::Validate => handle_config_validate(),
			},
		};
	}

	handle_fix(&cli)
}

fn handle_init(force: bool) -> Result<ExitCode> {
	let config_path = PathBuf::from(CONFIG_FILE_NAME);

	if config_path.exists() && !force {
		anyhow::bail!("{CONFIG_FILE_NAME} already exists. Use --force to overwrite.");
	}

	std::fs::write(&config_path, generate_init_template())
		.with_context(|| format!("Failed to write {}", config_path.display()))?;

	println!("Created {CONFIG_FILE_NAME}");
	Ok(ExitCode::SUCCESS)
}

fn handle_fix(cli: &Cli) -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;

	// Config is looked up from the scanned directory when one is given.
	let start_dir = cli.dir.as_ref().map_or_else(|| cwd.clone(), |dir| cwd.join(dir));
	let config = load_merged_config(&start_dir).context("Failed to load configuration")?;
	let engine = RewriteEngine::from_config(&config).context("Failed to build rewrite rules")?;

	let root = match (&cli.dir, &config.tests_dir) {
		(Some(dir), _) => cwd.join(dir),
		(None, Some(dir)) => dir.clone(),
		(None, None) => cwd.join(DEFAULT_TESTS_DIR),
	};
	let suffixes = if cli.suffixes.is_empty() {
		config.suffixes.clone()
	} else {
		cli.suffixes.clone()
	};

	let files = find_candidates(&root, &suffixes, &config.exclude_dirs)
		.with_context(|| format!("Failed to scan {}", root.display()))?;

	let dry_run = cli.dry_run || cli.check;
	println!(
		"Processing {} test {} in {}...\n",
		files.len(),
		plural(files.len(), "file"),
		root.display()
	);

	let verb = if dry_run { "Would fix" } else { "Fixed" };
	let summary = run_batch(
		&engine,
		&files,
		&config.triggers,
		FixOptions { dry_run },
		|path, outcome| {
			if let FileOutcome::Fixed(fixed) = outcome {
				let shown = path.strip_prefix(&cwd).unwrap_or(path);
				println!(
					"{} {verb} {} {} in {}",
					"✓".green(),
					fixed.changes,
					plural(fixed.changes, "issue"),
					shown.display()
				);
				if cli.diff {
					display_diff(shown, &fixed.original, &fixed.rewritten);
				}
			}
		},
	);

	for failure in &summary.failures {
		eprintln!(
			"{} {}: {}",
			"✗".red(),
			failure.path.display(),
			error_chain(&failure.error)
		);
	}

	println!(
		"\n{verb} {} {} in {} {}",
		summary.total_changes,
		plural(summary.total_changes, "issue"),
		summary.files_changed,
		plural(summary.files_changed, "file")
	);

	if summary.needs_review > 0 {
		println!(
			"\n{} {} {} marked for manual review",
			"⚠".yellow(),
			summary.needs_review,
			plural(summary.needs_review, "wait")
		);
		println!("   Search for '{REVIEW_NOTE}' to find them");
	}

	if summary.has_failures() || (cli.check && summary.files_changed > 0) {
		return Ok(ExitCode::FAILURE);
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_rules() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let config = load_merged_config(&cwd).context("Failed to load configuration")?;
	let engine = RewriteEngine::from_config(&config).context("Failed to build rewrite rules")?;

	println!("Rewrite rules (in application order):\n");
	for (i, rule) in engine.rules().iter().enumerate() {
		let marker = if rule.replacement.is_flagged() {
			" [review]"
		} else {
			""
		};
		println!("  {}. {} ({}){}", i + 1, rule.name, rule.mode.as_str(), marker);
		println!("     {}", rule.description);
	}

	if !config.disabled.is_empty() {
		println!("\nDisabled: {}", config.disabled.join(", "));
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_show() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;
	let configs = discover_configs(&cwd).context("Failed to discover config files")?;

	if configs.is_empty() {
		println!("No configuration files found.");
		return Ok(ExitCode::SUCCESS);
	}

	println!("Configuration files (in cascade order):\n");

	for loaded in &configs {
		let config = &loaded.config;
		println!("# Source: {}", loaded.path.display());
		println!("# root: {}", config.root);
		if let Some(ref env_var) = config.root_config_lookup_disable_env_var {
			println!("# root-config-lookup-disable-env-var: {}", env_var);
		}
		if let Some(ref dir) = config.tests_dir {
			println!("# tests-dir: {}", dir.display());
		}
		if let Some(ref suffixes) = config.suffixes {
			println!("# suffixes: {}", suffixes.join(", "));
		}
		if let Some(ref triggers) = config.triggers {
			println!("# triggers: {}", triggers.join(", "));
		}
		if let Some(ref dirs) = config.exclude_dirs {
			println!("# exclude-dirs: {}", dirs.join(", "));
		}
		if !config.disable.is_empty() {
			println!("# disable: {}", config.disable.join(", "));
		}
		println!("# rules: {}", config.rules.len());
		println!();

		for (i, rule) in config.rules.iter().enumerate() {
			println!("  Rule {}: {}", i + 1, rule.name);
			println!("    pattern: {}", rule.pattern);
			println!("    replacement: {}", rule.replacement);
			println!("    mode: {:?}", rule.mode);
			if !rule.skip_if_contains.is_empty() {
				println!("    skip_if_contains: {}", rule.skip_if_contains.join(", "));
			}
			if rule.skip_continuations {
				println!("    skip_continuations: true");
			}
			if let Some(ref note) = rule.review_note {
				println!("    review_note: {}", note);
			}
			println!();
		}
	}

	if let Ok(user_path) = user_config_path() {
		println!("User config path: {}", user_path.display());
		if user_path.exists() {
			println!("  (exists)");
		} else {
			println!("  (not found)");
		}
	}

	Ok(ExitCode::SUCCESS)
}

fn handle_config_validate() -> Result<ExitCode> {
	let cwd = std::env::current_dir().context("Failed to get current directory")?;

	let configs = match discover_configs(&cwd) {
		Ok(configs) => configs,
		Err(e) => {
			eprintln!("Configuration error: {}", error_chain(&e));
			return Ok(ExitCode::FAILURE);
		}
	};

	// Compiles every user rule, catching bad regexes and cross-file name clashes.
	let merged = waitfix_cli::config::merge_configs(&configs);
	if let Err(e) = RewriteEngine::from_config(&merged) {
		eprintln!("Configuration error: {}", error_chain(&e));
		return Ok(ExitCode::FAILURE);
	}

	if configs.is_empty() {
		println!("No configuration files found.");
	} else {
		println!("All configuration files are valid:");
		for loaded in &configs {
			println!(
				"  {} ({} rules)",
				loaded.path.display(),
				loaded.config.rules.len()
			);
		}
	}

	Ok(ExitCode::SUCCESS)
}

/// Show unified diff between original and rewritten content
fn display_diff(file: &Path, original: &str, rewritten: &str) {
	println!("{}", format!("--- {} (original)", file.display()).dimmed());
	println!("{}", format!("+++ {} (rewritten)", file.display()).dimmed());

	let diff = TextDiff::from_lines(original, rewritten);

	for change in diff.iter_all_changes() {
		let line = match change.tag() {
			ChangeTag::Delete => format!("-{}", change).red(),
			ChangeTag::Insert => format!("+{}", change).green(),
			ChangeTag::Equal => continue,
		};
		print!("{}", line);
		if change.missing_newline() {
			println!();
		}
	}
	println!();
}

/// Render an error and its source chain on one line.
fn error_chain(error: &dyn std::error::Error) -> String {
	let mut message = error.to_string();
	let mut source = error.source();
	while let Some(cause) = source {
		message.push_str(": ");
		message.push_str(&cause.to_string());
		source = cause.source();
	}
	message
}

fn plural(count: usize, word: &str) -> String {
	if count == 1 {
		word.to_string()
	} else {
		format!("{word}s")
	}
}
