use crate::config::types::{MergedConfig, RuleMode, RuleWithSource};
use crate::error::{Result, WaitfixError};
use crate::rules::builtin::{self, FIXED_TIMEOUT};
use crate::rules::rewriter::{Guard, MatchMode, Replacement, RewriteRule};
use std::collections::HashSet;
use tracing::debug;

/// How many substitutions one rule made during a rewrite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleHit {
	/// Name of the rule that fired.
	pub rule: String,

	/// Number of individual substitutions.
	pub count: usize,

	/// Whether the substitutions carry a review comment.
	pub flagged: bool,
}

/// Outcome of running the full rule pipeline over one text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteResult {
	/// The rewritten text.
	pub text: String,

	/// Total substitutions across all rules.
	pub changes: usize,

	/// Per-rule breakdown, in pipeline order. Rules with no matches are omitted.
	pub hits: Vec<RuleHit>,
}

impl RewriteResult {
	/// Substitutions made by the named rule.
	pub fn hit_count(&self, rule: &str) -> usize {
		self.hits
			.iter()
			.filter(|hit| hit.rule == rule)
			.map(|hit| hit.count)
			.sum()
	}

	/// Substitutions that were flagged for manual review.
	pub fn needs_review(&self) -> usize {
		self.hits
			.iter()
			.filter(|hit| hit.flagged)
			.map(|hit| hit.count)
			.sum()
	}
}

/// An ordered rewrite pipeline.
#[derive(Debug, Clone)]
pub struct RewriteEngine {
	rules: Vec<RewriteRule>,
}

impl RewriteEngine {
	/// Build an engine from an explicit rule list.
	pub fn new(rules: Vec<RewriteRule>) -> Self {
		RewriteEngine { rules }
	}

	/// The built-in pipeline with no configuration applied.
	pub fn builtin() -> Result<Self> {
		Ok(RewriteEngine::new(builtin::builtin_rules()?))
	}

	/// Build the effective pipeline for a merged config.
	///
	/// Enabled contextual built-ins come first, then user rules in cascade
	/// order, then the `fixed-timeout` catch-all unless it is disabled.
	pub fn from_config(config: &MergedConfig) -> Result<Self> {
		for name in &config.disabled {
			if !builtin::is_builtin(name) {
				return Err(WaitfixError::UnknownRule { name: name.clone() });
			}
		}
		let enabled = |name: &str| !config.disabled.iter().any(|d| d == name);

		let mut rules: Vec<RewriteRule> = builtin::contextual_rules()?
			.into_iter()
			.filter(|rule| enabled(&rule.name))
			.collect();

		let mut seen: HashSet<&str> = builtin::BUILTIN_RULE_NAMES.iter().copied().collect();
		for rws in &config.rules {
			if !seen.insert(rws.rule.name.as_str()) {
				return Err(WaitfixError::DuplicateRule {
					name: rws.rule.name.clone(),
				});
			}
			rules.push(compile_rule(rws)?);
		}

		if enabled(FIXED_TIMEOUT) {
			rules.extend(
				builtin::builtin_rules()?
					.into_iter()
					.filter(|rule| rule.name == FIXED_TIMEOUT),
			);
		}

		Ok(RewriteEngine::new(rules))
	}

	/// The pipeline in application order.
	pub fn rules(&self) -> &[RewriteRule] {
		&self.rules
	}

	/// Apply every rule in order, each to the previous rule's output.
	pub fn rewrite(&self, text: &str) -> RewriteResult {
		let initial = RewriteResult {
			text: text.to_string(),
			changes: 0,
			hits: Vec::new(),
		};

		self.rules.iter().fold(initial, |mut acc, rule| {
			let (rewritten, count) = rule.apply(&acc.text);
			if count > 0 {
				debug!(rule = %rule.name, count, "rule applied");
				acc.text = rewritten;
				acc.changes += count;
				acc.hits.push(RuleHit {
					rule: rule.name.clone(),
					count,
					flagged: rule.replacement.is_flagged(),
				});
			}
			acc
		})
	}
}

/// Compile a user-defined rule from config.
pub fn compile_rule(rws: &RuleWithSource) -> Result<RewriteRule> {
	let rule = &rws.rule;

	let mode = match rule.mode {
		RuleMode::Document => MatchMode::Document,
		RuleMode::Line => MatchMode::Line,
	};

	let replacement = match &rule.review_note {
		Some(note) => Replacement::Flagged {
			note: note.clone(),
			template: rule.replacement.clone(),
		},
		None => Replacement::Template(rule.replacement.clone()),
	};

	let description = rule
		.description
		.clone()
		.unwrap_or_else(|| format!("user rule from {}", rws.source.display()));

	let compiled = RewriteRule::new(&rule.name, description, mode, &rule.pattern, replacement)?;

	Ok(compiled.with_guard(Guard {
		skip_if_contains: rule.skip_if_contains.clone(),
		skip_continuations: rule.skip_continuations,
	}))
}
