//! The built-in rule set for fragile Playwright-style waits.
//!
//! Order matters: the contextual timeout rules (`iframe-wait`, `click-wait`)
//! must run before the `fixed-timeout` catch-all, which matches every
//! remaining `waitForTimeout` call.

use crate::error::Result;
use crate::rules::rewriter::{Guard, MatchMode, Replacement, RewriteRule};

pub const NETWORK_IDLE: &str = "network-idle";
pub const GOTO_TIMEOUT: &str = "goto-timeout";
pub const IFRAME_WAIT: &str = "iframe-wait";
pub const CLICK_WAIT: &str = "click-wait";
pub const FIXED_TIMEOUT: &str = "fixed-timeout";

/// Built-in rule names in pipeline order.
pub const BUILTIN_RULE_NAMES: [&str; 5] =
	[NETWORK_IDLE, GOTO_TIMEOUT, IFRAME_WAIT, CLICK_WAIT, FIXED_TIMEOUT];

/// Comment inserted above every catch-all replacement.
pub const REVIEW_NOTE: &str = "TODO: Replace timeout with specific element wait";

/// Check whether `name` belongs to a built-in rule.
pub fn is_builtin(name: &str) -> bool {
	BUILTIN_RULE_NAMES.contains(&name)
}

/// Built-in rules that run before any user-defined rules, in order.
pub fn contextual_rules() -> Result<Vec<RewriteRule>> {
	Ok(vec![
		network_idle()?,
		goto_timeout()?,
		iframe_wait()?,
		click_wait()?,
	])
}

/// All built-in rules in pipeline order.
pub fn builtin_rules() -> Result<Vec<RewriteRule>> {
	let mut rules = contextual_rules()?;
	rules.push(fixed_timeout()?);
	Ok(rules)
}

fn network_idle() -> Result<RewriteRule> {
	RewriteRule::new(
		NETWORK_IDLE,
		"waitForLoadState('networkidle') -> waitForSelector('body') with a 5s timeout",
		MatchMode::Document,
		r#"await (?P<recv>\w+)\.waitForLoadState\(['"]networkidle['"]\)"#,
		Replacement::Template("await ${recv}.waitForSelector('body', { timeout: 5000 })".to_string()),
	)
}

// Line-scanned so a multi-line goto(...) call is never taken for a
// single-argument one.
fn goto_timeout() -> Result<RewriteRule> {
	let rule = RewriteRule::new(
		GOTO_TIMEOUT,
		"single-argument goto(url) -> goto(url, { waitUntil: 'domcontentloaded', timeout: 10000 })",
		MatchMode::Line,
		r"await (?P<recv>\w+)\.goto\((?P<url>[^,()\n]+)\)",
		Replacement::Template(
			"await ${recv}.goto(${url}, { waitUntil: 'domcontentloaded', timeout: 10000 })"
				.to_string(),
		),
	)?;

	Ok(rule.with_guard(Guard {
		skip_if_contains: vec![", {".to_string()],
		skip_continuations: true,
	}))
}

fn iframe_wait() -> Result<RewriteRule> {
	RewriteRule::new(
		IFRAME_WAIT,
		"waitForTimeout after '// Wait for iframe to load' -> wait for the sidebar iframe to attach",
		MatchMode::Document,
		r"(?P<lead>// Wait for iframe to load[^\n]*\n\s*)await (?P<recv>\w+)\.waitForTimeout\(\d+\)",
		Replacement::Template(
			"${lead}await ${recv}.waitForSelector('#absmartly-sidebar-iframe', { state: 'attached', timeout: 5000 }).catch(() => {})"
				.to_string(),
		),
	)
}

fn click_wait() -> Result<RewriteRule> {
	RewriteRule::new(
		CLICK_WAIT,
		"waitForTimeout on the line after click() -> short domcontentloaded wait",
		MatchMode::Document,
		r"await (?P<clicker>\w+)\.click\(\)[ \t]*(?P<eol>\r?\n)(?P<indent>[ \t]*)await (?P<recv>\w+)\.waitForTimeout\(\d+\)",
		Replacement::Template(
			"await ${clicker}.click()${eol}${indent}// Wait briefly for UI update${eol}${indent}await ${recv}.waitForLoadState('domcontentloaded', { timeout: 2000 }).catch(() => {})"
				.to_string(),
		),
	)
}

// The duration is kept but the wait condition changes, so every hit is
// flagged for a human to confirm.
fn fixed_timeout() -> Result<RewriteRule> {
	RewriteRule::new(
		FIXED_TIMEOUT,
		"any remaining waitForTimeout(n) -> document.readyState wait bounded by n, flagged for review",
		MatchMode::Document,
		r"await (?P<recv>\w+)\.waitForTimeout\((?P<ms>\d+)\)",
		Replacement::Flagged {
			note: REVIEW_NOTE.to_string(),
			template: "await ${recv}.waitForFunction(() => document.readyState === 'complete', { timeout: ${ms} }).catch(() => {})"
				.to_string(),
		},
	)
}
