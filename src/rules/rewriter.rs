use crate::error::{Result, WaitfixError};
use regex::{Captures, Regex};

/// How a rule scans the text it is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
	/// Match against the whole document. Patterns may span lines.
	Document,

	/// Match each line on its own. The guard is checked per line.
	Line,
}

impl MatchMode {
	/// Get the string representation used in config files and listings.
	pub fn as_str(&self) -> &'static str {
		match self {
			MatchMode::Document => "document",
			MatchMode::Line => "line",
		}
	}
}

/// Precondition a scope must satisfy before the rule may touch it.
///
/// The scope is the whole document in [`MatchMode::Document`] and a single
/// line in [`MatchMode::Line`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Guard {
	/// Skip scopes containing any of these substrings.
	pub skip_if_contains: Vec<String>,

	/// Skip scopes whose last non-whitespace character is a comma.
	pub skip_continuations: bool,
}

impl Guard {
	/// Check whether the rule may run against `scope`.
	pub fn admits(&self, scope: &str) -> bool {
		if self.skip_continuations && scope.trim_end().ends_with(',') {
			return false;
		}

		!self
			.skip_if_contains
			.iter()
			.any(|needle| scope.contains(needle.as_str()))
	}

	/// True when the guard admits every scope.
	pub fn is_empty(&self) -> bool {
		self.skip_if_contains.is_empty() && !self.skip_continuations
	}
}

/// Replacement produced for each match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Replacement {
	/// Capture template in regex syntax (`$1`, `${name}`).
	Template(String),

	/// Capture template expanded in place, with a `// <note>` comment line
	/// inserted above the line holding the match.
	///
	/// The comment takes that line's indentation. The rest of the line is left
	/// as it was, so a human can find and confirm the replacement later.
	Flagged { note: String, template: String },
}

impl Replacement {
	/// True for replacements that insert a review comment.
	pub fn is_flagged(&self) -> bool {
		matches!(self, Replacement::Flagged { .. })
	}
}

/// A single rewrite rule: pattern, guard and replacement.
#[derive(Debug, Clone)]
pub struct RewriteRule {
	/// Unique rule name.
	pub name: String,

	/// One-line human description.
	pub description: String,

	/// Whole-document or per-line matching.
	pub mode: MatchMode,

	/// Compiled pattern.
	pub pattern: Regex,

	/// Precondition on the scanned scope.
	pub guard: Guard,

	/// What each match is replaced with.
	pub replacement: Replacement,
}

impl RewriteRule {
	/// Compile a rule with no guard.
	pub fn new(
		name: impl Into<String>,
		description: impl Into<String>,
		mode: MatchMode,
		pattern: &str,
		replacement: Replacement,
	) -> Result<Self> {
		Ok(RewriteRule {
			name: name.into(),
			description: description.into(),
			mode,
			pattern: compile_regex(pattern)?,
			guard: Guard::default(),
			replacement,
		})
	}

	/// Attach a guard to this rule.
	pub fn with_guard(mut self, guard: Guard) -> Self {
		self.guard = guard;
		self
	}

	/// Apply this rule to `text`, returning the new text and the number of
	/// individual substitutions made.
	pub fn apply(&self, text: &str) -> (String, usize) {
		match self.mode {
			MatchMode::Document => {
				if self.guard.admits(text) {
					self.substitute(text)
				} else {
					(text.to_string(), 0)
				}
			}
			MatchMode::Line => {
				let mut total = 0;
				let lines: Vec<String> = text
					.split('\n')
					.map(|line| {
						if !self.guard.admits(line) {
							return line.to_string();
						}
						let (rewritten, count) = self.substitute(line);
						total += count;
						rewritten
					})
					.collect();
				(lines.join("\n"), total)
			}
		}
	}

	fn substitute(&self, haystack: &str) -> (String, usize) {
		match &self.replacement {
			Replacement::Template(template) => {
				let mut count = 0;
				let rewritten = self
					.pattern
					.replace_all(haystack, |caps: &Captures<'_>| {
						count += 1;
						let mut out = String::new();
						caps.expand(template, &mut out);
						out
					})
					.into_owned();
				(rewritten, count)
			}
			Replacement::Flagged { note, template } => {
				self.substitute_flagged(haystack, note, template)
			}
		}
	}

	// One comment per line, however many matches the line holds. A line the
	// previous match already ran into gets no comment of its own.
	fn substitute_flagged(&self, haystack: &str, note: &str, template: &str) -> (String, usize) {
		let eol = if haystack.contains("\r\n") || haystack.ends_with('\r') {
			"\r\n"
		} else {
			"\n"
		};
		let mut out = String::with_capacity(haystack.len());
		let mut last = 0;
		let mut count = 0;

		for caps in self.pattern.captures_iter(haystack) {
			let Some(m) = caps.get(0) else { continue };
			let line_start = haystack[..m.start()].rfind('\n').map_or(0, |i| i + 1);

			if line_start >= last {
				out.push_str(&haystack[last..line_start]);
				out.push_str(line_indent(haystack, line_start));
				out.push_str("// ");
				out.push_str(note);
				out.push_str(eol);
				last = line_start;
			}

			out.push_str(&haystack[last..m.start()]);
			caps.expand(template, &mut out);
			last = m.end();
			count += 1;
		}

		out.push_str(&haystack[last..]);
		(out, count)
	}
}

/// Compile a regex pattern string.
pub(crate) fn compile_regex(pattern: &str) -> Result<Regex> {
	Regex::new(pattern).map_err(|source| WaitfixError::InvalidRegex {
		pattern: pattern.to_string(),
		source,
	})
}

/// Leading whitespace of the line containing byte offset `pos`.
fn line_indent(haystack: &str, pos: usize) -> &str {
	let line_start = haystack[..pos].rfind('\n').map_or(0, |i| i + 1);
	let line = &haystack[line_start..];
	let width = line.len() - line.trim_start_matches([' ', '\t']).len();
	&line[..width]
}
