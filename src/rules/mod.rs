//! The rewrite engine.
//!
//! This module handles:
//! - The rule record: pattern, match mode, guard and replacement
//! - The built-in rules for fragile waits
//! - Folding an ordered rule list over one file's text

pub mod builtin;
pub mod engine;
pub mod rewriter;

pub use engine::{RewriteEngine, RewriteResult, RuleHit, compile_rule};
pub use rewriter::{Guard, MatchMode, Replacement, RewriteRule};
