//! Waitfix - rewrite fragile waits in end-to-end test files.
//!
//! This library provides the core functionality for waitfix, including:
//! - An ordered, pattern-based rewrite engine with built-in rules for
//!   fixed-duration timeouts and network-idle waits
//! - Configuration file parsing and cascade discovery
//! - Discovery of candidate test files and in-place batch rewriting
//!
//! # Example
//!
//! ```
//! use waitfix_cli::rules::RewriteEngine;
//!
//! let engine = RewriteEngine::builtin().unwrap();
//! let result = engine.rewrite("await page.waitForLoadState('networkidle')");
//!
//! assert_eq!(result.text, "await page.waitForSelector('body', { timeout: 5000 })");
//! assert_eq!(result.changes, 1);
//! ```

pub mod config;
pub mod error;
pub mod fixer;
pub mod rules;

pub use error::{Result, WaitfixError};
