//! Batch driver for waitfix.
//!
//! This module handles:
//! - Recursive discovery of candidate test files
//! - Trigger pre-filtering
//! - Rewriting and persisting changed files, one file at a time

pub mod batch;
pub mod discover;

pub use batch::{
	BatchSummary, FileFailure, FileOutcome, FixOptions, FixedFile, fix_file, run_batch,
};
pub use discover::{find_candidates, has_suffix, has_trigger};
