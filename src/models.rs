//! Data structures produced while rewriting a build output tree.

use std::path::PathBuf;

use crate::rewrite::PayloadFailure;

/// Embedded payload failure tied to the file it was found in.
#[derive(Debug)]
pub struct FileFailure {
  /// HTML file containing the payload.
  pub path: PathBuf,
  /// Payload that was left untouched.
  pub failure: PayloadFailure,
}

/// Outcome of rewriting every HTML file below a root directory.
#[derive(Debug, Default)]
pub struct RewriteSummary {
  /// HTML files read and written back.
  pub files_rewritten: usize,
  /// HTML files whose content differs after the rewrite.
  pub files_changed: usize,
  /// Non-HTML files skipped during traversal.
  pub files_skipped: usize,
  /// Embedded payloads that could not be parsed, in traversal order.
  pub failures: Vec<FileFailure>,
}

impl RewriteSummary {
  /// Returns `true` when no embedded payload had to be skipped.
  pub fn is_clean(&self) -> bool {
    self.failures.is_empty()
  }
}
