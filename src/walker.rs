//! Recursive traversal of the build output, rewriting HTML files in place.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow};
use log::{debug, warn};

use crate::base_path::BasePath;
use crate::models::{FileFailure, RewriteSummary};
use crate::rewrite::rewrite_document;

/// Extension of the files the rewriter operates on.
pub const HTML_EXTENSION: &str = ".html";

/// Rewrite every `.html` file below `root` so relative references resolve under `base`.
///
/// Payloads that fail to parse are logged and collected in the summary. Directory and file
/// I/O errors abort the walk.
pub fn rewrite_tree(root: &Path, base: &BasePath) -> Result<RewriteSummary> {
  if !root.is_dir() {
    return Err(anyhow!(
      "build output directory {} does not exist",
      root.display()
    ));
  }

  let mut summary = RewriteSummary::default();
  rewrite_directory(root, base, &mut summary)?;
  Ok(summary)
}

fn rewrite_directory(dir: &Path, base: &BasePath, summary: &mut RewriteSummary) -> Result<()> {
  let mut entries = fs::read_dir(dir)
    .with_context(|| format!("failed to read directory {}", dir.display()))?
    .collect::<std::io::Result<Vec<_>>>()
    .with_context(|| format!("failed to list entries of {}", dir.display()))?;
  entries.sort_by_key(|entry| entry.file_name());

  for entry in entries {
    let path = entry.path();
    let metadata =
      fs::metadata(&path).with_context(|| format!("failed to stat {}", path.display()))?;

    if metadata.is_dir() {
      rewrite_directory(&path, base, summary)?;
    } else if is_html_file(&path) {
      rewrite_file(&path, base, summary)?;
    } else {
      summary.files_skipped += 1;
    }
  }

  Ok(())
}

/// Rewrite a single HTML file in place.
pub fn rewrite_file(path: &Path, base: &BasePath, summary: &mut RewriteSummary) -> Result<()> {
  let original =
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;

  let rewrite = rewrite_document(&original, base);
  for failure in rewrite.failures {
    warn!(
      "failed to parse {} JSON in file {}: {}",
      failure.attribute,
      path.display(),
      failure.error
    );
    summary.failures.push(FileFailure {
      path: path.to_path_buf(),
      failure,
    });
  }

  let changed = rewrite.text != original;
  fs::write(path, &rewrite.text).with_context(|| format!("failed to write {}", path.display()))?;

  debug!(
    "rewrote {}{}",
    path.display(),
    if changed { "" } else { " (unchanged)" }
  );
  summary.files_rewritten += 1;
  if changed {
    summary.files_changed += 1;
  }

  Ok(())
}

fn is_html_file(path: &Path) -> bool {
  path
    .file_name()
    .and_then(|name| name.to_str())
    .is_some_and(|name| name.ends_with(HTML_EXTENSION))
}
