//! Project-level orchestration: resolve the base path, then rewrite the build output.

use std::path::{Path, PathBuf};

use anyhow::Result;
use log::info;

use crate::base_path::BasePath;
use crate::config::{DEFAULT_OUT_DIR, SiteConfig};
use crate::models::RewriteSummary;
use crate::walker::rewrite_tree;

/// Where to find the configuration and build output of a generated site.
#[derive(Debug, Clone, Default)]
pub struct SiteProject {
  /// Directory containing the generator configuration and build output.
  pub project_dir: PathBuf,
  /// Explicit configuration file, bypassing discovery.
  pub config_path: Option<PathBuf>,
  /// Build output directory relative to `project_dir`, overriding the configured one.
  pub out_dir: Option<PathBuf>,
  /// Fully formed base path, bypassing configuration entirely.
  pub base_path: Option<String>,
}

/// Base path and output directory resolved for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedProject {
  /// Prefix applied to relative references.
  pub base: BasePath,
  /// Directory tree to rewrite.
  pub out_dir: PathBuf,
}

impl SiteProject {
  /// Describe a project rooted at `project_dir` with default discovery.
  pub fn new(project_dir: impl Into<PathBuf>) -> Self {
    Self {
      project_dir: project_dir.into(),
      ..Self::default()
    }
  }

  /// Resolve the base path and output directory without touching the build output.
  pub fn resolve(&self) -> Result<ResolvedProject> {
    if let Some(url) = &self.base_path {
      return Ok(ResolvedProject {
        base: BasePath::from_url(url),
        out_dir: self.out_dir_or(Path::new(DEFAULT_OUT_DIR)),
      });
    }

    let config = match &self.config_path {
      Some(path) => SiteConfig::from_path(path)?,
      None => SiteConfig::discover(&self.project_dir)?,
    };

    let out_dir = match &self.out_dir {
      Some(dir) => self.project_dir.join(dir),
      None => config.out_dir_path(&self.project_dir),
    };

    Ok(ResolvedProject {
      base: config.base_path(),
      out_dir,
    })
  }

  /// Resolve the base path and rewrite every HTML file in the build output.
  pub fn rewrite(&self) -> Result<RewriteSummary> {
    let resolved = self.resolve()?;
    info!("Using base path: {}", resolved.base);

    let summary = rewrite_tree(&resolved.out_dir, &resolved.base)?;
    info!(
      "Rewrote {} HTML files in {} ({} changed, {} payloads skipped)",
      summary.files_rewritten,
      resolved.out_dir.display(),
      summary.files_changed,
      summary.failures.len()
    );

    Ok(summary)
  }

  fn out_dir_or(&self, fallback: &Path) -> PathBuf {
    self
      .project_dir
      .join(self.out_dir.as_deref().unwrap_or(fallback))
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::fs;
  use tempfile::tempdir;

  #[test]
  fn explicit_base_path_skips_configuration() {
    let dir = tempdir().unwrap();
    let project = SiteProject {
      base_path: Some("https://example.com/repo/".into()),
      ..SiteProject::new(dir.path())
    };

    let resolved = project.resolve().unwrap();
    assert_eq!(resolved.base.as_str(), "https://example.com/repo");
    assert_eq!(resolved.out_dir, dir.path().join("dist"));
  }

  #[test]
  fn out_dir_override_wins_over_configuration() {
    let dir = tempdir().unwrap();
    fs::write(
      dir.path().join("site.config.json"),
      r#"{"site": "https://example.com", "base": "repo", "outDir": "public"}"#,
    )
    .unwrap();

    let configured = SiteProject::new(dir.path()).resolve().unwrap();
    assert_eq!(configured.out_dir, dir.path().join("public"));

    let overridden = SiteProject {
      out_dir: Some("build".into()),
      ..SiteProject::new(dir.path())
    }
    .resolve()
    .unwrap();
    assert_eq!(overridden.out_dir, dir.path().join("build"));
  }

  #[test]
  fn configuration_failure_aborts_before_rewriting() {
    let dir = tempdir().unwrap();
    let dist = dir.path().join("dist");
    fs::create_dir_all(&dist).unwrap();
    fs::write(dist.join("index.html"), r#"<a href="./b">x</a>"#).unwrap();

    assert!(SiteProject::new(dir.path()).rewrite().is_err());
    assert_eq!(
      fs::read_to_string(dist.join("index.html")).unwrap(),
      r#"<a href="./b">x</a>"#
    );
  }
}
