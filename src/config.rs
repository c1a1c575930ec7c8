//! Build configuration loader used to resolve the deployment base path.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use anyhow::{Context, Result, anyhow};
use regex::Regex;
use serde::Deserialize;

use crate::base_path::BasePath;

/// Output directory assumed when the configuration does not name one.
pub const DEFAULT_OUT_DIR: &str = "dist";

/// Configuration files searched for, in order, inside the project directory.
pub const CONFIG_CANDIDATES: &[&str] = &[
  "site.config.json",
  "site.config.yaml",
  "site.config.yml",
  "astro.config.mjs",
  "astro.config.js",
  "astro.config.ts",
];

/// Site settings read from the build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteConfig {
  /// Absolute origin URL the site is published at.
  pub site: String,
  /// Subpath below the origin the site is served from.
  pub base: String,
  /// Directory the generator writes its build output to.
  #[serde(default)]
  pub out_dir: Option<String>,
}

impl SiteConfig {
  /// Locate and load the first configuration candidate present in `project_dir`.
  pub fn discover(project_dir: &Path) -> Result<Self> {
    let candidate = CONFIG_CANDIDATES
      .iter()
      .map(|name| project_dir.join(name))
      .find(|path| path.is_file())
      .ok_or_else(|| {
        anyhow!(
          "no build configuration found in {} (looked for {})",
          project_dir.display(),
          CONFIG_CANDIDATES.join(", ")
        )
      })?;

    Self::from_path(&candidate)
  }

  /// Load configuration from a specific file, choosing the format by extension.
  pub fn from_path(path: &Path) -> Result<Self> {
    let content = fs::read_to_string(path)
      .with_context(|| format!("failed to read {}", path.display()))?;

    let extension = path
      .extension()
      .and_then(|ext| ext.to_str())
      .map(|ext| ext.to_ascii_lowercase());

    match extension.as_deref() {
      Some("json") => serde_json::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display())),
      Some("yaml") | Some("yml") => serde_yaml::from_str(&content)
        .with_context(|| format!("failed to parse {}", path.display())),
      _ => Self::from_module_source(&content)
        .with_context(|| format!("failed to extract site settings from {}", path.display())),
    }
  }

  /// Extract `site`, `base` and `outDir` string literals from a generator config module.
  ///
  /// The module is never evaluated; only literal values are recognised.
  pub fn from_module_source(source: &str) -> Result<Self> {
    let site = module_string_field(source, "site")
      .ok_or_else(|| anyhow!("missing string literal for `site`"))?;
    let base = module_string_field(source, "base")
      .ok_or_else(|| anyhow!("missing string literal for `base`"))?;
    let out_dir = module_string_field(source, "outDir");

    Ok(Self {
      site,
      base,
      out_dir,
    })
  }

  /// Base path the generated site is deployed under.
  pub fn base_path(&self) -> BasePath {
    BasePath::join(&self.site, &self.base)
  }

  /// Build output directory relative to the project root.
  pub fn out_dir_path(&self, project_dir: &Path) -> PathBuf {
    project_dir.join(self.out_dir.as_deref().unwrap_or(DEFAULT_OUT_DIR))
  }
}

fn module_field_patterns() -> &'static [(&'static str, Regex)] {
  static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
  PATTERNS
    .get_or_init(|| {
      ["site", "base", "outDir"]
        .into_iter()
        .map(|field| {
          let pattern = Regex::new(&format!(
            r#"(?m)(?:^|[\s{{,])["']?{field}["']?\s*:\s*(?:"([^"]*)"|'([^']*)'|`([^`$]*)`)"#
          ))
          .expect("invalid config field regex");
          (field, pattern)
        })
        .collect()
    })
    .as_slice()
}

fn module_string_field(source: &str, field: &str) -> Option<String> {
  let (_, pattern) = module_field_patterns()
    .iter()
    .find(|(name, _)| *name == field)?;
  let caps = pattern.captures(source)?;
  (1..=3)
    .find_map(|index| caps.get(index))
    .map(|value| value.as_str().to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use tempfile::tempdir;

  const ASTRO_CONFIG: &str = r#"// @ts-check
import { defineConfig } from "astro/config";
import mdx from "@astrojs/mdx";

export default defineConfig({
  site: "https://oe2189.github.io",
  base: "NYC-Piers-Study",
  integrations: [mdx()],
});
"#;

  #[test]
  fn extracts_literals_from_generator_module() {
    let config = SiteConfig::from_module_source(ASTRO_CONFIG).unwrap();
    assert_eq!(config.site, "https://oe2189.github.io");
    assert_eq!(config.base, "NYC-Piers-Study");
    assert_eq!(config.out_dir, None);
    assert_eq!(
      config.base_path().as_str(),
      "https://oe2189.github.io/NYC-Piers-Study"
    );
  }

  #[test]
  fn module_source_accepts_single_quotes_and_out_dir() {
    let source = "export default {\n  site: 'https://example.com',\n  base: '/repo',\n  outDir: './build',\n};\n";
    let config = SiteConfig::from_module_source(source).unwrap();
    assert_eq!(config.base_path().as_str(), "https://example.com/repo");
    assert_eq!(config.out_dir.as_deref(), Some("./build"));
  }

  #[test]
  fn module_source_without_base_is_an_error() {
    let source = "export default { site: \"https://example.com\" };";
    let err = SiteConfig::from_module_source(source).unwrap_err();
    assert!(err.to_string().contains("base"));
  }

  #[test]
  fn loads_json_configuration() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("site.config.json");
    fs::write(
      &path,
      r#"{"site": "https://example.com", "base": "repo", "outDir": "public"}"#,
    )
    .unwrap();

    let config = SiteConfig::from_path(&path).unwrap();
    assert_eq!(config.base_path().as_str(), "https://example.com/repo");
    assert_eq!(config.out_dir_path(dir.path()), dir.path().join("public"));
  }

  #[test]
  fn loads_yaml_configuration() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("site.config.yml");
    fs::write(&path, "site: https://example.com\nbase: repo\n").unwrap();

    let config = SiteConfig::from_path(&path).unwrap();
    assert_eq!(config.base_path().as_str(), "https://example.com/repo");
    assert_eq!(config.out_dir_path(dir.path()), dir.path().join("dist"));
  }

  #[test]
  fn json_without_required_fields_is_an_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("site.config.json");
    fs::write(&path, r#"{"site": "https://example.com"}"#).unwrap();

    assert!(SiteConfig::from_path(&path).is_err());
  }

  #[test]
  fn discover_prefers_json_over_generator_module() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("astro.config.mjs"), ASTRO_CONFIG).unwrap();
    fs::write(
      dir.path().join("site.config.json"),
      r#"{"site": "https://override.dev", "base": "docs"}"#,
    )
    .unwrap();

    let config = SiteConfig::discover(dir.path()).unwrap();
    assert_eq!(config.base_path().as_str(), "https://override.dev/docs");
  }

  #[test]
  fn discover_falls_back_to_generator_module() {
    let dir = tempdir().unwrap();
    fs::write(dir.path().join("astro.config.mjs"), ASTRO_CONFIG).unwrap();

    let config = SiteConfig::discover(dir.path()).unwrap();
    assert_eq!(config.base, "NYC-Piers-Study");
  }

  #[test]
  fn discover_reports_missing_configuration() {
    let dir = tempdir().unwrap();
    let err = SiteConfig::discover(dir.path()).unwrap_err();
    assert!(err.to_string().contains("no build configuration found"));
  }
}
