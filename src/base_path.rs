//! Deployment base path shared by every rewrite rule.

use std::fmt;

/// Marker that identifies a reference as relative to the current page.
pub const RELATIVE_MARKER: &str = "./";

/// Absolute URL prefix under which the generated site is deployed.
///
/// Built once per run from the configured site origin and base subpath, then passed
/// explicitly to every rewrite function.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasePath(String);

impl BasePath {
  /// Join a site origin and a base subpath with a single `/`.
  ///
  /// Redundant separators on either side of the join are dropped so `https://x.io/` and
  /// `/repo/` produce `https://x.io/repo`. An empty base yields the bare site origin.
  pub fn join(site: &str, base: &str) -> Self {
    let site = site.trim().trim_end_matches('/');
    let base = base.trim().trim_matches('/');

    if base.is_empty() {
      Self(site.to_string())
    } else {
      Self(format!("{site}/{base}"))
    }
  }

  /// Use a fully formed base path as-is, minus any trailing slash.
  pub fn from_url(url: &str) -> Self {
    Self(url.trim().trim_end_matches('/').to_string())
  }

  /// Borrow the underlying string.
  pub fn as_str(&self) -> &str {
    &self.0
  }

  /// Rewrite `value` when it starts with [`RELATIVE_MARKER`].
  ///
  /// Only the leading `.` is replaced, so `./img/a.png` becomes `<base>/img/a.png`.
  pub fn rewrite_relative(&self, value: &str) -> Option<String> {
    value
      .strip_prefix(RELATIVE_MARKER)
      .map(|rest| format!("{}/{}", self.0, rest))
  }
}

impl fmt::Display for BasePath {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}
