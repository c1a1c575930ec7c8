//! Base-path rewriting for a single generated HTML document.
//!
//! Rules run in a fixed order over the whole document text:
//!
//! 1. `href="./` and `src="./` prefixes
//! 2. `url` fields inside `data-layers` JSON
//! 3. `data-mapstyle` URLs
//! 4. `img[].src` fields inside `data-block` JSON on `<inline-mixed-content>`
//! 5. `src` on plain `<img>` tags
//!
//! Only values starting with `./` are touched, and the rest of the document is left byte
//! for byte as it was.

mod escape;
mod payload;

use std::sync::OnceLock;

use regex::{Captures, Regex};

use crate::base_path::BasePath;

pub use escape::{escape_quotes, unescape_quotes};
pub use payload::{
  AttributeKind, PayloadError, PayloadFailure, rewrite_block_images, rewrite_escaped_payload,
  rewrite_layer_urls,
};

/// Result of rewriting one document.
#[derive(Debug)]
pub struct DocumentRewrite {
  /// Rewritten document text.
  pub text: String,
  /// Embedded payloads that were left untouched because they could not be parsed.
  pub failures: Vec<PayloadFailure>,
}

impl DocumentRewrite {
  /// Returns `true` when every embedded payload was rewritten.
  pub fn is_clean(&self) -> bool {
    self.failures.is_empty()
  }
}

struct Patterns {
  data_layers: Regex,
  data_mapstyle: Regex,
  data_block: Regex,
  img_tag: Regex,
}

fn patterns() -> &'static Patterns {
  static PATTERNS: OnceLock<Patterns> = OnceLock::new();
  PATTERNS.get_or_init(|| Patterns {
    data_layers: Regex::new(r#"data-layers="([^"]*)""#).expect("invalid data-layers regex"),
    data_mapstyle: Regex::new(r#"data-mapstyle="([^"]*)""#)
      .expect("invalid data-mapstyle regex"),
    data_block: Regex::new(r#"<inline-mixed-content[^>]*data-block="([^"]*)""#)
      .expect("invalid data-block regex"),
    img_tag: Regex::new(r#"<img\s+[^>]*src="([^"]+)"[^>]*>"#).expect("invalid img regex"),
  })
}

/// Rewrite every relative reference in `html` so it resolves below `base`.
pub fn rewrite_document(html: &str, base: &BasePath) -> DocumentRewrite {
  let patterns = patterns();
  let mut failures = Vec::new();

  let mut text = rewrite_attribute_prefixes(html, base);

  text = patterns
    .data_layers
    .replace_all(&text, |caps: &Captures| {
      rewrite_payload_capture(
        caps,
        base,
        AttributeKind::DataLayers,
        rewrite_layer_urls,
        &mut failures,
      )
    })
    .into_owned();

  text = patterns
    .data_mapstyle
    .replace_all(&text, |caps: &Captures| rewrite_relative_capture(caps, base))
    .into_owned();

  text = patterns
    .data_block
    .replace_all(&text, |caps: &Captures| {
      rewrite_payload_capture(
        caps,
        base,
        AttributeKind::DataBlock,
        rewrite_block_images,
        &mut failures,
      )
    })
    .into_owned();

  text = patterns
    .img_tag
    .replace_all(&text, |caps: &Captures| rewrite_relative_capture(caps, base))
    .into_owned();

  DocumentRewrite { text, failures }
}

fn rewrite_attribute_prefixes(html: &str, base: &BasePath) -> String {
  html
    .replace("href=\"./", &format!("href=\"{base}/"))
    .replace("src=\"./", &format!("src=\"{base}/"))
}

fn rewrite_relative_capture(caps: &Captures, base: &BasePath) -> String {
  match base.rewrite_relative(&caps[1]) {
    Some(updated) => splice_group(caps, 1, &updated),
    None => caps[0].to_string(),
  }
}

fn rewrite_payload_capture<F>(
  caps: &Captures,
  base: &BasePath,
  attribute: AttributeKind,
  rewrite: F,
  failures: &mut Vec<PayloadFailure>,
) -> String
where
  F: FnOnce(serde_json::Value, &BasePath) -> Result<serde_json::Value, PayloadError>,
{
  match rewrite_escaped_payload(&caps[1], base, rewrite) {
    Ok(encoded) => splice_group(caps, 1, &encoded),
    Err(error) => {
      failures.push(PayloadFailure { attribute, error });
      caps[0].to_string()
    }
  }
}

/// Rebuild the full match with capture `group` swapped for `replacement`.
fn splice_group(caps: &Captures, group: usize, replacement: &str) -> String {
  let whole = caps.get(0).expect("capture group 0 always participates");
  let Some(target) = caps.get(group) else {
    return whole.as_str().to_string();
  };

  let start = target.start() - whole.start();
  let end = target.end() - whole.start();
  let matched = whole.as_str();
  format!("{}{}{}", &matched[..start], replacement, &matched[end..])
}
