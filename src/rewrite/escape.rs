//! Minimal entity handling for JSON carried inside double-quoted HTML attributes.

/// Decode the quote entities a generator emits for JSON attribute values.
///
/// Only `&quot;` and `&#34;` are decoded; every other entity is left alone so it round-trips
/// untouched through the JSON string values.
pub fn unescape_quotes(value: &str) -> String {
  value.replace("&quot;", "\"").replace("&#34;", "\"")
}

/// Encode every double quote as `&quot;` so the value fits back inside `attr="…"`.
pub fn escape_quotes(value: &str) -> String {
  value.replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn decodes_named_and_numeric_quote_entities() {
    assert_eq!(
      unescape_quotes("[{&quot;url&quot;:&#34;./a.json&#34;}]"),
      r#"[{"url":"./a.json"}]"#
    );
  }

  #[test]
  fn leaves_other_entities_in_place() {
    assert_eq!(unescape_quotes("a &amp; b &lt;c&gt;"), "a &amp; b &lt;c&gt;");
  }

  #[test]
  fn encodes_all_quotes_with_named_entity() {
    assert_eq!(escape_quotes(r#"{"a":"b"}"#), "{&quot;a&quot;:&quot;b&quot;}");
  }
}
