//! Rewriting of JSON payloads embedded in `data-layers` and `data-block` attributes.
//!
//! The functions here never see HTML. They take a decoded payload and return the mutated
//! payload, which keeps them independent from the attribute matching in the parent module.

use std::fmt;

use serde_json::Value;

use crate::base_path::BasePath;

use super::escape::{escape_quotes, unescape_quotes};

/// Attribute an embedded payload was read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttributeKind {
  /// Map layer list stored in `data-layers`.
  DataLayers,
  /// Mixed-content block list stored in `data-block` on `<inline-mixed-content>`.
  DataBlock,
}

impl AttributeKind {
  /// HTML attribute name for this payload kind.
  pub fn attribute_name(self) -> &'static str {
    match self {
      Self::DataLayers => "data-layers",
      Self::DataBlock => "data-block",
    }
  }
}

impl fmt::Display for AttributeKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.attribute_name())
  }
}

/// Reasons an embedded payload could not be rewritten.
#[derive(Debug)]
pub enum PayloadError {
  /// The attribute value is not valid JSON, or could not be re-encoded.
  Json(serde_json::Error),
  /// The top-level JSON value is not an array.
  NotAnArray,
  /// A record in the array is `null`.
  NullRecord {
    /// Position of the record within its array.
    index: usize,
  },
  /// A block carries an `img` field that is neither an array nor empty.
  ImageListNotArray {
    /// Position of the block within the payload.
    index: usize,
  },
  /// An image record inside a block's `img` list is `null`.
  NullImage {
    /// Position of the block within the payload.
    block: usize,
    /// Position of the image within the block's `img` list.
    index: usize,
  },
  /// A `url` or `src` field holds a non-empty value that is not a string.
  NonStringReference {
    /// Field that held the value.
    field: &'static str,
    /// Position of the layer or block that holds the field.
    index: usize,
  },
}

impl fmt::Display for PayloadError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Json(source) => write!(f, "invalid JSON: {source}"),
      Self::NotAnArray => f.write_str("expected a JSON array"),
      Self::NullRecord { index } => write!(f, "record {index} is null"),
      Self::ImageListNotArray { index } => {
        write!(f, "`img` field of block {index} is not an array")
      }
      Self::NullImage { block, index } => {
        write!(f, "image {index} of block {block} is null")
      }
      Self::NonStringReference { field, index } => {
        write!(f, "`{field}` field of record {index} is not a string")
      }
    }
  }
}

impl std::error::Error for PayloadError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      Self::Json(source) => Some(source),
      _ => None,
    }
  }
}

impl From<serde_json::Error> for PayloadError {
  fn from(err: serde_json::Error) -> Self {
    Self::Json(err)
  }
}

/// A payload that was left untouched because it could not be rewritten.
#[derive(Debug)]
pub struct PayloadFailure {
  /// Attribute the payload was read from.
  pub attribute: AttributeKind,
  /// Underlying failure.
  pub error: PayloadError,
}

impl fmt::Display for PayloadFailure {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "failed to parse {} JSON: {}", self.attribute, self.error)
  }
}

/// Prefix every relative `url` in a layer list with the base path.
pub fn rewrite_layer_urls(payload: Value, base: &BasePath) -> Result<Value, PayloadError> {
  let Value::Array(mut layers) = payload else {
    return Err(PayloadError::NotAnArray);
  };

  for (index, layer) in layers.iter_mut().enumerate() {
    match layer {
      Value::Null => return Err(PayloadError::NullRecord { index }),
      Value::Object(fields) => {
        if let Some(url) = fields.get_mut("url") {
          rewrite_reference(url, base, "url", index)?;
        }
      }
      _ => {}
    }
  }

  Ok(Value::Array(layers))
}

/// Prefix every relative `img[].src` in a mixed-content block list with the base path.
pub fn rewrite_block_images(payload: Value, base: &BasePath) -> Result<Value, PayloadError> {
  let Value::Array(mut blocks) = payload else {
    return Err(PayloadError::NotAnArray);
  };

  for (index, block) in blocks.iter_mut().enumerate() {
    let fields = match block {
      Value::Null => return Err(PayloadError::NullRecord { index }),
      Value::Object(fields) => fields,
      _ => continue,
    };

    let Some(images) = fields.get_mut("img") else {
      continue;
    };

    match images {
      Value::Array(images) => {
        for (image_index, image) in images.iter_mut().enumerate() {
          match image {
            Value::Null => {
              return Err(PayloadError::NullImage {
                block: index,
                index: image_index,
              });
            }
            Value::Object(image) => {
              if let Some(src) = image.get_mut("src") {
                rewrite_reference(src, base, "src", index)?;
              }
            }
            _ => {}
          }
        }
      }
      other => {
        if !is_falsy(other) {
          return Err(PayloadError::ImageListNotArray { index });
        }
      }
    }
  }

  Ok(Value::Array(blocks))
}

/// Decode an escaped attribute value, apply `rewrite`, and encode the result again.
pub fn rewrite_escaped_payload<F>(
  escaped: &str,
  base: &BasePath,
  rewrite: F,
) -> Result<String, PayloadError>
where
  F: FnOnce(Value, &BasePath) -> Result<Value, PayloadError>,
{
  let decoded: Value = serde_json::from_str(&unescape_quotes(escaped))?;
  let mut rewritten = rewrite(decoded, base)?;
  normalise_whole_floats(&mut rewritten);
  let encoded = serde_json::to_string(&rewritten)?;
  Ok(escape_quotes(&encoded))
}

/// Rewrite a `url`/`src` value in place; empty values are ignored, other non-strings are errors.
fn rewrite_reference(
  value: &mut Value,
  base: &BasePath,
  field: &'static str,
  index: usize,
) -> Result<(), PayloadError> {
  if let Value::String(current) = value {
    if let Some(updated) = base.rewrite_relative(current) {
      *current = updated;
    }
    return Ok(());
  }

  if is_falsy(value) {
    Ok(())
  } else {
    Err(PayloadError::NonStringReference { field, index })
  }
}

/// Largest integer an f64 represents exactly.
const MAX_EXACT_FLOAT_INT: f64 = 9_007_199_254_740_992.0;

/// Re-encode whole-number floats (`1e2`, `1.0`) as integers so output matches `JSON.stringify`.
fn normalise_whole_floats(value: &mut Value) {
  match value {
    Value::Number(number) => {
      if let Some(float) = number.as_f64() {
        if number.is_f64() && float.fract() == 0.0 && float.abs() <= MAX_EXACT_FLOAT_INT {
          *number = serde_json::Number::from(float as i64);
        }
      }
    }
    Value::Array(items) => items.iter_mut().for_each(normalise_whole_floats),
    Value::Object(fields) => fields.values_mut().for_each(normalise_whole_floats),
    _ => {}
  }
}

fn is_falsy(value: &Value) -> bool {
  match value {
    Value::Null => true,
    Value::Bool(flag) => !flag,
    Value::String(text) => text.is_empty(),
    Value::Number(number) => number.as_f64() == Some(0.0),
    _ => false,
  }
}
