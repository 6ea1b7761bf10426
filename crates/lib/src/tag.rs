//! Annotation grammar for bindable fields.
//!
//! Every field of a destination record carries an annotation string that
//! controls how its value is looked up and validated.
//!
//! # Grammar
//!
//! An annotation is a comma-separated list of tokens:
//!
//! - `omitempty` - the field may be absent; text and byte fields are then
//!   cleared, integer fields keep their value
//! - `range[<expr>]` - a constraint whose meaning depends on the field kind
//!   (`N` for text and byte fields, `min:max` for integer fields)
//!
//! The whole-string sentinel `-` excludes the field from binding entirely.
//!
//! # Example
//!
//! ```
//! use parambind_lib::tag::{FieldTag, TagDirectives};
//!
//! let tag = FieldTag::parse("omitempty,range[1:]").unwrap();
//! assert_eq!(tag, FieldTag::Bind(TagDirectives {
//!     omit_empty: true,
//!     range: Some("1:".to_string()),
//! }));
//! assert_eq!(FieldTag::parse("-").unwrap(), FieldTag::Skip);
//! ```

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The annotation value that excludes a field from binding.
pub const SKIP_SENTINEL: &str = "-";

const OMIT_EMPTY: &str = "omitempty";
const RANGE_OPEN: &str = "range[";
const RANGE_CLOSE: &str = "]";

/// Errors raised while parsing an annotation or one of its range expressions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TagError {
  #[error("invalid tag \"{0}\"")]
  InvalidToken(String),

  #[error("invalid tag range \"{expr}\": {reason}")]
  InvalidRange { expr: String, reason: String },

  #[error("invalid range tag \"{0}\": expected `min:max`")]
  MissingColon(String),
}

/// Parsed directives of one annotation string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagDirectives {
  /// Absent or empty values are accepted. Text and byte fields are then
  /// cleared; integer fields keep their current value.
  pub omit_empty: bool,
  /// Raw text between the brackets of `range[...]`, interpreted per field kind.
  pub range: Option<String>,
}

/// An annotation after the skip sentinel has been taken into account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldTag {
  /// `-`: the field is never touched.
  Skip,
  /// Bind the field using these directives.
  Bind(TagDirectives),
}

impl FieldTag {
  /// Parse a complete annotation, recognising the `-` sentinel.
  pub fn parse(annotation: &str) -> Result<Self, TagError> {
    if annotation == SKIP_SENTINEL {
      return Ok(FieldTag::Skip);
    }
    parse(annotation).map(FieldTag::Bind)
  }
}

/// Parse an annotation string into [`TagDirectives`].
///
/// Tokens are classified independently. An empty annotation yields the
/// default directives. A repeated `range[...]` replaces the earlier one.
///
/// # Errors
///
/// Returns [`TagError::InvalidToken`] for the first token that is neither
/// `omitempty` nor a well-formed `range[...]`.
pub fn parse(annotation: &str) -> Result<TagDirectives, TagError> {
  let mut directives = TagDirectives::default();
  if annotation.is_empty() {
    return Ok(directives);
  }

  for token in annotation.split(',') {
    if token == OMIT_EMPTY {
      directives.omit_empty = true;
    } else if let Some(expr) = range_expression(token) {
      directives.range = Some(expr.to_string());
    } else {
      return Err(TagError::InvalidToken(token.to_string()));
    }
  }

  Ok(directives)
}

/// Extract `<expr>` from `range[<expr>]`, requiring a non-empty expression.
fn range_expression(token: &str) -> Option<&str> {
  let expr = token.strip_prefix(RANGE_OPEN)?.strip_suffix(RANGE_CLOSE)?;
  if expr.is_empty() { None } else { Some(expr) }
}

impl FromStr for TagDirectives {
  type Err = TagError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    parse(s)
  }
}

impl fmt::Display for TagDirectives {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let mut tokens = Vec::new();
    if self.omit_empty {
      tokens.push(OMIT_EMPTY.to_string());
    }
    if let Some(expr) = &self.range {
      tokens.push(format!("{RANGE_OPEN}{expr}{RANGE_CLOSE}"));
    }
    write!(f, "{}", tokens.join(","))
  }
}
