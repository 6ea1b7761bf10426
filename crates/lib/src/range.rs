//! Range expression sub-grammars.
//!
//! The text inside `range[...]` is stored unparsed by the tag parser because
//! its shape depends on the field kind:
//!
//! - text and byte fields: `N`, an exact length
//! - integer fields: `min:max`, either side optional, colon mandatory

use std::fmt;
use std::num::ParseIntError;
use std::str::FromStr;

use crate::tag::TagError;

/// Parse an exact-length expression such as `16`.
pub fn parse_exact_len(expr: &str) -> Result<usize, TagError> {
  expr.parse::<usize>().map_err(|e| TagError::InvalidRange {
    expr: expr.to_string(),
    reason: e.to_string(),
  })
}

/// Inclusive integer bounds parsed from a `min:max` expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntRange<T> {
  pub min: Option<T>,
  pub max: Option<T>,
}

impl<T> IntRange<T>
where
  T: FromStr<Err = ParseIntError> + PartialOrd + Copy,
{
  /// Parse `min:max`, `min:`, `:max` or `:`.
  ///
  /// # Errors
  ///
  /// [`TagError::MissingColon`] when there is no colon, and
  /// [`TagError::InvalidRange`] when a present bound is not an integer of
  /// width `T`.
  pub fn parse(expr: &str) -> Result<Self, TagError> {
    let (min, max) = expr
      .split_once(':')
      .ok_or_else(|| TagError::MissingColon(expr.to_string()))?;

    Ok(Self {
      min: parse_bound(expr, min)?,
      max: parse_bound(expr, max)?,
    })
  }

  /// Whether `value` satisfies every bound that is present.
  pub fn contains(&self, value: T) -> bool {
    self.min.is_none_or(|min| value >= min) && self.max.is_none_or(|max| value <= max)
  }
}

fn parse_bound<T>(expr: &str, bound: &str) -> Result<Option<T>, TagError>
where
  T: FromStr<Err = ParseIntError>,
{
  if bound.is_empty() {
    return Ok(None);
  }
  bound.parse::<T>().map(Some).map_err(|e| TagError::InvalidRange {
    expr: expr.to_string(),
    reason: e.to_string(),
  })
}

impl<T: fmt::Display> fmt::Display for IntRange<T> {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    if let Some(min) = &self.min {
      write!(f, "{min}")?;
    }
    f.write_str(":")?;
    if let Some(max) = &self.max {
      write!(f, "{max}")?;
    }
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn exact_len() {
    assert_eq!(parse_exact_len("16").unwrap(), 16);
    assert_eq!(parse_exact_len("0").unwrap(), 0);
  }

  #[test]
  fn exact_len_rejects_non_numbers() {
    for expr in ["abc", "-1", "3:4", ""] {
      assert!(
        matches!(parse_exact_len(expr), Err(TagError::InvalidRange { .. })),
        "{expr:?} should not parse as a length"
      );
    }
  }

  #[test]
  fn open_ended_bounds() {
    let r = IntRange::<i32>::parse("1:").unwrap();
    assert_eq!(r, IntRange { min: Some(1), max: None });
    assert!(!r.contains(0));
    assert!(r.contains(1));
    assert!(r.contains(i32::MAX));

    let r = IntRange::<i32>::parse(":9").unwrap();
    assert!(r.contains(i32::MIN));
    assert!(r.contains(9));
    assert!(!r.contains(10));

    let r = IntRange::<i64>::parse(":").unwrap();
    assert!(r.contains(i64::MIN) && r.contains(i64::MAX));
  }

  #[test]
  fn closed_bounds_are_inclusive() {
    let r = IntRange::<i64>::parse("5:10").unwrap();
    for v in 5..=10 {
      assert!(r.contains(v), "{v} should be in range");
    }
    assert!(!r.contains(4));
    assert!(!r.contains(11));
  }

  #[test]
  fn negative_bounds() {
    let r = IntRange::<i32>::parse("-10:-5").unwrap();
    assert!(r.contains(-7));
    assert!(!r.contains(0));
  }

  #[test]
  fn colon_is_mandatory() {
    assert_eq!(
      IntRange::<i32>::parse("5").unwrap_err(),
      TagError::MissingColon("5".to_string())
    );
  }

  #[test]
  fn bound_must_fit_width() {
    assert!(IntRange::<i64>::parse("3000000000:").is_ok());
    assert!(matches!(
      IntRange::<i32>::parse("3000000000:"),
      Err(TagError::InvalidRange { .. })
    ));
    assert!(matches!(
      IntRange::<i32>::parse("1:x"),
      Err(TagError::InvalidRange { .. })
    ));
  }

  #[test]
  fn display_round_trips_shape() {
    assert_eq!(IntRange::<i32>::parse("5:").unwrap().to_string(), "5:");
    assert_eq!(IntRange::<i32>::parse(":9").unwrap().to_string(), ":9");
  }
}
