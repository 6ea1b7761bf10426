//! Bind-and-validate engine.
//!
//! A bind call walks a record's fields in declaration order. For each field
//! it parses the annotation, looks up the raw value under the lowercased
//! field name, coerces it to the field's kind and checks the declared
//! constraint. A value is written only once its own checks pass.
//!
//! The pass stops at the first failing field. Fields bound before it keep
//! their new values, so a destination must be discarded after an error.
//! [`bind_new`] binds into a fresh record instead and hands it out only when
//! every field succeeded.

use std::fmt;
use std::io::Read;
use std::num::ParseIntError;
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, trace, warn};

use crate::range::{IntRange, parse_exact_len};
use crate::record::{Field, FieldSlot, Record};
use crate::source::body::{decode_pairs, read_raw};
use crate::source::{BodyError, BodyParams, QueryValues, ValueSource};
use crate::tag::{FieldTag, TagDirectives, TagError};

/// Unit of an exact-length constraint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthUnit {
  Characters,
  Bytes,
}

impl fmt::Display for LengthUnit {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      LengthUnit::Characters => f.write_str("characters"),
      LengthUnit::Bytes => f.write_str("bytes"),
    }
  }
}

/// A field-level bind failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BindError {
  #[error("field \"{field}\": {source}")]
  MalformedTag {
    field: String,
    #[source]
    source: TagError,
  },

  #[error("field \"{field}\" is empty")]
  MissingRequired { field: String },

  #[error("field \"{field}\" is not {expected} {unit}")]
  LengthMismatch {
    field: String,
    expected: usize,
    actual: usize,
    unit: LengthUnit,
  },

  #[error("field \"{field}\" is not valid hex: {source}")]
  DecodeFailure {
    field: String,
    #[source]
    source: hex::FromHexError,
  },

  #[error("invalid int value \"{value}\" for field \"{field}\": {source}")]
  TypeMismatch {
    field: String,
    value: String,
    #[source]
    source: ParseIntError,
  },

  #[error("field \"{field}\" out of range")]
  RangeViolation { field: String, value: i64, range: String },

  #[error("field \"{field}\" has unsupported type \"{kind}\"")]
  UnsupportedFieldType { field: String, kind: String },
}

/// The kind of a [`BindError`], without its details.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindErrorKind {
  MalformedTag,
  MissingRequired,
  LengthMismatch,
  DecodeFailure,
  TypeMismatch,
  RangeViolation,
  UnsupportedFieldType,
}

impl BindError {
  /// Name of the field that failed.
  pub fn field(&self) -> &str {
    match self {
      BindError::MalformedTag { field, .. }
      | BindError::MissingRequired { field }
      | BindError::LengthMismatch { field, .. }
      | BindError::DecodeFailure { field, .. }
      | BindError::TypeMismatch { field, .. }
      | BindError::RangeViolation { field, .. }
      | BindError::UnsupportedFieldType { field, .. } => field,
    }
  }

  pub fn kind(&self) -> BindErrorKind {
    match self {
      BindError::MalformedTag { .. } => BindErrorKind::MalformedTag,
      BindError::MissingRequired { .. } => BindErrorKind::MissingRequired,
      BindError::LengthMismatch { .. } => BindErrorKind::LengthMismatch,
      BindError::DecodeFailure { .. } => BindErrorKind::DecodeFailure,
      BindError::TypeMismatch { .. } => BindErrorKind::TypeMismatch,
      BindError::RangeViolation { .. } => BindErrorKind::RangeViolation,
      BindError::UnsupportedFieldType { .. } => BindErrorKind::UnsupportedFieldType,
    }
  }
}

/// Failure of [`bind_body`].
///
/// Once the body has been read, the error carries the raw bytes so the caller
/// can still use them.
#[derive(Debug, Error)]
pub enum BodyBindError {
  #[error(transparent)]
  Read(BodyError),

  #[error("{source}")]
  Decode { body: Vec<u8>, source: BodyError },

  #[error("{source}")]
  Bind { body: Vec<u8>, source: BindError },
}

impl BodyBindError {
  /// The raw body, when it was read before the failure.
  pub fn raw_body(&self) -> Option<&[u8]> {
    match self {
      BodyBindError::Read(_) => None,
      BodyBindError::Decode { body, .. } | BodyBindError::Bind { body, .. } => Some(body),
    }
  }

  /// The field-level failure, if binding itself failed.
  pub fn bind_error(&self) -> Option<&BindError> {
    match self {
      BodyBindError::Bind { source, .. } => Some(source),
      _ => None,
    }
  }
}

/// Populate `dest` from `source`, failing on the first invalid field.
pub fn bind<S, R>(source: &S, dest: &mut R) -> Result<(), BindError>
where
  S: ValueSource + ?Sized,
  R: Record + ?Sized,
{
  let fields = dest.fields();
  debug!(field_count = fields.len(), "binding record");

  for field in fields {
    bind_field(source, field)?;
  }
  Ok(())
}

/// Populate `dest` from URL query parameters.
pub fn bind_query<R: Record + ?Sized>(values: &QueryValues, dest: &mut R) -> Result<(), BindError> {
  bind(values, dest)
}

/// Read a URL-encoded body from `reader` and populate `dest` from it.
///
/// The reader is read to the end and dropped exactly once on every path.
/// On success the raw body is returned.
pub fn bind_body<B: Read, R: Record + ?Sized>(reader: B, dest: &mut R) -> Result<Vec<u8>, BodyBindError> {
  let raw = read_raw(reader).map_err(BodyBindError::Read)?;
  let params = match decode_pairs(&raw) {
    Ok(params) => params,
    Err(source) => return Err(BodyBindError::Decode { body: raw, source }),
  };

  let body = BodyParams::from_parts(params, raw);
  match bind(&body, dest) {
    Ok(()) => Ok(body.into_raw()),
    Err(source) => Err(BodyBindError::Bind {
      body: body.into_raw(),
      source,
    }),
  }
}

/// Bind into a fresh record, returning it only if every field succeeded.
pub fn bind_new<R, S>(source: &S) -> Result<R, BindError>
where
  R: Record + Default,
  S: ValueSource + ?Sized,
{
  let mut record = R::default();
  bind(source, &mut record)?;
  Ok(record)
}

fn bind_field<S: ValueSource + ?Sized>(source: &S, field: Field<'_>) -> Result<(), BindError> {
  let key = field.key();
  let Field { name, tag, slot } = field;

  let directives = match FieldTag::parse(tag) {
    Ok(FieldTag::Skip) => {
      trace!(field = name, "skipping field");
      return Ok(());
    }
    Ok(FieldTag::Bind(directives)) => directives,
    Err(source) => return Err(malformed(name, source)),
  };

  let value = source.get(&key).filter(|v| !v.is_empty());
  debug!(field = name, kind = %slot.kind(), present = value.is_some(), "binding field");

  let Some(value) = value else {
    if directives.omit_empty {
      debug!(field = name, "no value, resetting to default");
      // Integers keep whatever the caller stored.
      match slot {
        FieldSlot::Text(dest) => dest.clear(),
        FieldSlot::Bytes(dest) => dest.clear(),
        FieldSlot::Int32(_) | FieldSlot::Int64(_) => {}
      }
      return Ok(());
    }
    return Err(BindError::MissingRequired { field: name.to_string() });
  };

  match slot {
    FieldSlot::Text(dest) => {
      *dest = coerce_text(name, &directives, value)?;
    }
    FieldSlot::Bytes(dest) => {
      *dest = coerce_bytes(name, &directives, value)?;
    }
    FieldSlot::Int32(dest) => {
      *dest = coerce_int(name, &directives, value)?;
    }
    FieldSlot::Int64(dest) => {
      *dest = coerce_int(name, &directives, value)?;
    }
  }
  Ok(())
}

fn coerce_text(name: &str, directives: &TagDirectives, value: &str) -> Result<String, BindError> {
  if let Some(expr) = &directives.range {
    let expected = parse_exact_len(expr).map_err(|e| malformed(name, e))?;
    let actual = value.chars().count();
    if actual != expected {
      return Err(BindError::LengthMismatch {
        field: name.to_string(),
        expected,
        actual,
        unit: LengthUnit::Characters,
      });
    }
  }
  Ok(value.to_string())
}

/// Decode a hex value. Without a `range` the value is not decoded and the
/// field receives an empty buffer.
fn coerce_bytes(name: &str, directives: &TagDirectives, value: &str) -> Result<Vec<u8>, BindError> {
  let Some(expr) = &directives.range else {
    warn!(field = name, "byte field has no range constraint, value ignored");
    return Ok(Vec::new());
  };

  let expected = parse_exact_len(expr).map_err(|e| malformed(name, e))?;
  let data = hex::decode(value).map_err(|source| BindError::DecodeFailure {
    field: name.to_string(),
    source,
  })?;
  if data.len() != expected {
    return Err(BindError::LengthMismatch {
      field: name.to_string(),
      expected,
      actual: data.len(),
      unit: LengthUnit::Bytes,
    });
  }
  Ok(data)
}

fn coerce_int<T>(name: &str, directives: &TagDirectives, value: &str) -> Result<T, BindError>
where
  T: FromStr<Err = ParseIntError> + PartialOrd + Copy + Into<i64> + fmt::Display,
{
  let parsed = value.parse::<T>().map_err(|source| BindError::TypeMismatch {
    field: name.to_string(),
    value: value.to_string(),
    source,
  })?;

  if let Some(expr) = &directives.range {
    let range = IntRange::<T>::parse(expr).map_err(|e| malformed(name, e))?;
    if !range.contains(parsed) {
      return Err(BindError::RangeViolation {
        field: name.to_string(),
        value: parsed.into(),
        range: range.to_string(),
      });
    }
  }
  Ok(parsed)
}

fn malformed(name: &str, source: TagError) -> BindError {
  BindError::MalformedTag {
    field: name.to_string(),
    source,
  }
}
