//! Records whose fields are declared at runtime.
//!
//! Statically typed records implement [`Record`] directly. When the field list
//! is only known at runtime, e.g. when it comes from a command line or a JSON
//! document, a [`Schema`] describes the fields and a [`DynamicRecord`] stores
//! the bound values.
//!
//! # Formats
//!
//! Inline: `Name:type[:annotation]`, where everything after the second colon
//! is the annotation (`Num1:int32:omitempty,range[1:]`).
//!
//! JSON:
//!
//! ```json
//! [
//!   { "name": "Num", "type": "string" },
//!   { "name": "Num1", "type": "int32", "tag": "omitempty,range[1:]" }
//! ]
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;

use crate::bind::BindError;
use crate::record::{Field, FieldKind, FieldSlot, Record};
use crate::tag::FieldTag;

#[derive(Debug, Error)]
pub enum SchemaError {
  #[error("invalid schema JSON: {0}")]
  Json(#[from] serde_json::Error),

  #[error("invalid field spec \"{0}\": expected Name:type[:annotation]")]
  InvalidFieldSpec(String),

  #[error("duplicate field key \"{0}\"")]
  DuplicateKey(String),

  #[error(transparent)]
  Field(#[from] BindError),
}

/// Declaration of one runtime field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldSpec {
  pub name: String,
  pub kind: FieldKind,
  pub tag: String,
}

#[derive(Deserialize)]
struct RawFieldSpec {
  name: String,
  #[serde(rename = "type")]
  kind: String,
  #[serde(default)]
  tag: String,
}

impl FieldSpec {
  pub fn new(name: impl Into<String>, kind: FieldKind, tag: impl Into<String>) -> Self {
    Self {
      name: name.into(),
      kind,
      tag: tag.into(),
    }
  }

  /// Parse `Name:type[:annotation]`.
  pub fn parse_inline(spec: &str) -> Result<Self, SchemaError> {
    let mut parts = spec.splitn(3, ':');
    let (Some(name), Some(kind)) = (parts.next(), parts.next()) else {
      return Err(SchemaError::InvalidFieldSpec(spec.to_string()));
    };
    if name.is_empty() {
      return Err(SchemaError::InvalidFieldSpec(spec.to_string()));
    }
    let tag = parts.next().unwrap_or_default();
    Self::with_kind_name(name, kind, tag)
  }

  fn with_kind_name(name: &str, kind: &str, tag: &str) -> Result<Self, SchemaError> {
    let kind = FieldKind::from_name(kind).ok_or_else(|| BindError::UnsupportedFieldType {
      field: name.to_string(),
      kind: kind.to_string(),
    })?;
    Ok(Self::new(name, kind, tag))
  }
}

/// An ordered list of runtime field declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
  fields: Vec<FieldSpec>,
}

impl Schema {
  pub fn new(fields: Vec<FieldSpec>) -> Self {
    Self { fields }
  }

  /// Parse a JSON array of `{ "name", "type", "tag" }` objects.
  pub fn from_json(json: &str) -> Result<Self, SchemaError> {
    let raw: Vec<RawFieldSpec> = serde_json::from_str(json)?;
    let fields = raw
      .iter()
      .map(|r| FieldSpec::with_kind_name(&r.name, &r.kind, &r.tag))
      .collect::<Result<_, _>>()?;
    Ok(Self { fields })
  }

  /// Parse a list of inline field specs.
  pub fn from_inline<'a>(specs: impl IntoIterator<Item = &'a str>) -> Result<Self, SchemaError> {
    let fields = specs
      .into_iter()
      .map(FieldSpec::parse_inline)
      .collect::<Result<_, _>>()?;
    Ok(Self { fields })
  }

  pub fn push(&mut self, spec: FieldSpec) {
    self.fields.push(spec);
  }

  pub fn fields(&self) -> &[FieldSpec] {
    &self.fields
  }

  pub fn is_empty(&self) -> bool {
    self.fields.is_empty()
  }

  /// Check every annotation and lookup key before any binding happens.
  pub fn validate(&self) -> Result<(), SchemaError> {
    let mut keys = HashSet::new();
    for spec in &self.fields {
      FieldTag::parse(&spec.tag).map_err(|source| BindError::MalformedTag {
        field: spec.name.clone(),
        source,
      })?;
      let key = spec.name.to_lowercase();
      if !keys.insert(key.clone()) {
        return Err(SchemaError::DuplicateKey(key));
      }
    }
    Ok(())
  }
}

/// A bound value of a runtime field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
  Text(String),
  Bytes(Vec<u8>),
  Int32(i32),
  Int64(i64),
}

impl FieldValue {
  /// The zero value of `kind`.
  pub fn default_for(kind: FieldKind) -> Self {
    match kind {
      FieldKind::Text => FieldValue::Text(String::new()),
      FieldKind::Bytes => FieldValue::Bytes(Vec::new()),
      FieldKind::Int32 => FieldValue::Int32(0),
      FieldKind::Int64 => FieldValue::Int64(0),
    }
  }

  pub fn slot(&mut self) -> FieldSlot<'_> {
    match self {
      FieldValue::Text(v) => FieldSlot::Text(v),
      FieldValue::Bytes(v) => FieldSlot::Bytes(v),
      FieldValue::Int32(v) => FieldSlot::Int32(v),
      FieldValue::Int64(v) => FieldSlot::Int64(v),
    }
  }
}

impl fmt::Display for FieldValue {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      FieldValue::Text(v) => f.write_str(v),
      FieldValue::Bytes(v) => f.write_str(&hex::encode(v)),
      FieldValue::Int32(v) => write!(f, "{v}"),
      FieldValue::Int64(v) => write!(f, "{v}"),
    }
  }
}

/// Bytes serialize as lowercase hex, integers as numbers.
impl Serialize for FieldValue {
  fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
    match self {
      FieldValue::Text(v) => serializer.serialize_str(v),
      FieldValue::Bytes(v) => serializer.serialize_str(&hex::encode(v)),
      FieldValue::Int32(v) => serializer.serialize_i32(*v),
      FieldValue::Int64(v) => serializer.serialize_i64(*v),
    }
  }
}

/// Storage for a record described by a [`Schema`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DynamicRecord {
  schema: Schema,
  values: Vec<FieldValue>,
}

impl DynamicRecord {
  /// A record with every field at its zero value.
  pub fn new(schema: Schema) -> Self {
    let values = schema.fields.iter().map(|s| FieldValue::default_for(s.kind)).collect();
    Self { schema, values }
  }

  pub fn schema(&self) -> &Schema {
    &self.schema
  }

  /// Field names paired with their current values, in declaration order.
  pub fn values(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
    self.schema.fields.iter().map(|s| s.name.as_str()).zip(&self.values)
  }

  pub fn get(&self, name: &str) -> Option<&FieldValue> {
    self.values().find(|(n, _)| *n == name).map(|(_, v)| v)
  }

  /// Values as a JSON object keyed by field name.
  pub fn to_json(&self) -> serde_json::Value {
    let map = self
      .values()
      .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
      .collect();
    serde_json::Value::Object(map)
  }
}

impl Record for DynamicRecord {
  fn fields(&mut self) -> Vec<Field<'_>> {
    self
      .schema
      .fields
      .iter()
      .zip(self.values.iter_mut())
      .map(|(spec, value)| Field::new(&spec.name, &spec.tag, value.slot()))
      .collect()
  }
}
