//! Destination records and their field descriptions.
//!
//! A record exposes its fields, in declaration order, as [`Field`] values that
//! pair the field's name and annotation with a typed mutable [`FieldSlot`].
//! The set of slot kinds is closed, so a field of an unsupported type cannot
//! be declared at all.
//!
//! Plain structs usually implement [`Record`] through [`impl_record!`]:
//!
//! ```
//! use parambind_lib::impl_record;
//!
//! #[derive(Debug, Default)]
//! struct Login {
//!   user: String,
//!   pin: i32,
//!   internal: i64,
//! }
//!
//! impl_record!(Login {
//!   user: "User" => "",
//!   pin: "Pin" => "range[1000:9999]",
//!   internal: "Internal" => "-",
//! });
//! ```

use std::fmt;

/// Supported destination field kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
  Text,
  Bytes,
  Int32,
  Int64,
}

impl FieldKind {
  /// Name used in schemas and diagnostics.
  pub fn as_str(self) -> &'static str {
    match self {
      FieldKind::Text => "string",
      FieldKind::Bytes => "bytes",
      FieldKind::Int32 => "int32",
      FieldKind::Int64 => "int64",
    }
  }

  /// Look up a kind by schema name. `int` is accepted for `int32`.
  pub fn from_name(name: &str) -> Option<Self> {
    match name {
      "string" => Some(FieldKind::Text),
      "bytes" => Some(FieldKind::Bytes),
      "int" | "int32" => Some(FieldKind::Int32),
      "int64" => Some(FieldKind::Int64),
      _ => None,
    }
  }
}

impl fmt::Display for FieldKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Mutable access to one field's storage.
#[derive(Debug)]
pub enum FieldSlot<'a> {
  Text(&'a mut String),
  Bytes(&'a mut Vec<u8>),
  Int32(&'a mut i32),
  Int64(&'a mut i64),
}

impl FieldSlot<'_> {
  pub fn kind(&self) -> FieldKind {
    match self {
      FieldSlot::Text(_) => FieldKind::Text,
      FieldSlot::Bytes(_) => FieldKind::Bytes,
      FieldSlot::Int32(_) => FieldKind::Int32,
      FieldSlot::Int64(_) => FieldKind::Int64,
    }
  }
}

impl<'a> From<&'a mut String> for FieldSlot<'a> {
  fn from(value: &'a mut String) -> Self {
    FieldSlot::Text(value)
  }
}

impl<'a> From<&'a mut Vec<u8>> for FieldSlot<'a> {
  fn from(value: &'a mut Vec<u8>) -> Self {
    FieldSlot::Bytes(value)
  }
}

impl<'a> From<&'a mut i32> for FieldSlot<'a> {
  fn from(value: &'a mut i32) -> Self {
    FieldSlot::Int32(value)
  }
}

impl<'a> From<&'a mut i64> for FieldSlot<'a> {
  fn from(value: &'a mut i64) -> Self {
    FieldSlot::Int64(value)
  }
}

/// Static description of a destination field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
  /// Semantic name. Lowercased, it is the lookup key.
  pub name: String,
  pub kind: FieldKind,
  /// Raw annotation string.
  pub tag: String,
}

/// One field of a record, ready to be written.
#[derive(Debug)]
pub struct Field<'a> {
  pub name: &'a str,
  pub tag: &'a str,
  pub slot: FieldSlot<'a>,
}

impl<'a> Field<'a> {
  pub fn new(name: &'a str, tag: &'a str, slot: impl Into<FieldSlot<'a>>) -> Self {
    Self {
      name,
      tag,
      slot: slot.into(),
    }
  }

  /// The key this field is looked up under.
  pub fn key(&self) -> String {
    self.name.to_lowercase()
  }

  pub fn descriptor(&self) -> FieldDescriptor {
    FieldDescriptor {
      name: self.name.to_string(),
      kind: self.slot.kind(),
      tag: self.tag.to_string(),
    }
  }
}

/// A typed destination that can be populated by the binder.
pub trait Record {
  /// All fields in declaration order.
  fn fields(&mut self) -> Vec<Field<'_>>;

  /// Descriptions of all fields in declaration order.
  fn descriptors(&mut self) -> Vec<FieldDescriptor> {
    self.fields().iter().map(Field::descriptor).collect()
  }
}

/// Implement [`Record`] for a struct.
///
/// Each entry maps a struct member to its semantic name and annotation:
/// `member: "Name" => "annotation"`. Entries must be listed in the order the
/// fields should be bound. Members must be `String`, `Vec<u8>`, `i32` or `i64`.
#[macro_export]
macro_rules! impl_record {
  ($ty:ty { $($member:ident : $name:literal => $tag:literal),* $(,)? }) => {
    impl $crate::record::Record for $ty {
      fn fields(&mut self) -> ::std::vec::Vec<$crate::record::Field<'_>> {
        ::std::vec![
          $($crate::record::Field::new($name, $tag, &mut self.$member)),*
        ]
      }
    }
  };
}

#[cfg(test)]
mod tests {
  use super::*;

  #[derive(Debug, Default)]
  struct Sample {
    name: String,
    blob: Vec<u8>,
    small: i32,
    big: i64,
  }

  crate::impl_record!(Sample {
    name: "Name" => "range[3]",
    blob: "Blob" => "omitempty",
    small: "SmallNum" => "range[1:]",
    big: "BigNum" => "-",
  });

  #[test]
  fn fields_follow_declaration_order() {
    let mut sample = Sample::default();
    let names: Vec<_> = sample.fields().iter().map(|f| f.name.to_string()).collect();
    assert_eq!(names, ["Name", "Blob", "SmallNum", "BigNum"]);
  }

  #[test]
  fn descriptors_carry_kind_and_tag() {
    let mut sample = Sample::default();
    let descriptors = sample.descriptors();
    assert_eq!(
      descriptors[2],
      FieldDescriptor {
        name: "SmallNum".to_string(),
        kind: FieldKind::Int32,
        tag: "range[1:]".to_string(),
      }
    );
    let kinds: Vec<_> = descriptors.iter().map(|d| d.kind).collect();
    assert_eq!(
      kinds,
      [FieldKind::Text, FieldKind::Bytes, FieldKind::Int32, FieldKind::Int64]
    );
  }

  #[test]
  fn key_is_lowercased_name() {
    let mut sample = Sample::default();
    assert_eq!(sample.fields()[2].key(), "smallnum");
  }

  #[test]
  fn slots_write_through() {
    let mut sample = Sample::default();
    for field in sample.fields() {
      match field.slot {
        FieldSlot::Text(s) => s.push_str("abc"),
        FieldSlot::Bytes(b) => b.push(7),
        FieldSlot::Int32(n) => *n = 3,
        FieldSlot::Int64(n) => *n = -4,
      }
    }
    assert_eq!(sample.name, "abc");
    assert_eq!(sample.blob, [7]);
    assert_eq!(sample.small, 3);
    assert_eq!(sample.big, -4);
  }

  #[test]
  fn kind_names() {
    for kind in [FieldKind::Text, FieldKind::Bytes, FieldKind::Int32, FieldKind::Int64] {
      assert_eq!(FieldKind::from_name(kind.as_str()), Some(kind));
    }
    assert_eq!(FieldKind::from_name("int"), Some(FieldKind::Int32));
    assert_eq!(FieldKind::from_name("float64"), None);
  }
}
