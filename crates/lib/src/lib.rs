//! parambind-lib: bind flat key/value input into typed records.
//!
//! This crate decodes untrusted flat text input, such as URL query parameters
//! or URL-encoded request bodies, into strongly typed records while
//! validating each field against its annotation:
//! - `tag`: the annotation grammar (`omitempty`, `range[...]`, `-`)
//! - `range`: the exact-length and `min:max` range sub-grammars
//! - `record`: destination records and their field slots
//! - `source`: value sources (query parameters, request bodies, maps)
//! - `bind`: the single-pass bind-and-validate engine
//! - `schema`: records declared at runtime
//!
//! # Example
//!
//! ```
//! use parambind_lib::{bind_query, impl_record, QueryValues};
//!
//! #[derive(Debug, Default)]
//! struct Param {
//!   num: String,
//!   num1: i32,
//!   num2: String,
//!   num3: Vec<u8>,
//! }
//!
//! impl_record!(Param {
//!   num: "Num" => "",
//!   num1: "Num1" => "omitempty,range[1:]",
//!   num2: "Num2" => "range[3]",
//!   num3: "Num3" => "range[16]",
//! });
//!
//! let values = QueryValues::parse("num=11&num1=22&num2=223&num3=e8313ee1b99d4f96b5451a0209b1099e");
//! let mut param = Param::default();
//! bind_query(&values, &mut param).unwrap();
//! assert_eq!(param.num1, 22);
//! assert_eq!(param.num3.len(), 16);
//! ```

pub mod bind;
pub mod range;
pub mod record;
pub mod schema;
pub mod source;
pub mod tag;

pub use bind::{BindError, BindErrorKind, BodyBindError, bind, bind_body, bind_new, bind_query};
pub use record::{Field, FieldDescriptor, FieldKind, FieldSlot, Record};
pub use source::{BodyError, BodyParams, QueryValues, ValueSource};
pub use tag::{FieldTag, TagDirectives, TagError};
