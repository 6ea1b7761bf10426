//! Value sources the binder reads raw strings from.
//!
//! The binder always queries with the field's lowercased name. How keys are
//! stored, and whether they were lowercased on the way in, is up to the
//! source's producer.

pub(crate) mod body;
mod query;

use std::collections::{BTreeMap, HashMap};

pub use body::{BodyError, BodyParams};
pub use query::QueryValues;

/// Lookup contract shared by every value source.
pub trait ValueSource {
  /// Raw value stored under `key`, if any.
  ///
  /// An empty string and a missing key are treated the same by the binder.
  fn get(&self, key: &str) -> Option<&str>;
}

impl<S: ValueSource + ?Sized> ValueSource for &S {
  fn get(&self, key: &str) -> Option<&str> {
    (**self).get(key)
  }
}

impl ValueSource for HashMap<String, String> {
  fn get(&self, key: &str) -> Option<&str> {
    HashMap::get(self, key).map(String::as_str)
  }
}

impl ValueSource for BTreeMap<String, String> {
  fn get(&self, key: &str) -> Option<&str> {
    BTreeMap::get(self, key).map(String::as_str)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn lookup(source: &impl ValueSource, key: &str) -> Option<String> {
    source.get(key).map(str::to_string)
  }

  #[test]
  fn maps_are_sources() {
    let hash: HashMap<String, String> = [("num".to_string(), "11".to_string())].into();
    let tree: BTreeMap<String, String> = [("num".to_string(), "11".to_string())].into();

    assert_eq!(lookup(&hash, "num").as_deref(), Some("11"));
    assert_eq!(lookup(&tree, "num").as_deref(), Some("11"));
    assert_eq!(lookup(&hash, "Num"), None);
    assert_eq!(lookup(&&tree, "num").as_deref(), Some("11"));
  }
}
