//! URL query parameters as a value source.

use std::collections::BTreeMap;

use super::ValueSource;

/// Query parameters, each key holding one or more values.
///
/// Keys are stored exactly as given. Lookups through [`ValueSource`] return
/// the first value recorded for a key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryValues {
  values: BTreeMap<String, Vec<String>>,
}

impl QueryValues {
  pub fn new() -> Self {
    Self::default()
  }

  /// Parse an `application/x-www-form-urlencoded` query string.
  ///
  /// A leading `?` is ignored. A pair without `=` records an empty value.
  pub fn parse(query: &str) -> Self {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
      .map(|(k, v)| (k.into_owned(), v.into_owned()))
      .collect()
  }

  /// Replace all values of `key` with `value`.
  pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.values.insert(key.into(), vec![value.into()]);
  }

  /// Add `value` after any existing values of `key`.
  pub fn append(&mut self, key: impl Into<String>, value: impl Into<String>) {
    self.values.entry(key.into()).or_default().push(value.into());
  }

  /// Every value recorded for `key`, in insertion order.
  pub fn get_all(&self, key: &str) -> &[String] {
    self.values.get(key).map(Vec::as_slice).unwrap_or_default()
  }

  pub fn len(&self) -> usize {
    self.values.len()
  }

  pub fn is_empty(&self) -> bool {
    self.values.is_empty()
  }
}

impl ValueSource for QueryValues {
  fn get(&self, key: &str) -> Option<&str> {
    self.values.get(key).and_then(|v| v.first()).map(String::as_str)
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for QueryValues {
  fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
    let mut values = Self::new();
    for (k, v) in iter {
      values.append(k, v);
    }
    values
  }
}
