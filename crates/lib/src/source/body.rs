//! URL-encoded request bodies as a value source.

use std::collections::HashMap;
use std::io::{self, Read};
use std::string::FromUtf8Error;

use percent_encoding::percent_decode;
use thiserror::Error;
use tracing::debug;

use super::ValueSource;

/// Errors raised while reading or decoding a request body.
#[derive(Debug, Error)]
pub enum BodyError {
  #[error("failed to read request body: {0}")]
  Read(#[source] io::Error),

  #[error("invalid URL escape \"{0}\"")]
  InvalidEscape(String),

  #[error("decoded request body is not valid UTF-8: {0}")]
  InvalidUtf8(#[source] FromUtf8Error),
}

/// A decoded `application/x-www-form-urlencoded` body.
///
/// The whole body is unescaped before it is split into `key=value` pairs, so
/// an encoded `&` or `=` acts as a separator. Pairs without `=` are dropped
/// and a repeated key keeps its last value. The undecoded bytes are kept for
/// callers that need them, e.g. to verify a signature.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BodyParams {
  params: HashMap<String, String>,
  raw: Vec<u8>,
}

impl BodyParams {
  /// Read `reader` to the end and decode it.
  ///
  /// The reader is consumed and dropped before decoding starts, whatever the
  /// outcome.
  pub fn read<R: Read>(reader: R) -> Result<Self, BodyError> {
    Self::from_raw(read_raw(reader)?)
  }

  /// Decode an already-read body.
  pub fn from_raw(raw: Vec<u8>) -> Result<Self, BodyError> {
    let params = decode_pairs(&raw)?;
    Ok(Self { params, raw })
  }

  pub(crate) fn from_parts(params: HashMap<String, String>, raw: Vec<u8>) -> Self {
    Self { params, raw }
  }

  pub fn params(&self) -> &HashMap<String, String> {
    &self.params
  }

  /// The body exactly as it was read.
  pub fn raw(&self) -> &[u8] {
    &self.raw
  }

  pub fn into_raw(self) -> Vec<u8> {
    self.raw
  }
}

impl ValueSource for BodyParams {
  fn get(&self, key: &str) -> Option<&str> {
    self.params.get(key).map(String::as_str)
  }
}

/// Read a body stream to the end, releasing the stream before returning.
pub(crate) fn read_raw<R: Read>(mut reader: R) -> Result<Vec<u8>, BodyError> {
  let mut raw = Vec::new();
  let result = reader.read_to_end(&mut raw);
  drop(reader);
  result.map_err(BodyError::Read)?;
  Ok(raw)
}

/// Unescape the whole body, then split it into pairs.
pub(crate) fn decode_pairs(raw: &[u8]) -> Result<HashMap<String, String>, BodyError> {
  let decoded = unescape(raw)?;

  let mut params = HashMap::new();
  for pair in decoded.split('&') {
    if let Some((key, value)) = pair.split_once('=') {
      params.insert(key.to_string(), value.to_string());
    }
  }

  debug!(raw_len = raw.len(), pairs = params.len(), "decoded request body");
  Ok(params)
}

/// Form unescaping: `+` becomes a space and `%XX` the byte it encodes.
fn unescape(raw: &[u8]) -> Result<String, BodyError> {
  check_escapes(raw)?;
  let spaced: Vec<u8> = raw.iter().map(|&b| if b == b'+' { b' ' } else { b }).collect();
  let decoded: Vec<u8> = percent_decode(&spaced).collect();
  String::from_utf8(decoded).map_err(BodyError::InvalidUtf8)
}

fn check_escapes(raw: &[u8]) -> Result<(), BodyError> {
  for (i, &b) in raw.iter().enumerate() {
    if b != b'%' {
      continue;
    }
    let digits = raw.get(i + 1..i + 3).unwrap_or(&raw[i + 1..]);
    if digits.len() != 2 || !digits.iter().all(u8::is_ascii_hexdigit) {
      let escape = String::from_utf8_lossy(&raw[i..i + 1 + digits.len()]).into_owned();
      return Err(BodyError::InvalidEscape(escape));
    }
  }
  Ok(())
}

#[cfg(test)]
mod tests {
  use super::*;

  /// A reader that records whether it has been dropped.
  struct TrackedReader<'a> {
    inner: &'a [u8],
    dropped: &'a std::cell::Cell<bool>,
    fail: bool,
  }

  impl Read for TrackedReader<'_> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
      if self.fail {
        return Err(io::Error::other("connection reset"));
      }
      self.inner.read(buf)
    }
  }

  impl Drop for TrackedReader<'_> {
    fn drop(&mut self) {
      assert!(!self.dropped.replace(true), "reader dropped twice");
    }
  }

  #[test]
  fn splits_pairs_on_first_equals() {
    let body = BodyParams::from_raw(b"a=1&b=x=y&c=".to_vec()).unwrap();
    assert_eq!(body.get("a"), Some("1"));
    assert_eq!(body.get("b"), Some("x=y"));
    assert_eq!(body.get("c"), Some(""));
  }

  #[test]
  fn pairs_without_equals_are_dropped() {
    let body = BodyParams::from_raw(b"lonely&a=1&".to_vec()).unwrap();
    assert_eq!(body.get("lonely"), None);
    assert_eq!(body.params().len(), 1);
  }

  #[test]
  fn last_repeated_key_wins() {
    let body = BodyParams::from_raw(b"a=1&a=2".to_vec()).unwrap();
    assert_eq!(body.get("a"), Some("2"));
  }

  #[test]
  fn whole_body_is_unescaped_before_splitting() {
    let body = BodyParams::from_raw(b"note=fish%26chips&name=J%C3%BCrgen+M".to_vec()).unwrap();
    // The encoded `&` splits the pair.
    assert_eq!(body.get("note"), Some("fish"));
    assert_eq!(body.get("name"), Some("Jürgen M"));
  }

  #[test]
  fn raw_body_is_preserved() {
    let raw = b"sig=a%2Bb&n=1".to_vec();
    let body = BodyParams::from_raw(raw.clone()).unwrap();
    assert_eq!(body.raw(), raw.as_slice());
    assert_eq!(body.into_raw(), raw);
  }

  #[test]
  fn malformed_escapes_are_rejected() {
    for raw in [&b"a=%zz"[..], b"a=%4", b"a=100%"] {
      assert!(
        matches!(BodyParams::from_raw(raw.to_vec()), Err(BodyError::InvalidEscape(_))),
        "{:?} should be rejected",
        String::from_utf8_lossy(raw)
      );
    }
  }

  #[test]
  fn invalid_escape_names_the_sequence() {
    let err = BodyParams::from_raw(b"a=%4".to_vec()).unwrap_err();
    assert_eq!(err.to_string(), "invalid URL escape \"%4\"");
  }

  #[test]
  fn invalid_utf8_is_rejected() {
    let err = BodyParams::from_raw(b"a=%ff".to_vec()).unwrap_err();
    assert!(matches!(err, BodyError::InvalidUtf8(_)));
  }

  #[test]
  fn read_consumes_and_releases_stream() {
    let dropped = std::cell::Cell::new(false);
    let reader = TrackedReader {
      inner: b"k=v",
      dropped: &dropped,
      fail: false,
    };
    let body = BodyParams::read(reader).unwrap();
    assert!(dropped.get());
    assert_eq!(body.get("k"), Some("v"));
  }

  #[test]
  fn read_error_releases_stream() {
    let dropped = std::cell::Cell::new(false);
    let reader = TrackedReader {
      inner: b"",
      dropped: &dropped,
      fail: true,
    };
    let err = BodyParams::read(reader).unwrap_err();
    assert!(dropped.get());
    assert!(matches!(err, BodyError::Read(_)));
  }

  #[test]
  fn empty_body() {
    let body = BodyParams::read(&b""[..]).unwrap();
    assert!(body.params().is_empty());
    assert!(body.raw().is_empty());
  }
}
