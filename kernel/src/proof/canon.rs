//! Canonical JSON bytes: the single serialization-for-hashing implementation.
//!
//! All hashing flows that involve JSON route through this module, as does the
//! conversion of structured observations into textual state keys.
//!
//! # Canonicalization rules
//!
//! 1. Object keys are sorted lexicographically (byte order).
//! 2. Compact form, no whitespace: `{"a":1,"b":2}`.
//! 3. Strings are JSON-escaped per RFC 8259 §7.
//! 4. Numbers must be integers (`i64` or `u64`). Floats are rejected; callers
//!    that need to commit to a float encode `f64::to_bits` instead.
//! 5. `null`, `true`, `false` are written literally.

use std::io::Write;

use serde_json::Value;
use thiserror::Error;

/// Error type for canonical JSON serialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonError {
    /// A JSON number was not an integer.
    #[error("non-integer number in canonical JSON: {raw}")]
    NonIntegerNumber { raw: String },
}

/// Produce canonical JSON bytes from a `serde_json::Value`.
///
/// # Errors
///
/// Returns [`CanonError::NonIntegerNumber`] if any number is not
/// representable as `i64` or `u64`.
pub fn canonical_json_bytes(value: &Value) -> Result<Vec<u8>, CanonError> {
    let mut out = Canonicalizer { buf: Vec::new() };
    out.value(value)?;
    Ok(out.buf)
}

/// Canonical JSON as a `String`.
///
/// # Errors
///
/// Same as [`canonical_json_bytes`].
pub fn canonical_json_string(value: &Value) -> Result<String, CanonError> {
    let bytes = canonical_json_bytes(value)?;
    // The encoder only ever emits UTF-8.
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

struct Canonicalizer {
    buf: Vec<u8>,
}

impl Canonicalizer {
    fn value(&mut self, value: &Value) -> Result<(), CanonError> {
        match value {
            Value::Null => self.buf.extend_from_slice(b"null"),
            Value::Bool(true) => self.buf.extend_from_slice(b"true"),
            Value::Bool(false) => self.buf.extend_from_slice(b"false"),
            Value::Number(n) => self.number(n)?,
            Value::String(s) => self.string(s),
            Value::Array(items) => {
                self.buf.push(b'[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.buf.push(b',');
                    }
                    self.value(item)?;
                }
                self.buf.push(b']');
            }
            Value::Object(map) => {
                let mut entries: Vec<(&String, &Value)> = map.iter().collect();
                entries.sort_by(|a, b| a.0.as_bytes().cmp(b.0.as_bytes()));
                self.buf.push(b'{');
                for (i, (key, item)) in entries.into_iter().enumerate() {
                    if i > 0 {
                        self.buf.push(b',');
                    }
                    self.string(key);
                    self.buf.push(b':');
                    self.value(item)?;
                }
                self.buf.push(b'}');
            }
        }
        Ok(())
    }

    fn number(&mut self, n: &serde_json::Number) -> Result<(), CanonError> {
        if let Some(i) = n.as_i64() {
            let _ = write!(self.buf, "{i}");
        } else if let Some(u) = n.as_u64() {
            let _ = write!(self.buf, "{u}");
        } else {
            return Err(CanonError::NonIntegerNumber { raw: n.to_string() });
        }
        Ok(())
    }

    fn string(&mut self, s: &str) {
        self.buf.push(b'"');
        for ch in s.chars() {
            match ch {
                '"' => self.buf.extend_from_slice(b"\\\""),
                '\\' => self.buf.extend_from_slice(b"\\\\"),
                '\n' => self.buf.extend_from_slice(b"\\n"),
                '\r' => self.buf.extend_from_slice(b"\\r"),
                '\t' => self.buf.extend_from_slice(b"\\t"),
                c if c < '\u{0020}' => {
                    let _ = write!(self.buf, "\\u{:04x}", c as u32);
                }
                c => {
                    let mut utf8 = [0u8; 4];
                    self.buf.extend_from_slice(c.encode_utf8(&mut utf8).as_bytes());
                }
            }
        }
        self.buf.push(b'"');
    }
}
