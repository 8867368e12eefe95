//! `StateKey`: an environment observation in hashable, totally ordered form.
//!
//! Environments report observations in whatever shape suits them (an integer
//! cell index, a string, a tuple of coordinates). The problem layer only needs
//! identity and a total order, so observations are lowered into this closed
//! enum once, at the environment boundary.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::proof::canon::{canonical_json_bytes, canonical_json_string, CanonError};
use crate::proof::hash::{canonical_hash, ContentHash, HashDomain};

/// Comparable, hashable identifier of an environment state.
///
/// Ordering is derived: all `Int` keys sort before all `Text` keys, which
/// sort before all `Tuple` keys; within a variant the natural order applies.
///
/// Serialises untagged, so a JSON table keyed by `"s0"` or `3` or `[1, 2]`
/// maps directly onto keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StateKey {
    Int(i64),
    Text(String),
    Tuple(Vec<StateKey>),
}

/// Failure converting an observation into a [`StateKey`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KeyError {
    /// The observation contained a number that is not an integer.
    #[error("observation is not keyable: {0}")]
    Canon(#[from] CanonError),
    /// `null` carries no identity.
    #[error("observation is null")]
    NullObservation,
    /// An integer outside the `i64` range of `Int` keys.
    #[error("observation integer {raw} does not fit in an i64 key")]
    IntegerOutOfRange { raw: String },
}

impl StateKey {
    /// Lower a JSON observation into a key.
    ///
    /// - integers become `Int`
    /// - booleans become `Int(0)` / `Int(1)`
    /// - strings become `Text`
    /// - arrays become `Tuple` (recursively)
    /// - objects become `Text` holding their canonical JSON form
    ///
    /// # Errors
    ///
    /// Returns [`KeyError::NullObservation`] for `null` anywhere in the value,
    /// [`KeyError::IntegerOutOfRange`] for integers above `i64::MAX`, and
    /// [`KeyError::Canon`] for non-integer numbers.
    pub fn from_observation(observation: &Value) -> Result<Self, KeyError> {
        match observation {
            Value::Null => Err(KeyError::NullObservation),
            Value::Bool(b) => Ok(Self::Int(i64::from(*b))),
            Value::Number(n) => match (n.as_i64(), n.is_u64()) {
                (Some(i), _) => Ok(Self::Int(i)),
                (None, true) => Err(KeyError::IntegerOutOfRange { raw: n.to_string() }),
                (None, false) => Err(KeyError::Canon(CanonError::NonIntegerNumber { raw: n.to_string() })),
            },
            Value::String(s) => Ok(Self::Text(s.clone())),
            Value::Array(items) => items
                .iter()
                .map(Self::from_observation)
                .collect::<Result<Vec<_>, _>>()
                .map(Self::Tuple),
            Value::Object(_) => Ok(Self::Text(canonical_json_string(observation)?)),
        }
    }

    /// Canonical bytes committing to this key (used for fingerprints).
    #[must_use]
    pub fn canonical_bytes(&self) -> Vec<u8> {
        // Tagging keeps `Int(1)` and `Text("1")` apart.
        let tagged = self.tagged();
        // Tagged form contains only integers and strings.
        canonical_json_bytes(&tagged).unwrap_or_default()
    }

    fn tagged(&self) -> Value {
        match self {
            Self::Int(i) => serde_json::json!({ "i": i }),
            Self::Text(s) => serde_json::json!({ "s": s }),
            Self::Tuple(items) => {
                serde_json::json!({ "t": items.iter().map(Self::tagged).collect::<Vec<_>>() })
            }
        }
    }

    /// Domain-separated content hash of this key.
    #[must_use]
    pub fn fingerprint(&self) -> ContentHash {
        canonical_hash(HashDomain::StateKey, &self.canonical_bytes())
    }
}

impl fmt::Display for StateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Text(s) => f.write_str(s),
            Self::Tuple(items) => {
                f.write_str("(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str(")")
            }
        }
    }
}

impl From<i64> for StateKey {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u32> for StateKey {
    fn from(value: u32) -> Self {
        Self::Int(i64::from(value))
    }
}

impl From<&str> for StateKey {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for StateKey {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<StateKey>> for StateKey {
    fn from(value: Vec<StateKey>) -> Self {
        Self::Tuple(value)
    }
}
