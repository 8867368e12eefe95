//! Content digests over expansions and tables.
//!
//! Expansion is deterministic, so a successor list has a stable digest.
//! Callers that memoise expansions (or cross-check two runs) compare digests
//! instead of node lists. Floats are committed by their IEEE-754 bit
//! patterns, since canonical JSON admits integers only.

use formwork_kernel::proof::canon::{canonical_json_bytes, CanonError};
use formwork_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

use crate::node::Node;
use crate::table::ProbabilityTable;

/// Failure computing a digest.
#[derive(Debug, Error)]
pub enum DigestError {
    /// The action type could not be serialised.
    #[error("action serialization failed: {0}")]
    Action(#[from] serde_json::Error),

    /// The serialised action contained a float.
    #[error(transparent)]
    Canon(#[from] CanonError),
}

fn float_bits(value: f64) -> String {
    format!("{:016x}", value.to_bits())
}

fn optional_bits(value: Option<f64>) -> Value {
    value.map_or(Value::Null, |v| Value::String(float_bits(v)))
}

fn node_value<A: Serialize>(node: &Node<A>) -> Result<Value, serde_json::Error> {
    Ok(json!({
        "action": serde_json::to_value(node.action())?,
        "depth": node.depth(),
        "parent": node.parent().map(|p| p.index()),
        "path_cost": float_bits(node.path_cost()),
        "probability": optional_bits(node.info().probability),
        "reward": optional_bits(node.info().reward),
        "state": node.state().fingerprint().hex_digest(),
        "terminal": node.state().is_terminal(),
    }))
}

/// Digest of a successor list, order-sensitive.
///
/// # Errors
///
/// [`DigestError`] if an action cannot be serialised to integer-only JSON.
pub fn expansion_digest<A: Serialize>(successors: &[Node<A>]) -> Result<ContentHash, DigestError> {
    let values = successors
        .iter()
        .map(node_value)
        .collect::<Result<Vec<_>, _>>()?;
    let bytes = canonical_json_bytes(&Value::Array(values))?;
    Ok(canonical_hash(HashDomain::Expansion, &bytes))
}

/// Digest of a whole probability table.
///
/// # Errors
///
/// As [`expansion_digest`].
pub fn table_digest<A: Ord + Serialize>(table: &ProbabilityTable<A>) -> Result<ContentHash, DigestError> {
    let mut rows = Vec::new();
    for (state, action, outcomes) in table.iter() {
        let outcomes: Vec<Value> = outcomes
            .iter()
            .map(|t| {
                json!([
                    float_bits(t.probability),
                    t.next_state.fingerprint().hex_digest(),
                    float_bits(t.reward),
                    t.terminal,
                ])
            })
            .collect();
        rows.push(json!({
            "action": serde_json::to_value(action)?,
            "outcomes": outcomes,
            "state": state.fingerprint().hex_digest(),
        }));
    }
    let bytes = canonical_json_bytes(&Value::Array(rows))?;
    Ok(canonical_hash(HashDomain::ProbabilityTable, &bytes))
}
