//! Proof module: canonical encoding and domain-separated hashing.
//!
//! Nothing in this module knows about states or nodes.

pub mod canon;
pub mod hash;
pub mod hash_domain;
