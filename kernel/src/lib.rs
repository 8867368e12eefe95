//! Formwork Kernel: state identity and canonical hashing.
//!
//! # API Surface
//!
//! - [`carrier::state_key::StateKey`] -- the comparable, hashable form of an
//!   environment observation
//! - [`carrier::state::State`] -- a key plus terminal flag
//! - [`proof::canon::canonical_json_bytes`] -- the single canonical JSON encoder
//! - [`proof::hash::canonical_hash`] -- domain-separated SHA-256
//!
//! # Module Dependency Direction
//!
//! `proof` ← `carrier`
//!
//! `carrier` uses `proof` for key canonicalisation and fingerprints.
//! `proof` depends on nothing internal.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod carrier;
pub mod proof;
