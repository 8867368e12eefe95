//! Carrier module: the identity of an environment state.
//!
//! [`state_key::StateKey`] is the comparable form of an observation;
//! [`state::State`] pairs a key with its terminal flag.

pub mod state;
pub mod state_key;
