//! Formwork Harness: reference worlds and rollout orchestration.
//!
//! The harness runs a world's action program through a problem's live
//! cursor (`reset_env` → `apply_action`) and records what happened as a
//! [`transcript::RolloutTranscript`]. It can then check that every observed
//! transition is one the problem's model predicts.
//!
//! The harness does NOT expand or score nodes itself; it delegates to the
//! problem crate. Worlds provide domain data only; the harness owns
//! orchestration.

#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]

pub mod contract;
pub mod runner;
pub mod transcript;
pub mod worlds;
