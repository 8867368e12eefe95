//! Rollout transcripts: the record of one program run against a live
//! environment.
//!
//! The transcript is plain serde data written as JSON. Its digest is taken
//! over a separate canonical projection (state fingerprints, reward bit
//! patterns) under `HashDomain::RolloutTranscript`, so two runs can be
//! compared without trusting float formatting.

use std::path::Path;

use formwork_kernel::carrier::state_key::StateKey;
use formwork_kernel::proof::canon::{canonical_json_bytes, CanonError};
use formwork_kernel::proof::hash::{canonical_hash, ContentHash, HashDomain};
use formwork_problem::environment::StepOutcome;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One applied action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutStep<A> {
    /// Live state key before the action.
    pub from: StateKey,
    pub action: A,
    pub outcome: StepOutcome,
}

/// Everything a runner observed while applying a program.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RolloutTranscript<A> {
    pub world_id: String,
    /// Observation returned by `reset_env`.
    pub initial: StateKey,
    pub steps: Vec<RolloutStep<A>>,
}

#[derive(Debug, Error)]
pub enum TranscriptError {
    #[error("transcript I/O failed for {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("transcript JSON failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Canon(#[from] CanonError),
}

impl<A> RolloutTranscript<A> {
    #[must_use]
    pub fn new(world_id: impl Into<String>, initial: StateKey) -> Self {
        Self {
            world_id: world_id.into(),
            initial,
            steps: Vec::new(),
        }
    }

    /// Sum of step rewards.
    #[must_use]
    pub fn total_reward(&self) -> f64 {
        self.steps.iter().map(|s| s.outcome.reward).sum()
    }

    /// Last observed state key (the initial one if no step was taken).
    #[must_use]
    pub fn final_state(&self) -> &StateKey {
        self.steps.last().map_or(&self.initial, |s| &s.outcome.observation)
    }

    /// Whether the episode ended, by termination or truncation.
    #[must_use]
    pub fn finished(&self) -> bool {
        self.steps
            .last()
            .is_some_and(|s| s.outcome.terminated || s.outcome.truncated)
    }
}

impl<A: Serialize> RolloutTranscript<A> {
    /// Write the transcript as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// [`TranscriptError::Json`] if an action cannot be serialised,
    /// [`TranscriptError::Io`] if the file cannot be written.
    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), TranscriptError> {
        let path = path.as_ref();
        let bytes = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, bytes).map_err(|source| TranscriptError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Content hash of the transcript's canonical projection.
    ///
    /// # Errors
    ///
    /// [`TranscriptError::Json`] or [`TranscriptError::Canon`] if an action
    /// does not serialise to integer-only JSON.
    pub fn digest(&self) -> Result<ContentHash, TranscriptError> {
        let steps = self
            .steps
            .iter()
            .map(|step| {
                Ok(serde_json::json!({
                    "action": serde_json::to_value(&step.action)?,
                    "from": step.from.fingerprint().hex_digest(),
                    "observation": step.outcome.observation.fingerprint().hex_digest(),
                    "reward": format!("{:016x}", step.outcome.reward.to_bits()),
                    "terminated": step.outcome.terminated,
                    "truncated": step.outcome.truncated,
                }))
            })
            .collect::<Result<Vec<_>, serde_json::Error>>()?;
        let projection = serde_json::json!({
            "initial": self.initial.fingerprint().hex_digest(),
            "steps": steps,
            "world_id": self.world_id,
        });
        let bytes = canonical_json_bytes(&projection)?;
        Ok(canonical_hash(HashDomain::RolloutTranscript, &bytes))
    }
}

impl<A: DeserializeOwned> RolloutTranscript<A> {
    /// Read a transcript written by [`RolloutTranscript::write_to`].
    ///
    /// # Errors
    ///
    /// [`TranscriptError::Io`] or [`TranscriptError::Json`].
    pub fn read_from(path: impl AsRef<Path>) -> Result<Self, TranscriptError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| TranscriptError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}
