//! World harness contract: the minimal trait a world must implement.
//!
//! Worlds provide a problem and a fixed action program. Worlds may NOT step
//! the environment themselves or record transcripts; those are runner
//! concerns.

use std::fmt::Debug;

use formwork_problem::config::ProblemConfig;
use formwork_problem::contract::Problem;
use thiserror::Error;

/// Typed failure for world harness operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldHarnessError {
    /// Problem construction failed.
    #[error("world build failed: {detail}")]
    Build { detail: String },
}

/// The contract a world must implement to be run by the harness runner.
///
/// A world provides:
/// - A unique identifier
/// - A problem built from a caller-supplied [`ProblemConfig`], with its
///   environment attached
/// - A program (sequence of actions to apply)
pub trait WorldHarness {
    type Action: Clone + Debug;
    type Problem: Problem<Action = Self::Action>;

    /// Unique world identifier (e.g., `"frozen_lake_4x4"`).
    fn world_id(&self) -> &str;

    /// Build a fresh problem for one rollout.
    ///
    /// # Errors
    ///
    /// Returns [`WorldHarnessError::Build`] if the world's data is malformed.
    fn build_problem(&self, config: ProblemConfig) -> Result<Self::Problem, WorldHarnessError>;

    /// The action program applied by the runner.
    fn program(&self) -> Vec<Self::Action>;
}
