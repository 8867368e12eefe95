//! Shared helpers for formwork benchmark suites.

use formwork_harness::contract::WorldHarness;
use formwork_harness::worlds::drift::{Drift, DriftWorld};
use formwork_harness::worlds::frozen_lake::FrozenLakeWorld;
use formwork_problem::config::ProblemConfig;
use formwork_problem::contract::Problem;
use formwork_problem::error::ProblemError;
use formwork_problem::node::NodeId;
use formwork_problem::sampled::SampledProblem;
use formwork_problem::table::TableProblem;
use formwork_problem::tree::SearchTree;

/// The slippery 4x4 lake as a table problem.
///
/// # Panics
///
/// Panics if the built-in world fails to build (a bug, not an input error).
#[must_use]
pub fn lake_problem() -> TableProblem<u8> {
    FrozenLakeWorld::default()
        .build_problem(ProblemConfig::default())
        .expect("frozen lake builds")
}

/// The drift rail with `sample_size` actions per state.
///
/// # Panics
///
/// Panics if `sample_size` is zero.
#[must_use]
pub fn drift_problem(sample_size: usize) -> SampledProblem<Drift> {
    let config = ProblemConfig {
        default_sample_size: sample_size,
        ..ProblemConfig::default()
    };
    DriftWorld::default().build_problem(config).expect("drift builds")
}

/// Breadth-first expansion of `tree` to `depth`; returns the ids of the
/// deepest layer.
///
/// # Errors
///
/// Whatever the problem's expansion returns.
pub fn grow_layers<P: Problem>(problem: &P, tree: &mut SearchTree<P::Action>, depth: u32) -> Result<Vec<NodeId>, ProblemError> {
    let mut layer = vec![tree.root()];
    for _ in 0..depth {
        let mut next = Vec::new();
        for id in layer {
            if let Some(children) = problem.successors(tree.node(id)?)? {
                next.extend(tree.extend(children)?);
            }
        }
        layer = next;
    }
    Ok(layer)
}
