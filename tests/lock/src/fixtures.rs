//! Problems and helpers shared by the lock tests and the fixture binary.

use formwork_kernel::carrier::state::State;
use formwork_kernel::carrier::state_key::StateKey;
use formwork_problem::config::ProblemConfig;
use formwork_problem::contract::Problem;
use formwork_problem::error::ProblemError;
use formwork_problem::node::{Node, NodeId, TransitionInfo};
use formwork_problem::sampled::SampledDomain;
use formwork_problem::table::{ProbabilityTable, TableProblem};
use formwork_problem::tree::{NodeRef, SearchTree};
use rand::rngs::StdRng;
use rand::Rng;

/// Two states, one deterministic action.
pub const TWO_STATE_JSON: &str = r#"{"s0": {"right": [[1.0, "s1", -1, false]]}}"#;

/// One action with two equally likely outcomes, the second terminal.
pub const STOCHASTIC_JSON: &str = r#"{"s0": {"a": [[0.5, "s1", 0, false], [0.5, "s2", 0, true]]}}"#;

/// A small branching table: every state has two actions, `"a"` has two
/// outcomes, and `g` is a terminal sink.
pub const DIAMOND_JSON: &str = r#"{
    "s0": {"a": [[0.5, "s1", 0, false], [0.5, "s2", 0, false]], "b": [[1.0, "s3", 1, false]]},
    "s1": {"a": [[0.5, "s3", 0, false], [0.5, "g", 5, true]], "b": [[1.0, "s0", 0, false]]},
    "s2": {"a": [[0.5, "s3", 0, false], [0.5, "g", 5, true]], "b": [[1.0, "s1", 0, false]]},
    "s3": {"a": [[0.5, "s1", 0, false], [0.5, "g", 5, true]], "b": [[1.0, "s2", 0, false]]},
    "g": {"a": [[1.0, "g", 0, true]], "b": [[1.0, "g", 0, true]]}
}"#;

/// Parse `json` into a detached table problem rooted at `"s0"`.
///
/// # Panics
///
/// Panics if `json` is not a valid table; fixtures are static.
#[must_use]
pub fn table_problem(json: &str, config: ProblemConfig) -> TableProblem<String> {
    let table = ProbabilityTable::from_json_str(json).unwrap_or_else(|e| panic!("fixture table: {e}"));
    TableProblem::new(State::initial("s0"), table, config)
}

/// A one-node tree rooted at `key`.
#[must_use]
pub fn rooted<A>(key: impl Into<StateKey>) -> SearchTree<A> {
    SearchTree::new(State::initial(key))
}

/// Expand breadth-first to `depth`, inserting every constraint-filtered
/// successor.
///
/// # Errors
///
/// Whatever the problem's expansion returns.
pub fn grow<P: Problem>(problem: &P, tree: &mut SearchTree<P::Action>, depth: u32) -> Result<(), ProblemError> {
    let mut layer: Vec<NodeId> = vec![tree.root()];
    for _ in 0..depth {
        let mut next = Vec::new();
        for id in layer {
            let Some(children) = problem.successors(tree.node(id)?)? else {
                continue;
            };
            next.extend(tree.extend(children)?);
        }
        layer = next;
    }
    Ok(())
}

/// Integer ladder: from rung `n`, action `a` climbs to `n + a` at cost `a`.
/// Rungs at or above `top` are terminal.
///
/// The sampler is deliberately sloppy: it proposes `2 * k` draws from
/// `1..=width`, so the problem has to trim and deduplicate.
#[derive(Debug, Clone)]
pub struct Ladder {
    pub width: u32,
    pub top: i64,
}

impl Ladder {
    fn rung(key: &StateKey) -> Result<i64, ProblemError> {
        match key {
            StateKey::Int(n) => Ok(*n),
            other => Err(ProblemError::UnknownState { key: other.clone() }),
        }
    }
}

impl SampledDomain for Ladder {
    type Action = u32;

    fn sample_actions(&self, state: &State, sample_size: usize, rng: &mut StdRng) -> Vec<u32> {
        if state.is_terminal() || self.width == 0 {
            return Vec::new();
        }
        (0..sample_size * 2).map(|_| rng.gen_range(1..=self.width)).collect()
    }

    fn successors(&self, action: &u32, parent: NodeRef<'_, u32>, step_cost: f64) -> Result<Vec<Node<u32>>, ProblemError> {
        let rung = Self::rung(parent.state().key())? + i64::from(*action);
        Ok(vec![Node::child(
            parent,
            State::new(rung, rung >= self.top),
            *action,
            step_cost,
            TransitionInfo::reward(-f64::from(*action)),
        )])
    }

    fn action_cost(&self, action: &u32, _state: &State) -> Option<f64> {
        Some(f64::from(*action))
    }
}
