//! Sampled problems: action spaces too large to enumerate.
//!
//! The domain proposes actions for a state through a seeded RNG; the
//! problem enforces the sampling contract on whatever comes back (no
//! duplicates, never more than `sample_size`). The RNG seed is derived from
//! the configured base seed and the state's fingerprint, so the sample for a
//! given state is fixed and repeated expansion stays idempotent.

use std::fmt::Debug;

use formwork_kernel::carrier::state::State;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::warn;

use crate::config::ProblemConfig;
use crate::constraint::ConstraintSet;
use crate::contract::Problem;
use crate::environment::{Environment, LiveCursor, StepOutcome};
use crate::error::ProblemError;
use crate::node::Node;
use crate::tree::NodeRef;
use crate::valuation::ValueOrder;

/// Domain knowledge a sampled problem needs.
pub trait SampledDomain: Send + Sync {
    type Action: Clone + PartialEq + Debug;

    /// Propose up to `sample_size` actions applicable at `state`.
    ///
    /// The policy (uniform, weighted, domain-specific) is the domain's
    /// choice. Over-long or duplicated proposals are trimmed by the caller.
    fn sample_actions(&self, state: &State, sample_size: usize, rng: &mut StdRng) -> Vec<Self::Action>;

    /// Successors of `parent` under `action`, each built with
    /// [`Node::child`] and the supplied `step_cost`.
    ///
    /// # Errors
    ///
    /// Domain-specific failures.
    fn successors(
        &self,
        action: &Self::Action,
        parent: NodeRef<'_, Self::Action>,
        step_cost: f64,
    ) -> Result<Vec<Node<Self::Action>>, ProblemError>;

    /// Domain-specific action cost, or `None` to use the configured default.
    fn action_cost(&self, _action: &Self::Action, _state: &State) -> Option<f64> {
        None
    }
}

/// A problem whose applicable actions come from bounded sampling.
pub struct SampledProblem<D: SampledDomain> {
    domain: D,
    config: ProblemConfig,
    constraints: Option<ConstraintSet<D::Action>>,
    cursor: LiveCursor<D::Action>,
}

impl<D: SampledDomain> SampledProblem<D> {
    /// A detached problem; attach an environment with
    /// [`SampledProblem::with_environment`] to enable stepping.
    #[must_use]
    pub fn new(domain: D, initial: State, config: ProblemConfig) -> Self {
        Self {
            domain,
            config,
            constraints: None,
            cursor: LiveCursor::detached(initial),
        }
    }

    #[must_use]
    pub fn with_environment(mut self, environment: impl Environment<Action = D::Action> + 'static) -> Self {
        self.cursor = LiveCursor::attached(self.cursor.state().clone(), environment);
        self
    }

    #[must_use]
    pub fn with_constraints(mut self, constraints: ConstraintSet<D::Action>) -> Self {
        self.constraints = Some(constraints);
        self
    }

    #[must_use]
    pub fn domain(&self) -> &D {
        &self.domain
    }

    #[must_use]
    pub fn config(&self) -> &ProblemConfig {
        &self.config
    }

    /// At most `sample_size` distinct actions applicable at `state`.
    ///
    /// Duplicates keep their first occurrence; the list is then cut to
    /// `sample_size`. The result depends only on `state`, `sample_size`, and
    /// the configured seed.
    #[must_use]
    pub fn sample_applicable_actions_at_state(&self, state: &State, sample_size: usize) -> Vec<D::Action> {
        let seed = self.config.sampler_seed ^ state.fingerprint().prefix_u64();
        let mut rng = StdRng::seed_from_u64(seed);
        let proposed = self.domain.sample_actions(state, sample_size, &mut rng);
        let proposed_len = proposed.len();

        let mut actions: Vec<D::Action> = Vec::with_capacity(proposed_len.min(sample_size));
        for action in proposed {
            if actions.len() == sample_size {
                break;
            }
            if !actions.contains(&action) {
                actions.push(action);
            }
        }

        if actions.len() != proposed_len {
            warn!(
                %state,
                proposed = proposed_len,
                kept = actions.len(),
                sample_size,
                "sampler returned duplicate or excess actions"
            );
        }
        actions
    }
}

impl<D: SampledDomain> Problem for SampledProblem<D> {
    type Action = D::Action;

    fn get_current_state(&self) -> &State {
        self.cursor.state()
    }

    fn constraints(&self) -> Option<&ConstraintSet<D::Action>> {
        self.constraints.as_ref()
    }

    fn is_stochastic(&self) -> bool {
        self.config.stochastic
    }

    fn value_order(&self) -> ValueOrder {
        self.config.value_order
    }

    fn get_applicable_actions_at_state(&self, state: &State) -> Result<Vec<D::Action>, ProblemError> {
        Ok(self.sample_applicable_actions_at_state(state, self.config.default_sample_size))
    }

    fn get_successors(
        &self,
        action: &D::Action,
        node: NodeRef<'_, D::Action>,
    ) -> Result<Vec<Node<D::Action>>, ProblemError> {
        let step_cost = self.get_action_cost(action, node.state())?;
        self.domain.successors(action, node, step_cost)
    }

    fn get_action_cost(&self, action: &D::Action, state: &State) -> Result<f64, ProblemError> {
        Ok(self
            .domain
            .action_cost(action, state)
            .unwrap_or(self.config.default_action_cost))
    }

    fn is_goal_state(&self, state: &State) -> bool {
        state.is_terminal()
    }

    fn apply_action(&mut self, action: &D::Action) -> Result<StepOutcome, ProblemError> {
        self.cursor.apply(action)
    }

    fn reset_env(&mut self) -> Result<State, ProblemError> {
        self.cursor.reset().cloned()
    }
}

impl<D: SampledDomain + Debug> Debug for SampledProblem<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SampledProblem")
            .field("domain", &self.domain)
            .field("config", &self.config)
            .field("constraints", &self.constraints)
            .field("cursor", &self.cursor)
            .finish()
    }
}
