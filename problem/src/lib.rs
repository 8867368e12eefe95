//! Formwork Problem: the problem-formulation layer between environments and
//! search algorithms.
//!
//! This crate depends only on `formwork_kernel`. It performs no search: it
//! produces, for a given node, the constraint-filtered successor nodes and the
//! means to score them.
//!
//! # Crate dependency graph
//!
//! ```text
//! formwork_kernel  ←  formwork_problem  ←  formwork_harness
//! (state identity)    (nodes, problems)    (worlds, rollouts)
//! ```
//!
//! # Key types
//!
//! - [`Node`] / [`SearchTree`] -- immutable nodes in an append-only arena
//! - [`Problem`] -- capability trait with the fixed successor pipeline
//! - [`TableProblem`] -- transitions from an explicit probability table
//! - [`SampledProblem`] -- bounded action sampling over a [`SampledDomain`]
//! - [`ConstraintSet`] -- ordered validity predicates used as a filter
//! - [`LiveCursor`] -- the live `current_state`, separate from the tree

#![forbid(unsafe_code)]

pub mod config;
pub mod constraint;
pub mod contract;
pub mod digest;
pub mod environment;
pub mod error;
pub mod node;
pub mod sampled;
pub mod table;
pub mod tree;
pub mod valuation;

pub use config::ProblemConfig;
pub use constraint::{Constraint, ConstraintSet};
pub use contract::Problem;
pub use environment::{Environment, EnvironmentError, LiveCursor, StepOutcome, TabularEnvironment};
pub use error::ProblemError;
pub use node::{Node, NodeId, TransitionInfo};
pub use sampled::{SampledDomain, SampledProblem};
pub use table::{ProbabilityTable, TableProblem, Transition};
pub use tree::{NodeRef, SearchTree};
pub use valuation::{Valuation, ValueOrder};
