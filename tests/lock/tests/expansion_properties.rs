//! Property locks over expansion.
//!
//! - PATH-COST: every successor's cost is its parent's plus the action cost.
//! - IDEMPOTENT: expanding the same node twice gives list-equal results.
//! - SAMPLE-BOUND: sampled action lists never exceed `k` and never repeat.

use std::collections::BTreeMap;

use formwork_kernel::carrier::state::State;
use formwork_problem::config::ProblemConfig;
use formwork_problem::contract::Problem;
use formwork_problem::sampled::SampledProblem;
use lock_tests::fixtures::{grow, rooted, table_problem, Ladder, DIAMOND_JSON};
use proptest::prelude::*;

fn ladder_problem(width: u32, top: i64, seed: u64, sample_size: usize) -> SampledProblem<Ladder> {
    let config = ProblemConfig {
        sampler_seed: seed,
        default_sample_size: sample_size,
        ..ProblemConfig::default()
    };
    SampledProblem::new(Ladder { width, top }, State::initial(0i64), config)
}

proptest! {
    #[test]
    fn sampled_actions_are_bounded_and_distinct(
        width in 0u32..20,
        rung in -50i64..50,
        k in 0usize..12,
        seed in any::<u64>(),
    ) {
        let problem = ladder_problem(width, 100, seed, 4);
        let actions = problem.sample_applicable_actions_at_state(&State::new(rung, false), k);
        prop_assert!(actions.len() <= k);
        let mut sorted = actions.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), actions.len());
        prop_assert!(actions.iter().all(|a| (1..=width).contains(a)));
    }

    #[test]
    fn sampled_successor_cost_accumulates(
        width in 1u32..6,
        top in 3i64..12,
        seed in any::<u64>(),
        sample_size in 1usize..4,
    ) {
        let problem = ladder_problem(width, top, seed, sample_size);
        let mut tree = rooted::<u32>(0i64);
        grow(&problem, &mut tree, 3).unwrap();

        for node in tree.iter().skip(1) {
            let parent = tree.get(node.parent().unwrap()).unwrap();
            let action = node.action().unwrap();
            let step = problem.get_action_cost(action, parent.state()).unwrap();
            prop_assert_eq!(node.path_cost(), parent.path_cost() + step);
            prop_assert_eq!(node.depth(), parent.depth() + 1);
        }
    }

    #[test]
    fn sampled_expansion_is_idempotent(
        width in 1u32..10,
        seed in any::<u64>(),
        rung in 0i64..20,
    ) {
        let problem = ladder_problem(width, 50, seed, 3);
        let tree = rooted::<u32>(rung);
        let root = tree.node(tree.root()).unwrap();
        prop_assert_eq!(problem.successors(root).unwrap(), problem.successors(root).unwrap());
    }

    #[test]
    fn table_successor_cost_uses_overrides(
        cost_a in 0u8..10,
        default_cost in 0u8..5,
    ) {
        let config = ProblemConfig {
            default_action_cost: f64::from(default_cost),
            ..ProblemConfig::default()
        };
        let problem = table_problem(DIAMOND_JSON, config)
            .with_action_costs(BTreeMap::from([("a".to_string(), f64::from(cost_a))]));
        let mut tree = rooted::<String>("s0");
        grow(&problem, &mut tree, 3).unwrap();

        for node in tree.iter().skip(1) {
            let parent = tree.get(node.parent().unwrap()).unwrap();
            let expected = match node.action().map(String::as_str) {
                Some("a") => f64::from(cost_a),
                _ => f64::from(default_cost),
            };
            prop_assert_eq!(node.path_cost(), parent.path_cost() + expected);
        }
    }
}

#[test]
fn table_expansion_is_idempotent_across_the_tree() {
    let problem = table_problem(DIAMOND_JSON, ProblemConfig::default());
    let mut tree = rooted::<String>("s0");
    grow(&problem, &mut tree, 3).unwrap();
    for node in tree.iter() {
        assert_eq!(problem.successors(node).unwrap(), problem.successors(node).unwrap());
    }
}
