//! Table-driven expansion lock tests.
//!
//! - Deterministic single outcome: one successor with accumulated cost and reward.
//! - Constraint exclusion: a forbidden successor leaves an empty (not absent) list.
//! - Stochastic action: sibling nodes, one per outcome, in table order.
//! - Goal detection and default-open constraints over a branching table.

use formwork_kernel::carrier::state::State;
use formwork_kernel::carrier::state_key::StateKey;
use formwork_problem::config::ProblemConfig;
use formwork_problem::constraint::{ConstraintSet, ForbiddenStates, StatePredicate};
use formwork_problem::contract::Problem;
use formwork_problem::error::ProblemError;
use formwork_problem::table::{ProbabilityTable, TableProblem};
use formwork_problem::valuation::Valuation;
use lock_tests::fixtures::{grow, rooted, table_problem, DIAMOND_JSON, STOCHASTIC_JSON, TWO_STATE_JSON};

#[test]
fn two_state_table_yields_one_successor() {
    let problem = table_problem(TWO_STATE_JSON, ProblemConfig::default());
    let tree = rooted::<String>("s0");
    let succ = problem.successors(tree.node(tree.root()).unwrap()).unwrap().unwrap();

    assert_eq!(succ.len(), 1);
    assert_eq!(succ[0].state().key(), &StateKey::from("s1"));
    assert!(!succ[0].state().is_terminal());
    assert_eq!(succ[0].path_cost(), 1.0);
    assert_eq!(succ[0].info().reward, Some(-1.0));
    assert_eq!(succ[0].action().map(String::as_str), Some("right"));
}

#[test]
fn forbidden_successor_leaves_an_empty_list() {
    let problem = table_problem(TWO_STATE_JSON, ProblemConfig::default())
        .with_constraints(ConstraintSet::new().with(ForbiddenStates::new(["s1"])));
    let tree = rooted::<String>("s0");
    let succ = problem.successors(tree.node(tree.root()).unwrap()).unwrap();
    assert_eq!(succ, Some(Vec::new()));
}

#[test]
fn stochastic_table_yields_two_siblings() {
    let problem = table_problem(STOCHASTIC_JSON, ProblemConfig::default());
    let tree = rooted::<String>("s0");
    let succ = problem.successors(tree.node(tree.root()).unwrap()).unwrap().unwrap();

    assert_eq!(succ.len(), 2);
    let keys: Vec<String> = succ.iter().map(|n| n.state().key().to_string()).collect();
    assert_eq!(keys, vec!["s1", "s2"]);
    assert!(!succ[0].state().is_terminal());
    assert!(succ[1].state().is_terminal());
    assert!(succ.iter().all(|n| n.parent() == Some(tree.root())));
    assert!(succ.iter().all(|n| n.info().probability == Some(0.5)));
}

#[test]
fn goal_detection_matches_terminal_flag_everywhere() {
    let problem = table_problem(DIAMOND_JSON, ProblemConfig::default());
    let mut tree = rooted::<String>("s0");
    grow(&problem, &mut tree, 3).unwrap();
    assert!(tree.len() > 10);
    for node in tree.iter() {
        assert_eq!(problem.is_goal_state(node.state()), node.state().is_terminal());
    }
}

#[test]
fn absent_constraints_admit_every_raw_successor() {
    let problem = table_problem(DIAMOND_JSON, ProblemConfig::default());
    let mut tree = rooted::<String>("s0");
    grow(&problem, &mut tree, 2).unwrap();
    for node in tree.iter() {
        assert_eq!(problem.successors(node).unwrap(), problem.raw_successors(node).unwrap());
    }
}

#[test]
fn constraints_remove_exactly_the_violators() {
    let constrained = table_problem(DIAMOND_JSON, ProblemConfig::default()).with_constraints(
        ConstraintSet::new()
            .with(ForbiddenStates::new(["s3"]))
            .with(StatePredicate::new("no_goal", |s: &State| s.key() != &StateKey::from("g"))),
    );
    let mut tree = rooted::<String>("s0");
    grow(&constrained, &mut tree, 3).unwrap();

    for node in tree.iter() {
        let Some(raw) = constrained.raw_successors(node).unwrap() else {
            continue;
        };
        let violations = raw
            .iter()
            .filter(|n| {
                let key = n.state().key();
                key == &StateKey::from("s3") || key == &StateKey::from("g")
            })
            .count();
        let kept = constrained.successors(node).unwrap().unwrap();
        assert_eq!(kept.len(), raw.len() - violations);
        assert!(kept.iter().all(|n| raw.contains(n)));
    }
}

#[test]
fn evaluate_agrees_with_stored_cost_and_rewards() {
    let problem = table_problem(DIAMOND_JSON, ProblemConfig::default());
    let mut tree = rooted::<String>("s0");
    grow(&problem, &mut tree, 3).unwrap();

    for node in tree.iter() {
        let cost = problem.evaluate(&tree, node.id(), Valuation::PathCost).unwrap();
        assert!((cost - node.path_cost()).abs() < 1e-9);
        assert!((cost - f64::from(node.depth())).abs() < 1e-9);

        let value = problem.evaluate(&tree, node.id(), Valuation::PathValue).unwrap();
        let expected: f64 = tree
            .path(node.id())
            .unwrap()
            .into_iter()
            .filter_map(|id| tree.get(id).and_then(|n| n.info().reward))
            .sum();
        assert!((value - expected).abs() < 1e-9);
    }
}

#[test]
fn unknown_state_aborts_expansion() {
    let problem = table_problem(TWO_STATE_JSON, ProblemConfig::default());
    let tree = rooted::<String>("s9");
    assert_eq!(
        problem.successors(tree.node(tree.root()).unwrap()).unwrap_err(),
        ProblemError::UnknownState { key: StateKey::from("s9") }
    );
}

#[test]
fn terminal_sink_still_expands() {
    // `g` has table entries, so it is not a dead end even though it is a goal.
    let problem = table_problem(DIAMOND_JSON, ProblemConfig::default());
    let tree = rooted::<String>("g");
    let succ = problem.successors(tree.node(tree.root()).unwrap()).unwrap().unwrap();
    assert_eq!(succ.len(), 2);
    assert!(succ.iter().all(|n| n.state().is_terminal()));
}

#[test]
fn numeric_string_next_states_expand_past_the_root() {
    let json = r#"{
        "0": {"a": [[1.0, "1", 0, false]]},
        "1": {"a": [[1.0, "2", 1, true]]},
        "2": {}
    }"#;
    let table: ProbabilityTable<String> = ProbabilityTable::from_json_str(json).unwrap();
    let problem = TableProblem::new(State::initial(0i64), table, ProblemConfig::default());
    let mut tree = rooted::<String>(0i64);
    grow(&problem, &mut tree, 2).unwrap();

    let keys: Vec<StateKey> = tree.iter().map(|n| n.state().key().clone()).collect();
    assert_eq!(keys, vec![StateKey::Int(0), StateKey::Int(1), StateKey::Int(2)]);
    assert!(tree.iter().last().unwrap().state().is_terminal());
}

#[test]
fn tuple_next_states_expand_past_the_root() {
    let json = r#"{
        "[0,0]": {"east": [[1.0, [0,1], 0, false]]},
        "[0,1]": {"east": [[0.5, "[0,2]", 0, false], [0.5, [0,0], 0, false]]},
        "[0,2]": {}
    }"#;
    let table: ProbabilityTable<String> = ProbabilityTable::from_json_str(json).unwrap();
    let origin = StateKey::Tuple(vec![StateKey::Int(0), StateKey::Int(0)]);
    let problem = TableProblem::new(State::initial(origin.clone()), table, ProblemConfig::default());
    let mut tree = rooted::<String>(origin);
    grow(&problem, &mut tree, 3).unwrap();

    // root, [0,1], then [0,2] and [0,0], then [0,1] again under [0,0]
    assert_eq!(tree.len(), 5);
    let last = tree.iter().last().unwrap();
    assert_eq!(last.state().key(), &StateKey::Tuple(vec![StateKey::Int(0), StateKey::Int(1)]));
    assert_eq!(tree.path(last.id()).unwrap().len(), 4);
}
