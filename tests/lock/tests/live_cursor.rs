//! Live state and configuration locks.
//!
//! - CURSOR-SEPARATION: expansion never moves `current_state`; only
//!   `reset_env`/`apply_action` do.
//! - DETACHED: problems without an environment report `NotImplemented`.
//! - CONFIG-FILE: a JSON config file drives sampling and cost behaviour.
//! - TRANSCRIPT-FILE: rollouts survive a write/read round trip.

use std::io::Write;

use formwork_kernel::carrier::state::State;
use formwork_kernel::carrier::state_key::StateKey;
use formwork_harness::contract::WorldHarness;
use formwork_harness::runner::{run_world, RunError};
use formwork_harness::transcript::RolloutTranscript;
use formwork_harness::worlds::drift::DriftWorld;
use formwork_harness::worlds::frozen_lake::{FrozenLakeWorld, DOWN, RIGHT};
use formwork_problem::config::{ConfigError, ProblemConfig};
use formwork_problem::contract::Problem;
use formwork_problem::error::ProblemError;
use formwork_problem::tree::SearchTree;
use lock_tests::fixtures::{table_problem, TWO_STATE_JSON};

#[test]
fn expansion_does_not_move_the_cursor() {
    let mut problem = FrozenLakeWorld::default()
        .build_problem(ProblemConfig::default())
        .unwrap();
    let start = problem.reset_env().unwrap();
    assert_eq!(start.key(), &StateKey::Int(0));

    let tree = SearchTree::new(State::initial(6i64));
    let succ = problem.successors(tree.node(tree.root()).unwrap()).unwrap().unwrap();
    assert!(!succ.is_empty());
    assert_eq!(problem.get_current_state(), &start);

    let outcome = problem.apply_action(&DOWN).unwrap();
    assert_eq!(problem.get_current_state().key(), &outcome.observation);
    assert_eq!(problem.get_current_state().is_terminal(), outcome.terminated);

    let again = problem.reset_env().unwrap();
    assert_eq!(again, start);
    assert_eq!(problem.get_current_state(), &start);
}

#[test]
fn detached_problem_reports_not_implemented() {
    let mut problem = table_problem(TWO_STATE_JSON, ProblemConfig::default());
    assert!(matches!(
        problem.apply_action(&"right".to_string()),
        Err(ProblemError::NotImplemented { operation: "apply_action" })
    ));
    assert!(matches!(
        problem.reset_env(),
        Err(ProblemError::NotImplemented { operation: "reset_env" })
    ));
    assert_eq!(problem.get_current_state(), &State::initial("s0"));
}

#[test]
fn config_file_sets_sample_size() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"default_sample_size": 3, "sampler_seed": 9}}"#).unwrap();
    let config = ProblemConfig::from_path(file.path()).unwrap();

    let problem = DriftWorld::default().build_problem(config).unwrap();
    let actions = problem
        .get_applicable_actions_at_state(problem.get_current_state())
        .unwrap();
    assert_eq!(actions.len(), 3);
}

#[test]
fn invalid_config_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, r#"{{"default_sample_size": 0}}"#).unwrap();
    assert!(matches!(
        ProblemConfig::from_path(file.path()),
        Err(ConfigError::Invalid { .. })
    ));
}

#[test]
fn world_refuses_invalid_config() {
    let config = ProblemConfig {
        default_action_cost: f64::NAN,
        ..ProblemConfig::default()
    };
    assert!(matches!(
        run_world(&DriftWorld::default(), config),
        Err(RunError::World(_))
    ));
}

#[test]
fn transcript_file_round_trip() {
    let world = FrozenLakeWorld {
        seed: 3,
        route: vec![RIGHT, RIGHT, DOWN, DOWN],
    };
    let transcript = run_world(&world, ProblemConfig::default()).unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("frozen_lake.json");
    transcript.write_to(&path).unwrap();
    let back: RolloutTranscript<u8> = RolloutTranscript::read_from(&path).unwrap();

    assert_eq!(back, transcript);
    assert_eq!(back.digest().unwrap(), transcript.digest().unwrap());
}
