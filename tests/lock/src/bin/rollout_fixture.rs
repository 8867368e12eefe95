//! Binary that runs the reference worlds through the harness and prints
//! deterministic output lines for cross-process verification.
//!
//! Usage: `rollout_fixture`
//! Output: four lines, each `key=value`:
//!   `frozen_lake_transcript`=sha256:...
//!   `frozen_lake_table`=sha256:...
//!   `drift_transcript`=sha256:...
//!   `diamond_expansion`=sha256:...

use formwork_harness::contract::WorldHarness;
use formwork_harness::runner::run_world;
use formwork_harness::worlds::drift::DriftWorld;
use formwork_harness::worlds::frozen_lake::FrozenLakeWorld;
use formwork_problem::config::ProblemConfig;
use formwork_problem::contract::Problem;
use formwork_problem::digest::{expansion_digest, table_digest};
use lock_tests::fixtures::{rooted, table_problem, DIAMOND_JSON};

fn main() {
    let lake = FrozenLakeWorld::default();
    let lake_transcript = run_world(&lake, ProblemConfig::default()).expect("frozen lake run failed");
    let lake_problem = lake
        .build_problem(ProblemConfig::default())
        .expect("frozen lake build failed");

    let drift_transcript = run_world(&DriftWorld::default(), ProblemConfig::default()).expect("drift run failed");

    let diamond = table_problem(DIAMOND_JSON, ProblemConfig::default());
    let tree = rooted::<String>("s0");
    let children = diamond
        .successors(tree.node(tree.root()).expect("root exists"))
        .expect("diamond expansion failed")
        .expect("s0 has actions");

    println!(
        "frozen_lake_transcript={}",
        lake_transcript.digest().expect("transcript digest")
    );
    println!(
        "frozen_lake_table={}",
        table_digest(lake_problem.table()).expect("table digest")
    );
    println!(
        "drift_transcript={}",
        drift_transcript.digest().expect("transcript digest")
    );
    println!(
        "diamond_expansion={}",
        expansion_digest(&children).expect("expansion digest")
    );
}
