//! World implementations for the harness runner.

pub mod drift;
pub mod frozen_lake;
