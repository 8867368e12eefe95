//! Shared fixtures for the lock test suite.

pub mod fixtures;
