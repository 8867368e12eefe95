//! `State`: one configuration of the environment.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use crate::carrier::state_key::StateKey;
use crate::proof::hash::ContentHash;

/// Immutable state identity: a key plus a terminal flag.
///
/// Equality, ordering, and hashing consider the key only. Two states with
/// equal keys are the same state even if they were built separately, and even
/// if one was observed through a terminal transition and the other was not.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct State {
    key: StateKey,
    is_terminal: bool,
}

impl State {
    #[must_use]
    pub fn new(key: impl Into<StateKey>, is_terminal: bool) -> Self {
        Self {
            key: key.into(),
            is_terminal,
        }
    }

    /// A non-terminal state (the usual form for initial states).
    #[must_use]
    pub fn initial(key: impl Into<StateKey>) -> Self {
        Self::new(key, false)
    }

    #[must_use]
    pub fn key(&self) -> &StateKey {
        &self.key
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.is_terminal
    }

    /// Content hash of the key under `HashDomain::StateKey`.
    #[must_use]
    pub fn fingerprint(&self) -> ContentHash {
        self.key.fingerprint()
    }
}

impl PartialEq for State {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for State {}

impl Hash for State {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.key.hash(state);
    }
}

impl PartialOrd for State {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for State {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key.cmp(&other.key)
    }
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_terminal {
            write!(f, "{}*", self.key)
        } else {
            write!(f, "{}", self.key)
        }
    }
}
