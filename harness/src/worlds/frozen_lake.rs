//! `FrozenLake`: a gridworld on thin ice.
//!
//! The agent starts on `S` and must reach `G` without stepping into a hole
//! (`H`). Frozen tiles (`F`) are safe. On slippery ice the intended move
//! happens with probability 1/3; each of the two perpendicular moves takes
//! the other 2/3. Moves off the grid leave the agent where it is.
//!
//! States are tile indices `row * ncol + col`. Actions are `0` left,
//! `1` down, `2` right, `3` up. Reaching `G` pays 1.0, everything else
//! pays 0.0. `H` and `G` are terminal and self-loop under every action.

use formwork_kernel::carrier::state::State;
use formwork_kernel::carrier::state_key::StateKey;
use formwork_problem::config::ProblemConfig;
use formwork_problem::environment::{Environment, EnvironmentError, StepOutcome, TabularEnvironment};
use formwork_problem::table::{ProbabilityTable, TableProblem, Transition};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;
use tracing::trace;

use crate::contract::{WorldHarness, WorldHarnessError};

pub const LEFT: u8 = 0;
pub const DOWN: u8 = 1;
pub const RIGHT: u8 = 2;
pub const UP: u8 = 3;

/// Actions in enumeration order.
pub const ACTIONS: [u8; 4] = [LEFT, DOWN, RIGHT, UP];

/// The standard 4x4 map.
pub const MAP_4X4: [&str; 4] = ["SFFF", "FHFH", "FFFH", "HFFG"];

/// Episode length after which a step reports `truncated`.
pub const DEFAULT_MAX_STEPS: u64 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Tile {
    Start,
    Frozen,
    Hole,
    Goal,
}

impl Tile {
    fn parse(c: char) -> Option<Self> {
        match c {
            'S' => Some(Self::Start),
            'F' => Some(Self::Frozen),
            'H' => Some(Self::Hole),
            'G' => Some(Self::Goal),
            _ => None,
        }
    }

    fn is_terminal(self) -> bool {
        matches!(self, Self::Hole | Self::Goal)
    }
}

/// Malformed lake description.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LakeMapError {
    #[error("lake map is empty")]
    Empty,

    #[error("row {row} has {found} tiles, expected {expected}")]
    Ragged { row: usize, expected: usize, found: usize },

    #[error("unknown tile {tile:?} at row {row}, column {col}")]
    UnknownTile { tile: char, row: usize, col: usize },

    #[error("lake map needs exactly one start tile, found {found}")]
    StartCount { found: usize },
}

/// A parsed lake plus the environment state for stepping through it.
#[derive(Debug, Clone)]
pub struct FrozenLake {
    tiles: Vec<Tile>,
    ncol: usize,
    start: usize,
    slippery: bool,
    max_steps: u64,
    seed: u64,
    rng: StdRng,
    position: usize,
    steps: u64,
}

impl FrozenLake {
    /// Parse a lake from rows of `S`/`F`/`H`/`G`.
    ///
    /// # Errors
    ///
    /// [`LakeMapError`] if the rows are empty or ragged, contain other
    /// characters, or do not have exactly one `S`.
    pub fn new(rows: &[&str], slippery: bool, seed: u64) -> Result<Self, LakeMapError> {
        let ncol = rows.first().map(|r| r.chars().count()).ok_or(LakeMapError::Empty)?;
        if ncol == 0 {
            return Err(LakeMapError::Empty);
        }
        let mut tiles = Vec::with_capacity(rows.len() * ncol);
        for (row, line) in rows.iter().enumerate() {
            let found = line.chars().count();
            if found != ncol {
                return Err(LakeMapError::Ragged { row, expected: ncol, found });
            }
            for (col, c) in line.chars().enumerate() {
                tiles.push(Tile::parse(c).ok_or(LakeMapError::UnknownTile { tile: c, row, col })?);
            }
        }
        let starts: Vec<usize> = tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == Tile::Start)
            .map(|(i, _)| i)
            .collect();
        let &[start] = starts.as_slice() else {
            return Err(LakeMapError::StartCount { found: starts.len() });
        };

        Ok(Self {
            tiles,
            ncol,
            start,
            slippery,
            max_steps: DEFAULT_MAX_STEPS,
            seed,
            rng: StdRng::seed_from_u64(seed),
            position: start,
            steps: 0,
        })
    }

    #[must_use]
    pub fn with_max_steps(mut self, max_steps: u64) -> Self {
        self.max_steps = max_steps;
        self
    }

    #[must_use]
    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    #[must_use]
    pub fn start_state(&self) -> State {
        State::initial(index_key(self.start))
    }

    /// Whether tile `index` ends the episode.
    #[must_use]
    pub fn is_terminal_tile(&self, index: usize) -> bool {
        self.tiles.get(index).is_some_and(|t| t.is_terminal())
    }

    fn nrow(&self) -> usize {
        self.tiles.len() / self.ncol
    }

    /// Tile reached by moving from `index` in direction `action`, clamped to
    /// the grid.
    fn moved(&self, index: usize, action: u8) -> usize {
        let (mut row, mut col) = (index / self.ncol, index % self.ncol);
        match action {
            LEFT => col = col.saturating_sub(1),
            DOWN => row = (row + 1).min(self.nrow() - 1),
            RIGHT => col = (col + 1).min(self.ncol - 1),
            UP => row = row.saturating_sub(1),
            _ => {}
        }
        row * self.ncol + col
    }

    /// `(probability, tile)` pairs for `action` at non-terminal tile `index`.
    fn moves(&self, index: usize, action: u8) -> Vec<(f64, usize)> {
        let directions: Vec<u8> = if self.slippery {
            vec![(action + 3) % 4, action, (action + 1) % 4]
        } else {
            vec![action]
        };
        #[allow(clippy::cast_precision_loss)]
        let probability = 1.0 / directions.len() as f64;
        directions
            .into_iter()
            .map(|direction| (probability, self.moved(index, direction)))
            .collect()
    }

    fn transition(&self, probability: f64, next: usize) -> Transition {
        let tile = self.tiles[next];
        let reward = if tile == Tile::Goal { 1.0 } else { 0.0 };
        Transition::new(probability, index_key(next), reward, tile.is_terminal())
    }

    /// Ordered outcomes of `action` at tile `index`.
    fn outcomes(&self, index: usize, action: u8) -> Vec<Transition> {
        if self.is_terminal_tile(index) {
            return vec![Transition::new(1.0, index_key(index), 0.0, true)];
        }
        self.moves(index, action)
            .into_iter()
            .map(|(probability, next)| self.transition(probability, next))
            .collect()
    }
}

fn index_key(index: usize) -> StateKey {
    StateKey::Int(i64::try_from(index).unwrap_or(i64::MAX))
}

impl Environment for FrozenLake {
    type Action = u8;

    fn step(&mut self, action: &u8) -> Result<StepOutcome, EnvironmentError> {
        if !ACTIONS.contains(action) {
            return Err(EnvironmentError::new(format!("invalid frozen lake action {action}")));
        }
        let stuck = self.is_terminal_tile(self.position);
        let next = if stuck {
            self.position
        } else {
            let moves = self.moves(self.position, *action);
            let draw: f64 = self.rng.gen();
            let mut cumulative = 0.0;
            let mut chosen = moves.last().map_or(self.position, |&(_, tile)| tile);
            for &(probability, tile) in &moves {
                cumulative += probability;
                if cumulative > draw {
                    chosen = tile;
                    break;
                }
            }
            chosen
        };
        let t = if stuck {
            Transition::new(1.0, index_key(next), 0.0, true)
        } else {
            self.transition(1.0, next)
        };
        self.position = next;
        self.steps += 1;
        trace!(action, position = next, steps = self.steps, "frozen lake step");

        Ok(StepOutcome {
            observation: t.next_state,
            reward: t.reward,
            terminated: t.terminal,
            truncated: !t.terminal && self.steps >= self.max_steps,
        })
    }

    fn reset(&mut self) -> Result<StateKey, EnvironmentError> {
        self.rng = StdRng::seed_from_u64(self.seed);
        self.position = self.start;
        self.steps = 0;
        Ok(index_key(self.start))
    }
}

impl TabularEnvironment for FrozenLake {
    fn probability_table(&self) -> ProbabilityTable<u8> {
        let mut table = ProbabilityTable::new();
        for index in 0..self.tiles.len() {
            for action in ACTIONS {
                table.insert(index_key(index), action, self.outcomes(index, action));
            }
        }
        table
    }
}

/// Harness world: the 4x4 lake driven by a fixed route.
#[derive(Debug, Clone)]
pub struct FrozenLakeWorld {
    pub seed: u64,
    pub route: Vec<u8>,
}

impl Default for FrozenLakeWorld {
    fn default() -> Self {
        Self {
            seed: 0,
            route: vec![DOWN, DOWN, RIGHT, DOWN, RIGHT, RIGHT],
        }
    }
}

impl WorldHarness for FrozenLakeWorld {
    type Action = u8;
    type Problem = TableProblem<u8>;

    #[allow(clippy::unnecessary_literal_bound)]
    fn world_id(&self) -> &str {
        "frozen_lake_4x4"
    }

    fn build_problem(&self, config: ProblemConfig) -> Result<TableProblem<u8>, WorldHarnessError> {
        config.validate().map_err(|e| WorldHarnessError::Build {
            detail: e.to_string(),
        })?;
        let lake = FrozenLake::new(&MAP_4X4, true, self.seed).map_err(|e| WorldHarnessError::Build {
            detail: e.to_string(),
        })?;
        let initial = lake.start_state();
        let config = ProblemConfig {
            stochastic: true,
            ..config
        };
        Ok(TableProblem::from_environment(lake, initial, config))
    }

    fn program(&self) -> Vec<u8> {
        self.route.clone()
    }
}
