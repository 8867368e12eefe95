//! Node valuation and the domain's value order.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

/// Which accumulated scalar [`crate::Problem::evaluate`] reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Valuation {
    /// Sum of action costs from the root.
    #[default]
    PathCost,
    /// Sum of transition rewards from the root.
    PathValue,
}

/// Total order used by [`crate::Problem::is_better_or_equal`].
///
/// Callers must not assume a direction: a reward-maximising problem and a
/// cost-minimising problem compare the same pair of values oppositely.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueOrder {
    /// Larger values are better (numeric `>=`).
    #[default]
    HigherIsBetter,
    /// Smaller values are better (numeric `<=`).
    LowerIsBetter,
}

impl ValueOrder {
    /// `true` iff `a` is at least as good as `b`.
    ///
    /// Uses `f64::total_cmp`, so `NaN` has a fixed place in the order instead
    /// of comparing false against everything.
    #[must_use]
    pub fn is_better_or_equal(self, a: f64, b: f64) -> bool {
        let ord = a.total_cmp(&b);
        match self {
            Self::HigherIsBetter => ord != Ordering::Less,
            Self::LowerIsBetter => ord != Ordering::Greater,
        }
    }

    /// Sort comparator placing better values first.
    #[must_use]
    pub fn compare(self, a: f64, b: f64) -> Ordering {
        match self {
            Self::HigherIsBetter => b.total_cmp(&a),
            Self::LowerIsBetter => a.total_cmp(&b),
        }
    }
}
