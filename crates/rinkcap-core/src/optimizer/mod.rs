// Roster optimization: a 0/1 integer program over the managed team's
// candidates, solved through a pluggable MILP backend.

pub mod highs;
pub mod model;
pub mod roster;

pub use highs::HighsSolver;
pub use model::{IntegerSolver, LinearModel, SolveLimits, SolverOutcome};
pub use roster::{OptimizeError, ProposedRoster, RosterModel, RosterOutcome, RosterPick};

use crate::config::Config;
use crate::pool::PlayerPool;

/// Build and solve the managed team's roster in one step with the default
/// backend and the configured time limit.
pub fn optimize_roster(
    pool: &PlayerPool,
    config: &Config,
) -> Result<RosterOutcome, OptimizeError> {
    let limits = SolveLimits {
        time_limit: config.optimizer.time_limit(),
    };
    RosterModel::build(pool, &config.league).solve(pool, &HighsSolver, &limits)
}
