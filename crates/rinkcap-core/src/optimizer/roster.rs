// Optimal roster for the managed team.
//
// One binary variable per candidate: every draftable player with a positive
// bid, plus the managed team's START players, which are locked in. The model
// maximizes total points subject to the salary cap and exact positional
// quotas. The result is a proposal only; nothing is written to the pool.

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::config::LeagueConfig;
use crate::pool::player::{OwnershipStatus, Player, Position};
use crate::pool::PlayerPool;

use super::model::{
    Assignment, Comparison, IntegerSolver, LinearExpr, LinearModel, Sense, SolveLimits,
    SolverOutcome, VarId,
};

/// Slack allowed when re-checking a solver assignment against the model.
const FEASIBILITY_TOLERANCE: f64 = 1e-6;

#[derive(Debug, Error, PartialEq)]
pub enum OptimizeError {
    #[error("roster model was built at pool revision {built} but the pool is now at {current}")]
    StaleModel { built: u64, current: u64 },
}

// ---------------------------------------------------------------------------
// Candidates
// ---------------------------------------------------------------------------

/// Snapshot of one player offered to the solver.
#[derive(Debug, Clone)]
pub struct Candidate {
    pub player_id: usize,
    pub name: String,
    pub position: Position,
    pub league_team: String,
    pub status: OwnershipStatus,
    pub group: String,
    pub points: u32,
    pub salary: f64,
    pub bid: f64,
    /// Managed-team START player that must appear in every roster.
    pub locked: bool,
    var: VarId,
}

impl Candidate {
    fn from_player(player: &Player, locked: bool, var: VarId) -> Self {
        Candidate {
            player_id: player.id,
            name: player.name.clone(),
            position: player.position,
            league_team: player.league_team.clone(),
            status: player.status,
            group: player.group.clone(),
            points: player.points,
            salary: player.salary,
            bid: player.bid,
            locked,
            var,
        }
    }

    pub fn total_cost(&self) -> f64 {
        self.salary + self.bid
    }
}

// ---------------------------------------------------------------------------
// Outcomes
// ---------------------------------------------------------------------------

/// One player of a proposed roster.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RosterPick {
    pub player_id: usize,
    pub name: String,
    pub position: Position,
    pub league_team: String,
    pub status: OwnershipStatus,
    pub group: String,
    pub points: u32,
    pub salary: f64,
    pub bid: f64,
    /// `salary + bid`.
    pub total_cost: f64,
    pub locked: bool,
}

/// Selected players with their aggregate points and cost.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProposedRoster {
    pub team_code: String,
    /// Sorted F, D, G, then points descending.
    pub players: Vec<RosterPick>,
    pub total_points: u64,
    pub total_cost: f64,
}

impl ProposedRoster {
    pub fn count(&self, position: Position) -> usize {
        self.players.iter().filter(|p| p.position == position).count()
    }
}

/// Terminal state of one optimization.
#[derive(Debug, Clone, PartialEq)]
pub enum RosterOutcome {
    Optimal(ProposedRoster),
    /// Feasible roster, but the backend stopped before proving optimality.
    Suboptimal(ProposedRoster),
    /// No roster satisfies the constraints.
    Infeasible { reason: String },
    /// The time limit elapsed before the backend found a feasible roster.
    TimeLimit,
    Failed(String),
}

impl RosterOutcome {
    /// The proposed roster, if the solve produced one.
    pub fn roster(&self) -> Option<&ProposedRoster> {
        match self {
            RosterOutcome::Optimal(r) | RosterOutcome::Suboptimal(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_optimal(&self) -> bool {
        matches!(self, RosterOutcome::Optimal(_))
    }

    pub fn label(&self) -> &'static str {
        match self {
            RosterOutcome::Optimal(_) => "optimal",
            RosterOutcome::Suboptimal(_) => "suboptimal",
            RosterOutcome::Infeasible { .. } => "infeasible",
            RosterOutcome::TimeLimit => "time limit reached",
            RosterOutcome::Failed(_) => "solver error",
        }
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// A built, unsolved roster model. Consumed by `solve`.
#[derive(Debug)]
pub struct RosterModel {
    team_code: String,
    salary_cap: f64,
    candidates: Vec<Candidate>,
    model: LinearModel,
    revision: u64,
    /// Set when the constraints are unsatisfiable on their face.
    infeasible: Option<String>,
}

impl RosterModel {
    /// Build the model for `league.managed_team` from the current pool.
    pub fn build(pool: &PlayerPool, league: &LeagueConfig) -> Self {
        let team_code = league.managed_team.clone();
        let mut model = LinearModel::new();
        let mut candidates = Vec::new();

        for player in pool.players() {
            let locked =
                player.league_team == team_code && player.status == OwnershipStatus::Start;
            let offered = player.draftable && player.is_unowned() && player.bid > 0.0;
            if !(locked || offered) {
                continue;
            }
            let var = model.add_binary(format!("p{}_{}", player.id, player.position.code()));
            candidates.push(Candidate::from_player(player, locked, var));
        }

        let budget: LinearExpr = candidates.iter().map(|c| (c.var, c.total_cost())).collect();
        model.add_constraint("salary_cap", budget, Comparison::LessOrEqual, league.salary_cap);

        for position in Position::ALL {
            let slots: LinearExpr = candidates
                .iter()
                .filter(|c| c.position == position)
                .map(|c| (c.var, 1.0))
                .collect();
            model.add_constraint(
                format!("quota_{}", position.code()),
                slots,
                Comparison::Equal,
                league.quota(position) as f64,
            );
        }

        for c in candidates.iter().filter(|c| c.locked) {
            model.add_constraint(
                format!("locked_{}", c.player_id),
                [(c.var, 1.0)].into_iter().collect(),
                Comparison::Equal,
                1.0,
            );
        }

        let objective: LinearExpr = candidates.iter().map(|c| (c.var, c.points as f64)).collect();
        model.set_objective(Sense::Maximize, objective);

        let infeasible = precheck(&candidates, league);
        if let Some(reason) = &infeasible {
            warn!("roster model for {} is infeasible: {}", team_code, reason);
        }

        info!(
            "roster model for {}: {} candidates ({} locked), cap {:.2}",
            team_code,
            candidates.len(),
            candidates.iter().filter(|c| c.locked).count(),
            league.salary_cap
        );

        RosterModel {
            team_code,
            salary_cap: league.salary_cap,
            candidates,
            model,
            revision: pool.revision(),
            infeasible,
        }
    }

    pub fn team_code(&self) -> &str {
        &self.team_code
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    pub fn linear_model(&self) -> &LinearModel {
        &self.model
    }

    /// Pool revision the model was built against.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Solve the model against `pool`, which must be unchanged since `build`.
    pub fn solve(
        self,
        pool: &PlayerPool,
        solver: &dyn IntegerSolver,
        limits: &SolveLimits,
    ) -> Result<RosterOutcome, OptimizeError> {
        if pool.revision() != self.revision {
            return Err(OptimizeError::StaleModel {
                built: self.revision,
                current: pool.revision(),
            });
        }

        if let Some(reason) = &self.infeasible {
            return Ok(RosterOutcome::Infeasible {
                reason: reason.clone(),
            });
        }

        debug!(
            "solving roster model with {} (limit {:?})",
            solver.name(),
            limits.time_limit
        );

        let outcome = match solver.solve(&self.model, limits) {
            SolverOutcome::Optimal(assignment) => match self.extract(&assignment) {
                Ok(roster) => RosterOutcome::Optimal(roster),
                Err(msg) => RosterOutcome::Failed(msg),
            },
            SolverOutcome::Feasible(assignment) => match self.extract(&assignment) {
                Ok(roster) => RosterOutcome::Suboptimal(roster),
                Err(msg) => RosterOutcome::Failed(msg),
            },
            SolverOutcome::Infeasible => RosterOutcome::Infeasible {
                reason: "no roster satisfies the cap, quotas, and locked players".into(),
            },
            SolverOutcome::Unbounded => {
                RosterOutcome::Failed("solver reported an unbounded model".into())
            }
            SolverOutcome::TimeLimit => RosterOutcome::TimeLimit,
            SolverOutcome::Failed(msg) => RosterOutcome::Failed(msg),
        };

        match &outcome {
            RosterOutcome::Optimal(r) | RosterOutcome::Suboptimal(r) => info!(
                "optimizer ({}): {} players, {} points, cost {:.2} of {:.2}",
                outcome.label(),
                r.players.len(),
                r.total_points,
                r.total_cost,
                self.salary_cap
            ),
            RosterOutcome::Failed(msg) => warn!("optimizer failed: {}", msg),
            other => warn!("optimizer: {}", other.label()),
        }

        Ok(outcome)
    }

    /// Turn a solver assignment into a roster, rejecting any assignment
    /// that breaks the model's constraints.
    fn extract(&self, assignment: &Assignment) -> Result<ProposedRoster, String> {
        let violated = self.model.violations(assignment, FEASIBILITY_TOLERANCE);
        if !violated.is_empty() {
            return Err(format!(
                "solver assignment violates constraints: {}",
                violated.join(", ")
            ));
        }

        let mut players: Vec<RosterPick> = self
            .candidates
            .iter()
            .filter(|c| assignment.is_set(c.var))
            .map(|c| RosterPick {
                player_id: c.player_id,
                name: c.name.clone(),
                position: c.position,
                league_team: c.league_team.clone(),
                status: c.status,
                group: c.group.clone(),
                points: c.points,
                salary: c.salary,
                bid: c.bid,
                total_cost: c.total_cost(),
                locked: c.locked,
            })
            .collect();
        players.sort_by(|a, b| {
            a.position
                .sort_order()
                .cmp(&b.position.sort_order())
                .then(b.points.cmp(&a.points))
        });

        let total_points = players.iter().map(|p| p.points as u64).sum();
        let total_cost = players.iter().map(|p| p.total_cost).sum();
        Ok(ProposedRoster {
            team_code: self.team_code.clone(),
            players,
            total_points,
            total_cost,
        })
    }
}

/// Constraint conflicts visible without a solve.
fn precheck(candidates: &[Candidate], league: &LeagueConfig) -> Option<String> {
    let locked_cost: f64 = candidates
        .iter()
        .filter(|c| c.locked)
        .map(Candidate::total_cost)
        .sum();
    if locked_cost > league.salary_cap + FEASIBILITY_TOLERANCE {
        return Some(format!(
            "locked players cost {:.2}, above the {:.2} cap",
            locked_cost, league.salary_cap
        ));
    }

    for position in Position::ALL {
        let quota = league.quota(position);
        let offered = candidates.iter().filter(|c| c.position == position).count();
        let locked = candidates
            .iter()
            .filter(|c| c.position == position && c.locked)
            .count();
        if locked > quota {
            return Some(format!(
                "{locked} locked {position} players exceed the quota of {quota}"
            ));
        }
        if offered < quota {
            return Some(format!(
                "only {offered} {position} candidates for a quota of {quota}"
            ));
        }
    }
    None
}
