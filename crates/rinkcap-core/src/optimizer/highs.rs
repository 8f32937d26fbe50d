// `good_lp` + HiGHS backend for `IntegerSolver`.
//
// HiGHS runs branch-and-cut on the calling thread and enforces the time
// limit itself, so a solve always returns once the limit has elapsed.

use std::panic::{self, AssertUnwindSafe};

use good_lp::{
    constraint, highs, variable, Expression, ProblemVariables, ResolutionError, Solution,
    SolutionStatus, SolverModel, Variable,
};
use tracing::{debug, warn};

use super::model::{
    Assignment, Comparison, IntegerSolver, LinearExpr, LinearModel, Sense, SolveLimits,
    SolverOutcome,
};

/// Slack allowed when deciding whether a time-limited incumbent is usable.
const INCUMBENT_TOLERANCE: f64 = 1e-6;

/// Branch-and-cut MILP backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct HighsSolver;

impl IntegerSolver for HighsSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve(&self, model: &LinearModel, limits: &SolveLimits) -> SolverOutcome {
        panic::catch_unwind(AssertUnwindSafe(|| solve_blocking(model, limits))).unwrap_or_else(
            |payload| {
                let message = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".into());
                SolverOutcome::Failed(format!("highs panicked: {message}"))
            },
        )
    }
}

fn to_expression(expr: &LinearExpr, vars: &[Variable]) -> Expression {
    expr.terms()
        .iter()
        .map(|&(var, coef)| coef * vars[var.index()])
        .sum()
}

fn solve_blocking(model: &LinearModel, limits: &SolveLimits) -> SolverOutcome {
    let mut problem_vars = ProblemVariables::new();
    let vars: Vec<Variable> = model
        .variable_names()
        .map(|name| problem_vars.add(variable().binary().name(name)))
        .collect();

    let objective = to_expression(model.objective(), &vars);
    let unsolved = match model.sense() {
        Sense::Maximize => problem_vars.maximise(objective),
        Sense::Minimize => problem_vars.minimise(objective),
    };

    let mut problem = unsolved.using(highs);
    if let Some(limit) = limits.time_limit {
        problem = problem.set_time_limit(limit.as_secs_f64());
    }
    for c in model.constraints() {
        let lhs = to_expression(&c.expr, &vars);
        let rhs = c.rhs;
        let built = match c.comparison {
            Comparison::LessOrEqual => constraint!(lhs <= rhs),
            Comparison::Equal => constraint!(lhs == rhs),
            Comparison::GreaterOrEqual => constraint!(lhs >= rhs),
        };
        problem = problem.with(built);
    }

    debug!(
        "highs: solving {} variables, {} constraints (limit {:?})",
        vars.len(),
        model.constraints().len(),
        limits.time_limit
    );

    match problem.solve() {
        Ok(solution) => {
            let status = solution.status();
            let assignment = Assignment::new(vars.iter().map(|&v| solution.value(v)).collect());
            match status {
                // No gap is configured, so GapLimit means optimal within HiGHS's own
                // default tolerance, which HiGHS itself reports as optimal.
                SolutionStatus::Optimal | SolutionStatus::GapLimit => {
                    SolverOutcome::Optimal(assignment)
                }
                SolutionStatus::TimeLimit => incumbent_or_time_limit(model, assignment),
            }
        }
        Err(ResolutionError::Infeasible) => SolverOutcome::Infeasible,
        Err(ResolutionError::Unbounded) => SolverOutcome::Unbounded,
        // HiGHS stopped at a limit before it had any primal solution.
        Err(ResolutionError::Other("NoSolutionFound")) => {
            warn!("highs stopped before finding a feasible roster");
            SolverOutcome::TimeLimit
        }
        Err(other) => SolverOutcome::Failed(other.to_string()),
    }
}

/// HiGHS stopped early with a primal point. It only counts as a roster if it
/// satisfies the model.
fn incumbent_or_time_limit(model: &LinearModel, assignment: Assignment) -> SolverOutcome {
    if model.violations(&assignment, INCUMBENT_TOLERANCE).is_empty() {
        SolverOutcome::Feasible(assignment)
    } else {
        warn!("highs stopped before finding a feasible roster");
        SolverOutcome::TimeLimit
    }
}
