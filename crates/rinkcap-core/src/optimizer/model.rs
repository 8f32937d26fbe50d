// Backend-neutral 0/1 integer program and the solver capability it is
// handed to.
//
// The roster optimizer only ever talks to `LinearModel` and `IntegerSolver`;
// any MILP backend that can add binary variables, add linear constraints,
// set a linear objective, and report variable values can sit behind it.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Variables and expressions
// ---------------------------------------------------------------------------

/// Handle to a binary decision variable inside one `LinearModel`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarId(usize);

impl VarId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Sum of `coefficient × variable` terms.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    terms: Vec<(VarId, f64)>,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        self.terms.push((var, coefficient));
    }

    pub fn terms(&self) -> &[(VarId, f64)] {
        &self.terms
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Value of the expression under `assignment`.
    pub fn evaluate(&self, assignment: &Assignment) -> f64 {
        self.terms
            .iter()
            .map(|&(var, coef)| coef * assignment.value(var))
            .sum()
    }
}

impl FromIterator<(VarId, f64)> for LinearExpr {
    fn from_iter<I: IntoIterator<Item = (VarId, f64)>>(iter: I) -> Self {
        LinearExpr {
            terms: iter.into_iter().collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    LessOrEqual,
    Equal,
    GreaterOrEqual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Sense {
    #[default]
    Maximize,
    Minimize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Constraint {
    pub name: String,
    pub expr: LinearExpr,
    pub comparison: Comparison,
    pub rhs: f64,
}

impl Constraint {
    pub fn is_satisfied_by(&self, assignment: &Assignment, tolerance: f64) -> bool {
        let lhs = self.expr.evaluate(assignment);
        match self.comparison {
            Comparison::LessOrEqual => lhs <= self.rhs + tolerance,
            Comparison::Equal => (lhs - self.rhs).abs() <= tolerance,
            Comparison::GreaterOrEqual => lhs >= self.rhs - tolerance,
        }
    }
}

// ---------------------------------------------------------------------------
// Model
// ---------------------------------------------------------------------------

/// A 0/1 integer program: binary variables, linear constraints, and one
/// linear objective.
#[derive(Debug, Clone, Default)]
pub struct LinearModel {
    variables: Vec<String>,
    constraints: Vec<Constraint>,
    objective: LinearExpr,
    sense: Sense,
}

impl LinearModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_binary(&mut self, name: impl Into<String>) -> VarId {
        self.variables.push(name.into());
        VarId(self.variables.len() - 1)
    }

    pub fn add_constraint(
        &mut self,
        name: impl Into<String>,
        expr: LinearExpr,
        comparison: Comparison,
        rhs: f64,
    ) {
        self.constraints.push(Constraint {
            name: name.into(),
            expr,
            comparison,
            rhs,
        });
    }

    pub fn set_objective(&mut self, sense: Sense, expr: LinearExpr) {
        self.sense = sense;
        self.objective = expr;
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn variable_name(&self, var: VarId) -> Option<&str> {
        self.variables.get(var.0).map(String::as_str)
    }

    /// Variable names in `VarId` order.
    pub fn variable_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.variables.iter().map(String::as_str)
    }

    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn objective(&self) -> &LinearExpr {
        &self.objective
    }

    pub fn sense(&self) -> Sense {
        self.sense
    }

    /// Names of the constraints `assignment` violates.
    pub fn violations(&self, assignment: &Assignment, tolerance: f64) -> Vec<&str> {
        self.constraints
            .iter()
            .filter(|c| !c.is_satisfied_by(assignment, tolerance))
            .map(|c| c.name.as_str())
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Solutions and the solver capability
// ---------------------------------------------------------------------------

/// Variable values reported by a solver, indexed by `VarId`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    values: Vec<f64>,
}

impl Assignment {
    pub fn new(values: Vec<f64>) -> Self {
        Assignment { values }
    }

    /// Value of `var`; 0.0 for a variable the solver did not report.
    pub fn value(&self, var: VarId) -> f64 {
        self.values.get(var.0).copied().unwrap_or(0.0)
    }

    /// Whether a binary variable is set, rounding solver noise at 0.5.
    pub fn is_set(&self, var: VarId) -> bool {
        self.value(var) > 0.5
    }
}

/// How a solve attempt terminated.
#[derive(Debug, Clone, PartialEq)]
pub enum SolverOutcome {
    /// Proven optimal.
    Optimal(Assignment),
    /// Feasible but stopped before proving optimality.
    Feasible(Assignment),
    Infeasible,
    Unbounded,
    /// The time limit elapsed with no assignment to report.
    TimeLimit,
    /// Backend error; the message is the backend's own.
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SolveLimits {
    /// Advisory wall-clock limit. `None` waits for the backend to finish.
    pub time_limit: Option<Duration>,
}

/// A MILP backend able to solve a `LinearModel`.
pub trait IntegerSolver {
    fn name(&self) -> &'static str;

    fn solve(&self, model: &LinearModel, limits: &SolveLimits) -> SolverOutcome;
}
