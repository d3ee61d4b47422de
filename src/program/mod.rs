//! The mathematical program solver capability used by the column generation loop.
//!
//! The master and satellite problems are only ever manipulated through the [Program]
//! trait: variables, linear constraints, a linear objective and incremental columns.
//! [HighsSolver](crate::HighsSolver) is the production implementation.

use std::ops::Index;

#[cfg(test)]
pub(crate) mod scripted;

/// A variable (column) of a [Program], in the order it was added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Var(pub(crate) usize);

impl Var {
    /// Position of the variable in the program, starting at 0
    pub fn index(self) -> usize {
        self.0
    }
}

/// A linear constraint (row) of a [Program], in the order it was added
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Constraint(pub(crate) usize);

impl Constraint {
    /// Position of the constraint in the program, starting at 0
    pub fn index(self) -> usize {
        self.0
    }
}

/// Domain of a variable
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// real valued
    Continuous,
    /// whole numbers only
    Integer,
}

/// Relation between the left and right hand side of a constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintSense {
    /// `expr <= rhs`
    LessEqual,
    /// `expr >= rhs`
    GreaterEqual,
    /// `expr == rhs`
    Equal,
}

/// Whether to maximize or minimize the objective function
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// min
    Minimise,
    /// max
    Maximise,
}

/// Reasons a program could not be solved to optimality
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SolverError {
    /// No assignment satisfies the constraints
    #[error("the program is infeasible")]
    Infeasible,
    /// The objective can be improved without limit
    #[error("the program is unbounded")]
    Unbounded,
    /// The solver stopped without proving optimality
    #[error("the solver stopped with status {0}")]
    NotOptimal(String),
    /// A relaxed solve was expected to provide dual prices, but none were available
    #[error("no dual prices are available for program {0}")]
    MissingDuals(String),
    /// The optimal solution does not have the expected shape
    #[error("the solver returned an invalid solution: {0}")]
    InvalidSolution(String),
    /// A call into the solver backend failed
    #[error("solver call {call} failed with status {status}")]
    Call {
        /// backend function name
        call: &'static str,
        /// backend status, formatted
        status: String,
    },
}

/// The optimal point of a solved [Program]
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramSolution {
    objective: f64,
    values: Vec<f64>,
    duals: Option<Vec<f64>>,
}

impl ProgramSolution {
    /// A solution with the given objective value, one value per variable and,
    /// for continuous programs, one dual price per constraint.
    pub fn new(objective: f64, values: Vec<f64>, duals: Option<Vec<f64>>) -> Self {
        Self {
            objective,
            values,
            duals,
        }
    }

    /// The optimal objective value
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// The optimal value of each variable, in the order they were added
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The dual price of each constraint, in the order they were added.
    /// Only available when every variable of the program is continuous.
    pub fn duals(&self) -> Option<&[f64]> {
        self.duals.as_deref()
    }

    /// The dual price of a single constraint
    pub fn dual(&self, constraint: Constraint) -> Option<f64> {
        self.duals.as_ref()?.get(constraint.0).copied()
    }

    pub(crate) fn into_parts(self) -> (f64, Vec<f64>, Option<Vec<f64>>) {
        (self.objective, self.values, self.duals)
    }
}

impl Index<Var> for ProgramSolution {
    type Output = f64;
    fn index(&self, var: Var) -> &f64 {
        &self.values[var.0]
    }
}

/// Something that can create empty programs
pub trait Solver {
    /// The programs built by this solver
    type Program: Program;

    /// Create an empty program. The name is only used for diagnostics.
    fn build_model(&self, name: &str) -> Result<Self::Program, SolverError>;
}

/// A linear program, or a mixed integer linear program when some variables are integer.
///
/// Programs are mutated in place and can be solved any number of times.
pub trait Program {
    /// Name given when the program was built
    fn name(&self) -> &str;

    /// Number of variables
    fn num_vars(&self) -> usize;

    /// Number of constraints
    fn num_constraints(&self) -> usize;

    /// Add a variable bounded by `[lower_bound, +∞[`, with a zero objective coefficient
    fn add_variable(&mut self, lower_bound: f64, kind: VarKind) -> Result<Var, SolverError>;

    /// Add the constraint `Σ coefficient * var (sense) rhs`
    fn add_constraint(
        &mut self,
        terms: &[(Var, f64)],
        sense: ConstraintSense,
        rhs: f64,
    ) -> Result<Constraint, SolverError>;

    /// Replace the objective function. Variables absent from `terms` get a zero coefficient.
    fn set_objective(&mut self, terms: &[(Var, f64)], direction: Direction)
        -> Result<(), SolverError>;

    /// Add a non-negative variable that takes part in existing constraints,
    /// without rebuilding them.
    fn add_column(
        &mut self,
        objective_coefficient: f64,
        coefficients: &[(Constraint, f64)],
        kind: VarKind,
    ) -> Result<Var, SolverError>;

    /// Change the domain of an existing variable
    fn set_kind(&mut self, var: Var, kind: VarKind) -> Result<(), SolverError>;

    /// Solve the program to optimality.
    /// Any other outcome (infeasible, unbounded, limits) is an error.
    fn solve(&mut self) -> Result<ProgramSolution, SolverError>;
}
