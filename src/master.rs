//! The restricted master problem: how many rolls to cut with each known pattern.
//!
//! ```text
//! min   Σ_k (cost_k + γ) x_k
//! s.t.  Σ_k pattern_k[i] x_k >= demand_i    [π_i]   for every item type i
//!       x_k >= 0                                    (integer in integral mode)
//! ```
//!
//! Columns are only ever appended, so the feasible region grows monotonically
//! and the relaxed objective can only decrease.

use std::ops::Index;

use crate::instance::Instance;
use crate::pattern::Pattern;
use crate::program::{
    Constraint, ConstraintSense, Direction, Program, Solver, SolverError, Var, VarKind,
};

/// Dual price `π_i` of each demand constraint: the marginal value of one more item of type `i`.
#[derive(Debug, Clone, PartialEq)]
pub struct DualPrices(Vec<f64>);

impl DualPrices {
    /// One price per item type
    pub fn new(prices: Vec<f64>) -> Self {
        Self(prices)
    }

    /// The prices, in item order
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// Number of prices
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when there are no prices
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Index<usize> for DualPrices {
    type Output = f64;
    fn index(&self, item: usize) -> &f64 {
        &self.0[item]
    }
}

/// Whether roll counts are continuous or integer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MasterMode {
    /// `x_k >= 0` real: yields dual prices
    Relaxed,
    /// `x_k >= 0` integer: yields a cutting plan
    Integral,
}

impl From<MasterMode> for VarKind {
    fn from(mode: MasterMode) -> Self {
        match mode {
            MasterMode::Relaxed => VarKind::Continuous,
            MasterMode::Integral => VarKind::Integer,
        }
    }
}

/// A variable of the master problem and the pattern column it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct MasterColumn {
    var: Var,
    objective: f64,
    coefficients: Vec<(usize, f64)>,
}

impl MasterColumn {
    /// The variable `x_k`
    pub fn var(&self) -> Var {
        self.var
    }

    /// Objective coefficient: pattern cost plus the per-roll overhead
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// `(item, count)` for every demand constraint the column takes part in
    pub fn coefficients(&self) -> &[(usize, f64)] {
        &self.coefficients
    }
}

/// Optimum of the continuous relaxation
#[derive(Debug, Clone, PartialEq)]
pub struct RelaxedSolution {
    /// objective value
    pub objective: f64,
    /// value of each `x_k`
    pub values: Vec<f64>,
    /// dual price of each demand constraint
    pub duals: DualPrices,
}

/// Optimum with integer roll counts
#[derive(Debug, Clone, PartialEq)]
pub struct IntegralSolution {
    /// objective value
    pub objective: f64,
    /// number of rolls cut with each pattern
    pub values: Vec<f64>,
}

/// The master problem, owning its solver program
#[derive(Debug)]
pub struct RestrictedMaster<P> {
    program: P,
    demand_rows: Vec<Constraint>,
    columns: Vec<MasterColumn>,
    overhead: f64,
    mode: MasterMode,
}

fn column_coefficients(pattern: &Pattern) -> Vec<(usize, f64)> {
    pattern
        .nonzero()
        .map(|(item, count)| (item, f64::from(count)))
        .collect()
}

impl<P: Program> RestrictedMaster<P> {
    /// Build the relaxed master problem over the initial patterns.
    /// `costs[k]` is the cost of `patterns[k]`; `overhead` is added to each of them.
    pub fn new<S: Solver<Program = P>>(
        solver: &S,
        instance: &Instance,
        patterns: &[Pattern],
        costs: &[f64],
        overhead: f64,
    ) -> Result<Self, SolverError> {
        if patterns.len() != costs.len() {
            return Err(SolverError::InvalidSolution(format!(
                "{} patterns but {} costs",
                patterns.len(),
                costs.len()
            )));
        }
        let mut program = solver.build_model("master")?;
        let mut columns = Vec::with_capacity(patterns.len());
        for (pattern, &cost) in patterns.iter().zip(costs) {
            let var = program.add_variable(0., VarKind::Continuous)?;
            columns.push(MasterColumn {
                var,
                objective: cost + overhead,
                coefficients: column_coefficients(pattern),
            });
        }
        let mut demand_rows = Vec::with_capacity(instance.len());
        for (item, &demand) in instance.demands().iter().enumerate() {
            let terms: Vec<(Var, f64)> = columns
                .iter()
                .filter_map(|column| {
                    column
                        .coefficients
                        .iter()
                        .find(|&&(i, _)| i == item)
                        .map(|&(_, count)| (column.var, count))
                })
                .collect();
            let row =
                program.add_constraint(&terms, ConstraintSense::GreaterEqual, f64::from(demand))?;
            demand_rows.push(row);
        }
        let objective: Vec<(Var, f64)> = columns.iter().map(|c| (c.var, c.objective)).collect();
        program.set_objective(&objective, Direction::Minimise)?;
        log::debug!(
            "Built the master problem with {} patterns and {} demand constraints",
            columns.len(),
            demand_rows.len()
        );
        Ok(Self {
            program,
            demand_rows,
            columns,
            overhead,
            mode: MasterMode::Relaxed,
        })
    }

    /// Append a variable for `pattern`, with objective coefficient `cost + γ`,
    /// to the existing demand constraints.
    pub fn add_column(&mut self, pattern: &Pattern, cost: f64) -> Result<Var, SolverError> {
        let coefficients = column_coefficients(pattern);
        let rows: Vec<(Constraint, f64)> = coefficients
            .iter()
            .map(|&(item, count)| (self.demand_rows[item], count))
            .collect();
        let objective = cost + self.overhead;
        let var = self
            .program
            .add_column(objective, &rows, self.mode.into())?;
        self.columns.push(MasterColumn {
            var,
            objective,
            coefficients,
        });
        Ok(var)
    }

    /// Solve the continuous relaxation and read the dual price of every demand constraint
    pub fn solve_relaxed(&mut self) -> Result<RelaxedSolution, SolverError> {
        let solution = self.program.solve()?;
        let duals = self
            .demand_rows
            .iter()
            .map(|&row| solution.dual(row))
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| SolverError::MissingDuals(self.program.name().to_owned()))?;
        let (objective, values, _) = solution.into_parts();
        Ok(RelaxedSolution {
            objective,
            values: self.column_values(values)?,
            duals: DualPrices(duals),
        })
    }

    /// Make every roll count integer. Columns added afterwards are integer as well.
    pub fn make_integral(&mut self) -> Result<(), SolverError> {
        if self.mode == MasterMode::Integral {
            return Ok(());
        }
        for column in &self.columns {
            self.program.set_kind(column.var, VarKind::Integer)?;
        }
        self.mode = MasterMode::Integral;
        Ok(())
    }

    /// Solve with integer roll counts, switching to integral mode first if needed
    pub fn solve_integral(&mut self) -> Result<IntegralSolution, SolverError> {
        self.make_integral()?;
        let (objective, values, _) = self.program.solve()?.into_parts();
        Ok(IntegralSolution {
            objective,
            values: self.column_values(values)?,
        })
    }

    fn column_values(&self, values: Vec<f64>) -> Result<Vec<f64>, SolverError> {
        self.columns
            .iter()
            .map(|column| values.get(column.var.index()).copied())
            .collect::<Option<Vec<f64>>>()
            .ok_or_else(|| {
                SolverError::InvalidSolution(format!(
                    "{} values for {} master columns",
                    values.len(),
                    self.columns.len()
                ))
            })
    }

    /// Number of columns `K`
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Every column, in the order the patterns were accepted
    pub fn columns(&self) -> &[MasterColumn] {
        &self.columns
    }

    /// Current mode
    pub fn mode(&self) -> MasterMode {
        self.mode
    }

    /// The per-roll overhead `γ`
    pub fn overhead(&self) -> f64 {
        self.overhead
    }

    /// The underlying solver program
    pub fn program(&self) -> &P {
        &self.program
    }
}
