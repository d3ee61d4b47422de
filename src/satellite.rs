//! The pricing subproblem: an integer knapsack over one roll.
//!
//! ```text
//! min   Σ_i (unit_cost_i - π_i) y_i
//! s.t.  Σ_i size_i y_i <= raw material size
//!       y_i >= 0 integer
//! ```
//!
//! Its optimum is the reduced cost of the best pattern for the current dual prices.

use crate::instance::Instance;
use crate::master::DualPrices;
use crate::pattern::Pattern;
use crate::program::{ConstraintSense, Direction, Program, Solver, SolverError, Var, VarKind};

/// The best pattern for a set of dual prices
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Optimal objective of the satellite: `Σ_i (unit_cost_i - π_i) y_i`
    pub reduced_cost: f64,
    /// The optimal `y`
    pub pattern: Pattern,
}

/// The knapsack subproblem. It is built once; each call to [Satellite::price]
/// only replaces its objective.
#[derive(Debug)]
pub struct Satellite<P> {
    program: P,
    vars: Vec<Var>,
    instance: Instance,
}

impl<P: Program> Satellite<P> {
    /// Build the capacity constraint and one integer variable per item type
    pub fn new<S: Solver<Program = P>>(
        solver: &S,
        instance: &Instance,
    ) -> Result<Self, SolverError> {
        let mut program = solver.build_model("satellite")?;
        let vars = (0..instance.len())
            .map(|_| program.add_variable(0., VarKind::Integer))
            .collect::<Result<Vec<_>, _>>()?;
        let capacity: Vec<(Var, f64)> = vars
            .iter()
            .copied()
            .zip(instance.sizes().iter().copied())
            .collect();
        program.add_constraint(
            &capacity,
            ConstraintSense::LessEqual,
            instance.raw_material_size(),
        )?;
        Ok(Self {
            program,
            vars,
            instance: instance.clone(),
        })
    }

    /// Find the pattern with the most negative reduced cost for the given dual prices
    pub fn price(&mut self, duals: &DualPrices) -> Result<Candidate, SolverError> {
        if duals.len() != self.vars.len() {
            return Err(SolverError::InvalidSolution(format!(
                "{} dual prices for {} item types",
                duals.len(),
                self.vars.len()
            )));
        }
        let objective: Vec<(Var, f64)> = self
            .vars
            .iter()
            .zip(self.instance.unit_costs())
            .enumerate()
            .map(|(item, (&var, &cost))| (var, cost - duals[item]))
            .collect();
        self.program.set_objective(&objective, Direction::Minimise)?;
        let solution = self.program.solve()?;

        let counts = self
            .vars
            .iter()
            .map(|&var| {
                let value = solution[var].round();
                let count = if value.is_finite() {
                    u32::try_from(value as i64).ok()
                } else {
                    None
                };
                count.ok_or_else(|| {
                    SolverError::InvalidSolution(format!(
                        "item count {} out of range",
                        solution[var]
                    ))
                })
            })
            .collect::<Result<Vec<u32>, _>>()?;
        let pattern = Pattern::new(counts);
        if !pattern.fits(&self.instance) {
            return Err(SolverError::InvalidSolution(format!(
                "pattern {:?} does not fit in a roll of size {}",
                pattern.counts(),
                self.instance.raw_material_size()
            )));
        }
        Ok(Candidate {
            reduced_cost: solution.objective(),
            pattern,
        })
    }

    /// The underlying solver program
    pub fn program(&self) -> &P {
        &self.program
    }
}
