//! [Solver] implementation backed by HiGHS
use super::{HighsModelStatus, HighsStatus, Model, OptionValue, Sense};
use crate::program::{
    Constraint, ConstraintSense, Direction, Program, ProgramSolution, Solver, SolverError, Var,
    VarKind,
};

/// Builds [HighsProgram]s, applying the same HiGHS options to each of them.
///
/// ```
/// use cutting_stock::HighsSolver;
/// let solver = HighsSolver::new()
///     .with_option("presolve", "off") // disable the presolver
///     .with_option("time_limit", 30.0) // stop after 30 seconds
///     .with_option("threads", 1); // solve on a single thread
/// ```
#[derive(Debug, Clone, Default)]
pub struct HighsSolver {
    options: Vec<(String, OptionValue)>,
}

impl HighsSolver {
    /// A solver with the default HiGHS options (and no console output)
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a HiGHS option on every model built from now on.
    /// For the list of available options and their documentation, see:
    /// <https://ergo-code.github.io/HiGHS/dev/options/definitions/>
    pub fn with_option(mut self, option: impl Into<String>, value: impl Into<OptionValue>) -> Self {
        self.options.push((option.into(), value.into()));
        self
    }

    /// The options applied to every model
    pub fn options(&self) -> &[(String, OptionValue)] {
        &self.options
    }
}

impl Solver for HighsSolver {
    type Program = HighsProgram;

    fn build_model(&self, name: &str) -> Result<HighsProgram, SolverError> {
        let mut model = Model::try_new().map_err(call_error("Highs_create"))?;
        for (option, value) in &self.options {
            log::debug!("Setting HiGHS option {}={:?} on {}", option, value, name);
            model
                .try_set_option(option.as_str(), value.clone())
                .map_err(call_error("Highs_setOptionValue"))?;
        }
        Ok(HighsProgram {
            name: name.to_owned(),
            model: Some(model),
            kinds: Vec::new(),
            num_rows: 0,
        })
    }
}

/// A [Program] stored in a HiGHS instance
#[derive(Debug)]
pub struct HighsProgram {
    name: String,
    // only None while HiGHS is solving, or after a failed solve
    model: Option<Model>,
    kinds: Vec<VarKind>,
    num_rows: usize,
}

fn call_error(call: &'static str) -> impl Fn(HighsStatus) -> SolverError {
    move |status| SolverError::Call {
        call,
        status: format!("{:?}", status),
    }
}

impl HighsProgram {
    fn model(&mut self) -> Result<&mut Model, SolverError> {
        self.model.as_mut().ok_or(SolverError::Call {
            call: "Highs_run",
            status: "model lost in a previous failed solve".to_owned(),
        })
    }

    fn is_continuous(&self) -> bool {
        self.kinds.iter().all(|&k| k == VarKind::Continuous)
    }
}

impl Program for HighsProgram {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_vars(&self) -> usize {
        self.kinds.len()
    }

    fn num_constraints(&self) -> usize {
        self.num_rows
    }

    fn add_variable(&mut self, lower_bound: f64, kind: VarKind) -> Result<Var, SolverError> {
        let model = self.model()?;
        let col = model
            .try_add_column(0., lower_bound.., Vec::new())
            .map_err(call_error("Highs_addCol"))?;
        if kind == VarKind::Integer {
            model
                .try_change_col_integrality(col, true)
                .map_err(call_error("Highs_changeColIntegrality"))?;
        }
        self.kinds.push(kind);
        Ok(Var(col))
    }

    fn add_constraint(
        &mut self,
        terms: &[(Var, f64)],
        sense: ConstraintSense,
        rhs: f64,
    ) -> Result<Constraint, SolverError> {
        let factors = terms.iter().map(|&(var, coef)| (var.0, coef));
        let model = self.model()?;
        let row = match sense {
            ConstraintSense::LessEqual => model.try_add_row(..=rhs, factors),
            ConstraintSense::GreaterEqual => model.try_add_row(rhs.., factors),
            ConstraintSense::Equal => model.try_add_row(rhs..=rhs, factors),
        }
        .map_err(call_error("Highs_addRow"))?;
        self.num_rows += 1;
        Ok(Constraint(row))
    }

    fn set_objective(
        &mut self,
        terms: &[(Var, f64)],
        direction: Direction,
    ) -> Result<(), SolverError> {
        let mut costs = vec![0.; self.kinds.len()];
        for &(var, coef) in terms {
            match costs.get_mut(var.0) {
                Some(cost) => *cost += coef,
                None => {
                    return Err(SolverError::Call {
                        call: "Highs_changeColsCostBySet",
                        status: format!("unknown variable {}", var.0),
                    })
                }
            }
        }
        let cols: Vec<usize> = (0..costs.len()).collect();
        let sense = match direction {
            Direction::Minimise => Sense::Minimise,
            Direction::Maximise => Sense::Maximise,
        };
        let model = self.model()?;
        model
            .try_change_cols_cost(&cols, &costs)
            .map_err(call_error("Highs_changeColsCostBySet"))?;
        model
            .try_set_sense(sense)
            .map_err(call_error("Highs_changeObjectiveSense"))
    }

    fn add_column(
        &mut self,
        objective_coefficient: f64,
        coefficients: &[(Constraint, f64)],
        kind: VarKind,
    ) -> Result<Var, SolverError> {
        let factors = coefficients.iter().map(|&(row, coef)| (row.0, coef));
        let model = self.model()?;
        let col = model
            .try_add_column(objective_coefficient, 0.0.., factors)
            .map_err(call_error("Highs_addCol"))?;
        if kind == VarKind::Integer {
            model
                .try_change_col_integrality(col, true)
                .map_err(call_error("Highs_changeColIntegrality"))?;
        }
        self.kinds.push(kind);
        Ok(Var(col))
    }

    fn set_kind(&mut self, var: Var, kind: VarKind) -> Result<(), SolverError> {
        let current = self.kinds.get_mut(var.0).ok_or(SolverError::Call {
            call: "Highs_changeColIntegrality",
            status: format!("unknown variable {}", var.0),
        })?;
        if *current == kind {
            return Ok(());
        }
        *current = kind;
        self.model()?
            .try_change_col_integrality(var.0, kind == VarKind::Integer)
            .map_err(call_error("Highs_changeColIntegrality"))
    }

    fn solve(&mut self) -> Result<ProgramSolution, SolverError> {
        let continuous = self.is_continuous();
        let model = self.model.take().ok_or(SolverError::Call {
            call: "Highs_run",
            status: "model lost in a previous failed solve".to_owned(),
        })?;
        log::debug!(
            "Solving {} with {} variables and {} constraints ({})",
            self.name,
            model.num_cols(),
            model.num_rows(),
            if continuous { "LP" } else { "MIP" }
        );
        let solved = model.try_solve().map_err(call_error("Highs_run"))?;
        let status = solved.status();
        let outcome = match status {
            HighsModelStatus::Optimal => {
                let solution = solved.get_solution();
                let duals = continuous.then(|| solution.dual_rows().to_vec());
                Ok(ProgramSolution::new(
                    solved.obj_val(),
                    solution.columns().to_vec(),
                    duals,
                ))
            }
            HighsModelStatus::Infeasible => Err(SolverError::Infeasible),
            HighsModelStatus::Unbounded => Err(SolverError::Unbounded),
            other => Err(SolverError::NotOptimal(format!("{:?}", other))),
        };
        self.model = Some(Model::from(solved));
        outcome
    }
}
