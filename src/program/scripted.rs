//! A [Solver] that replays canned solutions and records every call, for solver-free tests.
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};

use super::{
    Constraint, ConstraintSense, Direction, Program, ProgramSolution, Solver, SolverError, Var,
    VarKind,
};

type Script = VecDeque<Result<ProgramSolution, SolverError>>;

#[derive(Debug, Default)]
pub(crate) struct ScriptedSolver {
    scripts: RefCell<HashMap<String, Script>>,
}

impl ScriptedSolver {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Queue the outcome of the next `solve` of the program with the given name
    pub(crate) fn then(self, name: &str, outcome: Result<ProgramSolution, SolverError>) -> Self {
        self.scripts
            .borrow_mut()
            .entry(name.to_owned())
            .or_default()
            .push_back(outcome);
        self
    }
}

impl Solver for ScriptedSolver {
    type Program = ScriptedProgram;

    fn build_model(&self, name: &str) -> Result<ScriptedProgram, SolverError> {
        let script = self.scripts.borrow_mut().remove(name).unwrap_or_default();
        Ok(ScriptedProgram {
            name: name.to_owned(),
            script,
            variables: Vec::new(),
            constraints: Vec::new(),
            direction: None,
            solves: 0,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScriptedVariable {
    pub(crate) lower_bound: f64,
    pub(crate) kind: VarKind,
    pub(crate) objective: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ScriptedConstraint {
    pub(crate) terms: Vec<(Var, f64)>,
    pub(crate) sense: ConstraintSense,
    pub(crate) rhs: f64,
}

#[derive(Debug)]
pub(crate) struct ScriptedProgram {
    name: String,
    script: Script,
    pub(crate) variables: Vec<ScriptedVariable>,
    pub(crate) constraints: Vec<ScriptedConstraint>,
    pub(crate) direction: Option<Direction>,
    pub(crate) solves: usize,
}

impl ScriptedProgram {
    pub(crate) fn objective(&self) -> Vec<f64> {
        self.variables.iter().map(|v| v.objective).collect()
    }
}

impl Program for ScriptedProgram {
    fn name(&self) -> &str {
        &self.name
    }

    fn num_vars(&self) -> usize {
        self.variables.len()
    }

    fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    fn add_variable(&mut self, lower_bound: f64, kind: VarKind) -> Result<Var, SolverError> {
        self.variables.push(ScriptedVariable {
            lower_bound,
            kind,
            objective: 0.,
        });
        Ok(Var(self.variables.len() - 1))
    }

    fn add_constraint(
        &mut self,
        terms: &[(Var, f64)],
        sense: ConstraintSense,
        rhs: f64,
    ) -> Result<Constraint, SolverError> {
        self.constraints.push(ScriptedConstraint {
            terms: terms.to_vec(),
            sense,
            rhs,
        });
        Ok(Constraint(self.constraints.len() - 1))
    }

    fn set_objective(
        &mut self,
        terms: &[(Var, f64)],
        direction: Direction,
    ) -> Result<(), SolverError> {
        for v in &mut self.variables {
            v.objective = 0.;
        }
        for &(var, coef) in terms {
            self.variables[var.0].objective += coef;
        }
        self.direction = Some(direction);
        Ok(())
    }

    fn add_column(
        &mut self,
        objective_coefficient: f64,
        coefficients: &[(Constraint, f64)],
        kind: VarKind,
    ) -> Result<Var, SolverError> {
        self.variables.push(ScriptedVariable {
            lower_bound: 0.,
            kind,
            objective: objective_coefficient,
        });
        let var = Var(self.variables.len() - 1);
        for &(row, coef) in coefficients {
            self.constraints[row.0].terms.push((var, coef));
        }
        Ok(var)
    }

    fn set_kind(&mut self, var: Var, kind: VarKind) -> Result<(), SolverError> {
        self.variables[var.0].kind = kind;
        Ok(())
    }

    fn solve(&mut self) -> Result<ProgramSolution, SolverError> {
        self.solves += 1;
        let outcome = self.script.pop_front().unwrap_or_else(|| {
            Err(SolverError::NotOptimal(format!(
                "{} script ran out",
                self.name
            )))
        })?;
        let continuous = self.variables.iter().all(|v| v.kind == VarKind::Continuous);
        let (objective, values, duals) = outcome.into_parts();
        assert_eq!(
            values.len(),
            self.variables.len(),
            "scripted solution for {} has the wrong number of values",
            self.name
        );
        Ok(ProgramSolution::new(
            objective,
            values,
            if continuous { duals } else { None },
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_replays_script_in_order() {
        let solver = ScriptedSolver::new()
            .then("p", Ok(ProgramSolution::new(1., vec![1.], Some(vec![0.5]))))
            .then("p", Err(SolverError::Unbounded));
        let mut p = solver.build_model("p").unwrap();
        let x = p.add_variable(0., VarKind::Continuous).unwrap();
        let row = p
            .add_constraint(&[(x, 1.)], ConstraintSense::GreaterEqual, 1.)
            .unwrap();
        let first = p.solve().unwrap();
        assert_eq!(first.dual(row), Some(0.5));
        assert_eq!(p.solve(), Err(SolverError::Unbounded));
        assert!(matches!(p.solve(), Err(SolverError::NotOptimal(_))));
        assert_eq!(p.solves, 3);
    }

    #[test]
    fn test_integer_programs_drop_duals() {
        let solver =
            ScriptedSolver::new().then("p", Ok(ProgramSolution::new(2., vec![2.], Some(vec![1.]))));
        let mut p = solver.build_model("p").unwrap();
        let x = p.add_variable(0., VarKind::Integer).unwrap();
        p.add_constraint(&[(x, 1.)], ConstraintSense::GreaterEqual, 2.)
            .unwrap();
        assert_eq!(p.solve().unwrap().duals(), None);
    }
}
