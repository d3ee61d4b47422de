//! The column generation loop.
//!
//! A run goes through four states:
//!
//! ```text
//! Initialized -> Iterating -> Converged -> Finalized
//!                  ^      |
//!                  +------+
//! ```
//!
//! Each iteration solves the relaxed master, prices a new pattern with the satellite using
//! the master's dual prices, and either stops (no pattern can lower the master objective)
//! or appends the pattern as a new master column. Once converged, the master is solved
//! again with integer roll counts and the result is expanded into rolls.

use crate::config::Config;
use crate::error::{Error, Result, Stage};
use crate::instance::Instance;
use crate::master::{DualPrices, RestrictedMaster};
use crate::pattern::{pattern_cost, seed_patterns, Pattern};
use crate::plan::{materialize, pattern_usage, CuttingPlan};
use crate::program::{Program, Solver, SolverError};
use crate::satellite::Satellite;

/// Where a run stands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum State {
    /// master and satellite are built, nothing solved yet
    Initialized,
    /// at least one iteration ran and the stopping rule has not fired
    Iterating,
    /// no more columns will be generated
    Converged,
    /// the integral master has been solved
    Finalized,
}

/// Why no more columns are generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// `reduced cost + overhead >= -tolerance`: no pattern improves the relaxed master
    Converged,
    /// the iteration cap was reached first; the relaxed master may not be optimal
    IterationLimit,
    /// the best pattern had a negative cost and was not added
    RejectedColumn,
    /// the best pattern is already a column of the master, so the master cannot change;
    /// this points at numerical trouble in the solver
    RepeatedColumn,
}

/// What happened during one iteration
#[derive(Debug, Clone, PartialEq)]
pub struct IterationRecord {
    /// 1-based iteration number
    pub iteration: usize,
    /// objective of the relaxed master
    pub master_objective: f64,
    /// its dual prices
    pub duals: DualPrices,
    /// optimal objective of the satellite
    pub reduced_cost: f64,
    /// the pattern the satellite proposed
    pub candidate: Pattern,
    /// index of the new column, when the candidate was added to the master
    pub added: Option<usize>,
}

/// The stopping rule: adding a pattern whose reduced cost plus overhead is not
/// below `-tolerance` cannot lower the relaxed master objective.
pub fn should_stop(reduced_cost: f64, overhead: f64, tolerance: f64) -> bool {
    reduced_cost + overhead >= -tolerance
}

/// A column generation run over one instance. Owns the master and satellite programs.
#[derive(Debug)]
pub struct ColumnGeneration<P> {
    instance: Instance,
    config: Config,
    patterns: Vec<Pattern>,
    costs: Vec<f64>,
    master: RestrictedMaster<P>,
    satellite: Satellite<P>,
    state: State,
    termination: Option<Termination>,
    iterations: usize,
    history: Vec<IterationRecord>,
}

impl<P: Program> ColumnGeneration<P> {
    /// Validate the input, seed one pattern per item type and build both programs
    pub fn new<S: Solver<Program = P>>(
        solver: &S,
        instance: Instance,
        config: Config,
    ) -> Result<Self> {
        config.validate()?;
        let mut patterns = Vec::with_capacity(instance.len());
        let mut costs = Vec::with_capacity(instance.len());
        for pattern in seed_patterns(&instance) {
            match pattern_cost(&pattern, instance.unit_costs()) {
                Some(cost) => {
                    patterns.push(pattern);
                    costs.push(cost);
                }
                None => log::warn!("Dropping seed pattern {:?} with a negative cost", pattern),
            }
        }
        let setup_error = |stage: Stage| {
            move |source: SolverError| Error::Solver {
                stage,
                iteration: 0,
                last_objective: None,
                source,
            }
        };
        let master = RestrictedMaster::new(solver, &instance, &patterns, &costs, config.overhead())
            .map_err(setup_error(Stage::MasterSetup))?;
        let satellite =
            Satellite::new(solver, &instance).map_err(setup_error(Stage::SatelliteSetup))?;
        log::debug!(
            "Column generation initialized with {} item types and {} seed patterns",
            instance.len(),
            patterns.len()
        );
        Ok(Self {
            instance,
            config,
            patterns,
            costs,
            master,
            satellite,
            state: State::Initialized,
            termination: None,
            iterations: 0,
            history: Vec::new(),
        })
    }

    fn solver_error(&self, stage: Stage) -> impl FnOnce(SolverError) -> Error {
        let iteration = self.iterations;
        let last_objective = self.history.last().map(|r| r.master_objective);
        move |source| Error::Solver {
            stage,
            iteration,
            last_objective,
            source,
        }
    }

    fn converge(&mut self, termination: Termination) {
        self.termination = Some(termination);
        self.state = State::Converged;
    }

    /// Run one iteration. Does nothing once the loop has converged.
    pub fn step(&mut self) -> Result<State> {
        if matches!(self.state, State::Converged | State::Finalized) {
            return Ok(self.state);
        }
        if self.iterations >= self.config.max_iterations() {
            log::warn!(
                "Stopping column generation after {} iterations without convergence",
                self.iterations
            );
            self.converge(Termination::IterationLimit);
            return Ok(self.state);
        }
        self.state = State::Iterating;
        self.iterations += 1;

        let relaxed = self
            .master
            .solve_relaxed()
            .map_err(self.solver_error(Stage::RelaxedMaster))?;
        log::debug!(
            "Iteration {}: relaxed master objective {}",
            self.iterations,
            relaxed.objective
        );
        let candidate = match self.satellite.price(&relaxed.duals) {
            Ok(candidate) => candidate,
            Err(source) => {
                return Err(Error::Solver {
                    stage: Stage::Satellite,
                    iteration: self.iterations,
                    last_objective: Some(relaxed.objective),
                    source,
                })
            }
        };
        log::debug!(
            "Iteration {}: satellite objective {}, duals {:?}, pattern {:?}",
            self.iterations,
            candidate.reduced_cost,
            relaxed.duals.as_slice(),
            candidate.pattern.counts()
        );

        let mut record = IterationRecord {
            iteration: self.iterations,
            master_objective: relaxed.objective,
            duals: relaxed.duals,
            reduced_cost: candidate.reduced_cost,
            candidate: candidate.pattern.clone(),
            added: None,
        };

        if should_stop(
            candidate.reduced_cost,
            self.config.overhead(),
            self.config.tolerance(),
        ) {
            log::info!(
                "Column generation converged after {} iterations with relaxed objective {}",
                self.iterations,
                relaxed.objective
            );
            self.history.push(record);
            self.converge(Termination::Converged);
            return Ok(self.state);
        }

        let Some(cost) = pattern_cost(&candidate.pattern, self.instance.unit_costs()) else {
            log::warn!(
                "Pattern {:?} has a negative cost and cannot be added, stopping",
                candidate.pattern.counts()
            );
            self.history.push(record);
            self.converge(Termination::RejectedColumn);
            return Ok(self.state);
        };
        if let Some(existing) = self.patterns.iter().position(|p| *p == candidate.pattern) {
            log::warn!(
                "Pattern {:?} is already column {} but has a negative reduced cost, stopping",
                candidate.pattern.counts(),
                existing
            );
            self.history.push(record);
            self.converge(Termination::RepeatedColumn);
            return Ok(self.state);
        }
        let add_error = self.solver_error(Stage::AddColumn);
        self.master
            .add_column(&candidate.pattern, cost)
            .map_err(add_error)?;
        log::debug!("New pattern {} with cost {}", self.patterns.len(), cost);
        record.added = Some(self.patterns.len());
        self.patterns.push(candidate.pattern);
        self.costs.push(cost);
        self.history.push(record);
        Ok(self.state)
    }

    /// Iterate until the stopping rule fires or the iteration cap is reached
    pub fn run(&mut self) -> Result<Termination> {
        loop {
            match self.step()? {
                State::Converged | State::Finalized => break,
                State::Initialized | State::Iterating => {}
            }
        }
        Ok(self.termination.unwrap_or(Termination::Converged))
    }

    /// Solve the master with integer roll counts and expand the solution into rolls.
    ///
    /// Runs the loop first if it has not converged yet. Calling it again re-solves
    /// the same integral master.
    pub fn finalize(&mut self) -> Result<CuttingPlan> {
        let termination = self.run()?;
        let integral = self
            .master
            .solve_integral()
            .map_err(self.solver_error(Stage::IntegralMaster))?;
        self.state = State::Finalized;
        log::info!(
            "Integral master objective {} with {} patterns",
            integral.objective,
            self.patterns.len()
        );
        let usage = pattern_usage(
            &integral.values,
            &self.patterns,
            &self.costs,
            self.config.rounding_tolerance(),
        );
        for u in &usage {
            log::debug!(
                "Pattern {}: sizes {:?} -> {} rolls",
                u.index,
                u.pattern.item_sizes(self.instance.sizes()),
                u.rolls
            );
        }
        Ok(CuttingPlan {
            num_items: self.instance.len(),
            rolls: materialize(
                &integral.values,
                &self.patterns,
                self.instance.sizes(),
                self.config.rounding_tolerance(),
            ),
            usage,
            objective: integral.objective,
            relaxed_objective: self.history.last().map(|r| r.master_objective),
            iterations: self.iterations,
            termination,
        })
    }

    /// Current state
    pub fn state(&self) -> State {
        self.state
    }

    /// Why the loop stopped, once it has
    pub fn termination(&self) -> Option<Termination> {
        self.termination
    }

    /// Number of relaxed master solves so far
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// One record per iteration
    pub fn history(&self) -> &[IterationRecord] {
        &self.history
    }

    /// Accepted patterns; pattern `k` is master column `k`
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Cost of each accepted pattern
    pub fn pattern_costs(&self) -> &[f64] {
        &self.costs
    }

    /// The restricted master problem
    pub fn master(&self) -> &RestrictedMaster<P> {
        &self.master
    }

    /// The knapsack subproblem
    pub fn satellite(&self) -> &Satellite<P> {
        &self.satellite
    }

    /// The instance being solved
    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    /// The run parameters
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ConfigurationError;
    use crate::program::scripted::{ScriptedProgram, ScriptedSolver};
    use crate::program::{ProgramSolution, Var};

    // sizes 3 and 5 in rolls of 10; seeds are [3, 0] and [0, 2]
    fn instance() -> Instance {
        Instance::from_slices(&[3., 5.], 10., &[1., 1.], &[2, 1]).unwrap()
    }

    fn master(
        objective: f64,
        values: Vec<f64>,
        duals: Vec<f64>,
    ) -> Result<ProgramSolution, SolverError> {
        Ok(ProgramSolution::new(objective, values, Some(duals)))
    }

    fn satellite(objective: f64, values: Vec<f64>) -> Result<ProgramSolution, SolverError> {
        Ok(ProgramSolution::new(objective, values, None))
    }

    fn run(solver: ScriptedSolver, config: Config) -> ColumnGeneration<ScriptedProgram> {
        ColumnGeneration::new(&solver, instance(), config).unwrap()
    }

    #[test]
    fn test_stopping_rule() {
        assert!(should_stop(-2., 2., 0.));
        assert!(should_stop(-2.5, 2., 0.5));
        assert!(!should_stop(-2.75, 2., 0.5));
        assert!(should_stop(0., 0., 1e-6));
        assert!(!should_stop(-1e-3, 0., 1e-6));
    }

    #[test]
    fn test_converges_on_the_tolerance_boundary() {
        let solver = ScriptedSolver::new()
            .then("master", master(10., vec![1., 1.], vec![1.5, 2.]))
            .then("satellite", satellite(-2.5, vec![0., 2.]));
        let mut cg = run(solver, Config::new(2., 0.5));
        assert_eq!(cg.state(), State::Initialized);
        assert_eq!(cg.step().unwrap(), State::Converged);
        assert_eq!(cg.termination(), Some(Termination::Converged));
        assert_eq!(cg.patterns().len(), 2);
        assert_eq!(cg.history()[0].added, None);
        assert_eq!(cg.history()[0].reduced_cost, -2.5);
        // further steps are no-ops
        assert_eq!(cg.step().unwrap(), State::Converged);
        assert_eq!(cg.iterations(), 1);
    }

    #[test]
    fn test_improving_pattern_becomes_a_column() {
        let solver = ScriptedSolver::new()
            .then("master", master(10., vec![1., 1.], vec![1.5, 2.]))
            .then("master", master(8., vec![0., 0., 2.], vec![2., 2.]))
            .then("master", satellite(8., vec![0., 0., 2.]))
            .then("satellite", satellite(-3., vec![1., 1.]))
            .then("satellite", satellite(-2., vec![1., 1.]));
        let mut cg = run(solver, Config::new(2., 0.5));

        assert_eq!(cg.step().unwrap(), State::Iterating);
        assert_eq!(cg.patterns().len(), 3);
        assert_eq!(cg.patterns()[2], Pattern::new(vec![1, 1]));
        assert_eq!(cg.pattern_costs(), &[3., 2., 2.]);
        assert_eq!(cg.history()[0].added, Some(2));
        assert_eq!(cg.master().num_columns(), 3);

        // the new column matches its pattern, with objective cost + overhead
        let column = &cg.master().columns()[2];
        assert_eq!(column.coefficients(), &[(0, 1.), (1, 1.)]);
        assert_eq!(column.objective(), 4.);
        let program = cg.master().program();
        assert_eq!(program.constraints[0].terms, vec![(Var(0), 3.), (Var(2), 1.)]);
        assert_eq!(program.constraints[1].terms, vec![(Var(1), 2.), (Var(2), 1.)]);

        // the satellite saw cost - dual as objective
        assert_eq!(cg.satellite().program().objective(), vec![-0.5, -1.]);

        assert_eq!(cg.run().unwrap(), Termination::Converged);
        assert_eq!(cg.iterations(), 2);

        let plan = cg.finalize().unwrap();
        assert_eq!(cg.state(), State::Finalized);
        assert_eq!(plan.objective(), 8.);
        assert_eq!(plan.relaxed_objective(), Some(8.));
        assert_eq!(plan.rolls().len(), 2);
        assert!(plan.rolls().iter().all(|r| r.sizes() == [3., 5.]));
        assert_eq!(plan.usage().len(), 1);
        assert_eq!(plan.usage()[0].index, 2);
        assert_eq!(plan.produced(), vec![2, 2]);
        assert!(cg
            .master()
            .program()
            .variables
            .iter()
            .all(|v| v.kind == crate::program::VarKind::Integer));
    }

    #[test]
    fn test_iteration_cap() {
        let solver = ScriptedSolver::new()
            .then("master", master(10., vec![1., 1.], vec![1.5, 2.]))
            .then("master", satellite(8., vec![0., 0., 2.]))
            .then("satellite", satellite(-3., vec![1., 1.]));
        let mut cg = run(solver, Config::new(2., 0.5).with_max_iterations(1));
        assert_eq!(cg.run().unwrap(), Termination::IterationLimit);
        assert_eq!(cg.iterations(), 1);
        assert_eq!(cg.patterns().len(), 3);
        // the column generated in the last allowed iteration is kept
        let plan = cg.finalize().unwrap();
        assert_eq!(plan.termination(), Termination::IterationLimit);
        assert_eq!(plan.total_rolls(), 2);
        assert_eq!(cg.master().program().solves, 2);
        assert_eq!(cg.satellite().program().solves, 1);
    }

    #[test]
    fn test_zero_iterations_solves_the_seeds() {
        let solver = ScriptedSolver::new().then("master", satellite(11., vec![1., 1.]));
        let mut cg = run(solver, Config::new(2., 0.5).with_max_iterations(0));
        let plan = cg.finalize().unwrap();
        assert_eq!(plan.termination(), Termination::IterationLimit);
        assert_eq!(plan.relaxed_objective(), None);
        assert_eq!(plan.rolls().len(), 2);
    }

    #[test]
    fn test_master_failure_is_fatal() {
        let solver = ScriptedSolver::new()
            .then("master", master(10., vec![1., 1.], vec![1.5, 2.]))
            .then("master", Err(SolverError::Infeasible))
            .then("satellite", satellite(-3., vec![1., 1.]));
        let mut cg = run(solver, Config::new(2., 0.5));
        cg.step().unwrap();
        assert_eq!(
            cg.step(),
            Err(Error::Solver {
                stage: Stage::RelaxedMaster,
                iteration: 2,
                last_objective: Some(10.),
                source: SolverError::Infeasible,
            })
        );
    }

    #[test]
    fn test_satellite_failure_reports_current_objective() {
        let solver = ScriptedSolver::new()
            .then("master", master(10., vec![1., 1.], vec![1.5, 2.]))
            .then("satellite", Err(SolverError::Unbounded));
        let mut cg = run(solver, Config::default());
        assert_eq!(
            cg.run(),
            Err(Error::Solver {
                stage: Stage::Satellite,
                iteration: 1,
                last_objective: Some(10.),
                source: SolverError::Unbounded,
            })
        );
    }

    #[test]
    fn test_invalid_config_is_rejected_before_building() {
        let err = ColumnGeneration::new(&ScriptedSolver::new(), instance(), Config::new(-1., 0.))
            .unwrap_err();
        assert_eq!(
            err,
            Error::Configuration(ConfigurationError::InvalidOverhead(-1.))
        );
    }

    #[test]
    fn test_finalize_twice_resolves_the_same_master() {
        let solver = ScriptedSolver::new()
            .then("master", master(10., vec![1., 1.], vec![1.5, 2.]))
            .then("master", satellite(11., vec![1., 1.]))
            .then("master", satellite(11., vec![1., 1.]))
            .then("satellite", satellite(0., vec![0., 0.]));
        let mut cg = run(solver, Config::new(2., 1e-6));
        let first = cg.finalize().unwrap();
        let second = cg.finalize().unwrap();
        assert_eq!(first, second);
        assert_eq!(cg.master().num_columns(), 2);
    }

    #[test]
    fn test_repeated_pattern_stops_the_loop() {
        let solver = ScriptedSolver::new()
            .then("master", master(10., vec![1., 1.], vec![1.5, 2.]))
            .then("master", satellite(10., vec![1., 1.]))
            .then("satellite", satellite(-3., vec![3., 0.]));
        let mut cg = run(solver, Config::new(2., 0.5));
        assert_eq!(cg.run().unwrap(), Termination::RepeatedColumn);
        assert_eq!(cg.iterations(), 1);
        assert_eq!(cg.patterns().len(), 2);
        assert_eq!(cg.master().num_columns(), 2);
        assert_eq!(cg.history()[0].candidate, Pattern::new(vec![3, 0]));
        assert_eq!(cg.history()[0].added, None);
        let plan = cg.finalize().unwrap();
        assert_eq!(plan.termination(), Termination::RepeatedColumn);
    }

    #[test]
    fn test_zero_demand_produces_nothing() {
        let instance = Instance::from_slices(&[3., 5.], 10., &[1., 1.], &[0, 0]).unwrap();
        let solver = ScriptedSolver::new()
            .then("master", master(0., vec![0., 0.], vec![0., 0.]))
            .then("master", satellite(0., vec![0., 0.]))
            .then("satellite", satellite(0., vec![0., 0.]));
        let mut cg = ColumnGeneration::new(&solver, instance, Config::default()).unwrap();
        let plan = cg.finalize().unwrap();
        assert_eq!(plan.termination(), Termination::Converged);
        assert!(plan.rolls().is_empty());
        assert_eq!(plan.produced(), vec![0, 0]);
    }
}
