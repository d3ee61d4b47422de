#![forbid(missing_docs)]
//! One-dimensional cutting stock by column generation, solved with
//! [HiGHS](https://highs.dev).
//!
//! Items of several sizes must be cut from rolls of raw material of a single size.
//! Each item type has a demand and a unit cost, and every roll used costs a fixed
//! overhead. A cutting [Pattern] says how many items of each type are cut from one roll.
//!
//! The [ColumnGeneration] loop starts from one pattern per item type and alternates
//! between
//!  - the [RestrictedMaster], a linear program choosing how many rolls to cut with each
//!    known pattern, whose dual prices value one more item of each type,
//!  - the [Satellite], an integer knapsack finding the pattern with the most negative
//!    reduced cost for those prices,
//!
//! until no pattern can lower the master objective. The master is then solved with integer
//! roll counts and expanded into the list of [Roll]s to cut.
//!
//! ## Usage example
//!
//! ```
//! use cutting_stock::{solve, Config, Instance, Termination};
//! // rolls of length 110, five item types
//! let instance = Instance::from_slices(
//!     &[20., 45., 50., 55., 75.], // sizes
//!     110.,                       // raw material size
//!     &[3., 10., 8., 11., 15.],   // unit costs
//!     &[48, 35, 24, 10, 8],       // demand
//! )
//! .unwrap();
//! // a fixed cost of 5 per roll, tolerance of 1e-6
//! let plan = solve(instance, Config::new(5., 1e-6)).unwrap();
//!
//! assert_eq!(plan.termination(), Termination::Converged);
//! assert_eq!(plan.rolls().len() as u64, plan.total_rolls());
//! assert!(plan.rolls().iter().all(|roll| roll.used_length() <= 110.));
//! // every demand is met
//! let produced = plan.produced();
//! assert!(produced.iter().zip([48, 35, 24, 10, 8]).all(|(&p, d)| p >= d));
//! ```
//!
//! ## Driving the loop step by step
//!
//! ```
//! use cutting_stock::{ColumnGeneration, Config, HighsSolver, Instance, State};
//! let instance = Instance::from_slices(&[3., 5.], 10., &[1., 2.], &[4, 3]).unwrap();
//! let config = Config::new(2., 1e-6);
//! let mut run = ColumnGeneration::new(&HighsSolver::new(), instance, config).unwrap();
//! while run.step().unwrap() == State::Iterating {}
//! for record in run.history() {
//!     println!(
//!         "{}: objective {} reduced cost {}",
//!         record.iteration, record.master_objective, record.reduced_cost
//!     );
//! }
//! let plan = run.finalize().unwrap();
//! assert!(plan.objective() >= plan.relaxed_objective().unwrap() - 1e-6);
//! ```

pub use config::Config;
pub use controller::{should_stop, ColumnGeneration, IterationRecord, State, Termination};
pub use error::{ConfigurationError, Error, Result, Stage};
pub use highs::{HighsOptionValue, HighsProgram, HighsSolver, OptionValue};
pub use instance::{Instance, ItemType};
pub use master::{
    DualPrices, IntegralSolution, MasterColumn, MasterMode, RelaxedSolution, RestrictedMaster,
};
pub use pattern::{pattern_cost, pattern_costs, seed_patterns, Pattern};
pub use plan::{materialize, pattern_usage, CuttingPlan, PatternUsage, Roll};
pub use program::{Program, Solver, SolverError};
pub use satellite::{Candidate, Satellite};

mod config;
mod controller;
mod error;
mod highs;
mod instance;
mod master;
mod pattern;
mod plan;
pub mod program;
mod satellite;

/// Solve `instance` with HiGHS: run column generation, then the integral master.
pub fn solve(instance: Instance, config: Config) -> Result<CuttingPlan> {
    solve_with(&HighsSolver::new(), instance, config)
}

/// Same as [solve], with any [Solver]
pub fn solve_with<S: Solver>(
    solver: &S,
    instance: Instance,
    config: Config,
) -> Result<CuttingPlan> {
    let mut run = ColumnGeneration::new(solver, instance, config)?;
    run.finalize()
}
