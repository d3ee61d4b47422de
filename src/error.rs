//! Error types of a cutting stock run
use std::fmt::{Display, Formatter};

use crate::program::SolverError;

/// Result type of this crate
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Why a cutting stock run failed
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The instance or the run parameters are invalid; nothing was solved
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// A solve did not end with an optimal solution. The run cannot continue.
    #[error("{stage} failed at iteration {iteration} (last relaxed objective: {last_objective:?})")]
    Solver {
        /// which program was being built or solved
        stage: Stage,
        /// number of relaxed master solves started so far
        iteration: usize,
        /// objective of the last successful relaxed master solve
        last_objective: Option<f64>,
        /// what the solver reported
        #[source]
        source: SolverError,
    },
}

/// Problems with the input, detected before the column generation loop starts
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigurationError {
    /// There are no item types
    #[error("the instance has no item types")]
    NoItems,
    /// Sizes, demands and unit costs do not describe the same number of item types
    #[error("got {sizes} item sizes, {demands} demands and {unit_costs} unit costs")]
    LengthMismatch {
        /// number of sizes
        sizes: usize,
        /// number of demands
        demands: usize,
        /// number of unit costs
        unit_costs: usize,
    },
    /// The raw material length is zero, negative or not finite
    #[error("the raw material size must be positive, got {0}")]
    NonPositiveCapacity(f64),
    /// An item size is zero, negative or not finite
    #[error("item {item} has a non-positive size {size}")]
    NonPositiveSize {
        /// item index
        item: usize,
        /// offending size
        size: f64,
    },
    /// An item unit cost is negative or not finite
    #[error("item {item} has an invalid unit cost {cost}")]
    InvalidUnitCost {
        /// item index
        item: usize,
        /// offending cost
        cost: f64,
    },
    /// A demanded item is longer than the raw material
    #[error("item {item} of size {size} is demanded but does not fit in a roll of size {capacity}")]
    ItemDoesNotFit {
        /// item index
        item: usize,
        /// item size
        size: f64,
        /// raw material size
        capacity: f64,
    },
    /// An item is so small that the number of copies fitting in one roll cannot be counted
    #[error("item {item} of size {size} fits too many times in a roll of size {capacity}")]
    TooManyCopies {
        /// item index
        item: usize,
        /// item size
        size: f64,
        /// raw material size
        capacity: f64,
    },
    /// The per-roll overhead cost is negative or not finite
    #[error("the per-roll overhead must be finite and non-negative, got {0}")]
    InvalidOverhead(f64),
    /// A tolerance is negative or not finite
    #[error("the {name} tolerance must be finite and non-negative, got {value}")]
    InvalidTolerance {
        /// which tolerance
        name: &'static str,
        /// offending value
        value: f64,
    },
}

/// The step of the run during which a solver failure happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Building the restricted master problem from the seed patterns
    MasterSetup,
    /// Building the knapsack subproblem
    SatelliteSetup,
    /// Adding a generated pattern to the master problem
    AddColumn,
    /// Solving the continuous relaxation of the master problem
    RelaxedMaster,
    /// Solving the knapsack subproblem with the current dual prices
    Satellite,
    /// Solving the master problem with integer roll counts
    IntegralMaster,
}

impl Display for Stage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::MasterSetup => "building the master problem",
            Stage::SatelliteSetup => "building the satellite problem",
            Stage::AddColumn => "adding a column to the master problem",
            Stage::RelaxedMaster => "solving the relaxed master problem",
            Stage::Satellite => "solving the satellite problem",
            Stage::IntegralMaster => "solving the integral master problem",
        };
        f.write_str(name)
    }
}
