//! Parameters of a column generation run
use crate::error::ConfigurationError;

/// Parameters of a column generation run.
///
/// ```
/// use cutting_stock::Config;
/// let config = Config::new(5.0, 1e-6).with_max_iterations(25);
/// assert_eq!(config.overhead(), 5.0);
/// assert_eq!(config.rounding_tolerance(), 1e-6);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    overhead: f64,
    tolerance: f64,
    rounding_tolerance: f64,
    max_iterations: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            overhead: 0.,
            tolerance: 1e-6,
            rounding_tolerance: 1e-6,
            max_iterations: 10,
        }
    }
}

impl Config {
    /// Per-roll overhead `γ` and tolerance `ε`, used both by the stopping rule and
    /// to decide which patterns are used in the final plan.
    pub fn new(overhead: f64, tolerance: f64) -> Self {
        Self {
            overhead,
            tolerance,
            rounding_tolerance: tolerance,
            ..Self::default()
        }
    }

    /// Fixed cost added to every roll, whatever its pattern
    pub fn with_overhead(mut self, overhead: f64) -> Self {
        self.overhead = overhead;
        self
    }

    /// Tolerance of the stopping rule: the loop ends once `reduced cost + overhead >= -tolerance`
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// A pattern is part of the final plan when its roll count exceeds this value
    pub fn with_rounding_tolerance(mut self, rounding_tolerance: f64) -> Self {
        self.rounding_tolerance = rounding_tolerance;
        self
    }

    /// Maximum number of relaxed master solves
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// `γ`
    pub fn overhead(&self) -> f64 {
        self.overhead
    }

    /// `ε` of the stopping rule
    pub fn tolerance(&self) -> f64 {
        self.tolerance
    }

    /// `ε` of the final rounding
    pub fn rounding_tolerance(&self) -> f64 {
        self.rounding_tolerance
    }

    /// Iteration cap
    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Check that every parameter is usable
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if !self.overhead.is_finite() || self.overhead < 0. {
            return Err(ConfigurationError::InvalidOverhead(self.overhead));
        }
        for (name, value) in [
            ("stopping", self.tolerance),
            ("rounding", self.rounding_tolerance),
        ] {
            if !value.is_finite() || value < 0. {
                return Err(ConfigurationError::InvalidTolerance { name, value });
            }
        }
        Ok(())
    }
}
