//! Turning integer roll counts into physical rolls
use std::cmp::Ordering;

use crate::controller::Termination;
use crate::pattern::Pattern;

/// One raw material roll as it is cut: the sizes of its items, ascending
#[derive(Debug, Clone, PartialEq)]
pub struct Roll {
    sizes: Vec<f64>,
}

impl Roll {
    /// A roll with the given item sizes, in any order
    pub fn new(mut sizes: Vec<f64>) -> Self {
        sizes.sort_by(f64::total_cmp);
        Self { sizes }
    }

    /// Item sizes, ascending
    pub fn sizes(&self) -> &[f64] {
        &self.sizes
    }

    /// Length of raw material used
    pub fn used_length(&self) -> f64 {
        self.sizes.iter().sum()
    }

    /// Number of items cut from the roll
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// True for a roll without any item
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    fn cmp_sizes(&self, other: &Self) -> Ordering {
        for (a, b) in self.sizes.iter().zip(&other.sizes) {
            match a.total_cmp(b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        self.sizes.len().cmp(&other.sizes.len())
    }
}

/// How many rolls are cut with one pattern
#[derive(Debug, Clone, PartialEq)]
pub struct PatternUsage {
    /// index of the pattern (and of its master column)
    pub index: usize,
    /// the pattern
    pub pattern: Pattern,
    /// its cost, without the per-roll overhead
    pub cost: f64,
    /// number of rolls cut with it
    pub rolls: u64,
}

fn roll_count(value: f64, tolerance: f64) -> Option<u64> {
    (value > tolerance).then(|| value.round() as u64)
}

/// Patterns whose roll count exceeds `tolerance`, with their rounded roll count
pub fn pattern_usage(
    values: &[f64],
    patterns: &[Pattern],
    costs: &[f64],
    tolerance: f64,
) -> Vec<PatternUsage> {
    values
        .iter()
        .zip(patterns.iter().zip(costs))
        .enumerate()
        .filter_map(|(index, (&value, (pattern, &cost)))| {
            roll_count(value, tolerance).map(|rolls| PatternUsage {
                index,
                pattern: pattern.clone(),
                cost,
                rolls,
            })
        })
        .collect()
}

/// Expand integer roll counts into rolls: for every pattern `k` with `values[k] > tolerance`,
/// `round(values[k])` rolls holding that pattern's items.
///
/// Rolls are sorted lexicographically by their (ascending) sizes.
///
/// ```
/// use cutting_stock::{materialize, Pattern};
/// let patterns = [Pattern::new(vec![5, 0]), Pattern::new(vec![1, 2])];
/// let rolls = materialize(&[1.0000001, 2.], &patterns, &[20., 45.], 1e-6);
/// let sizes: Vec<&[f64]> = rolls.iter().map(|r| r.sizes()).collect();
/// assert_eq!(sizes, vec![
///     &[20., 20., 20., 20., 20.][..],
///     &[20., 45., 45.][..],
///     &[20., 45., 45.][..],
/// ]);
/// ```
pub fn materialize(
    values: &[f64],
    patterns: &[Pattern],
    item_sizes: &[f64],
    tolerance: f64,
) -> Vec<Roll> {
    let mut rolls: Vec<Roll> = values
        .iter()
        .zip(patterns)
        .filter_map(|(&value, pattern)| roll_count(value, tolerance).map(|n| (n, pattern)))
        .flat_map(|(n, pattern)| {
            let roll = Roll::new(pattern.item_sizes(item_sizes));
            std::iter::repeat(roll).take(n as usize)
        })
        .collect();
    rolls.sort_by(Roll::cmp_sizes);
    rolls
}

/// The outcome of a column generation run
#[derive(Debug, Clone, PartialEq)]
pub struct CuttingPlan {
    pub(crate) num_items: usize,
    pub(crate) rolls: Vec<Roll>,
    pub(crate) usage: Vec<PatternUsage>,
    pub(crate) objective: f64,
    pub(crate) relaxed_objective: Option<f64>,
    pub(crate) iterations: usize,
    pub(crate) termination: Termination,
}

impl CuttingPlan {
    /// Every roll to cut, sorted
    pub fn rolls(&self) -> &[Roll] {
        &self.rolls
    }

    /// Consume the plan, keeping only the rolls
    pub fn into_rolls(self) -> Vec<Roll> {
        self.rolls
    }

    /// The patterns in use and how many rolls each one cuts
    pub fn usage(&self) -> &[PatternUsage] {
        &self.usage
    }

    /// Objective of the integral master problem: total pattern cost plus overhead
    pub fn objective(&self) -> f64 {
        self.objective
    }

    /// Objective of the last relaxed master problem, a lower bound on [Self::objective]
    /// when the loop converged
    pub fn relaxed_objective(&self) -> Option<f64> {
        self.relaxed_objective
    }

    /// Number of relaxed master solves
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Why the loop stopped
    pub fn termination(&self) -> Termination {
        self.termination
    }

    /// Total number of rolls
    pub fn total_rolls(&self) -> u64 {
        self.usage.iter().map(|u| u.rolls).sum()
    }

    /// Number of items of each type produced by the plan, one entry per item type
    pub fn produced(&self) -> Vec<u64> {
        let mut produced = vec![0; self.num_items];
        for usage in &self.usage {
            for (item, count) in usage.pattern.nonzero() {
                produced[item] += usage.rolls * u64::from(count);
            }
        }
        produced
    }
}

#[cfg(test)]
mod test {
    use super::*;

    const SIZES: [f64; 3] = [20., 45., 50.];

    #[test]
    fn test_rolls_are_sorted() {
        let patterns = [
            Pattern::new(vec![0, 0, 2]),
            Pattern::new(vec![1, 2, 0]),
            Pattern::new(vec![3, 0, 1]),
        ];
        let rolls = materialize(&[1., 1., 2.], &patterns, &SIZES, 1e-6);
        let sizes: Vec<&[f64]> = rolls.iter().map(|r| r.sizes()).collect();
        assert_eq!(
            sizes,
            vec![
                &[20., 20., 20., 50.][..],
                &[20., 20., 20., 50.][..],
                &[20., 45., 45.][..],
                &[50., 50.][..],
            ]
        );
    }

    #[test]
    fn test_values_below_tolerance_are_ignored() {
        let patterns = [Pattern::new(vec![1, 0, 0]), Pattern::new(vec![0, 1, 0])];
        let rolls = materialize(&[1e-7, 0.9999996], &patterns, &SIZES, 1e-6);
        assert_eq!(rolls, vec![Roll::new(vec![45.])]);
        // a looser tolerance drops more
        assert!(materialize(&[0.4, 0.4], &patterns, &SIZES, 0.5).is_empty());
    }

    #[test]
    fn test_shorter_roll_sorts_first() {
        let a = Roll::new(vec![20., 45.]);
        let b = Roll::new(vec![45., 20., 20.]);
        assert_eq!(a.cmp_sizes(&b), Ordering::Greater);
        assert_eq!(Roll::new(vec![20.]).cmp_sizes(&Roll::new(vec![20., 20.])), Ordering::Less);
        assert_eq!(b.sizes(), &[20., 20., 45.]);
        assert_eq!(b.used_length(), 85.);
    }

    #[test]
    fn test_usage_and_production() {
        let patterns = [
            Pattern::new(vec![5, 0, 0]),
            Pattern::new(vec![1, 2, 0]),
            Pattern::new(vec![0, 0, 2]),
        ];
        let costs = [15., 23., 16.];
        let usage = pattern_usage(&[2., 0., 3.], &patterns, &costs, 1e-6);
        assert_eq!(usage.len(), 2);
        assert_eq!(usage[1].index, 2);
        assert_eq!(usage[1].cost, 16.);
        assert_eq!(usage[1].rolls, 3);

        let plan = CuttingPlan {
            num_items: 3,
            rolls: materialize(&[2., 0., 3.], &patterns, &SIZES, 1e-6),
            usage,
            objective: 92.,
            relaxed_objective: Some(90.),
            iterations: 1,
            termination: Termination::Converged,
        };
        assert_eq!(plan.total_rolls(), 5);
        assert_eq!(plan.rolls().len(), 5);
        assert_eq!(plan.produced(), vec![10, 0, 6]);
    }

    #[test]
    fn test_production_of_an_empty_plan() {
        let plan = CuttingPlan {
            num_items: 2,
            rolls: Vec::new(),
            usage: Vec::new(),
            objective: 0.,
            relaxed_objective: Some(0.),
            iterations: 1,
            termination: Termination::Converged,
        };
        assert_eq!(plan.produced(), vec![0, 0]);
        assert_eq!(plan.total_rolls(), 0);
    }
}
