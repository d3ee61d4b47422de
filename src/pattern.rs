//! Cutting patterns and their cost
use crate::instance::Instance;

/// How one roll is cut: `counts()[i]` items of type `i`.
///
/// Patterns built by this crate always fit in a roll
/// (`Σ counts[i] * size[i] <= raw material size`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Pattern(Vec<u32>);

impl Pattern {
    /// A pattern with the given number of items of each type
    pub fn new(counts: Vec<u32>) -> Self {
        Self(counts)
    }

    /// The initial pattern for an item type: as many copies of that item as fit in one roll
    pub fn seed(instance: &Instance, item: usize) -> Self {
        let mut counts = vec![0; instance.len()];
        counts[item] = instance.copies_per_roll()[item];
        Self(counts)
    }

    /// Number of items of each type
    pub fn counts(&self) -> &[u32] {
        &self.0
    }

    /// Number of item types the pattern is defined over
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// True when the pattern has no item types at all
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of items cut from one roll
    pub fn total_items(&self) -> u64 {
        self.0.iter().map(|&n| u64::from(n)).sum()
    }

    /// `(item, count)` for every item type present in the pattern
    pub fn nonzero(&self) -> impl Iterator<Item = (usize, u32)> + '_ {
        self.0
            .iter()
            .copied()
            .enumerate()
            .filter(|&(_, count)| count > 0)
    }

    /// Length of raw material consumed by the pattern
    pub fn used_length(&self, item_sizes: &[f64]) -> f64 {
        self.nonzero()
            .map(|(item, count)| f64::from(count) * item_sizes[item])
            .sum()
    }

    /// Whether the pattern can be cut from one roll of the instance
    pub fn fits(&self, instance: &Instance) -> bool {
        let capacity = instance.raw_material_size();
        // absorb the rounding of the float sum, relative to the roll size
        self.len() == instance.len()
            && self.used_length(instance.sizes()) <= capacity * (1. + 1e-12)
    }

    /// The size of every item cut with this pattern, ascending
    pub fn item_sizes(&self, item_sizes: &[f64]) -> Vec<f64> {
        let mut sizes: Vec<f64> = self
            .nonzero()
            .flat_map(|(item, count)| std::iter::repeat(item_sizes[item]).take(count as usize))
            .collect();
        sizes.sort_by(f64::total_cmp);
        sizes
    }
}

/// One seed pattern per item type, each maximally filled with that item
pub fn seed_patterns(instance: &Instance) -> Vec<Pattern> {
    (0..instance.len())
        .map(|item| Pattern::seed(instance, item))
        .collect()
}

/// Cost of one roll cut with `pattern`: `Σ counts[i] * unit_costs[i]`.
/// `None` when that cost is negative, such patterns are never used.
pub fn pattern_cost(pattern: &Pattern, unit_costs: &[f64]) -> Option<f64> {
    let cost: f64 = pattern
        .nonzero()
        .map(|(item, count)| f64::from(count) * unit_costs[item])
        .sum();
    (cost >= 0.).then_some(cost)
}

/// The cost of each pattern, in order, leaving out the patterns with a negative cost
pub fn pattern_costs(patterns: &[Pattern], unit_costs: &[f64]) -> Vec<f64> {
    patterns
        .iter()
        .filter_map(|pattern| pattern_cost(pattern, unit_costs))
        .collect()
}
