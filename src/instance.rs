//! Item types and raw material of a cutting stock instance
use crate::error::ConfigurationError;

/// One kind of item to cut
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemType {
    /// length of one item
    pub size: f64,
    /// number of items required
    pub demand: u32,
    /// cost of one item when it is cut
    pub unit_cost: f64,
}

/// A validated cutting stock instance: item types indexed `0..m` and the length of
/// the raw material rolls they are cut from.
#[derive(Debug, Clone, PartialEq)]
pub struct Instance {
    raw_material_size: f64,
    sizes: Vec<f64>,
    demands: Vec<u32>,
    unit_costs: Vec<f64>,
    copies_per_roll: Vec<u32>,
}

impl Instance {
    /// Build an instance from one entry per item type
    pub fn new(raw_material_size: f64, items: &[ItemType]) -> Result<Self, ConfigurationError> {
        Self::from_slices(
            &items.iter().map(|item| item.size).collect::<Vec<_>>(),
            raw_material_size,
            &items.iter().map(|item| item.unit_cost).collect::<Vec<_>>(),
            &items.iter().map(|item| item.demand).collect::<Vec<_>>(),
        )
    }

    /// Build an instance from parallel slices, the way the run entry point receives them
    ///
    /// ```
    /// use cutting_stock::Instance;
    /// let instance = Instance::from_slices(&[20., 45.], 110., &[3., 10.], &[48, 35]).unwrap();
    /// assert_eq!(instance.len(), 2);
    /// assert!(Instance::from_slices(&[20., 45.], 110., &[3.], &[48, 35]).is_err());
    /// ```
    pub fn from_slices(
        item_sizes: &[f64],
        raw_material_size: f64,
        unit_costs: &[f64],
        demand: &[u32],
    ) -> Result<Self, ConfigurationError> {
        if item_sizes.len() != demand.len() || item_sizes.len() != unit_costs.len() {
            return Err(ConfigurationError::LengthMismatch {
                sizes: item_sizes.len(),
                demands: demand.len(),
                unit_costs: unit_costs.len(),
            });
        }
        if item_sizes.is_empty() {
            return Err(ConfigurationError::NoItems);
        }
        if !raw_material_size.is_finite() || raw_material_size <= 0. {
            return Err(ConfigurationError::NonPositiveCapacity(raw_material_size));
        }
        let mut copies_per_roll = Vec::with_capacity(item_sizes.len());
        for (item, ((&size, &cost), &demand)) in
            item_sizes.iter().zip(unit_costs).zip(demand).enumerate()
        {
            if !size.is_finite() || size <= 0. {
                return Err(ConfigurationError::NonPositiveSize { item, size });
            }
            if !cost.is_finite() || cost < 0. {
                return Err(ConfigurationError::InvalidUnitCost { item, cost });
            }
            if demand > 0 && size > raw_material_size {
                return Err(ConfigurationError::ItemDoesNotFit {
                    item,
                    size,
                    capacity: raw_material_size,
                });
            }
            let Ok(copies) = u32::try_from((raw_material_size / size).floor() as u64) else {
                return Err(ConfigurationError::TooManyCopies {
                    item,
                    size,
                    capacity: raw_material_size,
                });
            };
            copies_per_roll.push(copies);
        }
        Ok(Self {
            raw_material_size,
            sizes: item_sizes.to_vec(),
            demands: demand.to_vec(),
            unit_costs: unit_costs.to_vec(),
            copies_per_roll,
        })
    }

    /// Number of item types `m`
    pub fn len(&self) -> usize {
        self.sizes.len()
    }

    /// Always false for a validated instance
    pub fn is_empty(&self) -> bool {
        self.sizes.is_empty()
    }

    /// Length of a raw material roll
    pub fn raw_material_size(&self) -> f64 {
        self.raw_material_size
    }

    /// Size of each item type
    pub fn sizes(&self) -> &[f64] {
        &self.sizes
    }

    /// Demand of each item type
    pub fn demands(&self) -> &[u32] {
        &self.demands
    }

    /// Unit cost of each item type
    pub fn unit_costs(&self) -> &[f64] {
        &self.unit_costs
    }

    /// How many items of each type fit in one roll on their own; zero for oversized items
    pub fn copies_per_roll(&self) -> &[u32] {
        &self.copies_per_roll
    }

    /// The item type at the given index
    pub fn item(&self, index: usize) -> Option<ItemType> {
        Some(ItemType {
            size: *self.sizes.get(index)?,
            demand: self.demands[index],
            unit_cost: self.unit_costs[index],
        })
    }

    /// All item types, in index order
    pub fn items(&self) -> impl Iterator<Item = ItemType> + '_ {
        (0..self.len()).filter_map(move |i| self.item(i))
    }
}
