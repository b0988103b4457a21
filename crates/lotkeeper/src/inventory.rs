//! Inventory: the fixed-shape set of spots, partitioned by class.
//!
//! Aggregate queries scan spot state on every call. Read outside the
//! allocator's guard they are point-in-time, best-effort values; use
//! [`Allocator::with_inventory`](crate::Allocator::with_inventory) or
//! [`Allocator::snapshot`](crate::Allocator::snapshot) for atomic reads.

use crate::spot::{Spot, SpotClass, SpotId};

#[derive(Debug, Clone)]
pub struct Inventory {
    small: Vec<Spot>,
    medium: Vec<Spot>,
    large: Vec<Spot>,
}

impl Inventory {
    /// Build an inventory with the given number of spots per class.
    ///
    /// Identifiers are sequential per class: `M-0..`, `C-0..`, `B-0..`.
    pub fn new(small: usize, medium: usize, large: usize) -> Self {
        let build = |class: SpotClass, count: usize| -> Vec<Spot> {
            (0..count).map(|i| Spot::new(class, i)).collect()
        };
        Self {
            small: build(SpotClass::Small, small),
            medium: build(SpotClass::Medium, medium),
            large: build(SpotClass::Large, large),
        }
    }

    /// Spots of one class in construction order.
    pub fn spots(&self, class: SpotClass) -> &[Spot] {
        match class {
            SpotClass::Small => &self.small,
            SpotClass::Medium => &self.medium,
            SpotClass::Large => &self.large,
        }
    }

    pub(crate) fn spots_mut(&mut self, class: SpotClass) -> &mut [Spot] {
        match class {
            SpotClass::Small => &mut self.small,
            SpotClass::Medium => &mut self.medium,
            SpotClass::Large => &mut self.large,
        }
    }

    pub fn small_spots(&self) -> &[Spot] {
        &self.small
    }

    pub fn medium_spots(&self) -> &[Spot] {
        &self.medium
    }

    pub fn large_spots(&self) -> &[Spot] {
        &self.large
    }

    fn all_spots(&self) -> impl Iterator<Item = &Spot> {
        self.small.iter().chain(&self.medium).chain(&self.large)
    }

    pub fn total_spots(&self) -> usize {
        self.small.len() + self.medium.len() + self.large.len()
    }

    pub fn capacity(&self, class: SpotClass) -> usize {
        self.spots(class).len()
    }

    pub fn free_spots_count(&self) -> usize {
        self.all_spots().filter(|s| !s.is_occupied()).count()
    }

    pub fn free_in_class(&self, class: SpotClass) -> usize {
        self.spots(class).iter().filter(|s| !s.is_occupied()).count()
    }

    pub fn is_full(&self) -> bool {
        self.free_spots_count() == 0
    }

    pub fn is_empty(&self) -> bool {
        self.free_spots_count() == self.total_spots()
    }

    /// True iff every spot of `class` is occupied. A class with no spots is full.
    pub fn class_full(&self, class: SpotClass) -> bool {
        self.spots(class).iter().all(Spot::is_occupied)
    }

    pub fn small_spots_full(&self) -> bool {
        self.class_full(SpotClass::Small)
    }

    pub fn medium_spots_full(&self) -> bool {
        self.class_full(SpotClass::Medium)
    }

    pub fn large_spots_full(&self) -> bool {
        self.class_full(SpotClass::Large)
    }

    /// Find a spot by identifier.
    pub fn spot(&self, id: &SpotId) -> Option<&Spot> {
        self.all_spots().find(|s| s.id() == id)
    }

    /// Resolve a spot identifier to its class and index.
    pub(crate) fn locate(&self, id: &SpotId) -> Option<(SpotClass, usize)> {
        SpotClass::ALL.into_iter().find_map(|class| {
            self.spots(class)
                .iter()
                .position(|s| s.id() == id)
                .map(|index| (class, index))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_inventory_is_empty() {
        let inventory = Inventory::new(2, 5, 2);
        assert_eq!(inventory.total_spots(), 9);
        assert_eq!(inventory.free_spots_count(), 9);
        assert!(inventory.is_empty());
        assert!(!inventory.is_full());
        assert_eq!(inventory.capacity(SpotClass::Small), 2);
        assert_eq!(inventory.capacity(SpotClass::Medium), 5);
        assert_eq!(inventory.capacity(SpotClass::Large), 2);
    }

    #[test]
    fn ids_are_sequential_per_class() {
        let inventory = Inventory::new(1, 3, 2);
        let ids: Vec<_> = inventory
            .medium_spots()
            .iter()
            .map(|s| s.id().to_string())
            .collect();
        assert_eq!(ids, ["C-0", "C-1", "C-2"]);
        assert_eq!(inventory.small_spots()[0].id().as_str(), "M-0");
        assert_eq!(inventory.large_spots()[1].id().as_str(), "B-1");
    }

    #[test]
    fn zero_spot_inventory_is_both_empty_and_full() {
        let inventory = Inventory::new(0, 0, 0);
        assert_eq!(inventory.total_spots(), 0);
        assert!(inventory.is_empty());
        assert!(inventory.is_full());
        for class in SpotClass::ALL {
            assert!(inventory.class_full(class));
        }
    }

    #[test]
    fn class_full_tracks_occupancy() {
        let mut inventory = Inventory::new(1, 2, 0);
        assert!(!inventory.small_spots_full());
        assert!(inventory.large_spots_full());

        inventory.spots_mut(SpotClass::Small)[0].occupy();
        assert!(inventory.small_spots_full());
        assert_eq!(inventory.free_in_class(SpotClass::Small), 0);
        assert_eq!(inventory.free_spots_count(), 2);

        inventory.spots_mut(SpotClass::Medium)[1].occupy();
        assert!(!inventory.medium_spots_full());
        assert_eq!(inventory.free_in_class(SpotClass::Medium), 1);
    }

    #[test]
    fn locate_and_lookup() {
        let inventory = Inventory::new(1, 2, 1);
        let id = inventory.medium_spots()[1].id().clone();
        assert_eq!(inventory.locate(&id), Some((SpotClass::Medium, 1)));
        assert_eq!(inventory.spot(&id).map(Spot::class), Some(SpotClass::Medium));

        let missing = SpotId::generate(SpotClass::Large, 7);
        assert_eq!(inventory.locate(&missing), None);
        assert!(inventory.spot(&missing).is_none());
    }
}
