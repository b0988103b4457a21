//! Occupancy snapshot types for reporting collaborators.

use serde::{Deserialize, Serialize};

use crate::allocator::LotState;
use crate::request::RequestClass;
use crate::spot::SpotClass;

/// Coarse fill state of the lot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LotStatus {
    /// Every spot is free (includes a lot with no spots at all)
    Empty,
    /// Some spots taken, some free
    Available,
    /// No free spot left
    Full,
}

/// Free spots per spot class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeByClass {
    pub small: usize,
    pub medium: usize,
    pub large: usize,
}

impl FreeByClass {
    pub fn get(&self, class: SpotClass) -> usize {
        match class {
            SpotClass::Small => self.small,
            SpotClass::Medium => self.medium,
            SpotClass::Large => self.large,
        }
    }
}

/// Spot units held per request class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitsByRequest {
    pub light: usize,
    pub standard: usize,
    pub bulk: usize,
}

impl UnitsByRequest {
    pub fn get(&self, class: RequestClass) -> usize {
        match class {
            RequestClass::Light => self.light,
            RequestClass::Standard => self.standard,
            RequestClass::Bulk => self.bulk,
        }
    }

    pub fn total(&self) -> usize {
        self.light + self.standard + self.bulk
    }
}

/// Point-in-time view of the lot, captured under the allocator's guard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancySnapshot {
    pub status: LotStatus,
    pub total_spots: usize,
    pub free_spots: usize,
    pub free_by_class: FreeByClass,
    pub units_by_request: UnitsByRequest,
    pub active_assignments: usize,
}

impl OccupancySnapshot {
    pub(crate) fn capture(state: &LotState) -> Self {
        let inventory = &state.inventory;
        let total_spots = inventory.total_spots();
        let free_spots = inventory.free_spots_count();

        let status = if free_spots == total_spots {
            LotStatus::Empty
        } else if free_spots == 0 {
            LotStatus::Full
        } else {
            LotStatus::Available
        };

        Self {
            status,
            total_spots,
            free_spots,
            free_by_class: FreeByClass {
                small: inventory.free_in_class(SpotClass::Small),
                medium: inventory.free_in_class(SpotClass::Medium),
                large: inventory.free_in_class(SpotClass::Large),
            },
            units_by_request: UnitsByRequest {
                light: state.occupied_units(RequestClass::Light),
                standard: state.occupied_units(RequestClass::Standard),
                bulk: state.occupied_units(RequestClass::Bulk),
            },
            active_assignments: state.assignments.len(),
        }
    }

    pub fn occupied_units(&self) -> usize {
        self.units_by_request.total()
    }

    pub fn is_full(&self) -> bool {
        self.status == LotStatus::Full
    }

    pub fn is_empty(&self) -> bool {
        self.status == LotStatus::Empty
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Allocator, Inventory, Request};

    #[test]
    fn lot_status_serializes_screaming_snake_case() {
        insta::assert_json_snapshot!(
            [LotStatus::Empty, LotStatus::Available, LotStatus::Full],
            @r#"
        [
          "EMPTY",
          "AVAILABLE",
          "FULL"
        ]
        "#
        );
    }

    #[test]
    fn lot_status_deserializes() {
        assert_eq!(
            serde_json::from_str::<LotStatus>("\"AVAILABLE\"").unwrap(),
            LotStatus::Available
        );
    }

    #[test]
    fn zero_spot_lot_reports_empty() {
        let allocator = Allocator::new(Inventory::new(0, 0, 0));
        let snapshot = allocator.snapshot();
        assert_eq!(snapshot.status, LotStatus::Empty);
        assert!(snapshot.is_empty());
        assert!(!snapshot.is_full());
    }

    #[test]
    fn status_follows_occupancy() {
        let allocator = Allocator::new(Inventory::new(1, 0, 1));
        assert!(allocator.allocate(&Request::moto("M1")));
        assert_eq!(allocator.snapshot().status, LotStatus::Available);
        assert!(allocator.allocate(&Request::car("C1")));
        assert!(allocator.snapshot().is_full());
    }

    #[test]
    fn snapshot_counts() {
        let allocator = Allocator::new(Inventory::new(2, 5, 2));
        assert!(allocator.allocate(&Request::moto("MOTO-123")));
        assert!(allocator.allocate(&Request::van("VAN-001")));
        assert!(allocator.allocate(&Request::van("VAN-002")));
        assert!(allocator.allocate(&Request::van("VAN-003")));

        let snapshot = allocator.snapshot();
        assert_eq!(snapshot.free_by_class.get(SpotClass::Medium), 2);
        assert_eq!(snapshot.units_by_request.get(RequestClass::Bulk), 5);
        assert_eq!(snapshot.occupied_units(), 6);

        insta::assert_json_snapshot!(snapshot, @r#"
        {
          "status": "AVAILABLE",
          "total_spots": 9,
          "free_spots": 3,
          "free_by_class": {
            "small": 1,
            "medium": 2,
            "large": 0
          },
          "units_by_request": {
            "light": 1,
            "standard": 0,
            "bulk": 5
          },
          "active_assignments": 4
        }
        "#);
    }
}
