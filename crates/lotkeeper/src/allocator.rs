//! Allocator: matches requests to spots and reclaims them on release.
//!
//! The allocator owns the inventory and the request -> spots mapping together
//! behind one mutex. `allocate` and `release` each run entirely inside that
//! critical section, so the Bulk multi-unit path decides and commits across
//! three spots without another caller observing the intermediate state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::Serialize;

use crate::config::LotConfig;
use crate::inventory::Inventory;
use crate::policy::CascadePolicy;
use crate::request::{Request, RequestClass};
use crate::snapshot::OccupancySnapshot;
use crate::spot::{SpotClass, SpotId};
use crate::ticket::ParkingTicket;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AllocateError {
    #[error("{identifier} is already parked")]
    AlreadyParked { identifier: String },
    #[error("no capacity for {class} request {identifier}")]
    NoCapacity {
        identifier: String,
        class: RequestClass,
    },
}

/// Active binding of one request to the spots it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    /// Distinguishes successive assignments of the same identifier.
    #[serde(skip)]
    serial: u64,
    identifier: String,
    class: RequestClass,
    spot_class: SpotClass,
    spots: Vec<SpotId>,
}

impl Assignment {
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn class(&self) -> RequestClass {
        self.class
    }

    /// Class of the spots held (all spots of one assignment share a class).
    pub fn spot_class(&self) -> SpotClass {
        self.spot_class
    }

    /// Spots held, in the order they were reserved. Never empty.
    pub fn spots(&self) -> &[SpotId] {
        &self.spots
    }

    pub fn units(&self) -> usize {
        self.spots.len()
    }
}

/// Inventory plus assignments; only ever touched under the allocator's mutex.
pub(crate) struct LotState {
    pub(crate) inventory: Inventory,
    pub(crate) assignments: HashMap<String, Assignment>,
    next_serial: u64,
}

impl LotState {
    /// Pick the spots for `class` without mutating anything.
    ///
    /// Walks the cascade; within a spot class, first-fit by construction order.
    /// A step that needs several units succeeds only if all of them are free.
    fn plan(
        &self,
        policy: &CascadePolicy,
        class: RequestClass,
    ) -> Option<(SpotClass, Vec<usize>)> {
        for &spot_class in policy.order(class) {
            let Some(units) = class.units_on(spot_class) else {
                continue;
            };
            let free: Vec<usize> = self
                .inventory
                .spots(spot_class)
                .iter()
                .enumerate()
                .filter(|(_, spot)| !spot.is_occupied())
                .map(|(index, _)| index)
                .take(units)
                .collect();
            if free.len() == units {
                return Some((spot_class, free));
            }
            tracing::trace!(
                %class,
                %spot_class,
                needed = units,
                found = free.len(),
                "Cascade step has no room"
            );
        }
        None
    }

    fn commit(
        &mut self,
        request: &Request,
        spot_class: SpotClass,
        indices: &[usize],
    ) -> Assignment {
        let spots = self.inventory.spots_mut(spot_class);
        let ids = indices
            .iter()
            .map(|&index| {
                spots[index].occupy();
                spots[index].id().clone()
            })
            .collect();

        self.next_serial += 1;
        let assignment = Assignment {
            serial: self.next_serial,
            identifier: request.identifier().to_string(),
            class: request.class(),
            spot_class,
            spots: ids,
        };
        self.assignments
            .insert(assignment.identifier.clone(), assignment.clone());
        assignment
    }

    fn free(&mut self, assignment: &Assignment) {
        for id in &assignment.spots {
            match self.inventory.locate(id) {
                Some((class, index)) => self.inventory.spots_mut(class)[index].free(),
                None => {
                    tracing::error!(
                        spot = %id,
                        identifier = %assignment.identifier,
                        "Assigned spot missing from inventory"
                    );
                }
            }
        }
    }

    pub(crate) fn occupied_units(&self, class: RequestClass) -> usize {
        self.assignments
            .values()
            .filter(|a| a.class == class)
            .map(Assignment::units)
            .sum()
    }
}

/// Stateful allocation engine over one inventory.
///
/// Safe to share across threads (`Arc<Allocator>`); every operation is
/// serialized by a single mutex held only for a bounded scan plus map update.
pub struct Allocator {
    state: Mutex<LotState>,
    policy: CascadePolicy,
}

impl Allocator {
    pub fn new(inventory: Inventory) -> Self {
        Self {
            state: Mutex::new(LotState {
                inventory,
                assignments: HashMap::new(),
                next_serial: 0,
            }),
            policy: CascadePolicy::default(),
        }
    }

    pub fn from_config(config: &LotConfig) -> Self {
        Self::new(config.build())
    }

    /// Replace the cascade order used for matching.
    pub fn with_policy(mut self, policy: CascadePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn policy(&self) -> &CascadePolicy {
        &self.policy
    }

    /// Lock the lot state. A poisoned mutex is recovered: commits happen only
    /// after a complete plan, so the state behind it is never half-applied.
    fn lock_state(&self) -> MutexGuard<'_, LotState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            tracing::error!("Allocator mutex poisoned - recovering lot state");
            poisoned.into_inner()
        })
    }

    /// Allocate spots for `request`. Returns `false` when denied.
    ///
    /// Denial covers both "no capacity" and "already parked"; use
    /// [`try_allocate`](Self::try_allocate) to tell them apart.
    pub fn allocate(&self, request: &Request) -> bool {
        self.try_allocate(request).is_ok()
    }

    /// Allocate spots for `request`, returning the recorded assignment.
    ///
    /// Either every spot of the chosen cascade step is occupied and recorded,
    /// or nothing changes.
    pub fn try_allocate(&self, request: &Request) -> Result<Assignment, AllocateError> {
        let mut state = self.lock_state();

        if state.assignments.contains_key(request.identifier()) {
            tracing::warn!(identifier = %request.identifier(), "Request already holds an assignment");
            return Err(AllocateError::AlreadyParked {
                identifier: request.identifier().to_string(),
            });
        }

        let Some((spot_class, indices)) = state.plan(&self.policy, request.class()) else {
            tracing::debug!(
                identifier = %request.identifier(),
                class = %request.class(),
                "Allocation denied - no capacity"
            );
            return Err(AllocateError::NoCapacity {
                identifier: request.identifier().to_string(),
                class: request.class(),
            });
        };

        let assignment = state.commit(request, spot_class, &indices);
        tracing::debug!(
            identifier = %assignment.identifier,
            class = %assignment.class,
            spots = ?assignment.spots,
            "Allocated"
        );
        Ok(assignment)
    }

    /// Allocate and wrap the assignment in a ticket that releases on drop.
    pub fn park(self: &Arc<Self>, request: &Request) -> Result<ParkingTicket, AllocateError> {
        let assignment = self.try_allocate(request)?;
        Ok(ParkingTicket::new(Arc::clone(self), assignment))
    }

    /// Free every spot held by `request`. Unknown requests are a no-op.
    pub fn release(&self, request: &Request) -> Option<Assignment> {
        self.release_identifier(request.identifier())
    }

    /// Same as [`release`](Self::release), keyed by identifier.
    pub fn release_identifier(&self, identifier: &str) -> Option<Assignment> {
        let mut state = self.lock_state();
        let Some(assignment) = state.assignments.remove(identifier) else {
            tracing::trace!(%identifier, "Release of unknown request ignored");
            return None;
        };
        state.free(&assignment);
        tracing::debug!(%identifier, spots = ?assignment.spots, "Released");
        Some(assignment)
    }

    /// Release `expected` only if it is still the identifier's current
    /// assignment. Returns whether anything was freed.
    pub(crate) fn release_exact(&self, expected: &Assignment) -> bool {
        let mut state = self.lock_state();
        if state.assignments.get(&expected.identifier) != Some(expected) {
            tracing::debug!(
                identifier = %expected.identifier,
                "Assignment changed since ticket issue, not releasing"
            );
            return false;
        }
        state.assignments.remove(&expected.identifier);
        state.free(expected);
        tracing::debug!(
            identifier = %expected.identifier,
            spots = ?expected.spots,
            "Released by ticket"
        );
        true
    }

    /// Spot units currently held by all requests of `class`.
    ///
    /// A Bulk request on a Large spot counts 1; on Medium spots it counts 3.
    pub fn occupied_units_by_class(&self, class: RequestClass) -> usize {
        self.lock_state().occupied_units(class)
    }

    pub fn assignment(&self, identifier: &str) -> Option<Assignment> {
        self.lock_state().assignments.get(identifier).cloned()
    }

    pub fn is_parked(&self, identifier: &str) -> bool {
        self.lock_state().assignments.contains_key(identifier)
    }

    pub fn active_assignments(&self) -> usize {
        self.lock_state().assignments.len()
    }

    /// Run `f` against the inventory while holding the allocator's guard.
    ///
    /// The guard is not reentrant: `f` must not call back into this
    /// allocator, or it deadlocks.
    pub fn with_inventory<R>(&self, f: impl FnOnce(&Inventory) -> R) -> R {
        f(&self.lock_state().inventory)
    }

    pub fn total_spots(&self) -> usize {
        self.with_inventory(Inventory::total_spots)
    }

    pub fn free_spots_count(&self) -> usize {
        self.with_inventory(Inventory::free_spots_count)
    }

    pub fn is_full(&self) -> bool {
        self.with_inventory(Inventory::is_full)
    }

    pub fn is_empty(&self) -> bool {
        self.with_inventory(Inventory::is_empty)
    }

    pub fn class_full(&self, class: SpotClass) -> bool {
        self.with_inventory(|inventory| inventory.class_full(class))
    }

    /// Consistent view of the whole lot, taken under the guard.
    pub fn snapshot(&self) -> OccupancySnapshot {
        OccupancySnapshot::capture(&self.lock_state())
    }
}
