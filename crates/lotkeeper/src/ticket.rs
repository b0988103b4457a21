//! Parking ticket: an assignment that releases itself on drop.
//!
//! - `park()` → `ParkingTicket` (armed: spots return to the lot on drop)
//! - `ParkingTicket::keep()` → plain `Assignment` (disarmed: release is manual)
//! - `ParkingTicket::release()` → frees now and reports whether anything was freed

use std::sync::Arc;

use crate::allocator::{Allocator, Assignment};
use crate::spot::SpotId;

#[must_use = "dropping a ticket releases its spots immediately"]
pub struct ParkingTicket {
    allocator: Arc<Allocator>,
    assignment: Assignment,
    armed: bool,
}

impl ParkingTicket {
    pub(crate) fn new(allocator: Arc<Allocator>, assignment: Assignment) -> Self {
        Self {
            allocator,
            assignment,
            armed: true,
        }
    }

    pub fn identifier(&self) -> &str {
        self.assignment.identifier()
    }

    pub fn spots(&self) -> &[SpotId] {
        self.assignment.spots()
    }

    pub fn assignment(&self) -> &Assignment {
        &self.assignment
    }

    /// Detach the ticket; the spots stay occupied until released explicitly.
    pub fn keep(mut self) -> Assignment {
        self.armed = false;
        self.assignment.clone()
    }

    /// Release now. Returns `false` if this assignment was already released
    /// through the allocator (even if the identifier has been parked again since).
    pub fn release(mut self) -> bool {
        self.armed = false;
        self.allocator.release_exact(&self.assignment)
    }
}

impl std::fmt::Debug for ParkingTicket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParkingTicket")
            .field("assignment", &self.assignment)
            .field("armed", &self.armed)
            .finish_non_exhaustive()
    }
}

impl Drop for ParkingTicket {
    fn drop(&mut self) {
        if self.armed && !self.allocator.release_exact(&self.assignment) {
            tracing::debug!(
                identifier = %self.assignment.identifier(),
                "Ticket dropped after its assignment was already released"
            );
        }
    }
}
