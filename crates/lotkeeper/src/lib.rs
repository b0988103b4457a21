//! lotkeeper: capacity-aware allocation of typed spots to typed requests.

mod allocator;
mod config;
mod inventory;
mod request;
mod snapshot;
mod spot;
mod ticket;

pub mod policy;

pub use allocator::{AllocateError, Allocator, Assignment};
pub use config::{
    ConfigError, LARGE_SPOTS_ENV, LotConfig, MEDIUM_SPOTS_ENV, SMALL_SPOTS_ENV,
};
pub use inventory::Inventory;
pub use policy::{CascadePolicy, PolicyError};
pub use request::{BULK_MEDIUM_UNITS, Request, RequestClass};
pub use snapshot::{FreeByClass, LotStatus, OccupancySnapshot, UnitsByRequest};
pub use spot::{Spot, SpotClass, SpotId};
pub use ticket::ParkingTicket;
