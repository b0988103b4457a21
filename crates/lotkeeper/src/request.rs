//! Requests (vehicles) asking for capacity.

use serde::{Deserialize, Serialize};

use crate::policy::compatible;
use crate::spot::SpotClass;

/// Units a Bulk request consumes when it falls back to Medium spots.
pub const BULK_MEDIUM_UNITS: usize = 3;

/// Class of a request. All behavioral variation between vehicles hangs off this tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestClass {
    /// Motorcycle-equivalent.
    Light,
    /// Car-equivalent.
    Standard,
    /// Van-equivalent.
    Bulk,
}

impl RequestClass {
    pub const ALL: [RequestClass; 3] = [
        RequestClass::Light,
        RequestClass::Standard,
        RequestClass::Bulk,
    ];

    /// Number of Medium spots consumed when this class is placed on Medium spots.
    pub fn units_required_if_using_medium_spots(&self) -> usize {
        match self {
            Self::Light | Self::Standard => 1,
            Self::Bulk => BULK_MEDIUM_UNITS,
        }
    }

    /// Units consumed on a spot of `spot_class`, or `None` if incompatible.
    pub fn units_on(&self, spot_class: SpotClass) -> Option<usize> {
        if !compatible(*self, spot_class) {
            return None;
        }
        match spot_class {
            SpotClass::Medium => Some(self.units_required_if_using_medium_spots()),
            SpotClass::Small | SpotClass::Large => Some(1),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Standard => "standard",
            Self::Bulk => "bulk",
        }
    }

    /// Everyday vehicle name for this class.
    pub fn vehicle_kind(&self) -> &'static str {
        match self {
            Self::Light => "moto",
            Self::Standard => "car",
            Self::Bulk => "van",
        }
    }
}

impl std::fmt::Display for RequestClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A demand for capacity, identified by a caller-chosen plate-like string.
///
/// Identifier uniqueness is the caller's concern; the allocator keys
/// assignments by identifier, so two requests with the same identifier
/// refer to the same parked vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Request {
    identifier: String,
    class: RequestClass,
}

impl Request {
    pub fn new(identifier: impl Into<String>, class: RequestClass) -> Self {
        Self {
            identifier: identifier.into(),
            class,
        }
    }

    pub fn moto(identifier: impl Into<String>) -> Self {
        Self::new(identifier, RequestClass::Light)
    }

    pub fn car(identifier: impl Into<String>) -> Self {
        Self::new(identifier, RequestClass::Standard)
    }

    pub fn van(identifier: impl Into<String>) -> Self {
        Self::new(identifier, RequestClass::Bulk)
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn class(&self) -> RequestClass {
        self.class
    }

    pub fn units_required_if_using_medium_spots(&self) -> usize {
        self.class.units_required_if_using_medium_spots()
    }

    pub fn fits_small(&self) -> bool {
        compatible(self.class, SpotClass::Small)
    }

    pub fn fits_medium(&self) -> bool {
        compatible(self.class, SpotClass::Medium)
    }

    pub fn fits_large(&self) -> bool {
        compatible(self.class, SpotClass::Large)
    }
}
