//! Spot model: a single capacity unit of a fixed class.

use serde::{Deserialize, Serialize};

/// Size class of a spot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpotClass {
    /// Motorcycle-sized.
    Small,
    /// Car-sized.
    Medium,
    /// Van-sized.
    Large,
}

impl SpotClass {
    pub const ALL: [SpotClass; 3] = [SpotClass::Small, SpotClass::Medium, SpotClass::Large];

    /// Prefix used for generated spot identifiers (`M-0`, `C-0`, `B-0`).
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Small => "M",
            Self::Medium => "C",
            Self::Large => "B",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

impl std::fmt::Display for SpotClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifier of a spot, unique within one inventory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpotId(String);

impl SpotId {
    pub(crate) fn generate(class: SpotClass, index: usize) -> Self {
        Self(format!("{}-{}", class.id_prefix(), index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SpotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// One allocatable unit.
///
/// The occupied flag is only flipped by the allocator while it holds its guard;
/// everything outside the crate sees spots read-only.
#[derive(Debug, Clone, Serialize)]
pub struct Spot {
    id: SpotId,
    class: SpotClass,
    occupied: bool,
}

impl Spot {
    pub(crate) fn new(class: SpotClass, index: usize) -> Self {
        Self {
            id: SpotId::generate(class, index),
            class,
            occupied: false,
        }
    }

    pub fn id(&self) -> &SpotId {
        &self.id
    }

    pub fn class(&self) -> SpotClass {
        self.class
    }

    pub fn is_occupied(&self) -> bool {
        self.occupied
    }

    pub(crate) fn occupy(&mut self) {
        debug_assert!(!self.occupied, "spot {} occupied twice", self.id);
        self.occupied = true;
    }

    pub(crate) fn free(&mut self) {
        debug_assert!(self.occupied, "spot {} freed while free", self.id);
        self.occupied = false;
    }
}
