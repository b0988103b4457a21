//! Matching policy: which spot classes may host which request classes, and in
//! what order the allocator tries them.
//!
//! Compatibility is fixed and request-intrinsic. The cascade order is a policy
//! parameter; [`CascadePolicy::default`] is the canonical order:
//!
//! | Request  | Cascade                                   |
//! |----------|-------------------------------------------|
//! | Light    | Small, Medium, Large                      |
//! | Standard | Medium, Large                             |
//! | Bulk     | Large, then 3 x Medium (all-or-nothing)   |

use serde::{Deserialize, Serialize};

use crate::request::RequestClass;
use crate::spot::SpotClass;

/// Whether a spot of class `spot` can ever host a request of class `request`.
pub const fn compatible(request: RequestClass, spot: SpotClass) -> bool {
    match (request, spot) {
        (RequestClass::Light, _) => true,
        (RequestClass::Standard | RequestClass::Bulk, SpotClass::Small) => false,
        (RequestClass::Standard | RequestClass::Bulk, SpotClass::Medium | SpotClass::Large) => {
            true
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PolicyError {
    #[error("{request} requests cannot use {spot} spots")]
    Incompatible {
        request: RequestClass,
        spot: SpotClass,
    },
    #[error("{spot} listed more than once in the {request} cascade")]
    Duplicate {
        request: RequestClass,
        spot: SpotClass,
    },
}

/// Per-request-class ordered list of spot classes tried during allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawCascadePolicy")]
pub struct CascadePolicy {
    light: Vec<SpotClass>,
    standard: Vec<SpotClass>,
    bulk: Vec<SpotClass>,
}

/// Unvalidated wire form; deserialization goes through [`CascadePolicy::new`].
#[derive(Deserialize)]
struct RawCascadePolicy {
    light: Vec<SpotClass>,
    standard: Vec<SpotClass>,
    bulk: Vec<SpotClass>,
}

impl TryFrom<RawCascadePolicy> for CascadePolicy {
    type Error = PolicyError;

    fn try_from(raw: RawCascadePolicy) -> Result<Self, Self::Error> {
        Self::new(raw.light, raw.standard, raw.bulk)
    }
}

impl Default for CascadePolicy {
    fn default() -> Self {
        Self {
            light: vec![SpotClass::Small, SpotClass::Medium, SpotClass::Large],
            standard: vec![SpotClass::Medium, SpotClass::Large],
            bulk: vec![SpotClass::Large, SpotClass::Medium],
        }
    }
}

impl CascadePolicy {
    /// Build a custom policy. Every step must be compatible and listed once.
    ///
    /// Classes left out of a cascade are never tried for that request class.
    pub fn new(
        light: Vec<SpotClass>,
        standard: Vec<SpotClass>,
        bulk: Vec<SpotClass>,
    ) -> Result<Self, PolicyError> {
        let policy = Self {
            light,
            standard,
            bulk,
        };
        for request in RequestClass::ALL {
            policy.validate(request)?;
        }
        Ok(policy)
    }

    fn validate(&self, request: RequestClass) -> Result<(), PolicyError> {
        let order = self.order(request);
        for (i, &spot) in order.iter().enumerate() {
            if !compatible(request, spot) {
                return Err(PolicyError::Incompatible { request, spot });
            }
            if order[..i].contains(&spot) {
                return Err(PolicyError::Duplicate { request, spot });
            }
        }
        Ok(())
    }

    /// Spot classes tried for `request`, most preferred first.
    pub fn order(&self, request: RequestClass) -> &[SpotClass] {
        match request {
            RequestClass::Light => &self.light,
            RequestClass::Standard => &self.standard,
            RequestClass::Bulk => &self.bulk,
        }
    }
}
