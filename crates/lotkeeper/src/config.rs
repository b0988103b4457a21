//! Lot configuration: how many spots of each class to build.

use serde::{Deserialize, Serialize};

use crate::inventory::Inventory;

pub const SMALL_SPOTS_ENV: &str = "LOTKEEPER_SMALL_SPOTS";
pub const MEDIUM_SPOTS_ENV: &str = "LOTKEEPER_MEDIUM_SPOTS";
pub const LARGE_SPOTS_ENV: &str = "LOTKEEPER_LARGE_SPOTS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid spot count for {name}: {value:?} (expected a non-negative integer)")]
    InvalidCount { name: String, value: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotConfig {
    pub small: usize,
    pub medium: usize,
    pub large: usize,
}

impl Default for LotConfig {
    fn default() -> Self {
        Self {
            small: 2,
            medium: 5,
            large: 2,
        }
    }
}

impl LotConfig {
    pub fn new(small: usize, medium: usize, large: usize) -> Self {
        Self {
            small,
            medium,
            large,
        }
    }

    /// Read counts from `LOTKEEPER_{SMALL,MEDIUM,LARGE}_SPOTS`.
    ///
    /// Unset variables keep their default; unparsable ones are an error.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Same as [`from_env`](Self::from_env) with a caller-supplied lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let read = |name: &str, default: usize| match lookup(name) {
            None => Ok(default),
            Some(value) => value
                .trim()
                .parse::<usize>()
                .map_err(|_| ConfigError::InvalidCount {
                    name: name.to_string(),
                    value,
                }),
        };

        Ok(Self {
            small: read(SMALL_SPOTS_ENV, defaults.small)?,
            medium: read(MEDIUM_SPOTS_ENV, defaults.medium)?,
            large: read(LARGE_SPOTS_ENV, defaults.large)?,
        })
    }

    pub fn total(&self) -> usize {
        self.small + self.medium + self.large
    }

    /// Construct the inventory this configuration describes.
    pub fn build(&self) -> Inventory {
        tracing::debug!(
            small = self.small,
            medium = self.medium,
            large = self.large,
            "Building inventory"
        );
        Inventory::new(self.small, self.medium, self.large)
    }
}
