use serde::Deserialize;
use thiserror::Error;

use crate::cache::addr::ADDRESS_BITS;
use crate::cache::policy::ReplacementPolicy;

/// Largest set index width we are willing to allocate sets for.
pub const MAX_SET_BITS: u32 = 24;

/// Upper bound on `2^set_bits * lines_per_set` for one cache.
pub const MAX_LINES: usize = 1 << 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("lines_per_set must be at least 1")]
    NoLines,
    #[error(
        "block_bits ({block_bits}) + set_bits ({set_bits}) exceeds the {width}-bit address width",
        width = ADDRESS_BITS
    )]
    AddressWidth { block_bits: u32, set_bits: u32 },
    #[error("set_bits ({set_bits}) exceeds the supported maximum of {max}", max = MAX_SET_BITS)]
    TooManySets { set_bits: u32 },
    #[error(
        "2^{set_bits} sets x {lines_per_set} lines exceeds the limit of {max} lines",
        max = MAX_LINES
    )]
    TooManyLines { set_bits: u32, lines_per_set: usize },
    #[error("cannot allocate 2^{set_bits} sets x {lines_per_set} lines")]
    Allocation { set_bits: u32, lines_per_set: usize },
}

/// Geometry, policy and label of one simulated cache.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct CacheConfig {
    pub name: String,
    pub block_bits: u32,
    pub set_bits: u32,
    pub lines_per_set: usize,
    pub policy: ReplacementPolicy,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            name: "cache".to_string(),
            block_bits: 4,
            set_bits: 4,
            lines_per_set: 1,
            policy: ReplacementPolicy::Lru,
        }
    }
}

impl CacheConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lines_per_set < 1 {
            return Err(ConfigError::NoLines);
        }
        let width = self.block_bits.checked_add(self.set_bits);
        if width.map_or(true, |w| w > ADDRESS_BITS) {
            return Err(ConfigError::AddressWidth {
                block_bits: self.block_bits,
                set_bits: self.set_bits,
            });
        }
        if self.set_bits > MAX_SET_BITS {
            return Err(ConfigError::TooManySets {
                set_bits: self.set_bits,
            });
        }
        let lines = (1usize << self.set_bits).checked_mul(self.lines_per_set);
        if lines.map_or(true, |n| n > MAX_LINES) {
            return Err(ConfigError::TooManyLines {
                set_bits: self.set_bits,
                lines_per_set: self.lines_per_set,
            });
        }
        Ok(())
    }
}
