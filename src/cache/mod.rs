pub mod addr;
pub mod config;
mod engine;
pub mod line;
pub mod policy;
mod stats;

#[cfg(test)]
mod tests;

pub use addr::Geometry;
pub use config::{CacheConfig, ConfigError};
pub use engine::{AccessOutcome, Cache};
pub use line::{CacheLine, CacheSet};
pub use policy::ReplacementPolicy;
pub use stats::{CacheStats, CacheSummary};
