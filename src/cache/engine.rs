use std::collections::TryReserveError;

use log::{info, trace};

use crate::cache::addr::Geometry;
use crate::cache::config::{CacheConfig, ConfigError};
use crate::cache::line::CacheSet;
use crate::cache::policy::ReplacementPolicy;
use crate::cache::stats::{CacheStats, CacheSummary};

/// Classification of a single access.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessOutcome {
    Hit,
    Miss { inserted_block: u64 },
    Eviction { victim_block: u64, inserted_block: u64 },
}

/// A set-associative cache. Owns its sets, lines and counters; nothing is
/// shared between instances.
#[derive(Debug)]
pub struct Cache {
    name: String,
    geometry: Geometry,
    policy: ReplacementPolicy,
    sets: Vec<CacheSet>,
    stats: CacheStats,
}

fn allocate_sets(num_sets: usize, ways: usize) -> Result<Vec<CacheSet>, TryReserveError> {
    let mut sets = Vec::new();
    sets.try_reserve_exact(num_sets)?;
    for _ in 0..num_sets {
        sets.push(CacheSet::try_new(ways)?);
    }
    Ok(sets)
}

impl Cache {
    /// Allocate `2^set_bits` sets of `lines_per_set` invalid lines.
    pub fn new(config: CacheConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let geometry = Geometry::new(config.block_bits, config.set_bits);
        let sets = allocate_sets(geometry.num_sets(), config.lines_per_set).map_err(|_| {
            ConfigError::Allocation {
                set_bits: config.set_bits,
                lines_per_set: config.lines_per_set,
            }
        })?;
        info!(
            "cache {}: {} sets x {} ways, {}-byte blocks, policy {}",
            config.name,
            geometry.num_sets(),
            config.lines_per_set,
            1u128 << config.block_bits,
            config.policy
        );
        Ok(Self {
            name: config.name,
            geometry,
            policy: config.policy,
            sets,
            stats: CacheStats::default(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn policy(&self) -> ReplacementPolicy {
        self.policy
    }

    pub fn sets(&self) -> &[CacheSet] {
        &self.sets
    }

    pub fn lines_per_set(&self) -> usize {
        self.sets.first().map_or(0, |set| set.lines().len())
    }

    pub fn stats(&self) -> &CacheStats {
        &self.stats
    }

    pub fn summary(&self) -> CacheSummary {
        CacheSummary::new(&self.name, &self.stats)
    }

    /// Run one address through the cache.
    pub fn access(&mut self, address: u64) -> AccessOutcome {
        let set_idx = self.geometry.set_index(address);
        let set = &mut self.sets[set_idx];
        // the current access always carries the newest timestamp
        set.tick();

        let tag = self.geometry.tag(address);
        let block_addr = self.geometry.block_address(address);

        if let Some(way) = set.probe(tag) {
            set.touch(way);
            self.stats.record_hit();
            return AccessOutcome::Hit;
        }

        self.stats.record_miss();
        if let Some(way) = set.find_free() {
            set.insert_at(way, tag, block_addr);
            return AccessOutcome::Miss {
                inserted_block: block_addr,
            };
        }

        let way = self.policy.select_victim(set);
        let victim_block = set.lines()[way].block_addr;
        set.insert_at(way, tag, block_addr);
        self.stats.record_eviction();
        trace!(
            "{}: set {} way {} evicted {:#x} for {:#x}",
            self.name,
            set_idx,
            way,
            victim_block,
            block_addr
        );
        AccessOutcome::Eviction {
            victim_block,
            inserted_block: block_addr,
        }
    }

    /// Release all sets and hand back the final counters. Consumes the cache,
    /// so no access can follow.
    pub fn teardown(self) -> CacheSummary {
        self.summary()
    }
}
