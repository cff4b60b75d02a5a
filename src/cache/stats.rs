use serde::Serialize;

/// Aggregate access counters of one cache. Only the engine records into it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl CacheStats {
    pub fn hits(&self) -> u64 {
        self.hits
    }

    pub fn misses(&self) -> u64 {
        self.misses
    }

    pub fn evictions(&self) -> u64 {
        self.evictions
    }

    pub fn accesses(&self) -> u64 {
        self.hits.saturating_add(self.misses)
    }

    /// Fraction of accesses that hit; 0.0 before the first access.
    pub fn hit_rate(&self) -> f64 {
        match self.accesses() {
            0 => 0.0,
            n => self.hits as f64 / n as f64,
        }
    }

    pub(crate) fn record_hit(&mut self) {
        self.hits = self.hits.saturating_add(1);
    }

    pub(crate) fn record_miss(&mut self) {
        self.misses = self.misses.saturating_add(1);
    }

    pub(crate) fn record_eviction(&mut self) {
        self.evictions = self.evictions.saturating_add(1);
    }
}

/// Name plus final counters, as handed to reporting.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheSummary {
    pub name: String,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
}

impl CacheSummary {
    pub fn new(name: &str, stats: &CacheStats) -> Self {
        Self {
            name: name.to_string(),
            hits: stats.hits(),
            misses: stats.misses(),
            evictions: stats.evictions(),
            hit_rate: stats.hit_rate(),
        }
    }
}
