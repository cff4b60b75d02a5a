use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::line::{CacheLine, CacheSet};

/// Replacement policy, fixed for the lifetime of a cache.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementPolicy {
    #[default]
    Lru,
    Lfu,
}

impl FromStr for ReplacementPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "lru" => Ok(Self::Lru),
            "lfu" => Ok(Self::Lfu),
            _ => Err(format!(
                "unsupported replacement policy '{}', expected one of: lru, lfu",
                value
            )),
        }
    }
}

impl fmt::Display for ReplacementPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lru => write!(f, "lru"),
            Self::Lfu => write!(f, "lfu"),
        }
    }
}

impl ReplacementPolicy {
    /// Ordering key; the victim is the line with the smallest key, first index on ties.
    fn rank(self, line: &CacheLine) -> (u64, u64) {
        match self {
            Self::Lru => (line.last_touch, 0),
            Self::Lfu => (line.access_count, line.last_touch),
        }
    }

    /// Pick the way to evict from a full set.
    pub fn select_victim(self, set: &CacheSet) -> usize {
        let lines = set.lines();
        debug_assert!(!lines.is_empty() && set.is_full());
        (1..lines.len()).fold(0, |best, way| {
            if self.rank(&lines[way]) < self.rank(&lines[best]) {
                way
            } else {
                best
            }
        })
    }
}
