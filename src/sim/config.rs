use std::path::PathBuf;

use anyhow::{bail, Context};
use log::{warn, LevelFilter};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use toml::*;

use crate::cache::CacheConfig;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SimConfig {
    pub trace: Option<PathBuf>,
    pub verbose: bool,
    pub log_level: u64,
    pub skip_instruction_fetches: bool,
    pub results_json: Option<PathBuf>,
}

pub trait Config: DeserializeOwned + Default {
    fn from_section(section: Option<&Value>) -> anyhow::Result<Self> {
        match section {
            Some(value) => value
                .clone()
                .try_into()
                .context("cannot deserialize config section"),
            None => {
                warn!("config section not found, using defaults");
                Ok(Self::default())
            }
        }
    }
}

impl Config for SimConfig {}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            trace: None,
            verbose: false,
            log_level: 0,
            skip_instruction_fetches: false,
            results_json: None,
        }
    }
}

impl Config for CacheConfig {}

/// Read the `cache` entry, which may be a single table or an array of tables.
pub fn cache_configs(section: Option<&Value>) -> anyhow::Result<Vec<CacheConfig>> {
    match section {
        Some(Value::Array(entries)) => {
            if entries.is_empty() {
                bail!("[[cache]] must list at least one cache");
            }
            entries
                .iter()
                .enumerate()
                .map(|(idx, entry)| {
                    CacheConfig::from_section(Some(entry))
                        .with_context(|| format!("in cache entry #{}", idx))
                })
                .collect()
        }
        other => Ok(vec![CacheConfig::from_section(other)?]),
    }
}

/// 0:warn, 1:info, 2:debug, 3+:trace
pub fn level_filter(log_level: u64) -> LevelFilter {
    match log_level {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ReplacementPolicy;

    fn table(src: &str) -> Table {
        toml::from_str(src).unwrap()
    }

    #[test]
    fn sim_section_defaults() {
        let config = SimConfig::from_section(None).unwrap();
        assert!(config.trace.is_none());
        assert!(!config.verbose);
        assert_eq!(config.log_level, 0);
    }

    #[test]
    fn sim_section_parses() {
        let t = table(
            r#"
            [sim]
            trace = "traces/yi.trace"
            verbose = true
            log_level = 2
            "#,
        );
        let config = SimConfig::from_section(t.get("sim")).unwrap();
        assert_eq!(config.trace, Some(PathBuf::from("traces/yi.trace")));
        assert!(config.verbose);
        assert_eq!(level_filter(config.log_level), LevelFilter::Debug);
    }

    #[test]
    fn single_cache_table() {
        let t = table(
            r#"
            [cache]
            name = "only"
            lines_per_set = 4
            "#,
        );
        let caches = cache_configs(t.get("cache")).unwrap();
        assert_eq!(caches.len(), 1);
        assert_eq!(caches[0].name, "only");
        assert_eq!(caches[0].lines_per_set, 4);
    }

    #[test]
    fn cache_array() {
        let t = table(
            r#"
            [[cache]]
            name = "lru"
            policy = "lru"

            [[cache]]
            name = "lfu"
            policy = "lfu"
            "#,
        );
        let caches = cache_configs(t.get("cache")).unwrap();
        let policies: Vec<_> = caches.iter().map(|c| c.policy).collect();
        assert_eq!(policies, vec![ReplacementPolicy::Lru, ReplacementPolicy::Lfu]);
    }

    #[test]
    fn missing_cache_uses_default() {
        let caches = cache_configs(None).unwrap();
        assert_eq!(caches, vec![CacheConfig::default()]);
    }

    #[test]
    fn rejects_bad_field_types() {
        let t = table(
            r#"
            [cache]
            set_bits = -1
            "#,
        );
        assert!(cache_configs(t.get("cache")).is_err());

        let t = table(
            r#"
            [cache]
            policy = "random"
            "#,
        );
        assert!(cache_configs(t.get("cache")).is_err());
    }

    #[test]
    fn every_level_survives_compile_time_filter() {
        // eviction traces sit at trace level and must reach `--log 3`
        for level in 0..=3 {
            assert!(level_filter(level) <= log::STATIC_MAX_LEVEL);
        }
        assert_eq!(log::STATIC_MAX_LEVEL, LevelFilter::Trace);
    }
}
