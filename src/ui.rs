use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use log::warn;
use toml::Table;

use crate::cache::ReplacementPolicy;
use crate::sim::config::{cache_configs, Config, SimConfig};
use crate::sim::top::Sim;
use crate::traffic::config::TrafficConfig;

#[derive(Parser, Debug, Default)]
#[command(version, about)]
pub struct CacheSimArgs {
    #[arg(long, help = "Path to config.toml")]
    pub config: Option<PathBuf>,
    #[arg(short, long, help = "Override trace file path")]
    pub trace: Option<PathBuf>,
    #[arg(short = 's', long, help = "Override number of set index bits")]
    pub set_bits: Option<u32>,
    #[arg(short = 'E', long, help = "Override number of lines per set")]
    pub lines_per_set: Option<usize>,
    #[arg(short = 'b', long, help = "Override number of block offset bits")]
    pub block_bits: Option<u32>,
    #[arg(short, long, help = "Override replacement policy (lru, lfu)")]
    pub policy: Option<ReplacementPolicy>,
    #[arg(short, long, help = "Override cache name")]
    pub name: Option<String>,
    #[arg(short, long, help = "Echo every access with its outcome")]
    pub verbose: bool,
    #[arg(long, help = "Log level (0:warn, 1:info, 2:debug, 3:trace)")]
    pub log: Option<u64>,
    #[arg(long, help = "Write summary JSON to this path")]
    pub results_json: Option<PathBuf>,
}

pub fn read_toml(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))
}

/// Log level for the run: `--log` if given, else `[sim] log_level`.
pub fn log_level(toml_string: &str, cli_args: &CacheSimArgs) -> anyhow::Result<u64> {
    if let Some(level) = cli_args.log {
        return Ok(level);
    }
    let config_table: Table = toml::from_str(toml_string).context("cannot parse config toml")?;
    Ok(SimConfig::from_section(config_table.get("sim"))?.log_level)
}

/// Make a Sim object from the TOML configuration.
/// If `cli_args` is given, override TOML options with CLI arguments.
pub fn make_sim(toml_string: &str, cli_args: Option<&CacheSimArgs>) -> anyhow::Result<Sim> {
    let config_table: Table = toml::from_str(toml_string).context("cannot parse config toml")?;
    let mut sim_config = SimConfig::from_section(config_table.get("sim"))?;
    let mut caches = cache_configs(config_table.get("cache"))?;
    let traffic_config = TrafficConfig::from_section(config_table.get("traffic"))?;

    // override toml configs with CLI args
    if let Some(args) = cli_args {
        sim_config.trace = args.trace.clone().or(sim_config.trace);
        sim_config.verbose |= args.verbose;
        sim_config.log_level = args.log.unwrap_or(sim_config.log_level);
        sim_config.results_json = args.results_json.clone().or(sim_config.results_json);
        for cache in caches.iter_mut() {
            cache.set_bits = args.set_bits.unwrap_or(cache.set_bits);
            cache.lines_per_set = args.lines_per_set.unwrap_or(cache.lines_per_set);
            cache.block_bits = args.block_bits.unwrap_or(cache.block_bits);
            cache.policy = args.policy.unwrap_or(cache.policy);
        }
        if let Some(name) = &args.name {
            let count = caches.len();
            match caches.as_mut_slice() {
                [cache] => cache.name = name.clone(),
                _ => warn!("--name ignored: {} caches configured", count),
            }
        }
    }

    Sim::new(sim_config, caches, &traffic_config)
}
