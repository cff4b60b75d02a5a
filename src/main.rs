use std::io::{self, Write};

use cachesim::sim::config::level_filter;
use cachesim::ui::{log_level, make_sim, read_toml, CacheSimArgs};
use clap::Parser;
use env_logger::{Builder, Env};

pub fn main() -> anyhow::Result<()> {
    let argv = CacheSimArgs::parse();
    let toml_string = match &argv.config {
        Some(path) => read_toml(path)?,
        None => String::new(),
    };

    // RUST_LOG wins over the configured level
    Builder::new()
        .filter_level(level_filter(log_level(&toml_string, &argv)?))
        .parse_env(Env::default())
        .init();

    let mut sim = make_sim(&toml_string, Some(&argv))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    sim.simulate(&mut out)?;
    sim.finish(&mut out)?;
    out.flush()?;
    Ok(())
}
