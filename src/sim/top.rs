use std::fs::File;
use std::io::{BufRead, BufReader, Write};

use anyhow::{bail, Context};
use log::{debug, info};

use crate::cache::{AccessOutcome, Cache, CacheConfig, CacheSummary};
use crate::sim::config::SimConfig;
use crate::sim::report::{format_outcome, format_summary, write_results_json};
use crate::sim::trace::{AccessKind, TraceReader};
use crate::traffic::config::TrafficConfig;
use crate::traffic::patterns::PatternEngine;

/// Runs one address stream through a set of independent caches.
pub struct Sim {
    pub config: SimConfig,
    pub caches: Vec<Cache>,
    pub traffic: PatternEngine,
    accesses: u64,
}

impl Sim {
    pub fn new(
        config: SimConfig,
        cache_configs: Vec<CacheConfig>,
        traffic_config: &TrafficConfig,
    ) -> anyhow::Result<Sim> {
        let caches = cache_configs
            .into_iter()
            .map(|cc| {
                let name = cc.name.clone();
                Cache::new(cc)
                    .with_context(|| format!("invalid configuration for cache '{}'", name))
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        if caches.is_empty() {
            bail!("no caches configured");
        }
        let traffic = PatternEngine::new(traffic_config)?;
        Ok(Sim {
            config,
            caches,
            traffic,
            accesses: 0,
        })
    }

    pub fn accesses(&self) -> u64 {
        self.accesses
    }

    /// Present one address to every cache.
    pub fn step(&mut self, address: u64) -> Vec<AccessOutcome> {
        self.accesses += 1;
        self.caches.iter_mut().map(|cache| cache.access(address)).collect()
    }

    fn echo<W: Write>(
        &self,
        out: &mut W,
        label: &str,
        outcomes: &[AccessOutcome],
    ) -> anyhow::Result<()> {
        if !self.config.verbose {
            return Ok(());
        }
        let mut line = label.to_string();
        if let [only] = outcomes {
            line.push_str(&format_outcome(only));
        } else {
            for (cache, outcome) in self.caches.iter().zip(outcomes) {
                line.push(' ');
                line.push_str(cache.name());
                line.push(':');
                line.push_str(&format_outcome(outcome));
            }
        }
        writeln!(out, "{}", line)?;
        Ok(())
    }

    pub fn run_trace<R: BufRead, W: Write>(
        &mut self,
        reader: R,
        out: &mut W,
    ) -> anyhow::Result<()> {
        for item in TraceReader::new(reader) {
            let (raw, entry) = item?;
            if self.config.skip_instruction_fetches && entry.kind == Some(AccessKind::Instruction) {
                continue;
            }
            let outcomes = self.step(entry.address);
            self.echo(out, &raw, &outcomes)?;
        }
        Ok(())
    }

    pub fn run_traffic<W: Write>(&mut self, out: &mut W) -> anyhow::Result<()> {
        let engine = std::mem::take(&mut self.traffic);
        for address in engine.addresses() {
            let outcomes = self.step(address);
            self.echo(out, &format!("{:x}", address), &outcomes)?;
        }
        self.traffic = engine;
        Ok(())
    }

    /// Drive the configured source: the trace file if set, else the traffic patterns.
    pub fn simulate<W: Write>(&mut self, out: &mut W) -> anyhow::Result<()> {
        match self.config.trace.clone() {
            Some(path) => {
                info!("replaying trace {}", path.display());
                let file = File::open(&path)
                    .with_context(|| format!("cannot open trace {}", path.display()))?;
                self.run_trace(BufReader::new(file), out)
            }
            None if !self.traffic.is_empty() => {
                info!(
                    "generating {} accesses from {} traffic patterns",
                    self.traffic.total_accesses(),
                    self.traffic.len()
                );
                self.run_traffic(out)
            }
            None => bail!("no trace file or traffic patterns configured"),
        }
    }

    /// Tear down every cache, print the summary lines and write the results file.
    pub fn finish<W: Write>(self, out: &mut W) -> anyhow::Result<Vec<CacheSummary>> {
        let accesses = self.accesses;
        let summaries: Vec<CacheSummary> = self.caches.into_iter().map(Cache::teardown).collect();
        for summary in &summaries {
            writeln!(out, "{}", format_summary(summary))?;
            debug!("{}: hit rate {:.4}", summary.name, summary.hit_rate);
        }
        if let Some(path) = &self.config.results_json {
            write_results_json(path, accesses, &summaries)?;
            info!("results written to {}", path.display());
        }
        Ok(summaries)
    }
}
