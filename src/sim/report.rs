use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;

use crate::cache::{AccessOutcome, CacheSummary};

/// Status suffix appended to an echoed trace line.
pub fn format_outcome(outcome: &AccessOutcome) -> String {
    match outcome {
        AccessOutcome::Hit => " [status: hit]".to_string(),
        AccessOutcome::Miss { inserted_block } => {
            format!(" [status: miss, insert_block: {:#x}]", inserted_block)
        }
        AccessOutcome::Eviction {
            victim_block,
            inserted_block,
        } => format!(
            " [status: miss eviction, victim_block: {:#x}, insert_block: {:#x}]",
            victim_block, inserted_block
        ),
    }
}

pub fn format_summary(summary: &CacheSummary) -> String {
    format!(
        "{} hits: {}, misses: {}, evictions: {}",
        summary.name, summary.hits, summary.misses, summary.evictions
    )
}

#[derive(Debug, Serialize)]
pub struct RunResults<'a> {
    pub accesses: u64,
    pub caches: &'a [CacheSummary],
}

pub fn write_results_json(
    path: &Path,
    accesses: u64,
    caches: &[CacheSummary],
) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }
    let payload = serde_json::to_string_pretty(&RunResults { accesses, caches })?;
    fs::write(path, payload).with_context(|| format!("cannot write {}", path.display()))
}
