use serde::Deserialize;

use crate::sim::config::Config;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct TrafficConfig {
    pub patterns: Vec<TrafficPatternSpec>,
}

impl Config for TrafficConfig {}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct TrafficPatternSpec {
    pub name: String,
    pub kind: String,
    pub base: u64,
    pub stride: u64,
    pub count: u64,
    pub repeats: u64,
    pub span: u64,
    pub seed: u64,
}

impl Default for TrafficPatternSpec {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: String::new(),
            base: 0,
            stride: 4,
            count: 1024,
            repeats: 1,
            span: 1 << 16,
            seed: 0,
        }
    }
}
