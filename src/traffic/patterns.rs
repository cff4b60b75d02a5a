use anyhow::bail;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::traffic::config::{TrafficConfig, TrafficPatternSpec};

#[derive(Debug, Clone, PartialEq, Eq)]
enum PatternKind {
    Strided { stride: u64, repeats: u64 },
    Random { span: u64, seed: u64 },
}

#[derive(Debug, Clone)]
pub struct CompiledPattern {
    pub name: String,
    base: u64,
    count: u64,
    kind: PatternKind,
}

impl CompiledPattern {
    /// Number of addresses this pattern emits.
    pub fn len(&self) -> u64 {
        match self.kind {
            PatternKind::Strided { repeats, .. } => self.count.saturating_mul(repeats),
            PatternKind::Random { .. } => self.count,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn addresses(&self) -> Box<dyn Iterator<Item = u64> + '_> {
        let base = self.base;
        match self.kind {
            PatternKind::Strided { stride, repeats } => Box::new((0..repeats).flat_map(move |_| {
                (0..self.count).map(move |i| base.wrapping_add(i.wrapping_mul(stride)))
            })),
            PatternKind::Random { span, seed } => {
                let mut rng = StdRng::seed_from_u64(seed);
                Box::new((0..self.count).map(move |_| base.wrapping_add(rng.gen_range(0..span))))
            }
        }
    }
}

/// Compiled `[traffic]` patterns, replayed in declaration order.
#[derive(Debug, Clone, Default)]
pub struct PatternEngine {
    patterns: Vec<CompiledPattern>,
}

impl PatternEngine {
    pub fn new(config: &TrafficConfig) -> anyhow::Result<Self> {
        let patterns = config
            .patterns
            .iter()
            .enumerate()
            .map(|(idx, spec)| compile_pattern(spec, idx))
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn pattern_name(&self, idx: usize) -> Option<&str> {
        self.patterns.get(idx).map(|p| p.name.as_str())
    }

    pub fn total_accesses(&self) -> u64 {
        self.patterns.iter().map(CompiledPattern::len).sum()
    }

    /// Full address stream; identical across calls for the same config.
    pub fn addresses(&self) -> impl Iterator<Item = u64> + '_ {
        self.patterns.iter().flat_map(CompiledPattern::addresses)
    }
}

fn compile_pattern(spec: &TrafficPatternSpec, index: usize) -> anyhow::Result<CompiledPattern> {
    let kind = match spec.kind.trim().to_ascii_lowercase().as_str() {
        "strided" | "sequential" => PatternKind::Strided {
            stride: spec.stride,
            repeats: spec.repeats.max(1),
        },
        "random" => PatternKind::Random {
            span: spec.span.max(1),
            seed: spec.seed,
        },
        other => bail!(
            "unsupported traffic pattern kind '{}' at index {} (expected strided|random)",
            other,
            index
        ),
    };

    let name = if spec.name.is_empty() {
        default_pattern_name(&kind)
    } else {
        spec.name.clone()
    };

    Ok(CompiledPattern {
        name,
        base: spec.base,
        count: spec.count,
        kind,
    })
}

fn default_pattern_name(kind: &PatternKind) -> String {
    match kind {
        PatternKind::Strided { stride, repeats } => format!("strided({})x{}", stride, repeats),
        PatternKind::Random { span, seed } => format!("random({}, {})", span, seed),
    }
}
