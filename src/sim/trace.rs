use std::fmt;
use std::io::BufRead;

use anyhow::{anyhow, bail};

/// Access type tag carried by a trace line. The simulator treats every kind
/// as a single access; the tag only matters for filtering and echoing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Instruction,
    Load,
    Store,
    Modify,
}

impl AccessKind {
    fn from_token(token: &str) -> Option<Self> {
        match token {
            "I" => Some(Self::Instruction),
            "L" => Some(Self::Load),
            "S" => Some(Self::Store),
            "M" => Some(Self::Modify),
            _ => None,
        }
    }

    fn short(self) -> &'static str {
        match self {
            Self::Instruction => "I",
            Self::Load => "L",
            Self::Store => "S",
            Self::Modify => "M",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceEntry {
    pub kind: Option<AccessKind>,
    pub address: u64,
    pub size: Option<u32>,
}

impl fmt::Display for TraceEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(kind) = self.kind {
            write!(f, "{} ", kind.short())?;
        }
        write!(f, "{:x}", self.address)?;
        if let Some(size) = self.size {
            write!(f, ",{}", size)?;
        }
        Ok(())
    }
}

fn parse_address(text: &str) -> anyhow::Result<u64> {
    let hex = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
        .unwrap_or(text);
    u64::from_str_radix(hex, 16).map_err(|err| anyhow!("bad address '{}': {}", text, err))
}

/// Parse one trace line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> anyhow::Result<Option<TraceEntry>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut tokens = line.split_whitespace();
    let first = tokens.next().unwrap_or_default();
    let (kind, rest) = match AccessKind::from_token(first) {
        Some(kind) => (Some(kind), tokens.next()),
        None => (None, Some(first)),
    };
    if tokens.next().is_some() {
        bail!("trailing tokens in trace line '{}'", line);
    }
    let rest = rest.ok_or_else(|| anyhow!("missing address in trace line '{}'", line))?;

    let (addr_text, size) = match rest.split_once(',') {
        Some((addr, size)) => {
            let size = size
                .parse::<u32>()
                .map_err(|err| anyhow!("bad access size '{}': {}", size, err))?;
            (addr, Some(size))
        }
        None => (rest, None),
    };

    Ok(Some(TraceEntry {
        kind,
        address: parse_address(addr_text)?,
        size,
    }))
}

/// Iterator over the entries of a trace, tagging errors with their line number.
pub struct TraceReader<R: BufRead> {
    lines: std::io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> TraceReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> Iterator for TraceReader<R> {
    type Item = anyhow::Result<(String, TraceEntry)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(err) => return Some(Err(anyhow::Error::new(err).context("cannot read trace"))),
            };
            self.line_no += 1;
            match parse_line(&line) {
                Ok(Some(entry)) => return Some(Ok((line.trim().to_string(), entry))),
                Ok(None) => continue,
                Err(err) => {
                    return Some(Err(err.context(format!("trace line {}", self.line_no))));
                }
            }
        }
    }
}
