use std::collections::TryReserveError;

/// One slot of a set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheLine {
    pub valid: bool,
    pub tag: u64,
    pub block_addr: u64,
    /// Set clock at the most recent insertion or hit.
    pub last_touch: u64,
    /// Accesses since the last (re)insertion; starts at 1.
    pub access_count: u64,
}

/// Fixed arena of `ways` lines plus the set-local logical clock.
#[derive(Debug, Clone)]
pub struct CacheSet {
    lines: Vec<CacheLine>,
    clock: u64,
}

impl CacheSet {
    pub(crate) fn new(ways: usize) -> Self {
        Self {
            lines: vec![CacheLine::default(); ways],
            clock: 0,
        }
    }

    /// Like `new`, but reports allocation failure instead of aborting.
    pub(crate) fn try_new(ways: usize) -> Result<Self, TryReserveError> {
        let mut lines = Vec::new();
        lines.try_reserve_exact(ways)?;
        lines.resize(ways, CacheLine::default());
        Ok(Self { lines, clock: 0 })
    }

    pub fn lines(&self) -> &[CacheLine] {
        &self.lines
    }

    pub fn clock(&self) -> u64 {
        self.clock
    }

    pub fn is_full(&self) -> bool {
        self.lines.iter().all(|line| line.valid)
    }

    /// Advance the clock for an access mapped to this set.
    pub(crate) fn tick(&mut self) -> u64 {
        self.clock += 1;
        self.clock
    }

    pub fn probe(&self, tag: u64) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.valid && line.tag == tag)
    }

    pub fn find_free(&self) -> Option<usize> {
        self.lines.iter().position(|line| !line.valid)
    }

    pub(crate) fn touch(&mut self, way: usize) {
        let clock = self.clock;
        let line = &mut self.lines[way];
        line.last_touch = clock;
        line.access_count += 1;
    }

    /// Overwrite `way` with a new block regardless of what it held.
    pub(crate) fn insert_at(&mut self, way: usize, tag: u64, block_addr: u64) {
        self.lines[way] = CacheLine {
            valid: true,
            tag,
            block_addr,
            last_touch: self.clock,
            access_count: 1,
        };
    }
}
