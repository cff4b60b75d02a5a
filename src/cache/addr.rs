/// Address width the decoder supports.
pub const ADDRESS_BITS: u32 = u64::BITS;

/// Bit layout of an address for a given cache geometry:
/// `| tag | set index (set_bits) | block offset (block_bits) |`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    block_bits: u32,
    set_bits: u32,
}

/// Mask of the low `bits` bits; all ones at full width.
fn low_mask(bits: u32) -> u64 {
    if bits >= ADDRESS_BITS {
        u64::MAX
    } else {
        (1u64 << bits) - 1
    }
}

impl Geometry {
    /// Callers validate `block_bits + set_bits <= ADDRESS_BITS` beforehand.
    pub(crate) fn new(block_bits: u32, set_bits: u32) -> Self {
        debug_assert!(block_bits + set_bits <= ADDRESS_BITS);
        Self {
            block_bits,
            set_bits,
        }
    }

    pub fn block_bits(&self) -> u32 {
        self.block_bits
    }

    pub fn set_bits(&self) -> u32 {
        self.set_bits
    }

    pub fn num_sets(&self) -> usize {
        1usize << self.set_bits
    }

    /// Address with the block offset bits cleared.
    pub fn block_address(&self, address: u64) -> u64 {
        address & !low_mask(self.block_bits)
    }

    pub fn set_index(&self, address: u64) -> usize {
        let shifted = address.checked_shr(self.block_bits).unwrap_or(0);
        (shifted & low_mask(self.set_bits)) as usize
    }

    pub fn tag(&self, address: u64) -> u64 {
        address
            .checked_shr(self.block_bits + self.set_bits)
            .unwrap_or(0)
    }

    /// Rebuild the block address from its tag and set index.
    pub fn compose(&self, tag: u64, set_index: usize) -> u64 {
        let tag_part = tag
            .checked_shl(self.block_bits + self.set_bits)
            .unwrap_or(0);
        let set_part = (set_index as u64)
            .checked_shl(self.block_bits)
            .unwrap_or(0);
        tag_part | set_part
    }
}
