/// Number of preceding symbols used as context.
pub const ORDER: usize = 4;

/// The last `ORDER` codes packed into one word, most recent in the low bits.
/// A zero code is a gap: orders that would reach past it are absent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Context {
    bits: u32,
    mask: u32,
    value: u32,
}

impl Context {
    pub fn new(bits: u32) -> Self {
        debug_assert!(bits as usize * ORDER < 32);
        Self {
            bits,
            mask: (1 << (bits * ORDER as u32)) - 1,
            value: 0,
        }
    }

    #[inline]
    pub fn push(&mut self, code: u8) {
        self.value = ((self.value << self.bits) | u32::from(code)) & self.mask;
    }

    /// The packed window of the last `order` codes.
    #[inline]
    pub fn suffix(&self, order: usize) -> u32 {
        debug_assert!(order <= ORDER);
        self.value & ((1 << (self.bits * order as u32)) - 1)
    }

    /// How many of the most recent codes are known, stopping at the first gap.
    pub fn depth(&self) -> usize {
        let symbol_mask = (1 << self.bits) - 1;
        (0..ORDER)
            .take_while(|&i| (self.value >> (self.bits * i as u32)) & symbol_mask != 0)
            .count()
    }

    pub fn value(&self) -> u32 {
        self.value
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }
}
