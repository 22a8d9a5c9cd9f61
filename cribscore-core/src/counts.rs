use crate::context::{Context, ORDER};
use crate::error::ConstructionError;

// Slots touched by one increment: a child and its parent for every order.
const MAX_TOUCHED: usize = 2 * (ORDER + 1);

/// Occurrence counts for every (context, symbol) pair up to `ORDER`.
///
/// The slot of `(suffix, code)` lives at `(suffix << bits) | code`. Code 0 is
/// never trained, so the slot with the low `bits` cleared holds the total of
/// its siblings. That total is kept exact after every increment and rescale.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountStore {
    t: Vec<u32>,
    bits: u32,
    limit: u32,
}

impl CountStore {
    pub fn new(bits: u32, limit: u32) -> Result<Self, ConstructionError> {
        let min = 1u32 << bits;
        if limit < min {
            return Err(ConstructionError::CountLimitTooSmall { limit, min });
        }

        let slots = Self::slots_for(bits);
        let mut t = Vec::new();
        t.try_reserve_exact(slots)
            .map_err(|_| ConstructionError::TableTooLarge { slots })?;
        t.resize(slots, 0);

        Ok(Self { t, bits, limit })
    }

    pub fn slots_for(bits: u32) -> usize {
        1 << (bits as usize * (ORDER + 1))
    }

    #[inline]
    fn slot(&self, suffix: u32, code: u8) -> usize {
        ((suffix as usize) << self.bits) | code as usize
    }

    /// Count of `code` after the given suffix. Code 0 always counts zero.
    #[inline]
    pub fn count(&self, suffix: u32, code: u8) -> u32 {
        if code == 0 {
            return 0;
        }
        self.t[self.slot(suffix, code)]
    }

    /// Number of times the given suffix was followed by any symbol.
    #[inline]
    pub fn total(&self, suffix: u32) -> u32 {
        self.t[self.slot(suffix, 0)]
    }

    /// Records `code` after every known suffix of `ctx`, from order 0 up to
    /// the context depth. Returns true if the table had to be rescaled first.
    pub fn increment(&mut self, ctx: &Context, code: u8) -> bool {
        debug_assert!(code != 0);

        let mut touched = [0usize; MAX_TOUCHED];
        let mut n = 0;
        for order in 0..=ctx.depth() {
            let suffix = ctx.suffix(order);
            touched[n] = self.slot(suffix, code);
            touched[n + 1] = self.slot(suffix, 0);
            n += 2;
        }

        let rescaled = touched[..n].iter().any(|&i| self.t[i] >= self.limit);
        if rescaled {
            self.rescale();
        }
        for &i in &touched[..n] {
            self.t[i] += 1;
        }
        rescaled
    }

    /// Halves every counter, rounding up, then makes every parent the exact
    /// sum of its children again.
    pub fn rescale(&mut self) {
        for v in self.t.iter_mut() {
            *v = (*v >> 1) + (*v & 1);
        }

        let size = 1 << self.bits;
        for group in self.t.chunks_exact_mut(size) {
            let (parent, children) = group.split_at_mut(1);
            parent[0] = children.iter().sum();
        }

        log::debug!("rescaled {} counters at limit {}", self.t.len(), self.limit);
    }

    /// True when every parent slot equals the sum of its children.
    pub fn is_consistent(&self) -> bool {
        let size = 1 << self.bits;
        self.t.chunks_exact(size).all(|group| {
            let sum: u64 = group[1..].iter().map(|&v| u64::from(v)).sum();
            u64::from(group[0]) == sum
        })
    }

    pub fn raw(&self) -> &[u32] {
        &self.t
    }

    pub(crate) fn raw_mut(&mut self) -> &mut [u32] {
        &mut self.t
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }

    pub fn bits(&self) -> u32 {
        self.bits
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn nonzero(&self) -> usize {
        self.t.iter().filter(|&&v| v != 0).count()
    }
}
