use crate::context::Context;
use crate::counts::CountStore;

const MAX_CODES: usize = 1 << crate::alphabet::MAX_BITS;

/// Symbols whose probability mass was already accounted for at a longer
/// context while resolving the current character.
#[derive(Clone, Debug)]
pub struct Exclusions {
    excluded: [bool; MAX_CODES],
}

impl Exclusions {
    pub fn new() -> Self {
        Self {
            excluded: [false; MAX_CODES],
        }
    }

    #[inline]
    pub fn contains(&self, code: u8) -> bool {
        self.excluded[code as usize]
    }

    #[inline]
    pub fn insert(&mut self, code: u8) {
        self.excluded[code as usize] = true;
    }
}

impl Default for Exclusions {
    fn default() -> Self {
        Self::new()
    }
}

/// Cost in nats of seeing `code` after `ctx`.
///
/// Starts at the longest known context and walks towards order 0. At each
/// order the parent total is first reduced by the counts of symbols excluded
/// at longer orders. A seen symbol costs `ln(total + 1) - ln(count)`; an unseen
/// one pays the escape `ln(total + 1)`, excludes everything seen at this order
/// and moves on. A context that was never seen ends the descent at once: the
/// add-one zeroth-order estimate is charged, as it is past order 0.
pub fn code_length(
    store: &CountStore,
    alphabet_len: usize,
    ctx: &Context,
    code: u8,
    exclusions: &mut Exclusions,
) -> f64 {
    let size = 1u8 << store.bits();
    let mut cost = 0.0;

    for order in (0..=ctx.depth()).rev() {
        let suffix = ctx.suffix(order);
        let total = store.total(suffix);
        if total == 0 {
            return cost + zeroth_order(store, alphabet_len, code);
        }

        let excluded: u32 = (1..size)
            .filter(|&c| exclusions.contains(c))
            .map(|c| store.count(suffix, c))
            .sum();
        let remaining = f64::from(total - excluded);

        let count = store.count(suffix, code);
        if count != 0 {
            return cost + (remaining + 1.0).ln() - f64::from(count).ln();
        }

        cost += (remaining + 1.0).ln();
        for c in 1..size {
            if store.count(suffix, c) != 0 {
                exclusions.insert(c);
            }
        }
    }

    cost + zeroth_order(store, alphabet_len, code)
}

/// `ln(total + len) - ln(count + 1)` over the order-0 counts.
pub fn zeroth_order(store: &CountStore, alphabet_len: usize, code: u8) -> f64 {
    let total = f64::from(store.total(0));
    let count = f64::from(store.count(0, code));
    (total + alphabet_len as f64).ln() - (count + 1.0).ln()
}
