//! Exact products of class codes, used as the raw per-node signatures during refinement.

use std::{cmp::Ordering, ops::MulAssign};

use crate::Code;

/// An arbitrary-precision product of [`Code`]s.  A node's signature is its own code squared,
/// multiplied by the codes of all its neighbours.  These products overflow any fixed-width
/// integer for high-degree nodes or large partitions, so we store the digits as little-endian
/// `u64` 'limbs'.  We only ever need multiplication by a single code and comparison, so this
/// doesn't need a full bignum implementation.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub(crate) struct Signature {
    /// Little-endian limbs.  There is always at least one limb and the most significant limb is
    /// never zero, so equal numbers always have identical representations.
    limbs: Vec<u64>,
}

impl Signature {
    fn mul_u64(&mut self, factor: u64) {
        debug_assert_ne!(factor, 0, "codes are never 0");
        let mut carry = 0u64;
        for limb in &mut self.limbs {
            let product = *limb as u128 * factor as u128 + carry as u128;
            *limb = product as u64; // Truncate to the low 64 bits
            carry = (product >> 64) as u64;
        }
        if carry != 0 {
            self.limbs.push(carry);
        }
    }
}

impl MulAssign<Code> for Signature {
    fn mul_assign(&mut self, code: Code) {
        self.mul_u64(code.as_u64());
    }
}

impl From<Code> for Signature {
    fn from(code: Code) -> Self {
        Self {
            limbs: vec![code.as_u64()],
        }
    }
}

impl PartialOrd for Signature {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Signature {
    /// Numeric ordering.  With normalised limbs, the longer number is always the bigger one
    fn cmp(&self, other: &Self) -> Ordering {
        self.limbs
            .len()
            .cmp(&other.limbs.len())
            .then_with(|| self.limbs.iter().rev().cmp(other.limbs.iter().rev()))
    }
}
