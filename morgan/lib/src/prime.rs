//! An unbounded, lazily generated sequence of prime numbers.

use std::collections::HashMap;

/// Iterator over every prime number, in ascending order (`2, 3, 5, 7, 11, ...`).
///
/// This is an incremental Sieve of Eratosthenes.  Every composite number which the sieve knows
/// about (but hasn't reached yet) is stored along with the prime which 'discovered' it.  A prime
/// `p` only starts marking composites once the sieve reaches `p * p`, so the map only ever holds
/// roughly one entry per prime generated so far and there's no upper limit fixed up-front.
///
/// Creating a new `Primes` always restarts the sequence from `2`.
#[derive(Debug, Clone)]
pub struct Primes {
    next_candidate: u64,
    /// Maps each known composite to one of its prime factors
    composites: HashMap<u64, u64>,
}

impl Primes {
    pub fn new() -> Self {
        Self {
            next_candidate: 2,
            composites: HashMap::new(),
        }
    }

    /// Returns the next prime in the sequence.  Unlike [`Iterator::next`], this can't fail
    /// because there are infinitely many primes.
    pub fn next_prime(&mut self) -> u64 {
        loop {
            let q = self.next_candidate;
            self.next_candidate += 1;
            match self.composites.remove(&q) {
                // `q` isn't a multiple of any smaller prime, so is itself prime.  The first
                // composite it discovers is `q * q` (anything smaller already has a smaller
                // factor).  If `q * q` doesn't fit in a `u64`, then we'd never reach it anyway.
                None => {
                    if let Some(square) = q.checked_mul(q) {
                        self.composites.insert(square, q);
                    }
                    return q;
                }
                // `q` is composite.  Move `p`'s marker to the next multiple of `p` which isn't
                // already claimed by another prime
                Some(p) => {
                    let mut next_multiple = q + p;
                    while self.composites.contains_key(&next_multiple) {
                        next_multiple += p;
                    }
                    self.composites.insert(next_multiple, p);
                }
            }
        }
    }
}

impl Default for Primes {
    fn default() -> Self {
        Self::new()
    }
}

impl Iterator for Primes {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        Some(self.next_prime())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}
