//! Conversion of arbitrary per-node invariants into dense prime codes.

use std::fmt::{Display, Formatter};

use itertools::Itertools;

use crate::{prime::Primes, StabilityCheck};

/// The class code assigned to a node.  Two nodes share a `Code` exactly when they're in the same
/// equivalence class.
///
/// Codes are always prime numbers, handed out in order of the (sorted) invariants which they
/// represent.  Apart from that, their values carry no meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Code(u64);

impl Code {
    pub(crate) fn new(v: u64) -> Self {
        Self(v)
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl Display for Code {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Display::fmt(&self.0, f)
    }
}

/// One generation of [`Code`]s, one per node
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Partition {
    codes: NodeVec<Code>,
    num_classes: usize,
}

impl Partition {
    /// Assign a [`Code`] to every node so that nodes get the same code if and only if their
    /// invariants are equal.  Codes are taken from a fresh prime sequence in ascending order of
    /// invariant, so the result only depends on the multiset of invariants and not on the order
    /// of the nodes.
    pub fn encode<T: Ord>(invariants: &NodeVec<T>) -> Self {
        // The sort is stable, so equal invariants stay in node order
        let mut order = invariants.indices().collect_vec();
        order.sort_by(|&a, &b| invariants[a].cmp(&invariants[b]));

        let mut codes = NodeVec::from_vec(vec![Code(0); invariants.len()]);
        let mut primes = Primes::new();
        let mut num_classes = 0;
        // After sorting, equal invariants are adjacent so we only have to remember the last one
        let mut last: Option<(&T, Code)> = None;
        for idx in order {
            let invariant = &invariants[idx];
            let code = match last {
                Some((last_invariant, last_code)) if last_invariant == invariant => last_code,
                _ => {
                    num_classes += 1;
                    Code::new(primes.next_prime())
                }
            };
            codes[idx] = code;
            last = Some((invariant, code));
        }

        Self { codes, num_classes }
    }

    pub fn codes(&self) -> &NodeVec<Code> {
        &self.codes
    }

    pub fn into_codes(self) -> NodeVec<Code> {
        self.codes
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// Returns `true` if the class picked out by `check` contains more than one node
    pub fn top_class_is_shared(&self, check: StabilityCheck) -> bool {
        let class_sizes = self.codes.iter().counts();
        let top_class_size = match check {
            StabilityCheck::LargestCode => class_sizes
                .into_iter()
                .max_by_key(|&(code, _)| code)
                .map(|(_, size)| size),
            StabilityCheck::MostPopulousClass => class_sizes.values().max().copied(),
        };
        top_class_size.unwrap_or(0) > 1
    }
}

index_vec::define_index_type! { pub(crate) struct NodeIdx = usize; }
pub(crate) type NodeVec<T> = index_vec::IndexVec<NodeIdx, T>;
