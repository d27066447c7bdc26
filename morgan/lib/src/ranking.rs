use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter},
};

use itertools::Itertools;

use crate::Code;

/// A sign that a [`Ranking`] may be weaker than normal.  None of these are errors: the ranking
/// is still deterministic and usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Warning {
    /// The iteration budget ran out on an iteration which reduced the number of classes, so one
    /// extra iteration was run
    UniquenessDecreased,
    /// The iteration budget ran out before the partition stabilised
    AttemptsExceeded,
    /// The refinement was stopped early by its abort flag
    Aborted,
}

impl Display for Warning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Warning::UniquenessDecreased => {
                "number of attempts exceeded and uniqueness has decreased; making one last attempt"
            }
            Warning::AttemptsExceeded => "number of attempts exceeded",
            Warning::Aborted => "refinement aborted",
        })
    }
}

/// The result of ranking a graph: a [`Code`] for every node, where nodes share a `Code` exactly
/// when the refinement couldn't tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranking<N> {
    codes: BTreeMap<N, Code>,
    num_classes: usize,
    iterations: usize,
    warnings: Vec<Warning>,
}

impl<N: Ord> Ranking<N> {
    pub(crate) fn new(
        codes: BTreeMap<N, Code>,
        num_classes: usize,
        iterations: usize,
        warnings: Vec<Warning>,
    ) -> Self {
        Self {
            codes,
            num_classes,
            iterations,
            warnings,
        }
    }

    pub(crate) fn empty() -> Self {
        Self::new(BTreeMap::new(), 0, 0, Vec::new())
    }

    pub fn codes(&self) -> &BTreeMap<N, Code> {
        &self.codes
    }

    pub fn get(&self, node: &N) -> Option<Code> {
        self.codes.get(node).copied()
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    pub fn num_classes(&self) -> usize {
        self.num_classes
    }

    /// `true` if every node is in a class of its own
    pub fn is_discrete(&self) -> bool {
        self.num_classes == self.codes.len()
    }

    /// The number of refinement iterations which were run
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// `true` if the refinement hit its iteration budget or was aborted
    pub fn is_degraded(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn was_aborted(&self) -> bool {
        self.warnings.contains(&Warning::Aborted)
    }

    /// The equivalence classes of nodes, in ascending order of [`Code`].  Each class is sorted.
    pub fn classes(&self) -> Vec<Vec<&N>> {
        let mut classes = BTreeMap::<Code, Vec<&N>>::new();
        for (node, code) in &self.codes {
            classes.entry(*code).or_default().push(node);
        }
        classes.into_values().collect_vec()
    }

    /// Every node, sorted by [`Code`] and then by node.  This is the order in which a canonical
    /// serializer should visit the nodes.
    pub fn canonical_order(&self) -> Vec<&N> {
        self.codes
            .iter()
            .sorted_by_key(|(_, code)| **code) // Stable, so nodes stay in order within a class
            .map(|(node, _)| node)
            .collect_vec()
    }
}
