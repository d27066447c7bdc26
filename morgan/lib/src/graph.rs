//! A simple, self-validating store for molecular graphs.

use std::{
    cell::RefCell,
    collections::{BTreeMap, HashMap},
    fmt::Debug,
    hash::Hash,
};

use crate::{
    AttributedGraph, Config, EdgeAttributes, Error, InvariantFlags, NodeAttributes, Ranking,
    Result, StabilityCheck,
};

/// The attributes of one atom
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Atom {
    pub element: String,
    pub charge: i8,
    /// Mass number, or `None` for the natural isotope mixture
    pub isotope: Option<u16>,
    pub stereo: Option<i8>,
    /// 1 = sp3, 2 = sp2, 3 = sp, 4 = aromatic
    pub hybridization: u8,
    /// Number of non-hydrogen neighbours
    pub neighbors: u8,
}

impl Atom {
    /// An uncharged, sp3 atom of a given element, with no other marks
    pub fn new(element: impl Into<String>) -> Self {
        Self {
            element: element.into(),
            charge: 0,
            isotope: None,
            stereo: None,
            hybridization: 1,
            neighbors: 0,
        }
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_isotope(mut self, isotope: u16) -> Self {
        self.isotope = Some(isotope);
        self
    }

    pub fn with_stereo(mut self, stereo: i8) -> Self {
        self.stereo = Some(stereo);
        self
    }

    pub fn with_hybridization(mut self, hybridization: u8) -> Self {
        self.hybridization = hybridization;
        self
    }

    pub fn with_neighbors(mut self, neighbors: u8) -> Self {
        self.neighbors = neighbors;
        self
    }
}

impl NodeAttributes for Atom {
    fn element(&self) -> &str {
        &self.element
    }

    fn charge(&self) -> i8 {
        self.charge
    }

    fn isotope(&self) -> Option<u16> {
        self.isotope
    }

    fn stereo(&self) -> Option<i8> {
        self.stereo
    }

    fn hybridization(&self) -> u8 {
        self.hybridization
    }

    fn neighbors(&self) -> u8 {
        self.neighbors
    }
}

/// The attributes of one bond
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bond {
    /// 1, 2 or 3 for single/double/triple bonds, 4 for aromatic
    pub order: u8,
    pub stereo: Option<i8>,
}

impl Bond {
    pub fn new(order: u8) -> Self {
        Self {
            order,
            stereo: None,
        }
    }

    pub fn with_stereo(mut self, stereo: i8) -> Self {
        self.stereo = Some(stereo);
        self
    }
}

impl EdgeAttributes for Bond {
    fn order(&self) -> u8 {
        self.order
    }

    fn stereo(&self) -> Option<i8> {
        self.stereo
    }
}

/// The parts of a ranking request which can change the result
type RankingKey = (InvariantFlags, StabilityCheck, Option<usize>);

/// An undirected graph of [`Atom`]s joined by [`Bond`]s.  All modifications are checked, so a
/// `SimpleGraph` is always structurally consistent.
///
/// [`Ranking`]s are memoised per [`InvariantFlags`] and [`Config`] (apart from the abort flag), and
/// any modification clears the memo.
#[derive(Debug, Clone)]
pub struct SimpleGraph<N> {
    atoms: BTreeMap<N, Atom>,
    /// Every atom has an entry, and every bond is stored in both directions
    bonds: BTreeMap<N, BTreeMap<N, Bond>>,
    rankings: RefCell<HashMap<RankingKey, Ranking<N>>>,
}

impl<N: Clone + Ord + Hash + Debug> SimpleGraph<N> {
    pub fn new() -> Self {
        Self {
            atoms: BTreeMap::new(),
            bonds: BTreeMap::new(),
            rankings: RefCell::new(HashMap::new()),
        }
    }

    pub fn add_atom(&mut self, id: N, atom: Atom) -> Result<()> {
        if self.atoms.contains_key(&id) {
            return Err(Error::DuplicateNode(format!("{:?}", id)));
        }
        self.bonds.insert(id.clone(), BTreeMap::new());
        self.atoms.insert(id, atom);
        self.flush_cache();
        Ok(())
    }

    pub fn add_bond(&mut self, a: N, b: N, bond: Bond) -> Result<()> {
        for id in [&a, &b] {
            if !self.atoms.contains_key(id) {
                return Err(Error::UnknownNode(format!("{:?}", id)));
            }
        }
        if a == b {
            return Err(Error::SelfLoop(format!("{:?}", a)));
        }
        if self.bond(&a, &b).is_some() {
            return Err(Error::DuplicateBond(
                format!("{:?}", a),
                format!("{:?}", b),
            ));
        }
        // Both atoms exist, so both have an entry in `self.bonds`
        self.bonds.entry(a.clone()).or_default().insert(b.clone(), bond);
        self.bonds.entry(b).or_default().insert(a, bond);
        self.flush_cache();
        Ok(())
    }

    pub fn atom(&self, id: &N) -> Option<&Atom> {
        self.atoms.get(id)
    }

    pub fn bond(&self, a: &N, b: &N) -> Option<&Bond> {
        self.bonds.get(a)?.get(b)
    }

    /// The number of atoms
    pub fn len(&self) -> usize {
        self.atoms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.atoms.is_empty()
    }

    pub fn num_bonds(&self) -> usize {
        self.bonds.values().map(BTreeMap::len).sum::<usize>() / 2
    }

    /// Rank the atoms using the default [`Config`]
    pub fn ranking(&self, flags: InvariantFlags) -> Ranking<N> {
        self.ranking_with_config(flags, &Config::default())
    }

    /// Rank the atoms, reusing the last result computed with the same `flags` and
    /// [`StabilityCheck`].  Aborted rankings are never reused.
    pub fn ranking_with_config(&self, flags: InvariantFlags, config: &Config) -> Ranking<N> {
        let key = (flags, config.stability_check, config.max_iterations);
        if let Some(ranking) = self.rankings.borrow().get(&key) {
            return ranking.clone();
        }
        let ranking = crate::morgan_with_config(self, flags, config);
        if !ranking.was_aborted() {
            self.rankings.borrow_mut().insert(key, ranking.clone());
        }
        ranking
    }

    /// Forget all memoised [`Ranking`]s
    pub fn flush_cache(&self) {
        self.rankings.borrow_mut().clear();
    }
}

impl<N: Clone + Ord + Hash + Debug> Default for SimpleGraph<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: Clone + Ord + Hash + Debug> AttributedGraph for SimpleGraph<N> {
    type Node = N;
    type Atom = Atom;
    type Bond = Bond;

    fn atoms(&self) -> Box<dyn Iterator<Item = (&N, &Atom)> + '_> {
        Box::new(self.atoms.iter())
    }

    fn bonds(&self, node: &N) -> Box<dyn Iterator<Item = (&N, &Bond)> + '_> {
        match self.bonds.get(node) {
            Some(bonds) => Box::new(bonds.iter()),
            None => Box::new(std::iter::empty()),
        }
    }
}

/// Build a [`SimpleGraph`] from `(id, element)` pairs and `(id, id, order)` bonds
#[cfg(test)]
pub(crate) fn molecule<N: Clone + Ord + Hash + Debug>(
    atoms: &[(N, &str)],
    bonds: &[(N, N, u8)],
) -> SimpleGraph<N> {
    let mut graph = SimpleGraph::new();
    for (id, element) in atoms {
        graph.add_atom(id.clone(), Atom::new(*element)).unwrap();
    }
    for (a, b, order) in bonds {
        graph
            .add_bond(a.clone(), b.clone(), Bond::new(*order))
            .unwrap();
    }
    graph
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_bonds() {
        let mut graph = molecule(&[(1, "C"), (2, "O")], &[(1, 2, 2)]);
        assert_eq!(
            graph.add_atom(2, Atom::new("N")),
            Err(Error::DuplicateNode("2".to_owned()))
        );
        assert_eq!(
            graph.add_bond(1, 3, Bond::new(1)),
            Err(Error::UnknownNode("3".to_owned()))
        );
        assert_eq!(
            graph.add_bond(1, 1, Bond::new(1)),
            Err(Error::SelfLoop("1".to_owned()))
        );
        assert_eq!(
            graph.add_bond(2, 1, Bond::new(1)),
            Err(Error::DuplicateBond("2".to_owned(), "1".to_owned()))
        );
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.num_bonds(), 1);
        assert_eq!(graph.bond(&2, &1), Some(&Bond::new(2)));
    }

    #[test]
    fn rankings_are_memoised_until_modified() {
        let mut graph = molecule(&[("a", "C"), ("b", "C")], &[("a", "b", 1)]);
        let flags = InvariantFlags::default();
        assert_eq!(graph.ranking(flags).num_classes(), 1);
        assert_eq!(graph.rankings.borrow().len(), 1);
        // Different flags are a different request
        graph.ranking(InvariantFlags::ALL);
        assert_eq!(graph.rankings.borrow().len(), 2);
        // So is a capped budget, which mustn't leak into uncapped rankings
        let capped = Config {
            max_iterations: Some(1),
            ..Config::default()
        };
        assert!(graph.ranking_with_config(flags, &capped).is_degraded());
        assert_eq!(graph.rankings.borrow().len(), 3);
        assert!(!graph.ranking(flags).is_degraded());

        graph.add_atom("c", Atom::new("O")).unwrap();
        assert!(graph.rankings.borrow().is_empty());
        graph.add_bond("b", "c", Bond::new(1)).unwrap();
        assert_eq!(graph.ranking(flags).num_classes(), 3);
        graph.flush_cache();
        assert!(graph.rankings.borrow().is_empty());
    }
}
