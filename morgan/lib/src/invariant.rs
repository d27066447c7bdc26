//! The interface between the refinement engine and whatever graph it's ranking.
//!
//! The engine itself only needs an [`InvariantSource`]: a set of nodes, each with some comparable
//! starting weight, and weighted adjacency.  For chemical graphs, [`FlaggedGraph`] builds those
//! weights out of atom and bond attributes, with each attribute switched on or off by
//! [`InvariantFlags`].

use std::{fmt::Debug, hash::Hash};

/// Something which can be ranked by [`refine`](crate::refine).
///
/// Implementors must be structurally consistent: every neighbour returned by
/// [`neighbors`](Self::neighbors) must also be returned by [`nodes`](Self::nodes), and
/// adjacency must be symmetric.
pub trait InvariantSource {
    /// Identifies a node.  The ordering is only used to make the output deterministic; any
    /// comparable key will do.
    type Node: Clone + Ord + Hash + Debug;
    /// The starting weight of each node
    type Weight: Ord;
    /// The weight of each edge
    type EdgeWeight: Ord;

    /// Every node of the graph, along with its starting weight.  Each node must appear once.
    fn nodes(&self) -> Box<dyn Iterator<Item = (Self::Node, Self::Weight)> + '_>;

    /// Every neighbour of `node`, along with the weight of the edge joining them
    fn neighbors(
        &self,
        node: &Self::Node,
    ) -> Box<dyn Iterator<Item = (Self::Node, Self::EdgeWeight)> + '_>;
}

///////////
// FLAGS //
///////////

/// Which attributes of an atom (and bond) contribute to its starting weight.  Two atoms which
/// only differ in disabled attributes will always get the same starting weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InvariantFlags {
    /// Distinguish elements and charges
    pub element: bool,
    /// Distinguish isotopes
    pub isotope: bool,
    /// Distinguish stereo marks of atoms and bonds
    pub stereo: bool,
    /// Distinguish hybridization states
    pub hybridization: bool,
    /// Distinguish the number of (non-hydrogen) neighbours.  Mostly useful for query structures.
    pub neighbors: bool,
}

impl InvariantFlags {
    /// Every attribute contributes
    pub const ALL: Self = Self {
        element: true,
        isotope: true,
        stereo: true,
        hybridization: true,
        neighbors: true,
    };
    /// No attribute contributes, so only the graph's topology (and bond orders) are ranked
    pub const NONE: Self = Self {
        element: false,
        isotope: false,
        stereo: false,
        hybridization: false,
        neighbors: false,
    };

    /// Project the enabled attributes of an atom into its [`SemanticWeight`].  Disabled
    /// attributes are left out entirely.
    pub fn semantic_weight(self, atom: &impl NodeAttributes) -> SemanticWeight {
        let mut components = Vec::new();
        if self.element {
            components.push(Component::Element {
                symbol: atom.element().to_owned(),
                charge: atom.charge(),
            });
        }
        if self.isotope {
            components.push(Component::Isotope(atom.isotope()));
        }
        if self.stereo {
            components.push(Component::Stereo(atom.stereo()));
        }
        if self.hybridization {
            components.push(Component::Hybridization(atom.hybridization()));
        }
        if self.neighbors {
            components.push(Component::Neighbors(atom.neighbors()));
        }
        SemanticWeight(components)
    }

    /// Project a bond into its [`EdgeWeight`].  The bond's stereo mark is only included if
    /// [`stereo`](Self::stereo) is set.
    pub fn edge_weight(self, bond: &impl EdgeAttributes) -> EdgeWeight {
        match bond.stereo() {
            Some(mark) if self.stereo => EdgeWeight::Stereo(bond.order(), mark),
            _ => EdgeWeight::Plain(bond.order()),
        }
    }
}

impl Default for InvariantFlags {
    fn default() -> Self {
        Self {
            element: true,
            ..Self::NONE
        }
    }
}

/// One attribute's contribution to a [`SemanticWeight`]
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Component {
    Element { symbol: String, charge: i8 },
    Isotope(Option<u16>),
    Stereo(Option<i8>),
    Hybridization(u8),
    Neighbors(u8),
}

/// The starting weight of an atom: the [`Component`]s of every enabled attribute, always in the
/// same order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SemanticWeight(Vec<Component>);

impl SemanticWeight {
    pub fn components(&self) -> &[Component] {
        &self.0
    }
}

/// The weight of a bond
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EdgeWeight {
    /// Just the bond order
    Plain(u8),
    /// Bond order and stereo mark
    Stereo(u8, i8),
}

////////////////
// ATTRIBUTES //
////////////////

/// The attributes of an atom which can contribute to its [`SemanticWeight`]
pub trait NodeAttributes {
    fn element(&self) -> &str;
    fn charge(&self) -> i8;
    fn isotope(&self) -> Option<u16>;
    fn stereo(&self) -> Option<i8>;
    fn hybridization(&self) -> u8;
    fn neighbors(&self) -> u8;
}

/// The attributes of a bond which can contribute to its [`EdgeWeight`]
pub trait EdgeAttributes {
    fn order(&self) -> u8;
    fn stereo(&self) -> Option<i8>;
}

/// A graph of atoms joined by bonds
pub trait AttributedGraph {
    type Node: Clone + Ord + Hash + Debug;
    type Atom: NodeAttributes;
    type Bond: EdgeAttributes;

    fn atoms(&self) -> Box<dyn Iterator<Item = (&Self::Node, &Self::Atom)> + '_>;

    /// Every bond of `node`, along with the atom on the other end
    fn bonds(&self, node: &Self::Node) -> Box<dyn Iterator<Item = (&Self::Node, &Self::Bond)> + '_>;
}

/// An [`AttributedGraph`], viewed as an [`InvariantSource`] through a set of [`InvariantFlags`]
#[derive(Debug, Clone, Copy)]
pub struct FlaggedGraph<'graph, G> {
    graph: &'graph G,
    flags: InvariantFlags,
}

impl<'graph, G: AttributedGraph> FlaggedGraph<'graph, G> {
    pub fn new(graph: &'graph G, flags: InvariantFlags) -> Self {
        Self { graph, flags }
    }
}

impl<G: AttributedGraph> InvariantSource for FlaggedGraph<'_, G> {
    type Node = G::Node;
    type Weight = SemanticWeight;
    type EdgeWeight = EdgeWeight;

    fn nodes(&self) -> Box<dyn Iterator<Item = (G::Node, SemanticWeight)> + '_> {
        let flags = self.flags;
        Box::new(
            self.graph
                .atoms()
                .map(move |(node, atom)| (node.clone(), flags.semantic_weight(atom))),
        )
    }

    fn neighbors(&self, node: &G::Node) -> Box<dyn Iterator<Item = (G::Node, EdgeWeight)> + '_> {
        let flags = self.flags;
        Box::new(
            self.graph
                .bonds(node)
                .map(move |(other, bond)| (other.clone(), flags.edge_weight(bond))),
        )
    }
}
