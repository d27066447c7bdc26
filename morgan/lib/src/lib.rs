//! Morgan is a deterministic engine for ranking the nodes of attributed graphs, such as the atoms
//! of a molecule.
//!
//! # Description
//!
//! A [`Ranking`] assigns every node a [`Code`] so that nodes which can't be told apart get the
//! same code.  Codes are isomorphism-invariant: relabelling the nodes of a graph never changes
//! which code each node gets.  This makes rankings suitable for canonical atom numbering (see
//! [`Ranking::canonical_order`]), signature generation and symmetry detection.
//!
//! Ranking is done by an extended-connectivity refinement in the style of Morgan's algorithm.
//! Each node starts with an invariant built from its own attributes (selected by
//! [`InvariantFlags`]) and the weights of its bonds.  Then each iteration mixes the codes of every
//! node's neighbours into its own code, until the number of classes stops improving.
//!
//! Refinement of this kind is not a perfect canonicaliser: there are non-isomorphic graphs which
//! it can't tell apart, and some graphs make it plateau.  The iteration budget is always bounded
//! (see [`ITERATIONS_PER_NODE`]), and results which ran into that budget are flagged with
//! [`Warning`]s rather than errors.
//!
//! # Usage
//!
//! The quickest way in is [`SimpleGraph`], which can be ranked directly (and caches its
//! rankings).  Other graph stores can implement [`AttributedGraph`] and call [`morgan`], and
//! anything at all can be ranked by implementing [`InvariantSource`] and calling [`refine`].

#![deny(clippy::all)]
#![deny(rustdoc::broken_intra_doc_links, rustdoc::private_intra_doc_links)]

mod encode;
mod error;
mod graph;
mod invariant;
mod prime;
mod ranking;
mod refine;
mod signature;
mod stabilize;

pub use encode::Code;
pub use error::{Error, Result};
pub use graph::{Atom, Bond, SimpleGraph};
pub use invariant::{
    AttributedGraph, Component, EdgeAttributes, EdgeWeight, FlaggedGraph, InvariantFlags,
    InvariantSource, NodeAttributes, SemanticWeight,
};
pub use prime::Primes;
pub use ranking::{Ranking, Warning};
pub use refine::{refine, Config};
pub use stabilize::{StabilityCheck, ITERATIONS_PER_NODE};

/// Rank the atoms of `graph`, using the attributes enabled in `flags` and the default
/// [`Config`].
pub fn morgan<G: AttributedGraph>(graph: &G, flags: InvariantFlags) -> Ranking<G::Node> {
    morgan_with_config(graph, flags, &Config::default())
}

/// Rank the atoms of `graph`, using the attributes enabled in `flags`
pub fn morgan_with_config<G: AttributedGraph>(
    graph: &G,
    flags: InvariantFlags,
    config: &Config,
) -> Ranking<G::Node> {
    refine(&FlaggedGraph::new(graph, flags), config)
}
