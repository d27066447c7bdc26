//! The Morgan-style refinement loop.

use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use itertools::Itertools;

use crate::{
    encode::{NodeIdx, NodeVec, Partition},
    signature::Signature,
    stabilize::{Stabilizer, Verdict},
    InvariantSource, Ranking, StabilityCheck, Warning, ITERATIONS_PER_NODE,
};

/// Configuration parameters for a refinement which don't change the initial invariants
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Which class to inspect when deciding if the partition has stabilised
    pub stability_check: StabilityCheck,
    /// If set, the refinement checks this flag before every iteration and stops early (with
    /// [`Warning::Aborted`]) once it becomes `true`
    pub abort_flag: Option<Arc<AtomicBool>>,
    /// Overrides the iteration budget, which is otherwise [`ITERATIONS_PER_NODE`] iterations per
    /// node.  Running out of iterations is reported as [`Warning::AttemptsExceeded`].
    pub max_iterations: Option<usize>,
}

impl Config {
    fn max_iterations(&self, num_nodes: usize) -> usize {
        self.max_iterations.unwrap_or(num_nodes * ITERATIONS_PER_NODE)
    }

    fn is_aborted(&self) -> bool {
        self.abort_flag
            .as_ref()
            .map_or(false, |flag| flag.load(Ordering::Relaxed))
    }
}

/// Rank the nodes of `source` by iterated refinement of their invariants.
///
/// Each iteration replaces every node's code with the product of its own code squared and the
/// codes of all its neighbours, then re-encodes those products into fresh codes.  Squaring the
/// node's own code stops the two ends of an `A-B` edge from getting the same product.  The loop
/// stops once the number of classes has stopped changing for long enough, or after `4 *
/// num_nodes` iterations (see [`Config::max_iterations`]).  Running out of iterations is reported as a [`Warning`] (and through
/// `log`), never as an error.
///
/// # Panics
///
/// Panics if `source` returns a neighbour which isn't one of its nodes.
pub fn refine<S: InvariantSource>(source: &S, config: &Config) -> Ranking<S::Node> {
    let (graph, initial_invariants) = DenseGraph::new(source);
    if graph.ids.is_empty() {
        return Ranking::empty();
    }

    let mut partition = Partition::encode(&initial_invariants);
    drop(initial_invariants);
    let mut stabilizer = Stabilizer::new(
        config.max_iterations(graph.ids.len()),
        partition.num_classes(),
    );
    log::trace!(
        "Refining {} nodes, starting with {} classes",
        graph.ids.len(),
        partition.num_classes()
    );

    let mut iterations = 0;
    let mut warnings = Vec::new();
    loop {
        if config.is_aborted() {
            log::warn!("morgan: refinement aborted after {} iterations", iterations);
            warnings.push(Warning::Aborted);
            break;
        }

        partition = Partition::encode(&graph.signatures(partition.codes()));
        iterations += 1;
        log::trace!(
            "Iteration {}: {} classes",
            iterations,
            partition.num_classes()
        );

        let top_class_is_shared = partition.top_class_is_shared(config.stability_check);
        match stabilizer.observe(partition.num_classes(), top_class_is_shared) {
            Verdict::Continue => {}
            Verdict::Stop => break,
            Verdict::ExtraAttempt => {
                log::warn!("morgan: {}", Warning::UniquenessDecreased);
                warnings.push(Warning::UniquenessDecreased);
            }
            Verdict::Exhausted => {
                log::warn!("morgan: {}", Warning::AttemptsExceeded);
                warnings.push(Warning::AttemptsExceeded);
                break;
            }
        }
    }

    log::debug!(
        "Ranked {} nodes into {} classes in {} iterations",
        graph.ids.len(),
        partition.num_classes(),
        iterations
    );
    let num_classes = partition.num_classes();
    let codes = graph.ids.into_iter().zip_eq(partition.into_codes()).collect();
    Ranking::new(codes, num_classes, iterations, warnings)
}

/// An [`InvariantSource`] flattened so that nodes can be referred to by index
struct DenseGraph<N> {
    /// Node IDs, in ascending order
    ids: NodeVec<N>,
    adjacency: NodeVec<Vec<NodeIdx>>,
}

impl<N: Clone + Ord + std::hash::Hash> DenseGraph<N> {
    /// Flatten `source`, also returning every node's initial invariant: its weight, along with
    /// the sorted weights of its edges.
    #[allow(clippy::type_complexity)]
    fn new<S: InvariantSource<Node = N>>(
        source: &S,
    ) -> (Self, NodeVec<(S::Weight, Vec<S::EdgeWeight>)>) {
        let (ids, weights): (Vec<N>, Vec<S::Weight>) = source
            .nodes()
            .sorted_by(|(a, _), (b, _)| a.cmp(b))
            .unzip();
        let ids = NodeVec::from_vec(ids);
        let id_to_index: HashMap<N, NodeIdx> = ids
            .iter_enumerated()
            .map(|(idx, id)| (id.clone(), idx))
            .collect();

        let mut adjacency = NodeVec::with_capacity(ids.len());
        let mut invariants = NodeVec::with_capacity(ids.len());
        for (id, weight) in ids.iter().zip_eq(weights) {
            let (neighbors, mut edge_weights): (Vec<NodeIdx>, Vec<S::EdgeWeight>) = source
                .neighbors(id)
                .map(|(other, edge_weight)| (id_to_index[&other], edge_weight))
                .unzip();
            edge_weights.sort();
            adjacency.push(neighbors);
            invariants.push((weight, edge_weights));
        }

        (Self { ids, adjacency }, invariants)
    }

    /// Compute every node's raw signature from the previous generation of codes
    fn signatures(&self, codes: &NodeVec<crate::Code>) -> NodeVec<Signature> {
        self.adjacency
            .iter_enumerated()
            .map(|(idx, neighbors)| {
                let own_code = codes[idx];
                let mut signature = Signature::from(own_code);
                signature *= own_code;
                for &n in neighbors {
                    signature *= codes[n];
                }
                signature
            })
            .collect()
    }
}
