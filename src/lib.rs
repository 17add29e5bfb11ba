//! Find the upstream features of a utility network.
//!
//! A network is an undirected graph of points joined by edges. Some points
//! are *controllers*, and some points and edges are *starts*. The upstream
//! features of a start are the edges and points lying between it and a
//! controller.
//!
//! The network is split into its [biconnected
//! components](https://en.wikipedia.org/wiki/Biconnected_component), which
//! are arranged into block-cut trees. Each tree edge is then directed
//! towards the controllers, and the trees are flooded from the starts
//! along these directions.
//!
//! # Example
//!
//! ```
//! use wupstream::NetworkBuilder;
//!
//! // A - B - C, where the edge A - B is a start and C is a controller
//! let mut builder = NetworkBuilder::new(["e1"]);
//! builder.add_edge("A", "B", "e1");
//! builder.add_edge("B", "C", "e2");
//! builder.mark_controller("C");
//! let network = builder.finish_load();
//!
//! assert_eq!(network.upstream_features(), ["e1", "B", "e2", "C"]);
//! ```
//!
//! The decomposition is also available for any petgraph graph:
//!
//! ```
//! use petgraph::graph::UnGraph;
//! use wupstream::Bcc;
//!
//! // construct a simple graph
//! let g = UnGraph::<(), ()>::from_edges([
//!    (0, 1),
//!    (1, 2)
//!  ]);
//!
//! // Get a vector of the biconnected components defined by their node indices
//! let bcc = g.bcc();
//! assert_eq!(bcc.len(), 2);
//! for bcc_nodes in bcc {
//!    println!("Found biconnected component with nodes {bcc_nodes:?}");
//! }
//! ```
pub mod block_cut;
mod error;
mod hopcroft_tarjan;
pub mod load;
mod network;
mod upstream;

use petgraph::graph::{IndexType, NodeIndex, UnGraph};

pub use block_cut::{BcIndex, BcKind, BcNode, BlockCutForest, Link};
pub use error::{Error, Result};
pub use hopcroft_tarjan::{EveryPoint, Roles};
pub use network::{Network, NetworkBuilder, Point, Via};

use hopcroft_tarjan::HopcroftTarjan;

pub trait Bcc {
    type Output;

    /// Return all biconnected components
    fn bcc(&self) -> Self::Output;
}

impl<N, E, Ix: IndexType> Bcc for UnGraph<N, E, Ix> {
    type Output = Vec<Vec<NodeIndex<Ix>>>;

    fn bcc(&self) -> Self::Output {
        let forest = block_cut_forest(self, &EveryPoint);
        forest
            .blocks()
            .map(|block| {
                let mut nodes = block.points().to_vec();
                nodes.sort_unstable();
                nodes.dedup();
                nodes
            })
            .collect()
    }
}

/// Decompose `graph`, starting a search from every point accepted by
/// [`Roles::is_root`]
pub fn block_cut_forest<N, E, Ix, R>(graph: &UnGraph<N, E, Ix>, roles: &R) -> BlockCutForest<Ix>
where
    Ix: IndexType,
    R: Roles<N, E>,
{
    HopcroftTarjan::new(graph, roles).find_block_cut_forest()
}
