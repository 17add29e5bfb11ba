//! The [block-cut tree](https://en.wikipedia.org/wiki/Biconnected_component#Block-cut_tree)
//! produced by the decomposition.
//!
//! Nodes live in a single arena and refer to each other by [`BcIndex`].
//! Every tree edge is stored twice, once in the neighbour list of each
//! endpoint, and each half knows the position of its partner so that
//! "the link I came in through" can be found in constant time.
use std::ops::Index;

use petgraph::graph::{DefaultIx, EdgeIndex, IndexType, NodeIndex};

/// Handle of a node in a [`BlockCutForest`]
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BcIndex(usize);

impl BcIndex {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BcKind {
    /// A biconnected component
    Block,
    /// A single articulation point
    Cut,
}

/// One half of a tree edge
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Link {
    pub(crate) to: BcIndex,
    // forest[to].neighbors[reverse] points back at us
    pub(crate) reverse: usize,
    pub(crate) marked: bool,
}

impl Link {
    pub fn to(&self) -> BcIndex {
        self.to
    }

    pub fn reverse(&self) -> usize {
        self.reverse
    }

    /// Whether following this link leads towards a controller
    pub fn is_marked(&self) -> bool {
        self.marked
    }
}

#[derive(Clone, Debug)]
pub struct BcNode<Ix = DefaultIx> {
    kind: BcKind,
    pub(crate) neighbors: Vec<Link>,
    pub(crate) has_controller: bool,
    pub(crate) has_start: bool,
    pub(crate) points: Vec<NodeIndex<Ix>>,
    pub(crate) edges: Vec<EdgeIndex<Ix>>,
}

impl<Ix: IndexType> BcNode<Ix> {
    fn new(kind: BcKind) -> Self {
        Self {
            kind,
            neighbors: Vec::new(),
            has_controller: false,
            has_start: false,
            points: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn kind(&self) -> BcKind {
        self.kind
    }

    pub fn neighbors(&self) -> &[Link] {
        &self.neighbors
    }

    pub fn has_controller(&self) -> bool {
        self.has_controller
    }

    pub fn has_start(&self) -> bool {
        self.has_start
    }

    /// Member points in the order they were collected.
    ///
    /// A point can occur more than once in a block if it is reached by
    /// several edges of the block.
    pub fn points(&self) -> &[NodeIndex<Ix>] {
        &self.points
    }

    /// Edges inside the block, empty for cut vertices
    pub fn edges(&self) -> &[EdgeIndex<Ix>] {
        &self.edges
    }
}

/// All block-cut trees of one decomposition
#[derive(Clone, Debug)]
pub struct BlockCutForest<Ix = DefaultIx> {
    pub(crate) nodes: Vec<BcNode<Ix>>,
    pub(crate) controller_nodes: Vec<BcIndex>,
    pub(crate) start_nodes: Vec<BcIndex>,
    pub(crate) roots: Vec<BcIndex>,
}

impl<Ix: IndexType> Default for BlockCutForest<Ix> {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            controller_nodes: Vec::new(),
            start_nodes: Vec::new(),
            roots: Vec::new(),
        }
    }
}

impl<Ix: IndexType> BlockCutForest<Ix> {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = (BcIndex, &BcNode<Ix>)> {
        self.nodes.iter().enumerate().map(|(i, n)| (BcIndex(i), n))
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BcNode<Ix>> {
        self.nodes.iter().filter(|n| n.kind == BcKind::Block)
    }

    /// Nodes containing a controller, in registration order
    pub fn controller_nodes(&self) -> &[BcIndex] {
        &self.controller_nodes
    }

    /// Nodes containing a start point or start edge, in registration order
    pub fn start_nodes(&self) -> &[BcIndex] {
        &self.start_nodes
    }

    /// The last block extracted for each decomposed component
    pub fn roots(&self) -> &[BcIndex] {
        &self.roots
    }

    pub(crate) fn add_node(&mut self, kind: BcKind) -> BcIndex {
        self.nodes.push(BcNode::new(kind));
        BcIndex(self.nodes.len() - 1)
    }

    pub(crate) fn flag_controller(&mut self, node: BcIndex) {
        if !self.nodes[node.0].has_controller {
            self.nodes[node.0].has_controller = true;
            self.controller_nodes.push(node);
        }
    }

    pub(crate) fn flag_start(&mut self, node: BcIndex) {
        if !self.nodes[node.0].has_start {
            self.nodes[node.0].has_start = true;
            self.start_nodes.push(node);
        }
    }

    /// Add a tree edge between `a` and `b`.
    ///
    /// Both halves are created together with matching reverse indices.
    /// Callers must not link the same pair twice.
    pub(crate) fn connect(&mut self, a: BcIndex, b: BcIndex) {
        let rev_a = self.nodes[b.0].neighbors.len();
        let rev_b = self.nodes[a.0].neighbors.len();
        self.nodes[a.0].neighbors.push(Link {
            to: b,
            reverse: rev_a,
            marked: false,
        });
        self.nodes[b.0].neighbors.push(Link {
            to: a,
            reverse: rev_b,
            marked: false,
        });
    }

    pub(crate) fn node_mut(&mut self, node: BcIndex) -> &mut BcNode<Ix> {
        &mut self.nodes[node.0]
    }
}

impl<Ix> Index<BcIndex> for BlockCutForest<Ix> {
    type Output = BcNode<Ix>;

    fn index(&self, index: BcIndex) -> &Self::Output {
        &self.nodes[index.0]
    }
}
