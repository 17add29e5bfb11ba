// Biconnected components and the block-cut tree using the algorithm from
// Hopcroft, J.; Tarjan, R.
// "Algorithm 447: efficient algorithms for graph manipulation".
// Communications of the ACM. 16 (6): 372–378.
// [doi:10.1145/362248.362272](https://doi.org/10.1145%2F362248.362272).
//
// Blocks are extracted online from a stack of visited edges, and the
// depth-first search itself runs on an explicit stack so that long chains
// cannot exhaust the call stack.
use std::cmp::min;

use petgraph::graph::{EdgeIndex, IndexType, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::block_cut::{BcIndex, BcKind, BlockCutForest};

/// Tells the decomposition where to start and which points and edges
/// are of interest.
pub trait Roles<N, E> {
    /// Start a new search from this point if it has not been reached yet
    fn is_root(&self, point: &N) -> bool;

    fn is_controller(&self, _point: &N) -> bool {
        false
    }

    fn is_start(&self, _point: &N) -> bool {
        false
    }

    fn is_start_edge(&self, _edge: &E) -> bool {
        false
    }
}

/// Decompose every component, flag nothing
#[derive(Copy, Clone, Debug, Default)]
pub struct EveryPoint;

impl<N, E> Roles<N, E> for EveryPoint {
    fn is_root(&self, _point: &N) -> bool {
        true
    }
}

// Edge on the block stack, `to` is the far end of `edge`
#[derive(Copy, Clone, Debug)]
struct Visit<Ix> {
    from: NodeIndex<Ix>,
    edge: EdgeIndex<Ix>,
    to: NodeIndex<Ix>,
}

// Point currently on the depth-first search path
#[derive(Copy, Clone, Debug)]
struct Frame<Ix> {
    node: NodeIndex<Ix>,
    // range of this point's arcs in `HopcroftTarjan::arcs`
    first_arc: usize,
    next_arc: usize,
    end_arc: usize,
    children: usize,
}

pub(crate) struct HopcroftTarjan<'a, N, E, Ix: IndexType, R> {
    graph: &'a UnGraph<N, E, Ix>,
    roles: &'a R,
    visited: Vec<bool>,
    depth: Vec<usize>,
    lowpoint: Vec<usize>,
    parent: Vec<Option<NodeIndex<Ix>>>,
    articulation: Vec<Option<BcIndex>>,
    // last block each cut vertex was linked to, by point
    linked_block: Vec<Option<BcIndex>>,
    time: usize,
    path: Vec<Frame<Ix>>,
    arcs: Vec<(EdgeIndex<Ix>, NodeIndex<Ix>)>,
    block_stack: Vec<Visit<Ix>>,
    forest: BlockCutForest<Ix>,
}

impl<'a, N, E, Ix: IndexType, R: Roles<N, E>> HopcroftTarjan<'a, N, E, Ix, R> {
    pub(crate) fn new(graph: &'a UnGraph<N, E, Ix>, roles: &'a R) -> Self {
        let nnodes = graph.node_count();
        Self {
            graph,
            roles,
            visited: vec![false; nnodes],
            depth: vec![0; nnodes],
            lowpoint: vec![0; nnodes],
            parent: vec![None; nnodes],
            articulation: vec![None; nnodes],
            linked_block: vec![None; nnodes],
            time: 0,
            path: Vec::new(),
            arcs: Vec::new(),
            block_stack: Vec::new(),
            forest: BlockCutForest::default(),
        }
    }

    pub(crate) fn find_block_cut_forest(mut self) -> BlockCutForest<Ix> {
        for root in self.graph.node_indices() {
            if self.visited[root.index()] || !self.roles.is_root(&self.graph[root]) {
                continue;
            }
            self.time = 0;
            self.search_from(root);
            // whatever is left belongs to the block containing the root
            let first = self.block_stack.first().map(|v| v.to);
            let block = match first {
                Some(to) => self.unwind_block(root, to),
                None => self.unwind_block(root, root),
            };
            self.forest.roots.push(block);
        }
        self.forest
    }

    fn enter(&mut self, node: NodeIndex<Ix>) {
        let i = node.index();
        self.visited[i] = true;
        self.depth[i] = self.time;
        self.lowpoint[i] = self.time;
        self.time += 1;

        let start = self.arcs.len();
        self.arcs
            .extend(self.graph.edges(node).map(|e| (e.id(), e.target())));
        // petgraph hands out the newest edge first
        self.arcs[start..].sort_unstable_by_key(|&(e, _)| e);
        self.path.push(Frame {
            node,
            first_arc: start,
            next_arc: start,
            end_arc: self.arcs.len(),
            children: 0,
        });
    }

    fn search_from(&mut self, root: NodeIndex<Ix>) {
        self.parent[root.index()] = None;
        self.enter(root);
        while let Some(frame) = self.path.last_mut() {
            let node = frame.node;
            if frame.next_arc == frame.end_arc {
                self.arcs.truncate(frame.first_arc);
                self.leave(node);
                continue;
            }
            let (edge, n) = self.arcs[frame.next_arc];
            frame.next_arc += 1;

            let (i, j) = (node.index(), n.index());
            if !self.visited[j] {
                frame.children += 1;
                self.block_stack.push(Visit { from: node, edge, to: n });
                self.parent[j] = Some(node);
                self.enter(n);
            } else if self.parent[i] != Some(n) && self.depth[j] < self.depth[i] {
                self.block_stack.push(Visit { from: node, edge, to: n });
                self.lowpoint[i] = min(self.lowpoint[i], self.depth[j]);
            }
        }
    }

    // `child` is done, continue in its parent
    fn leave(&mut self, child: NodeIndex<Ix>) {
        self.path.pop();
        let Some(&frame) = self.path.last() else {
            return;
        };
        let node = frame.node;
        let (i, j) = (node.index(), child.index());
        self.lowpoint[i] = min(self.lowpoint[i], self.lowpoint[j]);

        let is_root = self.parent[i].is_none();
        let is_cut_vx = if is_root {
            // The starting node is only a cut vertex if it has more
            // than one child
            frame.children > 1
        } else {
            self.lowpoint[j] >= self.depth[i]
        };
        if !is_cut_vx {
            return;
        }
        if self.articulation[i].is_none() {
            self.add_cut_vertex(node);
        }
        // also links the new block to the cut vertex
        self.unwind_block(node, child);
    }

    fn add_cut_vertex(&mut self, point: NodeIndex<Ix>) {
        let cut = self.forest.add_node(BcKind::Cut);
        self.forest.node_mut(cut).points.push(point);
        let weight = &self.graph[point];
        if self.roles.is_controller(weight) {
            self.forest.flag_controller(cut);
        }
        if self.roles.is_start(weight) {
            self.forest.flag_start(cut);
        }
        self.articulation[point.index()] = Some(cut);
    }

    // Pop the block stack down to and including the edge `p` -> `n`
    // and collect everything into a new block.
    fn unwind_block(&mut self, p: NodeIndex<Ix>, n: NodeIndex<Ix>) -> BcIndex {
        let block = self.forest.add_node(BcKind::Block);
        while let Some(visit) = self.block_stack.pop() {
            self.pop_visit(p, block, visit);
            if visit.from == p && visit.to == n {
                break;
            }
        }

        self.forest.node_mut(block).points.push(p);
        let cut = self.articulation[p.index()];
        match cut {
            Some(cut) => self.link_cut(p, cut, block),
            None => self.propagate_roles(p, block),
        }
        block
    }

    fn pop_visit(&mut self, p: NodeIndex<Ix>, block: BcIndex, visit: Visit<Ix>) {
        if self.roles.is_start_edge(&self.graph[visit.edge]) {
            self.forest.flag_start(block);
        }
        let node = self.forest.node_mut(block);
        node.points.push(visit.to);
        node.edges.push(visit.edge);
        let cut = self.articulation[visit.to.index()];
        match cut {
            None => self.propagate_roles(visit.to, block),
            Some(cut) if self.articulation[p.index()] != Some(cut) => {
                self.link_cut(visit.to, cut, block)
            }
            Some(_) => {}
        }
    }

    // A block can meet the same cut vertex through several of its edges,
    // but all of them are popped while that block is unwound.
    fn link_cut(&mut self, point: NodeIndex<Ix>, cut: BcIndex, block: BcIndex) {
        let last = &mut self.linked_block[point.index()];
        if *last != Some(block) {
            *last = Some(block);
            self.forest.connect(cut, block);
        }
    }

    fn propagate_roles(&mut self, point: NodeIndex<Ix>, block: BcIndex) {
        let weight = &self.graph[point];
        if self.roles.is_controller(weight) {
            self.forest.flag_controller(block);
        }
        if self.roles.is_start(weight) {
            self.forest.flag_start(block);
        }
    }
}

#[cfg(test)]
mod tests {
    use petgraph::Graph;

    use super::*;

    struct Flags;

    // point weights: (controller, start), edge weights: start
    impl Roles<(bool, bool), bool> for Flags {
        fn is_root(&self, point: &(bool, bool)) -> bool {
            point.0
        }

        fn is_controller(&self, point: &(bool, bool)) -> bool {
            point.0
        }

        fn is_start(&self, point: &(bool, bool)) -> bool {
            point.1
        }

        fn is_start_edge(&self, edge: &bool) -> bool {
            *edge
        }
    }

    fn decompose<N, E>(g: &UnGraph<N, E>, roles: &impl Roles<N, E>) -> BlockCutForest {
        HopcroftTarjan::new(g, roles).find_block_cut_forest()
    }

    fn kinds(f: &BlockCutForest) -> (usize, usize) {
        let blocks = f.blocks().count();
        (blocks, f.len() - blocks)
    }

    fn assert_no_parallel_links(f: &BlockCutForest) {
        for (i, node) in f.nodes() {
            let mut to: Vec<_> = node.neighbors().iter().map(|l| l.to()).collect();
            to.sort_unstable();
            to.dedup();
            assert_eq!(to.len(), node.neighbors().len(), "parallel links at {i:?}");
        }
    }

    #[test]
    fn empty() {
        let g: UnGraph<(), ()> = UnGraph::default();
        assert!(decompose(&g, &EveryPoint).is_empty());
    }

    #[test]
    fn isolated_point() {
        let mut g: UnGraph<(), ()> = UnGraph::default();
        let a = g.add_node(());
        let f = decompose(&g, &EveryPoint);
        assert_eq!(f.len(), 1);
        assert_eq!(f.roots().len(), 1);
        let root = &f[f.roots()[0]];
        assert_eq!(root.points(), [a]);
        assert!(root.edges().is_empty());
        assert!(root.neighbors().is_empty());
    }

    #[test]
    fn path_has_one_cut() {
        let g: UnGraph<(), ()> = Graph::from_edges([(0, 1), (1, 2)]);
        let f = decompose(&g, &EveryPoint);
        assert_eq!(kinds(&f), (2, 1));
        let (_, cut) = f.nodes().find(|(_, n)| n.kind() == BcKind::Cut).unwrap();
        assert_eq!(cut.points(), [NodeIndex::new(1)]);
        assert_eq!(cut.neighbors().len(), 2);
        for block in f.blocks() {
            assert_eq!(block.points().len(), 2);
            assert_eq!(block.edges().len(), 1);
            assert_eq!(block.neighbors().len(), 1);
        }
    }

    #[test]
    fn root_with_two_children() {
        let g: UnGraph<(), ()> = Graph::from_edges([(0, 1), (0, 2)]);
        let f = decompose(&g, &EveryPoint);
        assert_eq!(kinds(&f), (2, 1));
        assert_eq!(f.roots().len(), 1);
        // the block left on the stack hangs off the root's cut vertex
        assert_eq!(f[f.roots()[0]].neighbors().len(), 1);
    }

    #[test]
    fn cycle_with_chord() {
        let g: UnGraph<(), ()> =
            Graph::from_edges([(0, 1), (1, 2), (2, 3), (3, 4), (4, 0), (1, 3)]);
        let f = decompose(&g, &EveryPoint);
        assert_eq!(kinds(&f), (1, 0));
        let block = f.blocks().next().unwrap();
        let mut points = block.points().to_vec();
        points.sort();
        points.dedup();
        assert_eq!(points.len(), 5);
        assert_eq!(block.edges().len(), 6);
    }

    #[test]
    fn deep_chain() {
        let n = 200_000;
        let g: UnGraph<(), ()> = Graph::from_edges((0..n - 1).map(|i| (i, i + 1)));
        let f = decompose(&g, &EveryPoint);
        assert_eq!(kinds(&f), (n as usize - 1, n as usize - 2));
    }

    #[test]
    fn wide_star() {
        let k = 200_000;
        let g: UnGraph<(), ()> = Graph::from_edges((1..=k).map(|i| (0, i)));
        let f = decompose(&g, &EveryPoint);
        assert_eq!(kinds(&f), (k as usize, 1));
        let (_, hub) = f.nodes().find(|(_, n)| n.kind() == BcKind::Cut).unwrap();
        assert_eq!(hub.points(), [NodeIndex::new(0)]);
        assert_eq!(hub.neighbors().len(), k as usize);
        assert_no_parallel_links(&f);
    }

    #[test]
    fn ring_with_pendants() {
        // every point on the ring has one leaf hanging off it
        let k = 100_000;
        let ring = (0..k).map(|i| (i, (i + 1) % k));
        let pendants = (0..k).map(|i| (i, k + i));
        let g: UnGraph<(), ()> = Graph::from_edges(ring.chain(pendants));
        let f = decompose(&g, &EveryPoint);
        assert_eq!(kinds(&f), (k as usize + 1, k as usize));
        let ring_block = f.blocks().find(|b| b.edges().len() == k as usize).unwrap();
        assert_eq!(ring_block.neighbors().len(), k as usize);
        assert_no_parallel_links(&f);
    }

    #[test]
    fn cut_met_twice_in_one_block() {
        // 1 is entered by a tree edge and reached again by the back edge
        // 3 - 1, both inside the block {0, 1, 2, 3}
        let g: UnGraph<(), ()> =
            Graph::from_edges([(0, 1), (1, 2), (2, 3), (3, 1), (3, 0), (1, 4)]);
        let f = decompose(&g, &EveryPoint);
        assert_eq!(kinds(&f), (2, 1));
        let (_, cut) = f.nodes().find(|(_, n)| n.kind() == BcKind::Cut).unwrap();
        assert_eq!(cut.points(), [NodeIndex::new(1)]);
        assert_eq!(cut.neighbors().len(), 2);
        for block in f.blocks() {
            assert_eq!(block.neighbors().len(), 1);
        }
        assert_no_parallel_links(&f);
    }

    #[test]
    fn self_loop_and_multi_edge() {
        let g: UnGraph<(), ()> = Graph::from_edges([(0, 0), (0, 1), (0, 1), (1, 2)]);
        let f = decompose(&g, &EveryPoint);
        assert_eq!(kinds(&f), (2, 1));
    }

    #[test]
    fn only_controller_components() {
        let mut g: UnGraph<(bool, bool), bool> = UnGraph::default();
        let a = g.add_node((true, false));
        let b = g.add_node((false, false));
        let c = g.add_node((false, true));
        let d = g.add_node((false, true));
        g.add_edge(a, b, false);
        g.add_edge(c, d, true);
        let f = decompose(&g, &Flags);
        assert_eq!(f.len(), 1);
        assert_eq!(f.controller_nodes().len(), 1);
        assert!(f.start_nodes().is_empty());
    }

    #[test]
    fn roles_reach_the_right_nodes() {
        // controller 0 - 1 - 2 with a start edge between 1 and 2
        let mut g: UnGraph<(bool, bool), bool> = UnGraph::default();
        let a = g.add_node((true, false));
        let b = g.add_node((false, true));
        let c = g.add_node((false, false));
        g.add_edge(a, b, false);
        g.add_edge(b, c, true);
        let f = decompose(&g, &Flags);
        assert_eq!(kinds(&f), (2, 1));

        let [controller] = f.controller_nodes() else {
            panic!("expected one controller node")
        };
        assert_eq!(f[*controller].kind(), BcKind::Block);
        assert!(f[*controller].points().contains(&a));

        // the cut vertex itself is a start point, registered first
        let starts = f.start_nodes();
        assert_eq!(starts.len(), 2);
        assert_eq!(f[starts[0]].kind(), BcKind::Cut);
        assert_eq!(f[starts[0]].points(), [b]);
        assert_eq!(f[starts[1]].points(), [c, b]);
    }
}
