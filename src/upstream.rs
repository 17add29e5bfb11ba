//! Walks over a [`BlockCutForest`] finding the upstream part of each tree.
//!
//! First every tree edge is given a direction by searching outwards from
//! the controllers: a link is marked if following it leads back towards a
//! controller. Then the trees are flooded from the start nodes, following
//! marked links only.
use petgraph::graph::IndexType;

use crate::block_cut::{BcIndex, BcNode, BlockCutForest};

impl<Ix: IndexType> BlockCutForest<Ix> {
    /// Mark every link that points towards a controller node.
    ///
    /// Marks are never removed, so calling this again changes nothing.
    pub fn mark_toward_controllers(&mut self) {
        let mut stack: Vec<(BcIndex, Option<BcIndex>)> = Vec::new();
        for i in 0..self.controller_nodes.len() {
            stack.push((self.controller_nodes[i], None));
            while let Some((v, parent)) = stack.pop() {
                for k in 0..self.nodes[v.index()].neighbors.len() {
                    let link = self.nodes[v.index()].neighbors[k];
                    if Some(link.to) == parent {
                        continue;
                    }
                    let reverse = &mut self.node_mut(link.to).neighbors[link.reverse];
                    if !reverse.marked {
                        reverse.marked = true;
                        stack.push((link.to, Some(v)));
                    }
                }
            }
        }
    }

    /// Visit the nodes reachable from the start nodes along marked links,
    /// in depth-first pre-order.
    ///
    /// Each node is visited at most once per call, even if several start
    /// nodes reach it.
    pub fn flood_from_starts<F, E>(&self, mut visit: F) -> Result<(), E>
    where
        F: FnMut(&BcNode<Ix>) -> Result<(), E>,
    {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack: Vec<(BcIndex, Option<BcIndex>)> = Vec::new();
        for &start in &self.start_nodes {
            stack.push((start, None));
            while let Some((v, parent)) = stack.pop() {
                if visited[v.index()] {
                    continue;
                }
                visited[v.index()] = true;
                let node = &self[v];
                visit(node)?;
                // reversed so that the first neighbour is visited first
                for link in node.neighbors.iter().rev() {
                    if Some(link.to) != parent && link.marked && !visited[link.to.index()] {
                        stack.push((link.to, Some(v)));
                    }
                }
            }
        }
        Ok(())
    }
}
