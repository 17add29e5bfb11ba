//! The utility network and the upstream analysis on it.
use std::convert::Infallible;
use std::io::Write;
use std::time::Instant;

use petgraph::graph::{NodeIndex, UnGraph};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::block_cut::{BcNode, BlockCutForest};
use crate::hopcroft_tarjan::{HopcroftTarjan, Roles};

/// A vertex of the network
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Point {
    pub id: String,
    pub is_controller: bool,
    /// The id of the point itself is one of the starting ids
    pub is_start: bool,
}

impl Point {
    fn new(id: &str) -> Self {
        Self {
            id: id.to_owned(),
            is_controller: false,
            is_start: false,
        }
    }
}

/// An edge of the network, seen the same way from both ends
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Via {
    pub id: String,
    pub is_start: bool,
}

/// Collects the network before it can be analysed.
///
/// The starting ids have to be known up front, since edges are flagged as
/// they are added.
#[derive(Debug, Default)]
pub struct NetworkBuilder {
    graph: UnGraph<Point, Via>,
    ids: FxHashMap<String, NodeIndex>,
    starting_ids: FxHashSet<String>,
}

impl NetworkBuilder {
    pub fn new<I, S>(starting_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            starting_ids: starting_ids.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// The point with the given id, created on first use
    pub fn point(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.ids.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(Point::new(id));
        self.ids.insert(id.to_owned(), idx);
        idx
    }

    pub fn add_edge(&mut self, from: &str, to: &str, via: &str) {
        let from = self.point(from);
        let to = self.point(to);
        let is_start = self.starting_ids.contains(via);
        self.graph.add_edge(
            from,
            to,
            Via {
                id: via.to_owned(),
                is_start,
            },
        );
    }

    pub fn mark_controller(&mut self, id: &str) {
        let idx = self.point(id);
        self.graph[idx].is_controller = true;
    }

    /// Flag the points named as starting ids and freeze the network
    pub fn finish_load(mut self) -> Network {
        for id in &self.starting_ids {
            if let Some(&idx) = self.ids.get(id) {
                self.graph[idx].is_start = true;
            }
        }
        tracing::debug!(
            points = self.graph.node_count(),
            edges = self.graph.edge_count(),
            starting_ids = self.starting_ids.len(),
            "network loaded"
        );
        Network {
            graph: self.graph,
            ids: self.ids,
        }
    }
}

/// Search from the controllers and report controllers and starts
struct Upstream;

impl Roles<Point, Via> for Upstream {
    fn is_root(&self, point: &Point) -> bool {
        point.is_controller
    }

    fn is_controller(&self, point: &Point) -> bool {
        point.is_controller
    }

    fn is_start(&self, point: &Point) -> bool {
        point.is_start
    }

    fn is_start_edge(&self, edge: &Via) -> bool {
        edge.is_start
    }
}

/// A fully loaded network
#[derive(Debug)]
pub struct Network {
    graph: UnGraph<Point, Via>,
    ids: FxHashMap<String, NodeIndex>,
}

impl Network {
    pub fn graph(&self) -> &UnGraph<Point, Via> {
        &self.graph
    }

    pub fn point(&self, id: &str) -> Option<&Point> {
        self.ids.get(id).map(|&idx| &self.graph[idx])
    }

    /// Block-cut trees of all components containing a controller
    pub fn block_cut_forest(&self) -> BlockCutForest {
        HopcroftTarjan::new(&self.graph, &Upstream).find_block_cut_forest()
    }

    /// Compute the upstream features and write them to `out`, one per line
    ///
    /// Failed writes are reported as [`Error::Io`](crate::Error::Io).
    pub fn run<W: Write>(&self, out: &mut W) -> crate::Result<()> {
        let mut lines = 0usize;
        self.enumerate_upstream_features(|id| {
            lines += 1;
            writeln!(out, "{id}")
        })?;
        out.flush()?;
        tracing::debug!(lines, "upstream features written");
        Ok(())
    }

    /// All upstream features in output order
    pub fn upstream_features(&self) -> Vec<&str> {
        let mut res = Vec::new();
        let found = self.enumerate_upstream_features(|id| {
            res.push(id);
            Ok::<_, Infallible>(())
        });
        match found {
            Ok(()) => res,
            Err(never) => match never {},
        }
    }

    fn enumerate_upstream_features<'a, F, E>(&'a self, mut emit: F) -> Result<(), E>
    where
        F: FnMut(&'a str) -> Result<(), E>,
    {
        let timer = Instant::now();
        let mut forest = self.block_cut_forest();
        tracing::debug!(
            nodes = forest.len(),
            roots = forest.roots().len(),
            controller_nodes = forest.controller_nodes().len(),
            start_nodes = forest.start_nodes().len(),
            elapsed = ?timer.elapsed(),
            "block-cut tree"
        );

        let timer = Instant::now();
        forest.mark_toward_controllers();
        tracing::debug!(elapsed = ?timer.elapsed(), "mark controllers");

        let timer = Instant::now();
        forest.flood_from_starts(|node| self.emit_node(node, &mut emit))?;
        tracing::debug!(elapsed = ?timer.elapsed(), "output upstream features");
        Ok(())
    }

    fn emit_node<'a, F, E>(&'a self, node: &BcNode, emit: &mut F) -> Result<(), E>
    where
        F: FnMut(&'a str) -> Result<(), E>,
    {
        for &edge in node.edges() {
            emit(self.graph[edge].id.as_str())?;
        }
        // A simple segment only reports its controllers and start points,
        // larger blocks report everything.
        if let &[a, b] = node.points() {
            let (a, b) = (&self.graph[a], &self.graph[b]);
            for p in [a, b] {
                if p.is_controller {
                    emit(p.id.as_str())?;
                }
            }
            for p in [a, b] {
                if p.is_start {
                    emit(p.id.as_str())?;
                }
            }
        } else {
            for &p in node.points() {
                emit(self.graph[p].id.as_str())?;
            }
        }
        Ok(())
    }
}
