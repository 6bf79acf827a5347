//! Fully dynamic two-edge connectivity, following Holm, de Lichtenberg and Thorup.
//!
//! A spanning forest of the graph lives in a [`TopTree`]. Every other edge is a non-tree edge with
//! a level, stored as a label on both endpoints, and covers the tree path between its endpoints at
//! its level. Two connected vertices are two-edge connected iff every edge of the tree path between
//! them is covered.
//!
//! Levels only grow, and the level-i components never have more than `n / 2^i` vertices. When a
//! covered tree edge is deleted some non-tree edge replaces it, and labels are promoted while the
//! covers are recovered.

use crate::{
    error::{self, Error, Result},
    top_tree::TopTree,
};

mod coverage;
mod edges;

pub use coverage::{Coverage, CoverTag, Reach, TreeEdge, VertexLabel, UNCOVERED};
pub use edges::EdgeHandle;

use coverage::LabelSearch;
use edges::{EdgeKind, EdgeRecord, Edges};

fn alg_panic() -> ! {
    panic!("TwoEdgeConnectivity algorithm incorrect")
}
fn or_alg_panic<T>(opt: Option<T>) -> T {
    opt.unwrap_or_else(|| alg_panic())
}

/// Number of levels used for a graph on n vertices.
pub fn level_count(n: usize) -> usize {
    (n.max(1).next_power_of_two().trailing_zeros() as usize) + 1
}

#[derive(Debug)]
pub struct TwoEdgeConnectivity {
    tree: TopTree<Coverage>,
    edges: Edges,
    levels: usize,
}

impl TwoEdgeConnectivity {
    /// New instance for an empty graph on n vertices.
    pub fn new(n: usize) -> Self {
        let levels = level_count(n);
        Self {
            tree: TopTree::from_vertices((0..n).map(|_| VertexLabel::new(levels))),
            edges: Edges::default(),
            levels,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.tree.num_vertices()
    }

    /// Number of edges, tree and non-tree.
    pub fn num_edges(&self) -> usize {
        self.edges.len()
    }

    pub fn level_count(&self) -> usize {
        self.levels
    }

    /// Largest size a level-i component may have.
    fn capacity(&self, level: usize) -> usize {
        (self.num_vertices() >> level).max(1)
    }

    fn check_vertex(&self, v: usize) -> Result<()> {
        error::check_vertex(v, self.num_vertices())
    }

    fn record(&self, edge: EdgeHandle) -> &EdgeRecord {
        self.edges.get(edge).unwrap_or_else(|_| alg_panic())
    }

    fn record_mut(&mut self, edge: EdgeHandle) -> &mut EdgeRecord {
        self.edges.get_mut(edge).unwrap_or_else(|_| alg_panic())
    }

    /// Adds the edge (u, v). Parallel edges are allowed, self loops are not.
    pub fn insert(&mut self, u: usize, v: usize) -> Result<EdgeHandle> {
        self.check_vertex(u)?;
        self.check_vertex(v)?;
        if u == v {
            return Err(Error::SelfLoopRejected(u));
        }
        let edge = self.edges.insert(EdgeRecord {
            ends: [u, v],
            kind: EdgeKind::NonTree {
                level: 0,
                index: [0; 2],
            },
        });
        match self.tree.link_leaf(u, v, TreeEdge::new(edge, self.levels)) {
            Some(leaf) => {
                log::trace!("({u}, {v}) is a tree edge");
                self.record_mut(edge).kind = EdgeKind::Tree { leaf };
            }
            None => {
                log::trace!("({u}, {v}) is a non-tree edge");
                self.add_labels(edge);
                self.cover(u, v, 0);
            }
        }
        self.debug_check_sizes([u, v]);
        Ok(edge)
    }

    /// Removes an edge returned by [`TwoEdgeConnectivity::insert`].
    pub fn remove(&mut self, edge: EdgeHandle) -> Result<()> {
        let record = self.edges.get(edge)?.clone();
        let [u, v] = record.ends;
        let alpha = match record.kind {
            EdgeKind::NonTree { level, .. } => level,
            EdgeKind::Tree { leaf } => {
                let cover = self.cover_level(u, v);
                if cover == UNCOVERED {
                    log::trace!("({u}, {v}) is a bridge");
                    self.tree.cut_leaf(leaf);
                    self.edges.remove(edge)?;
                    return Ok(());
                }
                let level = cover as usize;
                self.swap(edge, level);
                level
            }
        };
        self.remove_labels(edge);
        self.edges.remove(edge)?;
        self.uncover(u, v, alpha);
        for level in (0..=alpha).rev() {
            self.recover(v, u, level);
        }
        log::debug!("removed ({u}, {v}) at level {alpha}");
        self.debug_check_sizes([u, v]);
        Ok(())
    }

    pub fn connected(&mut self, u: usize, v: usize) -> Result<bool> {
        self.check_vertex(u)?;
        self.check_vertex(v)?;
        Ok(self.tree.connected(u, v))
    }

    /// Whether u and v stay connected after removing any single edge.
    pub fn two_edge_connected(&mut self, u: usize, v: usize) -> Result<bool> {
        self.check_vertex(u)?;
        self.check_vertex(v)?;
        if u == v {
            return Ok(true);
        }
        Ok(self.tree.connected(u, v) && self.cover_level(u, v) >= 0)
    }

    /// Some edge whose removal disconnects u and v, if they are connected and there is one.
    pub fn find_bridge(&mut self, u: usize, v: usize) -> Result<Option<EdgeHandle>> {
        self.check_vertex(u)?;
        self.check_vertex(v)?;
        Ok(self
            .tree
            .expose_path(u, v)
            .and_then(|path| path.agg().bridge()))
    }

    pub fn endpoints(&self, edge: EdgeHandle) -> Result<(usize, usize)> {
        let [u, v] = self.edges.get(edge)?.ends;
        Ok((u, v))
    }

    pub fn is_tree_edge(&self, edge: EdgeHandle) -> Result<bool> {
        Ok(self.edges.get(edge)?.level().is_none())
    }

    /// Level of a non-tree edge, None for tree edges.
    pub fn edge_level(&self, edge: EdgeHandle) -> Result<Option<usize>> {
        Ok(self.edges.get(edge)?.level())
    }

    /// Size of the level component containing v. `usize::MAX` from `level_count()` on.
    pub fn component_size(&mut self, v: usize, level: usize) -> Result<usize> {
        self.check_vertex(v)?;
        Ok(self.find_size(v, v, level))
    }

    /// Checks the size invariant on every vertex and level, and the label bookkeeping.
    pub fn verify(&mut self) -> Result<()> {
        for v in 0..self.num_vertices() {
            self.check_sizes(v)?;
        }
        for (edge, record) in self.edges.iter() {
            match record.kind {
                EdgeKind::NonTree { level, index } => {
                    for (s, &w) in record.ends.iter().enumerate() {
                        if self.tree.vertex(w).labels(level).get(index[s]) != Some(&edge) {
                            return Err(Error::InvariantViolation(format!(
                                "label of {edge:?} missing at vertex {w} level {level}"
                            )));
                        }
                    }
                }
                EdgeKind::Tree { leaf } => {
                    if self.tree.edge(leaf).edge != edge {
                        return Err(Error::InvariantViolation(format!(
                            "leaf {leaf} does not hold {edge:?}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    fn check_sizes(&mut self, v: usize) -> Result<()> {
        for level in 0..self.levels {
            let size = self.find_size(v, v, level);
            let capacity = self.capacity(level);
            if size > capacity {
                return Err(Error::InvariantViolation(format!(
                    "level {level} component of {v} has {size} vertices, at most {capacity} allowed"
                )));
            }
        }
        Ok(())
    }

    fn debug_check_sizes(&mut self, vertices: [usize; 2]) {
        if cfg!(debug_assertions) {
            for v in vertices {
                if let Err(err) = self.check_sizes(v) {
                    panic!("{err}");
                }
            }
        }
    }

    fn cover(&mut self, u: usize, v: usize, level: usize) {
        let mut path = or_alg_panic(self.tree.expose_path(u, v));
        path.apply(&CoverTag::cover(level));
    }

    fn uncover(&mut self, u: usize, v: usize, level: usize) {
        let mut path = or_alg_panic(self.tree.expose_path(u, v));
        path.apply(&CoverTag::uncover(level));
    }

    /// Minimum cover level on the path between u and v.
    fn cover_level(&mut self, u: usize, v: usize) -> i32 {
        or_alg_panic(
            self.tree
                .expose_path(u, v)
                .map(|path| path.agg().cover_level()),
        )
    }

    fn add_labels(&mut self, edge: EdgeHandle) {
        let record = self.record(edge);
        let (ends, level) = (record.ends, or_alg_panic(record.level()));
        let mut index = [0; 2];
        for (s, &w) in ends.iter().enumerate() {
            index[s] = self.tree.mutate_vertex(w, |label| {
                label.labels[level].push(edge);
                label.labels[level].len() - 1
            });
        }
        self.record_mut(edge).kind = EdgeKind::NonTree { level, index };
    }

    fn remove_labels(&mut self, edge: EdgeHandle) {
        let record = self.record(edge);
        let ends = record.ends;
        let EdgeKind::NonTree { level, index } = record.kind else {
            alg_panic()
        };
        for (s, &w) in ends.iter().enumerate() {
            let at = index[s];
            let moved = self.tree.mutate_vertex(w, |label| {
                let list = &mut label.labels[level];
                debug_assert_eq!(list[at], edge);
                list.swap_remove(at);
                list.get(at).copied()
            });
            if let Some(moved) = moved {
                let moved = self.record_mut(moved);
                let side = (moved.ends[0] != w) as usize;
                match &mut moved.kind {
                    EdgeKind::NonTree { index, .. } => index[side] = at,
                    EdgeKind::Tree { .. } => alg_panic(),
                }
            }
        }
    }

    /// Replaces the covered tree edge by a non-tree edge of the given level, which must exist.
    /// The edge becomes a non-tree edge of that level.
    fn swap(&mut self, edge: EdgeHandle, level: usize) {
        let EdgeRecord { ends: [u, v], kind } = self.record(edge).clone();
        let EdgeKind::Tree { leaf } = kind else {
            alg_panic()
        };
        self.tree.cut_leaf(leaf);
        let replacement = or_alg_panic(self.find_replacement(u, v, level));
        let [x, y] = self.record(replacement).ends;
        log::trace!("swap ({u}, {v}) with ({x}, {y}) at level {level}");
        self.remove_labels(replacement);
        let leaf = or_alg_panic(
            self.tree
                .link_leaf(x, y, TreeEdge::new(replacement, self.levels)),
        );
        self.record_mut(replacement).kind = EdgeKind::Tree { leaf };
        self.record_mut(edge).kind = EdgeKind::NonTree {
            level,
            index: [0; 2],
        };
        self.add_labels(edge);
        self.cover(u, v, level);
    }

    /// Searches the smaller side of the cut edge (u, v) for a non-tree edge of the given level
    /// reconnecting it.
    fn find_replacement(&mut self, u: usize, v: usize, level: usize) -> Option<EdgeHandle> {
        let size_u = self.find_size(u, u, level);
        let size_v = self.find_size(v, v, level);
        debug_assert!(size_u + size_v <= self.capacity(level));
        if size_u <= size_v {
            self.recover_phase(u, u, level, size_u)
        } else {
            self.recover_phase(v, v, level, size_v)
        }
    }

    fn recover(&mut self, u: usize, v: usize, level: usize) {
        let budget = self.find_size(u, v, level) / 2;
        self.recover_phase(u, v, level, budget);
        self.recover_phase(v, u, level, budget);
    }

    /// Walks the labels of the given level around the path from u to v, closest to u first.
    /// Labels that fit in the budget one level up are promoted. Stops at the first one that
    /// doesn't, covering its path at the current level, or at one whose ends are disconnected,
    /// which is returned.
    fn recover_phase(
        &mut self,
        u: usize,
        v: usize,
        level: usize,
        budget: usize,
    ) -> Option<EdgeHandle> {
        while let Some(label) = self.find_first_label(u, v, level) {
            let [q, r] = self.record(label).ends;
            if !self.tree.connected(q, r) {
                return Some(label);
            }
            if self.find_size(q, r, level + 1) <= budget {
                log::trace!("promote ({q}, {r}) to level {}", level + 1);
                self.remove_labels(label);
                self.record_mut(label).kind = EdgeKind::NonTree {
                    level: level + 1,
                    index: [0; 2],
                };
                self.add_labels(label);
                self.cover(q, r, level + 1);
            } else {
                self.cover(q, r, level);
                return None;
            }
        }
        None
    }

    fn find_first_label(&mut self, u: usize, v: usize, level: usize) -> Option<EdgeHandle> {
        let path = or_alg_panic(self.tree.expose_path(u, v));
        let mut search = LabelSearch::new(level);
        let found = path.find_element(|s| search.step(s))?;
        self.tree.vertex(found).labels(level).last().copied()
    }

    /// Size of the level component around the path from u to v.
    fn find_size(&mut self, u: usize, v: usize, level: usize) -> usize {
        if level >= self.levels {
            return usize::MAX;
        }
        or_alg_panic(
            self.tree
                .expose_path(u, v)
                .map(|path| path.agg().size(level)),
        )
    }
}
