//! Self-adjusting top tree over a dynamic forest.
//!
//! Every vertex and every edge of the forest is a node of an arena. The forest is decomposed in
//! paths, each path is kept as a splay tree ordered from top to bottom, and each splay subtree is a
//! cluster: a segment of its path plus everything hanging off that segment. Clusters of paths
//! hanging off a node are raked into that node, so the root of the topmost splay tree always holds
//! the cluster of the whole component.
//!
//! Exposing a path makes it the topmost path, so its cluster is the root cluster.

use std::{
    collections::BTreeSet,
    fmt::{Debug, Formatter},
};

use debug_tree::{add_branch_to, add_leaf_to, AsTree, TreeBuilder};
use derivative::Derivative;

use crate::{
    error::{Error, Result},
    forest::{node2_fmt, node_fmt, EdgeId, Forest, PrettyIdx as I},
};

pub mod cluster;

pub use cluster::{Cluster, Element, SearchData, SearchDirection};

pub type Idx = usize;

/// Returned when the node doesn't exist.
pub const EMPTY: Idx = usize::MAX;

fn alg_panic() -> ! {
    panic!("TopTree algorithm incorrect")
}
fn or_alg_panic<T>(opt: Option<T>) -> T {
    opt.unwrap_or_else(|| alg_panic())
}

#[derive(Derivative)]
#[derivative(Debug)]
enum Payload<C: Cluster> {
    Vertex(C::Vertex),
    Edge {
        data: C::Edge,
        #[derivative(Debug(format_with = "node2_fmt"))]
        ends: [usize; 2],
        #[derivative(Debug = "ignore")]
        forest_edge: EdgeId,
    },
    Free,
}

#[derive(Derivative)]
#[derivative(Debug)]
struct Node<C: Cluster> {
    #[derivative(Debug(format_with = "node_fmt"))]
    parent: Idx,
    /// Neighbours towards the top and towards the bottom of the path.
    #[derivative(Debug(format_with = "node2_fmt"))]
    child: [Idx; 2],
    /// Children still have to be swapped. The own aggregate is already reversed.
    flip: bool,
    /// Pending for the children, already applied to this node.
    tag: C::Tag,
    payload: Payload<C>,
    hang: C::Hang,
    /// Hanging children, indexed by the keys they reported when raked.
    #[derivative(Debug = "ignore")]
    hanging: BTreeSet<(usize, Idx)>,
    #[derivative(Debug = "ignore")]
    agg: C,
}

impl<C: Cluster> Node<C> {
    fn new(payload: Payload<C>) -> Self {
        let hang = C::Hang::default();
        let agg = match &payload {
            Payload::Vertex(v) => C::point(v, &hang),
            Payload::Edge { data, .. } => C::leaf(data, &hang),
            Payload::Free => alg_panic(),
        };
        Self {
            parent: EMPTY,
            child: [EMPTY; 2],
            flip: false,
            tag: C::Tag::default(),
            payload,
            hang,
            hanging: BTreeSet::new(),
            agg,
        }
    }
}

pub struct TopTree<C: Cluster = ()> {
    nodes: Vec<Node<C>>,
    free: Vec<Idx>,
    /// Incidence lists, each edge holding its leaf node.
    forest: Forest<Idx>,
    /// Ends of every live exposure, innermost last.
    exposed: Vec<[usize; 2]>,
}

impl<C: Cluster> Debug for TopTree<C> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let mut hanging = vec![vec![]; self.nodes.len()];
        for (u, node) in self.nodes.iter().enumerate() {
            if node.parent != EMPTY && self.is_root(u) {
                hanging[node.parent].push(u);
            }
        }
        let builder = TreeBuilder::new();
        let _b = builder.add_branch("TopTree");
        for u in 0..self.nodes.len() {
            if self.nodes[u].parent == EMPTY && !matches!(self.nodes[u].payload, Payload::Free) {
                self.tree_preorder_dbg(u, &hanging, &builder);
            }
        }
        writeln!(f, "{}", builder.string())
    }
}

impl<C: Cluster> TopTree<C>
where
    C::Vertex: Default,
{
    /// New forest with n vertices and no edges.
    pub fn new(n: usize) -> Self {
        Self::from_vertices((0..n).map(|_| C::Vertex::default()))
    }
}

impl<C: Cluster> TopTree<C> {
    /// New forest with one vertex per payload and no edges. Vertex ids follow the iteration order.
    pub fn from_vertices(vertices: impl IntoIterator<Item = C::Vertex>) -> Self {
        let nodes: Vec<_> = vertices
            .into_iter()
            .map(|v| Node::new(Payload::Vertex(v)))
            .collect();
        Self {
            forest: Forest::new(nodes.len()),
            nodes,
            free: Vec::new(),
            exposed: Vec::new(),
        }
    }

    fn tree_preorder_dbg<T: AsTree>(&self, u: Idx, hanging: &[Vec<Idx>], tree: &T) {
        let nu = &self.nodes[u];
        add_branch_to!(*tree, "[{u}] {nu:?}");
        if nu.child != [EMPTY, EMPTY] {
            for c in nu.child {
                if c != EMPTY {
                    self.tree_preorder_dbg(c, hanging, tree);
                } else {
                    add_leaf_to!(*tree, "<no child>");
                }
            }
        }
        for &h in &hanging[u] {
            add_branch_to!(*tree, "hanging off {u}");
            self.tree_preorder_dbg(h, hanging, tree);
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.forest.num_vertices()
    }

    /// Number of edges in the forest.
    pub fn num_edges(&self) -> usize {
        self.forest.len()
    }

    fn is_root(&self, x: Idx) -> bool {
        let p = self.nodes[x].parent;
        p == EMPTY || !self.nodes[p].child.contains(&x)
    }

    fn reverse_node(&mut self, x: Idx) {
        let node = &mut self.nodes[x];
        node.flip ^= true;
        node.agg.reverse();
    }

    fn apply_tag(&mut self, x: Idx, tag: &C::Tag) {
        let node = &mut self.nodes[x];
        node.agg.apply(tag);
        if let Payload::Edge { data, .. } = &mut node.payload {
            C::apply_edge(data, tag);
        }
        C::compose(&mut node.tag, tag);
    }

    fn push(&mut self, x: Idx) {
        if self.nodes[x].flip {
            let [l, r] = self.nodes[x].child;
            self.nodes[x].flip = false;
            self.nodes[x].child = [r, l];
            for c in [l, r] {
                if c != EMPTY {
                    self.reverse_node(c);
                }
            }
        }
        if !C::is_identity(&self.nodes[x].tag) {
            let tag = std::mem::take(&mut self.nodes[x].tag);
            for c in self.nodes[x].child {
                if c != EMPTY {
                    self.apply_tag(c, &tag);
                }
            }
        }
    }

    fn update(&mut self, x: Idx) {
        let node = &self.nodes[x];
        let mut agg = match &node.payload {
            Payload::Vertex(v) => C::point(v, &node.hang),
            Payload::Edge { data, .. } => C::leaf(data, &node.hang),
            Payload::Free => alg_panic(),
        };
        let [l, r] = node.child;
        if l != EMPTY {
            agg = C::merge(&self.nodes[l].agg, &agg);
        }
        if r != EMPTY {
            agg = C::merge(&agg, &self.nodes[r].agg);
        }
        self.nodes[x].agg = agg;
    }

    /// Rakes (or unrakes) the splay tree rooted at c into its path parent p.
    fn set_hanging(&mut self, p: Idx, c: Idx, hang: bool) {
        debug_assert_ne!(p, c);
        let (pn, cn) = if p < c {
            let (lo, hi) = self.nodes.split_at_mut(c);
            (&mut lo[p], &hi[0])
        } else {
            let (lo, hi) = self.nodes.split_at_mut(p);
            (&mut hi[0], &lo[c])
        };
        if hang {
            C::rake(&mut pn.hang, &cn.agg);
        } else {
            C::unrake(&mut pn.hang, &cn.agg);
        }
        for key in cn.agg.hang_keys() {
            if hang {
                pn.hanging.insert((key, c));
            } else {
                pn.hanging.remove(&(key, c));
            }
        }
    }

    fn rotate(&mut self, x: Idx) {
        let p = self.nodes[x].parent;
        let g = self.nodes[p].parent;
        let dir = (self.nodes[p].child[1] == x) as usize;
        let b = self.nodes[x].child[dir ^ 1];
        if !self.is_root(p) {
            let gdir = (self.nodes[g].child[1] == p) as usize;
            self.nodes[g].child[gdir] = x;
        }
        self.nodes[x].parent = g;
        self.nodes[p].child[dir] = b;
        if b != EMPTY {
            self.nodes[b].parent = p;
        }
        self.nodes[x].child[dir ^ 1] = p;
        self.nodes[p].parent = x;
        self.update(p);
        self.update(x);
    }

    /// Pushes every node from the root of the splay tree of x down to x. Returns that root.
    fn push_down_to(&mut self, x: Idx) -> Idx {
        let mut stack = vec![x];
        let mut root = x;
        while !self.is_root(root) {
            root = self.nodes[root].parent;
            stack.push(root);
        }
        for &y in stack.iter().rev() {
            self.push(y);
        }
        root
    }

    /// Rotates x to the root of its splay tree. x is pushed afterwards.
    fn splay(&mut self, x: Idx) {
        let root = self.push_down_to(x);
        if root == x {
            return;
        }
        let path_parent = self.nodes[root].parent;
        let keys = if path_parent != EMPTY {
            self.nodes[root].agg.hang_keys()
        } else {
            Vec::new()
        };
        while !self.is_root(x) {
            let p = self.nodes[x].parent;
            if !self.is_root(p) {
                let g = self.nodes[p].parent;
                let zigzig = (self.nodes[g].child[0] == p) == (self.nodes[p].child[0] == x);
                self.rotate(if zigzig { p } else { x });
            }
            self.rotate(x);
        }
        if path_parent != EMPTY {
            // Same cluster, only the root of its splay tree changed.
            let index = &mut self.nodes[path_parent].hanging;
            for key in keys {
                index.remove(&(key, root));
                index.insert((key, x));
            }
        }
    }

    /// Makes the path from the root of the represented tree to x the topmost path, ending at x.
    fn access(&mut self, x: Idx) {
        let mut last = EMPTY;
        let mut y = x;
        while y != EMPTY {
            self.splay(y);
            let below = self.nodes[y].child[1];
            if below != EMPTY {
                self.set_hanging(y, below, true);
            }
            if last != EMPTY {
                self.set_hanging(y, last, false);
            }
            self.nodes[y].child[1] = last;
            self.update(y);
            last = y;
            y = self.nodes[y].parent;
        }
        self.splay(x);
    }

    fn makeroot(&mut self, x: Idx) {
        self.access(x);
        self.reverse_node(x);
    }

    /// Root of the represented tree containing u. Changes whenever some vertex is exposed.
    pub fn find_root(&mut self, u: usize) -> usize {
        self.access(u);
        let mut y = u;
        loop {
            self.push(y);
            let above = self.nodes[y].child[0];
            if above == EMPTY {
                break;
            }
            y = above;
        }
        self.splay(y);
        y
    }

    pub fn connected(&mut self, u: usize, v: usize) -> bool {
        u == v || self.find_root(u) == self.find_root(v)
    }

    /// Adds the tree edge (u, v) and returns its leaf, unless u and v are already connected.
    pub fn link_leaf(&mut self, u: usize, v: usize, data: C::Edge) -> Option<Idx> {
        if self.connected(u, v) {
            return None;
        }
        let e = self.free.pop().unwrap_or(self.nodes.len());
        let forest_edge = self.forest.add_edge(u, v, e);
        let node = Node::new(Payload::Edge {
            data,
            ends: [u, v],
            forest_edge,
        });
        if e == self.nodes.len() {
            self.nodes.push(node);
        } else {
            self.nodes[e] = node;
        }
        log::trace!("link ({u}, {v}) as leaf {e}");
        self.makeroot(u);
        self.access(v);
        self.nodes[u].parent = e;
        self.set_hanging(e, u, true);
        self.update(e);
        self.nodes[e].parent = v;
        self.set_hanging(v, e, true);
        self.update(v);
        Some(e)
    }

    /// Adds the tree edge (u, v). Returns the root cluster of the joined component.
    pub fn link(&mut self, u: usize, v: usize, data: C::Edge) -> Result<Idx> {
        self.link_leaf(u, v, data)
            .ok_or(Error::AlreadyConnected(u, v))?;
        Ok(v)
    }

    /// Removes the edge of the given leaf. Returns the root clusters of both sides.
    pub fn cut_leaf(&mut self, leaf: Idx) -> [Idx; 2] {
        let (ends, forest_edge) = match &self.nodes[leaf].payload {
            Payload::Edge {
                ends, forest_edge, ..
            } => (*ends, *forest_edge),
            _ => alg_panic(),
        };
        let [a, b] = ends;
        log::trace!("cut ({a}, {b}) at leaf {leaf}");
        self.makeroot(a);
        self.access(b);
        self.splay(leaf);
        let [above, below] = self.nodes[leaf].child;
        debug_assert_eq!([above, below], [a, b], "path should be a, leaf, b");
        debug_assert!(self.nodes[leaf].hanging.is_empty());
        for c in [above, below] {
            self.nodes[c].parent = EMPTY;
        }
        or_alg_panic(self.forest.del_edge(forest_edge));
        let node = &mut self.nodes[leaf];
        node.payload = Payload::Free;
        node.child = [EMPTY; 2];
        node.parent = EMPTY;
        node.flip = false;
        node.tag = C::Tag::default();
        node.hang = C::Hang::default();
        node.hanging.clear();
        self.free.push(leaf);
        [above, below]
    }

    /// Removes the tree edge between u and v. Returns the root clusters of both sides.
    pub fn cut(&mut self, u: usize, v: usize) -> Result<[Idx; 2]> {
        let forest_edge = self
            .forest
            .find_edge(u, v)
            .ok_or(Error::NotAnEdge(u, v))?;
        let leaf = *self.forest.data(forest_edge);
        Ok(self.cut_leaf(leaf))
    }

    /// Makes u the root of its tree, so the root cluster is the whole component with u on top.
    /// The exposed path is u alone, everything else hangs off it.
    pub fn expose(&mut self, u: usize) -> Exposed<'_, C> {
        self.makeroot(u);
        self.access(u);
        self.exposed.push([u, u]);
        Exposed {
            tree: self,
            root: u,
            ends: [u, u],
        }
    }

    /// Makes the path from u to v the topmost path, u on top. None if they are not connected.
    pub fn expose_path(&mut self, u: usize, v: usize) -> Option<Exposed<'_, C>> {
        if !self.connected(u, v) {
            return None;
        }
        self.makeroot(u);
        self.access(v);
        self.exposed.push([u, v]);
        Some(Exposed {
            tree: self,
            root: v,
            ends: [u, v],
        })
    }

    /// Ends the innermost exposure. Called when an [`Exposed`] is dropped.
    fn deexpose(&mut self, ends: [usize; 2]) {
        let last = or_alg_panic(self.exposed.pop());
        debug_assert_eq!(last, ends, "expose and deexpose must pair up");
    }

    /// Rotates x to the root of its splay tree.
    pub fn full_splay(&mut self, x: Idx) {
        self.splay(x);
    }

    /// Propagates pending flips and tags of x to its children.
    pub fn push_flip(&mut self, x: Idx) {
        self.push(x);
    }

    /// Recomputes the aggregates from x up to the root cluster. x must be on the topmost path.
    pub fn recompute_root_path(&mut self, x: Idx) {
        self.push_down_to(x);
        let mut y = x;
        loop {
            self.update(y);
            if self.is_root(y) {
                break;
            }
            y = self.nodes[y].parent;
        }
        debug_assert_eq!(self.nodes[y].parent, EMPTY, "{} is not on the topmost path", I(x));
    }

    /// Another leaf incident to vertex v, skipping the first `skip` ones.
    pub fn get_adjacent_leaf_node(&self, v: usize, skip: usize) -> Option<Idx> {
        self.incident_leaves(v).nth(skip)
    }

    /// Leaves of the edges incident to v.
    pub fn incident_leaves(&self, v: usize) -> impl Iterator<Item = Idx> + '_ {
        self.forest
            .incident(v)
            .map(|forest_edge| *self.forest.data(forest_edge))
    }

    pub fn vertex(&self, v: usize) -> &C::Vertex {
        match &self.nodes[v].payload {
            Payload::Vertex(data) => data,
            _ => alg_panic(),
        }
    }

    pub fn edge(&self, leaf: Idx) -> &C::Edge {
        match &self.nodes[leaf].payload {
            Payload::Edge { data, .. } => data,
            _ => panic!("{leaf} is not a leaf"),
        }
    }

    pub fn edge_ends(&self, leaf: Idx) -> [usize; 2] {
        match &self.nodes[leaf].payload {
            Payload::Edge { ends, .. } => *ends,
            _ => panic!("{leaf} is not a leaf"),
        }
    }

    /// Aggregate of the cluster rooted at x.
    pub fn agg(&self, x: Idx) -> &C {
        &self.nodes[x].agg
    }

    pub fn mutate_vertex<R>(&mut self, v: usize, f: impl FnOnce(&mut C::Vertex) -> R) -> R {
        self.access(v);
        let res = match &mut self.nodes[v].payload {
            Payload::Vertex(data) => f(data),
            _ => alg_panic(),
        };
        self.recompute_root_path(v);
        res
    }

    pub fn mutate_edge<R>(&mut self, leaf: Idx, f: impl FnOnce(&mut C::Edge) -> R) -> R {
        self.access(leaf);
        let res = match &mut self.nodes[leaf].payload {
            Payload::Edge { data, .. } => f(data),
            _ => panic!("{leaf} is not a leaf"),
        };
        self.recompute_root_path(leaf);
        res
    }

    /// Walks down from the root cluster x guided by the search strategy. The found node is
    /// splayed.
    fn find_element(
        &mut self,
        x: Idx,
        mut search_strategy: impl FnMut(SearchData<'_, C>) -> SearchDirection,
    ) -> Option<Idx> {
        let mut x = x;
        while x != EMPTY {
            self.push(x);
            let node = &self.nodes[x];
            let [l, r] = node.child;
            let element = match &node.payload {
                Payload::Vertex(v) => Element::Vertex(v),
                Payload::Edge { data, .. } => Element::Edge(data),
                Payload::Free => alg_panic(),
            };
            let dir = search_strategy(SearchData {
                element,
                hang: &node.hang,
                left_agg: (l != EMPTY).then(|| &self.nodes[l].agg),
                right_agg: (r != EMPTY).then(|| &self.nodes[r].agg),
            });
            x = match dir {
                SearchDirection::Found => {
                    self.splay(x);
                    return Some(x);
                }
                SearchDirection::NotFound => return None,
                SearchDirection::Left => l,
                SearchDirection::Right => r,
                SearchDirection::Hanging(key) => self.nodes[x]
                    .hanging
                    .range((key, 0)..=(key, EMPTY))
                    .next()
                    .map_or(EMPTY, |&(_, c)| c),
            };
        }
        None
    }
}

/// A vertex or a path made the root cluster. Dropping it deexposes.
pub struct Exposed<'a, C: Cluster> {
    tree: &'a mut TopTree<C>,
    root: Idx,
    ends: [usize; 2],
}

impl<C: Cluster> Exposed<'_, C> {
    pub fn root(&self) -> Idx {
        self.root
    }

    /// Boundary vertices of the exposed path, top first.
    pub fn ends(&self) -> [usize; 2] {
        self.ends
    }

    /// Cluster of the whole exposed component.
    pub fn agg(&self) -> &C {
        &self.tree.nodes[self.root].agg
    }

    /// Applies the tag to every edge of the exposed path.
    pub fn apply(&mut self, tag: &C::Tag) {
        self.tree.apply_tag(self.root, tag);
    }

    /// See [`SearchData`]. The search starts at the root cluster.
    pub fn find_element(
        self,
        search_strategy: impl FnMut(SearchData<'_, C>) -> SearchDirection,
    ) -> Option<Idx> {
        let root = self.root;
        self.tree.find_element(root, search_strategy)
    }
}

impl<C: Cluster> Drop for Exposed<'_, C> {
    fn drop(&mut self) {
        self.tree.deexpose(self.ends);
    }
}
