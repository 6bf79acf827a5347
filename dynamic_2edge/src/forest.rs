//! Incidence lists of the forest underlying a top tree.
//!
//! Every edge sits in the doubly linked list of both of its endpoints, so adding and removing an
//! edge is O(1). No cycle or duplicate checking happens here.

use std::fmt::{Debug, Display, Formatter};

use derivative::Derivative;

pub type EdgeId = usize;

const EMPTY: usize = usize::MAX;

pub(crate) fn node_fmt(u: &usize, f: &mut Formatter) -> std::fmt::Result {
    if *u == EMPTY {
        write!(f, "∅")
    } else {
        write!(f, "{u}")
    }
}

pub(crate) fn node2_fmt([u, v]: &[usize; 2], f: &mut Formatter) -> std::fmt::Result {
    write!(f, "[")?;
    node_fmt(u, f)?;
    write!(f, ", ")?;
    node_fmt(v, f)?;
    write!(f, "]")
}

fn links_fmt([a, b]: &[[usize; 2]; 2], f: &mut Formatter) -> std::fmt::Result {
    node2_fmt(a, f)?;
    write!(f, " ")?;
    node2_fmt(b, f)
}

/// Used to pretty print an index, outputting ∅ if it is empty.
pub struct PrettyIdx(pub usize);

impl Display for PrettyIdx {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        node_fmt(&self.0, f)
    }
}

impl Debug for PrettyIdx {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        <Self as Display>::fmt(self, f)
    }
}

#[derive(Derivative)]
#[derivative(Debug)]
struct ForestEdge<T> {
    ends: [usize; 2],
    /// `link[s]` is the (prev, next) pair in the incidence list of `ends[s]`.
    #[derivative(Debug(format_with = "links_fmt"))]
    link: [[EdgeId; 2]; 2],
    data: T,
}

impl<T> ForestEdge<T> {
    fn side(&self, v: usize) -> usize {
        (self.ends[0] != v) as usize
    }
}

#[derive(Debug)]
pub struct Forest<T> {
    head: Vec<EdgeId>,
    edges: Vec<Option<ForestEdge<T>>>,
    free: Vec<EdgeId>,
    len: usize,
}

impl<T> Forest<T> {
    /// Forest on `n` vertices and no edges.
    pub fn new(n: usize) -> Self {
        Self {
            head: vec![EMPTY; n],
            edges: Vec::new(),
            free: Vec::new(),
            len: 0,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.head.len()
    }

    /// Number of live edges.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn edge(&self, e: EdgeId) -> &ForestEdge<T> {
        self.edges
            .get(e)
            .and_then(Option::as_ref)
            .unwrap_or_else(|| panic!("forest edge {e} does not exist"))
    }

    fn edge_mut(&mut self, e: EdgeId) -> &mut ForestEdge<T> {
        self.edges
            .get_mut(e)
            .and_then(Option::as_mut)
            .unwrap_or_else(|| panic!("forest edge {e} does not exist"))
    }

    /// Inserts the edge at the head of the incidence lists of both endpoints.
    pub fn add_edge(&mut self, u: usize, v: usize, data: T) -> EdgeId {
        let ends = [u, v];
        let e = self.free.pop().unwrap_or(self.edges.len());
        let mut link = [[EMPTY; 2]; 2];
        for (s, &w) in ends.iter().enumerate() {
            let old = self.head[w];
            link[s] = [EMPTY, old];
            if old != EMPTY {
                let old_edge = self.edge_mut(old);
                let os = old_edge.side(w);
                old_edge.link[os][0] = e;
            }
            self.head[w] = e;
        }
        let edge = Some(ForestEdge { ends, link, data });
        if e == self.edges.len() {
            self.edges.push(edge);
        } else {
            self.edges[e] = edge;
        }
        self.len += 1;
        e
    }

    /// Unlinks the edge from both incidence lists and returns its data.
    pub fn del_edge(&mut self, e: EdgeId) -> Option<T> {
        let edge = self.edges.get_mut(e)?.take()?;
        for (s, &w) in edge.ends.iter().enumerate() {
            let [prev, next] = edge.link[s];
            if prev != EMPTY {
                let p = self.edge_mut(prev);
                let ps = p.side(w);
                p.link[ps][1] = next;
            } else {
                self.head[w] = next;
            }
            if next != EMPTY {
                let n = self.edge_mut(next);
                let ns = n.side(w);
                n.link[ns][0] = prev;
            }
        }
        self.free.push(e);
        self.len -= 1;
        Some(edge.data)
    }

    pub fn contains(&self, e: EdgeId) -> bool {
        matches!(self.edges.get(e), Some(Some(_)))
    }

    pub fn ends(&self, e: EdgeId) -> [usize; 2] {
        self.edge(e).ends
    }

    pub fn data(&self, e: EdgeId) -> &T {
        &self.edge(e).data
    }

    /// The endpoint of `e` that is not `v`.
    pub fn opposite(&self, e: EdgeId, v: usize) -> usize {
        let edge = self.edge(e);
        edge.ends[1 - edge.side(v)]
    }

    /// Edges incident to `v`, most recently added first.
    pub fn incident(&self, v: usize) -> Incident<'_, T> {
        Incident {
            forest: self,
            vertex: v,
            cur: self.head[v],
        }
    }

    pub fn degree(&self, v: usize) -> usize {
        self.incident(v).count()
    }

    /// Some edge between `u` and `v`, scanning the incidence list of `u`.
    pub fn find_edge(&self, u: usize, v: usize) -> Option<EdgeId> {
        self.incident(u).find(|&e| self.opposite(e, u) == v)
    }
}

/// Lazy walk over an incidence list. Cloning forks the walk at its current position.
pub struct Incident<'a, T> {
    forest: &'a Forest<T>,
    vertex: usize,
    cur: EdgeId,
}

impl<T> Clone for Incident<'_, T> {
    fn clone(&self) -> Self {
        Self {
            forest: self.forest,
            vertex: self.vertex,
            cur: self.cur,
        }
    }
}

impl<T> Iterator for Incident<'_, T> {
    type Item = EdgeId;

    fn next(&mut self) -> Option<EdgeId> {
        if self.cur == EMPTY {
            return None;
        }
        let e = self.cur;
        let edge = self.forest.edge(e);
        self.cur = edge.link[edge.side(self.vertex)][1];
        Some(e)
    }
}
