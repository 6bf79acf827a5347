use std::fmt::Debug;

/// Aggregated data kept for every cluster of a [`TopTree`](super::TopTree).
///
/// A cluster covers a contiguous segment of a path, ordered from its top (closest to the root of
/// the represented tree) to its bottom, together with everything hanging off that segment.
///
/// What a hanging cluster contributes through [`Cluster::rake`] and its [`Cluster::hang_keys`] must
/// only depend on the subtree it represents, never on how that subtree is currently split in paths.
pub trait Cluster: Debug + Clone {
    /// Payload of a vertex.
    type Vertex: Debug;
    /// Payload of a forest edge.
    type Edge: Debug;
    /// Accumulates the clusters hanging off a single vertex or edge.
    type Hang: Debug + Default;
    /// Lazy update of every edge of a path.
    type Tag: Debug + Clone + Default;

    /// Cluster of a single vertex, with the given clusters hanging off it.
    fn point(vertex: &Self::Vertex, hang: &Self::Hang) -> Self;
    /// Cluster of a single edge, with the given clusters hanging below it.
    fn leaf(edge: &Self::Edge, hang: &Self::Hang) -> Self;
    /// Joins two consecutive segments of the same path.
    fn merge(above: &Self, below: &Self) -> Self;
    /// Swaps the top and the bottom of the segment.
    fn reverse(&mut self);
    /// Adds a cluster hanging by its top.
    fn rake(hang: &mut Self::Hang, child: &Self);
    /// Inverse of [`Cluster::rake`].
    fn unrake(hang: &mut Self::Hang, child: &Self);
    /// Keys under which this cluster is indexed while hanging. Used by
    /// [`SearchDirection::Hanging`].
    fn hang_keys(&self) -> Vec<usize> {
        Vec::new()
    }
    /// Applies the tag to every edge of the segment, but not to hanging clusters.
    fn apply(&mut self, _tag: &Self::Tag) {}
    fn apply_edge(_edge: &mut Self::Edge, _tag: &Self::Tag) {}
    /// Makes `tag` equivalent to applying `tag` and then `next`.
    fn compose(_tag: &mut Self::Tag, _next: &Self::Tag) {}
    fn is_identity(_tag: &Self::Tag) -> bool {
        true
    }
}

/// Plain connectivity, nothing to aggregate.
impl Cluster for () {
    type Vertex = ();
    type Edge = ();
    type Hang = ();
    type Tag = ();

    fn point(_: &(), _: &()) -> Self {}
    fn leaf(_: &(), _: &()) -> Self {}
    fn merge(_: &Self, _: &Self) -> Self {}
    fn reverse(&mut self) {}
    fn rake(_: &mut (), _: &Self) {}
    fn unrake(_: &mut (), _: &Self) {}
}

#[derive(Debug)]
pub enum Element<'a, C: Cluster> {
    Vertex(&'a C::Vertex),
    Edge(&'a C::Edge),
}

#[derive(Debug)]
pub struct SearchData<'a, C: Cluster> {
    /// Payload of the current node being looked at.
    pub element: Element<'a, C>,
    /// Clusters hanging off the current node.
    pub hang: &'a C::Hang,
    /// Cluster of the segment above the current node, if any.
    pub left_agg: Option<&'a C>,
    /// Cluster of the segment below the current node, if any.
    pub right_agg: Option<&'a C>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDirection {
    Found,
    NotFound,
    Left,
    Right,
    /// Continue in some cluster hanging off the current node that reported this key.
    Hanging(usize),
}
