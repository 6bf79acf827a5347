use dynamic_2edge::{
    top_tree::{Cluster, Element, SearchData, SearchDirection, TopTree},
    Error,
};

mod common;

/// Counts vertices and sums weights. Path edges can all be increased at once.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Sum {
    vertices: usize,
    /// Vertices with a positive value.
    positive: usize,
    weight: i64,
    path_edges: i64,
    path_weight: i64,
}

impl Cluster for Sum {
    type Vertex = i64;
    type Edge = i64;
    type Hang = Sum;
    type Tag = i64;

    fn point(vertex: &i64, hang: &Sum) -> Self {
        Sum {
            vertices: 1 + hang.vertices,
            positive: (*vertex > 0) as usize + hang.positive,
            weight: hang.weight,
            path_edges: 0,
            path_weight: 0,
        }
    }

    fn leaf(edge: &i64, hang: &Sum) -> Self {
        Sum {
            vertices: hang.vertices,
            positive: hang.positive,
            weight: edge + hang.weight,
            path_edges: 1,
            path_weight: *edge,
        }
    }

    fn merge(above: &Self, below: &Self) -> Self {
        Sum {
            vertices: above.vertices + below.vertices,
            positive: above.positive + below.positive,
            weight: above.weight + below.weight,
            path_edges: above.path_edges + below.path_edges,
            path_weight: above.path_weight + below.path_weight,
        }
    }

    fn reverse(&mut self) {}

    fn rake(hang: &mut Sum, child: &Self) {
        hang.vertices += child.vertices;
        hang.positive += child.positive;
        hang.weight += child.weight;
    }

    fn unrake(hang: &mut Sum, child: &Self) {
        hang.vertices -= child.vertices;
        hang.positive -= child.positive;
        hang.weight -= child.weight;
    }

    fn hang_keys(&self) -> Vec<usize> {
        if self.positive > 0 {
            vec![0]
        } else {
            vec![]
        }
    }

    fn apply(&mut self, tag: &i64) {
        self.weight += tag * self.path_edges;
        self.path_weight += tag * self.path_edges;
    }

    fn apply_edge(edge: &mut i64, tag: &i64) {
        *edge += tag;
    }

    fn compose(tag: &mut i64, next: &i64) {
        *tag += next;
    }

    fn is_identity(tag: &i64) -> bool {
        *tag == 0
    }
}

fn whole(t: &mut TopTree<Sum>, u: usize) -> Sum {
    t.expose(u).agg().clone()
}

fn path(t: &mut TopTree<Sum>, u: usize, v: usize) -> Option<Sum> {
    t.expose_path(u, v).map(|p| p.agg().clone())
}

fn find_positive(t: &mut TopTree<Sum>, u: usize, v: usize) -> Option<usize> {
    let exposed = t.expose_path(u, v)?;
    exposed.find_element(|s: SearchData<'_, Sum>| {
        if s.left_agg.is_some_and(|l| l.positive > 0) {
            SearchDirection::Left
        } else if matches!(s.element, Element::Vertex(&x) if x > 0) {
            SearchDirection::Found
        } else if s.hang.positive > 0 {
            SearchDirection::Hanging(0)
        } else if s.right_agg.is_some_and(|r| r.positive > 0) {
            SearchDirection::Right
        } else {
            SearchDirection::NotFound
        }
    })
}

/// Path 0 - 1 - ... - (n - 1), edge (i, i + 1) weighing i + 1.
fn build(n: usize) -> (TopTree<Sum>, Vec<usize>) {
    let mut t = TopTree::new(n);
    let leaves = (1..n)
        .map(|v| t.link_leaf(v - 1, v, v as i64).unwrap())
        .collect();
    (t, leaves)
}

#[test]
fn test_aggregates() {
    common::init_logger();
    let (mut t, leaves) = build(5);
    assert_eq!(t.num_vertices(), 5);
    assert_eq!(t.num_edges(), 4);
    let all = whole(&mut t, 0);
    assert_eq!((all.vertices, all.weight), (5, 10));
    let p = path(&mut t, 0, 4).unwrap();
    assert_eq!((p.path_edges, p.path_weight, p.weight), (4, 10, 10));
    let p = path(&mut t, 3, 1).unwrap();
    assert_eq!((p.vertices, p.path_edges, p.path_weight), (5, 2, 5));
    assert_eq!(path(&mut t, 2, 2).unwrap().path_edges, 0);
    for (i, &leaf) in leaves.iter().enumerate() {
        assert_eq!(t.edge_ends(leaf), [i, i + 1]);
        assert_eq!(*t.edge(leaf), i as i64 + 1);
    }
}

#[test]
fn test_path_tags() {
    common::init_logger();
    let (mut t, leaves) = build(5);
    t.expose_path(1, 3).unwrap().apply(&10);
    assert_eq!(path(&mut t, 0, 4).unwrap().path_weight, 30);
    assert_eq!(path(&mut t, 4, 2).unwrap().path_weight, 17);
    t.expose_path(4, 0).unwrap().apply(&-1);
    let weights: Vec<_> = leaves.iter().map(|&l| t.mutate_edge(l, |w| *w)).collect();
    assert_eq!(weights, vec![0, 11, 12, 3]);
    assert_eq!(whole(&mut t, 2).weight, 26);
}

#[test]
fn test_link_cut() {
    common::init_logger();
    let (mut t, leaves) = build(5);
    assert!(t.link_leaf(0, 4, 100).is_none());
    assert_eq!(t.link(4, 0, 100).unwrap_err(), Error::AlreadyConnected(4, 0));
    assert!(matches!(t.cut(0, 2), Err(Error::NotAnEdge(0, 2))));
    t.expose_path(1, 2).unwrap().apply(&5);
    let [a, b] = t.cut(2, 1).unwrap();
    assert!(!t.connected(a, b));
    assert!(!t.connected(0, 4));
    assert!(t.connected(2, 4));
    assert!(path(&mut t, 0, 3).is_none());
    assert_eq!(whole(&mut t, 0).vertices, 2);
    assert_eq!(whole(&mut t, 1).weight, 1);
    assert_eq!(whole(&mut t, 4).vertices, 3);
    assert_eq!(whole(&mut t, 3).weight, 7);
    assert_eq!(t.num_edges(), 3);
    t.cut_leaf(leaves[0]);
    assert_eq!(whole(&mut t, 0).vertices, 1);
    // Freed leaves are reused.
    let leaf = t.link_leaf(0, 4, 50).unwrap();
    assert!(leaf == leaves[0] || leaf == leaves[1]);
    t.link(1, 3, 0).unwrap();
    assert_eq!(whole(&mut t, 1).vertices, 5);
    assert_eq!(whole(&mut t, 1).weight, 57);
    assert_eq!(path(&mut t, 1, 0).unwrap().path_weight, 54);
}

#[test]
fn test_search() {
    common::init_logger();
    let (mut t, _) = build(7);
    assert_eq!(find_positive(&mut t, 0, 6), None);
    t.mutate_vertex(5, |x| *x = 7);
    assert_eq!(find_positive(&mut t, 0, 6), Some(5));
    // 5 hangs off the path.
    assert_eq!(find_positive(&mut t, 0, 1), Some(5));
    assert_eq!(find_positive(&mut t, 6, 6), Some(5));
    t.mutate_vertex(2, |x| *x = 1);
    assert_eq!(find_positive(&mut t, 0, 6), Some(2));
    assert_eq!(find_positive(&mut t, 6, 0), Some(5));
    assert_eq!(find_positive(&mut t, 3, 4), Some(2));
    assert_eq!(*t.vertex(2), 1);
    t.cut(3, 4).unwrap();
    assert_eq!(find_positive(&mut t, 4, 4), Some(5));
    t.mutate_vertex(5, |x| *x = 0);
    assert_eq!(find_positive(&mut t, 6, 4), None);
    assert_eq!(find_positive(&mut t, 6, 0), None);
    assert_eq!(whole(&mut t, 0).positive, 1);
}

#[test]
fn test_incident_leaves() {
    let mut t: TopTree<Sum> = TopTree::new(4);
    let a = t.link_leaf(0, 1, 1).unwrap();
    let b = t.link_leaf(2, 0, 2).unwrap();
    let c = t.link_leaf(0, 3, 3).unwrap();
    let mut around: Vec<_> = t.incident_leaves(0).collect();
    around.sort();
    assert_eq!(around, vec![a, b, c]);
    let first = t.get_adjacent_leaf_node(0, 0).unwrap();
    let second = t.get_adjacent_leaf_node(0, 1).unwrap();
    assert_ne!(first, second);
    assert!(t.get_adjacent_leaf_node(0, 3).is_none());
    assert_eq!(t.get_adjacent_leaf_node(2, 0), Some(b));
    t.cut_leaf(b);
    assert!(t.get_adjacent_leaf_node(2, 0).is_none());
    assert_eq!(t.incident_leaves(0).count(), 2);
}

#[test]
fn test_manual_splays() {
    let (mut t, leaves) = build(6);
    for &leaf in &leaves {
        t.full_splay(leaf);
        t.push_flip(leaf);
    }
    t.full_splay(3);
    let e = t.expose(3);
    assert_eq!(e.root(), 3);
    assert_eq!(e.agg().weight, 15);
    drop(e);
    let p = t.expose_path(0, 5).unwrap();
    let root = p.root();
    assert_eq!(root, 5);
    drop(p);
    assert_eq!(t.agg(root).path_edges, 5);
    t.recompute_root_path(root);
    assert_eq!(t.agg(root).path_weight, 15);
}

#[test]
fn test_expose_single_vertex() {
    common::init_logger();
    let (mut t, leaves) = build(4);
    drop(t.expose_path(0, 3));
    let mut e = t.expose(3);
    assert_eq!(e.ends(), [3, 3]);
    let s = e.agg().clone();
    assert_eq!((s.path_edges, s.path_weight), (0, 0));
    assert_eq!((s.vertices, s.weight), (4, 6));
    // No path edges, so nothing is tagged.
    e.apply(&100);
    drop(e);
    let weights: Vec<_> = leaves.iter().map(|&l| t.mutate_edge(l, |w| *w)).collect();
    assert_eq!(weights, vec![1, 2, 3]);
    assert_eq!(t.expose_path(0, 3).unwrap().ends(), [0, 3]);
    assert_eq!(path(&mut t, 0, 3).unwrap().path_weight, 6);
    drop(t.expose_path(1, 2));
    assert_eq!(whole(&mut t, 1).path_edges, 0);
}

#[test]
fn test_unit_cluster() {
    let mut t: TopTree = TopTree::new(4);
    t.link(0, 1, ()).unwrap();
    t.link(2, 3, ()).unwrap();
    assert!(t.connected(1, 0));
    assert!(!t.connected(1, 2));
    let r = t.find_root(3);
    assert_eq!(r, t.find_root(2));
    t.link(1, 2, ()).unwrap();
    assert!(t.connected(0, 3));
    t.cut(1, 2).unwrap();
    assert!(!t.connected(0, 3));
    assert!(format!("{t:?}").contains("TopTree"));
}
