use common::{init_logger, Dumb};
use dynamic_2edge::{Connectivity, Error};
use rand::{Rng, SeedableRng};

mod common;

fn assert_all_connections(t: &mut Connectivity, groups: &[&[usize]]) {
    for g1 in groups {
        for u in g1.iter().copied() {
            for g2 in groups {
                for v in g2.iter().copied() {
                    assert_eq!(t.connected(u, v).unwrap(), g1 == g2, "u {u} v {v}");
                }
            }
        }
    }
}

#[test]
fn test_link_cut() {
    init_logger();
    let mut t = Connectivity::new(5);
    assert_all_connections(&mut t, &[&[0], &[1], &[2], &[3], &[4]]);
    t.link(0, 1).unwrap();
    t.link(0, 2).unwrap();
    assert_eq!(t.link(1, 2), Err(Error::AlreadyConnected(1, 2)));
    assert_eq!(t.cut(1, 2), Err(Error::NotAnEdge(1, 2)));
    assert_all_connections(&mut t, &[&[0, 1, 2], &[3], &[4]]);
    t.link(4, 1).unwrap();
    assert_all_connections(&mut t, &[&[0, 1, 2, 4], &[3]]);
    t.cut(1, 0).unwrap();
    assert_all_connections(&mut t, &[&[0, 2], &[1, 4], &[3]]);
    assert_eq!(t.cut(1, 0), Err(Error::NotAnEdge(1, 0)));
}

#[test]
fn test_component_ids() {
    let mut t = Connectivity::new(4);
    t.link(0, 1).unwrap();
    let a = t.component_id(0).unwrap();
    assert_eq!(a, t.component_id(1).unwrap());
    assert_ne!(a, t.component_id(2).unwrap());
    t.link(2, 3).unwrap();
    // Any link or cut invalidates older ids.
    assert_ne!(a, t.component_id(0).unwrap());
    assert_eq!(t.component_id(3).unwrap(), t.component_id(2).unwrap());
}

#[test]
fn test_errors() {
    let mut t = Connectivity::new(2);
    assert_eq!(
        t.link(0, 2),
        Err(Error::InvalidVertexId { vertex: 2, n: 2 })
    );
    assert!(t.cut(3, 0).is_err());
    assert!(t.connected(0, 9).is_err());
    assert_eq!(t.num_vertices(), 2);
}

fn compare_with_dumb(seed: u64) {
    const N: usize = 25;
    let mut t1 = Connectivity::new(N);
    let mut t2 = Dumb::new(N);
    let mut edges = vec![];
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    for q in 0..3000 {
        if edges.is_empty() || rng.gen_bool(0.66) {
            let u = rng.gen_range(0..N);
            let v = rng.gen_range(0..N);
            let gs = t2.groups();
            if gs[u] == gs[v] {
                assert!(t1.link(u, v).is_err());
            } else {
                t1.link(u, v).unwrap();
                edges.push((u, v, t2.add_edge(u, v)));
            }
        } else {
            let idx = rng.gen_range(0..edges.len());
            let (u, v, id) = edges.swap_remove(idx);
            t1.cut(v, u).unwrap();
            t2.remove_edge(id);
        }
        if q % 10 == 0 {
            let gs = t2.groups();
            for u in 0..N {
                for v in 0..N {
                    assert_eq!(t1.connected(u, v).unwrap(), gs[u] == gs[v], "q {q} u {u} v {v}");
                }
            }
        }
    }
}

#[test]
fn test_cmp1() {
    init_logger();
    compare_with_dumb(9232345);
}
#[test]
fn test_cmp2() {
    init_logger();
    compare_with_dumb(100000007);
}
