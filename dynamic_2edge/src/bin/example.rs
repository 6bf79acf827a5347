use dynamic_2edge::{EdgeHandle, Result, TwoEdgeConnectivity};

fn add_edge(t: &mut TwoEdgeConnectivity, u: usize, v: usize) -> Result<EdgeHandle> {
    println!("Adding edge from {} to {}", u, v);
    t.insert(u, v)
}

fn rem_edge(t: &mut TwoEdgeConnectivity, e: EdgeHandle) -> Result<()> {
    let (u, v) = t.endpoints(e)?;
    println!("Removing edge from {} to {}", u, v);
    t.remove(e)
}

fn is_2_edge_connected(t: &mut TwoEdgeConnectivity, u: usize, v: usize) -> Result<()> {
    let res = t.two_edge_connected(u, v)?;
    println!(
        "Are {} and {} 2-edge-connected? {}",
        u,
        v,
        if res { "Yes" } else { "No" }
    );
    if let Some(bridge) = t.find_bridge(u, v)? {
        let (a, b) = t.endpoints(bridge)?;
        println!("  Removing ({}, {}) would disconnect them", a, b);
    }
    Ok(())
}

fn main() -> Result<()> {
    let mut t = TwoEdgeConnectivity::new(10);
    let mut path = vec![];
    for u in 0..9 {
        path.push(t.insert(u, u + 1)?);
    }
    println!("Created a path of length 10 (vertices 0 to 9)");
    is_2_edge_connected(&mut t, 2, 3)?;
    let back = add_edge(&mut t, 0, 3)?;
    is_2_edge_connected(&mut t, 2, 3)?;
    is_2_edge_connected(&mut t, 2, 4)?;
    add_edge(&mut t, 7, 9)?;
    is_2_edge_connected(&mut t, 7, 8)?;
    rem_edge(&mut t, path[1])?;
    is_2_edge_connected(&mut t, 0, 3)?;
    rem_edge(&mut t, back)?;
    is_2_edge_connected(&mut t, 0, 3)?;
    Ok(())
}
