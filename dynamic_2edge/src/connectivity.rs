//! Plain dynamic connectivity over a forest, the smallest use of the top tree.

use crate::{
    error::{self, Result},
    top_tree::TopTree,
};

/// Identifies a component between two consecutive links or cuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComponentId {
    root: usize,
    generation: u64,
}

#[derive(Debug)]
pub struct Connectivity {
    tree: TopTree,
    /// Bumped on every link and cut, so ids from before are never equal to new ones.
    generation: u64,
}

impl Connectivity {
    /// New forest on n vertices and no edges.
    pub fn new(n: usize) -> Self {
        Self {
            tree: TopTree::new(n),
            generation: 0,
        }
    }

    pub fn num_vertices(&self) -> usize {
        self.tree.num_vertices()
    }

    fn check_vertex(&self, v: usize) -> Result<()> {
        error::check_vertex(v, self.num_vertices())
    }

    /// Adds the edge (u, v). Fails if they are already connected.
    pub fn link(&mut self, u: usize, v: usize) -> Result<()> {
        self.check_vertex(u)?;
        self.check_vertex(v)?;
        self.tree.link(u, v, ())?;
        self.generation += 1;
        log::trace!("link ({u}, {v})");
        Ok(())
    }

    /// Removes the edge (u, v). Fails if there is no such edge.
    pub fn cut(&mut self, u: usize, v: usize) -> Result<()> {
        self.check_vertex(u)?;
        self.check_vertex(v)?;
        self.tree.cut(u, v)?;
        self.generation += 1;
        log::trace!("cut ({u}, {v})");
        Ok(())
    }

    pub fn component_id(&mut self, u: usize) -> Result<ComponentId> {
        self.check_vertex(u)?;
        Ok(ComponentId {
            root: self.tree.find_root(u),
            generation: self.generation,
        })
    }

    pub fn connected(&mut self, u: usize, v: usize) -> Result<bool> {
        Ok(self.component_id(u)? == self.component_id(v)?)
    }
}
