use crate::two_edge::EdgeHandle;

/// Failures reported by the public operations of this crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("vertex {vertex} is out of range for a graph on {n} vertices")]
    InvalidVertexId { vertex: usize, n: usize },
    #[error("self loop on vertex {0} rejected")]
    SelfLoopRejected(usize),
    #[error("edge {0:?} does not exist")]
    EdgeNotFound(EdgeHandle),
    #[error("vertices {0} and {1} are already connected")]
    AlreadyConnected(usize, usize),
    #[error("there is no tree edge between {0} and {1}")]
    NotAnEdge(usize, usize),
    /// Internal state is corrupted. Never recoverable.
    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

pub type Result<T> = std::result::Result<T, Error>;

pub(crate) fn check_vertex(vertex: usize, n: usize) -> Result<()> {
    if vertex < n {
        Ok(())
    } else {
        Err(Error::InvalidVertexId { vertex, n })
    }
}
