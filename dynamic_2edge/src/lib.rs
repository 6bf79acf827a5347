pub mod connectivity;
pub mod error;
pub mod forest;
pub mod top_tree;
pub mod two_edge;

pub use connectivity::Connectivity;
pub use error::{Error, Result};
pub use two_edge::{EdgeHandle, TwoEdgeConnectivity};
