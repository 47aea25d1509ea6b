//! Shared data model for multiple-network alignment.
//!
//! This crate holds the pieces every other netmcs crate agrees on: the
//! undirected [`network::Network`] type with its adjacency index, and
//! plain-text edge-list I/O.

pub mod network;

pub use network::io::{ImportError, read_network, write_network};
pub use network::{Network, Vertex, VertexId};
