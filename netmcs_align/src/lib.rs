//! Heuristic multiple-network alignment by iterated local search.
//!
//! Given two or more undirected networks, the engine pads them to a
//! common size, assigns every vertex an integer position, and searches
//! for the per-network position permutations that maximize the number
//! of edges conserved across all networks simultaneously. The first
//! network is the fixed reference ordering.
//!
//! The search alternates randomized perturbation with best-improvement
//! hill climbing over position swaps; every candidate swap is scored
//! incrementally against a shared conservation matrix, never by
//! recounting from scratch. Enable the `rayon` feature to score the
//! candidates of each scan slot in parallel.

pub mod alignment;
pub mod config;
pub mod error;
pub mod matrix;

mod ils;
mod search;

pub use alignment::{Alignment, SubgraphOptions};
pub use config::AlignConfig;
pub use error::AlignError;
pub use ils::IteratedLocalSearch;
pub use matrix::ConservationMatrix;
