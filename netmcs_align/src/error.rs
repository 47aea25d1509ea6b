//! Errors surfaced by the alignment engine.
//!
//! The hot search path has no recoverable failures; everything here is
//! raised at construction time or by checked accessors on the public
//! surface.

use thiserror::Error;

/// Errors raised by the alignment engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlignError {
    /// Alignment needs at least two networks to compare.
    #[error("need at least two networks for alignment, got {found}")]
    TooFewNetworks {
        /// Number of networks supplied.
        found: usize,
    },
    /// A position outside the matrix dimension was requested.
    #[error("position {index} out of range for matrix of size {size}")]
    IndexOutOfRange {
        /// The offending position.
        index: usize,
        /// The matrix dimension.
        size: usize,
    },
}
