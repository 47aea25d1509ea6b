//! Incremental edge-conservation accounting.
//!
//! The matrix is the single shared count structure the whole search
//! leans on: cell (i, j) holds the number of networks in which the
//! vertices currently occupying positions i and j are adjacent. It is
//! built once from the input edges and afterwards only ever adjusted
//! incrementally by swap moves; the full scan runs once per step.

use itertools::Itertools;

use netmcs_common::Network;

use crate::error::AlignError;

/// Symmetric M×M conservation counts. The diagonal is unused.
///
/// Invariant: after every applied swap, `cell(i, j)` equals the number
/// of networks whose vertices at positions i and j are adjacent. Cell
/// values never leave `[0, n]`; the bounds are enforced as debug
/// contracts because a violation is a bug in delta/swap pairing, not a
/// recoverable condition.
#[derive(Clone, Debug)]
pub struct ConservationMatrix {
    size: usize,
    networks: u32,
    cells: Vec<u32>,
}

impl ConservationMatrix {
    /// Create a zeroed matrix for `size` positions across `networks`
    /// networks.
    pub fn new(size: usize, networks: u32) -> Self {
        Self {
            size,
            networks,
            cells: vec![0; size * size],
        }
    }

    /// Build the matrix from every edge of every network, using the
    /// supplied per-network position assignments (indexed by vertex id).
    pub fn from_positions(networks: &[Network], positions: &[Vec<usize>]) -> Self {
        let size = positions.first().map_or(0, Vec::len);
        let mut matrix = Self::new(size, networks.len() as u32);
        for (network, position) in networks.iter().zip(positions) {
            for (u, v) in network.edges() {
                matrix.increment(position[u], position[v]);
            }
        }
        matrix
    }

    /// Matrix dimension M.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of networks n, the ceiling for every cell.
    pub fn networks(&self) -> u32 {
        self.networks
    }

    /// Checked read of the agreement count for a position pair.
    pub fn get(&self, i: usize, j: usize) -> Result<u32, AlignError> {
        for index in [i, j] {
            if index >= self.size {
                return Err(AlignError::IndexOutOfRange {
                    index,
                    size: self.size,
                });
            }
        }
        Ok(self.at(i, j))
    }

    /// Unchecked read used on the hot path. Bounds are debug contracts.
    #[contracts::debug_requires(i < self.size && j < self.size)]
    #[inline]
    pub(crate) fn at(&self, i: usize, j: usize) -> u32 {
        self.cells[i * self.size + j]
    }

    /// Raise the symmetric pair (i, j)/(j, i) by one.
    #[contracts::debug_requires(i != j, "diagonal cells are unused")]
    #[contracts::debug_requires(i < self.size && j < self.size)]
    #[contracts::debug_requires(self.at(i, j) < self.networks, "cell already at network count")]
    pub fn increment(&mut self, i: usize, j: usize) {
        self.cells[i * self.size + j] += 1;
        self.cells[j * self.size + i] += 1;
    }

    /// Lower the symmetric pair (i, j)/(j, i) by one.
    #[contracts::debug_requires(i != j, "diagonal cells are unused")]
    #[contracts::debug_requires(i < self.size && j < self.size)]
    #[contracts::debug_requires(self.at(i, j) > 0, "cell already at zero")]
    pub fn decrement(&mut self, i: usize, j: usize) {
        self.cells[i * self.size + j] -= 1;
        self.cells[j * self.size + i] -= 1;
    }

    /// Count position pairs conserved in every network simultaneously.
    ///
    /// O(M²) upper-triangle scan; called once per step, never per
    /// candidate move.
    pub fn count_conserved(&self) -> usize {
        (0..self.size)
            .tuple_combinations()
            .filter(|&(i, j)| self.at(i, j) == self.networks)
            .count()
    }
}
