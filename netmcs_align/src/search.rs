//! Swap move evaluation and application.
//!
//! The local search examines thousands of candidate swaps per pass, so
//! moves are scored without touching any state: [`DeltaView`] is an
//! immutable snapshot of the matrix, one network's adjacency, and that
//! network's positions, safe to hand to a parallel map. The winning
//! move is applied afterwards by the owning thread via [`apply_swap`];
//! evaluation and mutation never overlap.

use indexmap::IndexSet;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

use netmcs_common::VertexId;

use crate::matrix::ConservationMatrix;

/// Read-only view of the state a candidate swap is scored against.
pub(crate) struct DeltaView<'a> {
    /// Shared conservation counts.
    pub matrix: &'a ConservationMatrix,
    /// Neighbor sets of the network being permuted, by vertex id.
    pub adjacency: &'a [IndexSet<VertexId>],
    /// Current positions of that network's vertices, by vertex id.
    pub positions: &'a [usize],
}

impl DeltaView<'_> {
    /// Net change in conserved pairs if `u` and `v` exchanged positions.
    ///
    /// Only cells touched by the symmetric difference of the two
    /// neighbor sets can change. For each such neighbor the closed form
    /// `-(2*cell - 1)` / `+(2*cell + 1)` captures exactly the cases
    /// where a cell crosses the full-conservation threshold, without
    /// evaluating the matrix before and after.
    pub fn delta(&self, u: VertexId, v: VertexId) -> i64 {
        let i = self.positions[u];
        let j = self.positions[v];
        let mut delta = 0i64;

        for &w in &self.adjacency[u] {
            if w == v || self.adjacency[v].contains(&w) {
                continue;
            }
            let l = self.positions[w];
            delta -= 2 * i64::from(self.matrix.at(i, l)) - 1;
            delta += 2 * i64::from(self.matrix.at(j, l)) + 1;
        }

        for &w in &self.adjacency[v] {
            if w == u || self.adjacency[u].contains(&w) {
                continue;
            }
            let l = self.positions[w];
            delta -= 2 * i64::from(self.matrix.at(j, l)) - 1;
            delta += 2 * i64::from(self.matrix.at(i, l)) + 1;
        }

        delta
    }
}

/// Exchange the positions of `u` and `v`, keeping the matrix invariant
/// intact by moving every cell touched by the neighbor-set symmetric
/// difference.
pub(crate) fn apply_swap(
    matrix: &mut ConservationMatrix,
    adjacency: &[IndexSet<VertexId>],
    positions: &mut [usize],
    u: VertexId,
    v: VertexId,
) {
    let i = positions[u];
    let j = positions[v];

    for &w in &adjacency[u] {
        if w == v || adjacency[v].contains(&w) {
            continue;
        }
        let l = positions[w];
        matrix.decrement(i, l);
        matrix.increment(j, l);
    }

    for &w in &adjacency[v] {
        if w == u || adjacency[u].contains(&w) {
            continue;
        }
        let l = positions[w];
        matrix.decrement(j, l);
        matrix.increment(i, l);
    }

    positions.swap(u, v);
}

/// Pick the winner between two scored candidates: greater delta first,
/// smaller slot index on ties. Total order, so the parallel reduction
/// is deterministic regardless of how the range is split.
fn better(a: (i64, usize), b: (i64, usize)) -> (i64, usize) {
    if b.0 > a.0 || (b.0 == a.0 && b.1 < a.1) { b } else { a }
}

/// Score every candidate partner in `slots[j+1..]` for the vertex at
/// scan slot `j` and return `(delta, slot)` of the best one.
///
/// The evaluation is read-only over the snapshot and runs in parallel
/// when the `rayon` feature is enabled.
pub(crate) fn best_partner(
    view: &DeltaView<'_>,
    slots: &[VertexId],
    j: usize,
) -> Option<(i64, usize)> {
    let u = slots[j];
    let candidates = j + 1..slots.len();

    #[cfg(feature = "rayon")]
    let best = candidates
        .into_par_iter()
        .map(|k| (view.delta(u, slots[k]), k))
        .reduce_with(better);

    #[cfg(not(feature = "rayon"))]
    let best = candidates
        .map(|k| (view.delta(u, slots[k]), k))
        .reduce(better);

    best
}
