//! The iterated local search driver.
//!
//! One instance owns the whole search state: the padded networks, the
//! per-network position assignments, the shared conservation matrix,
//! and the best snapshot seen so far. Network 0 is the fixed reference
//! ordering; only networks 1..n are ever permuted.

use std::cmp::Reverse;
use std::time::Instant;

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info};

use netmcs_common::{Network, VertexId};

use crate::alignment::Alignment;
use crate::config::AlignConfig;
use crate::error::AlignError;
use crate::matrix::ConservationMatrix;
use crate::search::{DeltaView, apply_swap, best_partner};

/// Threshold divisor for the pass-level stopping rule: a local-search
/// phase keeps running while a full pass accepts at least
/// `min_edges / MIN_PASS_SWAP_RATIO` swaps.
const MIN_PASS_SWAP_RATIO: usize = 1000;

/// Iterated local search over vertex-position permutations.
///
/// Construction pads all networks to a common size M with placeholder
/// vertices, assigns positions by descending degree, and counts the
/// initial conservation. Each [`step`](Self::step) perturbs the
/// non-reference networks, refines with best-improvement local search,
/// and snapshots the configuration whenever it strictly beats the best
/// seen.
pub struct IteratedLocalSearch {
    networks: Vec<Network>,
    /// positions[net][vertex id] -> current position.
    positions: Vec<Vec<usize>>,
    /// slots[net] -> vertex ids in the fixed degree-descending scan order.
    slots: Vec<Vec<VertexId>>,
    matrix: ConservationMatrix,
    best_positions: Vec<Vec<usize>>,
    quality: usize,
    best_quality: usize,
    min_pass_swaps: usize,
    perturbation_amount: f32,
    rng: SmallRng,
    size: usize,
}

impl IteratedLocalSearch {
    /// Build the search state from two or more networks.
    ///
    /// Takes ownership of the networks; padding mutates them, and the
    /// final alignment is produced from the same instances.
    pub fn new(mut networks: Vec<Network>, config: AlignConfig) -> Result<Self, AlignError> {
        let network_count = networks.len();
        if network_count < 2 {
            return Err(AlignError::TooFewNetworks {
                found: network_count,
            });
        }

        let size = networks.iter().map(Network::vertex_count).max().unwrap_or(0);
        // The swap count of a pass is bounded by the sparsest network,
        // so the stopping threshold scales with the minimum edge count.
        let min_edges = networks.iter().map(Network::edge_count).min().unwrap_or(0);

        let mut pad_id = 0usize;
        for network in &mut networks {
            while network.vertex_count() < size {
                network.add_placeholder(format!("$pad${pad_id}"));
                pad_id += 1;
            }
        }

        let slots: Vec<Vec<VertexId>> = networks
            .iter()
            .map(|network| {
                let mut ids: Vec<VertexId> = (0..network.vertex_count()).collect();
                ids.sort_by_key(|&id| Reverse(network.degree(id)));
                ids
            })
            .collect();

        let mut positions: Vec<Vec<usize>> = vec![vec![0; size]; network_count];
        for (network_slots, position) in slots.iter().zip(&mut positions) {
            for (pos, &id) in network_slots.iter().enumerate() {
                position[id] = pos;
            }
        }

        let matrix = ConservationMatrix::from_positions(&networks, &positions);
        let quality = matrix.count_conserved();

        info!(
            networks = network_count,
            size,
            initial_conserved = quality,
            "alignment search initialized"
        );

        let rng = match config.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_entropy(),
        };

        Ok(Self {
            best_positions: positions.clone(),
            best_quality: quality,
            quality,
            min_pass_swaps: min_edges / MIN_PASS_SWAP_RATIO,
            perturbation_amount: config.perturbation_amount,
            rng,
            matrix,
            networks,
            positions,
            slots,
            size,
        })
    }

    /// Run steps until `max_nonimproving` consecutive steps fail to
    /// improve the best quality, or `max_steps` steps have run.
    pub fn run(&mut self, max_nonimproving: usize, max_steps: usize) {
        let mut nonimproving = 0usize;
        let mut steps = 0usize;
        while nonimproving < max_nonimproving && steps < max_steps {
            nonimproving += 1;
            if self.step() {
                nonimproving = 0;
            }
            steps += 1;
            info!(
                step = steps,
                current = self.quality,
                best = self.best_quality,
                "step complete"
            );
        }
    }

    /// One perturb-then-refine step.
    ///
    /// Returns whether the step strictly improved on the best quality.
    /// Non-improving steps leave the working configuration wherever the
    /// local search ended; only the snapshot is protected.
    pub fn step(&mut self) -> bool {
        self.perturb();
        self.local_search();

        self.quality = self.matrix.count_conserved();
        if self.quality > self.best_quality {
            self.best_quality = self.quality;
            for (best, current) in self.best_positions.iter_mut().zip(&self.positions) {
                best.copy_from_slice(current);
            }
            return true;
        }
        false
    }

    /// Randomly swap `round(M * perturbation_amount)` position pairs in
    /// every non-reference network.
    fn perturb(&mut self) {
        if self.size < 2 {
            return;
        }
        let count = (self.size as f32 * self.perturbation_amount).round() as usize;
        for net in 1..self.networks.len() {
            for _ in 0..count {
                let u = self.rng.gen_range(0..self.size);
                let mut v = self.rng.gen_range(0..self.size);
                while v == u {
                    v = self.rng.gen_range(0..self.size);
                }
                apply_swap(
                    &mut self.matrix,
                    self.networks[net].neighbor_sets(),
                    &mut self.positions[net],
                    u,
                    v,
                );
            }
        }
    }

    /// Best-improvement hill climbing to convergence.
    ///
    /// For every non-reference network and every scan slot, all later
    /// slots are scored read-only (in parallel under the `rayon`
    /// feature) and the best strictly-improving swap is applied. Passes
    /// repeat while a full pass accepts at least the size-dependent
    /// swap threshold, clamped to one so small instances stop at exact
    /// convergence.
    fn local_search(&mut self) {
        let threshold = self.min_pass_swaps.max(1);
        let mut pass = 0usize;
        loop {
            pass += 1;
            let started = Instant::now();
            let mut accepted = 0usize;

            for net in 1..self.networks.len() {
                for j in 0..self.size.saturating_sub(1) {
                    let best = best_partner(
                        &DeltaView {
                            matrix: &self.matrix,
                            adjacency: self.networks[net].neighbor_sets(),
                            positions: &self.positions[net],
                        },
                        &self.slots[net],
                        j,
                    );
                    if let Some((delta, k)) = best {
                        if delta > 0 {
                            let (u, v) = (self.slots[net][j], self.slots[net][k]);
                            apply_swap(
                                &mut self.matrix,
                                self.networks[net].neighbor_sets(),
                                &mut self.positions[net],
                                u,
                                v,
                            );
                            accepted += 1;
                        }
                    }
                }
            }

            let elapsed_ms = started.elapsed().as_millis() as u64;
            debug!(pass, accepted, elapsed_ms, "local search pass");
            if accepted < threshold {
                break;
            }
        }
    }

    /// Materialize the best snapshot as an [`Alignment`].
    ///
    /// Restores the best positions onto the working state and orders
    /// each network's vertices by position. Idempotent; call it once
    /// the search budget is spent.
    pub fn alignment(&mut self) -> Alignment<'_> {
        for (position, best) in self.positions.iter_mut().zip(&self.best_positions) {
            position.copy_from_slice(best);
        }
        let orders = self
            .positions
            .iter()
            .map(|position| {
                let mut ids: Vec<VertexId> = (0..self.size).collect();
                ids.sort_by_key(|&id| position[id]);
                ids
            })
            .collect();
        Alignment::new(&self.networks, orders)
    }

    /// Conserved-pair count of the working configuration.
    pub fn current_quality(&self) -> usize {
        self.quality
    }

    /// Conserved-pair count of the best snapshot.
    pub fn best_quality(&self) -> usize {
        self.best_quality
    }

    /// Common padded size M.
    pub fn size(&self) -> usize {
        self.size
    }

    /// The padded networks, reference network first.
    pub fn networks(&self) -> &[Network] {
        &self.networks
    }

    /// Adjust the diversification strength for subsequent steps.
    pub fn set_perturbation_amount(&mut self, amount: f32) {
        self.perturbation_amount = amount;
    }
}
