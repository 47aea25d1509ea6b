//! Alignment extraction and conserved-subgraph post-processing.
//!
//! An [`Alignment`] is the user-facing result of a search: for every
//! network, its vertices ordered by final position, so that row p holds
//! the vertices aligned to each other. Post-processing builds the
//! conserved subnetwork out of the rows, with optional exception
//! tolerance, connectivity filtering, and leaf pruning.

use std::collections::VecDeque;
use std::io::{self, Write};

use indexmap::IndexMap;
use itertools::Itertools;

use netmcs_common::{Network, VertexId};

use crate::error::AlignError;
use crate::matrix::ConservationMatrix;

/// Options for extracting the conserved subnetwork from an alignment.
#[derive(Clone, Debug, Default)]
pub struct SubgraphOptions {
    /// Number of networks an edge may be missing from and still be
    /// kept. Zero keeps only fully conserved edges.
    pub max_exceptions: usize,
    /// Keep only the largest connected component of the result.
    pub largest_component_only: bool,
    /// Iteratively drop degree-one vertices whose only incident edge is
    /// an exception edge (one missing from at least one network).
    pub prune_exception_leaves: bool,
}

/// Per-network vertex orderings under the best positions found.
#[derive(Clone, Debug)]
pub struct Alignment<'a> {
    networks: &'a [Network],
    /// orders[net][position] -> vertex id.
    orders: Vec<Vec<VertexId>>,
}

impl<'a> Alignment<'a> {
    pub(crate) fn new(networks: &'a [Network], orders: Vec<Vec<VertexId>>) -> Self {
        Self { networks, orders }
    }

    /// Number of aligned networks.
    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    /// Number of positions (the common padded size M).
    pub fn size(&self) -> usize {
        self.orders.first().map_or(0, Vec::len)
    }

    /// Iterate rows: for each position, one entry per network holding
    /// the vertex name, or `None` for a placeholder.
    pub fn rows(&self) -> impl Iterator<Item = Vec<Option<&str>>> + '_ {
        (0..self.size()).map(move |p| {
            self.orders
                .iter()
                .zip(self.networks)
                .map(|(order, network)| {
                    let vertex = network.vertex(order[p]);
                    if vertex.is_placeholder() {
                        None
                    } else {
                        Some(vertex.name())
                    }
                })
                .collect()
        })
    }

    /// Write the alignment as a tab-separated table, one row per
    /// position, placeholder entries omitted. Rows consisting only of
    /// placeholders are skipped.
    pub fn write_table<W: Write>(&self, mut writer: W) -> io::Result<()> {
        for row in self.rows() {
            let mut names = row.iter().flatten();
            let Some(first) = names.next() else {
                continue;
            };
            write!(writer, "{first}")?;
            for name in names {
                write!(writer, "\t{name}")?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }

    /// Number of networks in which the rows at positions `p` and `q`
    /// are adjacent.
    pub fn support(&self, p: usize, q: usize) -> Result<u32, AlignError> {
        self.support_matrix().get(p, q)
    }

    /// Conservation counts recomputed over the final orderings.
    fn support_matrix(&self) -> ConservationMatrix {
        let positions: Vec<Vec<usize>> = self
            .orders
            .iter()
            .map(|order| {
                let mut position = vec![0; order.len()];
                for (p, &id) in order.iter().enumerate() {
                    position[id] = p;
                }
                position
            })
            .collect();
        ConservationMatrix::from_positions(self.networks, &positions)
    }

    /// Label for an aligned row: its non-placeholder member names in
    /// network order, joined with `,`. `None` if the row is entirely
    /// placeholders.
    fn row_label(&self, p: usize) -> Option<String> {
        let label = self
            .orders
            .iter()
            .zip(self.networks)
            .filter_map(|(order, network)| {
                let vertex = network.vertex(order[p]);
                (!vertex.is_placeholder()).then(|| vertex.name())
            })
            .join(",");
        (!label.is_empty()).then_some(label)
    }

    /// Build the conserved subnetwork over aligned rows.
    ///
    /// An edge between rows p and q is kept when it is present in at
    /// least `n - max_exceptions` networks; rows without any kept
    /// incident edge do not appear.
    pub fn conserved_network(&self, options: &SubgraphOptions) -> Network {
        let network_count = self.networks.len() as u32;
        let needed = network_count.saturating_sub(options.max_exceptions as u32);
        let support = self.support_matrix();

        let mut kept: Vec<(usize, usize, u32)> = (0..support.size())
            .tuple_combinations()
            .filter_map(|(p, q)| {
                let s = support.at(p, q);
                (s > 0 && s >= needed).then_some((p, q, s))
            })
            .collect();

        if options.prune_exception_leaves {
            prune_exception_leaves(&mut kept, self.size(), network_count);
        }
        if options.largest_component_only {
            retain_largest_component(&mut kept);
        }

        let mut conserved = Network::new("conserved");
        for &(p, q, _) in &kept {
            // A supported edge implies real vertices on both rows.
            let (Some(a), Some(b)) = (self.row_label(p), self.row_label(q)) else {
                continue;
            };
            conserved.add_edge_by_name(a, b);
        }
        conserved
    }

    /// Write every aligned pair with nonzero support as
    /// `label_p <TAB> label_q <TAB> fraction` rows, where fraction is
    /// support divided by the number of networks.
    pub fn write_consensus<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let support = self.support_matrix();
        let network_count = self.networks.len() as f32;
        for (p, q) in (0..support.size()).tuple_combinations() {
            let s = support.at(p, q);
            if s == 0 {
                continue;
            }
            let (Some(a), Some(b)) = (self.row_label(p), self.row_label(q)) else {
                continue;
            };
            writeln!(writer, "{a}\t{b}\t{:.4}", s as f32 / network_count)?;
        }
        Ok(())
    }
}

/// Iteratively drop edges whose exception status makes one endpoint a
/// removable leaf. Removing a leaf can expose another, so this runs to
/// a fixed point.
fn prune_exception_leaves(kept: &mut Vec<(usize, usize, u32)>, size: usize, networks: u32) {
    loop {
        let mut degree = vec![0usize; size];
        for &(p, q, _) in kept.iter() {
            degree[p] += 1;
            degree[q] += 1;
        }
        let before = kept.len();
        kept.retain(|&(p, q, s)| !(s < networks && (degree[p] == 1 || degree[q] == 1)));
        if kept.len() == before {
            break;
        }
    }
}

/// Keep only edges of the largest connected component; equal sizes are
/// broken by the smallest contained position.
fn retain_largest_component(kept: &mut Vec<(usize, usize, u32)>) {
    let mut adjacency: IndexMap<usize, Vec<usize>> = IndexMap::new();
    for &(p, q, _) in kept.iter() {
        adjacency.entry(p).or_default().push(q);
        adjacency.entry(q).or_default().push(p);
    }

    let mut component: IndexMap<usize, usize> = IndexMap::new();
    let mut best: Option<(usize, usize, usize)> = None; // (size, min position, id)
    let mut next_component = 0usize;
    for &start in adjacency.keys() {
        if component.contains_key(&start) {
            continue;
        }
        let id = next_component;
        next_component += 1;

        let mut queue = VecDeque::from([start]);
        component.insert(start, id);
        let mut count = 0usize;
        let mut min_position = start;
        while let Some(p) = queue.pop_front() {
            count += 1;
            min_position = min_position.min(p);
            for &q in &adjacency[&p] {
                if !component.contains_key(&q) {
                    component.insert(q, id);
                    queue.push_back(q);
                }
            }
        }

        let candidate = (count, min_position, id);
        best = Some(match best {
            None => candidate,
            Some(current) => {
                let (size, min_pos, _) = current;
                if count > size || (count == size && min_position < min_pos) {
                    candidate
                } else {
                    current
                }
            }
        });
    }

    if let Some((_, _, winner)) = best {
        kept.retain(|&(p, _, _)| component[&p] == winner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two networks over the same four vertices, identity ordering.
    fn fixture(edges_a: &[(&str, &str)], edges_b: &[(&str, &str)]) -> (Vec<Network>, Vec<Vec<VertexId>>) {
        let mut a = Network::new("a");
        let mut b = Network::new("b");
        for net in [&mut a, &mut b] {
            for name in ["w", "x", "y", "z"] {
                net.add_vertex(name);
            }
        }
        for &(u, v) in edges_a {
            a.add_edge_by_name(u, v);
        }
        for &(u, v) in edges_b {
            b.add_edge_by_name(u, v);
        }
        let orders = vec![vec![0, 1, 2, 3], vec![0, 1, 2, 3]];
        (vec![a, b], orders)
    }

    #[test]
    fn support_counts_agreeing_networks() {
        let (networks, orders) = fixture(
            &[("w", "x"), ("x", "y"), ("y", "z")],
            &[("w", "x"), ("x", "y")],
        );
        let alignment = Alignment::new(&networks, orders);
        assert_eq!(alignment.support(0, 1), Ok(2));
        assert_eq!(alignment.support(2, 3), Ok(1));
        assert_eq!(alignment.support(0, 3), Ok(0));
    }

    #[test]
    fn conserved_network_keeps_fully_conserved_edges() {
        let (networks, orders) = fixture(
            &[("w", "x"), ("x", "y"), ("y", "z")],
            &[("w", "x"), ("x", "y")],
        );
        let alignment = Alignment::new(&networks, orders);
        let conserved = alignment.conserved_network(&SubgraphOptions::default());
        assert_eq!(conserved.edge_count(), 2);
        assert!(conserved.vertex_id("w,w").is_some());
        assert!(conserved.vertex_id("z,z").is_none());
    }

    #[test]
    fn exceptions_admit_partially_conserved_edges() {
        let (networks, orders) = fixture(
            &[("w", "x"), ("x", "y"), ("y", "z")],
            &[("w", "x"), ("x", "y")],
        );
        let alignment = Alignment::new(&networks, orders);
        let options = SubgraphOptions {
            max_exceptions: 1,
            ..SubgraphOptions::default()
        };
        let conserved = alignment.conserved_network(&options);
        assert_eq!(conserved.edge_count(), 3);
        assert!(conserved.vertex_id("z,z").is_some());
    }

    #[test]
    fn exception_leaves_are_pruned() {
        let (networks, orders) = fixture(
            &[("w", "x"), ("x", "y"), ("y", "z")],
            &[("w", "x"), ("x", "y")],
        );
        let alignment = Alignment::new(&networks, orders);
        let options = SubgraphOptions {
            max_exceptions: 1,
            prune_exception_leaves: true,
            ..SubgraphOptions::default()
        };
        let conserved = alignment.conserved_network(&options);
        // The y-z edge is an exception edge ending in the leaf z.
        assert_eq!(conserved.edge_count(), 2);
        assert!(conserved.vertex_id("z,z").is_none());
    }

    #[test]
    fn largest_component_filter_keeps_one_component() {
        // Two fully conserved components of equal size; the one holding
        // the smallest position wins.
        let (networks, orders) = fixture(
            &[("w", "x"), ("y", "z")],
            &[("w", "x"), ("y", "z")],
        );
        let alignment = Alignment::new(&networks, orders);
        let options = SubgraphOptions {
            largest_component_only: true,
            ..SubgraphOptions::default()
        };
        let conserved = alignment.conserved_network(&options);
        assert_eq!(conserved.edge_count(), 1);
        assert!(conserved.vertex_id("w,w").is_some());
        assert!(conserved.vertex_id("y,y").is_none());
    }

    #[test]
    fn table_omits_placeholder_entries() {
        let mut a = Network::new("a");
        let mut b = Network::new("b");
        for name in ["x", "y"] {
            a.add_vertex(name);
            b.add_vertex(name);
        }
        a.add_vertex("z");
        b.add_placeholder("$pad$0");
        a.add_edge_by_name("x", "y");
        b.add_edge_by_name("x", "y");

        let networks = vec![a, b];
        let alignment = Alignment::new(&networks, vec![vec![0, 1, 2], vec![0, 1, 2]]);

        let mut out = Vec::new();
        alignment.write_table(&mut out).expect("write table");
        let table = String::from_utf8(out).expect("utf8");
        assert_eq!(table, "x\tx\ny\ty\nz\n");
    }

    #[test]
    fn consensus_lists_supported_pairs_with_fractions() {
        let (networks, orders) = fixture(
            &[("w", "x"), ("x", "y")],
            &[("w", "x")],
        );
        let alignment = Alignment::new(&networks, orders);
        let mut out = Vec::new();
        alignment.write_consensus(&mut out).expect("write consensus");
        let consensus = String::from_utf8(out).expect("utf8");
        assert_eq!(consensus, "w,w\tx,x\t1.0000\nx,x\ty,y\t0.5000\n");
    }
}
