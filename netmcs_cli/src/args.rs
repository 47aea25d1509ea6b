//! Command-line arguments for the aligner.

use std::path::PathBuf;

use clap::Parser;

use netmcs_align::{AlignConfig, SubgraphOptions};

/// netmcs - align multiple networks to a maximal conserved subgraph
#[derive(Parser, Debug)]
#[command(name = "netmcs")]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input networks as edge-list files; at least two are required
    #[arg(required = true, num_args = 2.., value_name = "NETWORK")]
    pub networks: Vec<PathBuf>,

    /// Stop after this many consecutive non-improving steps
    #[arg(short = 'i', long, default_value_t = 20)]
    pub max_nonimproving: usize,

    /// Hard cap on the total number of steps
    #[arg(long, default_value_t = usize::MAX)]
    pub max_steps: usize,

    /// Fraction of positions to scramble before each refinement phase
    #[arg(short = 'p', long, default_value_t = netmcs_align::config::DEFAULT_PERTURBATION)]
    pub perturbation: f32,

    /// Seed the random source for a reproducible run
    #[arg(long)]
    pub seed: Option<u64>,

    /// Write the alignment table to this file
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Write a JSON report (qualities plus aligned rows) to this file
    #[arg(long, value_name = "FILE")]
    pub json: Option<PathBuf>,

    /// Write the conserved subgraph to this file
    #[arg(short = 'n', long, value_name = "FILE")]
    pub network: Option<PathBuf>,

    /// Number of networks an edge may be missing from and still appear
    /// in the conserved subgraph
    #[arg(short = 'e', long, default_value_t = 0)]
    pub exceptions: usize,

    /// Only keep the largest connected component of the conserved subgraph
    #[arg(short = 'c', long, default_value_t = false)]
    pub connected: bool,

    /// Remove leaves connected by an exception edge from the conserved subgraph
    #[arg(long, default_value_t = false)]
    pub remove_exception_leaves: bool,

    /// Write the consensus support table to this file
    #[arg(long, value_name = "FILE")]
    pub consensus_matrix: Option<PathBuf>,
}

impl Args {
    /// Convert command-line arguments into the search configuration.
    pub fn to_config(&self) -> AlignConfig {
        AlignConfig {
            perturbation_amount: self.perturbation,
            seed: self.seed,
        }
    }

    /// Conserved-subgraph extraction options.
    pub fn subgraph_options(&self) -> SubgraphOptions {
        SubgraphOptions {
            max_exceptions: self.exceptions,
            largest_component_only: self.connected,
            prune_exception_leaves: self.remove_exception_leaves,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requires_two_networks() {
        assert!(Args::try_parse_from(["netmcs", "one.txt"]).is_err());
        let args = Args::try_parse_from(["netmcs", "one.txt", "two.txt"]).expect("parse");
        assert_eq!(args.networks.len(), 2);
        assert_eq!(args.max_nonimproving, 20);
        assert_eq!(args.exceptions, 0);
        assert!(!args.connected);
    }

    #[test]
    fn subgraph_flags_map_to_options() {
        let args = Args::try_parse_from([
            "netmcs",
            "one.txt",
            "two.txt",
            "-e",
            "2",
            "-c",
            "--remove-exception-leaves",
            "--seed",
            "9",
            "-p",
            "0.35",
        ])
        .expect("parse");

        let options = args.subgraph_options();
        assert_eq!(options.max_exceptions, 2);
        assert!(options.largest_component_only);
        assert!(options.prune_exception_leaves);

        let config = args.to_config();
        assert_eq!(config.seed, Some(9));
        assert!((config.perturbation_amount - 0.35).abs() < f32::EPSILON);
    }
}
