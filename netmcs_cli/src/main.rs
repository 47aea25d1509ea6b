//! netmcs command-line front end.
//!
//! Reads two or more edge-list networks, runs the iterated local
//! search, and writes whichever outputs were requested: the alignment
//! table, a JSON report, the conserved subgraph, and the consensus
//! support table.

#[global_allocator]
/// Global allocator using jemalloc for better performance in parallel workloads.
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

mod args;

use std::error::Error;
use std::fs::File;
use std::path::Path;

use clap::Parser;
use serde::Serialize;
use tracing::info;

use netmcs_align::{Alignment, IteratedLocalSearch};
use netmcs_common::{read_network, write_network};

use args::Args;

/// Machine-readable summary of a finished run.
#[derive(Serialize)]
struct AlignmentReport {
    networks: Vec<String>,
    best_conserved_edges: usize,
    current_conserved_edges: usize,
    rows: Vec<Vec<Option<String>>>,
}

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = Args::parse();

    let mut networks = Vec::with_capacity(args.networks.len());
    for path in &args.networks {
        networks.push(read_network(path)?);
    }
    let names: Vec<String> = networks.iter().map(|n| n.name().to_string()).collect();

    let mut aligner = IteratedLocalSearch::new(networks, args.to_config())?;
    aligner.run(args.max_nonimproving, args.max_steps);

    let best_quality = aligner.best_quality();
    let current_quality = aligner.current_quality();
    info!(best = best_quality, "alignment finished");

    let alignment = aligner.alignment();

    if let Some(path) = &args.output {
        write_alignment_table(&alignment, path)?;
    }

    if let Some(path) = &args.json {
        let report = AlignmentReport {
            networks: names,
            best_conserved_edges: best_quality,
            current_conserved_edges: current_quality,
            rows: alignment
                .rows()
                .map(|row| row.into_iter().map(|c| c.map(str::to_string)).collect())
                .collect(),
        };
        serde_json::to_writer_pretty(File::create(path)?, &report)?;
    }

    if let Some(path) = &args.network {
        let conserved = alignment.conserved_network(&args.subgraph_options());
        info!(
            vertices = conserved.vertex_count(),
            edges = conserved.edge_count(),
            "conserved subgraph extracted"
        );
        write_network(&conserved, File::create(path)?)?;
    }

    if let Some(path) = &args.consensus_matrix {
        alignment.write_consensus(File::create(path)?)?;
    }

    Ok(())
}

/// Write the alignment as a tab-separated table, placeholder entries
/// omitted.
fn write_alignment_table(alignment: &Alignment<'_>, path: &Path) -> Result<(), Box<dyn Error>> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(b'\t')
        .flexible(true)
        .from_path(path)?;
    for row in alignment.rows() {
        let record: Vec<&str> = row.into_iter().flatten().collect();
        if record.is_empty() {
            continue;
        }
        writer.write_record(record)?;
    }
    writer.flush()?;
    Ok(())
}
