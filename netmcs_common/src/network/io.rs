//! Plain-text edge-list reading and writing.
//!
//! The input format is one edge per line, endpoints separated by
//! whitespace. Blank lines and lines starting with `#` are ignored.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use thiserror::Error;

use super::Network;

/// Errors raised while reading a network from disk.
#[derive(Debug, Error)]
pub enum ImportError {
    /// Underlying filesystem failure.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// A line that is neither a comment nor a two-endpoint edge.
    #[error("{path}:{line}: malformed edge line (expected `source target`)")]
    MalformedLine {
        /// File being read.
        path: String,
        /// 1-based line number.
        line: usize,
    },
    /// An edge from a vertex to itself.
    #[error("{path}:{line}: self-loop edges are not supported")]
    SelfLoop {
        /// File being read.
        path: String,
        /// 1-based line number.
        line: usize,
    },
}

/// Read an edge-list network from `path`.
///
/// The network is named after the file stem.
pub fn read_network(path: impl AsRef<Path>) -> Result<Network, ImportError> {
    let path = path.as_ref();
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned());
    let mut network = Network::new(name);

    let reader = BufReader::new(File::open(path)?);
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let mut fields = line.split_whitespace();
        let (Some(source), Some(target), None) = (fields.next(), fields.next(), fields.next())
        else {
            return Err(ImportError::MalformedLine {
                path: path.display().to_string(),
                line: idx + 1,
            });
        };
        if source == target {
            return Err(ImportError::SelfLoop {
                path: path.display().to_string(),
                line: idx + 1,
            });
        }
        network.add_edge_by_name(source, target);
    }

    Ok(network)
}

/// Write a network as a tab-separated edge list.
///
/// Placeholder vertices are omitted; they have no edges to write.
pub fn write_network<W: Write>(network: &Network, mut writer: W) -> io::Result<()> {
    for (u, v) in network.edges() {
        writeln!(
            writer,
            "{}\t{}",
            network.vertex(u).name(),
            network.vertex(v).name()
        )?;
    }
    Ok(())
}
