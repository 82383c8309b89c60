//! Reading and writing the semicolon separated streams.
use std::fmt::Display;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use tracing::debug;

use crate::aggregate::{EdgeStat, NodeStat};
use crate::codec::FormatError;
use crate::join::JoinedStat;

use super::error::{PipelineError, Result};

/// Parse every non blank line of `path`.
///
/// Unlike input records, a bad line in one of these files means the file is
/// not what it claims to be, so it fails the read.
fn read_rows<T>(path: &Path) -> Result<Vec<T>>
where
    T: FromStr<Err = FormatError>,
{
    let reader = BufReader::new(File::open(path)?);
    let mut rows = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let row = line.parse().map_err(|source| PipelineError::Format {
            path: path.display().to_string(),
            line: idx + 1,
            source,
        })?;
        rows.push(row);
    }
    debug!(path = %path.display(), rows = rows.len(), "Read stream");
    Ok(rows)
}

/// Write one row per line.
pub fn write_rows<T: Display>(path: &Path, rows: &[T]) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    for row in rows {
        writeln!(writer, "{row}")?;
    }
    writer.flush()?;
    Ok(())
}

/// Load a node stream, `archetype;count;wins` per line.
pub fn read_nodes(path: &Path) -> Result<Vec<NodeStat>> {
    read_rows(path)
}

/// Load an edge stream, `source;target;count;wins` per line.
pub fn read_edges(path: &Path) -> Result<Vec<EdgeStat>> {
    read_rows(path)
}

/// Load final statistics, seven fields per line.
pub fn read_joined(path: &Path) -> Result<Vec<JoinedStat>> {
    read_rows(path)
}
