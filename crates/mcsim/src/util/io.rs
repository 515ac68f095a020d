//! I/O utility functions

use std::fs;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Write content to a file atomically using write-then-rename pattern.
///
/// The content is first written to a sibling temporary file, then renamed
/// over the target path.
pub fn atomic_write(path: &Path, content: &[u8]) -> io::Result<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content)?;
    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Write one value per line, for external histogram tools
pub fn write_values(path: &Path, values: &[f64]) -> io::Result<()> {
    let mut buf = BufWriter::new(Vec::with_capacity(values.len() * 20));
    for value in values {
        writeln!(buf, "{value}")?;
    }
    let bytes = buf.into_inner().map_err(io::IntoInnerError::into_error)?;
    atomic_write(path, &bytes)
}
