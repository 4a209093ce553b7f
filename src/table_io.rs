//! Table I/O - reads and writes tabular files as polars DataFrames
//!
//! The joiner core only sees in-memory frames; this module owns the file
//! boundary on both sides.

use crate::error::Result;
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Read a headered CSV file into a DataFrame.
pub fn read_table(path: impl AsRef<Path>) -> Result<DataFrame> {
    let df = LazyCsvReader::new(path.as_ref())
        .with_has_header(true)
        .finish()?
        .collect()?;

    Ok(df)
}

/// Write a DataFrame to a headered CSV file.
pub fn write_table(df: &mut DataFrame, path: impl AsRef<Path>) -> Result<()> {
    let mut file = File::create(path.as_ref())?;
    CsvWriter::new(&mut file).include_header(true).finish(df)?;

    Ok(())
}

/// Unique output location for one join request under the system temp dir.
///
/// Each request gets its own directory so concurrent requests never write
/// over each other's output.
pub fn temp_output_path(file_name: &str) -> Result<PathBuf> {
    let dir = std::env::temp_dir().join(format!("excel-joiner-{}", Uuid::new_v4()));
    std::fs::create_dir_all(&dir)?;

    Ok(dir.join(file_name))
}
