use crate::error::{CompileError, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tabled::{settings::Style, Table, Tabled};
use tracing::warn;

pub fn csv_bytes<T: Serialize>(rows: &[T]) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.into_inner()
        .map_err(|e| CompileError::Io(e.into_error()))
}

pub fn json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    Ok(serde_json::to_vec_pretty(value)?)
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    std::fs::write(path, json_bytes(value)?)?;
    Ok(())
}

/// Write every file or none: on the first failure the files already
/// written by this call are removed again.
pub fn write_all(files: &[(PathBuf, Vec<u8>)]) -> Result<()> {
    for (idx, (path, bytes)) in files.iter().enumerate() {
        if let Err(e) = std::fs::write(path, bytes) {
            for (written, _) in &files[..idx] {
                if let Err(rm) = std::fs::remove_file(written) {
                    warn!(file = %written.display(), error = %rm, "could not remove partial output");
                }
            }
            return Err(e.into());
        }
    }
    Ok(())
}

pub fn render_table<T>(rows: &[T], max_rows: usize) -> Option<String>
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().take(max_rows).cloned().collect();
    if slice.is_empty() {
        return None;
    }
    Some(Table::new(slice).with(Style::markdown()).to_string())
}

pub fn preview_table<T>(title: &str, note: Option<&str>, rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    println!("{}", title);
    if let Some(n) = note {
        println!("({})", n);
    }
    println!();
    match render_table(rows, max_rows) {
        Some(table) => println!("{}\n", table),
        None => println!("(no rows)\n"),
    }
}
