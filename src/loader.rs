use crate::error::Result;
use crate::types::SourceDocument;
use csv::ReaderBuilder;
use std::fs::{self, File};
use std::io::{BufRead, BufReader, Read};
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub files_found: usize,
    pub documents_without_table: usize,
}

/// Load every recommendation file in `dir` with the given extension.
///
/// Files are read in name order so repeated runs see the same sequence.
pub fn load_documents(
    dir: &Path,
    extension: &str,
    delimiter: u8,
) -> Result<(Vec<SourceDocument>, LoadReport)> {
    let mut paths: Vec<_> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .filter(|p| {
            p.extension()
                .and_then(|e| e.to_str())
                .is_some_and(|e| e.eq_ignore_ascii_case(extension))
        })
        .collect();
    paths.sort();

    let mut docs = Vec::with_capacity(paths.len());
    for path in &paths {
        let source_id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let doc = read_document(&source_id, File::open(path)?, delimiter)?;
        debug!(source = %source_id, rows = doc.table.as_ref().map_or(0, |t| t.len()), "loaded document");
        docs.push(doc);
    }

    let documents_without_table = docs.iter().filter(|d| d.table.is_none()).count();
    let report = LoadReport {
        files_found: docs.len(),
        documents_without_table,
    };
    Ok((docs, report))
}

/// Read one document: the first non-blank line is the title, every later
/// record with at least two fields is a (label, value) row.
pub fn read_document<R: Read>(source_id: &str, input: R, delimiter: u8) -> Result<SourceDocument> {
    let mut reader = BufReader::new(input);
    let mut title = String::new();
    let mut line = String::new();
    while reader.read_line(&mut line)? > 0 {
        let trimmed = line.trim().trim_start_matches('\u{feff}');
        if !trimmed.is_empty() {
            title = trimmed.to_string();
            break;
        }
        line.clear();
    }

    let mut rdr = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(reader);
    let mut rows: Vec<(String, String)> = Vec::new();
    for result in rdr.records() {
        let record = result?;
        if let (Some(label), Some(value)) = (record.get(0), record.get(1)) {
            rows.push((label.trim().to_string(), value.trim().to_string()));
        }
    }

    Ok(SourceDocument {
        source_id: source_id.to_string(),
        title,
        table: if rows.is_empty() { None } else { Some(rows) },
    })
}
