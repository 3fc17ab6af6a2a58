use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use riasec_model::{OccupationRow, Table, OCCUPATION_COLUMNS};

/// Read the all-occupations file.
///
/// Lines that do not deserialize into an occupation row (a verbatim error
/// page appended by the bulk download, for instance) are logged and skipped.
pub fn read_occupations(path: &Path) -> Result<Vec<OccupationRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let headers = reader
        .headers()
        .with_context(|| format!("Failed to read header of {}", path.display()))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("Malformed CSV in {}", path.display()))?;
        if is_blank(&record) {
            continue;
        }
        match record.deserialize::<OccupationRow>(Some(&headers)) {
            Ok(row) => rows.push(row),
            Err(e) => {
                let line = record.position().map(|p| p.line()).unwrap_or_default();
                tracing::warn!(line, error = %e, "Skipping unreadable occupation row");
            }
        }
    }
    Ok(rows)
}

/// Overwrite `path` with the canonical header and `rows`.
pub fn write_occupations(path: &Path, rows: &[OccupationRow]) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = writer_builder()
        .has_headers(false)
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(OCCUPATION_COLUMNS)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

/// Read any headed CSV into a [`Table`]; short rows are padded with empty cells.
pub fn read_table(path: &Path) -> Result<Table> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.with_context(|| format!("Malformed CSV in {}", path.display()))?;
        if is_blank(&record) {
            continue;
        }
        let mut row: Vec<String> = record.iter().map(str::to_string).collect();
        if row.len() < headers.len() {
            row.resize(headers.len(), String::new());
        }
        rows.push(row);
    }

    Table::new(headers, rows).with_context(|| format!("Inconsistent table in {}", path.display()))
}

pub fn write_table(path: &Path, table: &Table) -> Result<()> {
    ensure_parent(path)?;
    let mut writer = writer_builder()
        .from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    writer.write_record(&table.headers)?;
    for row in &table.rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn is_blank(record: &csv::StringRecord) -> bool {
    record.iter().all(|f| f.trim().is_empty())
}

fn writer_builder() -> csv::WriterBuilder {
    let mut builder = csv::WriterBuilder::new();
    builder.terminator(csv::Terminator::Any(b'\n'));
    builder
}

fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}
