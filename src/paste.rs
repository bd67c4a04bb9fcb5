//! Paste module - save the chatbot's CSV answer to a file
//!
//! Input is piped from the clipboard (`wl-paste`, `pbpaste`, `xclip -o`) or
//! read from a file.

use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::info;

use crate::db::Database;
use crate::import::{self, ImportOptions, ImportSummary};

/// Header plus this many data rows are shown in a preview
const PREVIEW_DATA_ROWS: usize = 15;

#[derive(Debug, Error)]
pub enum PasteError {
    #[error("clipboard is empty")]
    Empty,
    #[error("file {0} already exists (use --force to overwrite)")]
    Exists(PathBuf),
    #[error("failed to read input: {0}")]
    Read(#[source] io::Error),
    #[error("failed to write {0}: {1}")]
    Write(PathBuf, #[source] io::Error),
}

/// Read pasted text from a file, or stdin when no file is given
pub fn read_input(source: Option<&Path>) -> Result<String, PasteError> {
    let text = match source {
        Some(path) => fs::read_to_string(path).map_err(PasteError::Read)?,
        None => {
            let mut buf = String::new();
            io::stdin().read_to_string(&mut buf).map_err(PasteError::Read)?;
            buf
        }
    };
    if text.trim().is_empty() {
        return Err(PasteError::Empty);
    }
    Ok(text)
}

/// `workout_data_20250115_183000.csv`
pub fn default_output_name(now: NaiveDateTime) -> String {
    format!("workout_data_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Number of data rows, header excluded
pub fn data_row_count(text: &str) -> usize {
    text.trim().lines().count().saturating_sub(1)
}

/// Write trimmed text with one trailing newline. Returns the data row count.
pub fn save(text: &str, output: &Path, force: bool) -> Result<usize, PasteError> {
    if text.trim().is_empty() {
        return Err(PasteError::Empty);
    }
    if output.exists() && !force {
        return Err(PasteError::Exists(output.to_path_buf()));
    }
    let content = format!("{}\n", text.trim());
    fs::write(output, content).map_err(|e| PasteError::Write(output.to_path_buf(), e))?;
    Ok(data_row_count(text))
}

/// Save, then import the saved file with duplicates skipped
pub fn save_and_import(
    text: &str,
    output: &Path,
    force: bool,
    db: &Database,
) -> anyhow::Result<(usize, ImportSummary)> {
    let rows = save(text, output, force)?;
    info!("Importing {} into the database", output.display());
    let summary = import::import_csv_file(db, output, ImportOptions::default())?;
    Ok((rows, summary))
}

/// Column-aligned preview of the first rows
pub fn render_preview(text: &str) -> String {
    let lines: Vec<&str> = text.trim().lines().collect();
    let shown = lines.len().min(PREVIEW_DATA_ROWS + 1);
    let mut out = String::new();

    match aligned_rows(&lines[..shown].join("\n")) {
        Some(table) => out.push_str(&table),
        None => {
            for line in &lines[..shown] {
                out.push_str(line);
                out.push('\n');
            }
        }
    }

    if lines.len() > shown {
        out.push_str(&format!("\n... and {} more rows\n", lines.len() - shown));
    }
    out.push_str(&format!(
        "\nTotal rows: {} (excluding header)\n",
        lines.len().saturating_sub(1)
    ));
    out
}

fn aligned_rows(text: &str) -> Option<String> {
    let rows: Vec<Vec<String>> = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes())
        .records()
        .map(|r| r.map(|rec| rec.iter().map(str::to_string).collect()))
        .collect::<Result<_, _>>()
        .ok()?;
    let header = rows.first()?;

    let mut widths = vec![0usize; header.len()];
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    for (i, row) in rows.iter().enumerate() {
        let cells: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect();
        out.push_str(cells.join("  ").trim_end());
        out.push('\n');
        if i == 0 {
            let total = widths.iter().sum::<usize>() + 2 * widths.len().saturating_sub(1);
            out.push_str(&"-".repeat(total));
            out.push('\n');
        }
    }
    Some(out)
}
