//! Fill in a `body_part` column from exercise history
//!
//! The new column lands right after `date_completed`.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use super::{UNKNOWN_BODY_PART, read_csv_text};

#[derive(Debug, Default, PartialEq, Eq)]
pub struct AnnotateReport {
    pub processed: usize,
    pub found: usize,
    pub unknown_exercises: BTreeSet<String>,
}

impl AnnotateReport {
    pub fn unknown(&self) -> usize {
        self.processed - self.found
    }
}

/// `<stem>_with_body_part.<ext>` next to the input
pub fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("workout");
    let name = match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{}_with_body_part.{}", stem, ext),
        None => format!("{}_with_body_part", stem),
    };
    input.with_file_name(name)
}

pub fn annotate_file(input: &Path, output: &Path, lookup: &HashMap<String, String>) -> Result<AnnotateReport> {
    let text = read_csv_text(input)?;
    let mut writer = csv::Writer::from_path(output)
        .with_context(|| format!("failed to create {}", output.display()))?;
    let report = annotate(&text, &mut writer, lookup)?;
    writer.flush()?;
    Ok(report)
}

pub fn annotate<W: std::io::Write>(
    text: &str,
    writer: &mut csv::Writer<W>,
    lookup: &HashMap<String, String>,
) -> Result<AnnotateReport> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let header = records.next().context("CSV is empty")??;
    let position = |name: &str| {
        header
            .iter()
            .position(|h| h.trim() == name)
            .with_context(|| format!("required column not found in CSV: {}", name))
    };
    let date_idx = position("date_completed")?;
    let name_idx = position("exercise_name")?;

    let mut new_header: Vec<&str> = header.iter().collect();
    new_header.insert(date_idx + 1, "body_part");
    writer.write_record(&new_header)?;

    let mut report = AnnotateReport::default();
    for record in records {
        let record = record?;
        let Some(name) = record.get(name_idx) else {
            debug!("skipping short row: {:?}", record);
            continue;
        };

        let body_part = match lookup.get(name) {
            Some(part) => {
                report.found += 1;
                part.as_str()
            }
            None => {
                report.unknown_exercises.insert(name.to_string());
                UNKNOWN_BODY_PART
            }
        };

        let mut row: Vec<&str> = record.iter().collect();
        let at = (date_idx + 1).min(row.len());
        row.insert(at, body_part);
        writer.write_record(&row)?;
        report.processed += 1;
    }

    Ok(report)
}
