//! CSV importer - loads chatbot transcriptions into the exercise log
//!
//! Expected header:
//! `date_completed,[body_part,]exercise_name,laterality,sets,weight_left,weight_right,reps_left,reps_right`
//!
//! Cells holding several sets use `;` between values. Rows may be shorter or
//! longer than the header: missing trailing cells read as empty, extra cells
//! are ignored.

pub mod annotate;

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result, anyhow, bail};
use chrono::NaiveDate;
use csv::StringRecord;
use tracing::{error, info, warn};

use crate::catalog::{BodyPart, Laterality};
use crate::db::{Database, ExerciseRecord};
use crate::sets::{SetValues, normalize_cell};

/// Body part stored when neither the CSV nor the history knows it
pub const UNKNOWN_BODY_PART: &str = "Unknown";

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%m/%d/%Y", "%d/%m/%Y", "%Y/%m/%d"];

#[derive(Debug, Clone, Copy, Default)]
pub struct ImportOptions {
    pub allow_duplicates: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub imported: usize,
    pub skipped: usize,
    pub errors: usize,
}

impl ImportSummary {
    /// Fails when any row was rejected, so the CLI exits non-zero
    pub fn check(&self) -> Result<()> {
        if self.errors > 0 {
            bail!("{} rows had errors, check the log above", self.errors);
        }
        Ok(())
    }
}

/// Header positions. Required columns are resolved up front.
struct Columns {
    date_completed: usize,
    body_part: Option<usize>,
    exercise_name: usize,
    laterality: usize,
    sets: usize,
    weight_left: Option<usize>,
    weight_right: Option<usize>,
    reps_left: Option<usize>,
    reps_right: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &StringRecord) -> Result<Self> {
        let find = |name: &str| headers.iter().position(|h| h == name);
        let require = |name: &str| find(name).with_context(|| format!("CSV has no {} column", name));
        Ok(Self {
            date_completed: require("date_completed")?,
            body_part: find("body_part"),
            exercise_name: require("exercise_name")?,
            laterality: require("laterality")?,
            sets: require("sets")?,
            weight_left: find("weight_left"),
            weight_right: find("weight_right"),
            reps_left: find("reps_left"),
            reps_right: find("reps_right"),
        })
    }
}

fn cell(record: &StringRecord, idx: Option<usize>) -> &str {
    idx.and_then(|i| record.get(i)).unwrap_or_default()
}

/// Normalize a date to YYYY-MM-DD, trying several common layouts
pub fn parse_date(text: &str) -> Result<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .ok_or_else(|| anyhow!("unable to parse date: {}", text))
}

/// Read CSV text, dropping a leading byte order mark
pub fn read_csv_text(path: &Path) -> Result<String> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    Ok(text.trim_start_matches('\u{feff}').to_string())
}

fn csv_reader(text: &str) -> csv::Reader<&[u8]> {
    csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes())
}

/// Import a CSV file in a single transaction
pub fn import_csv_file(db: &Database, path: &Path, options: ImportOptions) -> Result<ImportSummary> {
    let text = read_csv_text(path)?;
    import_csv(db, &text, options)
}

pub fn import_csv(db: &Database, text: &str, options: ImportOptions) -> Result<ImportSummary> {
    let history = db.body_part_lookup()?;
    let mut reader = csv_reader(text);
    let columns = Columns::from_headers(reader.headers()?)?;

    db.in_transaction(|db| {
        let mut summary = ImportSummary::default();

        // header is row 1
        for (idx, result) in reader.records().enumerate() {
            let row_num = idx + 2;
            let record = match result
                .map_err(anyhow::Error::from)
                .and_then(|row| to_record(&row, &columns, &history, row_num))
            {
                Ok(record) => record,
                Err(e) => {
                    error!("row {}: {:#}, skipping", row_num, e);
                    summary.errors += 1;
                    continue;
                }
            };

            if !options.allow_duplicates && db.is_duplicate(&record)? {
                info!(
                    "row {}: duplicate entry for {} on {}, skipping",
                    row_num,
                    record.exercise_name,
                    record.date_string()
                );
                summary.skipped += 1;
                continue;
            }

            db.insert_record(&record)?;
            summary.imported += 1;
        }

        Ok(summary)
    })
}

fn to_record(
    row: &StringRecord,
    columns: &Columns,
    history: &HashMap<String, String>,
    row_num: usize,
) -> Result<ExerciseRecord> {
    let date_completed = parse_date(cell(row, Some(columns.date_completed)))?;
    let exercise_name = cell(row, Some(columns.exercise_name)).to_string();
    if exercise_name.is_empty() {
        bail!("missing exercise name");
    }

    let laterality_cell = cell(row, Some(columns.laterality));
    let laterality: Laterality = laterality_cell
        .parse()
        .map_err(|_| anyhow!("invalid laterality '{}'", laterality_cell))?;

    let sets_cell = cell(row, Some(columns.sets));
    let sets: i64 = sets_cell
        .parse()
        .map_err(|_| anyhow!("invalid sets value '{}'", sets_cell))?;
    if sets <= 0 {
        bail!("invalid sets value '{}'", sets);
    }

    let body_part = resolve_body_part(cell(row, columns.body_part), &exercise_name, history, row_num);

    let set_cell = |column: &str, idx: Option<usize>| {
        let text = cell(row, idx);
        if let Some(problem) = set_cell_problem(text, sets) {
            warn!("row {}: {} {}, stored as written", row_num, column, problem);
        }
        normalize_cell(text)
    };

    let weight_left = set_cell("weight_left", columns.weight_left);
    let reps_left = set_cell("reps_left", columns.reps_left);
    let (weight_right, reps_right) = match laterality {
        Laterality::Unilateral => (None, None),
        Laterality::Bilateral => (
            set_cell("weight_right", columns.weight_right),
            set_cell("reps_right", columns.reps_right),
        ),
    };

    Ok(ExerciseRecord {
        id: None,
        date_completed,
        body_part,
        exercise_name,
        laterality,
        sets,
        weight_left,
        weight_right,
        reps_left,
        reps_right,
    })
}

/// Why a weight/rep cell looks off, if it does. Empty cells are fine.
pub fn set_cell_problem(text: &str, sets: i64) -> Option<String> {
    if text.trim().is_empty() {
        return None;
    }
    match SetValues::parse(text) {
        Err(e) => Some(e),
        Ok(values) if values.values().len() as i64 != sets => Some(format!(
            "has {} values for {} sets",
            values.values().len(),
            sets
        )),
        Ok(_) => None,
    }
}

fn resolve_body_part(
    given: &str,
    exercise_name: &str,
    history: &HashMap<String, String>,
    row_num: usize,
) -> String {
    if !given.is_empty() {
        if BodyPart::from_label(given).is_none() {
            warn!("row {}: unknown body part '{}', proceeding anyway", row_num, given);
        }
        return given.to_string();
    }
    match history.get(exercise_name) {
        Some(part) => part.clone(),
        None => {
            warn!("row {}: no body part on record for '{}'", row_num, exercise_name);
            UNKNOWN_BODY_PART.to_string()
        }
    }
}

/// What a dry run would import: `(row number, date cell, exercise name)`
pub fn preview_rows(text: &str) -> Result<Vec<(usize, String, String)>> {
    let mut reader = csv_reader(text);
    let headers = reader.headers()?.clone();
    let date_idx = headers.iter().position(|h| h == "date_completed");
    let name_idx = headers
        .iter()
        .position(|h| h == "exercise_name")
        .context("CSV has no exercise_name column")?;

    let mut rows = Vec::new();
    for (idx, record) in reader.records().enumerate() {
        let record = record?;
        let date = date_idx.and_then(|i| record.get(i)).unwrap_or_default();
        let name = record.get(name_idx).unwrap_or_default();
        rows.push((idx + 1, date.to_string(), name.to_string()));
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::tests::record;

    const HEADER: &str =
        "date_completed,body_part,exercise_name,laterality,sets,weight_left,weight_right,reps_left,reps_right\n";

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
        assert_eq!(parse_date("2025-01-15").unwrap(), expected);
        assert_eq!(parse_date("01/15/2025").unwrap(), expected);
        assert_eq!(parse_date("15/01/2025").unwrap(), expected);
        assert_eq!(parse_date("2025/01/15").unwrap(), expected);
        assert!(parse_date("Jan 15").is_err());
    }

    #[test]
    fn test_import_basic_rows() {
        let db = Database::open_in_memory().unwrap();
        let csv = format!(
            "{}2025-01-15,Chest,Bench Press,unilateral,3,135;135;145,,10;8;6,\n\
             2025-01-15,Biceps,Curl,Bilateral,2,25;25,25;30,10;9,10;7\n",
            HEADER
        );
        let summary = import_csv(&db, &csv, ImportOptions::default()).unwrap();
        assert_eq!(summary, ImportSummary { imported: 2, skipped: 0, errors: 0 });

        let all = db.list_exercises().unwrap();
        assert_eq!(all[0].weight_left.as_deref(), Some("135,135,145"));
        assert_eq!(all[0].weight_right, None);
        assert_eq!(all[1].laterality, Laterality::Bilateral);
        assert_eq!(all[1].reps_right.as_deref(), Some("10,7"));
    }

    #[test]
    fn test_unilateral_drops_right_side() {
        let db = Database::open_in_memory().unwrap();
        let csv = format!("{}2025-01-15,Calves,Calf Raise,unilateral,1,50,60,12,11\n", HEADER);
        import_csv(&db, &csv, ImportOptions::default()).unwrap();
        let all = db.list_exercises().unwrap();
        assert_eq!(all[0].weight_right, None);
        assert_eq!(all[0].reps_right, None);
    }

    #[test]
    fn test_bad_rows_are_counted_not_fatal() {
        let db = Database::open_in_memory().unwrap();
        let csv = format!(
            "{}2025-01-15,Chest,Fly,sideways,1,20,,10,\n\
             2025-01-15,Chest,Fly,unilateral,0,20,,10,\n\
             someday,Chest,Fly,unilateral,1,20,,10,\n\
             2025-01-15,Chest,Fly,unilateral,1,20,,10,\n",
            HEADER
        );
        let summary = import_csv(&db, &csv, ImportOptions::default()).unwrap();
        assert_eq!(summary, ImportSummary { imported: 1, skipped: 0, errors: 3 });
    }

    #[test]
    fn test_rows_shorter_or_longer_than_header() {
        let db = Database::open_in_memory().unwrap();
        let csv = format!(
            "{}2025-01-15,Chest,Bench Press,unilateral,2,135;135,,10;8\n\
             2025-01-15,Quads,Squat,unilateral,1,185,,5,,note\n\
             2025-01-15,Biceps,Curl,bilateral,1,25,25,10\n",
            HEADER
        );
        let summary = import_csv(&db, &csv, ImportOptions::default()).unwrap();
        assert_eq!(summary, ImportSummary { imported: 3, skipped: 0, errors: 0 });

        let all = db.list_exercises().unwrap();
        assert_eq!(all[0].reps_left.as_deref(), Some("10,8"));
        assert_eq!(all[1].weight_left.as_deref(), Some("185"));
        assert_eq!(all[2].reps_left.as_deref(), Some("10"));
        assert_eq!(all[2].reps_right, None);
    }

    #[test]
    fn test_missing_required_column() {
        let db = Database::open_in_memory().unwrap();
        let err = import_csv(&db, "date_completed,exercise_name,sets\n2025-01-15,Dip,1\n", ImportOptions::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "CSV has no laterality column");
    }

    #[test]
    fn test_set_cell_problem() {
        assert_eq!(set_cell_problem("", 3), None);
        assert_eq!(set_cell_problem("135;135;145", 3), None);
        assert_eq!(set_cell_problem("135;135", 3).as_deref(), Some("has 2 values for 3 sets"));
        assert_eq!(set_cell_problem("135;heavy", 2).as_deref(), Some("not a number: 'heavy'"));
    }

    #[test]
    fn test_summary_check() {
        assert!(ImportSummary { imported: 3, skipped: 1, errors: 0 }.check().is_ok());
        let err = ImportSummary { imported: 3, skipped: 0, errors: 2 }.check().unwrap_err();
        assert!(err.to_string().starts_with("2 rows had errors"));
    }

    #[test]
    fn test_duplicates_skipped_unless_allowed() {
        let db = Database::open_in_memory().unwrap();
        let csv = format!("{}2025-01-15,Chest,Bench Press,unilateral,1,135,,10,\n", HEADER);

        import_csv(&db, &csv, ImportOptions::default()).unwrap();
        let again = import_csv(&db, &csv, ImportOptions::default()).unwrap();
        assert_eq!(again, ImportSummary { imported: 0, skipped: 1, errors: 0 });

        let forced = import_csv(&db, &csv, ImportOptions { allow_duplicates: true }).unwrap();
        assert_eq!(forced.imported, 1);
        assert_eq!(db.list_exercises().unwrap().len(), 2);
    }

    #[test]
    fn test_body_part_from_history_when_column_missing() {
        let db = Database::open_in_memory().unwrap();
        db.insert_record(&record("2025-01-01", "Face Pull", "Rotator Cuff", "30", "15")).unwrap();

        let csv = "date_completed,exercise_name,laterality,sets,weight_left,weight_right,reps_left,reps_right\n\
                   01/20/2025,Face Pull,unilateral,1,35,,15,\n\
                   01/20/2025,Nordic Curl,unilateral,1,0,,5,\n";
        let summary = import_csv(&db, csv, ImportOptions::default()).unwrap();
        assert_eq!(summary.imported, 2);

        let all = db.list_exercises().unwrap();
        assert_eq!(all[1].body_part, "Rotator Cuff");
        assert_eq!(all[1].date_string(), "2025-01-20");
        assert_eq!(all[2].body_part, UNKNOWN_BODY_PART);
    }

    #[test]
    fn test_unknown_body_part_label_is_kept() {
        let db = Database::open_in_memory().unwrap();
        let csv = format!("{}2025-01-15,Elbow,Wrist Roll,unilateral,1,5,,20,\n", HEADER);
        let summary = import_csv(&db, &csv, ImportOptions::default()).unwrap();
        assert_eq!(summary.imported, 1);
        assert_eq!(db.list_exercises().unwrap()[0].body_part, "Elbow");
    }

    #[test]
    fn test_import_file_with_bom() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("workout.csv");
        let csv = format!("\u{feff}{}2025-01-15,Chest,Bench Press,unilateral,1,135,,10,\n", HEADER);
        fs::write(&path, csv).unwrap();

        let db = Database::open_in_memory().unwrap();
        let summary = import_csv_file(&db, &path, ImportOptions::default()).unwrap();
        assert_eq!(summary.imported, 1);
    }

    #[test]
    fn test_preview_rows() {
        let csv = format!(
            "{}2025-01-15,Chest,Bench Press,unilateral,1,135,,10,\n2025-01-15,Quads,Squat,unilateral,1,185,,5,\n",
            HEADER
        );
        let rows = preview_rows(&csv).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1], (2, "2025-01-15".to_string(), "Squat".to_string()));
    }
}
