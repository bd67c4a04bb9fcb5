//! Database module - SQLite storage for completed exercises

mod record;

pub use record::{DATE_FORMAT, ExerciseRecord, NewExercise, ValidationError};

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Result, bail};
use chrono::NaiveDate;
use rusqlite::{Connection, Row, params, types::Type};
use tracing::warn;

use crate::catalog::Laterality;

const SELECT_COLUMNS: &str = "id, date_completed, body_part, exercise_name, laterality, sets, \
     weight_left, weight_right, reps_left, reps_right";

/// Database wrapper
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open or create database
    pub fn open(path: &str) -> Result<Self> {
        let conn = Connection::open(path)?;
        let db = Self { conn };
        db.init_schema()?;
        Ok(db)
    }

    /// Open a database that must already exist
    pub fn open_existing(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            bail!("database file {} not found; run 'liftsheet init' to create it", path);
        }
        Self::open(path)
    }

    pub fn open_in_memory() -> Result<Self> {
        let db = Self { conn: Connection::open_in_memory()? };
        db.init_schema()?;
        Ok(db)
    }

    /// Initialize database schema
    fn init_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS exercises (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                date_completed TEXT NOT NULL,
                body_part TEXT NOT NULL,
                exercise_name TEXT NOT NULL,
                laterality TEXT NOT NULL,
                sets INTEGER NOT NULL,
                weight_left TEXT,
                weight_right TEXT,
                reps_left TEXT,
                reps_right TEXT
            )",
            [],
        )?;
        Ok(())
    }

    /// Run `f` inside one transaction; rolled back if it fails
    pub fn in_transaction<T>(&self, f: impl FnOnce(&Self) -> Result<T>) -> Result<T> {
        let tx = self.conn.unchecked_transaction()?;
        let out = f(self)?;
        tx.commit()?;
        Ok(out)
    }

    /// Validate a manual entry and store it
    pub fn add_exercise(
        &self,
        entry: NewExercise,
        date: NaiveDate,
        laterality: Laterality,
    ) -> Result<i64> {
        let record = entry.validate(date, laterality)?;
        self.insert_record(&record)
    }

    /// Insert a record as-is
    pub fn insert_record(&self, record: &ExerciseRecord) -> Result<i64> {
        self.conn.execute(
            "INSERT INTO exercises (
                date_completed, body_part, exercise_name, laterality, sets,
                weight_left, weight_right, reps_left, reps_right
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
            params![
                record.date_string(),
                record.body_part,
                record.exercise_name,
                record.laterality.as_str(),
                record.sets,
                record.weight_left,
                record.weight_right,
                record.reps_left,
                record.reps_right,
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Same date, name, weights and reps already stored. NULLs match NULLs.
    pub fn is_duplicate(&self, record: &ExerciseRecord) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM exercises
             WHERE date_completed = ?1 AND exercise_name = ?2
               AND weight_left IS ?3 AND weight_right IS ?4
               AND reps_left IS ?5 AND reps_right IS ?6",
            params![
                record.date_string(),
                record.exercise_name,
                record.weight_left,
                record.weight_right,
                record.reps_left,
                record.reps_right,
            ],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// All records, oldest first
    pub fn list_exercises(&self) -> Result<Vec<ExerciseRecord>> {
        self.query_records(&format!(
            "SELECT {} FROM exercises ORDER BY date_completed, id",
            SELECT_COLUMNS
        ))
    }

    /// Latest record of every exercise name, ordered by body part then name
    pub fn most_recent_by_name(&self) -> Result<Vec<ExerciseRecord>> {
        self.query_records(&format!(
            "SELECT {} FROM exercises e
             WHERE e.id = (
                 SELECT e2.id FROM exercises e2
                 WHERE e2.exercise_name = e.exercise_name
                 ORDER BY e2.date_completed DESC, e2.id DESC
                 LIMIT 1
             )
             ORDER BY e.body_part, e.exercise_name",
            SELECT_COLUMNS
        ))
    }

    /// Exercise name -> body part of its first recorded occurrence
    pub fn body_part_lookup(&self) -> Result<HashMap<String, String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT exercise_name, body_part FROM exercises ORDER BY id")?;
        let mut lookup = HashMap::new();
        let rows = stmt.query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?;
        for row in rows {
            let (name, body_part) = row?;
            lookup.entry(name).or_insert(body_part);
        }
        Ok(lookup)
    }

    /// Records for the given ids, in the requested order. Unknown ids are skipped.
    pub fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<ExerciseRecord>> {
        let sql = format!("SELECT {} FROM exercises WHERE id = ?1", SELECT_COLUMNS);
        let mut stmt = self.conn.prepare(&sql)?;
        let mut records = Vec::with_capacity(ids.len());
        for id in ids {
            let mut rows = stmt.query_map([id], record_from_row)?;
            if let Some(record) = rows.next().map(readable).transpose()?.flatten() {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn query_records(&self, sql: &str) -> Result<Vec<ExerciseRecord>> {
        let mut stmt = self.conn.prepare(sql)?;
        let mut records = Vec::new();
        for row in stmt.query_map([], record_from_row)? {
            if let Some(record) = readable(row)? {
                records.push(record);
            }
        }
        Ok(records)
    }
}

/// Rows with a malformed date or laterality are skipped with a warning
fn readable(row: rusqlite::Result<ExerciseRecord>) -> rusqlite::Result<Option<ExerciseRecord>> {
    match row {
        Ok(record) => Ok(Some(record)),
        Err(rusqlite::Error::FromSqlConversionFailure(column, _, e)) => {
            warn!("skipping unreadable exercise row (column {}): {}", column, e);
            Ok(None)
        }
        Err(e) => Err(e),
    }
}

fn record_from_row(row: &Row<'_>) -> rusqlite::Result<ExerciseRecord> {
    let date_str: String = row.get(1)?;
    let date_completed = NaiveDate::parse_from_str(&date_str, DATE_FORMAT)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e)))?;
    let laterality_str: String = row.get(4)?;
    let laterality = laterality_str
        .parse::<Laterality>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, Type::Text, e.into()))?;

    Ok(ExerciseRecord {
        id: Some(row.get(0)?),
        date_completed,
        body_part: row.get(2)?,
        exercise_name: row.get(3)?,
        laterality,
        sets: row.get(5)?,
        weight_left: row.get(6)?,
        weight_right: row.get(7)?,
        reps_left: row.get(8)?,
        reps_right: row.get(9)?,
    })
}
