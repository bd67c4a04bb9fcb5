//! Sheet module - printable workout sheet with blank boxes for handwriting
//!
//! All layout numbers are PDF points (1/72 inch) measured from the bottom
//! left corner of an A4 page.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use printpdf::path::PaintMode;
use printpdf::{BuiltinFont, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Pt, Rect};
use thiserror::Error;
use tracing::info;

use crate::catalog::Laterality;
use crate::db::{DATE_FORMAT, ExerciseRecord};
use crate::sets::pair_summary;

pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
const TOP_MARGIN: f32 = 36.0;
const SIDE_MARGIN: f32 = 72.0;
const BOTTOM_MARGIN: f32 = 36.0;
const HEADER_GAP: f32 = 28.0;
const BOX_HEIGHT: f32 = 37.0;
const TEXT_TO_BOX_GAP: f32 = 8.0;
const BOX_TO_NEXT_GAP: f32 = 18.0;
const TITLE_FONT_SIZE: f32 = 18.0;
const TEXT_FONT_SIZE: f32 = 12.0;

pub const DEFAULT_WORKOUT_NAME: &str = "Workout";

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("invalid date format: {0}")]
    InvalidDate(String),
    #[error("no exercises to put on the sheet")]
    NoExercises,
    #[error("pdf error: {0}")]
    Pdf(String),
    #[error("failed to write {0}: {1}")]
    Io(PathBuf, #[source] std::io::Error),
}

/// One exercise line and the box under it
#[derive(Debug, Clone, PartialEq)]
pub struct Slot {
    pub text: String,
    pub baseline: f32,
    pub box_bottom: f32,
}

/// Parse `--date`, defaulting to `today`
pub fn sheet_date(arg: Option<&str>, today: NaiveDate) -> Result<NaiveDate, SheetError> {
    match arg {
        Some(s) => NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
            .map_err(|_| SheetError::InvalidDate(s.to_string())),
        None => Ok(today),
    }
}

/// `2025-01-15 - Push Day`
pub fn sheet_title(date: NaiveDate, name: Option<&str>) -> String {
    let name = name.map(str::trim).filter(|n| !n.is_empty()).unwrap_or(DEFAULT_WORKOUT_NAME);
    format!("{} - {}", date.format(DATE_FORMAT), name)
}

/// `2025-01-15 Workout.pdf`
pub fn output_filename(date: NaiveDate) -> String {
    format!("{} Workout.pdf", date.format(DATE_FORMAT))
}

/// Exercise lines from a text file, one per line, blanks dropped
pub fn load_exercise_lines(path: &Path) -> Result<Vec<String>, SheetError> {
    let text = fs::read_to_string(path).map_err(|e| SheetError::Io(path.to_path_buf(), e))?;
    Ok(text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect())
}

/// Sheet line for an exercise with its last result as a reminder
pub fn record_line(record: &ExerciseRecord) -> String {
    let left = pair_summary(record.weight_left.as_deref(), record.reps_left.as_deref());
    let last = match record.laterality {
        Laterality::Unilateral => left,
        Laterality::Bilateral => {
            let right = pair_summary(record.weight_right.as_deref(), record.reps_right.as_deref());
            if left.is_empty() && right.is_empty() {
                String::new()
            } else {
                format!("L {} / R {}", left, right)
            }
        }
    };

    if last.is_empty() {
        record.exercise_name.clone()
    } else {
        format!("{} (last {}: {})", record.exercise_name, record.date_string(), last)
    }
}

/// Split lines into pages of slots. Every page starts below the title.
pub fn layout(lines: &[String]) -> Vec<Vec<Slot>> {
    let first_baseline = PAGE_HEIGHT - TOP_MARGIN - HEADER_GAP;
    let mut pages = Vec::new();
    let mut page: Vec<Slot> = Vec::new();
    let mut y = first_baseline;

    for text in lines {
        let mut box_bottom = y - TEXT_TO_BOX_GAP - BOX_HEIGHT;
        if box_bottom < BOTTOM_MARGIN && !page.is_empty() {
            pages.push(std::mem::take(&mut page));
            y = first_baseline;
            box_bottom = y - TEXT_TO_BOX_GAP - BOX_HEIGHT;
        }
        page.push(Slot {
            text: text.clone(),
            baseline: y,
            box_bottom,
        });
        y = box_bottom - BOX_TO_NEXT_GAP;
    }

    if !page.is_empty() {
        pages.push(page);
    }
    pages
}

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

fn pdf_err(e: printpdf::Error) -> SheetError {
    SheetError::Pdf(format!("{:?}", e))
}

/// Render the sheet to PDF bytes
pub fn render(title: &str, lines: &[String]) -> Result<Vec<u8>, SheetError> {
    if lines.is_empty() {
        return Err(SheetError::NoExercises);
    }

    let (doc, first_page, first_layer) =
        PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold).map_err(pdf_err)?;
    let regular = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;

    for (i, slots) in layout(lines).iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page, layer) = doc.add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
            doc.get_page(page).get_layer(layer)
        };
        draw_page(&layer, title, slots, &bold, &regular);
    }

    doc.save_to_bytes().map_err(pdf_err)
}

fn draw_page(
    layer: &PdfLayerReference,
    title: &str,
    slots: &[Slot],
    bold: &IndirectFontRef,
    regular: &IndirectFontRef,
) {
    layer.use_text(title, TITLE_FONT_SIZE, mm(SIDE_MARGIN), mm(PAGE_HEIGHT - TOP_MARGIN), bold);

    for slot in slots {
        layer.use_text(slot.text.as_str(), TEXT_FONT_SIZE, mm(SIDE_MARGIN), mm(slot.baseline), regular);
        let rect = Rect::new(
            mm(SIDE_MARGIN),
            mm(slot.box_bottom),
            mm(PAGE_WIDTH - SIDE_MARGIN),
            mm(slot.box_bottom + BOX_HEIGHT),
        )
        .with_mode(PaintMode::Stroke);
        layer.add_rect(rect);
    }
}

/// Render and write `<date> Workout.pdf` into `dir`
pub fn write_sheet(dir: &Path, date: NaiveDate, name: Option<&str>, lines: &[String]) -> Result<PathBuf, SheetError> {
    let title = sheet_title(date, name);
    let bytes = render(&title, lines)?;

    fs::create_dir_all(dir).map_err(|e| SheetError::Io(dir.to_path_buf(), e))?;
    let path = dir.join(output_filename(date));
    fs::write(&path, bytes).map_err(|e| SheetError::Io(path.clone(), e))?;

    info!("Created {} ({} exercises)", path.display(), lines.len());
    Ok(path)
}
