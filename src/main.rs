//! liftsheet - Personal workout sheets and exercise log

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use liftsheet::catalog::Laterality;
use liftsheet::db::{Database, NewExercise};
use liftsheet::import::{self, ImportOptions, ImportSummary, annotate};
use liftsheet::paste;
use liftsheet::sheet;
use liftsheet::web::{self, AppState};

const DB_PATH: &str = "exercise_log.db";
const DEFAULT_EXERCISES_FILE: &str = "default_exercises.txt";

#[derive(Parser)]
#[command(name = "liftsheet")]
#[command(author, version, about = "Workout sheets and exercise log")]
struct Cli {
    /// SQLite database path
    #[arg(long, global = true, env = "LIFTSHEET_DB", default_value = DB_PATH)]
    database: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Add an exercise entry by hand
    Add {
        /// Date completed (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,

        /// Body part, e.g. "Upper Back"
        #[arg(long)]
        body_part: String,

        /// Exercise name
        #[arg(long)]
        name: String,

        /// unilateral or bilateral
        #[arg(long)]
        laterality: Laterality,

        #[arg(long)]
        sets: i64,

        /// Weights per set (unilateral)
        #[arg(long, num_args = 1..)]
        weight: Option<Vec<i64>>,

        /// Reps per set (unilateral)
        #[arg(long, num_args = 1..)]
        reps: Option<Vec<i64>>,

        #[arg(long, num_args = 1..)]
        weight_left: Option<Vec<i64>>,

        #[arg(long, num_args = 1..)]
        weight_right: Option<Vec<i64>>,

        #[arg(long, num_args = 1..)]
        reps_left: Option<Vec<i64>>,

        #[arg(long, num_args = 1..)]
        reps_right: Option<Vec<i64>>,
    },

    /// List all exercises
    List,

    /// Import a chatbot CSV into the database
    Import {
        csv_file: PathBuf,

        /// Import rows even if an identical entry exists
        #[arg(long)]
        allow_duplicates: bool,

        /// Show what would be imported without importing
        #[arg(long)]
        dry_run: bool,
    },

    /// Add a body_part column to a CSV from exercise history
    Annotate {
        input_csv: PathBuf,

        /// Output path (default: <input>_with_body_part.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Save pasted CSV (stdin or --input) to a file
    Paste {
        /// Read from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Output CSV file (default: workout_data_<timestamp>.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Show a preview before saving
        #[arg(short, long)]
        preview: bool,

        /// Overwrite an existing output file
        #[arg(long)]
        force: bool,

        /// Import the saved CSV into the database
        #[arg(long)]
        import_to_db: bool,
    },

    /// Generate a PDF workout sheet
    Sheet {
        /// Sheet date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Workout name for the title
        #[arg(short, long)]
        name: Option<String>,

        /// Exercise list, one per line
        #[arg(short, long, default_value = DEFAULT_EXERCISES_FILE)]
        exercises: PathBuf,

        /// Database ids to use instead of the exercise list
        ids: Vec<i64>,

        /// Directory for the PDF
        #[arg(short, long, env = "LIFTSHEET_SHEET_DIR", default_value = ".")]
        output_dir: PathBuf,
    },

    /// Start the exercise selection web form
    Serve {
        #[arg(long, env = "LIFTSHEET_HOST", default_value = "127.0.0.1")]
        host: String,

        #[arg(long, env = "LIFTSHEET_PORT", default_value = "5000")]
        port: u16,

        /// Directory for generated sheets
        #[arg(long, env = "LIFTSHEET_SHEET_DIR", default_value = ".")]
        sheet_dir: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_path = cli.database.as_str();

    match cli.command {
        Commands::Init => {
            Database::open(db_path)?;
            println!("Database initialized at {}", db_path);
        }

        Commands::Add {
            date,
            body_part,
            name,
            laterality,
            sets,
            weight,
            reps,
            weight_left,
            weight_right,
            reps_left,
            reps_right,
        } => {
            let db = Database::open(db_path)?;
            let entry = NewExercise {
                body_part,
                exercise_name: name,
                sets,
                weights: weight,
                reps,
                weights_left: weight_left,
                weights_right: weight_right,
                reps_left,
                reps_right,
            };
            let id = db.add_exercise(entry, date, laterality)?;
            println!("Exercise added (id: {})", id);
        }

        Commands::List => {
            let db = Database::open(db_path)?;
            for r in db.list_exercises()? {
                println!(
                    "{:>4} | {} | {:12} | {:28} | {:10} | {} | {} / {} | {} / {}",
                    r.id.unwrap_or_default(),
                    r.date_string(),
                    r.body_part,
                    r.exercise_name,
                    r.laterality,
                    r.sets,
                    r.weight_left.as_deref().unwrap_or("-"),
                    r.weight_right.as_deref().unwrap_or("-"),
                    r.reps_left.as_deref().unwrap_or("-"),
                    r.reps_right.as_deref().unwrap_or("-"),
                );
            }
        }

        Commands::Import { csv_file, allow_duplicates, dry_run } => {
            if !csv_file.exists() {
                bail!("CSV file {} not found", csv_file.display());
            }
            println!("CSV file: {}", csv_file.display());
            println!("Database: {}", db_path);
            println!("Skip duplicates: {}", !allow_duplicates);
            println!();

            if dry_run {
                println!("DRY RUN - No data will be imported");
                let rows = import::preview_rows(&import::read_csv_text(&csv_file)?)?;
                for (n, date, name) in &rows {
                    println!("Row {}: {} - {}", n, date, name);
                }
                println!("\nWould import {} rows", rows.len());
                return Ok(());
            }

            let db = Database::open(db_path)?;
            let summary = import::import_csv_file(&db, &csv_file, ImportOptions { allow_duplicates })?;
            report_import(&summary)?;
        }

        Commands::Annotate { input_csv, output } => {
            if !input_csv.exists() {
                bail!("input file {} not found", input_csv.display());
            }
            let db = Database::open_existing(db_path)?;
            let output = output.unwrap_or_else(|| annotate::default_output_path(&input_csv));
            println!("Input: {}", input_csv.display());
            println!("Output: {}", output.display());
            println!("Database: {}", db_path);
            println!();

            let report = annotate::annotate_file(&input_csv, &output, &db.body_part_lookup()?)?;
            println!("Processed {} rows", report.processed);
            println!("Found body parts for {} exercises", report.found);
            println!("Unknown body parts: {}", report.unknown());
            if !report.unknown_exercises.is_empty() {
                println!("\nExercises not found in database:");
                for name in &report.unknown_exercises {
                    println!("  - {}", name);
                }
            }
            println!("\nUpdated CSV saved to {}", output.display());
        }

        Commands::Paste { input, output, preview, force, import_to_db } => {
            let text = paste::read_input(input.as_deref())?;
            if preview {
                println!("Preview of clipboard content:\n");
                println!("{}", paste::render_preview(&text));
            }

            let output = output
                .unwrap_or_else(|| PathBuf::from(paste::default_output_name(Local::now().naive_local())));
            if import_to_db {
                let db = Database::open(db_path)?;
                let (rows, summary) = paste::save_and_import(&text, &output, force, &db)?;
                println!("CSV data saved to: {}", output.display());
                println!("Saved {} data rows", rows);
                println!("\nImported into database: {}", db_path);
                report_import(&summary)?;
            } else {
                let rows = paste::save(&text, &output, force)?;
                println!("CSV data saved to: {}", output.display());
                println!("Saved {} data rows", rows);
            }
        }

        Commands::Sheet { date, name, exercises, ids, output_dir } => {
            let date = sheet::sheet_date(date.as_deref(), Local::now().date_naive())?;
            let lines = if ids.is_empty() {
                sheet::load_exercise_lines(&exercises)?
            } else {
                let db = Database::open_existing(db_path)?;
                let records = db.get_by_ids(&ids)?;
                if records.len() < ids.len() {
                    tracing::warn!("{} of {} ids not found", ids.len() - records.len(), ids.len());
                }
                records.iter().map(sheet::record_line).collect()
            };
            let path = sheet::write_sheet(&output_dir, date, name.as_deref(), &lines)?;
            println!("Created {}", path.display());
        }

        Commands::Serve { host, port, sheet_dir } => {
            let db = Database::open_existing(db_path)?;
            let addr: SocketAddr = format!("{}:{}", host, port)
                .parse()
                .with_context(|| format!("invalid listen address {}:{}", host, port))?;
            info!("Database: {}", db_path);
            println!("Open your browser to: http://{}", addr);
            web::serve(AppState::new(db, sheet_dir), addr).await?;
        }
    }

    Ok(())
}

fn report_import(summary: &ImportSummary) -> Result<()> {
    println!("Import complete:");
    println!("  Imported: {} rows", summary.imported);
    println!("  Skipped:  {} rows (duplicates)", summary.skipped);
    println!("  Errors:   {} rows", summary.errors);
    summary.check()
}
