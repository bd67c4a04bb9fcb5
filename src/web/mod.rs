//! Web module - exercise selection form
//!
//! Lists the latest result of every known exercise grouped by body part,
//! lets the user pick and order some and turns the pick into the next sheet.

mod handlers;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};
use tokio::sync::Mutex;
use tracing::info;

use crate::db::Database;

pub use handlers::{ApiError, ExerciseView};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<Mutex<Database>>,
    /// Where generated sheets are written
    pub sheet_dir: PathBuf,
}

impl AppState {
    pub fn new(db: Database, sheet_dir: PathBuf) -> Self {
        Self {
            db: Arc::new(Mutex::new(db)),
            sheet_dir,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::serve_index))
        .route("/health", get(handlers::health))
        .route("/api/exercises", get(handlers::list_exercises))
        .route("/api/copy_ids", post(handlers::copy_ids))
        .route("/api/sheet", post(handlers::create_sheet))
        .with_state(state)
}

/// Bind and serve until the process is stopped
pub async fn serve(state: AppState, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Exercise selection form listening on http://{}", addr);
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}
