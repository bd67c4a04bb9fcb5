//! HTTP handlers for the selection form

use std::collections::BTreeMap;

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use chrono::Local;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;
use tracing::{error, info};

use super::AppState;
use crate::catalog::Laterality;
use crate::db::ExerciseRecord;
use crate::sheet::{self, SheetError};

const INDEX_HTML: &str = include_str!("ui/index.html");

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl From<SheetError> for ApiError {
    fn from(e: SheetError) -> Self {
        match e {
            SheetError::InvalidDate(_) | SheetError::NoExercises => ApiError::BadRequest(e.to_string()),
            other => ApiError::Internal(other.into()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(e) => {
                error!("request failed: {:#}", e);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}

/// Latest result of one exercise, as the form shows it
#[derive(Debug, Serialize, PartialEq)]
pub struct ExerciseView {
    pub id: i64,
    pub name: String,
    pub body_part: String,
    pub date: String,
    pub laterality: Laterality,
    pub sets: i64,
    pub weight_left: Option<String>,
    pub weight_right: Option<String>,
    pub reps_left: Option<String>,
    pub reps_right: Option<String>,
}

impl From<ExerciseRecord> for ExerciseView {
    fn from(r: ExerciseRecord) -> Self {
        Self {
            id: r.id.unwrap_or_default(),
            date: r.date_string(),
            name: r.exercise_name,
            body_part: r.body_part,
            laterality: r.laterality,
            sets: r.sets,
            weight_left: r.weight_left,
            weight_right: r.weight_right,
            reps_left: r.reps_left,
            reps_right: r.reps_right,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct IdsRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct SheetRequest {
    #[serde(default)]
    pub ids: Vec<i64>,
    pub name: Option<String>,
    pub date: Option<String>,
}

/// GET /
pub async fn serve_index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// GET /health
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// GET /api/exercises
pub async fn list_exercises(
    State(state): State<AppState>,
) -> Result<Json<BTreeMap<String, Vec<ExerciseView>>>, ApiError> {
    let records = state.db.lock().await.most_recent_by_name()?;

    let mut grouped: BTreeMap<String, Vec<ExerciseView>> = BTreeMap::new();
    for record in records {
        grouped
            .entry(record.body_part.clone())
            .or_default()
            .push(record.into());
    }
    Ok(Json(grouped))
}

/// POST /api/copy_ids
pub async fn copy_ids(Json(req): Json<IdsRequest>) -> Json<serde_json::Value> {
    let ids_string = req
        .ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(" ");
    Json(json!({ "ids_string": ids_string, "count": req.ids.len() }))
}

/// POST /api/sheet
pub async fn create_sheet(
    State(state): State<AppState>,
    Json(req): Json<SheetRequest>,
) -> Result<Json<serde_json::Value>, ApiError> {
    if req.ids.is_empty() {
        return Err(ApiError::BadRequest("no exercises selected".to_string()));
    }
    let date = sheet::sheet_date(req.date.as_deref(), Local::now().date_naive())?;

    let records = state.db.lock().await.get_by_ids(&req.ids)?;
    let lines: Vec<String> = records.iter().map(sheet::record_line).collect();
    let path = sheet::write_sheet(&state.sheet_dir, date, req.name.as_deref(), &lines)?;

    info!("Sheet for {} exercises written to {}", lines.len(), path.display());
    Ok(Json(json!({
        "path": path.display().to_string(),
        "count": lines.len(),
    })))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use serde_json::Value;
    use tower::util::ServiceExt;

    use crate::db::Database;
    use crate::db::tests::record;
    use crate::web::{AppState, build_router};

    fn setup_app(dir: &std::path::Path) -> (axum::Router, i64, i64) {
        let db = Database::open_in_memory().unwrap();
        db.insert_record(&record("2025-01-01", "Bench Press", "Chest", "135", "10")).unwrap();
        let bench = db.insert_record(&record("2025-01-08", "Bench Press", "Chest", "140", "9")).unwrap();
        let squat = db.insert_record(&record("2025-01-03", "Squat", "Quads", "185", "5")).unwrap();
        (build_router(AppState::new(db, dir.to_path_buf())), bench, squat)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn extract_json(body: Body) -> Value {
        let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_index_served() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _, _) = setup_app(dir.path());
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_exercises_grouped_by_body_part() {
        let dir = tempfile::tempdir().unwrap();
        let (app, bench, _) = setup_app(dir.path());
        let request = Request::builder().uri("/api/exercises").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = extract_json(response.into_body()).await;
        let chest = body["Chest"].as_array().unwrap();
        assert_eq!(chest.len(), 1);
        assert_eq!(chest[0]["id"], bench);
        assert_eq!(chest[0]["date"], "2025-01-08");
        assert_eq!(chest[0]["laterality"], "unilateral");
        assert_eq!(body["Quads"][0]["name"], "Squat");
    }

    #[tokio::test]
    async fn test_copy_ids() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _, _) = setup_app(dir.path());
        let response = app
            .oneshot(post_json("/api/copy_ids", serde_json::json!({ "ids": [3, 1, 2] })))
            .await
            .unwrap();
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["ids_string"], "3 1 2");
        assert_eq!(body["count"], 3);
    }

    #[tokio::test]
    async fn test_create_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let (app, bench, squat) = setup_app(dir.path());
        let response = app
            .oneshot(post_json(
                "/api/sheet",
                serde_json::json!({ "ids": [squat, bench], "name": "Full Body", "date": "2025-01-10" }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body = extract_json(response.into_body()).await;
        assert_eq!(body["count"], 2);
        assert!(dir.path().join("2025-01-10 Workout.pdf").exists());
    }

    #[tokio::test]
    async fn test_create_sheet_rejects_bad_input() {
        let dir = tempfile::tempdir().unwrap();
        let (app, bench, _) = setup_app(dir.path());

        let response = app
            .clone()
            .oneshot(post_json("/api/sheet", serde_json::json!({ "ids": [] })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(post_json("/api/sheet", serde_json::json!({ "ids": [bench], "date": "tomorrow" })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["error"], "invalid date format: tomorrow");
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (app, _, _) = setup_app(dir.path());
        let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = app.oneshot(request).await.unwrap();
        let body = extract_json(response.into_body()).await;
        assert_eq!(body["status"], "ok");
    }
}
