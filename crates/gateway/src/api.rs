//! Route handlers.
//!
//! - `POST /get_courses`: run the advisor pipeline
//! - `OPTIONS /ask`: bare acknowledgment
//! - `GET /health`: liveness plus corpus sizes
//! - `GET /programs`: curriculum programs
//! - `GET /courses?program=..&term=..`: courses a student may still owe

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use tracing::{error, warn};
use vahed_core::{CourseSelectionRequest, CourseSelectionResult};

use crate::SharedState;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(err: vahed_core::Error) -> ApiError {
    let status = match &err {
        vahed_core::Error::Request(_) => {
            warn!(error = %err, "Rejected course request");
            StatusCode::UNPROCESSABLE_ENTITY
        }
        _ => {
            error!(error = %err, "Course request failed");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (
        status,
        Json(ErrorResponse {
            error: err.to_string(),
        }),
    )
}

pub async fn get_courses(
    State(state): State<SharedState>,
    Json(request): Json<CourseSelectionRequest>,
) -> Result<Json<CourseSelectionResult>, ApiError> {
    let plan = state.planner.plan(&request).await.map_err(api_error)?;
    Ok(Json(plan.courses))
}

pub async fn options_ask() -> Json<serde_json::Value> {
    Json(serde_json::json!({}))
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    status: &'static str,
    version: &'static str,
    documents: usize,
    curriculum_records: usize,
}

pub async fn health(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        documents: state.planner.index().len(),
        curriculum_records: state.planner.corpus().len(),
    })
}

pub async fn programs(State(state): State<SharedState>) -> Json<Vec<String>> {
    Json(
        state
            .planner
            .corpus()
            .programs()
            .into_iter()
            .map(String::from)
            .collect(),
    )
}

#[derive(Debug, Deserialize)]
pub struct CoursesQuery {
    program: String,
    term: i64,
}

#[derive(Debug, Serialize)]
pub struct CourseSummary {
    id: Option<String>,
    name: String,
    term: i64,
}

pub async fn courses(
    State(state): State<SharedState>,
    Query(query): Query<CoursesQuery>,
) -> Json<Vec<CourseSummary>> {
    Json(
        state
            .planner
            .corpus()
            .courses_before(&query.program, query.term)
            .into_iter()
            .map(|r| CourseSummary {
                id: r.id.clone(),
                name: r.name.clone(),
                term: r.term,
            })
            .collect(),
    )
}
