use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::AppError;
use crate::resume::models::{ResumeData, ResumeRecord};
use crate::resume::validation::validate_resume;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveResumeRequest {
    pub name: String,
    pub data: Value,
}

#[derive(Debug, Serialize)]
pub struct CreatedResponse {
    pub id: String,
}

/// Validates untrusted résumé JSON, naming the offending field on failure.
fn parse_resume(value: &Value) -> Result<ResumeData, AppError> {
    validate_resume(value)
        .into_result()
        .map_err(|e| AppError::Validation(format!("Invalid résumé data at {e}")))
}

fn parse_save_request(
    payload: Result<Json<SaveResumeRequest>, JsonRejection>,
) -> Result<(String, ResumeData), AppError> {
    let Json(req) = payload?;
    let name = req.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("name must not be empty".into()));
    }
    Ok((name.to_string(), parse_resume(&req.data)?))
}

/// GET /api/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeRecord>>, AppError> {
    Ok(Json(state.resumes.list().await?))
}

/// POST /api/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    payload: Result<Json<SaveResumeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CreatedResponse>), AppError> {
    let (name, data) = parse_save_request(payload)?;
    let id = state.resumes.add(&name, data).await?;
    Ok((StatusCode::CREATED, Json(CreatedResponse { id })))
}

/// GET /api/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResumeRecord>, AppError> {
    let record = state
        .resumes
        .get(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    Ok(Json(record))
}

/// PUT /api/resumes/:id
pub async fn handle_update_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<SaveResumeRequest>, JsonRejection>,
) -> Result<Json<ResumeRecord>, AppError> {
    let (name, data) = parse_save_request(payload)?;
    Ok(Json(state.resumes.update(&id, &name, data).await?))
}

/// DELETE /api/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    if state.resumes.delete(&id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Resume {id} not found")))
    }
}

/// DELETE /api/resumes
pub async fn handle_clear_resumes(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.resumes.clear().await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/resume/current
pub async fn handle_get_current(State(state): State<AppState>) -> Json<ResumeData> {
    Json(state.current.get())
}

/// PUT /api/resume/current
pub async fn handle_set_current(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<ResumeData>, AppError> {
    let Json(value) = payload?;
    let data = parse_resume(&value)?;
    state.current.set(data.clone());
    Ok(Json(data))
}

/// DELETE /api/resume/current
/// Restores the résumé loaded at startup.
pub async fn handle_reset_current(State(state): State<AppState>) -> Json<ResumeData> {
    state.current.reset();
    Json(state.current.get())
}
