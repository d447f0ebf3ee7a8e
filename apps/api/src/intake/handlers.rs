use std::time::Duration;

use axum::{
    extract::{rejection::JsonRejection, Multipart, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::intake::fixtures::{
    parsed_resume, OCR_CONFIDENCE, OCR_TEXT, PARSE_CONFIDENCE, PARSE_TOKENS_USED,
};
use crate::resume::models::new_resume_id;
use crate::state::AppState;

pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const OCR_LATENCY: Duration = Duration::from_millis(2000);
const PARSE_LATENCY: Duration = Duration::from_millis(3000);
const SAVE_LATENCY: Duration = Duration::from_millis(1000);

const DEFAULT_RESUME_NAME: &str = "Untitled résumé";

async fn simulate_latency(state: &AppState, delay: Duration) {
    if state.config.simulate_latency {
        tokio::time::sleep(delay).await;
    }
}

fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    value
        .filter(|v| !v.trim().is_empty())
        .ok_or_else(|| AppError::Validation(message.to_string()))
}

/// Status payload shared by the task-progress stubs.
fn completed_task(task_id: String) -> Json<Value> {
    Json(json!({
        "taskId": task_id,
        "status": "completed",
        "progress": 100,
        "result": null
    }))
}

/// POST /api/resume/upload
/// Accepts a single PDF in the `file` field.
pub async fn handle_upload(mut multipart: Multipart) -> Result<Json<Value>, AppError> {
    let mut upload: Option<(String, Option<String>, usize)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload.pdf").to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;
        upload = Some((filename, content_type, bytes.len()));
    }

    let (filename, content_type, size) =
        upload.ok_or_else(|| AppError::Validation("No file was uploaded".into()))?;

    if content_type.as_deref() != Some("application/pdf") {
        return Err(AppError::Validation("Only PDF files are supported".into()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::PayloadTooLarge("File must not exceed 10 MB".into()));
    }

    let file_id = format!("file_{}", Utc::now().timestamp_millis());
    info!("Accepted upload {} ({} bytes) as {}", filename, size, file_id);

    Ok(Json(json!({
        "success": true,
        "fileId": file_id,
        "filename": filename,
        "size": size,
        "message": "File uploaded"
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileIdQuery {
    pub file_id: Option<String>,
}

/// GET /api/resume/upload?fileId=
pub async fn handle_upload_progress(
    Query(query): Query<FileIdQuery>,
) -> Result<Json<Value>, AppError> {
    let file_id = required(query.file_id, "Missing fileId parameter")?;
    Ok(Json(json!({
        "fileId": file_id,
        "progress": 100,
        "status": "completed"
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OcrRequest {
    #[serde(default)]
    pub file_id: Option<String>,
    #[serde(default)]
    pub file_path: Option<String>,
}

/// POST /api/resume/ocr
pub async fn handle_ocr(
    State(state): State<AppState>,
    payload: Result<Json<OcrRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = payload?;
    if req.file_id.is_none() && req.file_path.is_none() {
        return Err(AppError::Validation("Missing fileId or filePath".into()));
    }

    simulate_latency(&state, OCR_LATENCY).await;

    Ok(Json(json!({
        "success": true,
        "fileId": req.file_id,
        "extractedText": OCR_TEXT,
        "confidence": OCR_CONFIDENCE,
        "pageCount": 1,
        "processingTime": OCR_LATENCY.as_millis() as u64,
        "message": "Text extraction complete"
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskIdQuery {
    pub task_id: Option<String>,
}

/// GET /api/resume/ocr?taskId= and GET /api/resume/parse?taskId=
pub async fn handle_task_status(
    Query(query): Query<TaskIdQuery>,
) -> Result<Json<Value>, AppError> {
    let task_id = required(query.task_id, "Missing taskId parameter")?;
    Ok(completed_task(task_id))
}

#[derive(Debug, Deserialize)]
pub struct ParseRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// POST /api/resume/parse
pub async fn handle_parse(
    State(state): State<AppState>,
    payload: Result<Json<ParseRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = payload?;
    required(req.text, "Missing text to parse")?;

    simulate_latency(&state, PARSE_LATENCY).await;

    Ok(Json(json!({
        "success": true,
        "parsedData": parsed_resume(),
        "confidence": PARSE_CONFIDENCE,
        "processingTime": PARSE_LATENCY.as_millis() as u64,
        "tokensUsed": PARSE_TOKENS_USED,
        "message": "Parsing complete"
    })))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveRequest {
    #[serde(default)]
    pub resume_data: Option<Value>,
    #[serde(default)]
    pub resume_name: Option<String>,
}

/// POST /api/resume/save
pub async fn handle_save(
    State(state): State<AppState>,
    payload: Result<Json<SaveRequest>, JsonRejection>,
) -> Result<Json<Value>, AppError> {
    let Json(req) = payload?;
    if req.resume_data.as_ref().map_or(true, Value::is_null) {
        return Err(AppError::Validation("Missing resumeData".into()));
    }

    simulate_latency(&state, SAVE_LATENCY).await;

    let resume_name = req
        .resume_name
        .filter(|n| !n.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_RESUME_NAME.to_string());

    Ok(Json(json!({
        "success": true,
        "resumeId": new_resume_id(),
        "resumeName": resume_name,
        "savedAt": Utc::now().to_rfc3339(),
        "version": 1,
        "message": "Résumé saved"
    })))
}

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

/// GET /api/resume/save?page=&limit=
pub async fn handle_saved_list(Query(query): Query<PageQuery>) -> Json<Value> {
    let page = query.page.unwrap_or(1).max(1);
    let limit = query.limit.unwrap_or(10).max(1);

    let resumes = json!([
        {
            "id": "resume_001",
            "name": "Frontend engineer résumé",
            "createdAt": "2024-01-15T10:30:00Z",
            "updatedAt": "2024-01-15T10:30:00Z",
            "version": 1
        },
        {
            "id": "resume_002",
            "name": "Full-stack developer résumé",
            "createdAt": "2024-01-10T14:20:00Z",
            "updatedAt": "2024-01-12T16:45:00Z",
            "version": 2
        }
    ]);
    let total = 2u32;

    Json(json!({
        "success": true,
        "resumes": resumes,
        "pagination": {
            "page": page,
            "limit": limit,
            "total": total,
            "totalPages": total.div_ceil(limit)
        }
    }))
}
