use std::convert::Infallible;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::sse::{Event, KeepAlive, Sse},
    Json,
};
use futures::{stream, Stream, StreamExt};

use crate::errors::AppError;
use crate::optimize::optimizer::{
    optimize_resume, optimize_resume_stream, OptimizeRequest, OptimizeResponse,
};
use crate::state::AppState;

fn checked(
    payload: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<OptimizeRequest, AppError> {
    let Json(req) = payload?;
    if let Err(message) = req.check() {
        return Err(AppError::Validation(message.to_string()));
    }
    Ok(req)
}

/// POST /api/ai/optimize
pub async fn handle_optimize(
    State(state): State<AppState>,
    payload: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<OptimizeResponse>), AppError> {
    let req = checked(payload)?;
    let response = optimize_resume(&state.llm, &req).await;
    let status = if response.success {
        StatusCode::OK
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    Ok((status, Json(response)))
}

/// POST /api/ai/optimize/stream
/// One `data:` event per content delta, then `data: [DONE]`.
pub async fn handle_optimize_stream(
    State(state): State<AppState>,
    payload: Result<Json<OptimizeRequest>, JsonRejection>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let req = checked(payload)?;
    let events = optimize_resume_stream(state.llm.clone(), req)
        // SSE field values may not carry '\r'; '\n' is split into data lines.
        .map(|delta| Ok(Event::default().data(delta.replace('\r', ""))))
        .chain(stream::once(async { Ok(Event::default().data("[DONE]")) }));
    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
