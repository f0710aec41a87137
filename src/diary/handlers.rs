use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    Extension, Json,
};
use axum_extra::extract::{Query, QueryRejection};
use std::sync::Arc;

use crate::{
    diary::models::{CreateEntryRequest, EntryQuery, EntryResponse, Page, UpdateEntryRequest},
    error::{AppError, AppResult},
    trace::RequestContext,
    AppState,
};

fn entry_id(path: Result<Path<i64>, PathRejection>) -> AppResult<i64> {
    path.map(|Path(id)| id)
        .map_err(|e| AppError::invalid("invalid ID format", vec![e.to_string()]))
}

pub async fn get_entry(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<i64>, PathRejection>,
) -> AppResult<Json<EntryResponse>> {
    let id = entry_id(path)?;
    let entry = state.diary.get_entry(&ctx, id).await?;
    Ok(Json(entry))
}

pub async fn search_entries(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    query: Result<Query<EntryQuery>, QueryRejection>,
) -> AppResult<Json<Page<EntryResponse>>> {
    let Query(query) =
        query.map_err(|e| AppError::invalid("invalid query parameters", vec![e.to_string()]))?;
    let page = state.diary.search_entries(&ctx, query.into()).await?;
    Ok(Json(page))
}

pub async fn create_entry(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<CreateEntryRequest>, JsonRejection>,
) -> AppResult<(StatusCode, Json<EntryResponse>)> {
    let Json(payload) =
        payload.map_err(|e| AppError::invalid("invalid JSON format", vec![e.body_text()]))?;
    let entry = state.diary.create_entry(&ctx, payload).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}

pub async fn update_entry(
    State(state): State<Arc<AppState>>,
    Extension(ctx): Extension<RequestContext>,
    path: Result<Path<i64>, PathRejection>,
    payload: Result<Json<UpdateEntryRequest>, JsonRejection>,
) -> AppResult<Json<EntryResponse>> {
    let id = entry_id(path)?;
    let Json(payload) =
        payload.map_err(|e| AppError::invalid("invalid JSON format", vec![e.body_text()]))?;
    let entry = state.diary.update_entry(&ctx, id, payload).await?;
    Ok(Json(entry))
}

pub async fn not_found() -> AppError {
    AppError::NotFound("path not found".into())
}
