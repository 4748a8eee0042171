use axum::{
    body::Bytes,
    extract::{
        multipart::{Multipart, MultipartError, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use shared::validation::status_after_transition;
use shared::{
    check_category_transition, sanitize_search_query, validate_part_data, CategoryStats,
    PaginatedResponse, PartCategory, PartRow, PartSearchParams, PartSortBy, PartStatus,
    SortOrder, TransitionRequest,
};

use crate::{
    db::{self, PartFilter},
    error::{ApiError, ApiResult},
    extractors::{map_json_rejection, ValidatedPart},
    metrics,
    state::AppState,
    uploads,
};

const DEFAULT_PAGE_SIZE: i64 = 50;
const MAX_PAGE_SIZE: i64 = 100;

fn db_internal_error(operation: &str, err: sqlx::Error) -> ApiError {
    tracing::error!(operation = operation, error = ?err, "database operation failed");
    ApiError::internal("An unexpected database error occurred")
}

fn map_query_rejection(err: QueryRejection) -> ApiError {
    ApiError::bad_request("InvalidQuery", format!("Invalid query parameters: {}", err.body_text()))
}

fn part_not_found(id: i64) -> ApiError {
    ApiError::not_found("PartNotFound", format!("No part found with ID: {}", id))
}

async fn fetch_part(state: &AppState, id: i64) -> ApiResult<PartRow> {
    db::get_part(&state.db, id)
        .await
        .map_err(|err| db_internal_error("get part by id", err))?
        .ok_or_else(|| part_not_found(id))
}

pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let uptime = state.started_at.elapsed().as_secs();
    let now = Utc::now().to_rfc3339();

    if db::ping(&state.db).await {
        tracing::debug!(uptime_secs = uptime, "health check passed");
        (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "version": env!("CARGO_PKG_VERSION"),
                "timestamp": now,
                "uptime_secs": uptime
            })),
        )
    } else {
        tracing::warn!(uptime_secs = uptime, "health check degraded, database unreachable");
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "degraded",
                "version": env!("CARGO_PKG_VERSION"),
                "timestamp": now,
                "uptime_secs": uptime
            })),
        )
    }
}

pub async fn list_parts(
    State(state): State<AppState>,
    params: Result<Query<PartSearchParams>, QueryRejection>,
) -> ApiResult<Json<PaginatedResponse<PartRow>>> {
    let Query(params) = params.map_err(map_query_rejection)?;

    let category = match params.category.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(raw.parse::<PartCategory>().map_err(|_| {
            ApiError::validation(
                "category",
                format!(
                    "category must be one of: {}",
                    PartCategory::ALL.map(|c| c.as_str()).join(", ")
                ),
            )
        })?),
    };
    let search = params
        .search
        .as_deref()
        .map(sanitize_search_query)
        .filter(|term| !term.is_empty());

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1).checked_mul(limit).ok_or_else(|| {
        ApiError::bad_request("InvalidQuery", format!("page {} is out of range", page))
    })?;
    let filter = PartFilter {
        category,
        search,
        sort_by: params.sort_by.unwrap_or(PartSortBy::CreatedAt),
        sort_order: params.sort_order.unwrap_or(SortOrder::Desc),
        limit,
        offset,
    };

    let (parts, total) = db::list_parts(&state.db, &filter)
        .await
        .map_err(|err| db_internal_error("list parts", err))?;

    Ok(Json(PaginatedResponse::new(parts, total, page, limit)))
}

pub async fn get_stats(State(state): State<AppState>) -> ApiResult<Json<CategoryStats>> {
    db::category_stats(&state.db)
        .await
        .map(Json)
        .map_err(|err| db_internal_error("category stats", err))
}

pub async fn get_part(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PartRow>> {
    fetch_part(&state, id).await.map(Json)
}

pub async fn create_part(
    State(state): State<AppState>,
    ValidatedPart(changes): ValidatedPart,
) -> ApiResult<(StatusCode, Json<PartRow>)> {
    let new_part = changes.into_new_part().map_err(|err| {
        metrics::record_validation_failure(err.field_name());
        ApiError::from(err)
    })?;

    let part = db::insert_part(&state.db, &new_part)
        .await
        .map_err(|err| db_internal_error("insert part", err))?;

    metrics::PARTS_CREATED.inc();
    tracing::info!(part_id = part.id, name = %part.name, category = %part.category, "part created");
    Ok((StatusCode::CREATED, Json(part)))
}

/// Partial update; a category change must follow the workflow edges
pub async fn update_part(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedPart(mut changes): ValidatedPart,
) -> ApiResult<Json<PartRow>> {
    if changes.name.as_deref() == Some("") {
        metrics::record_validation_failure(Some("name"));
        return Err(ApiError::validation("name", "name is required"));
    }

    let existing = fetch_part(&state, id).await?;

    if let Some(Some(target)) = changes.category {
        if target.as_str() == existing.category {
            changes.category = None;
        } else {
            let part_type = match changes.part_type {
                Some(part_type) => part_type.map(|t| t.as_str()),
                None => existing.part_type.as_deref(),
            };
            check_category_transition(&existing.category, target.as_str(), part_type)
                .map_err(|err| ApiError::bad_request("InvalidTransition", err.message))?;
            metrics::record_transition(&existing.category, target.as_str());
        }
    }

    let part = db::update_part(&state.db, id, &changes)
        .await
        .map_err(|err| db_internal_error("update part", err))?
        .ok_or_else(|| part_not_found(id))?;

    tracing::info!(part_id = id, "part updated");
    Ok(Json(part))
}

pub async fn delete_part(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<StatusCode> {
    let deleted = db::delete_part(&state.db, id)
        .await
        .map_err(|err| db_internal_error("delete part", err))?;
    if !deleted {
        return Err(part_not_found(id));
    }

    metrics::PARTS_DELETED.inc();
    tracing::info!(part_id = id, "part deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Move a part to another workflow category and update its status to match
pub async fn transition_part(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<TransitionRequest>, JsonRejection>,
) -> ApiResult<Json<PartRow>> {
    let Json(req) = payload.map_err(map_json_rejection)?;
    let existing = fetch_part(&state, id).await?;

    let target = check_category_transition(
        &existing.category,
        req.category.trim(),
        existing.part_type.as_deref(),
    )
    .map_err(|err| ApiError::bad_request("InvalidTransition", err.message))?;

    // `check_category_transition` already parsed the stored category
    let from = existing.category().unwrap_or_default();
    let status = status_after_transition(from, target);

    let part = db::set_category(&state.db, id, target, status)
        .await
        .map_err(|err| db_internal_error("transition part", err))?
        .ok_or_else(|| part_not_found(id))?;

    metrics::record_transition(from.as_str(), target.as_str());
    tracing::info!(
        part_id = id,
        from = %from,
        to = %target,
        status = %status,
        "part moved"
    );
    Ok(Json(part))
}

/// Claim a part for someone; `assigned` is validated like any part field
pub async fn assign_part(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<Json<PartRow>> {
    let Json(body) = payload.map_err(map_json_rejection)?;
    let mut raw = serde_json::Map::new();
    if let Some(assigned) = body.get("assigned") {
        raw.insert("assigned".to_string(), assigned.clone());
    }

    let assigned = validate_part_data(&raw)
        .map_err(|err| {
            metrics::record_validation_failure(err.field_name());
            ApiError::from(err)
        })?
        .assigned
        .filter(|name| !name.is_empty())
        .ok_or_else(|| {
            metrics::record_validation_failure(Some("assigned"));
            ApiError::validation("assigned", "assigned is required")
        })?;

    fetch_part(&state, id).await?;
    let part = db::set_assignment(
        &state.db,
        id,
        Some(&assigned),
        Some(Utc::now()),
        PartStatus::InProgress,
    )
    .await
    .map_err(|err| db_internal_error("assign part", err))?
    .ok_or_else(|| part_not_found(id))?;

    tracing::info!(part_id = id, assigned = %assigned, "part assigned");
    Ok(Json(part))
}

pub async fn unassign_part(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PartRow>> {
    let part = db::set_assignment(&state.db, id, None, None, PartStatus::Pending)
        .await
        .map_err(|err| db_internal_error("unassign part", err))?
        .ok_or_else(|| part_not_found(id))?;

    tracing::info!(part_id = id, "part unassigned");
    Ok(Json(part))
}

/// Attach a STEP file to a part; the form field must be named `file`
pub async fn upload_part_file(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<Json<PartRow>> {
    let mut multipart = multipart
        .map_err(|err| ApiError::new(err.status(), "InvalidUpload", err.body_text()))?;
    fetch_part(&state, id).await?;

    while let Some(field) = multipart.next_field().await.map_err(map_multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let stored = uploads::stored_file_name(id, field.file_name().unwrap_or_default())
            .map_err(|err| {
                metrics::record_validation_failure(Some("file"));
                err
            })?;
        let bytes = field.bytes().await.map_err(map_multipart_error)?;
        return store_upload(&state, id, stored, bytes).await;
    }

    metrics::record_validation_failure(Some("file"));
    Err(ApiError::validation("file", "file is required"))
}

fn map_multipart_error(err: MultipartError) -> ApiError {
    ApiError::new(err.status(), "InvalidUpload", err.body_text())
}

async fn store_upload(
    state: &AppState,
    id: i64,
    stored: String,
    bytes: Bytes,
) -> ApiResult<Json<PartRow>> {
    if bytes.is_empty() {
        metrics::record_validation_failure(Some("file"));
        return Err(ApiError::validation("file", "file is empty"));
    }

    // Same length rules as a `file` value sent as JSON
    let mut raw = serde_json::Map::new();
    raw.insert("file".to_string(), Value::String(stored.clone()));
    let changes = validate_part_data(&raw).map_err(|err| {
        metrics::record_validation_failure(err.field_name());
        ApiError::from(err)
    })?;

    let path = state.upload_dir.join(&stored);
    tokio::fs::write(&path, &bytes).await.map_err(|err| {
        tracing::error!(path = %path.display(), error = %err, "failed to store upload");
        ApiError::internal("Failed to store uploaded file")
    })?;

    let part = db::update_part(&state.db, id, &changes)
        .await
        .map_err(|err| db_internal_error("attach part file", err))?
        .ok_or_else(|| part_not_found(id))?;

    tracing::info!(part_id = id, file = %stored, bytes = bytes.len(), "part file uploaded");
    Ok(Json(part))
}

pub async fn route_not_found() -> impl IntoResponse {
    ApiError::not_found("RouteNotFound", "The requested route does not exist")
}
