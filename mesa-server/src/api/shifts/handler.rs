//! Shift API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{Shift, ShiftCreate, ShiftUpdate};
use crate::db::repository::{LocationRepository, ShiftRepository};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

/// GET /api/shifts 查询参数
#[derive(Debug, Deserialize)]
pub struct ListShiftsQuery {
    pub location_id: String,
}

/// GET /api/shifts?location_id=... - 获取门店的所有班次
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListShiftsQuery>,
) -> AppResult<Json<Vec<Shift>>> {
    let location = LocationRepository::new(state.db.clone())
        .find_by_id(&query.location_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Location {} not found", query.location_id)))?;
    let location_id = location
        .id
        .ok_or_else(|| AppError::internal("Location record has no id"))?;

    let repo = ShiftRepository::new(state.db.clone());
    let shifts = repo.find_active_by_location(&location_id).await?;
    Ok(Json(shifts))
}

/// GET /api/shifts/:id - 获取单个班次
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Shift>> {
    let repo = ShiftRepository::new(state.db.clone());
    let shift = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Shift {} not found", id)))?;
    Ok(Json(shift))
}

/// POST /api/shifts - 创建班次
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<ShiftCreate>,
) -> AppResult<Json<Shift>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let repo = ShiftRepository::new(state.db.clone());
    let shift = repo.create(payload).await?;
    Ok(Json(shift))
}

/// PUT /api/shifts/:id - 更新班次
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<ShiftUpdate>,
) -> AppResult<Json<Shift>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }

    let repo = ShiftRepository::new(state.db.clone());
    let shift = repo.update(&id, payload).await?;
    Ok(Json(shift))
}

/// DELETE /api/shifts/:id - 停用班次
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = ShiftRepository::new(state.db.clone());
    let result = repo.deactivate(&id).await?;
    Ok(Json(result))
}
