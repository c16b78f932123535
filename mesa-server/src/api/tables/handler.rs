//! Dining Table API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::Deserialize;

use crate::core::ServerState;
use crate::db::models::{DiningTable, DiningTableCreate, DiningTableUpdate};
use crate::db::repository::{DiningTableRepository, LocationRepository};
use crate::utils::validation::{MAX_NAME_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

/// GET /api/tables 查询参数
#[derive(Debug, Deserialize)]
pub struct ListTablesQuery {
    pub location_id: String,
}

/// GET /api/tables?location_id=... - 获取门店的所有桌台
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListTablesQuery>,
) -> AppResult<Json<Vec<DiningTable>>> {
    let location = LocationRepository::new(state.db.clone())
        .find_by_id(&query.location_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Location {} not found", query.location_id)))?;
    let location_id = location
        .id
        .ok_or_else(|| AppError::internal("Location record has no id"))?;

    let repo = DiningTableRepository::new(state.db.clone());
    let tables = repo.find_active_by_location(&location_id).await?;
    Ok(Json(tables))
}

/// GET /api/tables/:id - 获取单个桌台
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<DiningTable>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Table {} not found", id)))?;
    Ok(Json(table))
}

/// POST /api/tables - 创建桌台
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<DiningTableCreate>,
) -> AppResult<Json<DiningTable>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;

    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo.create(payload).await?;
    Ok(Json(table))
}

/// PUT /api/tables/:id - 更新桌台
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<DiningTableUpdate>,
) -> AppResult<Json<DiningTable>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }

    let repo = DiningTableRepository::new(state.db.clone());
    let table = repo.update(&id, payload).await?;
    Ok(Json(table))
}

/// DELETE /api/tables/:id - 停用桌台 (软删除，历史预订仍引用)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = DiningTableRepository::new(state.db.clone());
    let result = repo.deactivate(&id).await?;
    Ok(Json(result))
}
