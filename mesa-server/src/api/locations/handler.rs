//! Location API Handlers

use axum::{
    Json,
    extract::{Path, Query, State},
};
use serde::{Deserialize, Serialize};

use crate::core::ServerState;
use crate::db::models::{Location, LocationCreate, LocationUpdate};
use crate::db::repository::LocationRepository;
use crate::utils::validation::{MAX_NAME_LEN, MAX_SHORT_TEXT_LEN, validate_required_text};
use crate::utils::{AppError, AppResult};

/// GET /api/locations - 获取所有门店
pub async fn list(State(state): State<ServerState>) -> AppResult<Json<Vec<Location>>> {
    let repo = LocationRepository::new(state.db.clone());
    let locations = repo.find_all().await?;
    Ok(Json(locations))
}

/// GET /api/locations/:id - 获取单个门店
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Location>> {
    let repo = LocationRepository::new(state.db.clone());
    let location = repo
        .find_by_id(&id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Location {} not found", id)))?;
    Ok(Json(location))
}

/// POST /api/locations - 创建门店
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<LocationCreate>,
) -> AppResult<Json<Location>> {
    validate_required_text(&payload.name, "name", MAX_NAME_LEN)?;
    validate_required_text(&payload.timezone, "timezone", MAX_SHORT_TEXT_LEN)?;
    if payload.timezone.parse::<chrono_tz::Tz>().is_err() {
        return Err(AppError::validation(format!(
            "Unknown IANA timezone: {}",
            payload.timezone
        )));
    }

    let repo = LocationRepository::new(state.db.clone());
    let location = repo.create(payload).await?;
    Ok(Json(location))
}

/// PUT /api/locations/:id - 更新门店
pub async fn update(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Json(payload): Json<LocationUpdate>,
) -> AppResult<Json<Location>> {
    if let Some(name) = &payload.name {
        validate_required_text(name, "name", MAX_NAME_LEN)?;
    }
    if let Some(tz) = &payload.timezone
        && tz.parse::<chrono_tz::Tz>().is_err()
    {
        return Err(AppError::validation(format!("Unknown IANA timezone: {tz}")));
    }

    let repo = LocationRepository::new(state.db.clone());
    let location = repo.update(&id, payload).await?;
    Ok(Json(location))
}

/// DELETE /api/locations/:id - 停用门店 (软删除)
pub async fn delete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<bool>> {
    let repo = LocationRepository::new(state.db.clone());
    let result = repo.deactivate(&id).await?;
    Ok(Json(result))
}

/// GET /api/locations/:id/availability 查询参数
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    /// 开始时间 (Unix millis)
    pub start_time: i64,
    /// 结束时间，缺省按门店策略默认时长推导
    pub end_time: Option<i64>,
    pub party_size: i32,
}

/// 可用性试算结果
#[derive(Debug, Serialize)]
pub struct AvailabilityResponse {
    pub available: bool,
    /// 规划器选中的桌台 (试算结果，不保证后续创建成功)
    pub table_ids: Vec<String>,
}

/// GET /api/locations/:id/availability - 可用性试算 (不占座)
pub async fn availability(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    Query(query): Query<AvailabilityQuery>,
) -> AppResult<Json<AvailabilityResponse>> {
    let tables = state
        .booking
        .probe_availability(&id, query.start_time, query.end_time, query.party_size)
        .await?;
    Ok(Json(match tables {
        Some(table_ids) => AvailabilityResponse {
            available: true,
            table_ids,
        },
        None => AvailabilityResponse {
            available: false,
            table_ids: Vec::new(),
        },
    }))
}
