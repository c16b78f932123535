//! Booking API Handlers
//!
//! Handler 只做参数校验与时间戳注入，业务全部在
//! [`BookingService`] 内完成。"当前时间" 在这里取一次并显式
//! 下传，引擎保持纯粹可测。

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde::Deserialize;

use crate::booking::{BookingConfirmation, CreateBookingInput};
use crate::core::ServerState;
use crate::db::models::Booking;
use crate::utils::validation::{
    MAX_EMAIL_LEN, MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use crate::utils::AppResult;

/// POST /api/bookings 请求体
#[derive(Debug, Deserialize)]
pub struct CreateBookingRequest {
    pub location_id: String,
    /// 开始时间 (Unix millis)
    pub start_time: i64,
    /// 结束时间 (Unix millis)，缺省按门店策略默认时长推导
    pub end_time: Option<i64>,
    pub party_size: i32,
    pub idempotency_key: String,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_email: Option<String>,
    pub note: Option<String>,
    /// 无可用时转入候补
    #[serde(default)]
    pub join_waitlist: bool,
}

/// GET /api/bookings 查询参数
#[derive(Debug, Deserialize)]
pub struct ListBookingsQuery {
    pub location_id: String,
    /// 门店本地营业日 (YYYY-MM-DD)
    pub date: String,
}

/// POST /api/bookings/:id/confirm-deposit 请求体
#[derive(Debug, Deserialize, Default)]
pub struct ConfirmDepositRequest {
    /// 支付处理器的授权单号
    pub hold_id: Option<String>,
}

fn validate_create(payload: &CreateBookingRequest) -> AppResult<()> {
    validate_required_text(&payload.location_id, "location_id", MAX_SHORT_TEXT_LEN)?;
    validate_required_text(&payload.idempotency_key, "idempotency_key", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.guest_name, "guest_name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.guest_phone, "guest_phone", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.guest_email, "guest_email", MAX_EMAIL_LEN)?;
    validate_optional_text(&payload.note, "note", MAX_NOTE_LEN)?;
    Ok(())
}

/// POST /api/bookings - 创建预订
///
/// 新建返回 201；幂等重放返回 200 与原预订。
pub async fn create(
    State(state): State<ServerState>,
    Json(payload): Json<CreateBookingRequest>,
) -> AppResult<impl IntoResponse> {
    validate_create(&payload)?;

    let input = CreateBookingInput {
        location_id: payload.location_id,
        start_time: payload.start_time,
        end_time: payload.end_time,
        party_size: payload.party_size,
        idempotency_key: payload.idempotency_key,
        guest_name: payload.guest_name,
        guest_phone: payload.guest_phone,
        guest_email: payload.guest_email,
        note: payload.note,
        join_waitlist: payload.join_waitlist,
    };

    let confirmation: BookingConfirmation = state
        .booking
        .create_booking(input, Utc::now().timestamp_millis())
        .await?;

    let status = if confirmation.replayed {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((status, Json(confirmation)))
}

/// GET /api/bookings/:id - 获取单个预订
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Booking>> {
    let booking = state.booking.get_booking(&id).await?;
    Ok(Json(booking))
}

/// GET /api/bookings?location_id=...&date=... - 按营业日列出预订
pub async fn list(
    State(state): State<ServerState>,
    Query(query): Query<ListBookingsQuery>,
) -> AppResult<Json<Vec<Booking>>> {
    let bookings = state
        .booking
        .list_for_date(&query.location_id, &query.date)
        .await?;
    Ok(Json(bookings))
}

/// POST /api/bookings/:id/cancel - 取消预订
pub async fn cancel(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Booking>> {
    let booking = state
        .booking
        .cancel_booking(&id, Utc::now().timestamp_millis())
        .await?;
    Ok(Json(booking))
}

/// POST /api/bookings/:id/no-show - 标记未到店
pub async fn no_show(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Booking>> {
    let booking = state
        .booking
        .mark_no_show(&id, Utc::now().timestamp_millis())
        .await?;
    Ok(Json(booking))
}

/// POST /api/bookings/:id/complete - 标记用餐完成
pub async fn complete(
    State(state): State<ServerState>,
    Path(id): Path<String>,
) -> AppResult<Json<Booking>> {
    let booking = state
        .booking
        .complete_booking(&id, Utc::now().timestamp_millis())
        .await?;
    Ok(Json(booking))
}

/// POST /api/bookings/:id/confirm-deposit - 押金授权确认
pub async fn confirm_deposit(
    State(state): State<ServerState>,
    Path(id): Path<String>,
    payload: Option<Json<ConfirmDepositRequest>>,
) -> AppResult<Json<Booking>> {
    let hold_id = payload.and_then(|Json(p)| p.hold_id);
    validate_optional_text(&hold_id, "hold_id", MAX_SHORT_TEXT_LEN)?;
    let booking = state
        .booking
        .confirm_deposit(&id, hold_id, Utc::now().timestamp_millis())
        .await?;
    Ok(Json(booking))
}
