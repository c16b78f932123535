//! 统一错误处理
//!
//! 提供应用级错误类型和响应结构：
//! - [`AppError`] - 应用错误枚举
//! - [`AppResponse`] - API 响应结构
//!
//! # 错误码规范
//!
//! 预订链路使用业务错误码 (调用方可据此分流)：
//!
//! | 错误码 | HTTP | 说明 |
//! |--------|------|------|
//! | LOCATION_NOT_FOUND | 404 | 门店不存在或已停用 |
//! | INVALID_TIME | 400 | 时间非法 (过去时间、start >= end) |
//! | POLICY_VIOLATION | 400 | 违反门店预订策略 |
//! | NO_AVAILABILITY | 409 | 无可用桌台 (业务结果，非系统故障) |
//!
//! # 使用示例
//!
//! ```ignore
//! Err(AppError::not_found("Booking not found"))
//! ```

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tracing::error;

/// API 统一响应结构
///
/// ```json
/// {
///   "code": "OK",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize)]
pub struct AppResponse<T> {
    /// 错误码 (OK 表示成功)
    pub code: String,
    /// 消息
    pub message: String,
    /// 响应数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

/// 应用错误枚举
///
/// # 错误分类
///
/// | 分类 | 说明 |
/// |------|------|
/// | 预订业务错误 | 门店不存在、策略拒绝、无可用桌台 |
/// | 通用业务错误 | 资源不存在、验证失败、状态流转冲突 |
/// | 系统错误 | 数据库错误、内部错误 |
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // ========== 预订业务错误 ==========
    #[error("Location not found: {0}")]
    /// 门店不存在或未激活 (404)
    LocationNotFound(String),

    #[error("Invalid time: {0}")]
    /// 时间非法 (400)
    InvalidTime(String),

    #[error("Policy violation: {0}")]
    /// 违反预订策略 (400)
    PolicyViolation(String),

    #[error("No availability for the requested slot")]
    /// 无可用桌台 — 合法业务结果，调用方可引导候补 (409)
    NoAvailability,

    // ========== 通用业务错误 ==========
    #[error("Resource not found: {0}")]
    /// 资源不存在 (404)
    NotFound(String),

    #[error("Resource already exists: {0}")]
    /// 资源冲突 (409)
    Conflict(String),

    #[error("Validation failed: {0}")]
    /// 验证失败 (400)
    Validation(String),

    #[error("Business rule violation: {0}")]
    /// 业务规则违反，如非法状态流转 (422)
    BusinessRule(String),

    // ========== 系统错误 (5xx) ==========
    #[error("Database error: {0}")]
    /// 数据库错误 (500)
    Database(String),

    #[error("Internal server error: {0}")]
    /// 内部错误 (500)
    Internal(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // Booking taxonomy
            AppError::LocationNotFound(msg) => {
                (StatusCode::NOT_FOUND, "LOCATION_NOT_FOUND", msg.as_str())
            }
            AppError::InvalidTime(msg) => (StatusCode::BAD_REQUEST, "INVALID_TIME", msg.as_str()),
            AppError::PolicyViolation(msg) => {
                (StatusCode::BAD_REQUEST, "POLICY_VIOLATION", msg.as_str())
            }
            AppError::NoAvailability => (
                StatusCode::CONFLICT,
                "NO_AVAILABILITY",
                "No table available for the requested slot",
            ),

            // Not found (404)
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.as_str()),

            // Conflict (409)
            AppError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.as_str()),

            // Validation (400)
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION", msg.as_str()),

            // Business rule (422)
            AppError::BusinessRule(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "BUSINESS_RULE", msg.as_str())
            }

            // Database errors (500) — 不向调用方泄漏内部细节
            AppError::Database(msg) => {
                error!(target: "database", error = %msg, "Database error occurred");
                (StatusCode::INTERNAL_SERVER_ERROR, "DATABASE", "Database error")
            }

            // Internal errors (500)
            AppError::Internal(msg) => {
                error!(target: "internal", error = %msg, "Internal error occurred");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL",
                    "Internal server error",
                )
            }
        };

        let body = Json(AppResponse::<()> {
            code: code.to_string(),
            message: message.to_string(),
            data: None,
        });

        (status, body).into_response()
    }
}

// ========== Helper Constructors ==========

impl AppError {
    pub fn location_not_found(msg: impl Into<String>) -> Self {
        Self::LocationNotFound(msg.into())
    }

    pub fn invalid_time(msg: impl Into<String>) -> Self {
        Self::InvalidTime(msg.into())
    }

    pub fn policy_violation(msg: impl Into<String>) -> Self {
        Self::PolicyViolation(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn business_rule(msg: impl Into<String>) -> Self {
        Self::BusinessRule(msg.into())
    }

    pub fn database(msg: impl Into<String>) -> Self {
        Self::Database(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }
}
