//! 预订引擎错误类型

use crate::db::repository::RepoError;
use crate::utils::AppError;

/// 预订引擎错误
///
/// 内部重试 (SlotTaken / TxnConflict) 对调用方不可见 —
/// 只有最终结果跨越 API 边界。
#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    #[error("Invalid time: {0}")]
    InvalidTime(String),

    #[error("Policy violation: {0}")]
    PolicyViolation(String),

    /// 无可用桌台 — 合法业务结果而非系统故障，
    /// 调用方据此区分候补引导与技术失败
    #[error("No availability for the requested slot")]
    NoAvailability,

    #[error("Validation failed: {0}")]
    Validation(String),

    /// 非法状态流转 (对终态预订执行操作等)
    #[error("Lifecycle violation: {0}")]
    Lifecycle(String),

    #[error("Storage error: {0}")]
    Storage(#[from] RepoError),
}

pub type BookingResult<T> = Result<T, BookingError>;

impl From<BookingError> for AppError {
    fn from(e: BookingError) -> Self {
        match e {
            BookingError::LocationNotFound(msg) => AppError::LocationNotFound(msg),
            BookingError::InvalidTime(msg) => AppError::InvalidTime(msg),
            BookingError::PolicyViolation(msg) => AppError::PolicyViolation(msg),
            BookingError::NoAvailability => AppError::NoAvailability,
            BookingError::Validation(msg) => AppError::Validation(msg),
            BookingError::Lifecycle(msg) => AppError::BusinessRule(msg),
            BookingError::Storage(repo) => match repo {
                RepoError::NotFound(msg) => AppError::NotFound(msg),
                RepoError::Duplicate(msg) => AppError::Conflict(msg),
                RepoError::Validation(msg) => AppError::Validation(msg),
                // 重试预算耗尽后残留的冲突：对外等价于抢不到座位
                RepoError::SlotTaken | RepoError::TxnConflict => AppError::NoAvailability,
                RepoError::Database(msg) => AppError::Database(msg),
            },
        }
    }
}
