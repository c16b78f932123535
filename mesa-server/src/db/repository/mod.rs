//! Repository Module
//!
//! Provides CRUD operations for SurrealDB tables.

pub mod booking;
pub mod dining_table;
pub mod location;
pub mod shift;

// Re-exports
pub use booking::BookingRepository;
pub use dining_table::DiningTableRepository;
pub use location::LocationRepository;
pub use shift::ShiftRepository;

use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    /// 并发请求抢先占用了目标时段 (事务内复查命中)
    #[error("Slot already taken by a concurrent booking")]
    SlotTaken,

    /// 存储层序列化冲突 — 可重试
    #[error("Transaction conflict, retryable")]
    TxnConflict,

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

impl RepoError {
    /// 调用方应重跑 plan → commit 回路的错误
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::SlotTaken | Self::TxnConflict)
    }
}

impl From<surrealdb::Error> for RepoError {
    fn from(err: surrealdb::Error) -> Self {
        RepoError::Database(err.to_string())
    }
}

impl From<RepoError> for crate::utils::AppError {
    fn from(err: RepoError) -> Self {
        use crate::utils::AppError;
        match err {
            RepoError::NotFound(msg) => AppError::NotFound(msg),
            RepoError::Duplicate(msg) => AppError::Conflict(msg),
            RepoError::Validation(msg) => AppError::Validation(msg),
            // 竞争类错误到达 HTTP 层说明重试预算已在引擎内耗尽
            RepoError::SlotTaken | RepoError::TxnConflict => AppError::NoAvailability,
            RepoError::Database(msg) => AppError::Database(msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

// =============================================================================
// ID Convention: 全栈统一使用 "table:id" 格式
// =============================================================================
//
// 使用 surrealdb::RecordId 处理所有 ID：
//   - 解析: let id: RecordId = "booking:abc".parse()?;
//   - 创建: let id = RecordId::from_table_key("booking", "abc");
//   - 获取表名: id.table()
//   - 获取纯ID: id.key().to_string()
//   - CRUD: db.select(id) / db.delete(id) 直接使用 RecordId

/// Base repository with database reference
#[derive(Clone)]
pub struct BaseRepository {
    db: Surreal<Db>,
}

impl BaseRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self { db }
    }

    pub fn db(&self) -> &Surreal<Db> {
        &self.db
    }

    /// 解析 "table:id" 字符串为 RecordId
    pub fn parse_id(&self, id: &str) -> RepoResult<surrealdb::RecordId> {
        id.parse()
            .map_err(|_| RepoError::Validation(format!("Invalid ID: {}", id)))
    }
}
