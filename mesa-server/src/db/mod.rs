//! Database Module
//!
//! 嵌入式 SurrealDB：生产环境 RocksDB 引擎，测试用内存引擎。
//! 两个引擎都是快照隔离 + 提交时写集校验，占座正确性依赖
//! booking 事务内的 table_claim 写入 (见 repository::booking)。
//! schema 启动时声明幂等键唯一索引与查询索引。

pub mod models;
pub mod repository;

use crate::utils::AppError;
use surrealdb::Surreal;
use surrealdb::engine::local::{Db, Mem, RocksDb};

const NAMESPACE: &str = "mesa";
const DATABASE: &str = "mesa";

/// Schema bootstrap — 幂等，可在每次启动时重放
const SCHEMA_SQL: &str = "\
DEFINE TABLE IF NOT EXISTS location SCHEMALESS; \
DEFINE TABLE IF NOT EXISTS dining_table SCHEMALESS; \
DEFINE TABLE IF NOT EXISTS shift SCHEMALESS; \
DEFINE TABLE IF NOT EXISTS booking SCHEMALESS; \
DEFINE TABLE IF NOT EXISTS table_claim SCHEMALESS; \
DEFINE INDEX IF NOT EXISTS idx_booking_idempotency ON TABLE booking COLUMNS idempotency_key UNIQUE; \
DEFINE INDEX IF NOT EXISTS idx_booking_location_start ON TABLE booking COLUMNS location, start_time; \
DEFINE INDEX IF NOT EXISTS idx_table_location ON TABLE dining_table COLUMNS location; \
DEFINE INDEX IF NOT EXISTS idx_shift_location ON TABLE shift COLUMNS location;";

/// Database service — owns the embedded SurrealDB handle
#[derive(Clone)]
pub struct DbService {
    pub db: Surreal<Db>,
}

impl DbService {
    /// Open (or create) the RocksDB-backed database at the given path
    pub async fn new(db_path: &str) -> Result<Self, AppError> {
        let db = Surreal::new::<RocksDb>(db_path)
            .await
            .map_err(|e| AppError::database(format!("Failed to open database: {e}")))?;
        Self::prepare(&db).await?;
        tracing::info!(path = %db_path, "Database connection established (SurrealDB/RocksDB)");
        Ok(Self { db })
    }

    /// In-memory database — 测试与一次性工具使用
    pub async fn new_in_memory() -> Result<Self, AppError> {
        let db = Surreal::new::<Mem>(())
            .await
            .map_err(|e| AppError::database(format!("Failed to open in-memory database: {e}")))?;
        Self::prepare(&db).await?;
        Ok(Self { db })
    }

    async fn prepare(db: &Surreal<Db>) -> Result<(), AppError> {
        db.use_ns(NAMESPACE)
            .use_db(DATABASE)
            .await
            .map_err(|e| AppError::database(format!("Failed to select namespace: {e}")))?;

        db.query(SCHEMA_SQL)
            .await
            .map_err(|e| AppError::database(format!("Failed to apply schema: {e}")))?
            .check()
            .map_err(|e| AppError::database(format!("Schema bootstrap failed: {e}")))?;
        tracing::debug!("Database schema applied");
        Ok(())
    }
}
