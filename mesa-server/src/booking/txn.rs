//! Reservation Transaction Manager (预订事务管理)
//!
//! 占座写入的唯一入口。写入在存储事务内复查目标桌台占用
//! (经典 read-then-write 竞态的闭环)，三种出口：
//!
//! - `Created` — 占座成功
//! - `Replayed` — 幂等键唯一索引命中，返回已有预订
//! - `SlotTaken` — 并发抢占或序列化冲突，调用方重跑整个
//!   plan → commit 回路
//!
//! 重试次数有界且对调用方不可见 (见 orchestrator)。

use crate::db::models::{Booking, BookingDraft};
use crate::db::repository::{BookingRepository, RepoError, RepoResult};
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// 单次提交的结果
#[derive(Debug)]
pub enum CommitOutcome {
    /// 新预订已落库
    Created(Booking),
    /// 幂等重放 — 返回已存在的预订，未产生新记录
    Replayed(Booking),
    /// 时段被并发请求抢占 (或存储层序列化冲突)，可重试
    SlotTaken,
}

/// 预订事务管理器
#[derive(Clone)]
pub struct ReservationTxn {
    repo: BookingRepository,
}

impl ReservationTxn {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            repo: BookingRepository::new(db),
        }
    }

    /// 提交预订草稿
    ///
    /// 幂等键冲突不是错误：并发的重复请求在唯一索引上相遇时，
    /// 败者读出胜者的记录按重放返回。
    pub async fn commit(&self, draft: &BookingDraft, now: i64) -> RepoResult<CommitOutcome> {
        match self.repo.insert_atomic(draft, now).await {
            Ok(booking) => Ok(CommitOutcome::Created(booking)),
            Err(e) if e.is_retryable() => {
                tracing::debug!(
                    idempotency_key = %draft.idempotency_key,
                    "Commit lost the slot race, caller will replan"
                );
                Ok(CommitOutcome::SlotTaken)
            }
            Err(RepoError::Duplicate(_)) => {
                let existing = self
                    .repo
                    .find_by_idempotency_key(&draft.idempotency_key)
                    .await?
                    .ok_or_else(|| {
                        RepoError::Database(
                            "Idempotency index hit but booking not readable".to_string(),
                        )
                    })?;
                Ok(CommitOutcome::Replayed(existing))
            }
            Err(e) => Err(e),
        }
    }
}
