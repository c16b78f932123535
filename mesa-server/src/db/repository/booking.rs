//! Booking Repository
//!
//! 预订记录的读写。核心是 [`BookingRepository::insert_atomic`]：
//! 在单个存储事务内复查冲突并写入，是整个系统唯一的串行化点
//! (见 booking::txn)。应用层不持有任何互斥锁 — 服务是无状态
//! 水平扩展的，进程内锁不构成互斥。

use super::{BaseRepository, RepoError, RepoResult};
use crate::db::models::{Booking, BookingDraft, BookingStatus, PaymentStatus};
use surrealdb::engine::local::Db;
use surrealdb::{RecordId, Surreal};
use uuid::Uuid;

/// 事务化写入：在同一事务内复查目标桌台的占用情况，
/// 有并发预订抢先占座时 THROW 哨兵错误使整个事务回滚。
///
/// 冲突判定为半开区间重叠：`start < $end AND end > $start`，
/// 相接的时段 (上一单 end == 下一单 start) 不冲突，支持无缝翻台。
/// 候补预订 `tables` 为空，CONTAINSANY 恒为假，天然跳过占座检查。
///
/// 嵌入式引擎 (Mem / RocksDB) 是快照隔离，提交时只校验写集：
/// 两个并发事务都能通过 $clash 复查。因此每张目标桌台还要
/// UPSERT 一条 table_claim 记录 — 抢同一张桌的事务写集必然相交，
/// 后提交者被引擎以写写冲突拒绝，走 TxnConflict 重试路径。
const INSERT_BOOKING_SQL: &str = "\
BEGIN TRANSACTION; \
LET $clash = ( \
    SELECT VALUE id FROM booking \
    WHERE location = $location \
      AND status IN ['PENDING', 'CONFIRMED'] \
      AND start_time < $end_time \
      AND end_time > $start_time \
      AND tables CONTAINSANY $tables \
); \
IF array::len($clash) > 0 { THROW 'SLOT_TAKEN' }; \
FOR $table IN $tables { \
    UPSERT type::thing('table_claim', record::id($table)) SET \
        last_booking = $booking_id, \
        claimed_at = $now; \
}; \
CREATE type::thing('booking', $booking_id) CONTENT { \
    location: $location, \
    tables: $tables, \
    start_time: $start_time, \
    end_time: $end_time, \
    party_size: $party_size, \
    status: $status, \
    payment_status: $payment_status, \
    deposit_amount: $deposit_amount, \
    payment_hold_id: NONE, \
    idempotency_key: $idempotency_key, \
    confirmation_code: $confirmation_code, \
    guest_name: $guest_name, \
    guest_phone: $guest_phone, \
    guest_email: $guest_email, \
    note: $note, \
    created_at: $now, \
    updated_at: $now, \
    cancelled_at: NONE \
}; \
COMMIT TRANSACTION;";

#[derive(Clone)]
pub struct BookingRepository {
    base: BaseRepository,
}

impl BookingRepository {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    /// Find booking by id
    pub async fn find_by_id(&self, id: &str) -> RepoResult<Option<Booking>> {
        let thing = self.base.parse_id(id)?;
        let booking: Option<Booking> = self.base.db().select(thing).await?;
        Ok(booking)
    }

    /// Find booking by idempotency key (幂等重放入口)
    pub async fn find_by_idempotency_key(&self, key: &str) -> RepoResult<Option<Booking>> {
        let mut result = self
            .base
            .db()
            .query("SELECT * FROM booking WHERE idempotency_key = $key LIMIT 1")
            .bind(("key", key.to_string()))
            .await?;
        let bookings: Vec<Booking> = result.take(0)?;
        Ok(bookings.into_iter().next())
    }

    /// 查询与窗口 `[window_start, window_end)` 重叠的占座预订
    /// (PENDING | CONFIRMED)
    ///
    /// 重叠谓词天然覆盖前一天开始、跨午夜未结束的预订。
    pub async fn find_blocking_overlapping(
        &self,
        location: &RecordId,
        window_start: i64,
        window_end: i64,
    ) -> RepoResult<Vec<Booking>> {
        let bookings: Vec<Booking> = self
            .base
            .db()
            .query(
                "SELECT * FROM booking \
                 WHERE location = $location \
                   AND status IN ['PENDING', 'CONFIRMED'] \
                   AND start_time < $window_end \
                   AND end_time > $window_start \
                 ORDER BY start_time",
            )
            .bind(("location", location.clone()))
            .bind(("window_start", window_start))
            .bind(("window_end", window_end))
            .await?
            .take(0)?;
        Ok(bookings)
    }

    /// 查询窗口内的所有预订 (不分状态，管理端列表)
    pub async fn find_by_location_window(
        &self,
        location: &RecordId,
        window_start: i64,
        window_end: i64,
    ) -> RepoResult<Vec<Booking>> {
        let bookings: Vec<Booking> = self
            .base
            .db()
            .query(
                "SELECT * FROM booking \
                 WHERE location = $location \
                   AND start_time < $window_end \
                   AND end_time > $window_start \
                 ORDER BY start_time",
            )
            .bind(("location", location.clone()))
            .bind(("window_start", window_start))
            .bind(("window_end", window_end))
            .await?
            .take(0)?;
        Ok(bookings)
    }

    /// 事务化写入新预订
    ///
    /// 错误语义：
    /// - [`RepoError::SlotTaken`] — 事务内复查命中并发占座，调用方重跑
    ///   plan → commit 回路
    /// - [`RepoError::TxnConflict`] — 存储层序列化冲突，同样可重试
    /// - [`RepoError::Duplicate`] — 幂等键唯一索引命中，调用方按重放处理
    pub async fn insert_atomic(&self, draft: &BookingDraft, now: i64) -> RepoResult<Booking> {
        let booking_id = Uuid::new_v4().simple().to_string();

        let result = self
            .base
            .db()
            .query(INSERT_BOOKING_SQL)
            .bind(("booking_id", booking_id))
            .bind(("location", draft.location.clone()))
            .bind(("tables", draft.tables.clone()))
            .bind(("start_time", draft.start_time))
            .bind(("end_time", draft.end_time))
            .bind(("party_size", draft.party_size))
            .bind(("status", draft.status.as_str().to_string()))
            .bind(("payment_status", draft.payment_status.as_str().to_string()))
            .bind(("deposit_amount", draft.deposit_amount))
            .bind(("idempotency_key", draft.idempotency_key.clone()))
            .bind(("confirmation_code", draft.confirmation_code.clone()))
            .bind(("guest_name", draft.guest_name.clone()))
            .bind(("guest_phone", draft.guest_phone.clone()))
            .bind(("guest_email", draft.guest_email.clone()))
            .bind(("note", draft.note.clone()))
            .bind(("now", now))
            .await?;

        if let Err(e) = result.check() {
            return Err(Self::classify_commit_error(e));
        }

        self.find_by_idempotency_key(&draft.idempotency_key)
            .await?
            .ok_or_else(|| RepoError::Database("Booking vanished after commit".to_string()))
    }

    /// 提交错误分类：哨兵 → SlotTaken，唯一索引 → Duplicate，
    /// 事务提交失败 → TxnConflict，其余为数据库错误
    ///
    /// 优先匹配引擎的类型化错误 — table_claim 写写冲突落在
    /// `QueryNotExecuted` / `TxRetryable` 上，必须识别为可重试，
    /// 否则重试路径退化成对外 500。
    fn classify_commit_error(e: surrealdb::Error) -> RepoError {
        use surrealdb::error::Db;

        if let surrealdb::Error::Db(db_err) = &e {
            match db_err {
                Db::Thrown(msg) if msg.contains("SLOT_TAKEN") => return RepoError::SlotTaken,
                Db::IndexExists { .. } => return RepoError::Duplicate(db_err.to_string()),
                Db::QueryNotExecuted
                | Db::QueryNotExecutedDetail { .. }
                | Db::TxFailure
                | Db::TxRetryable => return RepoError::TxnConflict,
                _ => {}
            }
        }

        // 远端/未来引擎把错误降级成字符串时的兜底
        let msg = e.to_string();
        if msg.contains("SLOT_TAKEN") {
            RepoError::SlotTaken
        } else if msg.contains("already contains") {
            RepoError::Duplicate(msg)
        } else if msg.contains("failed transaction")
            || msg.contains("conflict")
            || msg.contains("retried")
        {
            RepoError::TxnConflict
        } else {
            RepoError::Database(msg)
        }
    }

    /// 条件状态流转：仅当当前状态在 `expected` 中时更新
    ///
    /// 状态与随附的付款字段在同一条条件 UPDATE 内落库 —
    /// 两次写之间的进程崩溃不会留下 CONFIRMED + AWAITING_DEPOSIT
    /// 这类撕裂状态。`payment` 为 None 时付款字段保持原值。
    ///
    /// 条件不满足返回 [`RepoError::TxnConflict`] (并发修改了状态)，
    /// 记录不存在返回 [`RepoError::NotFound`]。流转合法性由
    /// booking 引擎在调用前判定，这里只做原子护栏。
    pub async fn transition_status(
        &self,
        id: &str,
        expected: &[BookingStatus],
        to: BookingStatus,
        now: i64,
        cancelled_at: Option<i64>,
        payment: Option<(PaymentStatus, Option<String>)>,
    ) -> RepoResult<Booking> {
        let thing = self.base.parse_id(id)?;
        let expected: Vec<String> = expected.iter().map(|s| s.as_str().to_string()).collect();
        let (payment_status, hold_id) = match payment {
            Some((status, hold)) => (Some(status.as_str().to_string()), hold),
            None => (None, None),
        };

        let mut result = self
            .base
            .db()
            .query(
                "UPDATE $thing SET status = $to, updated_at = $now, \
                 cancelled_at = $cancelled_at ?? cancelled_at, \
                 payment_status = $payment_status ?? payment_status, \
                 payment_hold_id = $hold_id ?? payment_hold_id \
                 WHERE status IN $expected RETURN AFTER",
            )
            .bind(("thing", thing))
            .bind(("to", to.as_str().to_string()))
            .bind(("now", now))
            .bind(("cancelled_at", cancelled_at))
            .bind(("payment_status", payment_status))
            .bind(("hold_id", hold_id))
            .bind(("expected", expected))
            .await?;
        let updated: Vec<Booking> = result.take(0)?;

        match updated.into_iter().next() {
            Some(b) => Ok(b),
            None => {
                if self.find_by_id(id).await?.is_some() {
                    Err(RepoError::TxnConflict)
                } else {
                    Err(RepoError::NotFound(format!("Booking {} not found", id)))
                }
            }
        }
    }

    /// 更新付款簿记字段 (终态预订也允许，退款记录需要)
    pub async fn set_payment_state(
        &self,
        id: &str,
        payment_status: PaymentStatus,
        hold_id: Option<String>,
        now: i64,
    ) -> RepoResult<()> {
        let thing = self.base.parse_id(id)?;
        self.base
            .db()
            .query(
                "UPDATE $thing SET payment_status = $payment_status, \
                 payment_hold_id = $hold_id ?? payment_hold_id, updated_at = $now",
            )
            .bind(("thing", thing))
            .bind(("payment_status", payment_status.as_str().to_string()))
            .bind(("hold_id", hold_id))
            .bind(("now", now))
            .await?;
        Ok(())
    }
}
