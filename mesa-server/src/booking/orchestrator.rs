//! Booking Orchestrator (预订编排)
//!
//! API 层的唯一入口，串联整条链路：
//!
//! ```text
//! create_booking(input, requested_at)
//!     ├─ 1. 基础校验 (人数、幂等键、时间)
//!     ├─ 2. 幂等短路 (重复键 + 相同载荷 → 返回原预订)
//!     ├─ 3. 加载门店 + 策略
//!     ├─ 4. Policy Evaluator (fail fast)
//!     ├─ 5. 循环 (有界重试):
//!     │      Availability Index → Allocation Planner → ReservationTxn
//!     │      SlotTaken → 重跑整轮; 预算耗尽 → NO_AVAILABILITY
//!     └─ 6. 提交成功后才发起押金授权 — 支付失败不回滚占座
//! ```

use std::sync::Arc;

use chrono::Utc;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;
use uuid::Uuid;

use super::availability::AvailabilityIndex;
use super::deposit;
use super::error::{BookingError, BookingResult};
use super::payment::PaymentGateway;
use super::planner::{self, PlanOutcome, SeatingUnit, SlotRequest};
use super::policy::{self, PolicyRequest};
use super::txn::{CommitOutcome, ReservationTxn};
use crate::db::models::{Booking, BookingDraft, BookingStatus, PaymentStatus};
use crate::db::repository::{BookingRepository, LocationRepository};
use crate::utils::time;

/// 默认提交重试预算 — 部署可按竞争特征调整 (Config 覆盖)
pub const DEFAULT_COMMIT_RETRIES: usize = 3;

/// 创建预订的输入
#[derive(Debug, Clone)]
pub struct CreateBookingInput {
    pub location_id: String,
    pub start_time: i64,
    /// 缺省时按策略默认时长推导
    pub end_time: Option<i64>,
    pub party_size: i32,
    pub idempotency_key: String,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_email: Option<String>,
    pub note: Option<String>,
    /// 无可用时转入候补而非拒绝
    pub join_waitlist: bool,
}

/// 创建预订的结果
#[derive(Debug, Clone, serde::Serialize)]
pub struct BookingConfirmation {
    pub booking_id: String,
    pub status: BookingStatus,
    pub table_ids: Vec<String>,
    pub payment_required: bool,
    pub confirmation_code: String,
    /// 幂等重放 (handler 据此返回 200 而非 201)
    #[serde(skip_serializing)]
    pub replayed: bool,
}

impl BookingConfirmation {
    fn from_booking(booking: &Booking, replayed: bool) -> Self {
        Self {
            booking_id: booking.id_string(),
            status: booking.status,
            table_ids: booking.tables.iter().map(|t| t.to_string()).collect(),
            payment_required: booking.deposit_amount.is_some(),
            confirmation_code: booking.confirmation_code.clone(),
            replayed,
        }
    }
}

/// 预订服务 — 无状态，可水平扩展；存储事务是唯一串行化点
pub struct BookingService {
    locations: LocationRepository,
    bookings: BookingRepository,
    availability: AvailabilityIndex,
    txn: ReservationTxn,
    payment: Arc<dyn PaymentGateway>,
    currency: String,
    commit_retries: usize,
}

impl BookingService {
    pub fn new(db: Surreal<Db>, payment: Arc<dyn PaymentGateway>) -> Self {
        Self {
            locations: LocationRepository::new(db.clone()),
            bookings: BookingRepository::new(db.clone()),
            availability: AvailabilityIndex::new(db.clone()),
            txn: ReservationTxn::new(db),
            payment,
            currency: "EUR".to_string(),
            commit_retries: DEFAULT_COMMIT_RETRIES,
        }
    }

    /// 覆盖提交重试预算 (测试高并发场景时调大)
    pub fn with_commit_retries(mut self, retries: usize) -> Self {
        self.commit_retries = retries.max(1);
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// 创建预订 — 见模块文档的链路图
    pub async fn create_booking(
        &self,
        input: CreateBookingInput,
        requested_at: i64,
    ) -> BookingResult<BookingConfirmation> {
        self.validate_input(&input)?;

        // 幂等短路：同键先查，避免走完整链路
        if let Some(existing) = self
            .bookings
            .find_by_idempotency_key(&input.idempotency_key)
            .await?
        {
            return Self::replay(&input, existing);
        }

        let location = self
            .locations
            .find_active(&input.location_id)
            .await?
            .ok_or_else(|| BookingError::LocationNotFound(input.location_id.clone()))?;
        let location_id = location
            .id
            .clone()
            .ok_or_else(|| BookingError::Validation("Location record has no id".to_string()))?;

        let end_time = input.end_time.unwrap_or(
            input.start_time + location.policy.default_duration_minutes * 60_000,
        );
        if end_time <= input.start_time {
            return Err(BookingError::InvalidTime(
                "Booking end must be after start".to_string(),
            ));
        }

        policy::evaluate(
            &location.policy,
            &PolicyRequest {
                start_time: input.start_time,
                requested_at,
                party_size: input.party_size,
            },
        )?;

        let deposit_amount = deposit::deposit_due(&location.policy, input.party_size);
        let slot = SlotRequest {
            start_time: input.start_time,
            end_time,
            party_size: input.party_size,
        };

        // plan → commit 回路：快照过期导致的抢座失败触发整轮重跑
        for attempt in 1..=self.commit_retries {
            let snapshot = self.availability.load(&location, slot.start_time, slot.end_time).await?;

            let unit = match planner::plan(&snapshot, &slot, location.tz()) {
                PlanOutcome::Seated(unit) => Some(unit),
                PlanOutcome::NoAvailability if input.join_waitlist => None,
                PlanOutcome::NoAvailability => {
                    // 抢光座位的可能正是同键的并发孪生请求
                    if let Some(existing) = self
                        .bookings
                        .find_by_idempotency_key(&input.idempotency_key)
                        .await?
                    {
                        return Self::replay(&input, existing);
                    }
                    return Err(BookingError::NoAvailability);
                }
            };

            let draft =
                self.build_draft(location_id.clone(), &input, &slot, unit.as_ref(), deposit_amount);
            match self.txn.commit(&draft, Utc::now().timestamp_millis()).await? {
                CommitOutcome::Created(booking) => {
                    tracing::info!(
                        booking_id = %booking.id_string(),
                        location = %input.location_id,
                        party_size = input.party_size,
                        status = booking.status.as_str(),
                        attempt,
                        "Booking committed"
                    );
                    self.initiate_deposit_hold(&booking).await;
                    return Ok(BookingConfirmation::from_booking(&booking, false));
                }
                CommitOutcome::Replayed(existing) => return Self::replay(&input, existing),
                CommitOutcome::SlotTaken => {
                    // 同键孪生请求赢得竞争时按重放返回，而非重规划
                    if let Some(existing) = self
                        .bookings
                        .find_by_idempotency_key(&input.idempotency_key)
                        .await?
                    {
                        return Self::replay(&input, existing);
                    }
                    tracing::debug!(
                        location = %input.location_id,
                        attempt,
                        "Slot contention, replanning"
                    );
                    continue;
                }
            }
        }

        // 预算耗尽：从调用方视角时段已被抢光
        if let Some(existing) = self
            .bookings
            .find_by_idempotency_key(&input.idempotency_key)
            .await?
        {
            return Self::replay(&input, existing);
        }
        tracing::warn!(
            location = %input.location_id,
            retries = self.commit_retries,
            "Commit retry budget exhausted, surfacing NO_AVAILABILITY"
        );
        Err(BookingError::NoAvailability)
    }

    fn validate_input(&self, input: &CreateBookingInput) -> BookingResult<()> {
        if input.party_size < 1 {
            return Err(BookingError::Validation(
                "Party size must be at least 1".to_string(),
            ));
        }
        if input.idempotency_key.trim().is_empty() {
            return Err(BookingError::Validation(
                "Idempotency key is required".to_string(),
            ));
        }
        if input.start_time <= 0 {
            return Err(BookingError::InvalidTime(
                "Start time is not a valid timestamp".to_string(),
            ));
        }
        Ok(())
    }

    /// 幂等重放：载荷必须与原请求一致，否则是键误用
    fn replay(input: &CreateBookingInput, existing: Booking) -> BookingResult<BookingConfirmation> {
        let matches = existing.location.to_string() == input.location_id
            && existing.start_time == input.start_time
            && existing.party_size == input.party_size;
        if !matches {
            return Err(BookingError::Validation(
                "Idempotency key was already used with a different payload".to_string(),
            ));
        }
        tracing::info!(
            booking_id = %existing.id_string(),
            idempotency_key = %input.idempotency_key,
            "Idempotent replay, returning original booking"
        );
        Ok(BookingConfirmation::from_booking(&existing, true))
    }

    fn build_draft(
        &self,
        location_id: surrealdb::RecordId,
        input: &CreateBookingInput,
        slot: &SlotRequest,
        unit: Option<&SeatingUnit>,
        deposit_amount: Option<rust_decimal::Decimal>,
    ) -> BookingDraft {
        let (tables, status, payment_status, deposit) = match unit {
            Some(unit) => {
                let status = if deposit_amount.is_some() {
                    BookingStatus::Pending
                } else {
                    BookingStatus::Confirmed
                };
                let payment_status = if deposit_amount.is_some() {
                    PaymentStatus::AwaitingDeposit
                } else {
                    PaymentStatus::NotRequired
                };
                (unit.table_ids(), status, payment_status, deposit_amount)
            }
            // 候补：不占桌台、不收押金
            None => (
                Vec::new(),
                BookingStatus::Waitlist,
                PaymentStatus::NotRequired,
                None,
            ),
        };

        BookingDraft {
            location: location_id,
            tables,
            start_time: slot.start_time,
            end_time: slot.end_time,
            party_size: slot.party_size,
            status,
            payment_status,
            deposit_amount: deposit,
            idempotency_key: input.idempotency_key.clone(),
            confirmation_code: generate_confirmation_code(),
            guest_name: input.guest_name.clone(),
            guest_phone: input.guest_phone.clone(),
            guest_email: input.guest_email.clone(),
            note: input.note.clone(),
        }
    }

    /// 占座提交之后的押金授权 — 失败不回滚预订，
    /// 预订保持 PENDING，支付可独立重试
    async fn initiate_deposit_hold(&self, booking: &Booking) {
        let Some(amount) = booking.deposit_amount else {
            return;
        };
        let booking_id = booking.id_string();
        match self
            .payment
            .create_deposit_hold(&booking_id, amount, &self.currency)
            .await
        {
            Ok(hold) => {
                if let Err(e) = self
                    .bookings
                    .set_payment_state(
                        &booking_id,
                        PaymentStatus::AwaitingDeposit,
                        Some(hold.hold_id),
                        Utc::now().timestamp_millis(),
                    )
                    .await
                {
                    tracing::error!(booking_id = %booking_id, error = %e, "Failed to record payment hold id");
                }
            }
            Err(e) => {
                tracing::warn!(
                    booking_id = %booking_id,
                    error = %e,
                    "Deposit hold initiation failed, booking stays PENDING for payment retry"
                );
            }
        }
    }

    // ── 生命周期操作 ────────────────────────────────────────────────

    /// 取消预订，按取消窗口评估押金退还
    pub async fn cancel_booking(&self, id: &str, requested_at: i64) -> BookingResult<Booking> {
        let booking = self.fetch(id).await?;
        if booking.status.is_terminal() {
            return Err(BookingError::Lifecycle(format!(
                "Booking is already {}",
                booking.status.as_str()
            )));
        }

        let location = self
            .locations
            .find_by_id(&booking.location.to_string())
            .await?;
        let refundable = location
            .map(|l| policy::within_refund_window(&l.policy, booking.start_time, requested_at))
            .unwrap_or(false);

        // 押金结局和状态在同一条条件 UPDATE 内落库
        let deposit_held = booking.payment_status == PaymentStatus::DepositHeld;
        let payment = deposit_held.then(|| {
            let next = if refundable {
                PaymentStatus::Refunded
            } else {
                PaymentStatus::Forfeited
            };
            (next, None)
        });

        let cancelled = self
            .bookings
            .transition_status(
                id,
                &[
                    BookingStatus::Pending,
                    BookingStatus::Confirmed,
                    BookingStatus::Waitlist,
                ],
                BookingStatus::Cancelled,
                requested_at,
                Some(requested_at),
                payment,
            )
            .await?;

        // 授权释放放在状态落库之后，失败只记录，人工补退
        if deposit_held
            && refundable
            && let Some(hold_id) = booking.payment_hold_id.as_deref()
            && let Err(e) = self.payment.release_deposit_hold(hold_id).await
        {
            tracing::warn!(booking_id = %id, error = %e, "Deposit release failed, will need manual refund");
        }

        tracing::info!(booking_id = %id, refundable, "Booking cancelled");
        Ok(cancelled)
    }

    /// 标记未到店 — 仅在预订窗口结束后允许
    pub async fn mark_no_show(&self, id: &str, requested_at: i64) -> BookingResult<Booking> {
        let booking = self.fetch(id).await?;
        if !booking.status.is_blocking() {
            return Err(BookingError::Lifecycle(format!(
                "Cannot mark a {} booking as no-show",
                booking.status.as_str()
            )));
        }
        if requested_at < booking.end_time {
            return Err(BookingError::Lifecycle(
                "Cannot mark no-show before the booking window has elapsed".to_string(),
            ));
        }
        let payment = (booking.payment_status == PaymentStatus::DepositHeld)
            .then_some((PaymentStatus::Forfeited, None));
        self.bookings
            .transition_status(
                id,
                &[BookingStatus::Pending, BookingStatus::Confirmed],
                BookingStatus::NoShow,
                requested_at,
                None,
                payment,
            )
            .await
            .map_err(Into::into)
    }

    /// 用餐完成
    pub async fn complete_booking(&self, id: &str, requested_at: i64) -> BookingResult<Booking> {
        let booking = self.fetch(id).await?;
        if booking.status != BookingStatus::Confirmed {
            return Err(BookingError::Lifecycle(format!(
                "Only confirmed bookings can be completed (current: {})",
                booking.status.as_str()
            )));
        }
        self.bookings
            .transition_status(
                id,
                &[BookingStatus::Confirmed],
                BookingStatus::Completed,
                requested_at,
                None,
                None,
            )
            .await
            .map_err(Into::into)
    }

    /// 押金授权成功回调：PENDING → CONFIRMED
    pub async fn confirm_deposit(
        &self,
        id: &str,
        hold_id: Option<String>,
        requested_at: i64,
    ) -> BookingResult<Booking> {
        let booking = self.fetch(id).await?;
        if booking.status != BookingStatus::Pending {
            return Err(BookingError::Lifecycle(format!(
                "Deposit can only be confirmed on a pending booking (current: {})",
                booking.status.as_str()
            )));
        }
        // 状态与押金字段同写：不存在 CONFIRMED + AWAITING_DEPOSIT 的窗口
        self.bookings
            .transition_status(
                id,
                &[BookingStatus::Pending],
                BookingStatus::Confirmed,
                requested_at,
                None,
                Some((PaymentStatus::DepositHeld, hold_id)),
            )
            .await
            .map_err(Into::into)
    }

    /// 可用性试算 (dry-run plan，不落库)
    pub async fn probe_availability(
        &self,
        location_id: &str,
        start_time: i64,
        end_time: Option<i64>,
        party_size: i32,
    ) -> BookingResult<Option<Vec<String>>> {
        let location = self
            .locations
            .find_active(location_id)
            .await?
            .ok_or_else(|| BookingError::LocationNotFound(location_id.to_string()))?;
        let end_time =
            end_time.unwrap_or(start_time + location.policy.default_duration_minutes * 60_000);
        let snapshot = self.availability.load(&location, start_time, end_time).await?;
        let slot = SlotRequest {
            start_time,
            end_time,
            party_size,
        };
        Ok(match planner::plan(&snapshot, &slot, location.tz()) {
            PlanOutcome::Seated(unit) => Some(
                unit.table_ids()
                    .iter()
                    .map(|id| id.to_string())
                    .collect(),
            ),
            PlanOutcome::NoAvailability => None,
        })
    }

    /// 按门店本地营业日列出全部预订 (管理端视图)
    pub async fn list_for_date(
        &self,
        location_id: &str,
        date: &str,
    ) -> BookingResult<Vec<Booking>> {
        let location = self
            .locations
            .find_by_id(location_id)
            .await?
            .ok_or_else(|| BookingError::LocationNotFound(location_id.to_string()))?;
        let location_ref = location
            .id
            .clone()
            .ok_or_else(|| BookingError::Validation("Location record has no id".to_string()))?;
        let day = time::parse_date(date)
            .map_err(|_| BookingError::InvalidTime(format!("Invalid date: {}", date)))?;
        let (day_start, day_end) = time::day_bounds_millis(day, location.tz());
        self.bookings
            .find_by_location_window(&location_ref, day_start, day_end)
            .await
            .map_err(Into::into)
    }

    /// 查单个预订
    pub async fn get_booking(&self, id: &str) -> BookingResult<Booking> {
        self.fetch(id).await
    }

    async fn fetch(&self, id: &str) -> BookingResult<Booking> {
        self.bookings
            .find_by_id(id)
            .await?
            .ok_or_else(|| BookingError::Storage(crate::db::repository::RepoError::NotFound(
                format!("Booking {} not found", id),
            )))
    }
}

/// 对客确认码：8 位大写短码
fn generate_confirmation_code() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_uppercase()
}
