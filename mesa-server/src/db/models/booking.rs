//! Booking Model (预订)
//!
//! 核心不变量：对任意物理桌台，状态为 `PENDING | CONFIRMED` 的预订
//! 两两区间互不重叠 (半开区间 `[start_time, end_time)`)。
//! 该不变量由 BookingRepository 的事务化写入保证。

use super::serde_helpers;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type BookingId = RecordId;

/// 预订状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    /// 已占座，等待押金确认
    Pending,
    /// 已确认
    Confirmed,
    /// 已取消
    Cancelled,
    /// 未到店
    NoShow,
    /// 已完成用餐
    Completed,
    /// 候补 (未分配桌台)
    Waitlist,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::Confirmed => "CONFIRMED",
            Self::Cancelled => "CANCELLED",
            Self::NoShow => "NO_SHOW",
            Self::Completed => "COMPLETED",
            Self::Waitlist => "WAITLIST",
        }
    }

    /// 是否占用桌台 (冲突检测只考虑这些状态)
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Pending | Self::Confirmed)
    }

    /// 终态预订不可变 (付款/退款簿记字段除外)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Cancelled | Self::NoShow | Self::Completed)
    }
}

/// 押金/付款状态
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// 无需押金
    NotRequired,
    /// 等待押金授权
    AwaitingDeposit,
    /// 押金已授权冻结
    DepositHeld,
    /// 押金已退还
    Refunded,
    /// 押金已没收 (迟取消/未到店)
    Forfeited,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotRequired => "NOT_REQUIRED",
            Self::AwaitingDeposit => "AWAITING_DEPOSIT",
            Self::DepositHeld => "DEPOSIT_HELD",
            Self::Refunded => "REFUNDED",
            Self::Forfeited => "FORFEITED",
        }
    }
}

/// Booking entity (预订记录)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<BookingId>,

    /// Location reference
    #[serde(with = "serde_helpers::record_id")]
    pub location: RecordId,

    /// 占用的物理桌台 (拼桌时多个；候补时为空)
    #[serde(default, with = "serde_helpers::vec_record_id")]
    pub tables: Vec<RecordId>,

    /// 开始时间 (Unix millis, inclusive)
    pub start_time: i64,

    /// 结束时间 (Unix millis, exclusive — 允许无缝翻台)
    pub end_time: i64,

    pub party_size: i32,

    #[serde(default = "default_status")]
    pub status: BookingStatus,

    #[serde(default = "default_payment_status")]
    pub payment_status: PaymentStatus,

    /// 应付押金金额 (None = 不收)
    pub deposit_amount: Option<Decimal>,

    /// 支付处理器的授权单号
    pub payment_hold_id: Option<String>,

    /// 幂等键 (全局唯一索引)
    pub idempotency_key: String,

    /// 对客确认码
    pub confirmation_code: String,

    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_email: Option<String>,
    pub note: Option<String>,

    pub created_at: Option<i64>,
    pub updated_at: Option<i64>,
    pub cancelled_at: Option<i64>,
}

fn default_status() -> BookingStatus {
    BookingStatus::Pending
}

fn default_payment_status() -> PaymentStatus {
    PaymentStatus::NotRequired
}

impl Booking {
    /// 预订 ID 字符串 ("booking:xyz")
    pub fn id_string(&self) -> String {
        self.id.as_ref().map(|id| id.to_string()).unwrap_or_default()
    }

    /// 是否占用了给定桌台
    pub fn occupies(&self, table_id: &RecordId) -> bool {
        self.tables.iter().any(|t| t == table_id)
    }
}

/// 新预订的写入草稿 — 由 Orchestrator 构造，Transaction Manager 提交
#[derive(Debug, Clone)]
pub struct BookingDraft {
    pub location: RecordId,
    pub tables: Vec<RecordId>,
    pub start_time: i64,
    pub end_time: i64,
    pub party_size: i32,
    pub status: BookingStatus,
    pub payment_status: PaymentStatus,
    pub deposit_amount: Option<Decimal>,
    pub idempotency_key: String,
    pub confirmation_code: String,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_email: Option<String>,
    pub note: Option<String>,
}
