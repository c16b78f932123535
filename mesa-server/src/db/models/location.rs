//! Location Model (门店)
//!
//! 门店持有预订策略 (内嵌对象) 与时区。门店只做软停用，
//! 历史预订仍引用它，永不硬删除。

use super::serde_helpers;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type LocationId = RecordId;

/// 押金计算模式
///
/// 原系统的 "PERCENT" 模式实际是按人头收费，这里用明确的
/// 枚举语义取代。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DepositType {
    /// 固定金额 (每单)
    Fixed,
    /// 按人头计费 (金额 × 人数)
    PerPerson,
}

/// 押金规则：达到人数阈值时要求押金
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DepositRule {
    /// 触发押金的最小人数
    pub min_party_size: i32,
    /// 计算模式
    pub deposit_type: DepositType,
    /// 金额 (FIXED: 每单；PER_PERSON: 每人)
    pub amount: Decimal,
}

/// 门店预订策略
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingPolicy {
    /// 是否允许当日预订
    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub allow_same_day: bool,

    /// 取消/提前预订窗口 (小时)
    ///
    /// 不允许当日预订时复用为最小提前时间；
    /// 取消时复用为押金退还窗口。
    #[serde(default = "default_cancellation_hours")]
    pub cancellation_hours: i64,

    /// 单次预订最大人数 (None = 不限)
    pub max_party_size: Option<i32>,

    /// 默认用餐时长 (分钟)，请求未携带 end_time 时用于推导
    #[serde(default = "default_duration_minutes")]
    pub default_duration_minutes: i64,

    /// 押金规则 (None = 不收押金)
    pub deposit: Option<DepositRule>,
}

fn default_cancellation_hours() -> i64 {
    2
}

fn default_duration_minutes() -> i64 {
    90
}

impl Default for BookingPolicy {
    fn default() -> Self {
        Self {
            allow_same_day: true,
            cancellation_hours: default_cancellation_hours(),
            max_party_size: None,
            default_duration_minutes: default_duration_minutes(),
            deposit: None,
        }
    }
}

/// Location entity (门店)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Location {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<LocationId>,

    pub name: String,

    /// IANA 时区名 (如 "Europe/Madrid")
    pub timezone: String,

    /// 预订策略 (内嵌)
    #[serde(default)]
    pub policy: BookingPolicy,

    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub is_active: bool,

    /// 是否对消费端可见
    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub is_public: bool,

    pub created_at: Option<i64>,
}

fn default_true() -> bool {
    true
}

impl Location {
    /// 门店时区，解析失败时 fallback 到 UTC
    pub fn tz(&self) -> Tz {
        self.timezone.parse().unwrap_or_else(|_| {
            tracing::warn!(timezone = %self.timezone, "Invalid location timezone, falling back to UTC");
            chrono_tz::UTC
        })
    }
}

/// Create location payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationCreate {
    pub name: String,
    pub timezone: String,
    #[serde(default)]
    pub policy: BookingPolicy,
    #[serde(default = "default_true")]
    pub is_public: bool,
}

/// Update location payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub policy: Option<BookingPolicy>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
}
