//! Shift Model (营业班次)
//!
//! 班次是周期性的接客窗口：星期集合 + 当日起止分钟。
//! 同一门店允许多个重叠班次 (午市 + 全天)。

use super::serde_helpers;
use crate::utils::time::LocalSlot;
use serde::{Deserialize, Serialize};
use surrealdb::RecordId;

pub type ShiftId = RecordId;

/// Shift entity (班次)
///
/// 不变量：`start_minutes < end_minutes`，且都在单日内 (0..=1440)。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shift {
    #[serde(default, with = "serde_helpers::option_record_id")]
    pub id: Option<ShiftId>,

    /// Location reference
    #[serde(with = "serde_helpers::record_id")]
    pub location: RecordId,

    pub name: String,

    /// 接客的星期集合，0 = 周一 ... 6 = 周日
    pub days: Vec<u8>,

    /// 窗口起始 (从当日 00:00 起算的分钟)
    pub start_minutes: i32,

    /// 窗口结束 (分钟，最大 1440)
    pub end_minutes: i32,

    /// 并行预订上限 (厨房吞吐量约束，与桌台数无关；None = 不限)
    pub max_parallel: Option<i32>,

    #[serde(default = "default_true", deserialize_with = "serde_helpers::bool_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl Shift {
    /// 班次是否完整覆盖本地时段 `[start, end)`
    pub fn covers(&self, slot: &LocalSlot) -> bool {
        self.days.contains(&slot.weekday)
            && self.start_minutes <= slot.start_minutes
            && slot.end_minutes <= self.end_minutes
    }
}

/// Create shift payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftCreate {
    #[serde(with = "serde_helpers::record_id")]
    pub location: RecordId,
    pub name: String,
    pub days: Vec<u8>,
    pub start_minutes: i32,
    pub end_minutes: i32,
    pub max_parallel: Option<i32>,
}

/// Update shift payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days: Option<Vec<u8>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_minutes: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_parallel: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}
