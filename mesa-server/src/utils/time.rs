//! 时间工具函数 — 门店时区转换
//!
//! 所有日期→时间戳转换统一在 API handler / 引擎层完成，
//! repository 层只接收 `i64` Unix millis。
//!
//! 预订区间统一使用半开区间 `[start, end)` 语义。

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc};
use chrono_tz::Tz;

use super::{AppError, AppResult};

/// 解析日期字符串 (YYYY-MM-DD)
pub fn parse_date(date: &str) -> AppResult<NaiveDate> {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("Invalid date format: {}", date)))
}

/// Unix millis → 门店时区本地时间
pub fn to_local(millis: i64, tz: Tz) -> Option<DateTime<Tz>> {
    DateTime::<Utc>::from_timestamp_millis(millis).map(|dt| dt.with_timezone(&tz))
}

/// 日期 + 时分 → Unix millis (门店时区)
///
/// DST gap fallback: 如果本地时间不存在 (夏令时跳跃)，fallback 到 UTC。
pub fn date_hm_to_millis(date: NaiveDate, hour: u32, min: u32, tz: Tz) -> i64 {
    let naive = date
        .and_hms_opt(hour, min, 0)
        .unwrap_or_else(|| date.and_time(chrono::NaiveTime::default()));
    naive
        .and_local_timezone(tz)
        .latest()
        .map(|dt| dt.timestamp_millis())
        .unwrap_or_else(|| naive.and_utc().timestamp_millis())
}

/// 日期的营业窗口 `[当日 00:00, 次日 00:00)` → Unix millis (门店时区)
pub fn day_bounds_millis(date: NaiveDate, tz: Tz) -> (i64, i64) {
    let next_day = date.succ_opt().unwrap_or(date);
    (
        date_hm_to_millis(date, 0, 0, tz),
        date_hm_to_millis(next_day, 0, 0, tz),
    )
}

/// 本地化的预订时段：星期 + 从当日零点起算的分钟数
///
/// 跨午夜的预订 `end_minutes` 可以超过 1440，班次覆盖检查据此
/// 判断是否落在同一班次窗口内。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalSlot {
    /// 星期索引，0 = 周一 ... 6 = 周日
    pub weekday: u8,
    /// 起始分钟 (从当日 00:00 起算)
    pub start_minutes: i32,
    /// 结束分钟 (可能 > 1440)
    pub end_minutes: i32,
}

impl LocalSlot {
    /// 从 `[start, end)` Unix millis 构造本地时段
    ///
    /// 时间戳无法表示时返回 None (调用方视为无法覆盖)。
    pub fn from_millis(start: i64, end: i64, tz: Tz) -> Option<Self> {
        let local_start = to_local(start, tz)?;
        let weekday = local_start.weekday().num_days_from_monday() as u8;
        let start_minutes = (local_start.hour() * 60 + local_start.minute()) as i32;
        let duration_minutes = ((end - start) / 60_000) as i32;
        Some(Self {
            weekday,
            start_minutes,
            end_minutes: start_minutes + duration_minutes,
        })
    }
}
