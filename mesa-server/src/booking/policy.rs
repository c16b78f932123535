//! Policy Evaluator (预订策略评估)
//!
//! 纯函数：相同输入必得相同结果。"当前时间" 作为显式参数
//! `requested_at` 传入而非读取全局时钟，保证可测试性。
//!
//! 检查按序执行，fail fast，第一条违规即返回。

use super::error::{BookingError, BookingResult};
use crate::db::models::BookingPolicy;

const MILLIS_PER_HOUR: i64 = 60 * 60 * 1000;

/// 策略评估的请求视图
#[derive(Debug, Clone, Copy)]
pub struct PolicyRequest {
    /// 预订开始时间 (Unix millis)
    pub start_time: i64,
    /// 请求发起时间 (Unix millis) — 显式传入的 "now"
    pub requested_at: i64,
    pub party_size: i32,
}

/// 按序评估预订策略，无副作用
///
/// 1. 开始时间不得早于请求时间
/// 2. 不允许当日预订时，提前量必须 ≥ `cancellation_hours`
///    (复用取消窗口作为最小提前时间)
/// 3. 人数不得超过 `max_party_size` (若设置)
pub fn evaluate(policy: &BookingPolicy, request: &PolicyRequest) -> BookingResult<()> {
    if request.start_time < request.requested_at {
        return Err(BookingError::InvalidTime(
            "Booking start time is in the past".to_string(),
        ));
    }

    if !policy.allow_same_day {
        let lead_millis = request.start_time - request.requested_at;
        if lead_millis < policy.cancellation_hours * MILLIS_PER_HOUR {
            return Err(BookingError::PolicyViolation(format!(
                "Bookings require at least {} hours notice",
                policy.cancellation_hours
            )));
        }
    }

    if let Some(cap) = policy.max_party_size
        && request.party_size > cap
    {
        return Err(BookingError::PolicyViolation(format!(
            "Party size {} exceeds the maximum of {}",
            request.party_size, cap
        )));
    }

    Ok(())
}

/// 取消是否仍在押金退还窗口内
///
/// 距开始时间不足 `cancellation_hours` 的取消视为迟取消 (押金没收)。
pub fn within_refund_window(policy: &BookingPolicy, start_time: i64, requested_at: i64) -> bool {
    start_time - requested_at >= policy.cancellation_hours * MILLIS_PER_HOUR
}
