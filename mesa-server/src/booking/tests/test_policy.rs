//! 策略评估与退款窗口

use super::*;
use crate::booking::policy::{self, PolicyRequest};

fn request(start_time: i64, requested_at: i64, party_size: i32) -> PolicyRequest {
    PolicyRequest {
        start_time,
        requested_at,
        party_size,
    }
}

#[test]
fn rejects_start_in_the_past() {
    let policy = BookingPolicy::default();
    let result = policy::evaluate(&policy, &request(at(12, 0), at(13, 0), 2));
    assert!(matches!(result, Err(BookingError::InvalidTime(_))));
}

#[test]
fn same_day_allowed_by_default() {
    let policy = BookingPolicy::default();
    // 30 分钟后开始
    assert!(policy::evaluate(&policy, &request(at(9, 30), morning(), 2)).is_ok());
}

#[test]
fn same_day_disabled_enforces_lead_time() {
    let policy = BookingPolicy {
        allow_same_day: false,
        cancellation_hours: 4,
        ..BookingPolicy::default()
    };
    // 3 小时提前量 < 4 小时要求
    let result = policy::evaluate(&policy, &request(at(12, 0), morning(), 2));
    assert!(matches!(result, Err(BookingError::PolicyViolation(_))));

    // 恰好 4 小时 — 边界取闭
    assert!(policy::evaluate(&policy, &request(at(13, 0), morning(), 2)).is_ok());
}

#[test]
fn party_size_cap() {
    let policy = BookingPolicy {
        max_party_size: Some(8),
        ..BookingPolicy::default()
    };
    assert!(policy::evaluate(&policy, &request(at(20, 0), morning(), 8)).is_ok());
    let result = policy::evaluate(&policy, &request(at(20, 0), morning(), 9));
    assert!(matches!(result, Err(BookingError::PolicyViolation(_))));
}

#[test]
fn refund_window_boundary() {
    let policy = BookingPolicy {
        cancellation_hours: 2,
        ..BookingPolicy::default()
    };
    let start = at(20, 0);
    // 提前 2 小时整取消：可退
    assert!(policy::within_refund_window(&policy, start, at(18, 0)));
    // 提前不足 2 小时：没收
    assert!(!policy::within_refund_window(&policy, start, at(18, 1)));
}
