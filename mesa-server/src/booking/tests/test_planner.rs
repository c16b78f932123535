//! 分配规划器 — 纯快照测试，不触库

use super::*;
use crate::booking::planner;
use crate::db::models::{Booking, BookingStatus, PaymentStatus};
use surrealdb::RecordId;

fn loc_ref() -> RecordId {
    RecordId::from_table_key("location", "test")
}

fn table(key: &str, min_capacity: i32, max_capacity: i32) -> DiningTable {
    DiningTable {
        id: Some(RecordId::from_table_key("dining_table", key)),
        name: key.to_string(),
        location: loc_ref(),
        min_capacity,
        max_capacity,
        combinable: false,
        combination_group: None,
        is_active: true,
    }
}

fn combo_table(key: &str, min_capacity: i32, max_capacity: i32, group: &str) -> DiningTable {
    DiningTable {
        combinable: true,
        combination_group: Some(group.to_string()),
        ..table(key, min_capacity, max_capacity)
    }
}

fn shift(start_minutes: i32, end_minutes: i32, max_parallel: Option<i32>) -> Shift {
    Shift {
        id: Some(RecordId::from_table_key("shift", "s1")),
        location: loc_ref(),
        name: "All Day".to_string(),
        days: vec![0, 1, 2, 3, 4, 5, 6],
        start_minutes,
        end_minutes,
        max_parallel,
        is_active: true,
    }
}

fn blocking(table_keys: &[&str], start_time: i64, end_time: i64) -> Booking {
    Booking {
        id: Some(RecordId::from_table_key("booking", "b1")),
        location: loc_ref(),
        tables: table_keys
            .iter()
            .map(|k| RecordId::from_table_key("dining_table", *k))
            .collect(),
        start_time,
        end_time,
        party_size: 2,
        status: BookingStatus::Confirmed,
        payment_status: PaymentStatus::NotRequired,
        deposit_amount: None,
        payment_hold_id: None,
        idempotency_key: format!("blk-{start_time}"),
        confirmation_code: "ABCD1234".to_string(),
        guest_name: None,
        guest_phone: None,
        guest_email: None,
        note: None,
        created_at: None,
        updated_at: None,
        cancelled_at: None,
    }
}

fn snapshot(tables: Vec<DiningTable>, shifts: Vec<Shift>, bookings: Vec<Booking>) -> AvailabilitySnapshot {
    AvailabilitySnapshot {
        tables,
        shifts,
        bookings,
    }
}

fn request(start_time: i64, end_time: i64, party_size: i32) -> SlotRequest {
    SlotRequest {
        start_time,
        end_time,
        party_size,
    }
}

fn seated_keys(outcome: PlanOutcome) -> Vec<String> {
    match outcome {
        PlanOutcome::Seated(unit) => unit
            .table_ids()
            .iter()
            .map(|id| id.key().to_string())
            .collect(),
        PlanOutcome::NoAvailability => panic!("expected a seating unit"),
    }
}

#[test]
fn smallest_fit_wins() {
    // 2 人来客：跳过 2 人桌不合适? 不 — [2,2] 正好；验证不选 6 人桌
    let snap = snapshot(
        vec![table("six", 4, 6), table("two", 1, 2), table("four", 2, 4)],
        vec![shift(12 * 60, 23 * 60, None)],
        vec![],
    );
    let keys = seated_keys(planner::plan(&snap, &request(at(20, 0), at(21, 30), 2), tz()));
    assert_eq!(keys, vec!["two"]);
}

#[test]
fn min_capacity_guards_large_tables() {
    // 2 人不满足 6 人桌的 min_capacity=4
    let snap = snapshot(
        vec![table("six", 4, 6)],
        vec![shift(12 * 60, 23 * 60, None)],
        vec![],
    );
    let outcome = planner::plan(&snap, &request(at(20, 0), at(21, 30), 2), tz());
    assert!(matches!(outcome, PlanOutcome::NoAvailability));
}

#[test]
fn busy_table_falls_through_to_next() {
    let snap = snapshot(
        vec![table("a", 1, 4), table("b", 1, 4)],
        vec![shift(12 * 60, 23 * 60, None)],
        vec![blocking(&["a"], at(19, 30), at(21, 0))],
    );
    let keys = seated_keys(planner::plan(&snap, &request(at(20, 0), at(21, 30), 2), tz()));
    assert_eq!(keys, vec!["b"]);
}

#[test]
fn back_to_back_slots_do_not_conflict() {
    // 上一单 20:00 结束，本单 20:00 开始 — 半开区间无缝翻台
    let snap = snapshot(
        vec![table("a", 1, 4)],
        vec![shift(12 * 60, 23 * 60, None)],
        vec![blocking(&["a"], at(18, 30), at(20, 0))],
    );
    let keys = seated_keys(planner::plan(&snap, &request(at(20, 0), at(21, 30), 2), tz()));
    assert_eq!(keys, vec!["a"]);
}

#[test]
fn no_covering_shift_means_no_availability() {
    // 班次 12:00–15:00，请求 20:00
    let snap = snapshot(
        vec![table("a", 1, 4)],
        vec![shift(12 * 60, 15 * 60, None)],
        vec![],
    );
    let outcome = planner::plan(&snap, &request(at(20, 0), at(21, 30), 2), tz());
    assert!(matches!(outcome, PlanOutcome::NoAvailability));
}

#[test]
fn request_must_fit_entirely_within_shift() {
    // 班次到 21:00，请求 20:00–21:30 超出尾部
    let snap = snapshot(
        vec![table("a", 1, 4)],
        vec![shift(12 * 60, 21 * 60, None)],
        vec![],
    );
    let outcome = planner::plan(&snap, &request(at(20, 0), at(21, 30), 2), tz());
    assert!(matches!(outcome, PlanOutcome::NoAvailability));
}

#[test]
fn combination_used_only_when_no_single_fits() {
    // 6 人：单桌 (max 4) 放不下，组内 4+4 拼桌
    let snap = snapshot(
        vec![
            combo_table("p1", 1, 4, "patio"),
            combo_table("p2", 1, 4, "patio"),
            table("solo", 1, 4),
        ],
        vec![shift(12 * 60, 23 * 60, None)],
        vec![],
    );
    let mut keys = seated_keys(planner::plan(&snap, &request(at(20, 0), at(21, 30), 6), tz()));
    keys.sort();
    assert_eq!(keys, vec!["p1", "p2"]);
}

#[test]
fn combination_skipped_when_single_would_fit() {
    // 4 人：6 人桌被占，拼桌可行，但 party ≤ max_single → 不拼
    let snap = snapshot(
        vec![
            table("six", 1, 6),
            combo_table("p1", 1, 2, "patio"),
            combo_table("p2", 1, 2, "patio"),
        ],
        vec![shift(12 * 60, 23 * 60, None)],
        vec![blocking(&["six"], at(19, 0), at(22, 0))],
    );
    let outcome = planner::plan(&snap, &request(at(20, 0), at(21, 30), 4), tz());
    assert!(matches!(outcome, PlanOutcome::NoAvailability));
}

#[test]
fn combination_prefers_fewest_tables() {
    // 8 人：{big4+big4} 2 桌优于 {s2+s2+s2+s2} 4 桌
    let snap = snapshot(
        vec![
            combo_table("big1", 1, 4, "patio"),
            combo_table("big2", 1, 4, "patio"),
            combo_table("s1", 1, 2, "patio"),
            combo_table("s2", 1, 2, "patio"),
            combo_table("s3", 1, 2, "patio"),
            combo_table("s4", 1, 2, "patio"),
        ],
        vec![shift(12 * 60, 23 * 60, None)],
        vec![],
    );
    let mut keys = seated_keys(planner::plan(&snap, &request(at(20, 0), at(21, 30), 8), tz()));
    keys.sort();
    assert_eq!(keys, vec!["big1", "big2"]);
}

#[test]
fn combination_requires_every_member_free() {
    let snap = snapshot(
        vec![
            combo_table("p1", 1, 4, "patio"),
            combo_table("p2", 1, 4, "patio"),
        ],
        vec![shift(12 * 60, 23 * 60, None)],
        vec![blocking(&["p2"], at(19, 0), at(22, 0))],
    );
    let outcome = planner::plan(&snap, &request(at(20, 0), at(21, 30), 6), tz());
    assert!(matches!(outcome, PlanOutcome::NoAvailability));
}

#[test]
fn shift_parallel_cap_blocks_throughput() {
    // max_parallel = 1，已有一单重叠 → 拒绝，即使还有空桌
    let snap = snapshot(
        vec![table("a", 1, 4), table("b", 1, 4)],
        vec![shift(12 * 60, 23 * 60, Some(1))],
        vec![blocking(&["a"], at(19, 30), at(21, 0))],
    );
    let outcome = planner::plan(&snap, &request(at(20, 0), at(21, 30), 2), tz());
    assert!(matches!(outcome, PlanOutcome::NoAvailability));
}

#[test]
fn deterministic_tie_break_by_id() {
    // 同容量两桌都空闲 → 始终选 ID 较小者
    let snap = snapshot(
        vec![table("beta", 1, 4), table("alpha", 1, 4)],
        vec![shift(12 * 60, 23 * 60, None)],
        vec![],
    );
    for _ in 0..5 {
        let keys = seated_keys(planner::plan(&snap, &request(at(20, 0), at(21, 30), 2), tz()));
        assert_eq!(keys, vec!["alpha"]);
    }
}
