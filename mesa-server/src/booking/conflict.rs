//! Conflict Detector (占座冲突检测)
//!
//! 半开区间 `[start, end)` 语义：相接的端点不冲突，
//! 支持 14:00 结束 / 14:00 开始的无缝翻台。
//! 拼桌单元的冲突由规划器按组内每张物理桌台逐一检查。

use crate::db::models::Booking;
use surrealdb::RecordId;

/// 两个半开区间是否重叠：`s1 < e2 AND s2 < e1`
pub fn intervals_overlap(s1: i64, e1: i64, s2: i64, e2: i64) -> bool {
    s1 < e2 && s2 < e1
}

/// 给定桌台在 `[start, end)` 内是否已被占座预订占用
///
/// 只考虑 PENDING | CONFIRMED；拼桌预订占用其全部成员桌台。
pub fn table_has_conflict(
    table_id: &RecordId,
    start: i64,
    end: i64,
    bookings: &[Booking],
) -> bool {
    bookings.iter().any(|b| {
        b.status.is_blocking()
            && b.occupies(table_id)
            && intervals_overlap(start, end, b.start_time, b.end_time)
    })
}
