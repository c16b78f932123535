//! Allocation Planner (桌台分配规划)
//!
//! 贪心最小适配策略：
//!
//! 1. 班次必须完整覆盖请求区间 (并受班次并行上限约束)
//! 2. 单桌适配 — 按 `max_capacity` 升序 (最小够用优先，减少
//!    容量浪费)，同容量按桌台 ID 升序保证确定性
//! 3. 人数超过所有单桌上限时尝试拼桌：同拼桌组内找最小子集
//!    (先按桌数，再按容量和，再按 ID 串)，要求每张成员桌均空闲
//!
//! 最小适配是偏向简单性与对后续大团公平的启发式 — 装箱问题是
//! NP-hard，这里不追求全局最优打包。

use super::availability::AvailabilitySnapshot;
use super::conflict::{intervals_overlap, table_has_conflict};
use crate::db::models::DiningTable;
use crate::utils::time::LocalSlot;
use chrono_tz::Tz;
use std::collections::BTreeMap;
use surrealdb::RecordId;

/// 拼桌子集枚举的组内桌台数上限 (位掩码枚举的护栏)
const MAX_GROUP_SIZE: usize = 16;

/// 槽位请求：规划器的输入
#[derive(Debug, Clone, Copy)]
pub struct SlotRequest {
    pub start_time: i64,
    pub end_time: i64,
    pub party_size: i32,
}

/// 接待单元：单桌，或同组拼桌
///
/// 统一建模让冲突检测对两种形态一视同仁 — 拼桌不是临时的
/// 多桌 join，而是带标签的变体。
#[derive(Debug, Clone)]
pub enum SeatingUnit {
    Single(DiningTable),
    Combined(Vec<DiningTable>),
}

impl SeatingUnit {
    /// 单元覆盖的全部物理桌台 ID
    pub fn table_ids(&self) -> Vec<RecordId> {
        match self {
            Self::Single(t) => t.id.iter().cloned().collect(),
            Self::Combined(ts) => ts.iter().filter_map(|t| t.id.clone()).collect(),
        }
    }

    /// 合并容量下限 (min 之和)
    pub fn min_capacity(&self) -> i32 {
        match self {
            Self::Single(t) => t.min_capacity,
            Self::Combined(ts) => ts.iter().map(|t| t.min_capacity).sum(),
        }
    }

    /// 合并容量上限 (max 之和)
    pub fn max_capacity(&self) -> i32 {
        match self {
            Self::Single(t) => t.max_capacity,
            Self::Combined(ts) => ts.iter().map(|t| t.max_capacity).sum(),
        }
    }
}

/// 规划结果：找到接待单元，或无可用
///
/// `NoAvailability` 是业务结果 — 调用方可引导候补。
#[derive(Debug, Clone)]
pub enum PlanOutcome {
    Seated(SeatingUnit),
    NoAvailability,
}

/// 对快照执行分配规划 (纯函数，不触库)
pub fn plan(snapshot: &AvailabilitySnapshot, request: &SlotRequest, tz: Tz) -> PlanOutcome {
    let Some(slot) = LocalSlot::from_millis(request.start_time, request.end_time, tz) else {
        return PlanOutcome::NoAvailability;
    };

    // 1. 班次覆盖 + 并行上限 (厨房吞吐量，与桌台数无关)
    let covering: Vec<_> = snapshot.shifts.iter().filter(|s| s.covers(&slot)).collect();
    if covering.is_empty() {
        return PlanOutcome::NoAvailability;
    }

    let parallel = snapshot
        .bookings
        .iter()
        .filter(|b| {
            b.status.is_blocking()
                && intervals_overlap(request.start_time, request.end_time, b.start_time, b.end_time)
        })
        .count() as i32;
    let admits = covering
        .iter()
        .any(|s| s.max_parallel.is_none_or(|cap| parallel < cap));
    if !admits {
        return PlanOutcome::NoAvailability;
    }

    let active: Vec<&DiningTable> = snapshot.tables.iter().filter(|t| t.is_active).collect();
    if active.is_empty() {
        return PlanOutcome::NoAvailability;
    }

    // 2. 单桌适配：最小够用优先，ID 升序打破平局
    let mut singles: Vec<&DiningTable> = active
        .iter()
        .copied()
        .filter(|t| t.min_capacity <= request.party_size && request.party_size <= t.max_capacity)
        .collect();
    singles.sort_by(|a, b| {
        a.max_capacity
            .cmp(&b.max_capacity)
            .then_with(|| a.id_string().cmp(&b.id_string()))
    });

    for table in singles {
        if let Some(table_id) = table.id.as_ref()
            && !table_has_conflict(table_id, request.start_time, request.end_time, &snapshot.bookings)
        {
            return PlanOutcome::Seated(SeatingUnit::Single(table.clone()));
        }
    }

    // 3. 拼桌仅在人数超过所有单桌上限时启用
    let max_single = active.iter().map(|t| t.max_capacity).max().unwrap_or(0);
    if request.party_size <= max_single {
        return PlanOutcome::NoAvailability;
    }

    match plan_combination(&active, request, &snapshot.bookings) {
        Some(unit) => PlanOutcome::Seated(unit),
        None => PlanOutcome::NoAvailability,
    }
}

/// 拼桌规划：同组内最小可行子集
fn plan_combination(
    active: &[&DiningTable],
    request: &SlotRequest,
    bookings: &[crate::db::models::Booking],
) -> Option<SeatingUnit> {
    // BTreeMap 保证组的遍历顺序确定
    let mut groups: BTreeMap<&str, Vec<&DiningTable>> = BTreeMap::new();
    for table in active {
        if table.combinable
            && let Some(group) = table.combination_group.as_deref()
        {
            groups.entry(group).or_default().push(table);
        }
    }

    // 候选排序键：(桌数, 容量和, ID 串) — 全序，保证确定性
    let mut best: Option<(usize, i32, String, Vec<DiningTable>)> = None;

    for (_, mut members) in groups {
        members.sort_by_key(|t| t.id_string());
        members.truncate(MAX_GROUP_SIZE);

        for mask in 1u32..(1 << members.len()) {
            if mask.count_ones() < 2 {
                continue;
            }
            let subset: Vec<&DiningTable> = members
                .iter()
                .enumerate()
                .filter(|(i, _)| mask & (1 << i) != 0)
                .map(|(_, t)| *t)
                .collect();

            let sum_min: i32 = subset.iter().map(|t| t.min_capacity).sum();
            let sum_max: i32 = subset.iter().map(|t| t.max_capacity).sum();
            if !(sum_min <= request.party_size && request.party_size <= sum_max) {
                continue;
            }

            let any_busy = subset.iter().any(|t| {
                t.id.as_ref().is_none_or(|id| {
                    table_has_conflict(id, request.start_time, request.end_time, bookings)
                })
            });
            if any_busy {
                continue;
            }

            let ids: String = subset
                .iter()
                .map(|t| t.id_string())
                .collect::<Vec<_>>()
                .join(",");
            let key = (subset.len(), sum_max, ids);
            let better = match &best {
                None => true,
                Some((n, cap, best_ids, _)) => {
                    key < (*n, *cap, best_ids.clone())
                }
            };
            if better {
                best = Some((
                    key.0,
                    key.1,
                    key.2,
                    subset.into_iter().cloned().collect(),
                ));
            }
        }
    }

    best.map(|(_, _, _, tables)| SeatingUnit::Combined(tables))
}
