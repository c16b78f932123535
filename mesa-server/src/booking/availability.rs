//! Availability Index (可用性快照)
//!
//! 一次性读出规划所需的全部输入：门店桌台、班次、以及可能与
//! 请求日期重叠的占座预订。快照只是规划的视图 — 真正的占座
//! 判定由 txn 在提交事务内复查，过期快照最多导致一次重试。

use super::error::{BookingError, BookingResult};
use crate::db::models::{Booking, DiningTable, Location, Shift};
use crate::db::repository::{BookingRepository, DiningTableRepository, ShiftRepository};
use crate::utils::time;
use chrono_tz::Tz;
use surrealdb::Surreal;
use surrealdb::engine::local::Db;

/// 某门店某窗口的可用性快照
#[derive(Debug, Clone)]
pub struct AvailabilitySnapshot {
    pub tables: Vec<DiningTable>,
    pub shifts: Vec<Shift>,
    /// 与窗口重叠的占座预订 (PENDING | CONFIRMED)
    pub bookings: Vec<Booking>,
}

/// 可用性快照加载器
#[derive(Clone)]
pub struct AvailabilityIndex {
    tables: DiningTableRepository,
    shifts: ShiftRepository,
    bookings: BookingRepository,
}

impl AvailabilityIndex {
    pub fn new(db: Surreal<Db>) -> Self {
        Self {
            tables: DiningTableRepository::new(db.clone()),
            shifts: ShiftRepository::new(db.clone()),
            bookings: BookingRepository::new(db),
        }
    }

    /// 加载门店在请求区间所在营业日的快照
    ///
    /// 预订窗口取「请求开始时间所在本地日的整日」与请求区间的并集，
    /// 重叠谓词天然覆盖前一日跨午夜未结束的预订。
    pub async fn load(
        &self,
        location: &Location,
        start_time: i64,
        end_time: i64,
    ) -> BookingResult<AvailabilitySnapshot> {
        let Some(location_id) = location.id.as_ref() else {
            return Err(BookingError::Validation(
                "Location record has no id".to_string(),
            ));
        };
        let tz: Tz = location.tz();

        let (window_start, window_end) = match time::to_local(start_time, tz) {
            Some(local) => {
                let (day_start, day_end) = time::day_bounds_millis(local.date_naive(), tz);
                (day_start.min(start_time), day_end.max(end_time))
            }
            None => (start_time, end_time),
        };

        let tables = self.tables.find_active_by_location(location_id).await?;
        let shifts = self.shifts.find_active_by_location(location_id).await?;
        let bookings = self
            .bookings
            .find_blocking_overlapping(location_id, window_start, window_end)
            .await?;

        Ok(AvailabilitySnapshot {
            tables,
            shifts,
            bookings,
        })
    }
}
