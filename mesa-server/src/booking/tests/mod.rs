use super::*;
use crate::db::DbService;
use crate::db::models::{
    BookingPolicy, DepositRule, DepositType, DiningTable, DiningTableCreate, Location,
    LocationCreate, Shift, ShiftCreate,
};
use crate::db::repository::{DiningTableRepository, LocationRepository, ShiftRepository};
use crate::utils::time;
use chrono::NaiveDate;
use chrono_tz::Tz;
use rust_decimal::Decimal;
use std::sync::Arc;

mod test_flows;
mod test_planner;
mod test_policy;

const TZ_NAME: &str = "Europe/Madrid";

fn tz() -> Tz {
    TZ_NAME.parse().unwrap()
}

// 2030-06-03 is a Monday — far enough in the future that
// "start time in the past" checks never trip
fn test_day() -> NaiveDate {
    NaiveDate::from_ymd_opt(2030, 6, 3).unwrap()
}

/// 测试日的某个本地时刻 → Unix millis
fn at(hour: u32, min: u32) -> i64 {
    time::date_hm_to_millis(test_day(), hour, min, tz())
}

/// 测试日上午 9 点作为请求发起时间
fn morning() -> i64 {
    at(9, 0)
}

async fn test_db() -> DbService {
    DbService::new_in_memory().await.unwrap()
}

fn test_service(db: &DbService) -> BookingService {
    BookingService::new(db.db.clone(), Arc::new(DisabledPaymentGateway))
}

async fn seed_location(db: &DbService, policy: BookingPolicy) -> Location {
    LocationRepository::new(db.db.clone())
        .create(LocationCreate {
            name: "Test Bistro".to_string(),
            timezone: TZ_NAME.to_string(),
            policy,
            is_public: true,
        })
        .await
        .unwrap()
}

async fn seed_table(
    db: &DbService,
    location: &Location,
    name: &str,
    min_capacity: i32,
    max_capacity: i32,
) -> DiningTable {
    DiningTableRepository::new(db.db.clone())
        .create(DiningTableCreate {
            name: name.to_string(),
            location: location.id.clone().unwrap(),
            min_capacity: Some(min_capacity),
            max_capacity,
            combinable: false,
            combination_group: None,
        })
        .await
        .unwrap()
}

async fn seed_combinable_table(
    db: &DbService,
    location: &Location,
    name: &str,
    min_capacity: i32,
    max_capacity: i32,
    group: &str,
) -> DiningTable {
    DiningTableRepository::new(db.db.clone())
        .create(DiningTableCreate {
            name: name.to_string(),
            location: location.id.clone().unwrap(),
            min_capacity: Some(min_capacity),
            max_capacity,
            combinable: true,
            combination_group: Some(group.to_string()),
        })
        .await
        .unwrap()
}

/// 全周班次
async fn seed_shift(
    db: &DbService,
    location: &Location,
    name: &str,
    start_minutes: i32,
    end_minutes: i32,
    max_parallel: Option<i32>,
) -> Shift {
    ShiftRepository::new(db.db.clone())
        .create(ShiftCreate {
            location: location.id.clone().unwrap(),
            name: name.to_string(),
            days: vec![0, 1, 2, 3, 4, 5, 6],
            start_minutes,
            end_minutes,
            max_parallel,
        })
        .await
        .unwrap()
}

/// 默认场景：1 家门店 + 全天班次，按给定容量建桌
async fn seed_restaurant(policy: BookingPolicy, capacities: &[(i32, i32)]) -> (DbService, Location) {
    let db = test_db().await;
    let location = seed_location(&db, policy).await;
    seed_shift(&db, &location, "All Day", 12 * 60, 23 * 60, None).await;
    for (i, (min, max)) in capacities.iter().enumerate() {
        seed_table(&db, &location, &format!("T{}", i + 1), *min, *max).await;
    }
    (db, location)
}

fn booking_input(location: &Location, start_time: i64, party_size: i32, key: &str) -> CreateBookingInput {
    CreateBookingInput {
        location_id: location.id.as_ref().unwrap().to_string(),
        start_time,
        end_time: None,
        party_size,
        idempotency_key: key.to_string(),
        guest_name: Some("Ada".to_string()),
        guest_phone: None,
        guest_email: None,
        note: None,
        join_waitlist: false,
    }
}

fn deposit_policy(min_party_size: i32, amount: i64, deposit_type: DepositType) -> BookingPolicy {
    BookingPolicy {
        deposit: Some(DepositRule {
            min_party_size,
            deposit_type,
            amount: Decimal::from(amount),
        }),
        ..BookingPolicy::default()
    }
}
