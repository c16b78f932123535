//! 创建与生命周期的端到端流程 (内存库)

use super::*;
use crate::db::models::{BookingStatus, PaymentStatus};

#[tokio::test]
async fn create_confirms_without_deposit() {
    let (db, location) = seed_restaurant(BookingPolicy::default(), &[(1, 4)]).await;
    let service = test_service(&db);

    let conf = service
        .create_booking(booking_input(&location, at(20, 0), 2, "key-1"), morning())
        .await
        .unwrap();

    assert_eq!(conf.status, BookingStatus::Confirmed);
    assert!(!conf.payment_required);
    assert!(!conf.replayed);
    assert_eq!(conf.table_ids.len(), 1);
    assert_eq!(conf.confirmation_code.len(), 8);

    let stored = service.get_booking(&conf.booking_id).await.unwrap();
    assert_eq!(stored.party_size, 2);
    assert_eq!(stored.payment_status, PaymentStatus::NotRequired);
    // end_time 按策略默认时长 90 分钟推导
    assert_eq!(stored.end_time - stored.start_time, 90 * 60_000);
}

#[tokio::test]
async fn overlapping_request_is_rejected() {
    let (db, location) = seed_restaurant(BookingPolicy::default(), &[(1, 4)]).await;
    let service = test_service(&db);

    service
        .create_booking(booking_input(&location, at(20, 0), 2, "key-1"), morning())
        .await
        .unwrap();

    let err = service
        .create_booking(booking_input(&location, at(20, 30), 2, "key-2"), morning())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::NoAvailability));
}

#[tokio::test]
async fn back_to_back_bookings_share_a_table() {
    let (db, location) = seed_restaurant(BookingPolicy::default(), &[(1, 4)]).await;
    let service = test_service(&db);

    let mut first = booking_input(&location, at(18, 30), 2, "key-1");
    first.end_time = Some(at(20, 0));
    service.create_booking(first, morning()).await.unwrap();

    // 20:00 开始 — 与 [18:30, 20:00) 相接但不重叠
    let second = service
        .create_booking(booking_input(&location, at(20, 0), 2, "key-2"), morning())
        .await
        .unwrap();
    assert_eq!(second.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn idempotent_replay_returns_original() {
    let (db, location) = seed_restaurant(BookingPolicy::default(), &[(1, 4)]).await;
    let service = test_service(&db);

    let first = service
        .create_booking(booking_input(&location, at(20, 0), 2, "key-1"), morning())
        .await
        .unwrap();
    let replay = service
        .create_booking(booking_input(&location, at(20, 0), 2, "key-1"), morning())
        .await
        .unwrap();

    assert!(replay.replayed);
    assert_eq!(replay.booking_id, first.booking_id);

    // 重放不产生第二条记录
    let day = service
        .list_for_date(&location.id.as_ref().unwrap().to_string(), "2030-06-03")
        .await
        .unwrap();
    assert_eq!(day.len(), 1);
}

#[tokio::test]
async fn reused_key_with_different_payload_is_rejected() {
    let (db, location) = seed_restaurant(BookingPolicy::default(), &[(1, 4)]).await;
    let service = test_service(&db);

    service
        .create_booking(booking_input(&location, at(20, 0), 2, "key-1"), morning())
        .await
        .unwrap();
    let err = service
        .create_booking(booking_input(&location, at(21, 45), 4, "key-1"), morning())
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Validation(_)));
}

#[tokio::test]
async fn deposit_keeps_booking_pending_until_confirmed() {
    let policy = deposit_policy(4, 50, DepositType::Fixed);
    let (db, location) = seed_restaurant(policy, &[(1, 6)]).await;
    let service = test_service(&db);

    let conf = service
        .create_booking(booking_input(&location, at(20, 0), 5, "key-1"), morning())
        .await
        .unwrap();
    assert_eq!(conf.status, BookingStatus::Pending);
    assert!(conf.payment_required);

    let stored = service.get_booking(&conf.booking_id).await.unwrap();
    assert_eq!(stored.deposit_amount, Some(Decimal::from(50)));
    assert_eq!(stored.payment_status, PaymentStatus::AwaitingDeposit);

    let confirmed = service
        .confirm_deposit(&conf.booking_id, Some("hold-xyz".to_string()), morning())
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
    assert_eq!(confirmed.payment_status, PaymentStatus::DepositHeld);
}

#[tokio::test]
async fn deposit_confirmation_writes_status_and_hold_together() {
    let policy = deposit_policy(4, 50, DepositType::Fixed);
    let (db, location) = seed_restaurant(policy, &[(1, 6)]).await;
    let service = test_service(&db);

    let conf = service
        .create_booking(booking_input(&location, at(20, 0), 5, "key-1"), morning())
        .await
        .unwrap();

    // 单条条件 UPDATE 的返回值即终态：状态、押金状态、授权单号一致
    let confirmed = service
        .confirm_deposit(&conf.booking_id, Some("hold-abc".to_string()), morning())
        .await
        .unwrap();
    assert_eq!(confirmed.status, BookingStatus::Confirmed);
    assert_eq!(confirmed.payment_status, PaymentStatus::DepositHeld);
    assert_eq!(confirmed.payment_hold_id.as_deref(), Some("hold-abc"));

    let stored = service.get_booking(&conf.booking_id).await.unwrap();
    assert_eq!(stored.status, BookingStatus::Confirmed);
    assert_eq!(stored.payment_status, PaymentStatus::DepositHeld);
    assert_eq!(stored.payment_hold_id.as_deref(), Some("hold-abc"));
}

#[tokio::test]
async fn per_person_deposit_scales_with_party() {
    let policy = deposit_policy(4, 10, DepositType::PerPerson);
    let (db, location) = seed_restaurant(policy, &[(1, 8)]).await;
    let service = test_service(&db);

    let conf = service
        .create_booking(booking_input(&location, at(20, 0), 6, "key-1"), morning())
        .await
        .unwrap();
    let stored = service.get_booking(&conf.booking_id).await.unwrap();
    assert_eq!(stored.deposit_amount, Some(Decimal::from(60)));
}

#[tokio::test]
async fn small_party_skips_deposit() {
    let policy = deposit_policy(4, 50, DepositType::Fixed);
    let (db, location) = seed_restaurant(policy, &[(1, 6)]).await;
    let service = test_service(&db);

    let conf = service
        .create_booking(booking_input(&location, at(20, 0), 2, "key-1"), morning())
        .await
        .unwrap();
    assert_eq!(conf.status, BookingStatus::Confirmed);
    assert!(!conf.payment_required);
}

#[tokio::test]
async fn early_cancel_refunds_deposit_and_frees_slot() {
    let policy = deposit_policy(4, 50, DepositType::Fixed);
    let (db, location) = seed_restaurant(policy, &[(1, 6)]).await;
    let service = test_service(&db);

    let conf = service
        .create_booking(booking_input(&location, at(20, 0), 5, "key-1"), morning())
        .await
        .unwrap();
    service
        .confirm_deposit(&conf.booking_id, Some("hold-xyz".to_string()), morning())
        .await
        .unwrap();

    // 提前 3 小时取消 (窗口 2 小时) → 押金退还
    let cancelled = service.cancel_booking(&conf.booking_id, at(17, 0)).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(cancelled.payment_status, PaymentStatus::Refunded);

    // 时段释放，新预订可占用同一桌台
    let rebook = service
        .create_booking(booking_input(&location, at(20, 0), 5, "key-2"), at(17, 30))
        .await
        .unwrap();
    assert_eq!(rebook.status, BookingStatus::Pending);
}

#[tokio::test]
async fn late_cancel_forfeits_deposit() {
    let policy = deposit_policy(4, 50, DepositType::Fixed);
    let (db, location) = seed_restaurant(policy, &[(1, 6)]).await;
    let service = test_service(&db);

    let conf = service
        .create_booking(booking_input(&location, at(20, 0), 5, "key-1"), morning())
        .await
        .unwrap();
    service
        .confirm_deposit(&conf.booking_id, Some("hold-xyz".to_string()), morning())
        .await
        .unwrap();

    // 距开始仅 30 分钟
    let cancelled = service.cancel_booking(&conf.booking_id, at(19, 30)).await.unwrap();
    assert_eq!(cancelled.status, BookingStatus::Cancelled);
    assert_eq!(cancelled.payment_status, PaymentStatus::Forfeited);
}

#[tokio::test]
async fn cancel_is_terminal() {
    let (db, location) = seed_restaurant(BookingPolicy::default(), &[(1, 4)]).await;
    let service = test_service(&db);

    let conf = service
        .create_booking(booking_input(&location, at(20, 0), 2, "key-1"), morning())
        .await
        .unwrap();
    service.cancel_booking(&conf.booking_id, at(10, 0)).await.unwrap();

    let err = service
        .cancel_booking(&conf.booking_id, at(10, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Lifecycle(_)));
}

#[tokio::test]
async fn no_show_requires_elapsed_window() {
    let (db, location) = seed_restaurant(BookingPolicy::default(), &[(1, 4)]).await;
    let service = test_service(&db);

    let conf = service
        .create_booking(booking_input(&location, at(20, 0), 2, "key-1"), morning())
        .await
        .unwrap();

    // 20:30 — 预订 [20:00, 21:30) 还没结束
    let err = service
        .mark_no_show(&conf.booking_id, at(20, 30))
        .await
        .unwrap_err();
    assert!(matches!(err, BookingError::Lifecycle(_)));

    let marked = service.mark_no_show(&conf.booking_id, at(22, 0)).await.unwrap();
    assert_eq!(marked.status, BookingStatus::NoShow);
}

#[tokio::test]
async fn completed_dining_flow() {
    let (db, location) = seed_restaurant(BookingPolicy::default(), &[(1, 4)]).await;
    let service = test_service(&db);

    let conf = service
        .create_booking(booking_input(&location, at(20, 0), 2, "key-1"), morning())
        .await
        .unwrap();
    let done = service
        .complete_booking(&conf.booking_id, at(21, 45))
        .await
        .unwrap();
    assert_eq!(done.status, BookingStatus::Completed);
}

#[tokio::test]
async fn full_house_joins_waitlist_when_requested() {
    let (db, location) = seed_restaurant(BookingPolicy::default(), &[(1, 4)]).await;
    let service = test_service(&db);

    service
        .create_booking(booking_input(&location, at(20, 0), 2, "key-1"), morning())
        .await
        .unwrap();

    let mut input = booking_input(&location, at(20, 0), 2, "key-2");
    input.join_waitlist = true;
    let waitlisted = service.create_booking(input, morning()).await.unwrap();

    assert_eq!(waitlisted.status, BookingStatus::Waitlist);
    assert!(waitlisted.table_ids.is_empty());
    assert!(!waitlisted.payment_required);
}

#[tokio::test]
async fn waitlist_does_not_block_real_slots() {
    let (db, location) = seed_restaurant(BookingPolicy::default(), &[(1, 4)]).await;
    let service = test_service(&db);

    let mut input = booking_input(&location, at(20, 0), 2, "key-1");
    input.join_waitlist = true;
    // 有桌可坐时 join_waitlist 只是兜底，照常占座
    let first = service.create_booking(input, morning()).await.unwrap();
    assert_eq!(first.status, BookingStatus::Confirmed);
}

#[tokio::test]
async fn unknown_location_is_rejected() {
    let db = test_db().await;
    let service = test_service(&db);

    let input = CreateBookingInput {
        location_id: "location:nope".to_string(),
        start_time: at(20, 0),
        end_time: None,
        party_size: 2,
        idempotency_key: "key-1".to_string(),
        guest_name: None,
        guest_phone: None,
        guest_email: None,
        note: None,
        join_waitlist: false,
    };
    let err = service.create_booking(input, morning()).await.unwrap_err();
    assert!(matches!(err, BookingError::LocationNotFound(_)));
}

#[tokio::test]
async fn probe_does_not_consume_the_slot() {
    let (db, location) = seed_restaurant(BookingPolicy::default(), &[(1, 4)]).await;
    let service = test_service(&db);
    let location_id = location.id.as_ref().unwrap().to_string();

    let tables = service
        .probe_availability(&location_id, at(20, 0), None, 2)
        .await
        .unwrap();
    assert!(tables.is_some());

    // 试算后时段仍可预订
    let conf = service
        .create_booking(booking_input(&location, at(20, 0), 2, "key-1"), morning())
        .await
        .unwrap();
    assert_eq!(conf.status, BookingStatus::Confirmed);

    let tables = service
        .probe_availability(&location_id, at(20, 0), None, 2)
        .await
        .unwrap();
    assert!(tables.is_none());
}
