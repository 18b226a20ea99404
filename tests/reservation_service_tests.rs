mod common;

use chrono::{NaiveDate, NaiveDateTime};
use parkdeck::db::models::{NewReservation, NewUser, ReservationStatus, ReservationUpdate};
use parkdeck::service::{format_duration, AuthService, ReservationService};
use std::fs;

fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

fn booking(user_id: i64, parking_id: i64, start: NaiveDateTime) -> NewReservation {
    NewReservation {
        user_id,
        parking_id,
        start_time: start,
        end_time: None,
        amount: None,
        status: None,
        estimated_duration_minutes: None,
    }
}

async fn register_user(store: &parkdeck::ParkingStore, email: &str) -> i64 {
    let auth = AuthService::new(store.clone());
    auth.register(NewUser {
        name: "Test User".to_string(),
        email: email.to_string(),
        phone: None,
        password: "secret".to_string(),
    })
    .await
    .expect("registration failed")
    .id
}

#[tokio::test]
async fn amount_is_billed_in_whole_hour_units() {
    let (store, temp_path) = common::temp_store("reservation-amount").await;
    store.seed_demo_data().await.expect("seed failed");
    let reservations = ReservationService::new(store.clone());

    // seeded lot 1 charges 2500 per hour
    assert_eq!(reservations.calculate_amount(1, 60).await, 2500);
    assert_eq!(reservations.calculate_amount(1, 61).await, 5000);
    assert_eq!(reservations.calculate_amount(1, 0).await, 0);

    // non-decreasing in duration
    let mut last = 0;
    for minutes in [1, 30, 59, 60, 61, 119, 120, 195] {
        let amount = reservations.calculate_amount(1, minutes).await;
        assert!(amount >= last, "amount decreased at {minutes} minutes");
        last = amount;
    }

    // unknown lot
    assert_eq!(reservations.calculate_amount(999, 60).await, 0);

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn cancel_is_idempotent_after_first_success() {
    let (store, temp_path) = common::temp_store("reservation-cancel").await;
    store.seed_demo_data().await.expect("seed failed");
    let reservations = ReservationService::new(store.clone());

    let created = reservations
        .create_reservation(booking(1, 1, dt(2024, 2, 1, 10, 0)))
        .await
        .unwrap();

    assert!(reservations.cancel_reservation(created.id).await);
    let reloaded = reservations.get_reservation_by_id(created.id).await.unwrap();
    assert_eq!(reloaded.status, ReservationStatus::Cancelled);

    // second cancel touches zero rows
    assert!(!reservations.cancel_reservation(created.id).await);

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn create_then_read_back_round_trip() {
    let (store, temp_path) = common::temp_store("reservation-roundtrip").await;
    store.seed_demo_data().await.expect("seed failed");
    let reservations = ReservationService::new(store.clone());

    let mut reservation = booking(1, 2, dt(2024, 2, 10, 14, 30));
    reservation.end_time = Some(dt(2024, 2, 10, 17, 45));
    reservation.amount = Some(7200);
    let created = reservations.create_reservation(reservation).await.unwrap();
    assert_eq!(created.duration_minutes, Some(195));

    let reloaded = reservations.get_reservation_by_id(created.id).await.unwrap();
    assert_eq!(reloaded.user_id, 1);
    assert_eq!(reloaded.parking_id, 2);
    assert_eq!(reloaded.amount, 7200);
    assert_eq!(reloaded.status, ReservationStatus::Active);
    assert_eq!(reloaded.parking_name.as_deref(), Some("Parqueo Municipal Norte"));
    assert_eq!(reloaded.duration_minutes, Some(195));
    assert_eq!(
        reloaded.duration.as_deref(),
        Some(format_duration(195).as_str())
    );
    assert_eq!(reloaded.duration.as_deref(), Some("3h 15min"));

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn duration_defaults_when_end_time_is_unknown() {
    let (store, temp_path) = common::temp_store("reservation-estimate").await;
    store.seed_demo_data().await.expect("seed failed");
    let reservations = ReservationService::new(store.clone());

    let no_estimate = reservations
        .create_reservation(booking(1, 1, dt(2024, 2, 1, 8, 0)))
        .await
        .unwrap();
    assert_eq!(no_estimate.duration_minutes, Some(60));
    assert_eq!(no_estimate.duration.as_deref(), Some("1h"));

    let mut with_estimate = booking(1, 1, dt(2024, 2, 1, 9, 0));
    with_estimate.estimated_duration_minutes = Some(90);
    let created = reservations.create_reservation(with_estimate).await.unwrap();
    assert_eq!(created.duration_minutes, Some(90));
    assert_eq!(created.duration.as_deref(), Some("1h 30min"));

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn update_finalizes_all_billing_fields_at_once() {
    let (store, temp_path) = common::temp_store("reservation-finalize").await;
    store.seed_demo_data().await.expect("seed failed");
    let reservations = ReservationService::new(store.clone());

    let created = reservations
        .create_reservation(booking(1, 1, dt(2024, 2, 5, 9, 0)))
        .await
        .unwrap();

    let update = ReservationUpdate {
        end_time: dt(2024, 2, 5, 12, 15),
        duration_minutes: 195,
        amount: 10000,
        status: ReservationStatus::Completed,
    };
    assert!(reservations.update_reservation(created.id, update).await);

    let reloaded = reservations.get_reservation_by_id(created.id).await.unwrap();
    assert_eq!(reloaded.status, ReservationStatus::Completed);
    assert_eq!(reloaded.amount, 10000);
    assert_eq!(reloaded.duration_minutes, Some(195));
    assert_eq!(reloaded.end_time, Some(dt(2024, 2, 5, 12, 15)));

    assert!(!reservations.update_reservation(
        99999,
        ReservationUpdate {
            end_time: dt(2024, 2, 5, 12, 15),
            duration_minutes: 195,
            amount: 10000,
            status: ReservationStatus::Completed,
        }
    )
    .await);

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn user_stats_cover_completed_reservations_only() {
    let (store, temp_path) = common::temp_store("reservation-stats").await;
    store.seed_demo_data().await.expect("seed failed");
    let reservations = ReservationService::new(store.clone());
    let user_id = register_user(&store, "stats@example.com").await;

    let mut first = booking(user_id, 1, dt(2024, 1, 15, 14, 30));
    first.amount = Some(8125);
    first.status = Some(ReservationStatus::Completed);
    first.estimated_duration_minutes = Some(195);
    reservations.create_reservation(first).await.unwrap();

    let mut second = booking(user_id, 4, dt(2024, 1, 8, 19, 0));
    second.amount = Some(6000);
    second.status = Some(ReservationStatus::Completed);
    second.estimated_duration_minutes = Some(240);
    reservations.create_reservation(second).await.unwrap();

    // active reservations stay out of the aggregates
    let mut active = booking(user_id, 2, dt(2024, 2, 1, 10, 0));
    active.amount = Some(999);
    reservations.create_reservation(active).await.unwrap();

    let stats = reservations.get_user_stats(user_id).await;
    assert_eq!(stats.total_reservations, 2);
    assert_eq!(stats.total_spent, 14125);
    assert_eq!(stats.total_hours, 7.3);

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn active_reservation_is_the_most_recent() {
    let (store, temp_path) = common::temp_store("reservation-active").await;
    store.seed_demo_data().await.expect("seed failed");
    let reservations = ReservationService::new(store.clone());
    let user_id = register_user(&store, "active@example.com").await;

    assert!(reservations.get_active_reservation(user_id).await.is_none());

    reservations
        .create_reservation(booking(user_id, 1, dt(2024, 2, 1, 8, 0)))
        .await
        .unwrap();
    let later = reservations
        .create_reservation(booking(user_id, 2, dt(2024, 2, 1, 12, 0)))
        .await
        .unwrap();

    let active = reservations.get_active_reservation(user_id).await.unwrap();
    assert_eq!(active.id, later.id);
    assert_eq!(active.start_time, dt(2024, 2, 1, 12, 0));

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn history_is_newest_first_and_display_formatted() {
    let (store, temp_path) = common::temp_store("reservation-history").await;
    store.seed_demo_data().await.expect("seed failed");
    let reservations = ReservationService::new(store.clone());

    let history = reservations.get_user_reservations(1).await;
    assert_eq!(history.len(), 4);
    assert_eq!(history[0].parking_name, "Centro Comercial Plaza");
    assert_eq!(history[0].date, "2024-01-15");
    assert_eq!(history[0].start_time, "14:30");
    assert_eq!(history[0].end_time, "17:45");
    assert_eq!(history[0].duration, "3h 15min");
    assert_eq!(history[0].amount, 8125);
    assert_eq!(history[3].date, "2024-01-08");
    assert_eq!(history[3].duration, "4h");

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn date_range_filters_on_start_date() {
    let (store, temp_path) = common::temp_store("reservation-range").await;
    store.seed_demo_data().await.expect("seed failed");
    let reservations = ReservationService::new(store.clone());

    let january = reservations
        .get_reservations_by_date_range(1, "2024-01-09", "2024-01-13")
        .await;
    assert_eq!(january.len(), 2);
    assert_eq!(january[0].date, "2024-01-12");
    assert_eq!(january[1].date, "2024-01-10");

    let empty = reservations
        .get_reservations_by_date_range(1, "2025-01-01", "2025-12-31")
        .await;
    assert!(empty.is_empty());

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn duration_formatting_rules() {
    assert_eq!(format_duration(0), "0min");
    assert_eq!(format_duration(45), "45min");
    assert_eq!(format_duration(60), "1h");
    assert_eq!(format_duration(120), "2h");
    assert_eq!(format_duration(195), "3h 15min");
    assert_eq!(format_duration(61), "1h 1min");
}
