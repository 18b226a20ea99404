mod common;

use parkdeck::db::models::NewParking;
use parkdeck::service::ParkingService;
use std::fs;

#[tokio::test]
async fn seeding_is_idempotent() {
    let (store, temp_path) = common::temp_store("store-seed").await;

    assert!(store.seed_demo_data().await.expect("first seed failed"));
    assert!(!store.seed_demo_data().await.expect("second seed failed"));

    let parkings = ParkingService::new(store.clone());
    assert_eq!(parkings.get_parking_stats().await.total_parkings, 4);

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn reset_drops_everything_and_reseeds() {
    let (store, temp_path) = common::temp_store("store-reset").await;
    store.seed_demo_data().await.expect("seed failed");

    let parkings = ParkingService::new(store.clone());
    parkings
        .create_parking(NewParking {
            name: "Extra Lot".to_string(),
            address: "Somewhere 9".to_string(),
            latitude: None,
            longitude: None,
            price_per_hour: 1000,
            total_spots: 10,
            available_spots: 10,
            features: Vec::new(),
        })
        .await
        .expect("create failed");
    assert_eq!(parkings.get_parking_stats().await.total_parkings, 5);

    store.reset().await.expect("reset failed");
    assert_eq!(parkings.get_parking_stats().await.total_parkings, 4);

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn open_creates_the_database_file() {
    let (store, temp_path) = common::temp_store("store-open").await;
    assert!(temp_path.exists());

    // schema creation is idempotent; a second pass must not fail
    store.init_schema().await.expect("re-init failed");

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}
