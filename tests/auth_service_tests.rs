mod common;

use parkdeck::db::models::{NewUser, UserUpdate};
use parkdeck::service::AuthService;
use std::fs;

fn new_user(email: &str) -> NewUser {
    NewUser {
        name: "Ana Morales".to_string(),
        email: email.to_string(),
        phone: Some("+502 5555-0000".to_string()),
        password: "hunter2".to_string(),
    }
}

#[tokio::test]
async fn register_rejects_duplicate_email() {
    let (store, temp_path) = common::temp_store("auth-duplicate").await;
    let auth = AuthService::new(store.clone());

    let profile = auth.register(new_user("a@x.com")).await.unwrap();
    assert_eq!(profile.email, "a@x.com");
    assert_eq!(profile.total_reservations, 0);
    assert_eq!(profile.total_spent, 0);
    assert!(profile.favorite_parking.is_none());

    assert!(auth.register(new_user("a@x.com")).await.is_none());

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn login_with_unknown_email_fails() {
    let (store, temp_path) = common::temp_store("auth-unknown").await;
    let auth = AuthService::new(store.clone());

    assert!(auth.login("nobody@example.com", "whatever").await.is_none());

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn login_aggregates_reservation_history() {
    let (store, temp_path) = common::temp_store("auth-login").await;
    store.seed_demo_data().await.expect("seed failed");
    let auth = AuthService::new(store.clone());

    // password verification is a stub; any password passes once the row exists
    let profile = auth.login("juan.perez@email.com", "anything").await.unwrap();
    assert_eq!(profile.name, "Juan Carlos Pérez");
    assert_eq!(profile.total_reservations, 4);
    assert_eq!(profile.total_spent, 50575);
    assert!(profile.favorite_parking.is_some());
    assert!(!profile.member_since.is_empty());

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn profile_by_id_matches_login_view() {
    let (store, temp_path) = common::temp_store("auth-profile").await;
    store.seed_demo_data().await.expect("seed failed");
    let auth = AuthService::new(store.clone());

    let login = auth.login("juan.perez@email.com", "x").await.unwrap();
    let by_id = auth.get_user_profile(login.id).await.unwrap();
    assert_eq!(by_id.email, login.email);
    assert_eq!(by_id.total_reservations, login.total_reservations);
    assert_eq!(by_id.total_spent, login.total_spent);

    assert!(auth.get_user_profile(99999).await.is_none());

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn profile_update_applies_only_supplied_fields() {
    let (store, temp_path) = common::temp_store("auth-update").await;
    let auth = AuthService::new(store.clone());

    let profile = auth.register(new_user("update@x.com")).await.unwrap();

    let update = UserUpdate {
        phone: Some("+502 9999-1111".to_string()),
        ..UserUpdate::default()
    };
    assert!(auth.update_user_profile(profile.id, update).await);

    let reloaded = auth.get_user_profile(profile.id).await.unwrap();
    assert_eq!(reloaded.phone.as_deref(), Some("+502 9999-1111"));
    assert_eq!(reloaded.name, "Ana Morales");
    assert_eq!(reloaded.email, "update@x.com");

    // nothing supplied: no-op success
    assert!(auth.update_user_profile(profile.id, UserUpdate::default()).await);

    // unknown user with real fields: zero rows affected
    let miss = UserUpdate {
        name: Some("Ghost".to_string()),
        ..UserUpdate::default()
    };
    assert!(!auth.update_user_profile(99999, miss).await);

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}

#[tokio::test]
async fn seeded_reference_data_is_listed_per_user() {
    let (store, temp_path) = common::temp_store("auth-reference").await;
    store.seed_demo_data().await.expect("seed failed");
    let auth = AuthService::new(store.clone());

    let methods = auth.get_payment_methods(1).await;
    assert_eq!(methods.len(), 1);
    assert_eq!(methods[0].kind, "card");
    assert_eq!(methods[0].last_four, "4532");
    assert!(methods[0].is_default);

    let vehicles = auth.get_vehicles(1).await;
    assert_eq!(vehicles.len(), 1);
    assert_eq!(vehicles[0].make, "Honda");
    assert_eq!(vehicles[0].model, "Civic");
    assert_eq!(vehicles[0].license_plate.as_deref(), Some("P123456"));
    assert!(vehicles[0].is_default);

    assert!(auth.get_payment_methods(2).await.is_empty());
    assert!(auth.get_vehicles(2).await.is_empty());

    store.close().await;
    let _ = fs::remove_file(&temp_path);
}
