use parkdeck::ParkingStore;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Open a store over a unique temp SQLite file so tests never share state.
/// Callers remove the file at the end.
#[allow(dead_code)]
pub async fn temp_store(tag: &str) -> (ParkingStore, PathBuf) {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("system time before UNIX_EPOCH")
        .as_nanos();

    let mut temp_path = std::env::temp_dir();
    temp_path.push(format!(
        "parkdeck-{tag}-{}-{}.sqlite",
        std::process::id(),
        nanos
    ));

    let database_url = format!("sqlite:{}", temp_path.display());
    let store = ParkingStore::open(&database_url)
        .await
        .expect("failed to open store");
    (store, temp_path)
}
