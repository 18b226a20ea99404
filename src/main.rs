use mimalloc::MiMalloc;
use parkdeck::service::{ParkingService, ReservationService};
use parkdeck::ParkingStore;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cfg = &parkdeck::config::CONFIG;

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(cfg.loglevel.clone()));
    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_level(true)
                .with_target(false),
        )
        .init();

    info!(
        database_url = %cfg.database_url,
        loglevel = %cfg.loglevel
    );

    let store = ParkingStore::open(&cfg.database_url).await?;
    let seeded = store.seed_demo_data().await?;
    info!(seeded, "store ready");

    let parkings = ParkingService::new(store.clone());
    let stats = parkings.get_parking_stats().await;
    info!(
        total_parkings = stats.total_parkings,
        available_spots = stats.available_spots,
        total_spots = stats.total_spots,
        "parking inventory"
    );

    let reservations = ReservationService::new(store.clone());
    let history = reservations.get_user_reservations(1).await;
    for entry in &history {
        info!(
            parking = %entry.parking_name,
            date = %entry.date,
            duration = %entry.duration,
            amount = entry.amount,
            status = entry.status.as_str(),
            "reservation"
        );
    }

    store.close().await;
    Ok(())
}
