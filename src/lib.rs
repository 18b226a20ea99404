pub mod config;
pub mod db;
pub mod error;
pub mod service;

pub use db::sqlite::ParkingStore;
pub use error::ParkdeckError;
pub use service::{AuthService, ParkingService, ReservationService};
