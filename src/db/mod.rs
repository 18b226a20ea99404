//! Database module: models, schema and the store handle.
//!
//! Layout:
//! - `models.rs`: Rust structs mirroring DB rows, status enums, typed decoding
//! - `schema.rs`: SQL DDL for initializing the database (SQLite-first)
//! - `sqlite.rs`: the `ParkingStore` handle over a connection pool

pub mod models;
pub mod schema;
pub mod sqlite;

pub use models::{
    NewParking, NewReservation, NewUser, Parking, ParkingStats, ParkingStatus, ParkingUpdate,
    PaymentMethod, Reservation, ReservationHistory, ReservationStatus, ReservationUpdate, User,
    UserProfile, UserStats, UserUpdate, Vehicle,
};
pub use schema::{SQLITE_DROP, SQLITE_INIT};
pub use sqlite::{ParkingStore, SqlitePool};
