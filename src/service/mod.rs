//! Domain services over the store handle. Each holds a `ParkingStore` clone
//! and no other mutable state.

pub mod auth;
pub mod parking;
pub mod reservation;

pub use auth::AuthService;
pub use parking::ParkingService;
pub use reservation::{format_duration, ReservationService};
