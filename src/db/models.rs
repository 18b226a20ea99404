use crate::error::ParkdeckError;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Wire format for every timestamp column (`DATE()`/`TIME()` in queries rely
/// on this exact shape, which is also what CURRENT_TIMESTAMP produces).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn parse_timestamp(value: &str) -> Result<NaiveDateTime, ParkdeckError> {
    NaiveDateTime::parse_from_str(value, TIMESTAMP_FORMAT).map_err(|source| {
        ParkdeckError::InvalidTimestamp {
            value: value.to_string(),
            source,
        }
    })
}

pub(crate) fn format_timestamp(value: NaiveDateTime) -> String {
    value.format(TIMESTAMP_FORMAT).to_string()
}

/// Availability tier of a lot, derived from its spot count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParkingStatus {
    Available,
    Limited,
    Full,
}

impl ParkingStatus {
    /// Threshold rule: 0 spots is full, up to 5 is limited, more is available.
    pub fn for_spots(available_spots: i64) -> Self {
        match available_spots {
            0 => Self::Full,
            1..=5 => Self::Limited,
            _ => Self::Available,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::Limited => "limited",
            Self::Full => "full",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ParkdeckError> {
        match value {
            "available" => Ok(Self::Available),
            "limited" => Ok(Self::Limited),
            "full" => Ok(Self::Full),
            other => Err(ParkdeckError::UnknownStatus(other.to_string())),
        }
    }
}

/// Lifecycle stage of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Active,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Result<Self, ParkdeckError> {
        match value {
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(ParkdeckError::UnknownStatus(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password_hash: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl User {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, ParkdeckError> {
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            password_hash: row.try_get("password_hash")?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

/// A parking lot. `features` is stored as a JSON array in a TEXT column;
/// `distance` is a display label attached by the parking service, never
/// persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parking {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_per_hour: i64,
    pub total_spots: i64,
    pub available_spots: i64,
    pub features: Vec<String>,
    pub status: ParkingStatus,
    pub distance: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Parking {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, ParkdeckError> {
        let features_json: Option<String> = row.try_get("features")?;
        let features = match features_json {
            Some(s) => serde_json::from_str(&s)?,
            None => Vec::new(),
        };
        let status: String = row.try_get("status")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;
        Ok(Self {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            address: row.try_get("address")?,
            latitude: row.try_get("latitude")?,
            longitude: row.try_get("longitude")?,
            price_per_hour: row.try_get("price_per_hour")?,
            total_spots: row.try_get("total_spots")?,
            available_spots: row.try_get("available_spots")?,
            features,
            status: ParkingStatus::parse(&status)?,
            distance: None,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

/// A reservation row joined with its lot's name and address. `duration` is
/// the human-readable rendering of `duration_minutes`, attached by the
/// reservation service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub parking_id: i64,
    pub parking_name: Option<String>,
    pub address: Option<String>,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub duration_minutes: Option<i64>,
    pub duration: Option<String>,
    pub amount: i64,
    pub status: ReservationStatus,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Reservation {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, ParkdeckError> {
        let start_time: String = row.try_get("start_time")?;
        let end_time: Option<String> = row.try_get("end_time")?;
        let status: String = row.try_get("status")?;
        let created_at: String = row.try_get("created_at")?;
        let updated_at: String = row.try_get("updated_at")?;
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            parking_id: row.try_get("parking_id")?,
            parking_name: row.try_get("parking_name")?,
            address: row.try_get("address")?,
            start_time: parse_timestamp(&start_time)?,
            end_time: end_time.as_deref().map(parse_timestamp).transpose()?,
            duration_minutes: row.try_get("duration_minutes")?,
            duration: None,
            amount: row.try_get("amount")?,
            status: ReservationStatus::parse(&status)?,
            created_at: parse_timestamp(&created_at)?,
            updated_at: parse_timestamp(&updated_at)?,
        })
    }
}

/// Display-ready history entry produced by the reservation/parking join.
/// `date` is `YYYY-MM-DD`, clock times are `HH:MM`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReservationHistory {
    pub id: i64,
    pub parking_name: String,
    pub address: String,
    pub date: String,
    pub start_time: String,
    pub end_time: String,
    pub duration: String,
    pub amount: i64,
    pub status: ReservationStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: i64,
    pub user_id: i64,
    pub kind: String,
    pub last_four: String,
    pub is_default: bool,
    pub created_at: NaiveDateTime,
}

impl PaymentMethod {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, ParkdeckError> {
        let is_default: i64 = row.try_get("is_default")?;
        let created_at: String = row.try_get("created_at")?;
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            kind: row.try_get("type")?,
            last_four: row.try_get("last_four")?,
            is_default: is_default != 0,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: i64,
    pub user_id: i64,
    pub make: String,
    pub model: String,
    pub year: Option<i64>,
    pub license_plate: Option<String>,
    pub color: Option<String>,
    pub is_default: bool,
    pub created_at: NaiveDateTime,
}

impl Vehicle {
    pub(crate) fn from_row(row: &SqliteRow) -> Result<Self, ParkdeckError> {
        let is_default: i64 = row.try_get("is_default")?;
        let created_at: String = row.try_get("created_at")?;
        Ok(Self {
            id: row.try_get("id")?,
            user_id: row.try_get("user_id")?,
            make: row.try_get("make")?,
            model: row.try_get("model")?,
            year: row.try_get("year")?,
            license_plate: row.try_get("license_plate")?,
            color: row.try_get("color")?,
            is_default: is_default != 0,
            created_at: parse_timestamp(&created_at)?,
        })
    }
}

/// Profile view returned by login / profile lookup: identity plus
/// reservation aggregates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub member_since: String,
    pub total_reservations: i64,
    pub total_spent: i64,
    pub favorite_parking: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ParkingStats {
    pub total_parkings: i64,
    pub available_spots: i64,
    pub total_spots: i64,
}

#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub total_reservations: i64,
    pub total_spent: i64,
    pub total_hours: f64,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub password: String,
}

/// Partial profile update; absent fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl UserUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

#[derive(Debug, Clone)]
pub struct NewParking {
    pub name: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub price_per_hour: i64,
    pub total_spots: i64,
    pub available_spots: i64,
    pub features: Vec<String>,
}

/// Availability update. Supplying `available_spots` recomputes the status
/// from the threshold rule; an explicit `status` overrides the recompute.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParkingUpdate {
    pub available_spots: Option<i64>,
    pub status: Option<ParkingStatus>,
}

#[derive(Debug, Clone)]
pub struct NewReservation {
    pub user_id: i64,
    pub parking_id: i64,
    pub start_time: NaiveDateTime,
    pub end_time: Option<NaiveDateTime>,
    pub amount: Option<i64>,
    pub status: Option<ReservationStatus>,
    pub estimated_duration_minutes: Option<i64>,
}

/// Finalization payload: all four fields are written in one statement.
#[derive(Debug, Clone)]
pub struct ReservationUpdate {
    pub end_time: NaiveDateTime,
    pub duration_minutes: i64,
    pub amount: i64,
    pub status: ReservationStatus,
}
