use crate::db::models::{
    format_timestamp, NewReservation, Reservation, ReservationHistory, ReservationStatus,
    ReservationUpdate, UserStats,
};
use crate::db::sqlite::ParkingStore;
use crate::error::ParkdeckError;
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use tracing::error;

const RESERVATION_JOIN: &str = "SELECT r.id, r.user_id, r.parking_id, \
     p.name AS parking_name, p.address, \
     r.start_time, r.end_time, r.duration_minutes, r.amount, r.status, \
     r.created_at, r.updated_at \
     FROM reservations r JOIN parkings p ON r.parking_id = p.id";

const HISTORY_JOIN: &str = "SELECT r.id, p.name AS parking_name, p.address, \
     DATE(r.start_time) AS date, TIME(r.start_time) AS start_time, \
     TIME(r.end_time) AS end_time, r.duration_minutes, r.amount, r.status \
     FROM reservations r JOIN parkings p ON r.parking_id = p.id";

/// Human rendering of a minute count: "0min", "45min", "3h", "3h 15min".
pub fn format_duration(minutes: i64) -> String {
    if minutes <= 0 {
        return "0min".to_string();
    }
    let hours = minutes / 60;
    let mins = minutes % 60;
    if hours == 0 {
        format!("{mins}min")
    } else if mins == 0 {
        format!("{hours}h")
    } else {
        format!("{hours}h {mins}min")
    }
}

// SQLite TIME() yields HH:MM:SS; displays want HH:MM.
fn format_clock(time: &str) -> String {
    time.get(..5).unwrap_or(time).to_string()
}

fn history_from_row(row: &SqliteRow) -> Result<ReservationHistory, ParkdeckError> {
    let start_time: String = row.try_get("start_time")?;
    let end_time: Option<String> = row.try_get("end_time")?;
    let duration_minutes: Option<i64> = row.try_get("duration_minutes")?;
    let status: String = row.try_get("status")?;
    Ok(ReservationHistory {
        id: row.try_get("id")?,
        parking_name: row.try_get("parking_name")?,
        address: row.try_get("address")?,
        date: row.try_get("date")?,
        start_time: format_clock(&start_time),
        end_time: end_time.as_deref().map(format_clock).unwrap_or_default(),
        duration: format_duration(duration_minutes.unwrap_or(0)),
        amount: row.try_get("amount")?,
        status: ReservationStatus::parse(&status)?,
    })
}

fn with_duration_string(mut reservation: Reservation) -> Reservation {
    reservation.duration = Some(format_duration(reservation.duration_minutes.unwrap_or(0)));
    reservation
}

/// Reservation lifecycle, history views and billing helpers. Public methods
/// degrade to empty/negative results on store errors instead of propagating.
#[derive(Clone)]
pub struct ReservationService {
    store: ParkingStore,
}

impl ReservationService {
    pub fn new(store: ParkingStore) -> Self {
        Self { store }
    }

    /// Insert a reservation. Duration is the whole-minute span between start
    /// and end when both are known, else the caller's estimate, else 60.
    /// The amount is provisional (billing is finalized on update).
    pub async fn create_reservation(&self, reservation: NewReservation) -> Option<Reservation> {
        match self.try_create(reservation).await {
            Ok(created) => Some(created),
            Err(e) => {
                error!(error = %e, "failed to create reservation");
                None
            }
        }
    }

    /// Finalize a reservation: end time, duration, amount and status are set
    /// in one statement.
    pub async fn update_reservation(&self, reservation_id: i64, update: ReservationUpdate) -> bool {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET end_time = ?, duration_minutes = ?, amount = ?, status = ?,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(format_timestamp(update.end_time))
        .bind(update.duration_minutes)
        .bind(update.amount)
        .bind(update.status.as_str())
        .bind(reservation_id)
        .execute(self.store.pool())
        .await;
        match result {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                error!(reservation_id, error = %e, "failed to update reservation");
                false
            }
        }
    }

    /// Cancel an active reservation. Rows already completed or cancelled are
    /// untouched and report false (idempotent no-op, not an error).
    pub async fn cancel_reservation(&self, reservation_id: i64) -> bool {
        let result = sqlx::query(
            r#"
            UPDATE reservations
            SET status = 'cancelled', updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND status = 'active'
            "#,
        )
        .bind(reservation_id)
        .execute(self.store.pool())
        .await;
        match result {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                error!(reservation_id, error = %e, "failed to cancel reservation");
                false
            }
        }
    }

    pub async fn get_reservation_by_id(&self, reservation_id: i64) -> Option<Reservation> {
        let query = format!("{RESERVATION_JOIN} WHERE r.id = ? LIMIT 1");
        let result = sqlx::query(&query)
            .bind(reservation_id)
            .fetch_optional(self.store.pool())
            .await;
        match result {
            Ok(row) => row
                .as_ref()
                .map(Reservation::from_row)
                .transpose()
                .map(|r| r.map(with_duration_string))
                .unwrap_or_else(|e| {
                    error!(reservation_id, error = %e, "failed to decode reservation");
                    None
                }),
            Err(e) => {
                error!(reservation_id, error = %e, "failed to load reservation");
                None
            }
        }
    }

    /// Display-ready history for one user, newest first.
    pub async fn get_user_reservations(&self, user_id: i64) -> Vec<ReservationHistory> {
        let query = format!("{HISTORY_JOIN} WHERE r.user_id = ? ORDER BY r.start_time DESC");
        let result = sqlx::query(&query)
            .bind(user_id)
            .fetch_all(self.store.pool())
            .await;
        match self.decode_history(result) {
            Ok(history) => history,
            Err(e) => {
                error!(user_id, error = %e, "failed to load user reservations");
                Vec::new()
            }
        }
    }

    /// History filtered to reservations starting within `[from, to]`, where
    /// both bounds are `YYYY-MM-DD` dates.
    pub async fn get_reservations_by_date_range(
        &self,
        user_id: i64,
        from: &str,
        to: &str,
    ) -> Vec<ReservationHistory> {
        let query = format!(
            "{HISTORY_JOIN} WHERE r.user_id = ? AND DATE(r.start_time) BETWEEN ? AND ? \
             ORDER BY r.start_time DESC"
        );
        let result = sqlx::query(&query)
            .bind(user_id)
            .bind(from)
            .bind(to)
            .fetch_all(self.store.pool())
            .await;
        match self.decode_history(result) {
            Ok(history) => history,
            Err(e) => {
                error!(user_id, from, to, error = %e, "failed to load reservations by date range");
                Vec::new()
            }
        }
    }

    /// The most recent reservation still in the active state, if any.
    pub async fn get_active_reservation(&self, user_id: i64) -> Option<Reservation> {
        let query = format!(
            "{RESERVATION_JOIN} WHERE r.user_id = ? AND r.status = 'active' \
             ORDER BY r.start_time DESC LIMIT 1"
        );
        let result = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(self.store.pool())
            .await;
        match result {
            Ok(row) => row
                .as_ref()
                .map(Reservation::from_row)
                .transpose()
                .map(|r| r.map(with_duration_string))
                .unwrap_or_else(|e| {
                    error!(user_id, error = %e, "failed to decode active reservation");
                    None
                }),
            Err(e) => {
                error!(user_id, error = %e, "failed to load active reservation");
                None
            }
        }
    }

    /// Aggregates over completed reservations only. Total hours are minutes
    /// converted to hours, rounded to one decimal.
    pub async fn get_user_stats(&self, user_id: i64) -> UserStats {
        let result = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_reservations,
                COALESCE(SUM(amount), 0) AS total_spent,
                COALESCE(SUM(duration_minutes), 0) AS total_minutes
            FROM reservations
            WHERE user_id = ? AND status = 'completed'
            "#,
        )
        .bind(user_id)
        .fetch_one(self.store.pool())
        .await;
        match result {
            Ok(row) => {
                let total_minutes: i64 = row.try_get("total_minutes").unwrap_or(0);
                UserStats {
                    total_reservations: row.try_get("total_reservations").unwrap_or(0),
                    total_spent: row.try_get("total_spent").unwrap_or(0),
                    total_hours: (total_minutes as f64 / 60.0 * 10.0).round() / 10.0,
                }
            }
            Err(e) => {
                error!(user_id, error = %e, "failed to load user stats");
                UserStats::default()
            }
        }
    }

    /// Billed amount for parking `duration_minutes` at the given lot: every
    /// started hour is charged as a whole hour. Unknown lot yields 0.
    pub async fn calculate_amount(&self, parking_id: i64, duration_minutes: i64) -> i64 {
        let result = sqlx::query("SELECT price_per_hour FROM parkings WHERE id = ?")
            .bind(parking_id)
            .fetch_optional(self.store.pool())
            .await;
        match result {
            Ok(Some(row)) => {
                let price_per_hour: i64 = match row.try_get("price_per_hour") {
                    Ok(price) => price,
                    Err(e) => {
                        error!(parking_id, error = %e, "failed to decode hourly price");
                        return 0;
                    }
                };
                if duration_minutes <= 0 {
                    return 0;
                }
                ((duration_minutes + 59) / 60) * price_per_hour
            }
            Ok(None) => 0,
            Err(e) => {
                error!(parking_id, error = %e, "failed to calculate amount");
                0
            }
        }
    }

    async fn try_create(
        &self,
        reservation: NewReservation,
    ) -> Result<Reservation, ParkdeckError> {
        let duration_minutes = match reservation.end_time {
            Some(end) => (end - reservation.start_time).num_minutes(),
            None => reservation.estimated_duration_minutes.unwrap_or(60),
        };
        let amount = reservation.amount.unwrap_or(0);
        let status = reservation.status.unwrap_or(ReservationStatus::Active);

        let result = sqlx::query(
            r#"
            INSERT INTO reservations
            (user_id, parking_id, start_time, end_time, duration_minutes, amount, status)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(reservation.user_id)
        .bind(reservation.parking_id)
        .bind(format_timestamp(reservation.start_time))
        .bind(reservation.end_time.map(format_timestamp))
        .bind(duration_minutes)
        .bind(amount)
        .bind(status.as_str())
        .execute(self.store.pool())
        .await?;

        let now = chrono::Utc::now().naive_utc();
        Ok(Reservation {
            id: result.last_insert_rowid(),
            user_id: reservation.user_id,
            parking_id: reservation.parking_id,
            parking_name: None,
            address: None,
            start_time: reservation.start_time,
            end_time: reservation.end_time,
            duration_minutes: Some(duration_minutes),
            duration: Some(format_duration(duration_minutes)),
            amount,
            status,
            created_at: now,
            updated_at: now,
        })
    }

    fn decode_history(
        &self,
        rows: Result<Vec<SqliteRow>, sqlx::Error>,
    ) -> Result<Vec<ReservationHistory>, ParkdeckError> {
        rows?.iter().map(history_from_row).collect()
    }
}
