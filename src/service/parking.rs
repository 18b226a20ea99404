use crate::db::models::{NewParking, Parking, ParkingStats, ParkingStatus, ParkingUpdate};
use crate::db::sqlite::ParkingStore;
use crate::error::ParkdeckError;
use sqlx::Row;
use tracing::error;

const PARKING_COLUMNS: &str = "id, name, address, latitude, longitude, price_per_hour, \
     total_spots, available_spots, features, status, created_at, updated_at";

/// Display stand-in for real geolocation: a deterministic pseudo-function of
/// the stored coordinates, not a GPS computation.
const DISTANCE_LABELS: [&str; 6] = ["0.2 km", "0.5 km", "0.8 km", "1.2 km", "1.5 km", "2.1 km"];

fn distance_label(latitude: Option<f64>, longitude: Option<f64>) -> String {
    let hash = latitude.unwrap_or(0.0) + longitude.unwrap_or(0.0);
    let index = (hash.floor().abs() as usize) % DISTANCE_LABELS.len();
    DISTANCE_LABELS[index].to_string()
}

/// Read and availability operations over parking lots. Public methods degrade
/// to empty/negative results on store errors instead of propagating them.
#[derive(Clone)]
pub struct ParkingService {
    store: ParkingStore,
}

impl ParkingService {
    pub fn new(store: ParkingStore) -> Self {
        Self { store }
    }

    pub async fn get_all_parkings(&self) -> Vec<Parking> {
        match self.fetch_parkings(None, &[]).await {
            Ok(parkings) => parkings,
            Err(e) => {
                error!(error = %e, "failed to load parkings");
                Vec::new()
            }
        }
    }

    pub async fn get_parking_by_id(&self, parking_id: i64) -> Option<Parking> {
        match self.try_get_by_id(parking_id).await {
            Ok(parking) => parking,
            Err(e) => {
                error!(parking_id, error = %e, "failed to load parking");
                None
            }
        }
    }

    /// Case-insensitive substring match on name or address.
    pub async fn search_parkings(&self, term: &str) -> Vec<Parking> {
        let pattern = format!("%{term}%");
        match self
            .fetch_parkings(Some("name LIKE ? OR address LIKE ?"), &[&pattern, &pattern])
            .await
        {
            Ok(parkings) => parkings,
            Err(e) => {
                error!(term, error = %e, "parking search failed");
                Vec::new()
            }
        }
    }

    pub async fn get_parkings_by_status(&self, status: ParkingStatus) -> Vec<Parking> {
        match self
            .fetch_parkings(Some("status = ?"), &[status.as_str()])
            .await
        {
            Ok(parkings) => parkings,
            Err(e) => {
                error!(status = status.as_str(), error = %e, "failed to load parkings by status");
                Vec::new()
            }
        }
    }

    /// Apply an availability update. Supplying `available_spots` recomputes
    /// the status from the threshold rule; an explicit `status` overrides it.
    /// An empty update is a no-op success.
    pub async fn update_parking_availability(
        &self,
        parking_id: i64,
        update: ParkingUpdate,
    ) -> bool {
        match self.try_update_availability(parking_id, update).await {
            Ok(updated) => updated,
            Err(e) => {
                error!(parking_id, error = %e, "failed to update parking availability");
                false
            }
        }
    }

    /// Take one spot, as a single conditional update: the row is only touched
    /// while `available_spots > 0`, so concurrent callers cannot drive the
    /// count negative. Returns false when the lot is already full.
    pub async fn decrement_available_spots(&self, parking_id: i64) -> bool {
        let result = sqlx::query(
            r#"
            UPDATE parkings
            SET available_spots = available_spots - 1,
                status = CASE
                    WHEN available_spots - 1 <= 0 THEN 'full'
                    WHEN available_spots - 1 <= 5 THEN 'limited'
                    ELSE 'available'
                END,
                updated_at = CURRENT_TIMESTAMP
            WHERE id = ? AND available_spots > 0
            "#,
        )
        .bind(parking_id)
        .execute(self.store.pool())
        .await;
        match result {
            Ok(res) => res.rows_affected() > 0,
            Err(e) => {
                error!(parking_id, error = %e, "failed to decrement available spots");
                false
            }
        }
    }

    pub async fn create_parking(&self, parking: NewParking) -> Option<Parking> {
        match self.try_create(parking).await {
            Ok(created) => created,
            Err(e) => {
                error!(error = %e, "failed to create parking");
                None
            }
        }
    }

    pub async fn get_parking_stats(&self) -> ParkingStats {
        let result = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_parkings,
                COALESCE(SUM(available_spots), 0) AS available_spots,
                COALESCE(SUM(total_spots), 0) AS total_spots
            FROM parkings
            "#,
        )
        .fetch_one(self.store.pool())
        .await;
        match result {
            Ok(row) => ParkingStats {
                total_parkings: row.try_get("total_parkings").unwrap_or(0),
                available_spots: row.try_get("available_spots").unwrap_or(0),
                total_spots: row.try_get("total_spots").unwrap_or(0),
            },
            Err(e) => {
                error!(error = %e, "failed to load parking stats");
                ParkingStats::default()
            }
        }
    }

    pub async fn get_available_parkings_count(&self) -> i64 {
        let result = sqlx::query("SELECT COUNT(*) AS count FROM parkings WHERE available_spots > 0")
            .fetch_one(self.store.pool())
            .await;
        match result.and_then(|row| row.try_get("count")) {
            Ok(count) => count,
            Err(e) => {
                error!(error = %e, "failed to count available parkings");
                0
            }
        }
    }

    pub async fn get_total_available_spots(&self) -> i64 {
        let result =
            sqlx::query("SELECT COALESCE(SUM(available_spots), 0) AS total FROM parkings")
                .fetch_one(self.store.pool())
                .await;
        match result.and_then(|row| row.try_get("total")) {
            Ok(total) => total,
            Err(e) => {
                error!(error = %e, "failed to sum available spots");
                0
            }
        }
    }

    async fn fetch_parkings(
        &self,
        filter: Option<&str>,
        params: &[&str],
    ) -> Result<Vec<Parking>, ParkdeckError> {
        let where_clause = filter.map(|f| format!("WHERE {f} ")).unwrap_or_default();
        let query = format!(
            "SELECT {PARKING_COLUMNS} FROM parkings {where_clause}\
             ORDER BY available_spots DESC, name ASC"
        );
        let mut q = sqlx::query(&query);
        for param in params {
            q = q.bind(*param);
        }
        let rows = q.fetch_all(self.store.pool()).await?;
        rows.iter()
            .map(|row| {
                let mut parking = Parking::from_row(row)?;
                parking.distance = Some(distance_label(parking.latitude, parking.longitude));
                Ok(parking)
            })
            .collect()
    }

    async fn try_get_by_id(&self, parking_id: i64) -> Result<Option<Parking>, ParkdeckError> {
        let query = format!("SELECT {PARKING_COLUMNS} FROM parkings WHERE id = ? LIMIT 1");
        let row = sqlx::query(&query)
            .bind(parking_id)
            .fetch_optional(self.store.pool())
            .await?;
        row.map(|row| {
            let mut parking = Parking::from_row(&row)?;
            parking.distance = Some(distance_label(parking.latitude, parking.longitude));
            Ok(parking)
        })
        .transpose()
    }

    async fn try_update_availability(
        &self,
        parking_id: i64,
        update: ParkingUpdate,
    ) -> Result<bool, ParkdeckError> {
        let result = match (update.available_spots, update.status) {
            (Some(spots), status) => {
                let status = status.unwrap_or_else(|| ParkingStatus::for_spots(spots));
                sqlx::query(
                    r#"
                    UPDATE parkings
                    SET available_spots = ?, status = ?, updated_at = CURRENT_TIMESTAMP
                    WHERE id = ?
                    "#,
                )
                .bind(spots)
                .bind(status.as_str())
                .bind(parking_id)
                .execute(self.store.pool())
                .await?
            }
            (None, Some(status)) => {
                sqlx::query(
                    "UPDATE parkings SET status = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ?",
                )
                .bind(status.as_str())
                .bind(parking_id)
                .execute(self.store.pool())
                .await?
            }
            (None, None) => return Ok(true),
        };
        Ok(result.rows_affected() > 0)
    }

    async fn try_create(&self, parking: NewParking) -> Result<Option<Parking>, ParkdeckError> {
        let features_json = serde_json::to_string(&parking.features)?;
        let result = sqlx::query(
            r#"
            INSERT INTO parkings
            (name, address, latitude, longitude, price_per_hour, total_spots, available_spots, features)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&parking.name)
        .bind(&parking.address)
        .bind(parking.latitude)
        .bind(parking.longitude)
        .bind(parking.price_per_hour)
        .bind(parking.total_spots)
        .bind(parking.available_spots)
        .bind(features_json)
        .execute(self.store.pool())
        .await?;
        self.try_get_by_id(result.last_insert_rowid()).await
    }
}
