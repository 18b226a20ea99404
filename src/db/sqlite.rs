use crate::db::schema::{SQLITE_DROP, SQLITE_INIT};
use crate::error::ParkdeckError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Row, Sqlite};
use std::str::FromStr;
use tracing::info;

pub type SqlitePool = Pool<Sqlite>;

/// Handle to the embedded store. Cheap to clone; one is passed to each
/// service. A `ParkingStore` that exists has its schema created, so there is
/// no separate "uninitialized" state to guard against.
#[derive(Clone)]
pub struct ParkingStore {
    pool: SqlitePool,
}

impl ParkingStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Open (creating the file if missing) and initialize the schema.
    pub async fn open(database_url: &str) -> Result<Self, ParkdeckError> {
        let connect_opts = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new().connect_with(connect_opts).await?;
        let store = Self::new(pool);
        store.init_schema().await?;
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Create all tables idempotently by executing the bundled DDL.
    pub async fn init_schema(&self) -> Result<(), ParkdeckError> {
        // execute multiple statements safely (SQLite supports multi-commands but sqlx::query doesn't)
        for stmt in SQLITE_INIT.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Insert the demonstration data set: one user, four lots, four completed
    /// reservations, one payment method, one vehicle. Skipped when the user
    /// table already holds rows. Returns whether seeding ran.
    pub async fn seed_demo_data(&self) -> Result<bool, ParkdeckError> {
        let row = sqlx::query("SELECT COUNT(*) AS count FROM users")
            .fetch_one(&self.pool)
            .await?;
        let count: i64 = row.try_get("count")?;
        if count > 0 {
            info!("store already holds data, skipping seed");
            return Ok(false);
        }

        let user = sqlx::query(
            r#"
            INSERT INTO users (name, email, phone, password_hash)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind("Juan Carlos Pérez")
        .bind("juan.perez@email.com")
        .bind("+502 1234-5678")
        .bind("hashed_password_123")
        .execute(&self.pool)
        .await?;
        let user_id = user.last_insert_rowid();

        let parkings: [(&str, &str, i64, i64, i64, &[&str], &str); 4] = [
            (
                "Centro Comercial Plaza",
                "Av. Principal 123, Centro",
                2500,
                100,
                15,
                &["Cámaras", "Sensores", "QR"],
                "available",
            ),
            (
                "Parqueo Municipal Norte",
                "Calle 5ta Norte, Zona 1",
                1800,
                50,
                3,
                &["Sensores", "QR"],
                "limited",
            ),
            (
                "Torre Empresarial",
                "Blvd. Los Próceres 445",
                3200,
                200,
                0,
                &["Cámaras", "Sensores", "QR", "Valet"],
                "full",
            ),
            (
                "Estadio Nacional",
                "Av. del Deporte s/n",
                1500,
                300,
                45,
                &["Sensores"],
                "available",
            ),
        ];
        for (name, address, price, total, available, features, status) in parkings {
            let features_json = serde_json::to_string(features)?;
            sqlx::query(
                r#"
                INSERT INTO parkings
                (name, address, price_per_hour, total_spots, available_spots, features, status)
                VALUES (?, ?, ?, ?, ?, ?, ?)
                "#,
            )
            .bind(name)
            .bind(address)
            .bind(price)
            .bind(total)
            .bind(available)
            .bind(features_json)
            .bind(status)
            .execute(&self.pool)
            .await?;
        }

        let reservations: [(i64, &str, &str, i64, i64); 4] = [
            (1, "2024-01-15 14:30:00", "2024-01-15 17:45:00", 195, 8125),
            (3, "2024-01-12 09:00:00", "2024-01-12 18:00:00", 540, 28800),
            (2, "2024-01-10 12:15:00", "2024-01-10 16:30:00", 255, 7650),
            (4, "2024-01-08 19:00:00", "2024-01-08 23:00:00", 240, 6000),
        ];
        for (parking_id, start, end, duration, amount) in reservations {
            sqlx::query(
                r#"
                INSERT INTO reservations
                (user_id, parking_id, start_time, end_time, duration_minutes, amount, status)
                VALUES (?, ?, ?, ?, ?, ?, 'completed')
                "#,
            )
            .bind(user_id)
            .bind(parking_id)
            .bind(start)
            .bind(end)
            .bind(duration)
            .bind(amount)
            .execute(&self.pool)
            .await?;
        }

        sqlx::query(
            r#"
            INSERT INTO payment_methods (user_id, type, last_four, is_default)
            VALUES (?, 'card', '4532', 1)
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO vehicles (user_id, make, model, year, license_plate, color, is_default)
            VALUES (?, 'Honda', 'Civic', 2020, 'P123456', 'Blanco', 1)
            "#,
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        info!("demo data seeded");
        Ok(true)
    }

    /// Drop and recreate every table, then re-seed. Debug affordance only.
    pub async fn reset(&self) -> Result<(), ParkdeckError> {
        for stmt in SQLITE_DROP.split(';') {
            let s = stmt.trim();
            if s.is_empty() {
                continue;
            }
            sqlx::query(s).execute(&self.pool).await?;
        }
        self.init_schema().await?;
        self.seed_demo_data().await?;
        Ok(())
    }

    /// Explicit teardown; pending acquires fail after this.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}
