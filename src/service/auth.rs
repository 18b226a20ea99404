use crate::db::models::{NewUser, PaymentMethod, User, UserProfile, UserUpdate, Vehicle};
use crate::db::sqlite::ParkingStore;
use crate::error::ParkdeckError;
use chrono::Utc;
use sqlx::Row;
use tracing::{error, warn};

/// Placeholder hash: the password concatenated with a timestamp. Not
/// cryptographically meaningful; a real credential scheme is out of scope.
fn hash_password(password: &str) -> String {
    format!("hashed_{password}_{}", Utc::now().timestamp_millis())
}

/// Placeholder verification that accepts any password once the user row is
/// found. Kept as an explicit stub, not a security property.
fn verify_password(_password: &str, _hash: &str) -> bool {
    true
}

/// User identity, profile aggregation and per-user reference data. Public
/// methods degrade to empty/negative results on store errors instead of
/// propagating them.
#[derive(Clone)]
pub struct AuthService {
    store: ParkingStore,
}

impl AuthService {
    pub fn new(store: ParkingStore) -> Self {
        Self { store }
    }

    /// Look the user up by email and return the aggregated profile view.
    /// Unknown email yields None; no existence-enumeration protection is
    /// attempted.
    pub async fn login(&self, email: &str, password: &str) -> Option<UserProfile> {
        match self.try_login(email, password).await {
            Ok(profile) => profile,
            Err(e) => {
                error!(email, error = %e, "login failed");
                None
            }
        }
    }

    /// Create a user. A duplicate email fails (pre-checked, with the unique
    /// column constraint as backstop) and yields None.
    pub async fn register(&self, user: NewUser) -> Option<UserProfile> {
        match self.try_register(user).await {
            Ok(profile) => profile,
            Err(e) => {
                error!(error = %e, "registration failed");
                None
            }
        }
    }

    /// Same aggregation as login, keyed by id instead of credential.
    pub async fn get_user_profile(&self, user_id: i64) -> Option<UserProfile> {
        match self.try_get_profile(user_id).await {
            Ok(profile) => profile,
            Err(e) => {
                error!(user_id, error = %e, "failed to load user profile");
                None
            }
        }
    }

    /// Update the supplied subset of {name, email, phone}. An empty update is
    /// a no-op success.
    pub async fn update_user_profile(&self, user_id: i64, update: UserUpdate) -> bool {
        match self.try_update_profile(user_id, update).await {
            Ok(updated) => updated,
            Err(e) => {
                error!(user_id, error = %e, "failed to update user profile");
                false
            }
        }
    }

    pub async fn get_payment_methods(&self, user_id: i64) -> Vec<PaymentMethod> {
        let result = sqlx::query(
            r#"
            SELECT id, user_id, type, last_four, is_default, created_at
            FROM payment_methods
            WHERE user_id = ?
            ORDER BY is_default DESC, created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.store.pool())
        .await;
        match result.map_err(ParkdeckError::from).and_then(|rows| {
            rows.iter().map(PaymentMethod::from_row).collect::<Result<Vec<_>, _>>()
        }) {
            Ok(methods) => methods,
            Err(e) => {
                error!(user_id, error = %e, "failed to load payment methods");
                Vec::new()
            }
        }
    }

    pub async fn get_vehicles(&self, user_id: i64) -> Vec<Vehicle> {
        let result = sqlx::query(
            r#"
            SELECT id, user_id, make, model, year, license_plate, color, is_default, created_at
            FROM vehicles
            WHERE user_id = ?
            ORDER BY is_default DESC, created_at ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(self.store.pool())
        .await;
        match result.map_err(ParkdeckError::from).and_then(|rows| {
            rows.iter().map(Vehicle::from_row).collect::<Result<Vec<_>, _>>()
        }) {
            Ok(vehicles) => vehicles,
            Err(e) => {
                error!(user_id, error = %e, "failed to load vehicles");
                Vec::new()
            }
        }
    }

    async fn try_login(
        &self,
        email: &str,
        password: &str,
    ) -> Result<Option<UserProfile>, ParkdeckError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, phone, password_hash, created_at, updated_at
            FROM users
            WHERE email = ? LIMIT 1
            "#,
        )
        .bind(email)
        .fetch_optional(self.store.pool())
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let user = User::from_row(&row)?;
        if !verify_password(password, &user.password_hash) {
            return Ok(None);
        }
        self.aggregate_profile(user).await.map(Some)
    }

    async fn try_register(&self, user: NewUser) -> Result<Option<UserProfile>, ParkdeckError> {
        let existing = sqlx::query("SELECT id FROM users WHERE email = ?")
            .bind(&user.email)
            .fetch_optional(self.store.pool())
            .await?;
        if existing.is_some() {
            warn!(email = %user.email, "email already registered");
            return Ok(None);
        }

        let password_hash = hash_password(&user.password);
        let result = sqlx::query(
            r#"
            INSERT INTO users (name, email, phone, password_hash)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.phone)
        .bind(password_hash)
        .execute(self.store.pool())
        .await?;

        Ok(Some(UserProfile {
            id: result.last_insert_rowid(),
            name: user.name,
            email: user.email,
            phone: user.phone,
            member_since: Utc::now().format("%B %Y").to_string(),
            total_reservations: 0,
            total_spent: 0,
            favorite_parking: None,
        }))
    }

    async fn try_get_profile(&self, user_id: i64) -> Result<Option<UserProfile>, ParkdeckError> {
        let row = sqlx::query(
            r#"
            SELECT id, name, email, phone, password_hash, created_at, updated_at
            FROM users
            WHERE id = ? LIMIT 1
            "#,
        )
        .bind(user_id)
        .fetch_optional(self.store.pool())
        .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let user = User::from_row(&row)?;
        self.aggregate_profile(user).await.map(Some)
    }

    async fn try_update_profile(
        &self,
        user_id: i64,
        update: UserUpdate,
    ) -> Result<bool, ParkdeckError> {
        if update.is_empty() {
            return Ok(true);
        }

        let mut sets: Vec<&str> = Vec::new();
        let mut values: Vec<&str> = Vec::new();
        if let Some(name) = update.name.as_deref() {
            sets.push("name = ?");
            values.push(name);
        }
        if let Some(email) = update.email.as_deref() {
            sets.push("email = ?");
            values.push(email);
        }
        if let Some(phone) = update.phone.as_deref() {
            sets.push("phone = ?");
            values.push(phone);
        }
        sets.push("updated_at = CURRENT_TIMESTAMP");

        let query = format!("UPDATE users SET {} WHERE id = ?", sets.join(", "));
        let mut q = sqlx::query(&query);
        for value in values {
            q = q.bind(value);
        }
        let result = q.bind(user_id).execute(self.store.pool()).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Total reservation count and spend (all statuses) plus the most
    /// frequently reserved lot. Exact ties take the store's count-descending
    /// order.
    async fn aggregate_profile(&self, user: User) -> Result<UserProfile, ParkdeckError> {
        let stats = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS total_reservations,
                COALESCE(SUM(amount), 0) AS total_spent
            FROM reservations
            WHERE user_id = ?
            "#,
        )
        .bind(user.id)
        .fetch_one(self.store.pool())
        .await?;

        let favorite = sqlx::query(
            r#"
            SELECT p.name
            FROM reservations r
            JOIN parkings p ON r.parking_id = p.id
            WHERE r.user_id = ?
            GROUP BY r.parking_id
            ORDER BY COUNT(*) DESC
            LIMIT 1
            "#,
        )
        .bind(user.id)
        .fetch_optional(self.store.pool())
        .await?;
        let favorite_parking = favorite.map(|row| row.try_get("name")).transpose()?;

        Ok(UserProfile {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
            member_since: user.created_at.format("%B %Y").to_string(),
            total_reservations: stats.try_get("total_reservations")?,
            total_spent: stats.try_get("total_spent")?,
            favorite_parking,
        })
    }
}
