//! User and profile repository implementation

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use core_kernel::UserId;
use domain_invoicing::{normalize_email, ProfileChanges, User, UserProfile};

use crate::error::DatabaseError;

/// Repository for accounts and their profiles
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn find_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(normalize_email(email))
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(User::from))
    }

    /// Inserts the user and its profile in one transaction
    ///
    /// A duplicate email surfaces as `DatabaseError::DuplicateEntry`.
    pub async fn insert(&self, user: &User, profile: &UserProfile) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO users (id, email, password_hash, created_at) VALUES ($1, $2, $3, $4)")
            .bind(*user.id.as_uuid())
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.created_at)
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            r#"
            INSERT INTO user_profiles (
                user_id, first_name, last_name, company_name, address, tax_id
            ) VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(*user.id.as_uuid())
        .bind(&profile.first_name)
        .bind(&profile.last_name)
        .bind(&profile.company_name)
        .bind(&profile.address)
        .bind(&profile.tax_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    pub async fn find_profile(&self, user_id: UserId) -> Result<Option<UserProfile>, DatabaseError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            SELECT user_id, first_name, last_name, company_name, address, tax_id
            FROM user_profiles
            WHERE user_id = $1
            "#,
        )
        .bind(*user_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserProfile::from))
    }

    /// Applies the present fields and returns the stored profile
    ///
    /// An empty change set only reads the profile.
    pub async fn update_profile(
        &self,
        user_id: UserId,
        changes: &ProfileChanges,
    ) -> Result<Option<UserProfile>, DatabaseError> {
        if changes.is_empty() {
            return self.find_profile(user_id).await;
        }

        let row = sqlx::query_as::<_, ProfileRow>(
            r#"
            UPDATE user_profiles
            SET first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                company_name = COALESCE($4, company_name),
                address = COALESCE($5, address),
                tax_id = COALESCE($6, tax_id)
            WHERE user_id = $1
            RETURNING user_id, first_name, last_name, company_name, address, tax_id
            "#,
        )
        .bind(*user_id.as_uuid())
        .bind(&changes.first_name)
        .bind(&changes.last_name)
        .bind(&changes.company_name)
        .bind(&changes.address)
        .bind(&changes.tax_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(UserProfile::from))
    }
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: UserId::from_uuid(row.id),
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    user_id: Uuid,
    first_name: Option<String>,
    last_name: Option<String>,
    company_name: Option<String>,
    address: Option<String>,
    tax_id: Option<String>,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        UserProfile {
            user_id: UserId::from_uuid(row.user_id),
            first_name: row.first_name,
            last_name: row.last_name,
            company_name: row.company_name,
            address: row.address,
            tax_id: row.tax_id,
        }
    }
}
