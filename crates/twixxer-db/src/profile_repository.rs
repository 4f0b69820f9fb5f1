use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use twixxer_core::error::AppError;
use twixxer_core::models::{NewProfile, Profile, ProfileUpdate};
use twixxer_core::traits::ProfileStore;

use crate::database::{db_error, to_bigint};

/// Repository for the `profile` table.
#[derive(Clone)]
pub struct ProfileRepository {
    pool: Pool<Postgres>,
}

impl ProfileRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_one_where(&self, clause: &str, value: &str) -> Result<Option<Profile>, AppError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profile WHERE {clause} LIMIT 1");
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    /// Profiles ordered by signup time, newest first.
    pub async fn list(&self, limit: usize) -> Result<Vec<Profile>, AppError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profile ORDER BY created_at DESC LIMIT $1");
        let rows = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(to_bigint(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}

const PROFILE_COLUMNS: &str = "id, username, email, password_hash, about, image_url, verified, \
                               activation_token, token_expiry, created_at";

// -- Internal row type for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct ProfileRow {
    id: Uuid,
    username: String,
    email: String,
    password_hash: String,
    about: Option<String>,
    image_url: Option<String>,
    verified: bool,
    activation_token: Option<String>,
    token_expiry: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
}

impl From<ProfileRow> for Profile {
    fn from(row: ProfileRow) -> Self {
        Profile {
            id: row.id,
            username: row.username,
            email: row.email,
            password_hash: row.password_hash,
            about: row.about,
            image_url: row.image_url,
            verified: row.verified,
            activation_token: row.activation_token.map(|t| t.trim_end().to_string()),
            token_expiry: row.token_expiry,
            created_at: row.created_at,
        }
    }
}

// -- Trait implementation --

impl ProfileStore for ProfileRepository {
    async fn create(&self, profile: &NewProfile) -> Result<Profile, AppError> {
        let sql = format!(
            r#"
            INSERT INTO profile (id, username, email, password_hash, activation_token, token_expiry)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING {PROFILE_COLUMNS}
            "#
        );
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(profile.id)
            .bind(&profile.username)
            .bind(&profile.email)
            .bind(&profile.password_hash)
            .bind(&profile.activation_token)
            .bind(profile.token_expiry)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.into())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        let sql = format!("SELECT {PROFILE_COLUMNS} FROM profile WHERE id = $1");
        let row = sqlx::query_as::<_, ProfileRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_error)?;

        Ok(row.map(Into::into))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Profile>, AppError> {
        self.fetch_one_where("username = $1", username).await
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        self.fetch_one_where("lower(email) = lower($1)", email).await
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<Profile>, AppError> {
        self.fetch_one_where("(lower(email) = lower($1) OR username = $1)", login)
            .await
    }

    async fn find_by_activation_token(&self, token: &str) -> Result<Option<Profile>, AppError> {
        self.fetch_one_where("activation_token = $1", token).await
    }

    async fn mark_verified(&self, id: Uuid) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE profile
            SET verified = TRUE, activation_token = NULL, token_expiry = NULL
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn set_activation_token(
        &self,
        id: Uuid,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            UPDATE profile
            SET activation_token = $2, token_expiry = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(token)
        .bind(expiry)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(())
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE profile
            SET about = $2, image_url = $3
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&update.about)
        .bind(&update.image_url)
        .execute(&self.pool)
        .await
        .map_err(db_error)?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Profile not found: {id}")));
        }
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(db_error)?;
        Ok(())
    }
}
