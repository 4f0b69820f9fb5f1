use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use twixxer_core::AppError;

use crate::chirp_repository::ChirpRepository;
use crate::config::DatabaseConfig;
use crate::profile_repository::ProfileRepository;

/// Central database facade: owns the connection pool, runs migrations,
/// and vends repository instances.
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to PostgreSQL with the given configuration.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, AppError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .connect(&config.url)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Failed to connect: {e}")))?;

        Ok(Self { pool })
    }

    /// Create a `Database` from an existing pool (useful for testing).
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run all pending migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| AppError::DatabaseError(format!("Migration failed: {e}")))?;
        tracing::info!("Database migrations applied");
        Ok(())
    }

    /// Get a [`ProfileRepository`] backed by this pool.
    pub fn profile_repo(&self) -> ProfileRepository {
        ProfileRepository::new(self.pool.clone())
    }

    /// Get a [`ChirpRepository`] backed by this pool.
    pub fn chirp_repo(&self) -> ChirpRepository {
        ChirpRepository::new(self.pool.clone())
    }

    /// Get a reference to the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Map a sqlx error, turning unique-constraint violations into conflicts.
pub(crate) fn db_error(err: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = match db_err.constraint() {
                Some("profile_username_key") => "Username is already taken",
                Some("profile_email_key") => "Email is already registered",
                _ => "Record already exists",
            };
            return AppError::Conflict(message.to_string());
        }
    }
    AppError::DatabaseError(err.to_string())
}

/// Convert a row count or offset for binding as `BIGINT`, saturating
/// instead of wrapping negative.
pub(crate) fn to_bigint(n: usize) -> i64 {
    i64::try_from(n).unwrap_or(i64::MAX)
}
