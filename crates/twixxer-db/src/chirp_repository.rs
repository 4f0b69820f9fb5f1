use chrono::{DateTime, Utc};
use sqlx::{PgPool, Pool, Postgres};
use uuid::Uuid;

use twixxer_core::error::AppError;
use twixxer_core::models::{Chirp, ChirpWithAuthor, NewChirp};
use twixxer_core::pagination::{Page, PageRequest};
use twixxer_core::traits::ChirpStore;

use crate::database::{db_error, to_bigint};

/// Repository for the `chirp` table.
#[derive(Clone)]
pub struct ChirpRepository {
    pool: Pool<Postgres>,
}

impl ChirpRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Total number of chirps, optionally restricted to one author.
    pub async fn count(&self, profile_id: Option<Uuid>) -> Result<i64, AppError> {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM chirp WHERE ($1::uuid IS NULL OR profile_id = $1)",
        )
        .bind(profile_id)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(count)
    }
}

// -- Internal row types for sqlx deserialization --

#[derive(sqlx::FromRow)]
struct ChirpRow {
    id: Uuid,
    profile_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<ChirpRow> for Chirp {
    fn from(row: ChirpRow) -> Self {
        Chirp {
            id: row.id,
            profile_id: row.profile_id,
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ChirpWithAuthorRow {
    id: Uuid,
    profile_id: Uuid,
    content: String,
    created_at: DateTime<Utc>,
    username: String,
    image_url: Option<String>,
}

impl From<ChirpWithAuthorRow> for ChirpWithAuthor {
    fn from(row: ChirpWithAuthorRow) -> Self {
        ChirpWithAuthor {
            id: row.id,
            profile_id: row.profile_id,
            content: row.content,
            created_at: row.created_at,
            username: row.username,
            image_url: row.image_url,
        }
    }
}

// -- Trait implementation --

impl ChirpStore for ChirpRepository {
    async fn create(&self, chirp: &NewChirp) -> Result<Chirp, AppError> {
        let row = sqlx::query_as::<_, ChirpRow>(
            r#"
            INSERT INTO chirp (id, profile_id, content)
            VALUES ($1, $2, $3)
            RETURNING id, profile_id, content, created_at
            "#,
        )
        .bind(chirp.id)
        .bind(chirp.profile_id)
        .bind(&chirp.content)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error)?;

        Ok(row.into())
    }

    async fn feed_page(&self, page: PageRequest) -> Result<Page<ChirpWithAuthor>, AppError> {
        let rows = sqlx::query_as::<_, ChirpWithAuthorRow>(
            r#"
            SELECT c.id, c.profile_id, c.content, c.created_at, p.username, p.image_url
            FROM chirp c
            JOIN profile p ON p.id = c.profile_id
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(to_bigint(page.fetch_limit()))
        .bind(to_bigint(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let items = rows.into_iter().map(Into::into).collect();
        Ok(Page::from_lookahead(items, page))
    }

    async fn profile_page(
        &self,
        profile_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ChirpWithAuthor>, AppError> {
        let rows = sqlx::query_as::<_, ChirpWithAuthorRow>(
            r#"
            SELECT c.id, c.profile_id, c.content, c.created_at, p.username, p.image_url
            FROM chirp c
            JOIN profile p ON p.id = c.profile_id
            WHERE c.profile_id = $1
            ORDER BY c.created_at DESC, c.id DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(profile_id)
        .bind(to_bigint(page.fetch_limit()))
        .bind(to_bigint(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(db_error)?;

        let items = rows.into_iter().map(Into::into).collect();
        Ok(Page::from_lookahead(items, page))
    }
}
