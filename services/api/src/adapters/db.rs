//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `DatabaseService` port from the `core` crate. It handles all interactions
//! with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use venture_lens_core::domain::{AnalysisRecord, Page, User, UserCredentials};
use venture_lens_core::ports::{DatabaseService, PortError, PortResult};
use venture_lens_core::schema::BusinessAnalysis;

/// Postgres unique-violation SQLSTATE, used to surface duplicate emails.
const UNIQUE_VIOLATION: &str = "23505";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `DatabaseService` port.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    email: String,
    name: String,
    created_at: DateTime<Utc>,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            id: self.id,
            email: self.email,
            name: self.name,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    email: String,
    name: String,
    hashed_password: String,
    created_at: DateTime<Utc>,
}

impl CredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.id,
            email: self.email,
            name: self.name,
            hashed_password: self.hashed_password,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct AnalysisRow {
    id: Uuid,
    user_id: Option<Uuid>,
    session_id: Option<String>,
    business_idea: String,
    analysis: serde_json::Value,
    created_at: DateTime<Utc>,
}

impl AnalysisRow {
    fn to_domain(self) -> PortResult<AnalysisRecord> {
        let analysis: BusinessAnalysis = serde_json::from_value(self.analysis)
            .map_err(|e| PortError::Unexpected(format!("stored analysis is unreadable: {e}")))?;
        Ok(AnalysisRecord {
            id: self.id,
            user_id: self.user_id,
            session_id: self.session_id,
            business_idea: self.business_idea,
            analysis,
            created_at: self.created_at,
        })
    }
}

//=========================================================================================
// `DatabaseService` Trait Implementation
//=========================================================================================

#[async_trait]
impl DatabaseService for DbAdapter {
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record: UserRecord = sqlx::query_as(
            "INSERT INTO users (id, email, name, hashed_password) VALUES ($1, $2, $3, $4) \
             RETURNING id, email, name, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(name)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                PortError::AlreadyExists("An account with this email already exists".to_string())
            } else {
                unexpected(e)
            }
        })?;
        Ok(record.to_domain())
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        let record: Option<CredentialsRecord> = sqlx::query_as(
            "SELECT id, email, name, hashed_password, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.map(CredentialsRecord::to_domain))
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        let record: Option<UserRecord> =
            sqlx::query_as("SELECT id, email, name, created_at FROM users WHERE id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(unexpected)?;
        record
            .map(UserRecord::to_domain)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn count_analyses_for_user(&self, user_id: Uuid) -> PortResult<u64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM analysis_records WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(&self.pool)
                .await
                .map_err(unexpected)?;
        Ok(count as u64)
    }

    async fn create_analysis(
        &self,
        user_id: Option<Uuid>,
        session_id: Option<&str>,
        business_idea: &str,
        analysis: &BusinessAnalysis,
    ) -> PortResult<AnalysisRecord> {
        let payload = serde_json::to_value(analysis)
            .map_err(|e| PortError::Unexpected(format!("analysis is unserializable: {e}")))?;

        let row: AnalysisRow = sqlx::query_as(
            "INSERT INTO analysis_records (id, user_id, session_id, business_idea, analysis) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, user_id, session_id, business_idea, analysis, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(session_id)
        .bind(business_idea)
        .bind(payload)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        row.to_domain()
    }

    async fn list_analyses(&self, user_id: Uuid, page: u32, limit: u32) -> PortResult<Page> {
        let offset = (page.saturating_sub(1) as i64) * (limit as i64);

        let rows: Vec<AnalysisRow> = sqlx::query_as(
            "SELECT id, user_id, session_id, business_idea, analysis, created_at \
             FROM analysis_records WHERE user_id = $1 \
             ORDER BY created_at DESC OFFSET $2 LIMIT $3",
        )
        .bind(user_id)
        .bind(offset)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        let total_count = self.count_analyses_for_user(user_id).await?;
        let total_pages = (total_count as f64 / limit as f64).ceil() as u32;

        let records = rows
            .into_iter()
            .map(AnalysisRow::to_domain)
            .collect::<PortResult<Vec<_>>>()?;

        Ok(Page {
            records,
            current_page: page,
            total_pages,
            total_count,
        })
    }

    async fn find_analysis(
        &self,
        id: Uuid,
        user_id: Option<Uuid>,
    ) -> PortResult<AnalysisRecord> {
        // Users see their own records; anonymous callers only unowned ones.
        let row: Option<AnalysisRow> = match user_id {
            Some(user_id) => {
                sqlx::query_as(
                    "SELECT id, user_id, session_id, business_idea, analysis, created_at \
                     FROM analysis_records WHERE id = $1 AND user_id = $2",
                )
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await
            }
            None => {
                sqlx::query_as(
                    "SELECT id, user_id, session_id, business_idea, analysis, created_at \
                     FROM analysis_records WHERE id = $1 AND user_id IS NULL",
                )
                .bind(id)
                .fetch_optional(&self.pool)
                .await
            }
        }
        .map_err(unexpected)?;
        row.map(AnalysisRow::to_domain)
            .transpose()?
            .ok_or_else(|| PortError::NotFound(format!("Analysis {} not found", id)))
    }

    async fn delete_analysis(&self, id: Uuid, user_id: Uuid) -> PortResult<()> {
        // The delete itself is conditional on ownership, so a concurrent
        // claim or delete cannot remove someone else's record.
        let result = sqlx::query("DELETE FROM analysis_records WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Nothing deleted: distinguish a missing record from someone else's.
        let exists = sqlx::query("SELECT 1 FROM analysis_records WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        match exists {
            Some(_) => Err(PortError::Forbidden),
            None => Err(PortError::NotFound(format!("Analysis {} not found", id))),
        }
    }

    async fn claim_guest_records(&self, session_id: &str, user_id: Uuid) -> PortResult<u64> {
        // One conditional bulk update. The `user_id IS NULL` guard makes two
        // racing claims resolve to exactly one winner per record without any
        // application-level lock.
        let result = sqlx::query(
            "UPDATE analysis_records SET user_id = $2, session_id = NULL \
             WHERE session_id = $1 AND user_id IS NULL",
        )
        .bind(session_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(result.rows_affected())
    }
}
