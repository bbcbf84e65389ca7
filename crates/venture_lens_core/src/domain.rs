//! crates/venture_lens_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::schema::BusinessAnalysis;

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub created_at: DateTime<Utc>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub hashed_password: String,
    pub created_at: DateTime<Utc>,
}

impl UserCredentials {
    pub fn to_user(&self) -> User {
        User {
            id: self.user_id,
            email: self.email.clone(),
            name: self.name.clone(),
            created_at: self.created_at,
        }
    }
}

/// A persisted business-idea analysis.
///
/// Exactly one of `user_id` / `session_id` is set at the moment of
/// persistence. Once `user_id` is set it is never cleared back to a
/// guest tag; the claim flow only moves records in the other direction.
#[derive(Debug, Clone)]
pub struct AnalysisRecord {
    pub id: Uuid,
    pub user_id: Option<Uuid>,
    pub session_id: Option<String>,
    pub business_idea: String,
    pub analysis: BusinessAnalysis,
    pub created_at: DateTime<Utc>,
}

/// One page of a user's analysis history, newest first.
#[derive(Debug, Clone)]
pub struct Page {
    pub records: Vec<AnalysisRecord>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
}

impl Page {
    pub fn has_next_page(&self) -> bool {
        self.current_page < self.total_pages
    }

    pub fn has_prev_page(&self) -> bool {
        self.current_page > 1
    }
}
