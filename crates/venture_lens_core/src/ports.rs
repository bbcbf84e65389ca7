//! crates/venture_lens_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{AnalysisRecord, Page, User, UserCredentials};
use crate::schema::BusinessAnalysis;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Already exists: {0}")]
    AlreadyExists(String),
    #[error("Forbidden")]
    Forbidden,
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait DatabaseService: Send + Sync {
    // --- User Management ---

    /// Creates a user; emails are stored normalized and unique. Returns
    /// `AlreadyExists` when the email is taken.
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>>;

    async fn find_user_by_id(&self, user_id: Uuid) -> PortResult<User>;

    async fn count_analyses_for_user(&self, user_id: Uuid) -> PortResult<u64>;

    // --- Analysis Records ---

    /// Persists one analysis. Exactly one of `user_id` / `session_id` must
    /// be supplied by the caller.
    async fn create_analysis(
        &self,
        user_id: Option<Uuid>,
        session_id: Option<&str>,
        business_idea: &str,
        analysis: &BusinessAnalysis,
    ) -> PortResult<AnalysisRecord>;

    /// One page of a user's records, newest first. `page` is 1-based.
    async fn list_analyses(&self, user_id: Uuid, page: u32, limit: u32) -> PortResult<Page>;

    /// Fetches a record visible to the given identity: a user sees their own
    /// records, an anonymous caller sees only unowned ones.
    async fn find_analysis(&self, id: Uuid, user_id: Option<Uuid>)
        -> PortResult<AnalysisRecord>;

    /// Deletes a record iff it belongs to `user_id`.
    async fn delete_analysis(&self, id: Uuid, user_id: Uuid) -> PortResult<()>;

    /// Transfers ownership of every record tagged with `session_id` and not
    /// yet owned to `user_id`, clearing the tag, as one conditional bulk
    /// update. Returns how many records were claimed; zero is a valid
    /// outcome, so retries after a successful claim are harmless.
    async fn claim_guest_records(&self, session_id: &str, user_id: Uuid) -> PortResult<u64>;
}

/// The external generative model, reduced to its interface: idea text in,
/// raw untrusted text out. Coercion into the schema happens in `repair`.
#[async_trait]
pub trait IdeaAnalysisService: Send + Sync {
    async fn analyze(&self, business_idea: &str) -> PortResult<String>;

    /// Label stamped into provenance metadata.
    fn model_label(&self) -> &str;
}
