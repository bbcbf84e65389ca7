//! services/api/src/web/analysis.rs
//!
//! The analysis endpoints. `analyze_handler` drives one submission end to
//! end: input validation, owner-or-guest tag resolution, the bounded model
//! call, contract repair, and the persistence write. The remaining handlers
//! are the owner-scoped read/delete surface over persisted records.

use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::error::ApiError;
use crate::web::middleware::CallerIdentity;
use crate::web::state::AppState;
use venture_lens_core::domain::AnalysisRecord;
use venture_lens_core::schema::{BusinessAnalysis, ViabilityScore};
use venture_lens_core::{guest, repair};

/// Ceiling on submitted idea length, in code points.
pub const MAX_IDEA_CHARS: usize = 1000;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    pub business_idea: String,
    pub session_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    /// The validated analysis payload (full field set, always present).
    #[schema(value_type = Object)]
    pub analysis: BusinessAnalysis,
    pub record_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordBody {
    pub id: Uuid,
    pub business_idea: String,
    #[schema(value_type = Object)]
    pub analysis: BusinessAnalysis,
    pub created_at: DateTime<Utc>,
}

impl From<AnalysisRecord> for RecordBody {
    fn from(record: AnalysisRecord) -> Self {
        Self {
            id: record.id,
            business_idea: record.business_idea,
            analysis: record.analysis,
            created_at: record.created_at,
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct HistoryParams {
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_count: u64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HistoryResponse {
    pub records: Vec<RecordBody>,
    pub pagination: Pagination,
}

#[derive(Serialize, ToSchema)]
pub struct DeleteResponse {
    pub ok: bool,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecentSearch {
    pub id: Uuid,
    pub business_idea: String,
    #[schema(value_type = Object)]
    pub viability_score: ViabilityScore,
    pub created_at: DateTime<Utc>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_searches: u64,
    pub recent_searches: Vec<RecentSearch>,
    pub top_categories: Vec<String>,
}

#[derive(Serialize, ToSchema)]
pub struct DashboardResponse {
    pub stats: DashboardStats,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /analysis/analyze - Analyze a business idea (guest or authenticated)
///
/// Guests get (or keep) an opaque session id tagging their records for a
/// later claim; authenticated users get records owned outright. The repaired
/// analysis always satisfies the schema, so a model that returned garbage
/// still yields a well-formed (fallback) response.
#[utoipa::path(
    post,
    path = "/analysis/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis completed", body = AnalyzeResponse),
        (status = 400, description = "Empty or over-long idea"),
        (status = 503, description = "Model or storage unavailable")
    ),
    tag = "analysis"
)]
pub async fn analyze_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Input constraints are checked before any external call is made.
    let idea = req.business_idea.trim();
    if idea.is_empty() {
        return Err(ApiError::validation(
            "Business idea is required",
            Some("businessIdea"),
        ));
    }
    if idea.chars().count() > MAX_IDEA_CHARS {
        return Err(ApiError::validation(
            format!("Business idea must be at most {MAX_IDEA_CHARS} characters"),
            Some("businessIdea"),
        ));
    }

    // Exactly one of owner / guest tag, resolved up front. The session id is
    // echoed back only when this request minted it.
    let (owner, session_tag, minted) = match identity.0 {
        Some(user_id) => (Some(user_id), None, false),
        None => {
            let minted = req.session_id.as_deref().map_or(true, |s| s.trim().is_empty());
            let tag = guest::ensure(req.session_id.as_deref());
            (None, Some(tag), minted)
        }
    };

    let timeout = Duration::from_secs(state.config.model_timeout_secs);
    let raw = match tokio::time::timeout(timeout, state.analyst.analyze(idea)).await {
        Ok(Ok(text)) => text,
        Ok(Err(e)) => {
            warn!("model call failed: {e}");
            return Err(ApiError::AnalysisUnavailable);
        }
        Err(_) => {
            warn!("model call timed out after {}s", timeout.as_secs());
            return Err(ApiError::AnalysisUnavailable);
        }
    };

    // Never fails; worst case is the deterministic fallback payload.
    let analysis = repair::repair(&raw, idea, state.analyst.model_label(), Utc::now());

    let record = state
        .db
        .create_analysis(owner, session_tag.as_deref(), idea, &analysis)
        .await
        .map_err(|e| {
            warn!("analysis persistence failed: {e}");
            ApiError::AnalysisUnavailable
        })?;

    info!(
        record_id = %record.id,
        owned = owner.is_some(),
        fallback = analysis.metadata.fallback,
        "analysis stored"
    );

    Ok(Json(AnalyzeResponse {
        analysis,
        record_id: record.id,
        session_id: if minted { session_tag } else { None },
    }))
}

/// GET /analysis/history - Paginated analysis history for the current user
#[utoipa::path(
    get,
    path = "/analysis/history",
    params(
        ("page" = Option<u32>, Query, description = "1-based page number"),
        ("limit" = Option<u32>, Query, description = "Records per page, at most 50")
    ),
    responses(
        (status = 200, description = "One page of records", body = HistoryResponse),
        (status = 401, description = "Not logged in")
    ),
    tag = "analysis"
)]
pub async fn history_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
    Query(params): Query<HistoryParams>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = identity.0.ok_or(ApiError::Unauthorized)?;

    let page = params.page.unwrap_or(1).max(1);
    let limit = params.limit.unwrap_or(10).clamp(1, 50);

    let result = state.db.list_analyses(user_id, page, limit).await?;

    let pagination = Pagination {
        current_page: result.current_page,
        total_pages: result.total_pages,
        total_count: result.total_count,
        has_next_page: result.has_next_page(),
        has_prev_page: result.has_prev_page(),
    };

    Ok(Json(HistoryResponse {
        records: result.records.into_iter().map(RecordBody::from).collect(),
        pagination,
    }))
}

/// GET /analysis/search/:id - Fetch one analysis
///
/// Users can fetch their own records; anonymous callers can fetch only
/// records that nobody owns yet.
#[utoipa::path(
    get,
    path = "/analysis/search/{id}",
    params(("id" = Uuid, Path, description = "Analysis record id")),
    responses(
        (status = 200, description = "The record", body = RecordBody),
        (status = 404, description = "No matching record for this identity")
    ),
    tag = "analysis"
)]
pub async fn get_analysis_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let record = state.db.find_analysis(id, identity.0).await?;
    Ok(Json(RecordBody::from(record)))
}

/// DELETE /analysis/search/:id - Delete an owned analysis
#[utoipa::path(
    delete,
    path = "/analysis/search/{id}",
    params(("id" = Uuid, Path, description = "Analysis record id")),
    responses(
        (status = 200, description = "Deleted", body = DeleteResponse),
        (status = 401, description = "Not logged in"),
        (status = 403, description = "Owned by a different user"),
        (status = 404, description = "No such record")
    ),
    tag = "analysis"
)]
pub async fn delete_analysis_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = identity.0.ok_or(ApiError::Unauthorized)?;
    state.db.delete_analysis(id, user_id).await?;
    Ok(Json(DeleteResponse { ok: true }))
}

/// GET /analysis/dashboard/stats - Summary counters for the current user
#[utoipa::path(
    get,
    path = "/analysis/dashboard/stats",
    responses(
        (status = 200, description = "Dashboard summary", body = DashboardResponse),
        (status = 401, description = "Not logged in")
    ),
    tag = "analysis"
)]
pub async fn dashboard_stats_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<CallerIdentity>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = identity.0.ok_or(ApiError::Unauthorized)?;

    let page = state.db.list_analyses(user_id, 1, 5).await?;

    let recent_searches = page
        .records
        .into_iter()
        .map(|record| RecentSearch {
            id: record.id,
            business_idea: record.business_idea,
            viability_score: record.analysis.viability_score,
            created_at: record.created_at,
        })
        .collect();

    Ok(Json(DashboardResponse {
        stats: DashboardStats {
            total_searches: page.total_count,
            recent_searches,
            // No category field is stored per record, so there is nothing
            // to aggregate yet.
            top_categories: Vec::new(),
        },
    }))
}
