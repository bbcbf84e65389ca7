//! services/api/src/web/docs.rs
//!
//! The master definition for the OpenAPI specification.

use utoipa::OpenApi;

use crate::web::{analysis, auth};

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::signup_handler,
        auth::login_handler,
        auth::claim_profile_handler,
        auth::profile_handler,
        analysis::analyze_handler,
        analysis::history_handler,
        analysis::get_analysis_handler,
        analysis::delete_analysis_handler,
        analysis::dashboard_stats_handler,
    ),
    components(schemas(
        auth::SignupRequest,
        auth::LoginRequest,
        auth::AuthResponse,
        auth::UserBody,
        auth::ClaimProfileRequest,
        auth::ClaimProfileResponse,
        auth::ProfileResponse,
        analysis::AnalyzeRequest,
        analysis::AnalyzeResponse,
        analysis::RecordBody,
        analysis::HistoryResponse,
        analysis::Pagination,
        analysis::DeleteResponse,
        analysis::DashboardResponse,
        analysis::DashboardStats,
        analysis::RecentSearch,
    )),
    tags(
        (name = "auth", description = "Accounts, login, and guest-profile claiming."),
        (name = "analysis", description = "Business-idea analysis and history.")
    )
)]
pub struct ApiDoc;
