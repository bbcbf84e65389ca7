//! End-to-end tests of the analyze and claim flows over in-memory ports.
//!
//! Handlers are plain async functions, so they are exercised directly with
//! constructed extractors and a mock database / mock model behind the usual
//! `AppState`.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{header, Method, Request, StatusCode};
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::routing::delete;
use axum::{Extension, Json, Router};
use chrono::{Duration, Utc};
use tower::ServiceExt;
use uuid::Uuid;

use api_lib::auth::TokenService;
use api_lib::config::Config;
use api_lib::error::ApiError;
use api_lib::web::analysis::{
    analyze_handler, dashboard_stats_handler, delete_analysis_handler, get_analysis_handler,
    history_handler, AnalyzeRequest, HistoryParams, MAX_IDEA_CHARS,
};
use api_lib::web::auth::{
    claim_profile_handler, login_handler, signup_handler, ClaimProfileRequest, LoginRequest,
    SignupRequest,
};
use api_lib::web::middleware::{require_auth, CallerIdentity};
use api_lib::web::state::AppState;
use venture_lens_core::domain::{AnalysisRecord, Page, User, UserCredentials};
use venture_lens_core::ports::{
    DatabaseService, IdeaAnalysisService, PortError, PortResult,
};
use venture_lens_core::schema::BusinessAnalysis;

//=========================================================================================
// In-memory ports
//=========================================================================================

#[derive(Default)]
struct MemDb {
    users: Mutex<Vec<UserCredentials>>,
    records: Mutex<Vec<AnalysisRecord>>,
}

#[async_trait]
impl DatabaseService for MemDb {
    async fn create_user(
        &self,
        email: &str,
        name: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(PortError::AlreadyExists(
                "An account with this email already exists".to_string(),
            ));
        }
        let creds = UserCredentials {
            user_id: Uuid::new_v4(),
            email: email.to_string(),
            name: name.to_string(),
            hashed_password: hashed_password.to_string(),
            created_at: Utc::now(),
        };
        users.push(creds.clone());
        Ok(creds.to_user())
    }

    async fn find_user_by_email(&self, email: &str) -> PortResult<Option<UserCredentials>> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn find_user_by_id(&self, user_id: Uuid) -> PortResult<User> {
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.user_id == user_id)
            .map(UserCredentials::to_user)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn count_analyses_for_user(&self, user_id: Uuid) -> PortResult<u64> {
        Ok(self
            .records
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.user_id == Some(user_id))
            .count() as u64)
    }

    async fn create_analysis(
        &self,
        user_id: Option<Uuid>,
        session_id: Option<&str>,
        business_idea: &str,
        analysis: &BusinessAnalysis,
    ) -> PortResult<AnalysisRecord> {
        let record = AnalysisRecord {
            id: Uuid::new_v4(),
            user_id,
            session_id: session_id.map(str::to_string),
            business_idea: business_idea.to_string(),
            analysis: analysis.clone(),
            created_at: Utc::now(),
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn list_analyses(&self, user_id: Uuid, page: u32, limit: u32) -> PortResult<Page> {
        let records = self.records.lock().unwrap();
        let mut mine: Vec<AnalysisRecord> = records
            .iter()
            .filter(|r| r.user_id == Some(user_id))
            .cloned()
            .collect();
        mine.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let total_count = mine.len() as u64;
        let total_pages = (total_count as f64 / limit as f64).ceil() as u32;
        let start = ((page - 1) * limit) as usize;
        let page_records = mine.into_iter().skip(start).take(limit as usize).collect();

        Ok(Page {
            records: page_records,
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
        self.records
            .lock()
            .unwrap()
            .iter()
            .find(|r| r.id == id && r.user_id == user_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Analysis {} not found", id)))
    }

    async fn delete_analysis(&self, id: Uuid, user_id: Uuid) -> PortResult<()> {
        let mut records = self.records.lock().unwrap();
        let Some(pos) = records.iter().position(|r| r.id == id) else {
            return Err(PortError::NotFound(format!("Analysis {} not found", id)));
        };
        if records[pos].user_id != Some(user_id) {
            return Err(PortError::Forbidden);
        }
        records.remove(pos);
        Ok(())
    }

    async fn claim_guest_records(&self, session_id: &str, user_id: Uuid) -> PortResult<u64> {
        // The lock plays the role the database's atomic update-many plays in
        // production: match-then-set happens in one step.
        let mut records = self.records.lock().unwrap();
        let mut claimed = 0;
        for record in records.iter_mut() {
            if record.session_id.as_deref() == Some(session_id) && record.user_id.is_none() {
                record.user_id = Some(user_id);
                record.session_id = None;
                claimed += 1;
            }
        }
        Ok(claimed)
    }
}

/// A model stub returning a canned response, an error, or raw garbage.
struct StubModel {
    response: Result<String, String>,
    called: AtomicBool,
}

impl StubModel {
    fn returning(raw: &str) -> Self {
        Self {
            response: Ok(raw.to_string()),
            called: AtomicBool::new(false),
        }
    }

    fn failing() -> Self {
        Self {
            response: Err("connection refused".to_string()),
            called: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl IdeaAnalysisService for StubModel {
    async fn analyze(&self, _business_idea: &str) -> PortResult<String> {
        self.called.store(true, Ordering::SeqCst);
        self.response
            .clone()
            .map_err(PortError::Unexpected)
    }

    fn model_label(&self) -> &str {
        "stub-model"
    }
}

//=========================================================================================
// Harness
//=========================================================================================

const VALID_MODEL_OUTPUT: &str = r#"{"viabilityScore": {"overall": 70, "market": 60, "financial": 65, "regulatory": 80, "explanation": "plausible"}}"#;

fn test_config() -> Config {
    Config {
        bind_address: "127.0.0.1:0".parse().unwrap(),
        database_url: "postgres://unused".to_string(),
        log_level: tracing::Level::INFO,
        openai_api_key: None,
        analysis_model: "stub-model".to_string(),
        jwt_secret: "test-secret".to_string(),
        token_ttl_days: 7,
        model_timeout_secs: 5,
        cors_origin: "http://localhost:3001".to_string(),
    }
}

fn app_state(db: Arc<MemDb>, model: Arc<StubModel>) -> Arc<AppState> {
    Arc::new(AppState {
        db,
        analyst: model,
        tokens: Arc::new(TokenService::new("test-secret", 7)),
        config: Arc::new(test_config()),
    })
}

fn guest() -> Extension<CallerIdentity> {
    Extension(CallerIdentity(None))
}

fn user(id: Uuid) -> Extension<CallerIdentity> {
    Extension(CallerIdentity(Some(id)))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

//=========================================================================================
// Input validation
//=========================================================================================

#[tokio::test]
async fn empty_idea_is_rejected_before_the_model_is_called() {
    let db = Arc::new(MemDb::default());
    let model = Arc::new(StubModel::returning(VALID_MODEL_OUTPUT));
    let state = app_state(db.clone(), model.clone());

    let result = analyze_handler(
        State(state),
        guest(),
        Json(AnalyzeRequest {
            business_idea: "   ".to_string(),
            session_id: None,
        }),
    )
    .await;

    assert!(matches!(
        result.map(|_| ()),
        Err(ApiError::Validation { .. })
    ));
    assert!(!model.called.load(Ordering::SeqCst));
    assert!(db.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn idea_at_the_length_ceiling_passes_and_one_over_fails() {
    let db = Arc::new(MemDb::default());
    let model = Arc::new(StubModel::returning(VALID_MODEL_OUTPUT));
    let state = app_state(db, model);

    let at_limit = "x".repeat(MAX_IDEA_CHARS);
    let result = analyze_handler(
        State(state.clone()),
        guest(),
        Json(AnalyzeRequest {
            business_idea: at_limit,
            session_id: None,
        }),
    )
    .await;
    assert!(result.is_ok());

    let over = "x".repeat(MAX_IDEA_CHARS + 1);
    let result = analyze_handler(
        State(state),
        guest(),
        Json(AnalyzeRequest {
            business_idea: over,
            session_id: None,
        }),
    )
    .await;
    assert!(matches!(
        result.map(|_| ()),
        Err(ApiError::Validation { .. })
    ));
}

//=========================================================================================
// Identity tagging
//=========================================================================================

#[tokio::test]
async fn guest_submission_mints_a_tag_and_returns_it() {
    let db = Arc::new(MemDb::default());
    let model = Arc::new(StubModel::returning(VALID_MODEL_OUTPUT));
    let state = app_state(db.clone(), model);

    let response = analyze_handler(
        State(state),
        guest(),
        Json(AnalyzeRequest {
            business_idea: "cloud kitchen in Mumbai".to_string(),
            session_id: None,
        }),
    )
    .await
    .unwrap()
    .into_response();

    let body = body_json(response).await;
    let session_id = body["sessionId"].as_str().unwrap().to_string();

    let records = db.records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].session_id.as_deref(), Some(session_id.as_str()));
    assert!(records[0].user_id.is_none());
}

#[tokio::test]
async fn guest_with_existing_tag_keeps_it_and_gets_no_echo() {
    let db = Arc::new(MemDb::default());
    let model = Arc::new(StubModel::returning(VALID_MODEL_OUTPUT));
    let state = app_state(db.clone(), model);

    let response = analyze_handler(
        State(state),
        guest(),
        Json(AnalyzeRequest {
            business_idea: "tiffin delivery".to_string(),
            session_id: Some("existing-tag".to_string()),
        }),
    )
    .await
    .unwrap()
    .into_response();

    let body = body_json(response).await;
    assert!(body.get("sessionId").is_none());
    assert_eq!(
        db.records.lock().unwrap()[0].session_id.as_deref(),
        Some("existing-tag")
    );
}

#[tokio::test]
async fn authenticated_submission_is_owned_and_untagged() {
    let db = Arc::new(MemDb::default());
    let model = Arc::new(StubModel::returning(VALID_MODEL_OUTPUT));
    let state = app_state(db.clone(), model);
    let user_id = Uuid::new_v4();

    let response = analyze_handler(
        State(state),
        user(user_id),
        Json(AnalyzeRequest {
            business_idea: "organic farm subscription".to_string(),
            // A stale client-held tag must not leak onto an owned record.
            session_id: Some("stale-guest-tag".to_string()),
        }),
    )
    .await
    .unwrap()
    .into_response();

    let body = body_json(response).await;
    assert!(body.get("sessionId").is_none());

    let records = db.records.lock().unwrap();
    assert_eq!(records[0].user_id, Some(user_id));
    assert!(records[0].session_id.is_none());
}

//=========================================================================================
// Model failure handling
//=========================================================================================

#[tokio::test]
async fn model_outage_surfaces_as_analysis_unavailable_and_persists_nothing() {
    let db = Arc::new(MemDb::default());
    let model = Arc::new(StubModel::failing());
    let state = app_state(db.clone(), model);

    let result = analyze_handler(
        State(state),
        guest(),
        Json(AnalyzeRequest {
            business_idea: "pet grooming van".to_string(),
            session_id: None,
        }),
    )
    .await;

    assert!(matches!(
        result.map(|_| ()),
        Err(ApiError::AnalysisUnavailable)
    ));
    assert!(db.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn unparseable_model_output_is_stored_as_the_fallback() {
    let db = Arc::new(MemDb::default());
    let model = Arc::new(StubModel::returning("sorry, I can't do JSON today"));
    let state = app_state(db.clone(), model);

    let response = analyze_handler(
        State(state),
        guest(),
        Json(AnalyzeRequest {
            business_idea: "drone photography".to_string(),
            session_id: None,
        }),
    )
    .await
    .unwrap()
    .into_response();
    assert_eq!(response.status(), StatusCode::OK);

    let records = db.records.lock().unwrap();
    assert!(records[0].analysis.metadata.fallback);
    assert_eq!(records[0].analysis.metadata.business_idea, "drone photography");
}

//=========================================================================================
// Claim flow
//=========================================================================================

async fn seed_guest_records(db: &MemDb, session_id: &str, count: usize) {
    for i in 0..count {
        let analysis = BusinessAnalysis::fallback("idea", "stub-model", Utc::now());
        db.create_analysis(None, Some(session_id), &format!("idea {i}"), &analysis)
            .await
            .unwrap();
    }
}

#[tokio::test]
async fn second_claim_of_the_same_session_is_a_no_op() {
    let db = Arc::new(MemDb::default());
    let state = app_state(db.clone(), Arc::new(StubModel::failing()));
    seed_guest_records(&db, "tag-a", 3).await;
    let user_id = Uuid::new_v4();

    let first = claim_profile_handler(
        State(state.clone()),
        user(user_id),
        Json(ClaimProfileRequest {
            session_id: "tag-a".to_string(),
        }),
    )
    .await
    .unwrap()
    .into_response();
    assert_eq!(body_json(first).await["claimedCount"], 3);

    let second = claim_profile_handler(
        State(state),
        user(user_id),
        Json(ClaimProfileRequest {
            session_id: "tag-a".to_string(),
        }),
    )
    .await
    .unwrap()
    .into_response();
    assert_eq!(body_json(second).await["claimedCount"], 0);
}

#[tokio::test]
async fn racing_claims_produce_exactly_one_owner() {
    let db = Arc::new(MemDb::default());
    let state = app_state(db.clone(), Arc::new(StubModel::failing()));
    seed_guest_records(&db, "tag-b", 5).await;

    let (user_a, user_b) = (Uuid::new_v4(), Uuid::new_v4());
    let (state_a, state_b) = (state.clone(), state);

    let task_a = tokio::spawn(async move {
        claim_profile_handler(
            State(state_a),
            user(user_a),
            Json(ClaimProfileRequest {
                session_id: "tag-b".to_string(),
            }),
        )
        .await
        .unwrap()
        .into_response()
    });
    let task_b = tokio::spawn(async move {
        claim_profile_handler(
            State(state_b),
            user(user_b),
            Json(ClaimProfileRequest {
                session_id: "tag-b".to_string(),
            }),
        )
        .await
        .unwrap()
        .into_response()
    });

    let claimed_a = body_json(task_a.await.unwrap()).await["claimedCount"]
        .as_u64()
        .unwrap();
    let claimed_b = body_json(task_b.await.unwrap()).await["claimedCount"]
        .as_u64()
        .unwrap();

    assert_eq!(claimed_a + claimed_b, 5);
    assert!(claimed_a == 0 || claimed_b == 0);

    let records = db.records.lock().unwrap();
    let owners: Vec<_> = records.iter().filter_map(|r| r.user_id).collect();
    assert_eq!(owners.len(), 5);
    assert!(owners.iter().all(|o| *o == owners[0]));
}

//=========================================================================================
// Auth surface
//=========================================================================================

#[tokio::test]
async fn unknown_email_and_wrong_password_fail_identically() {
    let db = Arc::new(MemDb::default());
    let state = app_state(db, Arc::new(StubModel::failing()));

    signup_handler(
        State(state.clone()),
        Json(SignupRequest {
            email: "asha@example.com".to_string(),
            password: "correct-horse".to_string(),
            name: "Asha".to_string(),
        }),
    )
    .await
    .unwrap();

    let wrong_password = login_handler(
        State(state.clone()),
        Json(LoginRequest {
            email: "asha@example.com".to_string(),
            password: "wrong".to_string(),
        }),
    )
    .await;
    let unknown_email = login_handler(
        State(state),
        Json(LoginRequest {
            email: "nobody@example.com".to_string(),
            password: "whatever".to_string(),
        }),
    )
    .await;

    let shape = |r: Result<_, ApiError>| {
        let err = r.map(|_| ()).unwrap_err();
        let response = err.into_response();
        response.status()
    };
    assert_eq!(shape(wrong_password), StatusCode::UNAUTHORIZED);
    assert_eq!(shape(unknown_email), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn duplicate_signup_conflicts_and_short_password_is_rejected() {
    let db = Arc::new(MemDb::default());
    let state = app_state(db, Arc::new(StubModel::failing()));

    let signup = |state: Arc<AppState>, email: &str, password: &str| {
        let (email, password) = (email.to_string(), password.to_string());
        async move {
            signup_handler(
                State(state),
                Json(SignupRequest {
                    email,
                    password,
                    name: "Dev".to_string(),
                }),
            )
            .await
            .map(|_| ())
        }
    };

    assert!(signup(state.clone(), "dev@example.com", "longenough").await.is_ok());
    assert!(matches!(
        signup(state.clone(), "dev@example.com", "longenough").await,
        Err(ApiError::Conflict(_))
    ));
    assert!(matches!(
        signup(state, "other@example.com", "short").await,
        Err(ApiError::Validation { .. })
    ));
}

#[tokio::test]
async fn delete_is_ownership_checked() {
    let db = Arc::new(MemDb::default());
    let state = app_state(db.clone(), Arc::new(StubModel::failing()));
    let owner = Uuid::new_v4();
    let analysis = BusinessAnalysis::fallback("idea", "stub-model", Utc::now());
    let record = db
        .create_analysis(Some(owner), None, "mine", &analysis)
        .await
        .unwrap();

    let stranger = Uuid::new_v4();
    let result =
        delete_analysis_handler(State(state.clone()), user(stranger), Path(record.id)).await;
    assert!(matches!(result.map(|_| ()), Err(ApiError::Forbidden)));

    let result = delete_analysis_handler(State(state), user(owner), Path(record.id)).await;
    assert!(result.is_ok());
    assert!(db.records.lock().unwrap().is_empty());
}

#[tokio::test]
async fn delete_route_rejects_missing_tokens_before_the_handler() {
    let db = Arc::new(MemDb::default());
    let state = app_state(db.clone(), Arc::new(StubModel::failing()));
    let owner = Uuid::new_v4();
    let analysis = BusinessAnalysis::fallback("idea", "stub-model", Utc::now());
    let record = db
        .create_analysis(Some(owner), None, "mine", &analysis)
        .await
        .unwrap();

    let app = Router::new()
        .route("/analysis/search/{id}", delete(delete_analysis_handler))
        .layer(from_fn_with_state(state.clone(), require_auth))
        .with_state(state.clone());

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/analysis/search/{}", record.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["error"], "unauthorized");
    assert_eq!(db.records.lock().unwrap().len(), 1);

    // A valid token passes the gate and reaches the handler.
    let token = state.tokens.issue(owner).unwrap();
    let response = app
        .oneshot(
            Request::builder()
                .method(Method::DELETE)
                .uri(format!("/analysis/search/{}", record.id))
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert!(db.records.lock().unwrap().is_empty());
}

//=========================================================================================
// Record visibility
//=========================================================================================

#[tokio::test]
async fn record_lookup_is_scoped_to_the_caller() {
    let db = Arc::new(MemDb::default());
    let state = app_state(db.clone(), Arc::new(StubModel::failing()));
    let analysis = BusinessAnalysis::fallback("idea", "stub-model", Utc::now());

    let guest_record = db
        .create_analysis(None, Some("tag-c"), "guest idea", &analysis)
        .await
        .unwrap();
    let owner = Uuid::new_v4();
    let owned_record = db
        .create_analysis(Some(owner), None, "owned idea", &analysis)
        .await
        .unwrap();

    // Anonymous callers see unowned records.
    let response = get_analysis_handler(State(state.clone()), guest(), Path(guest_record.id))
        .await
        .unwrap()
        .into_response();
    assert_eq!(body_json(response).await["businessIdea"], "guest idea");

    // Anonymous callers do not see owned records.
    let result =
        get_analysis_handler(State(state.clone()), guest(), Path(owned_record.id)).await;
    assert!(matches!(result.map(|_| ()), Err(ApiError::NotFound(_))));

    // Other users do not see them either.
    let stranger = Uuid::new_v4();
    let result =
        get_analysis_handler(State(state.clone()), user(stranger), Path(owned_record.id)).await;
    assert!(matches!(result.map(|_| ()), Err(ApiError::NotFound(_))));

    // The owner does.
    let response = get_analysis_handler(State(state), user(owner), Path(owned_record.id))
        .await
        .unwrap()
        .into_response();
    assert_eq!(body_json(response).await["businessIdea"], "owned idea");
}

//=========================================================================================
// Dashboard
//=========================================================================================

#[tokio::test]
async fn dashboard_stats_cover_the_five_most_recent_records() {
    let db = Arc::new(MemDb::default());
    let state = app_state(db.clone(), Arc::new(StubModel::failing()));
    let user_id = Uuid::new_v4();

    let base = Utc::now();
    {
        let mut records = db.records.lock().unwrap();
        for i in 0..7i64 {
            records.push(AnalysisRecord {
                id: Uuid::new_v4(),
                user_id: Some(user_id),
                session_id: None,
                business_idea: format!("idea {i}"),
                analysis: BusinessAnalysis::fallback("idea", "stub-model", base),
                created_at: base + Duration::seconds(i),
            });
        }
    }

    let response = dashboard_stats_handler(State(state.clone()), user(user_id))
        .await
        .unwrap()
        .into_response();
    let stats = &body_json(response).await["stats"];

    assert_eq!(stats["totalSearches"], 7);
    let recent = stats["recentSearches"].as_array().unwrap();
    assert_eq!(recent.len(), 5);
    assert_eq!(recent[0]["businessIdea"], "idea 6");
    assert_eq!(recent[4]["businessIdea"], "idea 2");
    assert!(recent[0]["viabilityScore"]["overall"].is_u64());
    assert_eq!(stats["topCategories"].as_array().unwrap().len(), 0);

    // Guests never reach this surface.
    let result = dashboard_stats_handler(State(state), guest()).await;
    assert!(matches!(result.map(|_| ()), Err(ApiError::Unauthorized)));
}

//=========================================================================================
// End to end: guest -> signup -> claim -> history
//=========================================================================================

#[tokio::test]
async fn guest_history_survives_signup_and_claim() {
    let db = Arc::new(MemDb::default());
    let model = Arc::new(StubModel::returning(VALID_MODEL_OUTPUT));
    let state = app_state(db.clone(), model);

    // Guest submits an idea and is handed a session tag.
    let response = analyze_handler(
        State(state.clone()),
        guest(),
        Json(AnalyzeRequest {
            business_idea: "cloud kitchen in Mumbai".to_string(),
            session_id: None,
        }),
    )
    .await
    .unwrap()
    .into_response();
    let body = body_json(response).await;
    let session_id = body["sessionId"].as_str().unwrap().to_string();
    let record_id: Uuid = body["recordId"].as_str().unwrap().parse().unwrap();

    // The guest signs up.
    let signup = signup_handler(
        State(state.clone()),
        Json(SignupRequest {
            email: "founder@example.com".to_string(),
            password: "secret-enough".to_string(),
            name: "Founder".to_string(),
        }),
    )
    .await
    .unwrap()
    .into_response();
    let user_id: Uuid = body_json(signup).await["user"]["id"]
        .as_str()
        .unwrap()
        .parse()
        .unwrap();

    // The claim moves the record across.
    let claim = claim_profile_handler(
        State(state.clone()),
        user(user_id),
        Json(ClaimProfileRequest {
            session_id: session_id.clone(),
        }),
    )
    .await
    .unwrap()
    .into_response();
    assert_eq!(body_json(claim).await["claimedCount"], 1);

    {
        let records = db.records.lock().unwrap();
        assert_eq!(records[0].user_id, Some(user_id));
        assert!(records[0].session_id.is_none());
    }

    // History for the new account shows exactly that record.
    let history = history_handler(
        State(state),
        user(user_id),
        Query(HistoryParams {
            page: None,
            limit: None,
        }),
    )
    .await
    .unwrap()
    .into_response();
    let body = body_json(history).await;
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0]["id"].as_str().unwrap().parse::<Uuid>().unwrap(), record_id);
    assert_eq!(records[0]["businessIdea"], "cloud kitchen in Mumbai");
    assert_eq!(body["pagination"]["totalCount"], 1);
}
