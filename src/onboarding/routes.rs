//! REST endpoints for the twin interview, the org draft and the learning plan.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, patch, post, put};
use axum::{Json, Router};
use serde::Deserialize;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::drafts::plan::PlanTargetType;
use crate::drafts::{
    CreationDraft, CreationUpdate, DraftSession, LearningPlan, OrgState, OrgUpdate, PlanChange,
};
use crate::error::SessionError;
use crate::store::SlotStore;

use super::manager::{ConsentChoice, InterviewSession};
use super::model::TwinUpdate;

/// Shared state for onboarding routes.
#[derive(Clone)]
pub struct OnboardingRouteState {
    pub interview: Arc<Mutex<InterviewSession>>,
    pub org: Arc<Mutex<DraftSession<OrgState>>>,
    pub plan: Arc<Mutex<DraftSession<LearningPlan>>>,
    pub creation: Arc<Mutex<DraftSession<CreationDraft>>>,
}

impl OnboardingRouteState {
    /// Load every draft for `user_id` from `store`.
    pub async fn open(store: Arc<dyn SlotStore>, user_id: &str) -> Self {
        let interview = InterviewSession::open(Arc::clone(&store), user_id).await;
        let org = DraftSession::<OrgState>::load(Arc::clone(&store), user_id).await;
        let plan = DraftSession::<LearningPlan>::load(Arc::clone(&store), user_id).await;
        let creation = DraftSession::<CreationDraft>::load(store, user_id).await;
        Self {
            interview: Arc::new(Mutex::new(interview)),
            org: Arc::new(Mutex::new(org)),
            plan: Arc::new(Mutex::new(plan)),
            creation: Arc::new(Mutex::new(creation)),
        }
    }
}

#[derive(Debug, Deserialize)]
struct MessageBody {
    text: String,
}

#[derive(Debug, Deserialize)]
struct ConsentBody {
    consent: bool,
}

#[derive(Debug, Deserialize)]
struct TargetBody {
    target_type: PlanTargetType,
    #[serde(default)]
    target_id: Option<String>,
}

/// Build the onboarding REST routes.
pub fn onboarding_routes(state: OnboardingRouteState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/onboarding/twin", get(get_twin))
        .route("/api/onboarding/twin/messages", post(post_message))
        .route("/api/onboarding/twin/consent", post(post_consent))
        .route("/api/onboarding/twin/fields", patch(patch_fields))
        .route("/api/onboarding/twin/reset", post(reset_twin))
        .route("/api/onboarding/twin/confirm", post(confirm_twin))
        .route("/api/onboarding/org", get(get_org).patch(patch_org))
        .route("/api/onboarding/org/reset", post(reset_org))
        .route("/api/learning-plan", get(get_plan))
        .route("/api/learning-plan/target", put(retarget_plan))
        .route(
            "/api/learning-plan/modules/{id}",
            put(add_plan_module).delete(remove_plan_module),
        )
        .route(
            "/api/twin-creation/draft",
            get(get_creation)
                .patch(patch_creation)
                .delete(discard_creation),
        )
        .route(
            "/api/twin-creation/draft/channels/{channel}",
            post(toggle_creation_channel),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "twin-onboard"
    }))
}

// ── Twin interview ──────────────────────────────────────────────────────

/// GET /api/onboarding/twin
async fn get_twin(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let session = state.interview.lock().await;
    Json(session.snapshot())
}

/// POST /api/onboarding/twin/messages
///
/// Blank text is accepted and ignored, like an empty chat submit.
async fn post_message(
    State(state): State<OnboardingRouteState>,
    Json(body): Json<MessageBody>,
) -> impl IntoResponse {
    let mut session = state.interview.lock().await;
    session.send_message(&body.text).await;
    Json(session.snapshot())
}

/// POST /api/onboarding/twin/consent
async fn post_consent(
    State(state): State<OnboardingRouteState>,
    Json(body): Json<ConsentBody>,
) -> Response {
    let mut session = state.interview.lock().await;
    match session
        .choose_consent(ConsentChoice::from_bool(body.consent))
        .await
    {
        Ok(_) => Json(session.snapshot()).into_response(),
        Err(e) => session_error(e),
    }
}

/// PATCH /api/onboarding/twin/fields
async fn patch_fields(
    State(state): State<OnboardingRouteState>,
    Json(update): Json<TwinUpdate>,
) -> impl IntoResponse {
    let mut session = state.interview.lock().await;
    session.update_fields(&update).await;
    Json(session.snapshot())
}

/// POST /api/onboarding/twin/reset
async fn reset_twin(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let mut session = state.interview.lock().await;
    session.reset().await;
    Json(session.snapshot())
}

/// POST /api/onboarding/twin/confirm
async fn confirm_twin(State(state): State<OnboardingRouteState>) -> Response {
    let mut session = state.interview.lock().await;
    match session.confirm().await {
        Ok(confirmation) => Json(confirmation).into_response(),
        Err(e) => session_error(e),
    }
}

fn session_error(err: SessionError) -> Response {
    let body = match &err {
        SessionError::NotReady {
            completed,
            required,
        } => serde_json::json!({
            "error": err.to_string(),
            "completed": completed,
            "required": required,
        }),
        SessionError::NotAtStep { expected, actual } => serde_json::json!({
            "error": err.to_string(),
            "expected": expected,
            "actual": actual,
        }),
    };
    (StatusCode::CONFLICT, Json(body)).into_response()
}

// ── Org draft ───────────────────────────────────────────────────────────

async fn get_org(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let org = state.org.lock().await;
    Json(org.draft().clone())
}

async fn patch_org(
    State(state): State<OnboardingRouteState>,
    Json(update): Json<OrgUpdate>,
) -> impl IntoResponse {
    let mut org = state.org.lock().await;
    org.update(&update).await;
    Json(org.draft().clone())
}

async fn reset_org(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let mut org = state.org.lock().await;
    org.reset().await;
    info!("Org draft reset");
    Json(org.draft().clone())
}

// ── Learning plan ───────────────────────────────────────────────────────

async fn get_plan(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let plan = state.plan.lock().await;
    Json(plan.draft().clone())
}

async fn add_plan_module(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut plan = state.plan.lock().await;
    plan.update(&PlanChange::AddModule(id)).await;
    Json(plan.draft().clone())
}

async fn remove_plan_module(
    State(state): State<OnboardingRouteState>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    let mut plan = state.plan.lock().await;
    plan.update(&PlanChange::RemoveModule(id)).await;
    Json(plan.draft().clone())
}

/// PUT /api/learning-plan/target
async fn retarget_plan(
    State(state): State<OnboardingRouteState>,
    Json(body): Json<TargetBody>,
) -> impl IntoResponse {
    let mut plan = state.plan.lock().await;
    plan.update(&PlanChange::Retarget {
        target_type: body.target_type,
        target_id: body.target_id,
    })
    .await;
    Json(plan.draft().clone())
}

// ── Creation wizard draft ───────────────────────────────────────────────

async fn get_creation(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let creation = state.creation.lock().await;
    Json(creation.draft().clone())
}

async fn patch_creation(
    State(state): State<OnboardingRouteState>,
    Json(update): Json<CreationUpdate>,
) -> impl IntoResponse {
    let mut creation = state.creation.lock().await;
    creation.update(&update).await;
    Json(creation.draft().clone())
}

/// POST /api/twin-creation/draft/channels/{channel}
///
/// Adds the channel when absent, removes it when present.
async fn toggle_creation_channel(
    State(state): State<OnboardingRouteState>,
    Path(channel): Path<String>,
) -> impl IntoResponse {
    let mut creation = state.creation.lock().await;
    creation
        .update(&CreationUpdate {
            toggle_channel: Some(channel),
            ..Default::default()
        })
        .await;
    Json(creation.draft().clone())
}

/// DELETE /api/twin-creation/draft
async fn discard_creation(State(state): State<OnboardingRouteState>) -> impl IntoResponse {
    let mut creation = state.creation.lock().await;
    creation.reset().await;
    Json(creation.draft().clone())
}
