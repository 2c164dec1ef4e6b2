//! # API Endpoint Handlers
//!
//! Every handler is a thin adapter: resolve the request into core types,
//! call the core, wrap the result. Identity numbers are personal data and
//! are never written to the logs.

use super::{
    AppState,
    types::{
        AccessRequest, AccessResponse, CategoryRequest, CategoryResponse, HealthResponse,
        MenuRequest, MenuResponse, PageResponse, ParseRequest, ParseResponse,
    },
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use microfin_core::{PolicyConfig, RawSession, SessionState, console_menu, visible_menu};

// =============================================================================
// SESSION RESOLUTION
// =============================================================================

/// Resolve optional raw session data, logging any keys that were dropped.
fn resolve_session(raw: Option<&RawSession>) -> (SessionState, Vec<String>) {
    let (state, rejected) = SessionState::from_raw(raw);
    if !rejected.is_empty() {
        tracing::warn!(
            event = "session_keys_rejected",
            count = rejected.len(),
            keys = ?rejected,
            "Session contained unknown role or permission keys"
        );
    }
    (state, rejected)
}

// =============================================================================
// HEALTH / POLICY
// =============================================================================

/// Health check endpoint.
pub async fn health_handler() -> impl IntoResponse {
    Json(HealthResponse::default())
}

/// The active policy.
pub async fn policy_handler(State(state): State<AppState>) -> Json<PolicyConfig> {
    Json(state.policy.as_ref().clone())
}

// =============================================================================
// IDENTITY HANDLERS
// =============================================================================

/// Parse an identity number.
pub async fn parse_handler(
    State(state): State<AppState>,
    Json(request): Json<ParseRequest>,
) -> impl IntoResponse {
    let today = request
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    match state.policy.parser().parse_on(&request.nic, today) {
        Ok(record) => (StatusCode::OK, Json(ParseResponse::success(record))),
        Err(e) => {
            tracing::debug!(event = "identity_rejected", "Identity number not recognised");
            (StatusCode::BAD_REQUEST, Json(ParseResponse::error(e.to_string())))
        }
    }
}

/// Check a customer category against a gender label.
pub async fn category_handler(
    State(state): State<AppState>,
    Json(request): Json<CategoryRequest>,
) -> Json<CategoryResponse> {
    Json(state.policy.category.check(&request.category, &request.gender))
}

// =============================================================================
// ACCESS HANDLERS
// =============================================================================

/// Evaluate one requirement against the supplied session.
pub async fn access_check_handler(
    State(state): State<AppState>,
    Json(request): Json<AccessRequest>,
) -> Json<AccessResponse> {
    let (session, mut unknown_keys) = resolve_session(request.session.as_ref());
    let resolved = request.requirement.resolve();
    unknown_keys.extend(resolved.rejected.iter().cloned());

    let allowed = state.policy.guard().allows_resolved(&resolved, &session);
    tracing::debug!(event = "access_check", allowed, ready = session.is_ready());

    Json(AccessResponse {
        allowed,
        unknown_keys,
    })
}

/// The console menu as the supplied session may see it.
pub async fn menu_handler(
    State(state): State<AppState>,
    Json(request): Json<MenuRequest>,
) -> Json<MenuResponse> {
    let (session, unknown_keys) = resolve_session(request.session.as_ref());
    let items = visible_menu(&state.policy.guard(), &session, &console_menu());

    Json(MenuResponse {
        items,
        unknown_keys,
    })
}

/// Decide whether a page renders, waits, or redirects.
pub async fn page_handler(
    State(state): State<AppState>,
    Json(request): Json<AccessRequest>,
) -> Json<PageResponse> {
    let (session, mut unknown_keys) = resolve_session(request.session.as_ref());
    let resolved = request.requirement.resolve();
    unknown_keys.extend(resolved.rejected.iter().cloned());

    let outcome = state.policy.page_gate().evaluate_resolved(&resolved, &session);
    Json(PageResponse::new(outcome, unknown_keys))
}
