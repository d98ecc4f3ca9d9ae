//! REST endpoints for the questionnaire.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::info;
use uuid::Uuid;

use crate::error::{SessionError, WizardError};
use crate::sessions::SessionStore;
use crate::wizard::{Answer, WizardAction};

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionStore>,
}

/// Build the Axum router with the questionnaire routes.
pub fn wizard_routes(sessions: Arc<SessionStore>) -> Router {
    let state = AppState { sessions };

    Router::new()
        .route("/health", get(health))
        .route("/api/questions", get(list_questions))
        .route("/api/sessions", post(create_session))
        .route("/api/sessions/{id}", get(get_session).delete(end_session))
        .route("/api/sessions/{id}/answer", post(answer))
        .route("/api/sessions/{id}/next", post(next))
        .route("/api/sessions/{id}/previous", post(previous))
        .route("/api/sessions/{id}/submit", post(submit))
        .route("/api/sessions/{id}/restart", post(restart))
        .route("/api/sessions/{id}/actions", post(apply_action))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "hlmc-wizard",
        "questions": state.sessions.questionnaire().len(),
    }))
}

// ── Questions ───────────────────────────────────────────────────────────

async fn list_questions(State(state): State<AppState>) -> impl IntoResponse {
    let questionnaire = state.sessions.questionnaire();
    let questions: Vec<serde_json::Value> = questionnaire
        .display_order()
        .iter()
        .enumerate()
        .map(|(i, feature)| {
            serde_json::json!({
                "index": i,
                "feature": feature,
                "question": questionnaire.questions().text(feature),
            })
        })
        .collect();
    Json(questions)
}

// ── Sessions ────────────────────────────────────────────────────────────

async fn create_session(State(state): State<AppState>) -> impl IntoResponse {
    let view = state.sessions.create().await;
    (StatusCode::CREATED, Json(view))
}

async fn get_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.sessions.view(id).await {
        Ok(view) => Json(view).into_response(),
        Err(e) => error_response(&state, id, e).await,
    }
}

async fn end_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    if state.sessions.remove(id).await {
        Json(serde_json::json!({"status": "ended"})).into_response()
    } else {
        error_response(&state, id, SessionError::NotFound { id }).await
    }
}

#[derive(Deserialize)]
struct AnswerRequest {
    feature: String,
    answer: Answer,
}

async fn answer(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<AnswerRequest>,
) -> Response {
    let action = WizardAction::SelectAnswer {
        feature: body.feature,
        answer: body.answer,
    };
    run_action(state, id, action).await
}

async fn next(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    run_action(state, id, WizardAction::Next).await
}

async fn previous(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    run_action(state, id, WizardAction::Previous).await
}

async fn submit(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    run_action(state, id, WizardAction::Submit).await
}

async fn restart(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    run_action(state, id, WizardAction::Restart).await
}

async fn apply_action(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(action): Json<WizardAction>,
) -> Response {
    run_action(state, id, action).await
}

// ── Helpers ─────────────────────────────────────────────────────────────

async fn run_action(state: AppState, id: String, action: WizardAction) -> Response {
    let id = match parse_id(&id) {
        Ok(id) => id,
        Err(resp) => return resp,
    };
    match state.sessions.apply(id, &action).await {
        Ok(view) => {
            if matches!(action, WizardAction::Submit) {
                info!(session_id = %id, probability = ?view.probability, "Probability computed");
            }
            Json(view).into_response()
        }
        Err(e) => error_response(&state, id, e).await,
    }
}

fn parse_id(raw: &str) -> Result<Uuid, Response> {
    Uuid::parse_str(raw).map_err(|_| {
        (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Invalid session ID"})),
        )
            .into_response()
    })
}

async fn error_response(state: &AppState, id: Uuid, err: SessionError) -> Response {
    let message = err.to_string();
    match err {
        SessionError::NotFound { .. } => (
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": message})),
        )
            .into_response(),
        SessionError::Wizard(WizardError::Validation(_)) => {
            let view = state.sessions.view(id).await.ok();
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({"warning": message, "view": view})),
            )
                .into_response()
        }
        SessionError::Wizard(WizardError::NotAvailable { .. })
        | SessionError::Wizard(WizardError::WrongQuestion { .. }) => (
            StatusCode::CONFLICT,
            Json(serde_json::json!({"error": message})),
        )
            .into_response(),
        SessionError::Wizard(WizardError::SchemaMismatch {
            missing,
            unexpected,
        }) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({
                "error": "Feature mismatch with the trained model.",
                "missing": missing,
                "unexpected": unexpected,
            })),
        )
            .into_response(),
        SessionError::Wizard(WizardError::Inference(_)) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(serde_json::json!({"error": message})),
        )
            .into_response(),
    }
}
