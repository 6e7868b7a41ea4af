use super::AppState;
use super::pages::{FormValues, PageView};
use super::session::SessionLookup;
use crate::crew::FileSink;
use crate::error::{ItineraError, PipelineError};
use crate::llm::create_provider;
use crate::trip::{TripPlanner, TripRequest};
use axum::{
    Form, Json,
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;
use std::sync::Arc;
use uuid::Uuid;

/// Submitted trip form.
#[derive(Debug, Deserialize)]
pub struct PlanForm {
    #[serde(default)]
    pub session_id: String,
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub start_date: String,
    #[serde(default)]
    pub end_date: String,
    #[serde(default)]
    pub interests: String,
}

impl PlanForm {
    fn values(&self) -> FormValues {
        FormValues {
            origin: self.origin.clone(),
            destination: self.destination.clone(),
            start_date: self.start_date.clone(),
            end_date: self.end_date.clone(),
            interests: self.interests.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SessionForm {
    #[serde(default)]
    pub session_id: String,
}

fn render(state: &AppState, status: StatusCode, view: &PageView<'_>) -> Response {
    match state.pages.render(view) {
        Ok(html) => (status, Html(html)).into_response(),
        Err(error) => {
            tracing::error!(error = %format!("{error:#}"), "page render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "page render failed").into_response()
        }
    }
}

fn error_status(error: &ItineraError) -> StatusCode {
    match error {
        ItineraError::Input(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ItineraError::Generation(_) | ItineraError::Search(_) => StatusCode::BAD_GATEWAY,
        ItineraError::Pipeline(PipelineError::DeadlineExceeded { .. }) => {
            StatusCode::GATEWAY_TIMEOUT
        }
        ItineraError::Pipeline(_) | ItineraError::Config(_) | ItineraError::Other(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Live session id from the form, or a fresh session.
fn resolve_session(state: &AppState, raw: &str) -> Uuid {
    match Uuid::parse_str(raw.trim()) {
        Ok(id) if state.sessions.touch(id) => id,
        _ => state.sessions.create(),
    }
}

/// GET /: blank form in a new session
pub(super) async fn handle_index(State(state): State<AppState>) -> Response {
    let session_id = state.sessions.create();
    render(
        &state,
        StatusCode::OK,
        &PageView {
            session_id: session_id.to_string(),
            form: FormValues::defaults(),
            ..PageView::default()
        },
    )
}

/// POST /plan: run the pipeline and show the itinerary or one error
pub(super) async fn handle_plan(
    State(state): State<AppState>,
    Form(form): Form<PlanForm>,
) -> Response {
    let session_id = resolve_session(&state, &form.session_id);
    let outcome = run_plan(&state, session_id, &form).await;

    let view = PageView {
        session_id: session_id.to_string(),
        form: form.values(),
        revoked: state.sessions.is_revoked(session_id),
        ..PageView::default()
    };

    match &outcome {
        Ok(output) => render(
            &state,
            StatusCode::OK,
            &PageView {
                output: Some(output),
                ..view
            },
        ),
        Err(error) => {
            tracing::warn!(
                session = %session_id,
                kind = error.kind(),
                error = %error,
                "plan failed"
            );
            render(
                &state,
                error_status(error),
                &PageView {
                    error: Some(error),
                    ..view
                },
            )
        }
    }
}

async fn run_plan(
    state: &AppState,
    session_id: Uuid,
    form: &PlanForm,
) -> Result<crate::crew::RunOutput, ItineraError> {
    let request = TripRequest::parse(
        &form.origin,
        &form.destination,
        &form.start_date,
        &form.end_date,
        &form.interests,
    )?;

    let credential = match state.sessions.credential(session_id)? {
        SessionLookup::Active(credential) => credential,
        SessionLookup::Unknown => {
            return Err(ItineraError::Other(anyhow::anyhow!(
                "session {session_id} expired; reload the page"
            )));
        }
    };

    let provider = create_provider(&state.config.llm, &credential)?;
    let sink = Arc::new(FileSink::new(state.output_dir.join(session_id.to_string())));
    let planner = TripPlanner::from_config(&state.config, provider, sink);
    planner.plan(&request).await
}

/// POST /session/reset: clear the page, keep the session and its credential
pub(super) async fn handle_reset(
    State(state): State<AppState>,
    Form(form): Form<SessionForm>,
) -> Response {
    let session_id = resolve_session(&state, &form.session_id);
    render(
        &state,
        StatusCode::OK,
        &PageView {
            session_id: session_id.to_string(),
            form: FormValues::defaults(),
            notice: Some("Page cleared."),
            revoked: state.sessions.is_revoked(session_id),
            ..PageView::default()
        },
    )
}

/// POST /session/terminate: drop this session's API credential
pub(super) async fn handle_terminate(
    State(state): State<AppState>,
    Form(form): Form<SessionForm>,
) -> Response {
    let session_id = resolve_session(&state, &form.session_id);
    state.sessions.revoke(session_id);
    render(
        &state,
        StatusCode::OK,
        &PageView {
            session_id: session_id.to_string(),
            form: FormValues::defaults(),
            notice: Some("API key removed for this session. Open a new page to start over."),
            revoked: true,
            ..PageView::default()
        },
    )
}

/// GET /health: always public (no secrets leaked)
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "sessions": state.sessions.len(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{GenerationError, InputError};

    #[test]
    fn error_status_by_kind() {
        assert_eq!(
            error_status(&InputError::EmptyField("destination").into()),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            error_status(
                &GenerationError::Auth {
                    provider: "openai".into()
                }
                .into()
            ),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            error_status(&PipelineError::DeadlineExceeded { secs: 1 }.into()),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn plan_form_tolerates_missing_fields() {
        let form: PlanForm = serde_json::from_str(r#"{"destination": "Rome"}"#).unwrap();
        assert_eq!(form.destination, "Rome");
        assert!(form.session_id.is_empty());
    }
}
