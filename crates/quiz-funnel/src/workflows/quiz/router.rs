use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde_json::json;

use super::domain::{LeadId, LeadSubmission};
use super::repository::{EventLogger, FollowUpMailer, LeadRepository, RepositoryError};
use super::service::{FunnelServiceError, QuizFunnelService};
use crate::workflows::catalog::{CatalogError, CatalogLoader};

/// Router builder exposing the quiz and lead endpoints.
pub fn quiz_router<C, L, E, M>(service: Arc<QuizFunnelService<C, L, E, M>>) -> Router
where
    C: CatalogLoader + 'static,
    L: LeadRepository + 'static,
    E: EventLogger + 'static,
    M: FollowUpMailer + 'static,
{
    Router::new()
        .route("/api/v1/quizzes/:quiz_slug", get(quiz_handler::<C, L, E, M>))
        .route(
            "/api/v1/quizzes/:quiz_slug/submissions",
            post(submit_handler::<C, L, E, M>),
        )
        .route("/api/v1/leads/:lead_id", get(lead_handler::<C, L, E, M>))
        .with_state(service)
}

pub(crate) async fn quiz_handler<C, L, E, M>(
    State(service): State<Arc<QuizFunnelService<C, L, E, M>>>,
    Path(quiz_slug): Path<String>,
) -> Response
where
    C: CatalogLoader + 'static,
    L: LeadRepository + 'static,
    E: EventLogger + 'static,
    M: FollowUpMailer + 'static,
{
    match service.quiz(&quiz_slug) {
        Ok(view) => (StatusCode::OK, axum::Json(view)).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn submit_handler<C, L, E, M>(
    State(service): State<Arc<QuizFunnelService<C, L, E, M>>>,
    Path(quiz_slug): Path<String>,
    axum::Json(submission): axum::Json<LeadSubmission>,
) -> Response
where
    C: CatalogLoader + 'static,
    L: LeadRepository + 'static,
    E: EventLogger + 'static,
    M: FollowUpMailer + 'static,
{
    match service.submit(&quiz_slug, submission) {
        Ok(record) => (StatusCode::CREATED, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

pub(crate) async fn lead_handler<C, L, E, M>(
    State(service): State<Arc<QuizFunnelService<C, L, E, M>>>,
    Path(lead_id): Path<String>,
) -> Response
where
    C: CatalogLoader + 'static,
    L: LeadRepository + 'static,
    E: EventLogger + 'static,
    M: FollowUpMailer + 'static,
{
    match service.get(&LeadId(lead_id)) {
        Ok(record) => (StatusCode::OK, axum::Json(record.view())).into_response(),
        Err(err) => error_response(err),
    }
}

fn error_response(err: FunnelServiceError) -> Response {
    let status = match &err {
        FunnelServiceError::Intake(_) => StatusCode::UNPROCESSABLE_ENTITY,
        FunnelServiceError::Catalog(CatalogError::UnknownQuiz(_))
        | FunnelServiceError::Repository(RepositoryError::NotFound) => StatusCode::NOT_FOUND,
        FunnelServiceError::Repository(RepositoryError::Conflict) => StatusCode::CONFLICT,
        FunnelServiceError::Catalog(_)
        | FunnelServiceError::Match(_)
        | FunnelServiceError::Repository(RepositoryError::Unavailable(_)) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };

    let payload = json!({ "error": err.to_string() });
    (status, axum::Json(payload)).into_response()
}
