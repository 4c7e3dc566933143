use crate::infra::AppState;
use axum::extract::Path;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Extension;
use axum::Json;
use quiz_funnel::error::AppError;
use quiz_funnel::workflows::catalog::CatalogLoader;
use quiz_funnel::workflows::quiz::{
    quiz_router, AnswerMap, EventLogger, FollowUpMailer, FunnelServiceError, LeadRepository,
    OfferView, PersonalityResult, QuizDefinition, QuizFunnelService, QuizResult, ScoringOutcome,
    TagScores,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

#[derive(Debug, Deserialize)]
pub(crate) struct ScorePreviewRequest {
    #[serde(default)]
    pub(crate) answers: AnswerMap,
}

/// Score vector and result without capturing a lead. Shared by the HTTP preview and `score`.
#[derive(Debug, Serialize)]
pub(crate) struct ScorePreview {
    pub(crate) quiz_slug: String,
    pub(crate) scores: TagScores,
    pub(crate) summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) matches: Option<Vec<OfferView>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) personality: Option<PersonalityResult>,
}

impl ScorePreview {
    pub(crate) fn new(quiz_slug: &str, outcome: ScoringOutcome) -> Self {
        let summary = outcome.result.summary();
        let (matches, personality) = match outcome.result {
            QuizResult::Matches(options) => {
                (Some(options.iter().map(OfferView::from).collect()), None)
            }
            QuizResult::Personality(result) => (None, result),
        };

        Self {
            quiz_slug: quiz_slug.to_string(),
            scores: outcome.scores,
            summary,
            matches,
            personality,
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct QuizListing {
    pub(crate) quizzes: Vec<QuizDefinition>,
}

pub(crate) fn with_quiz_routes<C, L, E, M>(
    service: Arc<QuizFunnelService<C, L, E, M>>,
) -> axum::Router
where
    C: CatalogLoader + 'static,
    L: LeadRepository + 'static,
    E: EventLogger + 'static,
    M: FollowUpMailer + 'static,
{
    quiz_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
        .route("/api/v1/quizzes", axum::routing::get(quiz_listing_endpoint))
        .route(
            "/api/v1/quizzes/:quiz_slug/score",
            axum::routing::post(score_preview_endpoint),
        )
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(std::sync::atomic::Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

pub(crate) async fn quiz_listing_endpoint(
    Extension(state): Extension<AppState>,
) -> Result<Json<QuizListing>, AppError> {
    let quizzes = state.catalog.quizzes()?;
    Ok(Json(QuizListing { quizzes }))
}

pub(crate) async fn score_preview_endpoint(
    Extension(state): Extension<AppState>,
    Path(quiz_slug): Path<String>,
    Json(payload): Json<ScorePreviewRequest>,
) -> Result<Json<ScorePreview>, AppError> {
    let catalog = state.catalog.load(&quiz_slug)?;
    let outcome = state
        .engine
        .evaluate(&catalog, &payload.answers)
        .map_err(FunnelServiceError::from)?;

    Ok(Json(ScorePreview::new(&quiz_slug, outcome)))
}
