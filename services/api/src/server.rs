use crate::cli::ServeArgs;
use crate::infra::{
    load_catalog, AppState, InMemoryEventLog, InMemoryFollowUpMailer, InMemoryLeadRepository,
};
use crate::routes::with_quiz_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use quiz_funnel::config::AppConfig;
use quiz_funnel::error::AppError;
use quiz_funnel::telemetry;
use quiz_funnel::workflows::catalog::CatalogLoader;
use quiz_funnel::workflows::quiz::{QuizFunnelService, ScoringEngine};
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = Arc::new(load_catalog(&config.catalog)?);
    info!(quizzes = catalog.quizzes()?.len(), "quiz catalog loaded");

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(std::sync::atomic::AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
        catalog: catalog.clone(),
        engine: ScoringEngine::new(config.scoring.clone()),
    };

    let funnel_service = Arc::new(QuizFunnelService::new(
        catalog,
        Arc::new(InMemoryLeadRepository::default()),
        Arc::new(InMemoryEventLog::default()),
        Arc::new(InMemoryFollowUpMailer::default()),
        config.scoring.clone(),
    ));

    let app = with_quiz_routes(funnel_service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "quiz funnel service ready");

    axum::serve(listener, app).await?;
    Ok(())
}
