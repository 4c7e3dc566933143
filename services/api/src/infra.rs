use metrics_exporter_prometheus::PrometheusHandle;
use quiz_funnel::config::CatalogConfig;
use quiz_funnel::workflows::catalog::{CatalogError, InvestmentOptionImporter, StaticCatalog};
use quiz_funnel::workflows::quiz::{
    AnswerSelection, EventError, EventLogger, FollowUpMailer, FollowUpRequest, FunnelEvent,
    LeadId, LeadRecord, LeadRepository, MailerError, RepositoryError, ScoringEngine,
};
use std::io::Cursor;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use tracing::info;

const SAMPLE_CATALOG: &str = include_str!("../catalog/sample.json");

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) catalog: Arc<StaticCatalog>,
    pub(crate) engine: ScoringEngine,
}

/// Leads kept in submission order so `recent` can walk backwards.
#[derive(Default, Clone)]
pub(crate) struct InMemoryLeadRepository {
    records: Arc<Mutex<Vec<LeadRecord>>>,
}

impl LeadRepository for InMemoryLeadRepository {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("lead store poisoned".to_string()))?;
        if guard.iter().any(|stored| stored.lead_id == record.lead_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.push(record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("lead store poisoned".to_string()))?;
        Ok(guard.iter().find(|record| &record.lead_id == id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<LeadRecord>, RepositoryError> {
        let guard = self
            .records
            .lock()
            .map_err(|_| RepositoryError::Unavailable("lead store poisoned".to_string()))?;
        Ok(guard.iter().rev().take(limit).cloned().collect())
    }
}

/// Records funnel events and mirrors them to the tracing subscriber.
#[derive(Default, Clone)]
pub(crate) struct InMemoryEventLog {
    events: Arc<Mutex<Vec<FunnelEvent>>>,
}

impl EventLogger for InMemoryEventLog {
    fn log(&self, event: FunnelEvent) -> Result<(), EventError> {
        info!(
            event = %event.name,
            lead_id = %event.lead_id.0,
            quiz = %event.quiz_slug,
            "funnel event"
        );
        self.events
            .lock()
            .map_err(|_| EventError::Transport("event log poisoned".to_string()))?
            .push(event);
        Ok(())
    }
}

impl InMemoryEventLog {
    pub(crate) fn events(&self) -> Vec<FunnelEvent> {
        self.events
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

/// Stands in for the email provider; follow-ups are queued and logged, never sent.
#[derive(Default, Clone)]
pub(crate) struct InMemoryFollowUpMailer {
    outbox: Arc<Mutex<Vec<FollowUpRequest>>>,
}

impl FollowUpMailer for InMemoryFollowUpMailer {
    fn send(&self, request: FollowUpRequest) -> Result<(), MailerError> {
        info!(
            template = %request.template,
            lead_id = %request.lead_id.0,
            "follow-up queued"
        );
        self.outbox
            .lock()
            .map_err(|_| MailerError::Transport("outbox poisoned".to_string()))?
            .push(request);
        Ok(())
    }
}

impl InMemoryFollowUpMailer {
    pub(crate) fn outbox(&self) -> Vec<FollowUpRequest> {
        self.outbox
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }
}

pub(crate) fn sample_catalog() -> Result<StaticCatalog, CatalogError> {
    StaticCatalog::from_reader(Cursor::new(SAMPLE_CATALOG))
}

/// Build the catalog from the configured JSON document, falling back to the bundled sample.
pub(crate) fn load_catalog(config: &CatalogConfig) -> Result<StaticCatalog, CatalogError> {
    let catalog = match &config.catalog_path {
        Some(path) => StaticCatalog::from_path(path)?,
        None => sample_catalog()?,
    };

    match &config.options_csv {
        Some(path) => {
            let options = InvestmentOptionImporter::from_path(path)?;
            info!(count = options.len(), path = %path.display(), "investment options imported");
            catalog.with_investment_options(options)
        }
        None => Ok(catalog),
    }
}

/// Parse `question=option` or `question=option,option` from the command line.
pub(crate) fn parse_answer(raw: &str) -> Result<(String, AnswerSelection), String> {
    let (question, options) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected QUESTION=OPTION[,OPTION], got '{raw}'"))?;

    let question = question.trim();
    if question.is_empty() {
        return Err(format!("missing question id in '{raw}'"));
    }

    let options: Vec<String> = options
        .split(',')
        .map(str::trim)
        .filter(|option| !option.is_empty())
        .map(str::to_string)
        .collect();

    let selection = match options.as_slice() {
        [] => return Err(format!("missing option id in '{raw}'")),
        [single] => AnswerSelection::Single(single.clone()),
        _ => AnswerSelection::Multiple(options),
    };

    Ok((question.to_string(), selection))
}
