use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use crate::workflows::catalog::StaticCatalog;
use crate::workflows::quiz::domain::{
    AnswerMap, AnswerSelection, InvestmentOption, LeadId, LeadRecord, LeadSubmission,
    PersonalityResult, Question, QuestionKind, QuestionOption, QuizCatalog, QuizDefinition,
    QuizMode,
};
use crate::workflows::quiz::repository::{
    EventError, EventLogger, FollowUpMailer, FollowUpRequest, FunnelEvent, LeadRepository,
    MailerError, RepositoryError,
};
use crate::workflows::quiz::{QuizFunnelService, ScoringConfig};

pub(super) fn tags(values: &[&str]) -> BTreeSet<String> {
    values.iter().map(|value| value.to_string()).collect()
}

pub(super) fn option(id: &str, tag_list: &[&str], weight: f64) -> QuestionOption {
    QuestionOption {
        id: id.to_string(),
        text: format!("Option {id}"),
        tags: tags(tag_list),
        weight,
    }
}

pub(super) fn question(id: &str, order: i32, options: Vec<QuestionOption>) -> Question {
    Question {
        id: id.to_string(),
        text: format!("Question {id}"),
        kind: QuestionKind::Single,
        order,
        options,
    }
}

pub(super) fn multi_question(id: &str, order: i32, options: Vec<QuestionOption>) -> Question {
    Question {
        kind: QuestionKind::Multiple,
        ..question(id, order, options)
    }
}

pub(super) fn answers(pairs: &[(&str, &str)]) -> AnswerMap {
    pairs
        .iter()
        .map(|(question_id, option_id)| {
            (question_id.to_string(), AnswerSelection::from(*option_id))
        })
        .collect()
}

pub(super) fn offer(id: &str, tag_list: &[&str], priority: i32) -> InvestmentOption {
    InvestmentOption {
        id: id.to_string(),
        title: format!("Offer {id}"),
        description: format!("Description for {id}"),
        link: format!("https://offers.example.com/{id}"),
        tags: tags(tag_list),
        priority,
        quiz_tags: BTreeMap::new(),
    }
}

pub(super) fn personality(kind: &str) -> PersonalityResult {
    PersonalityResult {
        kind: kind.to_string(),
        title: format!("The {kind} Investor"),
        description: format!("{kind} investors share a clear preference."),
        characteristics: vec!["Decisive".to_string()],
        image_url: None,
    }
}

/// Three-question investor quiz used across the service and routing specs.
pub(super) fn investor_questions() -> Vec<Question> {
    vec![
        question(
            "horizon",
            1,
            vec![
                option("short", &["liquidity"], 1.0),
                option("long", &["growth"], 1.0),
            ],
        ),
        question(
            "risk",
            2,
            vec![
                option("low", &["income", "stability"], 1.0),
                option("high", &["growth", "crypto"], 1.0),
            ],
        ),
        question(
            "goal",
            3,
            vec![
                option("retire", &["income"], 2.0),
                option("wealth", &["growth"], 2.0),
            ],
        ),
    ]
}

pub(super) fn investor_offers() -> Vec<InvestmentOption> {
    vec![
        offer("index-fund", &["growth"], 3),
        offer("dividend-etf", &["income", "stability"], 2),
        offer("crypto-basket", &["crypto", "growth"], 1),
        offer("money-market", &["liquidity"], 5),
    ]
}

pub(super) fn investor_catalog() -> QuizCatalog {
    QuizCatalog {
        quiz: QuizDefinition {
            slug: "investor-fit".to_string(),
            title: "What kind of investor are you?".to_string(),
            mode: QuizMode::Investment { max_results: None },
        },
        questions: investor_questions(),
        investment_options: investor_offers(),
        personality_results: Vec::new(),
    }
}

pub(super) fn personality_catalog() -> QuizCatalog {
    QuizCatalog {
        quiz: QuizDefinition {
            slug: "money-personality".to_string(),
            title: "Money personality".to_string(),
            mode: QuizMode::Personality,
        },
        questions: vec![
            question(
                "weekend",
                1,
                vec![
                    option("plan", &["Saver", "stability"], 1.0),
                    option("explore", &["Adventurer"], 1.0),
                ],
            ),
            question(
                "windfall",
                2,
                vec![
                    option("bank", &["saver"], 1.0),
                    option("spend", &["adventurer"], 1.0),
                ],
            ),
        ],
        investment_options: Vec::new(),
        personality_results: vec![personality("Saver"), personality("Adventurer")],
    }
}

pub(super) fn submission(pairs: &[(&str, &str)]) -> LeadSubmission {
    LeadSubmission {
        email: "  Pat.Investor@Example.com ".to_string(),
        first_name: Some("Pat".to_string()),
        answers: answers(pairs),
        source: Some("facebook".to_string()),
    }
}

pub(super) type TestService =
    QuizFunnelService<StaticCatalog, MemoryLeads, MemoryEvents, MemoryMailer>;

pub(super) struct Harness {
    pub(super) service: TestService,
    pub(super) leads: Arc<MemoryLeads>,
    pub(super) events: Arc<MemoryEvents>,
    pub(super) mailer: Arc<MemoryMailer>,
}

pub(super) fn build_service() -> Harness {
    build_service_with(ScoringConfig::default())
}

pub(super) fn build_service_with(config: ScoringConfig) -> Harness {
    let catalog = StaticCatalog::new(vec![investor_catalog(), personality_catalog()])
        .expect("fixture catalog is valid");
    let leads = Arc::new(MemoryLeads::default());
    let events = Arc::new(MemoryEvents::default());
    let mailer = Arc::new(MemoryMailer::default());
    let service = QuizFunnelService::new(
        Arc::new(catalog),
        leads.clone(),
        events.clone(),
        mailer.clone(),
        config,
    );

    Harness {
        service,
        leads,
        events,
        mailer,
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryLeads {
    pub(super) records: Arc<Mutex<HashMap<LeadId, LeadRecord>>>,
}

impl LeadRepository for MemoryLeads {
    fn insert(&self, record: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        let mut guard = self.records.lock().expect("repository mutex poisoned");
        if guard.contains_key(&record.lead_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(record.lead_id.clone(), record.clone());
        Ok(record)
    }

    fn fetch(&self, id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    fn recent(&self, limit: usize) -> Result<Vec<LeadRecord>, RepositoryError> {
        let guard = self.records.lock().expect("repository mutex poisoned");
        Ok(guard.values().take(limit).cloned().collect())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryEvents {
    events: Arc<Mutex<Vec<FunnelEvent>>>,
}

impl MemoryEvents {
    pub(super) fn events(&self) -> Vec<FunnelEvent> {
        self.events.lock().expect("event mutex poisoned").clone()
    }
}

impl EventLogger for MemoryEvents {
    fn log(&self, event: FunnelEvent) -> Result<(), EventError> {
        self.events.lock().expect("event mutex poisoned").push(event);
        Ok(())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryMailer {
    requests: Arc<Mutex<Vec<FollowUpRequest>>>,
}

impl MemoryMailer {
    pub(super) fn requests(&self) -> Vec<FollowUpRequest> {
        self.requests.lock().expect("mailer mutex poisoned").clone()
    }
}

impl FollowUpMailer for MemoryMailer {
    fn send(&self, request: FollowUpRequest) -> Result<(), MailerError> {
        self.requests
            .lock()
            .expect("mailer mutex poisoned")
            .push(request);
        Ok(())
    }
}

pub(super) struct FailingEvents;

impl EventLogger for FailingEvents {
    fn log(&self, _event: FunnelEvent) -> Result<(), EventError> {
        Err(EventError::Transport("analytics offline".to_string()))
    }
}

pub(super) struct FailingMailer;

impl FollowUpMailer for FailingMailer {
    fn send(&self, _request: FollowUpRequest) -> Result<(), MailerError> {
        Err(MailerError::Transport("smtp offline".to_string()))
    }
}

pub(super) struct UnavailableLeads;

impl LeadRepository for UnavailableLeads {
    fn insert(&self, _record: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn fetch(&self, _id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn recent(&self, _limit: usize) -> Result<Vec<LeadRecord>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

pub(super) struct ConflictLeads;

impl LeadRepository for ConflictLeads {
    fn insert(&self, _record: LeadRecord) -> Result<LeadRecord, RepositoryError> {
        Err(RepositoryError::Conflict)
    }

    fn fetch(&self, _id: &LeadId) -> Result<Option<LeadRecord>, RepositoryError> {
        Ok(None)
    }

    fn recent(&self, _limit: usize) -> Result<Vec<LeadRecord>, RepositoryError> {
        Ok(Vec::new())
    }
}
