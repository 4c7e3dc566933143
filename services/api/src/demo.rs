use crate::infra::{
    load_catalog, parse_answer, sample_catalog, InMemoryEventLog, InMemoryFollowUpMailer,
    InMemoryLeadRepository,
};
use crate::routes::ScorePreview;
use clap::Args;
use quiz_funnel::config::CatalogConfig;
use quiz_funnel::error::AppError;
use quiz_funnel::workflows::catalog::CatalogLoader;
use quiz_funnel::workflows::quiz::{
    AnswerMap, AnswerSelection, FunnelServiceError, LeadRepository, LeadSubmission,
    PriorityOrder, QuestionKind, QuizFunnelService, QuizView, ScoringConfig, ScoringEngine,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct ScoreArgs {
    /// Quiz slug to score against
    #[arg(long)]
    pub(crate) quiz: String,
    /// Answer as QUESTION=OPTION or QUESTION=OPTION,OPTION (repeatable)
    #[arg(long = "answer", value_parser = parse_answer)]
    pub(crate) answers: Vec<(String, AnswerSelection)>,
    /// JSON catalog document. Defaults to the bundled sample catalog.
    #[arg(long)]
    pub(crate) catalog: Option<PathBuf>,
    /// CSV export replacing the investment options of investment quizzes
    #[arg(long)]
    pub(crate) options_csv: Option<PathBuf>,
    /// Shortlist size when the quiz does not set its own
    #[arg(long, value_parser = parse_max_results)]
    pub(crate) max_results: Option<usize>,
    /// Tie-break direction for equal match scores (ascending or descending)
    #[arg(long, value_parser = parse_priority_order)]
    pub(crate) priority_order: Option<PriorityOrder>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Run only this quiz from the sample catalog. Defaults to every quiz.
    #[arg(long)]
    pub(crate) quiz: Option<String>,
}

fn parse_max_results(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err("max results must be at least 1".to_string()),
        Ok(value) => Ok(value),
        Err(err) => Err(format!("'{raw}' is not a positive integer ({err})")),
    }
}

fn parse_priority_order(raw: &str) -> Result<PriorityOrder, String> {
    PriorityOrder::parse(raw).ok_or_else(|| format!("'{raw}' is not ascending or descending"))
}

pub(crate) fn run_score(args: ScoreArgs) -> Result<(), AppError> {
    let ScoreArgs {
        quiz,
        answers,
        catalog,
        options_csv,
        max_results,
        priority_order,
    } = args;

    let catalog = load_catalog(&CatalogConfig {
        catalog_path: catalog,
        options_csv,
    })?;
    let quiz_catalog = catalog.load(&quiz)?;

    let mut config = ScoringConfig::default();
    if let Some(limit) = max_results {
        config.max_results = limit;
    }
    if let Some(order) = priority_order {
        config.priority_order = order;
    }

    let answers: AnswerMap = answers.into_iter().collect();
    let outcome = ScoringEngine::new(config)
        .evaluate(&quiz_catalog, &answers)
        .map_err(FunnelServiceError::from)?;

    let preview = ScorePreview::new(&quiz, outcome);
    let json = serde_json::to_string_pretty(&preview).map_err(std::io::Error::from)?;
    println!("{json}");
    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let catalog = Arc::new(sample_catalog()?);
    let repository = Arc::new(InMemoryLeadRepository::default());
    let events = Arc::new(InMemoryEventLog::default());
    let mailer = Arc::new(InMemoryFollowUpMailer::default());
    let service = QuizFunnelService::new(
        catalog.clone(),
        repository.clone(),
        events.clone(),
        mailer.clone(),
        ScoringConfig::default(),
    );

    let slugs: Vec<String> = match args.quiz {
        Some(slug) => vec![slug],
        None => catalog
            .quizzes()?
            .into_iter()
            .map(|quiz| quiz.slug)
            .collect(),
    };

    println!("Quiz funnel demo");
    for slug in slugs {
        let view = service.quiz(&slug)?;
        println!("\n{} ({})", view.title, view.slug);

        let answers = demo_answers(&view);
        for (question, selection) in &answers {
            println!("- {}: {}", question, selection.option_ids().join(", "));
        }

        let submission = LeadSubmission {
            email: "Demo.Visitor@example.com".to_string(),
            first_name: Some("Demo".to_string()),
            answers,
            source: Some("cli-demo".to_string()),
        };
        let record = match service.submit(&slug, submission) {
            Ok(record) => record,
            Err(err) => {
                println!("  Submission rejected: {}", err);
                continue;
            }
        };

        println!("  Lead {} -> {}", record.lead_id.0, record.result.summary());
        match serde_json::to_string_pretty(&record.view()) {
            Ok(json) => println!("  Public lead payload:\n{}", json),
            Err(err) => println!("  Public lead payload unavailable: {}", err),
        }
    }

    let stored = repository.recent(usize::MAX).map_err(FunnelServiceError::from)?;
    println!("\nCaptured {} lead(s)", stored.len());

    let events = events.events();
    if events.is_empty() {
        println!("Funnel events: none recorded");
    } else {
        println!("Funnel events:");
        for event in events {
            println!(
                "  - {} {} -> {}",
                event.name, event.quiz_slug, event.lead_id.0
            );
        }
    }

    let outbox = mailer.outbox();
    if outbox.is_empty() {
        println!("Follow-ups: none queued");
    } else {
        println!("Follow-ups:");
        for request in outbox {
            println!("  - template={} -> {}", request.template, request.lead_id.0);
        }
    }

    Ok(())
}

/// Last option for single-choice questions, first two for multi-select.
fn demo_answers(view: &QuizView) -> AnswerMap {
    view.questions
        .iter()
        .filter_map(|question| {
            let selection = match question.kind {
                QuestionKind::Single => {
                    AnswerSelection::Single(question.options.last()?.id.clone())
                }
                QuestionKind::Multiple => AnswerSelection::Multiple(
                    question
                        .options
                        .iter()
                        .take(2)
                        .map(|option| option.id.clone())
                        .collect(),
                ),
            };
            Some((question.id.clone(), selection))
        })
        .collect()
}
