//! Dispatch lifecycle.
//!
//! `Session` owns the form, the display areas and the request tracker and is
//! driven from a single owner (the UI thread, or a one-shot runner).
//! Requests themselves run as tokio tasks spawned by `run_controller`.

use crate::client::Backend;
use crate::error::DispatchError;
use crate::locale::Locale;
use crate::model::{ResultView, SearchResponse, SnapshotResponse};
use crate::orchestrator::bootstrap::{self, LocalZone, SelectOption};
use crate::orchestrator::form::{resolve_action, Action, FormState};
use crate::orchestrator::tracker::{RequestTracker, Ticket};
use crate::render::Screen;
use anyhow::Result;
use std::sync::Arc;
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender};

pub type Outcome = Result<ResultView, DispatchError>;

/// Commands emitted by the UI layer.
#[derive(Debug, Clone)]
pub(crate) enum UiCommand {
    Run { ticket: Ticket, action: Action },
    Quit,
}

/// Results flowing back to the UI layer.
#[derive(Debug)]
pub(crate) enum ViewEvent {
    Snapshots(Vec<SelectOption>),
    Defaults {
        texts: Vec<SelectOption>,
        techs: Vec<SelectOption>,
    },
    Finished {
        ticket: Ticket,
        // Boxed to keep the enum small; a result can carry many vacancies.
        outcome: Box<Outcome>,
    },
}

/// Issue the request for one action and normalize the reply.
pub async fn execute<B: Backend>(backend: &B, action: &Action) -> Outcome {
    match action {
        Action::Replay { id } => match backend.fetch_snapshot(id).await? {
            SnapshotResponse::Failed(e) => Err(DispatchError::Backend(e.error.into_message())),
            SnapshotResponse::Found(env) => Ok(ResultView::from(env)),
        },
        Action::Search(query) => match backend.run_search(query).await? {
            SearchResponse::Failed(e) => Err(DispatchError::Backend(e.error.into_message())),
            SearchResponse::Found(env) => Ok(ResultView::from(env)),
        },
    }
}

#[derive(Debug, Default)]
pub struct Session {
    pub form: FormState,
    pub screen: Screen,
    pub locale: Locale,
    tracker: RequestTracker,
}

impl Session {
    pub fn new(form: FormState, locale: Locale) -> Self {
        Self {
            form,
            locale,
            ..Default::default()
        }
    }

    pub fn is_loading(&self) -> bool {
        self.tracker.is_loading()
    }

    /// Handle the trigger. Returns the request to send, or `None` when
    /// validation failed and its message has already been painted.
    pub fn trigger(&mut self) -> Option<(Ticket, Action)> {
        match resolve_action(&mut self.form) {
            Ok(action) => {
                let ticket = self.tracker.begin(action.is_search());
                if ticket.paint_placeholder {
                    self.screen.show_loading();
                }
                tracing::info!(generation = ticket.generation, ?action, "dispatch");
                Some((ticket, action))
            }
            Err(e) => {
                tracing::info!(error = %e, "input rejected");
                self.tracker.supersede();
                self.screen.apply(&Err(e.into()), self.locale);
                None
            }
        }
    }

    /// Paint a finished request unless a newer action has started since.
    pub fn complete(&mut self, ticket: Ticket, outcome: &Outcome) -> bool {
        if !self.tracker.finish(ticket) {
            tracing::debug!(generation = ticket.generation, "discarding stale response");
            return false;
        }
        if let Err(e) = outcome {
            tracing::warn!(generation = ticket.generation, error = %e, "action failed");
        }
        self.screen.apply(outcome, self.locale);
        true
    }

    /// Trigger, execute and paint in one go.
    pub async fn run_once<B: Backend>(&mut self, backend: &B) -> Option<Outcome> {
        let (ticket, action) = self.trigger()?;
        let outcome = execute(backend, &action).await;
        self.complete(ticket, &outcome);
        Some(outcome)
    }
}

/// Bootstrap the selectors, then serve UI commands until quit. Every run
/// command gets its own task; nothing is cancelled or de-duplicated.
pub(crate) async fn run_controller<B: Backend + 'static>(
    backend: Arc<B>,
    zone: Arc<dyn LocalZone>,
    event_tx: UnboundedSender<ViewEvent>,
    mut cmd_rx: UnboundedReceiver<UiCommand>,
) -> Result<()> {
    {
        let backend = backend.clone();
        let tx = event_tx.clone();
        tokio::spawn(async move {
            let stats = bootstrap::load_historical_result_list(&*backend, &*zone).await;
            let _ = tx.send(ViewEvent::Snapshots(stats));
        });
    }
    {
        let backend = backend.clone();
        let tx = event_tx.clone();
        tokio::spawn(async move {
            let (texts, techs) = bootstrap::load_search_defaults(&*backend).await;
            let _ = tx.send(ViewEvent::Defaults { texts, techs });
        });
    }

    while let Some(cmd) = cmd_rx.recv().await {
        match cmd {
            UiCommand::Run { ticket, action } => {
                let backend = backend.clone();
                let tx = event_tx.clone();
                tokio::spawn(async move {
                    let outcome = execute(&*backend, &action).await;
                    let _ = tx.send(ViewEvent::Finished {
                        ticket,
                        outcome: Box::new(outcome),
                    });
                });
            }
            UiCommand::Quit => break,
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::orchestrator::testing::FakeBackend;
    use crate::render::ResultsArea;
    use serde_json::{json, Value};

    fn stats_json() -> Value {
        json!({"technology": "go", "total_vacancies": 10, "tech_vacancies": 3, "tech_percentage": 30.0})
    }

    fn vacancy(name: &str) -> Value {
        json!({
            "name": name,
            "employer": {"name": "Acme"},
            "area": {"name": "Moscow"},
            "salary": null,
            "alternate_url": format!("https://hh.ru/{name}")
        })
    }

    fn search_form(text: &str, tech: &str, count: &str) -> FormState {
        FormState {
            text_input: text.into(),
            tech_input: tech.into(),
            count: count.into(),
            ..Default::default()
        }
    }

    fn listing_names(screen: &Screen) -> (String, Vec<String>) {
        match &screen.results {
            ResultsArea::Listing { header, vacancies } => (
                header.clone(),
                vacancies.iter().map(|v| v.name.clone()).collect(),
            ),
            other => panic!("expected listing, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn snapshot_replay_fetches_by_identifier() {
        let backend = FakeBackend::default().with_snapshot(
            "1700000000",
            json!({
                "time": {"raw": 1700000000.0},
                "result": {
                    "vacancy_title": "backend",
                    "stats": stats_json(),
                    "vacancies": [vacancy("b"), vacancy("a"), vacancy("c")]
                }
            }),
        );
        let mut session = Session::new(
            FormState {
                stats_select: "1700000000".into(),
                count: "oops".into(),
                ..Default::default()
            },
            Locale::En,
        );

        let outcome = session.run_once(&backend).await;

        assert!(matches!(outcome, Some(Ok(_))));
        assert_eq!(backend.requested(), ["/api/v1/results/1700000000"]);
        let (header, names) = listing_names(&session.screen);
        assert_eq!(header, "resultID = 1700000000");
        assert_eq!(names, ["b", "a", "c"]);
        assert_eq!(session.screen.stats[0], "Query: backend (technology: go)");
    }

    #[tokio::test]
    async fn missing_search_text_sends_nothing() {
        let backend = FakeBackend::default();
        let mut session = Session::new(search_form("", "go", "10"), Locale::En);

        assert!(session.run_once(&backend).await.is_none());
        assert!(backend.requested().is_empty());
        assert_eq!(
            session.screen.results,
            ResultsArea::Error("no search query".into())
        );
    }

    #[tokio::test]
    async fn count_over_limit_sends_nothing() {
        let backend = FakeBackend::default();
        let mut session = Session::new(search_form("backend", "go", "150"), Locale::En);

        assert!(session.run_once(&backend).await.is_none());
        assert!(backend.requested().is_empty());
        assert_eq!(
            session.screen.results,
            ResultsArea::Error("count may not exceed 100".into())
        );
    }

    #[tokio::test]
    async fn backend_error_is_rendered_with_empty_stats() {
        let backend =
            FakeBackend::default().with_search(json!({"error": {"message": "rate limited"}}));
        let mut session = Session::new(search_form("backend", "go", "10"), Locale::En);

        let outcome = session.run_once(&backend).await;

        assert!(matches!(outcome, Some(Err(DispatchError::Backend(_)))));
        assert_eq!(
            backend.requested(),
            ["/api/v1/vacancies?text=backend&tech=go&count=10"]
        );
        assert!(session.screen.stats.is_empty());
        assert_eq!(
            session.screen.results,
            ResultsArea::Error("Error: rate limited".into())
        );
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn malformed_body_is_a_transport_failure() {
        let backend = FakeBackend::default();
        let mut session = Session::new(search_form("backend", "go", "10"), Locale::En);

        session.run_once(&backend).await;

        match &session.screen.results {
            ResultsArea::Error(msg) => {
                assert!(msg.starts_with("Error fetching vacancies: malformed response"))
            }
            other => panic!("expected error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_success_reads_top_level_fields() {
        let backend = FakeBackend::default().with_search(json!({
            "resultID": 1700000999,
            "vacancy_title": "backend",
            "stats": stats_json(),
            "vacancies": [vacancy("x"), vacancy("y")]
        }));
        let mut session = Session::new(search_form("backend", "go", "10"), Locale::En);

        session.run_once(&backend).await;

        let (header, names) = listing_names(&session.screen);
        assert_eq!(header, "resultID = 1700000999");
        assert_eq!(names, ["x", "y"]);
    }

    #[tokio::test]
    async fn identical_searches_are_not_deduplicated() {
        let backend = FakeBackend::default().with_search(json!({"error": {"message": "busy"}}));
        let mut session = Session::new(search_form("backend", "go", "10"), Locale::En);

        session.run_once(&backend).await;
        session.run_once(&backend).await;

        assert_eq!(backend.requested().len(), 2);
    }

    #[test]
    fn overlapping_searches_paint_placeholder_once_and_drop_stale_reply() {
        let mut session = Session::new(search_form("backend", "go", "10"), Locale::En);
        session.screen.stats = vec!["old stats".into()];

        let (first, _) = session.trigger().unwrap();
        assert_eq!(session.screen.results, ResultsArea::Loading);
        assert!(session.screen.stats.is_empty());

        // The second trigger must not repaint; make that observable.
        session.screen.results = ResultsArea::Empty;
        let (second, _) = session.trigger().unwrap();
        assert_eq!(session.screen.results, ResultsArea::Empty);
        assert!(session.is_loading());

        let late = Err(DispatchError::Backend("late".into()));
        assert!(!session.complete(first, &late));
        assert_eq!(session.screen.results, ResultsArea::Empty);

        let fresh = Err(DispatchError::Backend("fresh".into()));
        assert!(session.complete(second, &fresh));
        assert_eq!(session.screen.results, ResultsArea::Error("Error: fresh".into()));
        assert!(!session.is_loading());
    }

    #[tokio::test]
    async fn controller_bootstraps_and_runs_commands() {
        let backend = Arc::new(
            FakeBackend::default()
                .with_results(&["1700000000"])
                .with_defaults(&["backend"], &["go"])
                .with_search(json!({"error": {"message": "nope"}})),
        );
        let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel();
        let (cmd_tx, cmd_rx) = tokio::sync::mpsc::unbounded_channel();
        let handle = tokio::spawn(run_controller(
            backend.clone(),
            Arc::new(time::UtcOffset::UTC),
            event_tx,
            cmd_rx,
        ));

        let mut session = Session::new(search_form("backend", "go", "5"), Locale::En);
        let (ticket, action) = session.trigger().unwrap();
        cmd_tx.send(UiCommand::Run { ticket, action }).unwrap();

        let mut saw_snapshots = false;
        let mut saw_defaults = false;
        let mut finished = false;
        while !(saw_snapshots && saw_defaults && finished) {
            match event_rx.recv().await.expect("controller hung up") {
                ViewEvent::Snapshots(opts) => {
                    assert_eq!(opts[0].value, "1700000000");
                    saw_snapshots = true;
                }
                ViewEvent::Defaults { texts, techs } => {
                    assert_eq!(texts[0].value, "backend");
                    assert_eq!(techs[0].value, "go");
                    saw_defaults = true;
                }
                ViewEvent::Finished { ticket, outcome } => {
                    assert!(session.complete(ticket, &outcome));
                    finished = true;
                }
            }
        }

        cmd_tx.send(UiCommand::Quit).unwrap();
        handle.await.unwrap().unwrap();
        assert_eq!(session.screen.results, ResultsArea::Error("Error: nope".into()));
    }
}
