use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use client::error::TransportError;
use client::location::{Location, MemoryLocation};
use client::pipeline::ResponseOrdering;
use client::service::GenerationService;
use client::tabs::PaneKind;
use client::widget::{BufferEditor, Editor, TextErrorPane};
use client::{PlaygroundConfig, Session, SessionEvent, Widgets};
use common::{Bootstrap, Document, GenerationRequest, GenerationResponse};
use tokio::time::{sleep, timeout};

/// Answers every request with a `query.sql.go` echoing the query.
///
/// A query containing `FAIL` produces a transport error, one containing
/// `ERROR` an errored response.
#[derive(Default)]
struct ScriptedService {
    requests: Mutex<Vec<GenerationRequest>>,
    delays: Mutex<VecDeque<Duration>>,
}

impl ScriptedService {
    fn with_delays(delays: &[u64]) -> Self {
        Self {
            requests: Mutex::default(),
            delays: Mutex::new(delays.iter().map(|ms| Duration::from_millis(*ms)).collect()),
        }
    }

    fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl GenerationService for ScriptedService {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, TransportError> {
        let n = {
            let mut requests = self.requests.lock().unwrap();
            requests.push(request.clone());
            requests.len()
        };
        let delay = self.delays.lock().unwrap().pop_front();
        if let Some(delay) = delay {
            sleep(delay).await;
        }

        if request.query.contains("FAIL") {
            return Err(GenerationResponse::decode("<html>502</html>").unwrap_err().into());
        }
        if request.query.contains("ERROR") {
            let mut response = GenerationResponse::failure(Some(format!("line 1: {}", request.query)));
            response.sha = Some(format!("sha-{}", n));
            return Ok(response);
        }
        Ok(GenerationResponse::success(
            Some(format!("sha-{}", n)),
            vec![
                Document::new("models.go", "package db", "text/x-go"),
                Document::new("query.sql.go", format!("// {}", request.query), "text/x-go"),
            ],
        ))
    }
}

struct Page {
    input: BufferEditor,
    output: BufferEditor,
    errors: TextErrorPane,
    location: MemoryLocation,
    service: Arc<ScriptedService>,
    session: Session,
}

impl Page {
    fn open(config: PlaygroundConfig, service: ScriptedService, bootstrap: Bootstrap) -> Self {
        let input = BufferEditor::new();
        let output = BufferEditor::new();
        let errors = TextErrorPane::new();
        let location = MemoryLocation::new("/");
        let service = Arc::new(service);
        let mut session = Session::new(
            &config,
            Widgets {
                input: Box::new(input.clone()),
                output: Box::new(output.clone()),
                errors: Box::new(errors.clone()),
                location: Box::new(location.clone()),
            },
            service.clone(),
        );
        session.bootstrap(bootstrap);
        Self {
            input,
            output,
            errors,
            location,
            service,
            session,
        }
    }

    fn type_text(&mut self, text: &str) {
        self.input.set_value(text);
        self.session.dispatch(SessionEvent::EditOccurred);
    }

    /// Handles events until the renderer has drawn `renders` responses.
    async fn until_renders(&mut self, renders: u64) {
        while self.session.output().renders() < renders {
            assert!(self.session.step().await);
        }
    }

    async fn assert_idle(&mut self) {
        assert!(
            timeout(Duration::from_secs(10), self.session.next_event())
                .await
                .is_err(),
            "unexpected event"
        );
    }
}

fn config() -> PlaygroundConfig {
    PlaygroundConfig {
        debounce_ms: 200,
        ..PlaygroundConfig::default()
    }
}

fn inputs() -> Bootstrap {
    Bootstrap::with_input([
        Document::for_file("query.sql", "SELECT 1;"),
        Document::for_file("sqlc.json", "{\"version\":\"1\"}"),
    ])
}

#[tokio::test(start_paused = true)]
async fn burst_of_edits_sends_one_request_with_last_text() {
    let mut page = Page::open(config(), ScriptedService::default(), inputs());

    for text in ["S", "SE", "SEL", "SELECT", "SELECT 2;"] {
        page.type_text(text);
        sleep(Duration::from_millis(100)).await;
    }
    page.until_renders(1).await;

    let requests = page.service.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].query, "SELECT 2;");
    assert_eq!(requests[0].config.as_deref(), Some("{\"version\":\"1\"}"));

    assert_eq!(page.output.text(), "// SELECT 2;");
    assert_eq!(page.session.output().tabs().selected_name(), Some("query.sql.go"));
    assert_eq!(page.location.path(), "/p/sha-1");
    assert_eq!(page.location.history_len(), 1);
    page.assert_idle().await;
}

#[tokio::test(start_paused = true)]
async fn missing_config_document_blocks_requests() {
    let config = PlaygroundConfig {
        require_config: true,
        ..config()
    };
    let bootstrap = Bootstrap::with_input([Document::for_file("query.sql", "SELECT 1;")]);
    let mut page = Page::open(config, ScriptedService::default(), bootstrap);

    page.type_text("SELECT 2;");
    assert!(page.session.step().await);

    assert!(page.service.requests().is_empty());
    assert_eq!(page.session.in_flight(), 0);
    page.assert_idle().await;
}

#[tokio::test(start_paused = true)]
async fn edits_before_bootstrap_are_not_sent() {
    let mut page = Page::open(config(), ScriptedService::default(), Bootstrap::default());

    page.type_text("SELECT 1;");
    assert!(page.session.step().await);

    assert!(page.service.requests().is_empty());
    page.assert_idle().await;
}

#[tokio::test(start_paused = true)]
async fn stale_response_is_discarded() {
    let mut page = Page::open(config(), ScriptedService::with_delays(&[1_000, 10]), inputs());

    page.type_text("SELECT 'a';");
    assert!(page.session.step().await);
    page.type_text("SELECT 'b';");
    assert!(page.session.step().await);
    assert_eq!(page.session.in_flight(), 2);

    page.until_renders(1).await;
    assert_eq!(page.output.text(), "// SELECT 'b';");

    // The slow first response arrives and is dropped.
    assert!(page.session.step().await);
    assert_eq!(page.session.in_flight(), 0);
    assert_eq!(page.session.output().renders(), 1);
    assert_eq!(page.output.text(), "// SELECT 'b';");
    assert_eq!(page.location.path(), "/p/sha-2");
}

#[tokio::test(start_paused = true)]
async fn arrival_ordering_renders_late_response() {
    let config = PlaygroundConfig {
        ordering: ResponseOrdering::Arrival,
        ..config()
    };
    let mut page = Page::open(config, ScriptedService::with_delays(&[1_000, 10]), inputs());

    page.type_text("SELECT 'a';");
    assert!(page.session.step().await);
    page.type_text("SELECT 'b';");
    assert!(page.session.step().await);

    page.until_renders(2).await;
    assert_eq!(page.output.text(), "// SELECT 'a';");
    assert_eq!(page.location.path(), "/p/sha-1");
}

#[tokio::test(start_paused = true)]
async fn edit_during_request_does_not_cancel_it() {
    let mut page = Page::open(config(), ScriptedService::with_delays(&[500, 500]), inputs());

    page.type_text("SELECT 'a';");
    assert!(page.session.step().await);
    page.type_text("SELECT 'b';");
    assert!(page.session.step().await);

    page.until_renders(2).await;
    assert_eq!(page.service.requests().len(), 2);
    assert_eq!(page.output.text(), "// SELECT 'b';");
}

#[tokio::test(start_paused = true)]
async fn transport_error_keeps_last_output() {
    let mut page = Page::open(config(), ScriptedService::default(), inputs());
    page.type_text("SELECT 1;");
    page.until_renders(1).await;

    page.type_text("SELECT FAIL;");
    assert!(page.session.step().await);
    assert!(page.session.step().await);

    assert_eq!(page.session.output().renders(), 1);
    assert_eq!(page.output.text(), "// SELECT 1;");
    assert!(page.output.is_visible());
    assert!(!page.errors.is_visible());
    assert_eq!(page.location.path(), "/p/sha-1");

    // The cycle resumes on the next edit.
    page.type_text("SELECT 3;");
    page.until_renders(2).await;
    assert_eq!(page.output.text(), "// SELECT 3;");
}

#[tokio::test(start_paused = true)]
async fn errored_response_shows_error_then_recovers() {
    let mut page = Page::open(config(), ScriptedService::default(), inputs());

    page.type_text("SELECT ERROR;");
    page.until_renders(1).await;
    assert!(page.errors.is_visible());
    assert!(!page.output.is_visible());
    assert_eq!(page.errors.text(), "line 1: SELECT ERROR;");
    assert_eq!(page.location.path(), "/p/sha-1");

    page.type_text("SELECT 1;");
    page.until_renders(2).await;
    assert!(!page.errors.is_visible());
    assert!(page.output.is_visible());
    assert_eq!(page.output.text(), "// SELECT 1;");
}

#[tokio::test(start_paused = true)]
async fn bootstrap_renders_without_request() {
    let bootstrap = Bootstrap::from_payloads(
        Some(r#"{"errored":false,"sha":"","error":"","files":[{"name":"query.sql","contents":"SELECT 1;"},{"name":"sqlc.json","contents":"{}"}]}"#),
        Some(r#"{"errored":false,"sha":"abc123","error":"","files":[{"name":"models.go","contents":"package db","contentType":"text/x-go"},{"name":"query.sql.go","contents":"package db // q","contentType":"text/x-go"}]}"#),
    )
    .unwrap();
    let mut page = Page::open(config(), ScriptedService::default(), bootstrap);

    assert_eq!(page.input.text(), "SELECT 1;");
    assert_eq!(page.session.input_tabs().selected_name(), Some("query.sql"));
    assert_eq!(page.output.text(), "package db // q");
    assert_eq!(page.location.path(), "/p/abc123");
    assert!(page.service.requests().is_empty());
    page.assert_idle().await;
}

#[tokio::test(start_paused = true)]
async fn switching_input_tabs_keeps_both_documents() {
    let mut page = Page::open(config(), ScriptedService::default(), inputs());

    page.input.set_value("SELECT 7;");
    page.session.dispatch(SessionEvent::TabSelected {
        pane: PaneKind::Input,
        name: "sqlc.json".into(),
    });
    assert_eq!(page.input.text(), "{\"version\":\"1\"}");

    page.type_text("{\"version\":\"2\"}");
    page.until_renders(1).await;

    let request = &page.service.requests()[0];
    assert_eq!(request.query, "SELECT 7;");
    assert_eq!(request.config.as_deref(), Some("{\"version\":\"2\"}"));
    assert_eq!(
        page.session.input_documents().get("sqlc.json").unwrap().content,
        "{\"version\":\"2\"}"
    );
}

#[tokio::test(start_paused = true)]
async fn output_tab_events_switch_displayed_file() {
    let mut page = Page::open(config(), ScriptedService::default(), inputs());
    page.type_text("SELECT 1;");
    page.until_renders(1).await;
    let swaps = page.output.swaps();

    page.session.dispatch(SessionEvent::TabSelected {
        pane: PaneKind::Output,
        name: "models.go".into(),
    });
    assert_eq!(page.output.text(), "package db");

    page.session.dispatch(SessionEvent::TabSelected {
        pane: PaneKind::Output,
        name: "models.go".into(),
    });
    assert_eq!(page.output.swaps(), swaps + 1);

    page.session.dispatch(SessionEvent::TabSelected {
        pane: PaneKind::Output,
        name: "nope.go".into(),
    });
    assert_eq!(page.session.output().tabs().selected_name(), Some("models.go"));
}

#[tokio::test(start_paused = true)]
async fn shutdown_cancels_pending_edit() {
    let mut page = Page::open(config(), ScriptedService::default(), inputs());

    page.type_text("SELECT 1;");
    assert!(page.session.debounce_pending());
    assert!(!page.session.dispatch(SessionEvent::Shutdown));
    assert!(!page.session.debounce_pending());

    page.assert_idle().await;
    assert!(page.service.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn run_loop_driven_through_handle() {
    let input = BufferEditor::new();
    let output = BufferEditor::new();
    let service = Arc::new(ScriptedService::default());
    let mut session = Session::new(
        &config(),
        Widgets {
            input: Box::new(input.clone()),
            output: Box::new(output.clone()),
            errors: Box::new(TextErrorPane::new()),
            location: Box::new(MemoryLocation::default()),
        },
        service.clone(),
    );
    session.bootstrap(inputs());
    let handle = session.handle();
    let task = tokio::spawn(session.run());

    let mut typing = input.clone();
    typing.set_value("SELECT 9;");
    handle.edit().unwrap();
    sleep(Duration::from_secs(1)).await;
    assert_eq!(output.text(), "// SELECT 9;");

    handle.select_tab(PaneKind::Output, "models.go").unwrap();
    sleep(Duration::from_millis(10)).await;
    assert_eq!(output.text(), "package db");

    handle.shutdown().unwrap();
    task.await.unwrap();
    assert!(handle.edit().is_err());
    assert_eq!(service.requests().len(), 1);
}
