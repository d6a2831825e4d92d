//! End-to-end integration tests for the vahed advisor.
//!
//! These tests load real corpus files from disk, build the index with the
//! offline hashing embedder, and run the two-stage pipeline against a scripted
//! generator, both directly and through the HTTP gateway.

use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use tower::ServiceExt;

use vahed_advisor::{CoursePlanner, PlanStatus};
use vahed_config::AppConfig;
use vahed_core::error::ProviderError;
use vahed_core::message::Message;
use vahed_core::provider::{Provider, ProviderRequest, ProviderResponse};
use vahed_core::{CourseSelectionRequest, TimeMap};

// ── Scripted Provider ───────────────────────────────────────────────────

type Step = Box<dyn Fn(&str) -> Result<String, ProviderError> + Send + Sync>;

/// A generator that answers each call with the next scripted step.
///
/// Each step sees the full prompt, so a step can play the part of a model
/// that reads the retrieved context.
struct ScriptedProvider {
    steps: std::sync::Mutex<Vec<Step>>,
    prompts: std::sync::Mutex<Vec<String>>,
}

impl ScriptedProvider {
    fn new(steps: Vec<Step>) -> Self {
        Self {
            steps: std::sync::Mutex::new(steps),
            prompts: std::sync::Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }

    fn prompt(&self, n: usize) -> String {
        self.prompts.lock().unwrap()[n].clone()
    }
}

#[async_trait::async_trait]
impl Provider for ScriptedProvider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ProviderError> {
        let prompt = request
            .messages
            .iter()
            .map(|m| m.content.as_str())
            .collect::<Vec<_>>()
            .join("\n");
        self.prompts.lock().unwrap().push(prompt.clone());

        let mut steps = self.steps.lock().unwrap();
        assert!(!steps.is_empty(), "ScriptedProvider ran out of steps");
        let step = steps.remove(0);
        step(&prompt).map(|text| ProviderResponse {
            message: Message::assistant(text),
            usage: None,
            model: request.model,
        })
    }
}

fn reply(text: &'static str) -> Step {
    Box::new(move |_| Ok(text.to_string()))
}

fn fail(err: ProviderError) -> Step {
    Box::new(move |_| Err(err.clone()))
}

// ── Fixtures ────────────────────────────────────────────────────────────

const CURRICULUM: &str = r#"{"id":"ce-11","program":"Computer Engineering","term":1,"name":"Physics 1","units_text":"3","type":"basic","prerequisites":[],"corequisites":[]}
{"id":"ce-21","program":"Computer Engineering","term":2,"name":"Physics 2","units_text":"3","type":"basic","prerequisites":["Physics 1"],"corequisites":[]}
{"id":"ce-22","program":"Computer Engineering","term":2,"name":"Logic Circuits","units_text":"3","type":"core","prerequisites":[],"corequisites":[]}
this line is not json
{"id":"ce-31","program":"Computer Engineering","term":3,"name":"Computer Architecture","units_text":"3","type":"core","prerequisites":["Logic Circuits"],"corequisites":[]}
"#;

const LOGIC_ON_SUNDAY: &str = "Logic Circuits, group 1: Sunday 08:00-10:00 and Tuesday 10:00-12:00";
const PHYSICS_ON_MONDAY: &str = "Physics 2, group 1: Monday 10:00-12:00";
const LOGIC_ON_WEDNESDAY: &str = "Logic Circuits, group 2: Wednesday 14:00-16:00";

const LOGIC_JSON: &str = "```json\n[{\"id\":\"ce-22\",\"name\":\"Logic Circuits\",\"units_number\":3,\"type\":\"core\",\"prerequisites\":[],\"corequisites\":[],\"time\":\"Sunday 08:00-10:00 / Tuesday 10:00-12:00\"}]\n```";

fn write_corpus(dir: &Path, documents: &[&str]) -> AppConfig {
    let curriculum = dir.join("courses.jsonl");
    let rag = dir.join("rag.json");
    std::fs::write(&curriculum, CURRICULUM).unwrap();
    let docs: Vec<serde_json::Value> = documents
        .iter()
        .map(|text| serde_json::json!({"text": text, "metadata": {"source": "timetable"}}))
        .collect();
    std::fs::write(&rag, serde_json::to_string(&docs).unwrap()).unwrap();

    let mut config = AppConfig {
        api_key: Some("test-key".into()),
        ..AppConfig::default()
    };
    config.corpus.curriculum_path = Some(curriculum);
    config.corpus.documents_path = Some(rag);
    config.retrieval.embedding_provider = "hashing".into();
    config
}

async fn planner(documents: &[&str], provider: Arc<ScriptedProvider>) -> (tempfile::TempDir, Arc<CoursePlanner>) {
    let dir = tempfile::tempdir().unwrap();
    let config = write_corpus(dir.path(), documents);
    let planner = vahed_gateway::bootstrap_with_generator(&config, provider)
        .await
        .unwrap();
    (dir, planner)
}

fn sunday_morning() -> TimeMap {
    let mut time = TimeMap::new();
    time.insert(
        "Sunday".into(),
        vec!["08:00-10:00".into(), "10:00-12:00".into()],
    );
    time
}

fn logic_circuits_request() -> CourseSelectionRequest {
    CourseSelectionRequest {
        program: "Computer Engineering".into(),
        term: 3,
        course: vec!["Physics 2".into(), "Logic Circuits".into()],
        time: sunday_morning(),
    }
}

/// A stage-2 step that keeps Logic Circuits only when the retrieved
/// context shows a Sunday morning session for it.
fn schedule_reader() -> Step {
    Box::new(|prompt| {
        if prompt.contains(LOGIC_ON_SUNDAY) {
            Ok(LOGIC_JSON.to_string())
        } else {
            Ok("```json\n[]\n```".to_string())
        }
    })
}

// ── Pipeline ────────────────────────────────────────────────────────────

#[tokio::test]
async fn logic_circuits_kept_when_a_session_fits() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        reply("Logic Circuits (3 units)\nPhysics 2 (3 units)"),
        schedule_reader(),
    ]));
    let (_dir, planner) = planner(&[LOGIC_ON_SUNDAY, PHYSICS_ON_MONDAY], provider.clone()).await;

    let plan = planner.plan(&logic_circuits_request()).await.unwrap();

    assert_eq!(plan.status, PlanStatus::Extracted);
    assert_eq!(plan.courses.len(), 1);
    assert_eq!(plan.courses[0].name, "Logic Circuits");
    assert_eq!(plan.courses[0].units_number, 3);
    // Multi-session courses carry every session
    assert_eq!(plan.courses[0].time, "Sunday 08:00-10:00 / Tuesday 10:00-12:00");

    // Stage 1 saw the curriculum and the outstanding courses
    let stage1 = provider.prompt(0);
    assert!(stage1.contains("Computer Architecture"));
    assert!(stage1.contains("Physics 2"));
    assert!(stage1.contains("Computer Engineering"));

    // Stage 2 saw the candidates, the availability map and the timetable
    let stage2 = provider.prompt(1);
    assert!(stage2.contains("Logic Circuits (3 units)"));
    assert!(stage2.contains(r#"{"Sunday":["08:00-10:00","10:00-12:00"]}"#));
    assert!(stage2.contains(LOGIC_ON_SUNDAY));
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn logic_circuits_excluded_without_a_fitting_session() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        reply("Logic Circuits (3 units)"),
        schedule_reader(),
    ]));
    let (_dir, planner) = planner(&[LOGIC_ON_WEDNESDAY, PHYSICS_ON_MONDAY], provider.clone()).await;

    let plan = planner.plan(&logic_circuits_request()).await.unwrap();

    assert_eq!(plan.status, PlanStatus::Extracted);
    assert!(plan.courses.is_empty());
    assert!(provider.prompt(1).contains(LOGIC_ON_WEDNESDAY));
}

#[tokio::test]
async fn empty_outstanding_and_time_returns_empty_without_generation() {
    let provider = Arc::new(ScriptedProvider::new(vec![]));
    let (_dir, planner) = planner(&[LOGIC_ON_SUNDAY], provider.clone()).await;

    let request = CourseSelectionRequest {
        program: "Computer Engineering".into(),
        term: 2,
        course: Vec::new(),
        time: TimeMap::new(),
    };
    let plan = planner.plan(&request).await.unwrap();

    assert!(plan.courses.is_empty());
    assert_eq!(plan.status, PlanStatus::NoAvailability);
    assert_eq!(provider.calls(), 0);
}

#[tokio::test]
async fn prose_answer_degrades_to_empty_list() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        reply("Logic Circuits"),
        reply("Logic Circuits fits your Sunday morning. Good luck!"),
    ]));
    let (_dir, planner) = planner(&[LOGIC_ON_SUNDAY], provider).await;

    let plan = planner.plan(&logic_circuits_request()).await.unwrap();

    assert!(plan.courses.is_empty());
    assert!(matches!(plan.status, PlanStatus::Degraded(_)));
    assert!(plan.answer.unwrap().contains("Good luck"));
}

#[tokio::test]
async fn generator_failure_surfaces_as_error() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        reply("Logic Circuits"),
        fail(ProviderError::RateLimited {
            retry_after_secs: 5,
        }),
    ]));
    let (_dir, planner) = planner(&[LOGIC_ON_SUNDAY], provider.clone()).await;

    let err = planner.plan(&logic_circuits_request()).await.unwrap_err();

    assert!(matches!(
        err,
        vahed_core::Error::Provider(ProviderError::RateLimited { .. })
    ));
    assert_eq!(provider.calls(), 2);
}

#[tokio::test]
async fn malformed_curriculum_lines_are_skipped() {
    let provider = Arc::new(ScriptedProvider::new(vec![]));
    let (_dir, planner) = planner(&[LOGIC_ON_SUNDAY], provider).await;

    assert_eq!(planner.corpus().len(), 4);
    assert_eq!(planner.corpus().skipped(), 1);
    assert_eq!(planner.index().len(), 1);
}

// ── HTTP ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_courses_over_http() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        reply("Logic Circuits (3 units)"),
        schedule_reader(),
    ]));
    let (_dir, planner) = planner(&[LOGIC_ON_SUNDAY, PHYSICS_ON_MONDAY], provider).await;
    let app = vahed_gateway::build_router(
        Arc::new(vahed_gateway::AppState { planner }),
        &vahed_config::GatewayConfig::default(),
    );

    let req = Request::builder()
        .method("POST")
        .uri("/get_courses")
        .header("content-type", "application/json")
        .body(Body::from(
            serde_json::to_string(&logic_circuits_request()).unwrap(),
        ))
        .unwrap();

    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json[0]["id"], "ce-22");
    assert_eq!(json[0]["name"], "Logic Circuits");
    assert_eq!(json[0]["units_number"], 3);
    assert_eq!(json[0]["type"], "core");
}
