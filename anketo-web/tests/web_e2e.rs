//! End-to-end tests for the web UI against a mock FHIR backend.
//!
//! Two servers on loopback: a minimal FHIR mock and the real app
//! pointed at it, driven with reqwest the way a browser would be.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use anketo_client::FhirClient;
use anketo_core::CodeRegistry;
use anketo_web::{build_router, AppState};

#[derive(Default)]
struct MockFhir {
    resources: Mutex<HashMap<String, Value>>,
    next_id: Mutex<u32>,
}

impl MockFhir {
    fn store(&self, prefix: &str, mut body: Value) -> Value {
        let mut next = self.next_id.lock().unwrap();
        *next += 1;
        let id = format!("{prefix}{next}");
        body["id"] = json!(id);
        self.resources.lock().unwrap().insert(id, body.clone());
        body
    }

    fn get(&self, id: &str) -> Option<Value> {
        self.resources.lock().unwrap().get(id).cloned()
    }
}

fn not_found() -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "resourceType": "OperationOutcome",
            "issue": [{"severity": "error", "code": "not-found", "diagnostics": "unknown resource"}]
        })),
    )
}

async fn start_mock_fhir() -> (String, Arc<MockFhir>) {
    let state = Arc::new(MockFhir::default());

    async fn create(
        State(state): State<Arc<MockFhir>>,
        prefix: &'static str,
        body: Value,
    ) -> (StatusCode, Json<Value>) {
        (StatusCode::CREATED, Json(state.store(prefix, body)))
    }

    let app = Router::new()
        .route(
            "/Patient",
            post(|state: State<Arc<MockFhir>>, Json(body): Json<Value>| create(state, "p", body)),
        )
        .route(
            "/Patient/{id}",
            get(|State(state): State<Arc<MockFhir>>, Path(id): Path<String>| async move {
                match state.get(&id) {
                    Some(patient) => (StatusCode::OK, Json(patient)),
                    None => not_found(),
                }
            }),
        )
        .route(
            "/Questionnaire",
            post(|state: State<Arc<MockFhir>>, Json(body): Json<Value>| create(state, "q", body)),
        )
        .route(
            "/Questionnaire/{id}/$populate",
            post(|State(state): State<Arc<MockFhir>>, Path(id): Path<String>| async move {
                match state.get(&id) {
                    Some(questionnaire) => (
                        StatusCode::OK,
                        Json(json!({
                            "resourceType": "QuestionnaireResponse",
                            "status": "in-progress",
                            "item": questionnaire["item"].as_array().cloned().unwrap_or_default()
                        })),
                    ),
                    None => not_found(),
                }
            }),
        )
        .route(
            "/QuestionnaireResponse",
            post(|state: State<Arc<MockFhir>>, Json(body): Json<Value>| create(state, "r", body)),
        )
        .route(
            "/QuestionnaireResponse/{id}",
            get(|State(state): State<Arc<MockFhir>>, Path(id): Path<String>| async move {
                match state.get(&id) {
                    Some(response) => (StatusCode::OK, Json(response)),
                    None => not_found(),
                }
            }),
        )
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), state)
}

async fn start_app(fhir_base: &str) -> String {
    let state = Arc::new(AppState::new(
        FhirClient::new(fhir_base),
        CodeRegistry::with_defaults(),
    ));
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

async fn start_stack() -> (String, Arc<MockFhir>) {
    let (fhir_base, mock) = start_mock_fhir().await;
    let app_base = start_app(&fhir_base).await;
    (app_base, mock)
}

#[tokio::test]
async fn test_dashboard_renders_without_active_patient() {
    let (base, _mock) = start_stack().await;
    let client = reqwest::Client::new();

    let resp = client.get(format!("{base}/")).send().await.unwrap();
    assert_eq!(resp.status(), 200);

    let body = resp.text().await.unwrap();
    assert!(body.contains("Dashboard"));
    assert!(body.contains("None selected"));
}

#[tokio::test]
async fn test_create_patient_sets_active() {
    let (base, _mock) = start_stack().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base}/patients/new"))
        .form(&[("given", "Anna"), ("family", "Müller")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body = resp.text().await.unwrap();
    assert!(body.contains("p1"), "{body}");

    // The new patient shows up on the dashboard banner.
    let dashboard = client
        .get(format!("{base}/"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(dashboard.contains("Anna Müller"), "{dashboard}");
}

#[tokio::test]
async fn test_questionnaire_requires_active_patient() {
    let (base, _mock) = start_stack().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base}/questionnaire/q1"))
        .send()
        .await
        .unwrap();

    // Redirected back to the dashboard.
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.url().path(), "/");
}

#[tokio::test]
async fn test_fill_and_submit_flow() {
    let (base, _mock) = start_stack().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/patients/new"))
        .form(&[("given", "Anna"), ("family", "Müller")])
        .send()
        .await
        .unwrap();

    let questionnaire = json!({
        "resourceType": "Questionnaire",
        "status": "active",
        "item": [{"linkId": "severity", "text": "Symptom severity", "type": "string"}]
    })
    .to_string();

    let upload = client
        .post(format!("{base}/questionnaires/upload"))
        .form(&[("document", questionnaire.as_str())])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(upload.contains("q2"), "{upload}");

    let form = client
        .get(format!("{base}/questionnaire/q2"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(form.contains("name=\"severity\""), "{form}");
    assert!(form.contains("Symptom severity"), "{form}");

    let summary = client
        .post(format!("{base}/questionnaire/q2"))
        .form(&[("severity", "3")])
        .send()
        .await
        .unwrap();
    assert_eq!(summary.url().path(), "/responses/r3");

    let body = summary.text().await.unwrap();
    // The raw code was translated before storage.
    assert!(body.contains("moderate"), "{body}");
}

#[tokio::test]
async fn test_invalid_code_reports_errors_and_saves_nothing() {
    let (base, mock) = start_stack().await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base}/patients/new"))
        .form(&[("given", "Anna"), ("family", "Müller")])
        .send()
        .await
        .unwrap();

    let questionnaire = json!({
        "resourceType": "Questionnaire",
        "status": "active",
        "item": [{"linkId": "severity", "text": "Symptom severity", "type": "string"}]
    })
    .to_string();
    client
        .post(format!("{base}/questionnaires/upload"))
        .form(&[("document", questionnaire.as_str())])
        .send()
        .await
        .unwrap();

    let body = client
        .post(format!("{base}/questionnaire/q2"))
        .form(&[("severity", "9")])
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();

    assert!(body.contains("Validation failed"), "{body}");
    assert!(body.contains("severity"), "{body}");

    // Nothing was stored: only the patient and the questionnaire exist.
    let stored = mock.resources.lock().unwrap();
    assert!(stored.keys().all(|id| !id.starts_with('r')), "{stored:?}");
}
