//! Integration tests for the contact endpoint.
//!
//! Each test spins up the Axum router on a random port with stub providers
//! and exercises the real HTTP contract with reqwest.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::time::timeout;

use contact_relay::classify::Classifier;
use contact_relay::contact::{
    AllowedOrigins, Category, Classification, ContactState, Submission, SubmissionPipeline,
    contact_routes,
};
use contact_relay::error::{ClassifyError, NotifyError, StoreError};
use contact_relay::notify::{Notification, Notifier};
use contact_relay::store::{SubmissionRecord, SubmissionStore};

/// Maximum time any test is allowed to run before we consider it hung.
const TEST_TIMEOUT: Duration = Duration::from_secs(5);

const ALLOWED: &str = "https://www.example.com";

// ── Stub providers ──────────────────────────────────────────────────

#[derive(Default)]
struct Calls {
    classified: Mutex<Vec<Submission>>,
    stored: Mutex<Vec<SubmissionRecord>>,
    sent: Mutex<Vec<Notification>>,
}

impl Calls {
    fn total(&self) -> usize {
        self.classified.lock().unwrap().len()
            + self.stored.lock().unwrap().len()
            + self.sent.lock().unwrap().len()
    }
}

#[derive(Clone, Copy)]
struct Behaviour {
    classify_ok: bool,
    store_ok: bool,
    notify_ok: bool,
}

impl Default for Behaviour {
    fn default() -> Self {
        Self {
            classify_ok: true,
            store_ok: true,
            notify_ok: true,
        }
    }
}

struct StubProviders {
    calls: Arc<Calls>,
    behaviour: Behaviour,
}

#[async_trait]
impl Classifier for StubProviders {
    fn name(&self) -> &str {
        "stub"
    }
    async fn classify(&self, submission: &Submission) -> Result<Classification, ClassifyError> {
        self.calls
            .classified
            .lock()
            .unwrap()
            .push(submission.clone());
        if !self.behaviour.classify_ok {
            return Err(ClassifyError::InvalidResponse {
                provider: "stub".into(),
                reason: "garbage".into(),
            });
        }
        Ok(Classification {
            summary: "S".into(),
            category: Category::Support,
            spam_score: 0.9,
        })
    }
}

#[async_trait]
impl SubmissionStore for StubProviders {
    fn name(&self) -> &str {
        "stub"
    }
    async fn insert(&self, record: &SubmissionRecord) -> Result<(), StoreError> {
        self.calls.stored.lock().unwrap().push(record.clone());
        if !self.behaviour.store_ok {
            return Err(StoreError::RequestFailed {
                provider: "stub".into(),
                reason: "connection refused".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for StubProviders {
    fn name(&self) -> &str {
        "stub"
    }
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.calls.sent.lock().unwrap().push(notification.clone());
        if !self.behaviour.notify_ok {
            return Err(NotifyError::Rejected {
                backend: "stub".into(),
                status: 401,
                body: "secret internal detail".into(),
            });
        }
        Ok(())
    }
}

/// Start the contact server on a random port, return (base url, calls).
async fn start_server(behaviour: Behaviour) -> (String, Arc<Calls>) {
    let calls = Arc::new(Calls::default());
    let stub = Arc::new(StubProviders {
        calls: Arc::clone(&calls),
        behaviour,
    });
    let pipeline = SubmissionPipeline::new(stub.clone(), stub.clone(), stub);
    let state = ContactState::new(AllowedOrigins::parse(ALLOWED), pipeline);
    let app = contact_routes(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .await
        .unwrap();
    });

    // Give the server a moment to start accepting connections.
    tokio::time::sleep(Duration::from_millis(50)).await;

    (format!("http://127.0.0.1:{port}"), calls)
}

fn valid_form() -> Value {
    json!({"name": "Ann", "email": "ann@example.com", "message": "My login is broken"})
}

async fn post(base: &str, origin: Option<&str>, body: &Value) -> reqwest::Response {
    let mut request = reqwest::Client::new().post(format!("{base}/")).json(body);
    if let Some(origin) = origin {
        request = request.header("Origin", origin);
    }
    request.send().await.unwrap()
}

// ── CORS ────────────────────────────────────────────────────────────

#[tokio::test]
async fn preflight_allowed_origin_echoes_origin() {
    timeout(TEST_TIMEOUT, async {
        let (base, calls) = start_server(Behaviour::default()).await;

        let resp = reqwest::Client::new()
            .request(Method::OPTIONS, format!("{base}/"))
            .header("Origin", ALLOWED)
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 204);
        let headers = resp.headers();
        assert_eq!(headers["access-control-allow-origin"], ALLOWED);
        assert_eq!(headers["access-control-allow-methods"], "POST, OPTIONS");
        assert_eq!(headers["access-control-allow-headers"], "Content-Type");
        assert!(resp.text().await.unwrap().is_empty());
        assert_eq!(calls.total(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn preflight_disallowed_or_missing_origin_gets_no_allow_origin() {
    timeout(TEST_TIMEOUT, async {
        let (base, _calls) = start_server(Behaviour::default()).await;
        let client = reqwest::Client::new();

        for origin in [Some("https://evil.example"), None] {
            let mut request = client.request(Method::OPTIONS, format!("{base}/"));
            if let Some(origin) = origin {
                request = request.header("Origin", origin);
            }
            let resp = request.send().await.unwrap();
            assert_eq!(resp.status(), 204);
            assert!(resp.headers().get("access-control-allow-origin").is_none());
            assert_eq!(
                resp.headers()["access-control-allow-methods"],
                "POST, OPTIONS"
            );
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn disallowed_origin_is_forbidden_without_downstream_calls() {
    timeout(TEST_TIMEOUT, async {
        let (base, calls) = start_server(Behaviour::default()).await;

        for origin in [Some("https://evil.example"), None] {
            let resp = post(&base, origin, &valid_form()).await;
            assert_eq!(resp.status(), 403);
            assert!(resp.headers().get("access-control-allow-origin").is_none());
            let body: Value = resp.json().await.unwrap();
            assert_eq!(body, json!({"error": "Forbidden"}));
        }
        assert_eq!(calls.total(), 0);
    })
    .await
    .expect("test timed out");
}

// ── Method & validation ─────────────────────────────────────────────

#[tokio::test]
async fn other_methods_are_not_allowed() {
    timeout(TEST_TIMEOUT, async {
        let (base, calls) = start_server(Behaviour::default()).await;
        let client = reqwest::Client::new();

        for method in [Method::GET, Method::PUT, Method::DELETE] {
            let resp = client
                .request(method, format!("{base}/"))
                .header("Origin", ALLOWED)
                .send()
                .await
                .unwrap();
            assert_eq!(resp.status(), 405);
            let body: Value = resp.json().await.unwrap();
            assert_eq!(body, json!({"error": "Method Not Allowed"}));
        }
        assert_eq!(calls.total(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn missing_fields_are_bad_requests_without_downstream_calls() {
    timeout(TEST_TIMEOUT, async {
        let (base, calls) = start_server(Behaviour::default()).await;

        let bodies = [
            json!({"email": "ann@example.com", "message": "hi"}),
            json!({"name": "Ann", "message": "hi"}),
            json!({"name": "Ann", "email": "ann@example.com"}),
            json!({"name": "", "email": "ann@example.com", "message": "hi"}),
            json!({}),
            json!(null),
            json!("name=Ann"),
        ];
        for body in &bodies {
            let resp = post(&base, Some(ALLOWED), body).await;
            assert_eq!(resp.status(), 400, "body {body}");
            assert_eq!(resp.headers()["access-control-allow-origin"], ALLOWED);
            let json: Value = resp.json().await.unwrap();
            assert_eq!(json, json!({"error": "Bad Request"}));
        }
        assert_eq!(calls.total(), 0);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn non_json_body_is_a_bad_request() {
    timeout(TEST_TIMEOUT, async {
        let (base, calls) = start_server(Behaviour::default()).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/"))
            .header("Origin", ALLOWED)
            .header("Content-Type", "text/plain")
            .body("name=Ann&email=a@b.c&message=hi")
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400);
        assert_eq!(calls.total(), 0);
    })
    .await
    .expect("test timed out");
}

// ── Pipeline outcomes ───────────────────────────────────────────────

#[tokio::test]
async fn successful_submission_returns_ok() {
    timeout(TEST_TIMEOUT, async {
        let (base, calls) = start_server(Behaviour::default()).await;

        let resp = reqwest::Client::new()
            .post(format!("{base}/api/contact"))
            .header("Origin", ALLOWED)
            .header("User-Agent", "integration-test")
            .header("X-Forwarded-For", "203.0.113.5")
            .json(&valid_form())
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status(), 200);
        assert_eq!(resp.headers()["access-control-allow-origin"], ALLOWED);
        assert_eq!(resp.headers()["vary"], "Origin");
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body, json!({"ok": true}));

        let classified = calls.classified.lock().unwrap();
        assert_eq!(classified[0].ip, "203.0.113.5");
        assert_eq!(classified[0].user_agent, "integration-test");

        let stored = calls.stored.lock().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].claude_category, Category::Support);

        let sent = calls.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "[New inquiry] support - Ann");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn peer_address_used_without_forwarded_header() {
    timeout(TEST_TIMEOUT, async {
        let (base, calls) = start_server(Behaviour::default()).await;

        let resp = post(&base, Some(ALLOWED), &valid_form()).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(calls.classified.lock().unwrap()[0].ip, "127.0.0.1");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn classifier_failure_still_succeeds_with_defaults() {
    timeout(TEST_TIMEOUT, async {
        let (base, calls) = start_server(Behaviour {
            classify_ok: false,
            ..Behaviour::default()
        })
        .await;

        let resp = post(&base, Some(ALLOWED), &valid_form()).await;
        assert_eq!(resp.status(), 200);

        let stored = calls.stored.lock().unwrap();
        assert_eq!(stored[0].claude_category, Category::Other);
        assert_eq!(stored[0].claude_summary, "");
        assert_eq!(stored[0].spam_score, 0.0);

        let sent = calls.sent.lock().unwrap();
        assert_eq!(sent[0].subject, "[New inquiry] other - Ann");
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn store_failure_is_not_visible_to_caller() {
    timeout(TEST_TIMEOUT, async {
        let (base, calls) = start_server(Behaviour {
            store_ok: false,
            ..Behaviour::default()
        })
        .await;

        let resp = post(&base, Some(ALLOWED), &valid_form()).await;
        assert_eq!(resp.status(), 200);
        assert_eq!(calls.sent.lock().unwrap().len(), 1);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn notify_failure_is_an_opaque_server_error() {
    timeout(TEST_TIMEOUT, async {
        for store_ok in [true, false] {
            let (base, _calls) = start_server(Behaviour {
                store_ok,
                notify_ok: false,
                ..Behaviour::default()
            })
            .await;

            let resp = post(&base, Some(ALLOWED), &valid_form()).await;
            assert_eq!(resp.status(), 500);
            assert_eq!(resp.headers()["access-control-allow-origin"], ALLOWED);
            let text = resp.text().await.unwrap();
            assert!(!text.contains("secret internal detail"));
            let body: Value = serde_json::from_str(&text).unwrap();
            assert_eq!(body, json!({"error": "Server Error"}));
        }
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn resubmission_is_not_deduplicated() {
    timeout(TEST_TIMEOUT, async {
        let (base, calls) = start_server(Behaviour::default()).await;

        for _ in 0..2 {
            let resp = post(&base, Some(ALLOWED), &valid_form()).await;
            assert_eq!(resp.status(), 200);
        }
        assert_eq!(calls.stored.lock().unwrap().len(), 2);
        assert_eq!(calls.sent.lock().unwrap().len(), 2);
    })
    .await
    .expect("test timed out");
}

#[tokio::test]
async fn health_reports_ok() {
    timeout(TEST_TIMEOUT, async {
        let (base, _calls) = start_server(Behaviour::default()).await;

        let resp = reqwest::get(format!("{base}/health")).await.unwrap();
        assert_eq!(resp.status(), 200);
        let body: Value = resp.json().await.unwrap();
        assert_eq!(body["status"], "ok");
    })
    .await
    .expect("test timed out");
}
