//! Integration tests for the babybites-web server.
//!
//! These tests start a real axum server on a random port, backed by a fake
//! model backend that counts calls, and exercise the HTML and JSON routes.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use babybites::config::KitchenConfig;
use babybites::error::ApiError;
use babybites::kitchen::Kitchen;
use babybites::{
    Backend, BackendFuture, ChatCompletion, ChatRequest, GeneratedImage, ImageRequest, UsageInfo,
};
use babybites_web::{WebConfig, spawn_web};
use serde_json::json;

const REPLY: &str = "[Broccoli Egg Porridge]\n1. Steam the broccoli.\n2. Stir in the egg.\n---COUPANG_SUGGESTION---\nBaby cheese adds calories.";
const IMAGE_URL: &str = "https://images.example/porridge.png";

#[derive(Default)]
struct FakeBackend {
    fail: bool,
    hang: bool,
    chat_calls: AtomicUsize,
    image_calls: AtomicUsize,
    last_user_prompt: Mutex<Option<String>>,
}

impl Backend for FakeBackend {
    fn chat<'a>(&'a self, body: &'a ChatRequest) -> BackendFuture<'a, ChatCompletion> {
        Box::pin(async move {
            self.chat_calls.fetch_add(1, Ordering::SeqCst);
            *self.last_user_prompt.lock().unwrap() =
                body.messages.last().map(|m| m.content.clone());
            if self.hang {
                std::future::pending::<()>().await;
            }
            if self.fail {
                return Err(ApiError::Api("rate limit reached".into()));
            }
            Ok(ChatCompletion {
                content: Some(REPLY.into()),
                usage: Some(UsageInfo {
                    prompt_tokens: Some(250),
                    completion_tokens: Some(400),
                    total_tokens: Some(650),
                }),
                finish_reason: Some("stop".into()),
            })
        })
    }

    fn generate_image<'a>(&'a self, _body: &'a ImageRequest) -> BackendFuture<'a, GeneratedImage> {
        Box::pin(async move {
            self.image_calls.fetch_add(1, Ordering::SeqCst);
            Ok(GeneratedImage {
                url: IMAGE_URL.into(),
                revised_prompt: None,
            })
        })
    }
}

impl FakeBackend {
    fn calls(&self) -> (usize, usize) {
        (
            self.chat_calls.load(Ordering::SeqCst),
            self.image_calls.load(Ordering::SeqCst),
        )
    }
}

/// Helper: spawn a test server on port 0 (random available port).
async fn spawn_test_server(backend: Arc<FakeBackend>, deadline: Option<Duration>) -> String {
    let kitchen = Arc::new(Kitchen::new(backend, KitchenConfig::default()));
    let config = WebConfig {
        bind_addr: ([127, 0, 0, 1], 0).into(),
        deadline,
    };
    let addr = spawn_web(kitchen, config).await.unwrap();
    format!("http://{addr}")
}

async fn post_form(base: &str, body: &str) -> reqwest::Response {
    reqwest::Client::new()
        .post(format!("{base}/recipe"))
        .header("content-type", "application/x-www-form-urlencoded")
        .body(body.to_string())
        .send()
        .await
        .unwrap()
}

// ── HTML form ────────────────────────────────────────────────────────

#[tokio::test]
async fn index_serves_the_form() {
    let base = spawn_test_server(Arc::default(), None).await;

    let resp = reqwest::get(format!("{base}/")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let html = resp.text().await.unwrap();
    assert!(html.contains(r#"<form method="post" action="/recipe">"#));
    assert!(html.contains("Risotto / rice bowl"));
    assert!(html.contains("unsalted butter"));
}

#[tokio::test]
async fn empty_submission_warns_without_calling_upstream() {
    let backend = Arc::new(FakeBackend::default());
    let base = spawn_test_server(backend.clone(), None).await;

    let resp = post_form(&base, "baby_age=15&food_style=soup&allergy=&other=+").await;
    assert_eq!(resp.status(), 422);
    let html = resp.text().await.unwrap();
    assert!(html.contains(r#"class="warning""#));
    assert!(html.contains("Select or type at least one ingredient"));
    assert_eq!(backend.calls(), (0, 0));
}

#[tokio::test]
async fn unknown_style_warns_without_calling_upstream() {
    let backend = Arc::new(FakeBackend::default());
    let base = spawn_test_server(backend.clone(), None).await;

    let resp = post_form(&base, "baby_age=15&food_style=casserole&proteins=egg").await;
    assert_eq!(resp.status(), 422);
    assert_eq!(backend.calls(), (0, 0));
}

#[tokio::test]
async fn cleared_age_warns_without_calling_upstream() {
    let backend = Arc::new(FakeBackend::default());
    let base = spawn_test_server(backend.clone(), None).await;

    let resp = post_form(&base, "baby_age=&proteins=egg").await;
    assert_eq!(resp.status(), 422);
    let html = resp.text().await.unwrap();
    assert!(html.contains(r#"class="warning""#));
    assert!(html.contains("age in months"));
    // The selection survives the round trip.
    assert!(html.contains(r#"<option value="egg" selected>"#));
    assert_eq!(backend.calls(), (0, 0));
}

#[tokio::test]
async fn submission_renders_recipe_and_photo() {
    let backend = Arc::new(FakeBackend::default());
    let base = spawn_test_server(backend.clone(), None).await;

    let resp = post_form(
        &base,
        "baby_age=12&food_style=rice-bowl&allergy=peanut\
         &proteins=egg&veggies=broccoli&veggies=onion&other=abalone",
    )
    .await;
    assert_eq!(resp.status(), 200);
    let html = resp.text().await.unwrap();

    assert!(html.contains("<h2>Broccoli Egg Porridge</h2>"));
    // minijinja escapes '/' inside the URL.
    assert!(html.contains("porridge.png"));
    assert!(html.contains("1. Steam the broccoli.\n2. Stir in the egg."));
    assert!(html.contains("Baby cheese adds calories."));
    // Submitted values stay selected.
    assert!(html.contains(r#"<option value="onion" selected>"#));
    assert!(html.contains(r#"value="12""#));

    assert_eq!(backend.calls(), (1, 1));
    assert_eq!(
        backend.last_user_prompt.lock().unwrap().as_deref(),
        Some("Fridge ingredients: 'egg, broccoli, onion, abalone'.")
    );
}

#[tokio::test]
async fn upstream_failure_renders_error_not_result() {
    let backend = Arc::new(FakeBackend {
        fail: true,
        ..FakeBackend::default()
    });
    let base = spawn_test_server(backend.clone(), None).await;

    let resp = post_form(&base, "baby_age=15&food_style=soup&veggies=potato").await;
    assert_eq!(resp.status(), 502);
    let html = resp.text().await.unwrap();
    assert!(html.contains(r#"class="error""#));
    assert!(html.contains("rate limit reached"));
    assert!(!html.contains(r#"class="result""#));
    assert_eq!(backend.calls(), (1, 0));
}

// ── JSON API ─────────────────────────────────────────────────────────

#[tokio::test]
async fn api_recipe_returns_cooked_recipe() {
    let backend = Arc::new(FakeBackend::default());
    let base = spawn_test_server(backend.clone(), None).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/recipe"))
        .json(&json!({
            "baby_age_months": 15,
            "food_style": "finger-food",
            "ingredients": ["egg", "broccoli"]
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["recipe"]["dish_name"], "Broccoli Egg Porridge");
    assert_eq!(body["recipe"]["shopping_tip"], "Baby cheese adds calories.");
    assert_eq!(body["image"]["url"], IMAGE_URL);
    assert_eq!(body["estimated_cost"]["prompt_tokens"], 250);
    assert!(body["trace_id"].as_str().unwrap().starts_with("tr-"));
}

#[tokio::test]
async fn api_recipe_validation_error_is_422() {
    let backend = Arc::new(FakeBackend::default());
    let base = spawn_test_server(backend.clone(), None).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/recipe"))
        .json(&json!({ "baby_age_months": 15, "food_style": "soup", "ingredients": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);

    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["kind"], "validation");
    assert_eq!(backend.calls(), (0, 0));
}

#[tokio::test]
async fn api_recipe_age_out_of_range_is_422() {
    let base = spawn_test_server(Arc::default(), None).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/recipe"))
        .json(&json!({ "baby_age_months": 48, "food_style": "soup", "ingredients": ["egg"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("between 4 and 36"));
}

#[tokio::test]
async fn api_recipe_upstream_error_is_502() {
    let backend = Arc::new(FakeBackend {
        fail: true,
        ..FakeBackend::default()
    });
    let base = spawn_test_server(backend, None).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/recipe"))
        .json(&json!({ "baby_age_months": 15, "food_style": "soup", "ingredients": ["egg"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 502);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["kind"], "upstream");
    assert!(body["error"].as_str().unwrap().contains("rate limit reached"));
}

#[tokio::test]
async fn deadline_cancels_slow_run() {
    let backend = Arc::new(FakeBackend {
        hang: true,
        ..FakeBackend::default()
    });
    let base = spawn_test_server(backend.clone(), Some(Duration::from_millis(50))).await;

    let resp = reqwest::Client::new()
        .post(format!("{base}/api/recipe"))
        .json(&json!({ "baby_age_months": 15, "food_style": "soup", "ingredients": ["egg"] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 504);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["kind"], "cancelled");
    assert_eq!(backend.calls(), (1, 0));
}

#[tokio::test]
async fn catalog_lists_form_choices() {
    let base = spawn_test_server(Arc::default(), None).await;

    let resp = reqwest::get(format!("{base}/api/catalog")).await.unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();

    let styles = body["food_styles"].as_array().unwrap();
    assert_eq!(styles.len(), 5);
    assert_eq!(styles[0]["slug"], "rice-bowl");
    assert_eq!(body["categories"][0]["key"], "proteins");
    assert_eq!(body["age_months"]["min"], 4);
    assert_eq!(body["age_months"]["max"], 36);
}
