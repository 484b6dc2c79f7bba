/**
 * Database-Backed Integration Tests
 *
 * Subscription lifecycle properties and full handler round trips that
 * need real rows: conflict idempotence under the partial unique index,
 * both webhook branches (insert paid / upgrade in place), and the
 * end-to-end image and code generation shapes.
 *
 * Each test gets an isolated database with migrations applied via
 * `#[sqlx::test]`; external providers are wiremock servers.
 */

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::StatusCode;
use axum_test::TestServer;
use chrono::{Duration, Utc};
use hmac::{Hmac, Mac};
use serde_json::{json, Value};
use sha2::Sha256;
use sqlx::PgPool;
use uuid::Uuid;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use promptforge::artifacts::ArtifactStore;
use promptforge::auth::sessions::create_token;
use promptforge::auth::users::{create_user, User};
use promptforge::billing::BillingClient;
use promptforge::gateway::GenerationGateway;
use promptforge::routes::create_router;
use promptforge::server::config::AppConfig;
use promptforge::server::state::AppState;
use promptforge::subscription::db::{create_trial_subscription, PlanTier};

const WEBHOOK_SECRET: &str = "whsec_test_secret";
const JWT_SECRET: &str = "test-jwt-secret";

fn test_server(pool: PgPool, gateway_base: &str, artifact_dir: &std::path::Path) -> TestServer {
    let vars: HashMap<&str, String> = HashMap::from([
        (
            "DATABASE_URL",
            "postgres://unused-handlers-get-the-pool-directly".to_string(),
        ),
        ("OPENAI_API_KEY", "sk-test".to_string()),
        ("OPENAI_API_BASE", gateway_base.to_string()),
        ("STRIPE_SECRET_KEY", "sk_test_123".to_string()),
        ("STRIPE_WEBHOOK_SECRET", WEBHOOK_SECRET.to_string()),
        ("STRIPE_PRICE_BASIC", "price_basic".to_string()),
        ("STRIPE_PRICE_PREMIUM", "price_premium".to_string()),
        ("FRONTEND_URL", "http://localhost:8501".to_string()),
        ("JWT_SECRET", JWT_SECRET.to_string()),
        ("ARTIFACT_DIR", artifact_dir.display().to_string()),
    ]);
    let config = AppConfig::from_lookup(|name| vars.get(name).cloned()).unwrap();

    let http = reqwest::Client::new();
    let gateway = GenerationGateway::from_config(&config, http.clone());
    let billing = BillingClient::from_config(&config, http.clone());
    let artifacts = ArtifactStore::new(&config.artifact_dir).unwrap();

    let state = AppState {
        config: Arc::new(config),
        db_pool: pool,
        gateway,
        billing,
        artifacts,
        http,
    };

    TestServer::new(create_router(state)).unwrap()
}

async fn seed_user(pool: &PgPool) -> User {
    create_user(
        pool,
        format!("user{}", &Uuid::new_v4().simple().to_string()[..8]),
        format!("{}@example.com", Uuid::new_v4().simple()),
        "not-a-real-hash".to_string(),
    )
    .await
    .unwrap()
}

fn sign(body: &[u8]) -> String {
    let timestamp = "1700000000";
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(timestamp.as_bytes());
    mac.update(b".");
    mac.update(body);
    format!("t={},v1={}", timestamp, hex::encode(mac.finalize().into_bytes()))
}

fn completed_checkout_payload(user_id: Uuid, plan: &str) -> Vec<u8> {
    serde_json::to_vec(&json!({
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "client_reference_id": user_id.to_string(),
                "customer": "cus_test_1",
                "subscription": "sub_test_1",
                "metadata": {"plan_type": plan}
            }
        }
    }))
    .unwrap()
}

async fn active_row_count(pool: &PgPool, user_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE user_id = $1 AND is_active")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "./migrations")]
async fn second_create_conflicts_and_never_adds_a_second_active_row(pool: PgPool) {
    let dir = tempfile::TempDir::new().unwrap();
    let server = test_server(pool.clone(), "http://127.0.0.1:9", dir.path());
    let user = seed_user(&pool).await;

    let first = server
        .post("/api/subscription/create")
        .json(&json!({"user_id": user.id, "plan_type": "free"}))
        .await;
    assert_eq!(first.status_code(), StatusCode::OK);

    let second = server
        .post("/api/subscription/create")
        .json(&json!({"user_id": user.id, "plan_type": "basic"}))
        .await;
    assert_eq!(second.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = second.json();
    assert_eq!(body["error"], "User already has an active subscription");

    assert_eq!(active_row_count(&pool, user.id).await, 1);
}

#[sqlx::test(migrations = "./migrations")]
async fn webhook_inserts_single_paid_row_when_none_active(pool: PgPool) {
    let dir = tempfile::TempDir::new().unwrap();
    let server = test_server(pool.clone(), "http://127.0.0.1:9", dir.path());
    let user = seed_user(&pool).await;

    let payload = completed_checkout_payload(user.id, "premium");
    let response = server
        .post("/api/subscription/webhook")
        .add_header("stripe-signature", sign(&payload))
        .bytes(payload.into())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "success");
    assert_eq!(body["handled"], true);

    assert_eq!(active_row_count(&pool, user.id).await, 1);

    let status = server
        .get(&format!("/api/subscription/status/{}", user.id))
        .await;
    assert_eq!(status.status_code(), StatusCode::OK);
    let sub: Value = status.json();
    assert_eq!(sub["plan_type"], "premium");
    assert!(sub["is_active"].as_bool().unwrap());

    let end_date = chrono::DateTime::parse_from_rfc3339(sub["end_date"].as_str().unwrap())
        .unwrap()
        .with_timezone(&Utc);
    let expected = Utc::now() + Duration::days(365);
    assert!(
        (end_date - expected).num_seconds().abs() <= 2,
        "end_date {} not within tolerance of now+365d",
        end_date
    );

    let (customer, subscription): (Option<String>, Option<String>) = sqlx::query_as(
        "SELECT stripe_customer_id, stripe_subscription_id FROM subscriptions WHERE user_id = $1",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(customer.as_deref(), Some("cus_test_1"));
    assert_eq!(subscription.as_deref(), Some("sub_test_1"));
}

#[sqlx::test(migrations = "./migrations")]
async fn webhook_upgrades_active_trial_in_place(pool: PgPool) {
    let dir = tempfile::TempDir::new().unwrap();
    let server = test_server(pool.clone(), "http://127.0.0.1:9", dir.path());
    let user = seed_user(&pool).await;

    let trial = create_trial_subscription(&pool, user.id, PlanTier::Free)
        .await
        .unwrap();

    let payload = completed_checkout_payload(user.id, "basic");
    let response = server
        .post("/api/subscription/webhook")
        .add_header("stripe-signature", sign(&payload))
        .bytes(payload.into())
        .await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["status"], "success");

    // Same row mutated, not a duplicate insert
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM subscriptions WHERE user_id = $1")
        .bind(user.id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(total, 1);

    let paid = promptforge::subscription::db::get_active_subscription(&pool, user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(paid.id, trial.id);
    assert_eq!(paid.plan_type, "basic");
    assert_eq!(paid.stripe_customer_id.as_deref(), Some("cus_test_1"));
    assert_eq!(paid.stripe_subscription_id.as_deref(), Some("sub_test_1"));

    // Payment extends the subscription; the trial's start is preserved
    assert_eq!(paid.start_date, trial.start_date);
    let expected_end = Utc::now() + Duration::days(365);
    assert!((paid.end_date.unwrap() - expected_end).num_seconds().abs() <= 2);
}

#[sqlx::test(migrations = "./migrations")]
async fn generate_image_end_to_end_shape(pool: PgPool) {
    let provider = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();
    let server = test_server(pool.clone(), &provider.uri(), dir.path());
    let user = seed_user(&pool).await;
    let token = create_token(JWT_SECRET, user.id, user.email.clone()).unwrap();

    let image_url = format!("{}/generated/bicycle.png", provider.uri());
    Mock::given(method("POST"))
        .and(path("/images/generations"))
        .and(body_partial_json(json!({
            "prompt": "A red bicycle in sketch style"
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"data": [{"url": image_url}]})),
        )
        .expect(1)
        .mount(&provider)
        .await;
    Mock::given(method("GET"))
        .and(path("/generated/bicycle.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, 0x50, 0x4E, 0x47]))
        .expect(1)
        .mount(&provider)
        .await;

    let response = server
        .post("/api/tools/generate-image")
        .add_header("authorization", format!("Bearer {}", token))
        .json(&json!({"prompt": "A red bicycle", "style": "sketch"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert!(body["image_path"].as_str().unwrap().ends_with(".png"));
    assert!(body["artifact_id"].as_str().unwrap().ends_with(".png"));

    let written = std::fs::read(body["image_path"].as_str().unwrap()).unwrap();
    assert_eq!(written, vec![0x89, 0x50, 0x4E, 0x47]);
}

#[sqlx::test(migrations = "./migrations")]
async fn generate_code_end_to_end_shape(pool: PgPool) {
    let provider = MockServer::start().await;
    let dir = tempfile::TempDir::new().unwrap();
    let server = test_server(pool.clone(), &provider.uri(), dir.path());
    let user = seed_user(&pool).await;
    let token = create_token(JWT_SECRET, user.id, user.email.clone()).unwrap();

    let generated = "def hello():\n    print(\"Hello world\")";
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"content": generated}}]
        })))
        .expect(1)
        .mount(&provider)
        .await;

    let response = server
        .post("/api/tools/generate-code")
        .add_header("authorization", format!("Bearer {}", token))
        .json(&json!({"prompt": "Hello world function", "language": "python"}))
        .await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["code"], generated);
    assert!(body["file_path"].as_str().unwrap().ends_with(".py"));

    // One content row recorded for the owning user
    let recorded: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM user_contents WHERE user_id = $1 AND content_type = 'code'",
    )
    .bind(user.id)
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(recorded, 1);
}
