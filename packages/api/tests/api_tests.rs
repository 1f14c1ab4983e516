// ABOUTME: Router tests driven through tower oneshot
// ABOUTME: Covers routing, the error envelope, sentinel responses and the static fallback

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use copilot_agents::Pipeline;
use copilot_ai::{FixedResponseProvider, GeneratorSettings, RetryPolicy, StructuredGenerator};
use copilot_api::{create_app, create_router, AppState};
use copilot_config::Config;
use copilot_models::{AnalysisResult, ImpactAssessment, CONVERSATIONAL_JUSTIFICATION};
use copilot_prompts::PromptManager;
use http_body_util::BodyExt;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

const ANALYSIS_JSON: &str =
    r#"{"business_objective": "ESG ratings for funds", "data_requirements": ["Rating history"]}"#;

fn state_with(provider: Arc<FixedResponseProvider>) -> AppState {
    let prompts = Arc::new(PromptManager::builtin().unwrap());
    let settings = GeneratorSettings {
        retry: RetryPolicy::none(),
        ..GeneratorSettings::default()
    };
    let generator = Arc::new(StructuredGenerator::new(provider, prompts, settings));
    AppState::new(Arc::new(Pipeline::new(generator, 60_000)))
}

fn app_with(provider: Arc<FixedResponseProvider>) -> Router {
    create_router(state_with(provider))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint_reports_provider_state() {
    let app = app_with(Arc::new(FixedResponseProvider::new("{}").unconfigured()));

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/health")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "copilot-api");
    assert_eq!(body["provider_configured"], false);
    assert!(body.get("version").is_some());
}

#[tokio::test]
async fn test_analyze_requirements_returns_analysis() {
    let app = app_with(Arc::new(FixedResponseProvider::new(ANALYSIS_JSON)));

    let response = app
        .oneshot(post_json(
            "/api/analyze/requirements",
            json!({"text": "Funds need ESG ratings."}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["business_objective"], "ESG ratings for funds");
    assert_eq!(body["client_type"], "N/A");
}

#[tokio::test]
async fn test_empty_text_is_rejected() {
    let provider = Arc::new(FixedResponseProvider::new(ANALYSIS_JSON));
    let app = app_with(provider.clone());

    let response = app
        .oneshot(post_json("/api/pipeline/run", json!({"text": "   "})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["request_id"].as_str().is_some());
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let app = app_with(Arc::new(FixedResponseProvider::new(ANALYSIS_JSON)));

    let response = app
        .oneshot(post_json("/api/analyze/requirements", json!({"document": "x"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_missing_credentials_return_503() {
    let provider = Arc::new(FixedResponseProvider::new(ANALYSIS_JSON).unconfigured());
    let app = app_with(provider.clone());

    let response = app
        .oneshot(post_json(
            "/api/analyze/requirements",
            json!({"text": "Funds need ESG ratings."}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_CONFIGURED");
    assert_eq!(body["error"]["details"]["stage"], "requirement_analysis");
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_free_text_reply_returns_502_with_excerpt() {
    let app = app_with(Arc::new(FixedResponseProvider::new("I'd rather not.")));

    let response = app
        .oneshot(post_json(
            "/api/analyze/requirements",
            json!({"text": "Funds need ESG ratings."}),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = body_json(response).await;
    assert_eq!(body["error"]["code"], "MALFORMED_OUTPUT");
    assert_eq!(body["error"]["details"]["raw_excerpt"], "I'd rather not.");
}

#[tokio::test]
async fn test_impact_for_conversational_input_is_sentinel() {
    let provider = Arc::new(FixedResponseProvider::new("{}"));
    let app = app_with(provider.clone());
    let conversational = serde_json::to_value(AnalysisResult::conversational("Hello!")).unwrap();

    let response = app
        .oneshot(post_json("/api/analyze/impact", conversational))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: ImpactAssessment = serde_json::from_value(body_json(response).await).unwrap();
    assert_eq!(body, ImpactAssessment::skipped(CONVERSATIONAL_JUSTIFICATION));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_generate_code_for_skipped_impact_is_sentinel() {
    let provider = Arc::new(FixedResponseProvider::new("{}"));
    let app = app_with(provider.clone());
    let skipped = serde_json::to_value(ImpactAssessment::skipped("Nothing to do")).unwrap();

    let response = app
        .oneshot(post_json("/api/generate/code", skipped))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["files"], json!([]));
    assert_eq!(provider.call_count(), 0);
}

#[tokio::test]
async fn test_pipeline_run_for_greeting() {
    let provider = Arc::new(FixedResponseProvider::new(
        r#"{"conversation_response": "AI is the study of intelligent systems."}"#,
    ));
    let app = app_with(provider.clone());

    let response = app
        .oneshot(post_json("/api/pipeline/run", json!({"text": "Hello, what is AI?"})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["skipped"], "conversational_input");
    assert_eq!(body["impact"]["overall_risk"], "Low");
    assert_eq!(body["impact"]["effort_estimation"]["complexity"], "N/A");
    assert_eq!(body["code"]["files"], json!([]));
    assert_eq!(provider.call_count(), 1);
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let app = app_with(Arc::new(FixedResponseProvider::new("{}")));

    let request = Request::builder()
        .method(Method::GET)
        .uri("/api/nonexistent")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_static_dir_served_as_fallback() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("index.html"), "<h1>copilot</h1>").unwrap();
    let config = Config {
        static_dir: Some(dir.path().to_path_buf()),
        ..Config::default()
    };
    let app = create_app(state_with(Arc::new(FixedResponseProvider::new("{}"))), &config).unwrap();

    let request = Request::builder()
        .method(Method::GET)
        .uri("/index.html")
        .body(Body::empty())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&bytes[..], b"<h1>copilot</h1>");
}

#[tokio::test]
async fn test_document_above_two_megabytes_is_accepted() {
    let provider = Arc::new(FixedResponseProvider::new(ANALYSIS_JSON));
    let app = create_app(state_with(provider.clone()), &Config::default()).unwrap();
    let text = "Funds need an ESG rating.\n\n".repeat(120_000);
    assert!(text.len() > 3 * 1024 * 1024);

    let response = app
        .oneshot(post_json("/api/analyze/requirements", json!({ "text": text })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(provider.call_count() > 1);
}

#[tokio::test]
async fn test_body_over_configured_limit_is_413() {
    let provider = Arc::new(FixedResponseProvider::new(ANALYSIS_JSON));
    let config = Config {
        max_body_bytes: 1024,
        ..Config::default()
    };
    let app = create_app(state_with(provider.clone()), &config).unwrap();

    let response = app
        .oneshot(post_json(
            "/api/analyze/requirements",
            json!({ "text": "x".repeat(4096) }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["error"]["code"], "PAYLOAD_TOO_LARGE");
    assert_eq!(provider.call_count(), 0);
}
