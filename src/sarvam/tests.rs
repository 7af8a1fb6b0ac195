use super::*;
use crate::config::{ApiKey, SarvamConfig};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str) -> SarvamConfig {
    SarvamConfig {
        base_url: base_url.to_string(),
        ..SarvamConfig::default()
    }
}

pub(super) fn test_client(server: &MockServer) -> SarvamClient {
    SarvamClient::new(&test_config(&server.uri()), &ApiKey::new("test-key"))
        .expect("client should build")
}

#[test]
fn language_codes_cover_all_ten() {
    assert_eq!(Language::ALL.len(), 10);
    assert_eq!(Language::English.code(), "en-IN");
    assert_eq!(Language::Hindi.code(), "hi-IN");
    assert_eq!(Language::Punjabi.code(), "pa-IN");
    assert_eq!(Language::English.tts_voice(), "shubh");
    assert_eq!(Language::Tamil.tts_voice(), "abhilasha");
    assert_eq!(Language::Bengali.tts_voice(), "anushka");
}

#[test]
fn language_parses_case_insensitively() {
    assert_eq!("hindi".parse::<Language>().expect("parses"), Language::Hindi);
    assert_eq!(
        " Malayalam ".parse::<Language>().expect("parses"),
        Language::Malayalam
    );
    assert!("Klingon".parse::<Language>().is_err());
}

#[test]
fn base_url_gains_trailing_slash() {
    let client = SarvamClient::new(
        &test_config("https://api.example.com/prefix"),
        &ApiKey::new("k"),
    )
    .expect("client should build");

    let url = client.endpoint("translate").expect("endpoint should build");
    assert_eq!(url.as_str(), "https://api.example.com/prefix/translate");
}

#[tokio::test]
async fn requests_carry_the_subscription_key_header() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .and(header("api-subscription-key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"translated_text": "ok"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let result = client
        .translate("hello", Language::English, Language::Hindi)
        .await
        .expect("translate should succeed");
    assert_eq!(result, "ok");
}

#[tokio::test]
async fn provider_error_passes_through_unmodified() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .translate("hello", Language::English, Language::Hindi)
        .await
        .expect_err("should surface provider error");

    match err {
        crate::ChatbotError::Provider { status, message } => {
            assert_eq!(status, 429);
            assert_eq!(message, "rate limited");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn single_attempt_does_not_retry_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(503).set_body_string("down"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let err = client
        .translate("hello", Language::English, Language::Hindi)
        .await
        .expect_err("should fail");

    assert!(matches!(
        err,
        crate::ChatbotError::Provider { status: 503, .. }
    ));
}

#[tokio::test]
async fn configured_retries_reattempt_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/translate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("flaky"))
        .expect(3)
        .mount(&server)
        .await;

    let config = SarvamConfig {
        retry_attempts: 3,
        ..test_config(&server.uri())
    };
    let client =
        SarvamClient::new(&config, &ApiKey::new("test-key")).expect("client should build");

    let err = client
        .translate("hello", Language::English, Language::Hindi)
        .await
        .expect_err("should fail after retries");

    assert!(matches!(
        err,
        crate::ChatbotError::Provider { status: 500, .. }
    ));
}
