mod common;

use common::{test_config, twenty_four_words, TestApp, RECIPIENTS};
use serde_json::json;
use std::sync::Arc;
use submission_service::models::{SubmissionKind, SubmissionPayload};
use submission_service::services::{InMemorySubmissionStore, MockMailProvider, NotifyPolicy};

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(format!("{}/health", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    assert!(response.headers().contains_key("x-request-id"));

    let body: serde_json::Value = response.json().await.expect("Failed to parse response");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "submission-service");
}

#[tokio::test]
async fn readiness_fails_when_store_is_down() {
    let store = Arc::new(InMemorySubmissionStore::failing());
    let app = TestApp::spawn_with_collaborators(
        test_config(),
        store,
        Arc::new(MockMailProvider::new()),
    )
    .await;

    let response = app
        .client
        .get(format!("{}/ready", app.address))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 503);
}

// =============================================================================
// POST /words
// =============================================================================

#[tokio::test]
async fn twenty_four_words_are_stored_and_announced() {
    let app = TestApp::spawn().await;
    let words = twenty_four_words();

    let response = app.post_json("/words", &json!({ "words": &words })).await;

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Words saved successfully and email sent!");

    let records = app.store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].payload,
        SubmissionPayload::Words {
            words: words.clone()
        }
    );

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Words Saved Successfully!");
    assert_eq!(sent[0].recipients, RECIPIENTS.to_vec());
    assert!(sent[0].html_body.contains(&words.join(" ")));
}

#[tokio::test]
async fn wrong_word_count_is_rejected_without_side_effects() {
    let app = TestApp::spawn().await;

    let response = app.post_json("/words", &json!({ "words": ["a", "b"] })).await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(response.headers()["x-error-code"], "validation_failed");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body, json!({ "error": "Please provide exactly 24 words." }));

    assert_eq!(app.store.count(), 0);
    assert_eq!(app.mailer.send_count(), 0);
}

#[tokio::test]
async fn missing_words_field_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app.post_json("/words", &json!({})).await;

    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(app.store.count(), 0);
}

#[tokio::test]
async fn unconstrained_length_accepts_any_list() {
    let mut config = test_config();
    config.submission.required_length = None;
    let app = TestApp::spawn_with(config).await;

    for words in [json!([]), json!(["solo"]), json!(["a", "b", "c"])] {
        let response = app.post_json("/words", &json!({ "words": &words })).await;
        assert_eq!(response.status().as_u16(), 201);
    }

    let response = app.post_json("/words", &json!({ "other": 1 })).await;
    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Please provide a list of words.");

    assert_eq!(app.store.count(), 3);
    assert_eq!(app.mailer.send_count(), 3);
}

#[tokio::test]
async fn malformed_body_gets_json_error() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .post(format!("{}/words", app.address))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status().as_u16(), 400);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["error"], "Invalid request body.");
    assert_eq!(app.store.count(), 0);
}

// =============================================================================
// POST /requests
// =============================================================================

#[tokio::test]
async fn contact_request_is_stored_verbatim_and_announced() {
    let app = TestApp::spawn().await;

    let response = app
        .post_json("/requests", &json!({ "email": "x@y.com", "message": "hi" }))
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Request saved successfully and email sent!");

    let records = app.store.records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].kind(), SubmissionKind::Contact);
    assert_eq!(
        records[0].payload,
        SubmissionPayload::Contact {
            email: "x@y.com".to_string(),
            message: "hi".to_string(),
        }
    );

    let sent = app.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].recipients, RECIPIENTS.to_vec());
    assert!(sent[0].html_body.contains("x@y.com"));
    assert!(sent[0].html_body.contains("hi"));
}

#[tokio::test]
async fn contact_request_requires_both_fields() {
    let app = TestApp::spawn().await;

    for body in [
        json!({ "email": "x@y.com" }),
        json!({ "message": "hi" }),
        json!({}),
        json!({ "email": "", "message": "hi" }),
        json!({ "email": null, "message": "hi" }),
    ] {
        let response = app.post_json("/requests", &body).await;
        assert_eq!(response.status().as_u16(), 400, "body: {}", body);
        let error: serde_json::Value = response.json().await.unwrap();
        assert_eq!(error["error"], "Please provide both email and message.");
    }

    assert_eq!(app.store.count(), 0);
    assert_eq!(app.mailer.send_count(), 0);
}

// =============================================================================
// Partial failure
// =============================================================================

#[tokio::test]
async fn store_failure_returns_500_and_never_sends_mail() {
    let store = Arc::new(InMemorySubmissionStore::failing());
    let mailer = Arc::new(MockMailProvider::new());
    let app = TestApp::spawn_with_collaborators(test_config(), store.clone(), mailer.clone()).await;

    let response = app
        .post_json("/requests", &json!({ "email": "x@y.com", "message": "hi" }))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(response.headers()["x-error-code"], "persist_failed");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body,
        json!({ "error": "An error occurred while processing your request." })
    );

    assert_eq!(store.count(), 0);
    assert_eq!(mailer.send_count(), 0);
}

#[tokio::test]
async fn mail_failure_returns_500_but_record_persists() {
    let store = Arc::new(InMemorySubmissionStore::new());
    let mailer = Arc::new(MockMailProvider::failing());
    let app = TestApp::spawn_with_collaborators(test_config(), store.clone(), mailer.clone()).await;

    let response = app
        .post_json("/words", &json!({ "words": twenty_four_words() }))
        .await;

    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(response.headers()["x-error-code"], "notify_failed");
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(
        body["error"],
        "An error occurred while processing your request."
    );

    // The write is not rolled back.
    assert_eq!(store.count(), 1);
    assert_eq!(mailer.send_count(), 1);
}

#[tokio::test]
async fn best_effort_policy_reports_success_when_mail_fails() {
    let mut config = test_config();
    config.submission.notify_policy = NotifyPolicy::BestEffort;
    let store = Arc::new(InMemorySubmissionStore::new());
    let mailer = Arc::new(MockMailProvider::failing());
    let app = TestApp::spawn_with_collaborators(config, store.clone(), mailer).await;

    let response = app
        .post_json("/requests", &json!({ "email": "x@y.com", "message": "hi" }))
        .await;

    assert_eq!(response.status().as_u16(), 201);
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["message"], "Request saved successfully.");
    assert_eq!(store.count(), 1);
}

// =============================================================================
// Idempotence
// =============================================================================

#[tokio::test]
async fn identical_submissions_create_distinct_records() {
    let app = TestApp::spawn().await;
    let body = json!({ "email": "x@y.com", "message": "same" });

    assert_eq!(app.post_json("/requests", &body).await.status().as_u16(), 201);
    assert_eq!(app.post_json("/requests", &body).await.status().as_u16(), 201);

    let records = app.store.records();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].payload, records[1].payload);
    assert_ne!(records[0].id, records[1].id);
    assert_eq!(app.mailer.send_count(), 2);
}

// =============================================================================
// Route selection
// =============================================================================

#[tokio::test]
async fn disabled_route_is_not_mounted() {
    let mut config = test_config();
    config.submission.routes = vec![SubmissionKind::Contact];
    let app = TestApp::spawn_with(config).await;

    let response = app
        .post_json("/words", &json!({ "words": twenty_four_words() }))
        .await;

    assert_eq!(response.status().as_u16(), 404);
    let body: serde_json::Value = response.json().await.unwrap();
    assert!(body["error"].is_string());
    assert_eq!(app.store.count(), 0);
}
