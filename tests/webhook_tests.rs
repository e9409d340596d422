mod common;

use std::sync::Arc;

use reqwest::StatusCode;
use serde_json::json;

use common::{FailingMailer, TEST_SECRET, spawn_app, spawn_with, test_config};

fn sample_payload() -> String {
    json!({
        "eventType": "FORM_RESPONSE",
        "data": {
            "formName": "Guest Feedback",
            "submissionId": "abc123",
            "createdAt": "2024-05-01T10:30:00.000Z",
            "fields": [
                {
                    "label": "Favorite color",
                    "type": "MULTIPLE_CHOICE",
                    "value": ["opt2"],
                    "options": [
                        { "id": "opt1", "text": "Red" },
                        { "id": "opt2", "text": "Blue" }
                    ]
                },
                { "label": "Comments", "type": "TEXTAREA", "value": "Great stay!" }
            ]
        }
    })
    .to_string()
}

// ── Health ──────────────────────────────────────────────────────

#[tokio::test]
async fn health_returns_ok() {
    let app = spawn_app(test_config()).await;

    let resp = app.client.get(app.url("/health")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

// ── Input validation ────────────────────────────────────────────

#[tokio::test]
async fn empty_body_is_bad_request() {
    let app = spawn_app(test_config()).await;

    let (body, status) = app.post_webhook("", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "Empty body");
}

#[tokio::test]
async fn invalid_json_is_bad_request() {
    let app = spawn_app(test_config()).await;

    let (body, status) = app.post_signed("not json at all").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON");
}

#[tokio::test]
async fn scalar_json_is_bad_request() {
    let app = spawn_app(test_config()).await;

    let (body, status) = app.post_signed("42").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON");
}

// ── Signature policy ────────────────────────────────────────────

#[tokio::test]
async fn missing_signature_is_unauthorized() {
    let app = spawn_app(test_config()).await;

    let (body, status) = app.post_webhook(&sample_payload(), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid signature");
    assert!(app.sent().is_empty());
}

#[tokio::test]
async fn bad_signature_is_unauthorized() {
    let app = spawn_app(test_config()).await;

    let (_, status) = app
        .post_webhook(&sample_payload(), Some("bm90IGEgcmVhbCBzaWduYXR1cmU="))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(app.sent().is_empty());
}

#[tokio::test]
async fn missing_secret_is_server_error_not_unauthorized() {
    let mut config = test_config();
    config.signing_secret = String::new();
    let app = spawn_app(config).await;

    let (body, status) = app.post_webhook(&sample_payload(), Some("anything")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "Server missing signing secret");
}

#[tokio::test]
async fn signature_not_required_when_disabled() {
    let mut config = test_config();
    config.require_signature = false;
    config.signing_secret = String::new();
    let app = spawn_app(config).await;

    let (body, status) = app.post_webhook(&sample_payload(), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(app.sent().len(), 1);
}

// ── Event filtering ─────────────────────────────────────────────

#[tokio::test]
async fn unrecognized_event_is_acknowledged_without_mail() {
    let app = spawn_app(test_config()).await;

    let payload = json!({ "eventType": "FORM_CREATED" }).to_string();
    let (body, status) = app.post_signed(&payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["ignored"], true);
    assert_eq!(body["eventType"], "FORM_CREATED");
    assert!(app.sent().is_empty());
}

#[tokio::test]
async fn numeric_event_type_is_ignored_without_mail() {
    let app = spawn_app(test_config()).await;

    let payload = json!({ "eventType": 5 }).to_string();
    let (body, status) = app.post_signed(&payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(body["ignored"], true);
    assert_eq!(body["eventType"], "5");
    assert!(app.sent().is_empty());
}

#[tokio::test]
async fn empty_event_type_is_treated_as_recognized() {
    let app = spawn_app(test_config()).await;

    let payload = json!({
        "eventType": "",
        "data": {
            "formName": "Guest Feedback",
            "fields": [{ "label": "Comments", "value": "hi" }]
        }
    })
    .to_string();
    let (body, status) = app.post_signed(&payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    assert_eq!(app.sent().len(), 1);
}

// ── Relay behavior ──────────────────────────────────────────────

#[tokio::test]
async fn valid_submission_relays_email() {
    let app = spawn_app(test_config()).await;

    let (body, status) = app.post_signed(&sample_payload()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let sent = app.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["ops@example.com".to_string()]);
    assert_eq!(sent[0].subject, "[Tally Feedback] Guest Feedback (#abc123)");
    assert!(sent[0].html.contains("Blue"));
    assert!(sent[0].html.contains("Great stay!"));
    assert!(sent[0].text.contains("- Comments: Great stay!"));
}

#[tokio::test]
async fn markup_in_answers_is_escaped() {
    let app = spawn_app(test_config()).await;

    let payload = json!({
        "eventType": "FORM_RESPONSE",
        "data": {
            "formName": "XSS Probe",
            "fields": [
                { "label": "Name", "type": "INPUT_TEXT", "value": "<script>alert(1)</script>" }
            ]
        }
    })
    .to_string();

    let (_, status) = app.post_signed(&payload).await;
    assert_eq!(status, StatusCode::OK);

    let sent = app.sent();
    assert!(sent[0].html.contains("&lt;script&gt;alert(1)&lt;/script&gt;"));
    assert!(!sent[0].html.contains("<script>alert(1)"));
}

#[tokio::test]
async fn mistyped_form_name_keeps_the_answer_table() {
    let app = spawn_app(test_config()).await;

    let payload = json!({
        "eventType": "FORM_RESPONSE",
        "data": {
            "formName": 123,
            "fields": [
                { "label": "Comments", "type": "TEXTAREA", "value": "Great stay!" }
            ]
        }
    })
    .to_string();

    let (_, status) = app.post_signed(&payload).await;
    assert_eq!(status, StatusCode::OK);

    let sent = app.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "[Tally Feedback] 123");
    assert!(sent[0].html.contains("Great stay!"));
    assert!(sent[0].text.contains("- Comments: Great stay!"));
}

#[tokio::test]
async fn payload_without_data_still_sends_defaults() {
    let app = spawn_app(test_config()).await;

    let payload = json!({ "eventType": "FORM_RESPONSE" }).to_string();
    let (body, status) = app.post_signed(&payload).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);

    let sent = app.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "[Tally Feedback] Tally Form");
    assert!(sent[0].html.contains("No fields found."));
}

// ── Delivery failures ───────────────────────────────────────────

#[tokio::test]
async fn no_recipients_is_server_error() {
    let mut config = test_config();
    config.recipients = Vec::new();
    let app = spawn_app(config).await;

    let (body, status) = app.post_signed(&sample_payload()).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["error"], "No recipients configured");
    assert!(app.sent().is_empty());
}

#[tokio::test]
async fn mail_transport_failure_is_server_error() {
    let addr = spawn_with(test_config(), Arc::new(FailingMailer)).await;
    let client = reqwest::Client::new();

    let payload = sample_payload();
    let sig = tally_relay::signature::sign(payload.as_bytes(), TEST_SECRET);
    let resp = client
        .post(format!("http://{addr}/v1/tally/webhook"))
        .header("tally-signature", sig)
        .body(payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Failed to send email");
}

// ── Config ──────────────────────────────────────────────────────

#[test]
fn extreme_utc_offset_falls_back_to_utc() {
    let mut config = test_config();
    config.utc_offset_minutes = i32::MAX;
    assert_eq!(config.display_offset().local_minus_utc(), 0);
}
