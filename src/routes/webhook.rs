use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::HeaderMap;
use bytes::Bytes;
use serde_json::{Value, json};

use crate::error::AppError;
use crate::logsink::Channel;
use crate::render;
use crate::render::document::{self, RenderOptions};
use crate::signature;
use crate::state::SharedState;
use crate::submission::payload::SubmissionPayload;

const RECOGNIZED_EVENT: &str = "FORM_RESPONSE";
const PREVIEW_LIMIT: usize = 2000;

pub async fn receive(
    State(state): State<SharedState>,
    ConnectInfo(addr): ConnectInfo<std::net::SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<Value>, AppError> {
    state
        .log_sink
        .append(
            Channel::Incoming,
            &format!("IP: {} | RAW BODY:\n{}", addr.ip(), String::from_utf8_lossy(&body)),
        )
        .await;

    if body.is_empty() {
        return Err(AppError::BadRequest("Empty body".to_string()));
    }

    let provided = headers
        .get("tally-signature")
        .and_then(|v| v.to_str().ok());

    if state.config.require_signature {
        // A missing secret is a deployment problem, not an auth failure.
        if state.config.signing_secret.is_empty() {
            return Err(AppError::Configuration(
                "Server missing signing secret".to_string(),
            ));
        }
        if !signature::verify(&body, &state.config.signing_secret, provided) {
            return Err(AppError::Unauthorized("Invalid signature".to_string()));
        }
    }

    let value: Value = serde_json::from_slice(&body)
        .map_err(|_| AppError::BadRequest("Invalid JSON".to_string()))?;
    if !value.is_object() && !value.is_array() {
        return Err(AppError::BadRequest("Invalid JSON".to_string()));
    }
    let payload: SubmissionPayload = serde_json::from_value(value).unwrap_or_default();

    if let Some(event_type) = payload.event_type.as_deref().filter(|et| !et.is_empty()) {
        if event_type != RECOGNIZED_EVENT {
            tracing::debug!("Ignoring event type {event_type}");
            return Ok(Json(json!({
                "ok": true,
                "ignored": true,
                "eventType": event_type,
            })));
        }
    }

    let opts = RenderOptions::from_config(&state.config);
    let doc = document::build(&payload, &opts);

    let summary = json!({
        "to": state.config.recipients,
        "subject": doc.subject,
        "text_preview": doc.text.chars().take(PREVIEW_LIMIT).collect::<String>(),
        "html_preview": render::strip_tags(&doc.html)
            .chars()
            .take(PREVIEW_LIMIT)
            .collect::<String>(),
    });
    state
        .log_sink
        .append(
            Channel::Outgoing,
            &format!(
                "EMAIL SUMMARY:\n{}",
                serde_json::to_string_pretty(&summary).unwrap_or_default()
            ),
        )
        .await;

    if state.config.recipients.is_empty() {
        return Err(AppError::Configuration(
            "No recipients configured".to_string(),
        ));
    }

    state
        .mailer
        .send(&state.config.recipients, &doc.subject, &doc.html, &doc.text)
        .await
        .map_err(|e| {
            tracing::error!("Mail send failed: {e}");
            AppError::Delivery("Failed to send email".to_string())
        })?;

    tracing::info!("Relayed submission: {}", doc.subject);

    Ok(Json(json!({ "ok": true })))
}
