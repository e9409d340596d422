pub mod config;
pub mod error;
pub mod logsink;
pub mod mailer;
pub mod render;
pub mod routes;
pub mod signature;
pub mod state;
pub mod submission;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderName, HeaderValue};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::logsink::LogSink;
use crate::mailer::Mailer;
use crate::state::{AppState, SharedState};

/// Build the application router. Configuration and the mail/log collaborators
/// are passed in explicitly; there is no ambient state.
pub fn build_app(config: Config, mailer: Arc<dyn Mailer>, log_sink: Arc<dyn LogSink>) -> Router {
    let max_body_size = config.max_body_size;

    let state: SharedState = Arc::new(AppState {
        config,
        mailer,
        log_sink,
    });

    Router::new()
        .merge(routes::webhook_routes())
        .route("/health", axum::routing::get(health))
        .layer(RequestBodyLimitLayer::new(max_body_size))
        .layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-content-type-options"),
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("x-frame-options"),
            HeaderValue::from_static("DENY"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            HeaderName::from_static("referrer-policy"),
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ))
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
