pub mod webhook;

use axum::Router;
use axum::routing::post;

use crate::state::SharedState;

pub fn webhook_routes() -> Router<SharedState> {
    Router::new().route("/v1/tally/webhook", post(webhook::receive))
}
