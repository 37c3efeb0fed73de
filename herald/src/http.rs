//! HTTP surface: the contact route, health probe, and response shapes.
//!
//! Responses mirror what the form's frontend expects: `200` with
//! `{"success": true, ...}` on acceptance, `400` with a leading `error`
//! plus a field-keyed `errors` map on rejection, and `500` with a generic
//! `error` when the agency notification cannot be delivered. Dispatch
//! error details stay in the logs; callers never see relay internals.

use std::{sync::Arc, time::Duration};

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use herald_contact::{ContactRequest, SenderProfile};
use herald_dispatch::DispatchChannel;
use serde_json::json;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
};

use crate::handler::{self, Submission};

/// Upper bound on one request, covering both sequential relay dispatches.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shared state behind the HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    pub channel: Arc<dyn DispatchChannel>,
    pub profile: SenderProfile,
}

/// Assemble the service router.
#[must_use]
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/contact", post(contact).fallback(method_not_allowed))
        .route("/health", get(health))
        .with_state(state)
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(cors())
}

/// The form posts from browser origins we do not enumerate, so any origin
/// may POST. Preflights only ever ask about the content-type header.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn contact(
    State(state): State<AppState>,
    payload: Result<Json<ContactRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(request)) = payload else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Invalid request body." })),
        )
            .into_response();
    };

    match handler::handle(&request, &state.profile, state.channel.as_ref()).await {
        Submission::Rejected(validation) => (
            StatusCode::BAD_REQUEST,
            Json(json!({
                "error": validation.lead(),
                "errors": validation.errors(),
            })),
        )
            .into_response(),
        Submission::AgencyDispatchFailed(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": "Failed to send message. Please try again later." })),
        )
            .into_response(),
        Submission::Accepted { .. } => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "message": "Message sent successfully!",
            })),
        )
            .into_response(),
    }
}

async fn health() -> Response {
    (StatusCode::OK, "OK").into_response()
}

async fn method_not_allowed() -> Response {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        Json(json!({ "error": "Method not allowed." })),
    )
        .into_response()
}
